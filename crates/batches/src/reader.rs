use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use model::{Costing, MatrixRequest, MatrixResult, WorkRow};
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::{
    client::{MatrixClient, MatrixError},
    grouping::{chunk, group_by_residence, Batch},
    item::MatrixItem,
    queue::{QueueError, WorkQueue},
    PipelineSettings,
};

#[derive(Debug, Error)]
pub enum ReaderBatchError {
    #[error("batch {batch} of residence {residence_id}: {source}")]
    Matrix {
        residence_id: i32,
        batch: usize,
        #[source]
        source: MatrixError,
    },
    #[error("{actual} measurements for {expected} rows (residence {residence_id:?})")]
    Misaligned {
        residence_id: Option<i32>,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("producer task failed: {0}")]
    Panicked(String),
}

impl ReaderBatchError {
    /// Whether the routing service answered with something that cannot be
    /// aligned with the batch.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Matrix { source, .. } => {
                matches!(source, MatrixError::MalformedResponse { .. })
            }
            Self::Misaligned { .. } => true,
            _ => false,
        }
    }
}

/// Handle of one producer task. Resolves to the number of rows it enqueued;
/// a cancelled producer enqueues nothing and resolves to `Ok(0)`.
pub type Producer = JoinHandle<Result<usize, ReaderBatchError>>;

/// Creates the producer tasks of one pipeline run.
pub trait ReaderBatch: Send {
    type Item: Send + 'static;

    /// Spawns every producer at once. Each pushes its results onto `queue`
    /// and stops early once `cancel` fires.
    fn register(
        &mut self,
        queue: &WorkQueue<Self::Item>,
        cancel: &CancellationToken,
    ) -> Vec<Producer>;
}

/// Reads distances from a matrix API, one producer per [`Batch`].
pub struct MatrixReaderBatch<C: MatrixClient> {
    rows: Vec<WorkRow>,
    client: Arc<C>,
    costing: Costing,
    settings: PipelineSettings,
}

impl<C: MatrixClient> MatrixReaderBatch<C> {
    pub fn new(
        rows: Vec<WorkRow>,
        client: Arc<C>,
        costing: Costing,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            rows,
            client,
            costing,
            settings: settings.clone(),
        }
    }
}

impl<C: MatrixClient> ReaderBatch for MatrixReaderBatch<C> {
    type Item = MatrixItem;

    fn register(
        &mut self,
        queue: &WorkQueue<MatrixItem>,
        cancel: &CancellationToken,
    ) -> Vec<Producer> {
        let rows = std::mem::take(&mut self.rows);
        let limiter = Arc::new(Semaphore::new(self.settings.http_concurrency.max(1)));

        let mut producers = Vec::new();
        for (residence, amenities) in group_by_residence(&rows) {
            let batches = chunk(residence, &amenities, self.settings.batch_size);
            for (index, batch) in batches.into_iter().enumerate() {
                let index = index + 1;
                debug!("Adding task {} for residence {}", index, residence.id);
                let producer = BatchProducer {
                    client: Arc::clone(&self.client),
                    queue: queue.clone(),
                    limiter: Arc::clone(&limiter),
                    cancel: cancel.clone(),
                    costing: self.costing,
                    max_retries: self.settings.max_retries,
                    retry_backoff: self.settings.retry_backoff,
                };
                producers.push(tokio::spawn(producer.produce(batch, index)));
            }
        }

        info!(
            "registered {} producers for {} rows",
            producers.len(),
            rows.len()
        );
        producers
    }
}

struct BatchProducer<C: MatrixClient> {
    client: Arc<C>,
    queue: WorkQueue<MatrixItem>,
    limiter: Arc<Semaphore>,
    cancel: CancellationToken,
    costing: Costing,
    max_retries: u32,
    retry_backoff: Duration,
}

impl<C: MatrixClient> BatchProducer<C> {
    async fn produce(self, batch: Batch, index: usize) -> Result<usize, ReaderBatchError> {
        let residence_id = batch.residence().id;
        let request = batch.request(self.costing);

        let result = match self.fetch(&request).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                debug!("batch {index} of residence {residence_id} cancelled");
                return Ok(0);
            }
            Err(why) => {
                error!(
                    "batch {index} of residence {residence_id} failed: {why}\nrequest: {}",
                    serde_json::to_string(&request).unwrap_or_default()
                );
                return Err(ReaderBatchError::Matrix {
                    residence_id,
                    batch: index,
                    source: why,
                });
            }
        };

        let item = MatrixItem::new(result, batch.rows()).map_err(|why| {
            error!(
                "batch {index} of residence {residence_id} failed: {why}\nrequest: {}",
                serde_json::to_string(&request).unwrap_or_default()
            );
            why
        })?;
        let len = item.len();

        tokio::select! {
            put = self.queue.put(item) => put?,
            _ = self.cancel.cancelled() => return Ok(0),
        }
        Ok(len)
    }

    /// Sends the request, retrying transport failures with a linearly
    /// growing delay. `Ok(None)` means the run was cancelled.
    async fn fetch(&self, request: &MatrixRequest) -> Result<Option<MatrixResult>, MatrixError> {
        let mut backoff = self.retry_backoff;
        let mut attempt = 0;
        loop {
            let response = tokio::select! {
                response = self.send(request) => response,
                _ = self.cancel.cancelled() => return Ok(None),
            };
            match response {
                Ok(result) => return Ok(Some(result)),
                Err(why) if why.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "matrix request failed: {why}; retry {attempt}/{} in {:?}",
                        self.max_retries, backoff
                    );
                    tokio::select! {
                        _ = sleep(backoff) => {}
                        _ = self.cancel.cancelled() => return Ok(None),
                    }
                    backoff += self.retry_backoff;
                }
                Err(why) => return Err(why),
            }
        }
    }

    async fn send(&self, request: &MatrixRequest) -> Result<MatrixResult, MatrixError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| MatrixError::Other("request limiter closed".to_owned()))?;
        self.client.sources_to_targets(request).await
    }
}
