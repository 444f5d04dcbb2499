use std::{ops::AddAssign, sync::Arc};

use futures::future::join_all;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::{
    queue::WorkQueue,
    reader::{ReaderBatch, ReaderBatchError},
    writer::{self, ConsumerStats, WriterBatch, WriterBatchError},
    PipelineSettings,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineState {
    #[default]
    Idle,
    Producing,
    Draining,
    Cancelling,
    Done,
}

/// Outcome of one pipeline run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Producer tasks started, one per batch.
    pub batches: usize,
    /// Rows enqueued by producers that succeeded.
    pub rows: usize,
    /// Records the sink accepted.
    pub records: usize,
    /// Records the sink already held.
    pub skipped: usize,
    /// Items whose write failed.
    pub failed_writes: usize,
    /// Producers that failed. Their rows were dropped.
    pub failures: Vec<ReaderBatchError>,
    pub cancelled: bool,
    /// Last state the run reached.
    pub state: PipelineState,
}

impl BatchReport {
    pub fn malformed(&self) -> usize {
        self.failures.iter().filter(|why| why.is_malformed()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.failed_writes == 0 && !self.cancelled
    }

    fn add_consumer(&mut self, stats: ConsumerStats) {
        self.records += stats.written;
        self.skipped += stats.skipped;
        self.failed_writes += stats.failed;
    }
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.batches += other.batches;
        self.rows += other.rows;
        self.records += other.records;
        self.skipped += other.skipped;
        self.failed_writes += other.failed_writes;
        self.failures.extend(other.failures);
        self.cancelled |= other.cancelled;
        self.state = other.state;
    }
}

/// Runs one reader against one writer through a bounded queue.
pub struct BatchManager<R, W>
where
    R: ReaderBatch,
    W: WriterBatch<Item = R::Item>,
{
    reader: R,
    writer: Arc<W>,
    settings: PipelineSettings,
    cancel: CancellationToken,
    state: PipelineState,
}

impl<R, W> BatchManager<R, W>
where
    R: ReaderBatch,
    W: WriterBatch<Item = R::Item>,
{
    pub fn new(reader: R, writer: Arc<W>, settings: &PipelineSettings) -> Self {
        Self {
            reader,
            writer,
            settings: settings.clone(),
            cancel: CancellationToken::new(),
            state: PipelineState::Idle,
        }
    }

    /// Ties the run to `cancel`. Cancelling it stops producers that have not
    /// enqueued yet and consumers that are idle.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Starts all producers and consumers, waits for the producers, waits for
    /// the queue to drain and then stops the consumers it started. Producer
    /// failures end up in the report; only a failing
    /// [`WriterBatch::finish`] fails the run.
    pub async fn run(mut self) -> Result<BatchReport, WriterBatchError> {
        let queue = WorkQueue::bounded(self.settings.queue_capacity);
        let consumer_cancel = self.cancel.child_token();
        let mut report = BatchReport::default();

        self.transition(PipelineState::Producing);
        let producers = self.reader.register(&queue, &self.cancel);
        let consumers = writer::register(
            &self.writer,
            &queue,
            self.settings.consumers,
            &consumer_cancel,
        );
        report.batches = producers.len();
        info!(
            "started {} producers and {} consumers",
            producers.len(),
            consumers.len()
        );

        for result in join_all(producers).await {
            match result {
                Ok(Ok(rows)) => report.rows += rows,
                Ok(Err(why)) => report.failures.push(why),
                Err(why) if why.is_cancelled() => {}
                Err(why) => report.failures.push(ReaderBatchError::Panicked(why.to_string())),
            }
        }

        self.transition(PipelineState::Draining);
        tokio::select! {
            _ = queue.join() => {}
            _ = self.cancel.cancelled() => {
                warn!("run cancelled with {} unfinished items", queue.unfinished());
            }
        }

        self.transition(PipelineState::Cancelling);
        consumer_cancel.cancel();
        for result in join_all(consumers).await {
            match result {
                Ok(stats) => report.add_consumer(stats),
                Err(why) if why.is_cancelled() => {}
                Err(why) => error!("consumer task failed: {why}"),
            }
        }

        self.transition(PipelineState::Done);
        self.writer.finish().await?;
        report.cancelled = self.cancel.is_cancelled();
        report.state = self.state;

        if report.failures.is_empty() {
            info!(
                "finished {} batches: {} records written, {} skipped",
                report.batches, report.records, report.skipped
            );
        } else {
            warn!(
                "finished {} batches: {} records written, {} skipped, {} batches failed ({} malformed)",
                report.batches,
                report.records,
                report.skipped,
                report.failures.len(),
                report.malformed()
            );
        }
        Ok(report)
    }
}
