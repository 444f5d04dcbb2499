use std::{ops::AddAssign, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{database::DatabaseError, queue::WorkQueue};

#[derive(Debug, Error)]
pub enum WriterBatchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Records handled by a single [`WriterBatch::consume`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub written: usize,
    /// Records that were already stored.
    pub skipped: usize,
}

impl WriteOutcome {
    pub fn written(written: usize) -> Self {
        Self {
            written,
            skipped: 0,
        }
    }
}

/// What one consumer task did before it was cancelled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub items: usize,
    pub written: usize,
    pub skipped: usize,
    /// Items whose write failed with something other than a duplicate.
    pub failed: usize,
}

impl AddAssign for ConsumerStats {
    fn add_assign(&mut self, other: Self) {
        self.items += other.items;
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// A sink for pipeline items. `consume` is called concurrently by every
/// consumer task, so implementations either pool their resource or
/// serialize internally.
#[async_trait]
pub trait WriterBatch: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn consume(&self, item: Self::Item) -> Result<WriteOutcome, WriterBatchError>;

    /// Called once after all consumers have stopped.
    async fn finish(&self) -> Result<(), WriterBatchError> {
        Ok(())
    }
}

pub type Consumer = JoinHandle<ConsumerStats>;

/// Starts `consumers` tasks that drain `queue` into `writer` until `cancel`
/// fires. An item that has been dequeued is always handled and marked done
/// before the consumer looks at the token again.
pub fn register<W: WriterBatch>(
    writer: &Arc<W>,
    queue: &WorkQueue<W::Item>,
    consumers: usize,
    cancel: &CancellationToken,
) -> Vec<Consumer> {
    (1..=consumers.max(1))
        .map(|id| {
            tokio::spawn(consume_until_cancelled(
                id,
                Arc::clone(writer),
                queue.clone(),
                cancel.clone(),
            ))
        })
        .collect()
}

async fn consume_until_cancelled<W: WriterBatch>(
    id: usize,
    writer: Arc<W>,
    queue: WorkQueue<W::Item>,
    cancel: CancellationToken,
) -> ConsumerStats {
    let mut stats = ConsumerStats::default();
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = queue.get() => item,
        };
        let Some(item) = item else {
            break;
        };
        stats.items += 1;

        match AssertUnwindSafe(writer.consume(item)).catch_unwind().await {
            Ok(Ok(outcome)) => {
                stats.written += outcome.written;
                stats.skipped += outcome.skipped;
            }
            Ok(Err(why)) => {
                error!("consumer {id}: write failed: {why}");
                stats.failed += 1;
            }
            Err(why) => {
                error!("consumer {id}: writer panicked: {:?}", why);
                stats.failed += 1;
            }
        }

        if let Err(why) = queue.task_done() {
            error!("consumer {id}: {why}");
        }
    }
    debug!("consumer {id} stopped after {} items", stats.items);
    stats
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use tokio::time::timeout;

    use super::*;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl WriterBatch for Collect {
        type Item = u32;

        async fn consume(&self, item: u32) -> Result<WriteOutcome, WriterBatchError> {
            if item == 13 {
                return Err(std::io::Error::other("unlucky").into());
            }
            self.seen.lock().unwrap().push(item);
            Ok(WriteOutcome::written(1))
        }
    }

    #[tokio::test]
    async fn failed_write_still_marks_item_done() {
        let queue = WorkQueue::bounded(8);
        for item in [1, 13, 2] {
            queue.put(item).await.unwrap();
        }
        let writer = Arc::new(Collect::default());
        let cancel = CancellationToken::new();
        let consumers = register(&writer, &queue, 1, &cancel);

        timeout(Duration::from_secs(1), queue.join()).await.unwrap();
        cancel.cancel();

        let mut total = ConsumerStats::default();
        for consumer in consumers {
            total += consumer.await.unwrap();
        }
        assert_eq!(total.items, 3);
        assert_eq!(total.written, 2);
        assert_eq!(total.failed, 1);
        assert_eq!(*writer.seen.lock().unwrap(), vec![1, 2]);
    }
}
