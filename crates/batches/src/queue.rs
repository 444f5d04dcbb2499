use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Notify};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is closed")]
    Closed,
    #[error("task_done called more times than items were put")]
    TooManyTaskDone,
}

/// Bounded multi-producer multi-consumer queue that tracks unfinished work.
///
/// Every successful [`put`](Self::put) must be matched by one
/// [`task_done`](Self::task_done) once the item has been handled;
/// [`join`](Self::join) resolves when no unfinished items remain. The queue
/// owns a sender of its own, so [`get`](Self::get) never observes a closed
/// channel and consumers run until they are cancelled.
pub struct WorkQueue<T> {
    sender: mpsc::Sender<T>,
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
    unfinished: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: Arc::clone(&self.receiver),
            unfinished: Arc::clone(&self.unfinished),
            drained: Arc::clone(&self.drained),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            unfinished: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
        }
    }

    /// Enqueues an item, suspending while the queue is full. Cancel-safe:
    /// an abandoned put neither enqueues nor counts the item.
    pub async fn put(&self, item: T) -> Result<(), QueueError> {
        let permit = self
            .sender
            .reserve()
            .await
            .map_err(|_| QueueError::Closed)?;
        self.unfinished.fetch_add(1, Ordering::SeqCst);
        permit.send(item);
        Ok(())
    }

    /// Waits for the next item. Cancel-safe: dropping the future never loses
    /// an item.
    pub async fn get(&self) -> Option<T> {
        self.receiver.lock().await.recv().await
    }

    /// Marks one previously dequeued item as handled.
    pub fn task_done(&self) -> Result<(), QueueError> {
        self.finish_one()
    }

    /// Resolves once every item put so far has been marked done.
    pub async fn join(&self) {
        loop {
            let drained = self.drained.notified();
            if self.unfinished.load(Ordering::SeqCst) == 0 {
                return;
            }
            drained.await;
        }
    }

    /// Items put but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::SeqCst)
    }

    fn finish_one(&self) -> Result<(), QueueError> {
        let previous = self
            .unfinished
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| QueueError::TooManyTaskDone)?;
        if previous == 1 {
            self.drained.notify_waiters();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn join_on_empty_queue_resolves() {
        let queue = WorkQueue::<u32>::bounded(4);
        timeout(Duration::from_secs(1), queue.join()).await.unwrap();
    }

    #[tokio::test]
    async fn join_waits_for_task_done() {
        let queue = WorkQueue::bounded(4);
        queue.put(1u32).await.unwrap();
        queue.put(2u32).await.unwrap();
        assert_eq!(queue.unfinished(), 2);

        assert_eq!(queue.get().await, Some(1));
        queue.task_done().unwrap();
        assert!(timeout(Duration::from_millis(50), queue.join()).await.is_err());

        assert_eq!(queue.get().await, Some(2));
        queue.task_done().unwrap();
        timeout(Duration::from_secs(1), queue.join()).await.unwrap();
    }

    #[tokio::test]
    async fn too_many_task_done() {
        let queue = WorkQueue::<u32>::bounded(1);
        assert_eq!(queue.task_done(), Err(QueueError::TooManyTaskDone));
    }

    #[tokio::test]
    async fn put_suspends_when_full() {
        let queue = WorkQueue::bounded(1);
        queue.put(1u32).await.unwrap();

        let blocked = timeout(Duration::from_millis(50), queue.put(2u32)).await;
        assert!(blocked.is_err());

        assert_eq!(queue.unfinished(), 1);
        assert_eq!(queue.get().await, Some(1));
    }
}
