//! Bounded work queue for heavyweight render tasks.
//!
//! The queue caps how many tasks run at once. Tasks are admitted strictly
//! in arrival order: a single dispatcher takes them from a FIFO channel and
//! acquires a semaphore permit before spawning each one.
//!
//! ```text
//! enqueue() ──► [ FIFO channel ] ──► dispatcher ──► permit ──► tokio::spawn(task)
//!                                        │                        │
//!                                        └──── waits while ───────┘
//!                                             `limit` tasks run
//! ```
//!
//! There are no priorities and no cancellation: once enqueued, a task runs
//! to completion even if its [`TaskHandle`] is dropped. The queue knows
//! nothing about cache keys, so it can throttle any bounded workload.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};

/// Default number of tasks allowed to run at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 4;

/// A queued unit of work. Receives its permit when admitted and releases
/// it before publishing the output.
type Job = Box<dyn FnOnce(RunningPermit) -> JobFuture + Send>;

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Error returned when a task ends without producing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The task panicked, or was dropped before it could run.
    #[error("Task ended without producing a result")]
    Abandoned,

    /// The dispatcher had stopped, so the task was never queued.
    #[error("Queue is closed")]
    Closed,
}

/// Counters shared between the queue, its dispatcher and running tasks.
#[derive(Debug, Default)]
struct QueueStats {
    queued: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicU64,
}

/// A running task's permit.
///
/// Counts against the queue's limit while held and updates the in-flight
/// counter when dropped, including when the task panics.
struct RunningPermit {
    _permit: OwnedSemaphorePermit,
    stats: Arc<QueueStats>,
}

impl RunningPermit {
    fn new(permit: OwnedSemaphorePermit, stats: Arc<QueueStats>) -> Self {
        stats.queued.fetch_sub(1, Ordering::Relaxed);
        let running = stats.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        stats.peak_in_flight.fetch_max(running, Ordering::Relaxed);
        Self {
            _permit: permit,
            stats,
        }
    }
}

impl Drop for RunningPermit {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.stats.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fixed-concurrency FIFO work queue.
///
/// Must be created inside a Tokio runtime; the dispatcher runs as a
/// background task until the queue is dropped and its backlog drained.
#[derive(Debug)]
pub struct RenderQueue {
    sender: mpsc::UnboundedSender<Job>,
    stats: Arc<QueueStats>,
    limit: usize,
    label: String,
}

impl RenderQueue {
    /// Creates a queue running at most `limit` tasks at once.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn new(limit: usize, label: impl Into<String>) -> Self {
        assert!(limit > 0, "limit must be > 0");

        let label: String = label.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(QueueStats::default());

        info!(limit, label = %label, "Created render queue");

        tokio::spawn(dispatch(
            receiver,
            Arc::new(Semaphore::new(limit)),
            Arc::clone(&stats),
            label.clone(),
        ));

        Self {
            sender,
            stats,
            limit,
            label,
        }
    }

    /// Creates a queue with [`DEFAULT_CONCURRENCY_LIMIT`].
    pub fn with_defaults(label: impl Into<String>) -> Self {
        Self::new(DEFAULT_CONCURRENCY_LIMIT, label)
    }

    /// Adds a task to the back of the queue.
    ///
    /// The returned handle resolves exactly once with the task's output.
    /// Dropping it does not cancel the task.
    pub fn enqueue<F>(&self, task: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move |running: RunningPermit| -> JobFuture {
            Box::pin(async move {
                let output = task.await;
                // Counters and the slot settle before the handle resolves.
                drop(running);
                let _ = tx.send(output);
            })
        });

        self.stats.queued.fetch_add(1, Ordering::Relaxed);
        if self.sender.send(job).is_err() {
            self.stats.queued.fetch_sub(1, Ordering::Relaxed);
            debug!(label = %self.label, "Rejected task, dispatcher stopped");
            return TaskHandle { rx: None };
        }

        TaskHandle { rx: Some(rx) }
    }

    /// Enqueues a task and waits for its output.
    pub async fn run<F>(&self, task: F) -> Result<F::Output, QueueError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.enqueue(task).await
    }

    /// Returns the concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the label for this queue.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the number of tasks waiting to start.
    pub fn queued(&self) -> usize {
        self.stats.queued.load(Ordering::Relaxed)
    }

    /// Returns the number of tasks currently running.
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::Relaxed)
    }

    /// Returns the highest number of tasks that ever ran at once.
    pub fn peak_in_flight(&self) -> usize {
        self.stats.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Returns the number of tasks that finished running.
    pub fn completed(&self) -> u64 {
        self.stats.completed.load(Ordering::Relaxed)
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    semaphore: Arc<Semaphore>,
    stats: Arc<QueueStats>,
    label: String,
) {
    while let Some(job) = receiver.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let running = RunningPermit::new(permit, Arc::clone(&stats));
        tokio::spawn(job(running));
    }
    debug!(label = %label, "Render queue dispatcher stopped");
}

/// Resolves with the output of an enqueued task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    /// `None` when the queue refused the task.
    rx: Option<oneshot::Receiver<T>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.rx.as_mut() {
            Some(rx) => Pin::new(rx)
                .poll(cx)
                .map(|result| result.map_err(|_| QueueError::Abandoned)),
            None => Poll::Ready(Err(QueueError::Closed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_enqueue_returns_output() {
        let queue = RenderQueue::new(2, "test");
        let handle = queue.enqueue(async { 6 * 7 });
        assert_eq!(handle.await, Ok(42));
        assert_eq!(queue.limit(), 2);
        assert_eq!(queue.label(), "test");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_limit() {
        let queue = RenderQueue::new(3, "test");
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let running = Arc::clone(&running);
                let max_seen = Arc::clone(&max_seen);
                queue.enqueue(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) <= 3);
        assert!(queue.peak_in_flight() <= 3);
        assert_eq!(queue.completed(), 12);
    }

    #[tokio::test]
    async fn test_tasks_start_in_arrival_order() {
        let queue = RenderQueue::new(1, "test");
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let order = Arc::new(Mutex::new(Vec::new()));

        // Occupy the only slot until every other task is queued.
        let blocker = queue.enqueue(async move {
            let _ = gate_rx.await;
        });

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let order = Arc::clone(&order);
                queue.enqueue(async move {
                    order.lock().unwrap().push(i);
                })
            })
            .collect();

        gate_tx.send(()).unwrap();
        blocker.await.unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let queue = RenderQueue::new(1, "test");
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        drop(queue.enqueue(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
        }));

        // A later task only runs after the first one finished.
        queue.run(async {}).await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_task_is_abandoned_and_frees_slot() {
        let queue = RenderQueue::new(1, "test");

        let result = queue
            .enqueue(async {
                panic!("boom");
            })
            .await;
        assert_eq!(result, Err::<(), _>(QueueError::Abandoned));

        assert_eq!(queue.run(async { "still running" }).await, Ok("still running"));
        assert_eq!(queue.in_flight(), 0);
    }

    #[test]
    fn test_enqueue_after_dispatcher_stopped_is_closed() {
        let first = tokio::runtime::Runtime::new().unwrap();
        let queue = first.block_on(async { RenderQueue::new(1, "test") });
        // Shutting the runtime down drops the dispatcher.
        drop(first);

        let second = tokio::runtime::Runtime::new().unwrap();
        let result = second.block_on(queue.run(async { 1 }));
        assert_eq!(result, Err(QueueError::Closed));
        assert_eq!(queue.queued(), 0);
    }

    #[tokio::test]
    async fn test_counters_settle_before_handle_resolves() {
        let queue = RenderQueue::new(2, "test");
        let handles: Vec<_> = (0..6)
            .map(|_| queue.enqueue(tokio::time::sleep(Duration::from_millis(5))))
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            handle.await.unwrap();
            assert!(queue.completed() > i as u64);
        }

        assert_eq!(queue.completed(), 6);
        assert_eq!(queue.in_flight(), 0);
        assert_eq!(queue.queued(), 0);
    }

    #[tokio::test]
    async fn test_counters_settle() {
        let queue = RenderQueue::with_defaults("test");
        for _ in 0..8 {
            queue.run(async {}).await.unwrap();
        }
        assert_eq!(queue.queued(), 0);
        assert_eq!(queue.in_flight(), 0);
        assert_eq!(queue.limit(), DEFAULT_CONCURRENCY_LIMIT);
    }

    #[test]
    #[should_panic(expected = "limit must be > 0")]
    fn test_zero_limit_panics() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let _ = RenderQueue::new(0, "test");
        });
    }
}
