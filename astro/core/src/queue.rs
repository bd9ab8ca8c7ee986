//! Animation Queue
//!
//! Serializes movement tasks so exactly one runs at a time. Supports
//! cancel-and-flush (`cancel_previous`) and debounce-merge (`debounce`),
//! where repeated requests inside the window collapse into the last one.
//!
//! # Cancellation
//!
//! Cancellation is cooperative. [`AnimationQueue::cancel_all`] drops pending
//! tasks, discards debounced requests that have not landed yet and flips the
//! in-flight task's [`CancelToken`]; the running task observes the token at
//! its next suspension point and winds down on its own.
//!
//! # Failure isolation
//!
//! Each task runs in its own tokio task. An error result or a panic is
//! logged and the queue moves on to the next pending task.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::character::EndState;
use crate::error::EngineResult;
use crate::geometry::Position;

/// Movement task identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a new unique task ID
    #[must_use]
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("move_{count}"))
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cooperative cancellation flag shared between the queue and a task
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One queued movement
#[derive(Clone, Debug)]
pub struct MovementTask {
    /// Identifier for log correlation
    pub id: TaskId,
    /// Where Astro should end up
    pub target: Position,
    /// Instant placement applied before the move starts
    pub start: Option<Position>,
    /// Skip the shrink phase
    pub skip_shrink: bool,
    /// Character state to request on arrival
    pub end_state: EndState,
    /// Cancellation flag
    pub token: CancelToken,
}

impl MovementTask {
    /// Create a task with default options
    #[must_use]
    pub fn new(target: Position) -> Self {
        Self {
            id: TaskId::generate(),
            target,
            start: None,
            skip_shrink: false,
            end_state: EndState::default(),
            token: CancelToken::new(),
        }
    }

    /// Jump to `start` without animation before moving
    #[must_use]
    pub fn with_start(mut self, start: Position) -> Self {
        self.start = Some(start);
        self
    }

    /// Skip the shrink phase
    #[must_use]
    pub fn with_skip_shrink(mut self, skip: bool) -> Self {
        self.skip_shrink = skip;
        self
    }

    /// Set the end state
    #[must_use]
    pub fn with_end_state(mut self, end_state: EndState) -> Self {
        self.end_state = end_state;
        self
    }

    /// Whether the task has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// How a task enters the queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnqueueOptions {
    /// Cancel the in-flight task and flush pending ones when the task lands
    pub cancel_previous: bool,
    /// Delay the push; a newer debounced request replaces this one
    pub debounce: Option<Duration>,
}

impl EnqueueOptions {
    /// Push immediately, keep existing work
    #[must_use]
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Cancel existing work
    #[must_use]
    pub fn cancelling() -> Self {
        Self {
            cancel_previous: true,
            debounce: None,
        }
    }

    /// Debounce the push
    #[must_use]
    pub fn debounced(window: Duration) -> Self {
        Self {
            cancel_previous: false,
            debounce: Some(window),
        }
    }

    /// Also cancel existing work when the task lands
    #[must_use]
    pub fn and_cancel_previous(mut self) -> Self {
        self.cancel_previous = true;
        self
    }
}

/// Executes one dequeued task
#[async_trait]
pub trait TaskRunner: Send + Sync + 'static {
    /// Run the task to completion or cancellation
    async fn run(&self, task: MovementTask) -> EngineResult<()>;
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<MovementTask>,
    current: Option<(TaskId, CancelToken)>,
    animating: bool,
    debounce_generation: u64,
    debounce_outstanding: usize,
    cancel_epoch: u64,
    delayed_outstanding: usize,
}

impl QueueState {
    fn is_busy(&self) -> bool {
        self.animating
            || !self.pending.is_empty()
            || self.debounce_outstanding > 0
            || self.delayed_outstanding > 0
    }

    fn cancel_everything(&mut self) -> usize {
        let flushed = self.pending.len();
        self.pending.clear();
        if let Some((_, token)) = &self.current {
            token.cancel();
        }
        flushed
    }
}

struct QueueInner {
    runner: Arc<dyn TaskRunner>,
    state: Mutex<QueueState>,
    idle: Notify,
}

impl QueueInner {
    fn notify_if_idle(&self) {
        if !self.state.lock().is_busy() {
            self.idle.notify_waiters();
        }
    }

    fn push(self: &Arc<Self>, task: MovementTask, cancel_previous: bool) {
        {
            let mut state = self.state.lock();
            if cancel_previous {
                let flushed = state.cancel_everything();
                if flushed > 0 || state.current.is_some() {
                    tracing::debug!(flushed, "Cancelled previous movement work");
                }
            }
            tracing::debug!(
                task_id = %task.id,
                target = %task.target,
                pending = state.pending.len(),
                "Movement queued"
            );
            state.pending.push_back(task);
        }
        self.pump();
    }

    fn pump(self: &Arc<Self>) {
        let task = {
            let mut state = self.state.lock();
            if state.animating {
                return;
            }
            let Some(task) = state.pending.pop_front() else {
                drop(state);
                self.notify_if_idle();
                return;
            };
            state.animating = true;
            state.current = Some((task.id.clone(), task.token.clone()));
            task
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let id = task.id.clone();
            let runner = Arc::clone(&inner.runner);
            let outcome = tokio::spawn(async move { runner.run(task).await }).await;

            match outcome {
                Ok(Ok(())) => tracing::debug!(task_id = %id, "Movement finished"),
                Ok(Err(e)) => tracing::warn!(task_id = %id, error = %e, "Movement failed"),
                Err(e) => tracing::error!(task_id = %id, error = %e, "Movement task panicked"),
            }

            {
                let mut state = inner.state.lock();
                state.animating = false;
                state.current = None;
            }
            inner.pump();
        });
    }
}

/// Serializing queue of movement tasks
///
/// Cheap to clone; clones share the same queue. Must be used from within a
/// tokio runtime.
#[derive(Clone)]
pub struct AnimationQueue {
    inner: Arc<QueueInner>,
}

impl std::fmt::Debug for AnimationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AnimationQueue")
            .field("animating", &state.animating)
            .field("pending", &state.pending.len())
            .field("debounce_outstanding", &state.debounce_outstanding)
            .finish()
    }
}

impl AnimationQueue {
    /// Create a queue that hands tasks to `runner`
    #[must_use]
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                runner,
                state: Mutex::new(QueueState::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Queue a task
    pub fn enqueue(&self, task: MovementTask, options: EnqueueOptions) {
        let window = match options.debounce {
            Some(window) if !window.is_zero() => window,
            _ => {
                self.inner.push(task, options.cancel_previous);
                return;
            }
        };

        let generation = {
            let mut state = self.inner.state.lock();
            state.debounce_generation += 1;
            state.debounce_outstanding += 1;
            state.debounce_generation
        };
        tracing::trace!(task_id = %task.id, window_ms = window.as_millis() as u64, "Movement debounced");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let latest = inner.state.lock().debounce_generation == generation;
            if latest {
                inner.push(task, options.cancel_previous);
            } else {
                tracing::trace!(task_id = %task.id, "Debounced movement superseded");
            }
            inner.state.lock().debounce_outstanding -= 1;
            inner.notify_if_idle();
        });
    }

    /// Queue a task once `delay` has passed
    ///
    /// The request counts as outstanding work while it waits and is dropped
    /// if [`cancel_all`](Self::cancel_all) runs in the meantime.
    pub fn enqueue_after(&self, delay: Duration, task: MovementTask, options: EnqueueOptions) {
        if delay.is_zero() {
            self.enqueue(task, options);
            return;
        }

        let epoch = {
            let mut state = self.inner.state.lock();
            state.delayed_outstanding += 1;
            state.cancel_epoch
        };

        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let live = queue.inner.state.lock().cancel_epoch == epoch;
            if live {
                queue.enqueue(task, options);
            } else {
                tracing::trace!(task_id = %task.id, "Delayed movement cancelled");
            }
            queue.inner.state.lock().delayed_outstanding -= 1;
            queue.inner.notify_if_idle();
        });
    }

    /// Drop pending, debounced and delayed tasks and cancel the in-flight one
    pub fn cancel_all(&self) {
        {
            let mut state = self.inner.state.lock();
            state.debounce_generation += 1;
            state.cancel_epoch += 1;
            let flushed = state.cancel_everything();
            tracing::debug!(
                flushed,
                in_flight = state.current.is_some(),
                "Cancelling all movement"
            );
        }
        self.inner.notify_if_idle();
    }

    /// Whether a task is executing
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.inner.state.lock().animating
    }

    /// Number of tasks waiting to run
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// ID of the executing task
    #[must_use]
    pub fn current_task(&self) -> Option<TaskId> {
        self.inner
            .state
            .lock()
            .current
            .as_ref()
            .map(|(id, _)| id.clone())
    }

    /// Whether anything is running, pending or waiting out a debounce window
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().is_busy()
    }

    /// Resolve once the queue has fully drained
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    /// Runner that records tasks and sleeps for a fixed time, honoring cancellation
    struct RecordingRunner {
        started: Mutex<Vec<Position>>,
        completed: Mutex<Vec<Position>>,
        cancelled: Mutex<Vec<Position>>,
        work: Duration,
    }

    impl RecordingRunner {
        fn new(work: Duration) -> Arc<Self> {
            Arc::new(Self {
                started: Mutex::new(Vec::new()),
                completed: Mutex::new(Vec::new()),
                cancelled: Mutex::new(Vec::new()),
                work,
            })
        }
    }

    #[async_trait]
    impl TaskRunner for RecordingRunner {
        async fn run(&self, task: MovementTask) -> EngineResult<()> {
            self.started.lock().push(task.target);
            tokio::time::sleep(self.work).await;
            if task.is_cancelled() {
                self.cancelled.lock().push(task.target);
            } else {
                self.completed.lock().push(task.target);
            }
            Ok(())
        }
    }

    fn at(x: f64) -> MovementTask {
        MovementTask::new(Position::new(x, 0.0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_run_serially_in_order() {
        let runner = RecordingRunner::new(Duration::from_millis(100));
        let queue = AnimationQueue::new(runner.clone());

        for x in [1.0, 2.0, 3.0] {
            queue.enqueue(at(x), EnqueueOptions::immediate());
        }
        assert!(queue.is_busy());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(queue.is_animating());
        assert_eq!(queue.pending_len(), 2);
        assert_eq!(runner.started.lock().len(), 1);

        queue.wait_idle().await;
        let xs: Vec<f64> = runner.completed.lock().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert!(!queue.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_previous_leaves_only_last() {
        let runner = RecordingRunner::new(Duration::from_millis(100));
        let queue = AnimationQueue::new(runner.clone());

        for x in 0..5 {
            queue.enqueue(at(f64::from(x)), EnqueueOptions::cancelling());
            tokio::task::yield_now().await;
        }
        queue.wait_idle().await;

        assert_eq!(*runner.completed.lock(), vec![Position::new(4.0, 0.0)]);
        assert_eq!(queue.pending_len(), 0);
        // Only the first task ever started before the burst finished; it was cancelled
        assert_eq!(*runner.cancelled.lock(), vec![Position::new(0.0, 0.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_to_last() {
        let runner = RecordingRunner::new(Duration::from_millis(10));
        let queue = AnimationQueue::new(runner.clone());
        let window = Duration::from_millis(150);

        for x in 0..6 {
            queue.enqueue(at(f64::from(x)), EnqueueOptions::debounced(window));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(queue.is_busy());
        queue.wait_idle().await;

        assert_eq!(*runner.started.lock(), vec![Position::new(5.0, 0.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_outside_window_runs_both() {
        let runner = RecordingRunner::new(Duration::from_millis(10));
        let queue = AnimationQueue::new(runner.clone());
        let window = Duration::from_millis(50);

        queue.enqueue(at(1.0), EnqueueOptions::debounced(window));
        tokio::time::sleep(Duration::from_millis(200)).await;
        queue.enqueue(at(2.0), EnqueueOptions::debounced(window));
        queue.wait_idle().await;

        assert_eq!(runner.completed.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_flushes_and_cancels() {
        let runner = RecordingRunner::new(Duration::from_millis(100));
        let queue = AnimationQueue::new(runner.clone());

        queue.enqueue(at(1.0), EnqueueOptions::immediate());
        queue.enqueue(at(2.0), EnqueueOptions::immediate());
        queue.enqueue(at(3.0), EnqueueOptions::debounced(Duration::from_millis(30)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        queue.cancel_all();
        assert_eq!(queue.pending_len(), 0);
        queue.wait_idle().await;

        assert_eq!(*runner.cancelled.lock(), vec![Position::new(1.0, 0.0)]);
        assert!(runner.completed.lock().is_empty());
        assert_eq!(runner.started.lock().len(), 1);
    }

    struct FlakyRunner {
        ran: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl TaskRunner for FlakyRunner {
        async fn run(&self, task: MovementTask) -> EngineResult<()> {
            self.ran.lock().push(task.target.x);
            if task.target.x < 0.0 {
                panic!("negative target");
            }
            if task.target.x == 0.0 {
                return Err(EngineError::TaskFailed("zero".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_never_stall_queue() {
        let runner = Arc::new(FlakyRunner {
            ran: Mutex::new(Vec::new()),
        });
        let queue = AnimationQueue::new(runner.clone());

        for x in [-1.0, 0.0, 1.0] {
            queue.enqueue(at(x), EnqueueOptions::immediate());
        }
        queue.wait_idle().await;

        assert_eq!(*runner.ran.lock(), vec![-1.0, 0.0, 1.0]);
        assert!(!queue.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_after_waits_and_honors_cancel() {
        let runner = RecordingRunner::new(Duration::from_millis(10));
        let queue = AnimationQueue::new(runner.clone());

        queue.enqueue_after(Duration::from_millis(300), at(1.0), EnqueueOptions::immediate());
        assert!(queue.is_busy());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(runner.started.lock().is_empty());
        queue.wait_idle().await;
        assert_eq!(*runner.completed.lock(), vec![Position::new(1.0, 0.0)]);

        queue.enqueue_after(Duration::from_millis(300), at(2.0), EnqueueOptions::immediate());
        queue.cancel_all();
        queue.wait_idle().await;
        assert_eq!(runner.started.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_wait_idle_on_empty_queue_returns() {
        let queue = AnimationQueue::new(RecordingRunner::new(Duration::ZERO));
        queue.wait_idle().await;
        assert!(queue.current_task().is_none());
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!shared.is_cancelled());
        token.cancel();
        assert!(shared.is_cancelled());
    }
}
