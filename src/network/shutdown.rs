//! Shutdown coordination
//!
//! Cooperative cancellation broadcast to every task plus a counter of
//! running tasks that shutdown drains against a deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};

/// Cancellation signal shared by the accept loop and all connections
///
/// Cancelling never interrupts a blocking call: tasks observe it at their
/// next checkpoint. The `done` channel is never sent on; it disconnects
/// when the token is cancelled, which wakes any `select!` or timed wait.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (trigger, done) = channel::bounded(0);
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Signal cancellation. Calling it again is a no-op.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Channel that becomes disconnected once cancelled
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }

    /// Sleep up to `timeout`, waking early on cancellation
    ///
    /// Returns true if the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_cancelled(),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts running server tasks so shutdown can wait for them
#[derive(Debug, Default)]
pub struct TaskTracker {
    running: Mutex<usize>,
    idle: Condvar,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running task. It stays registered until the guard drops.
    pub fn track(self: &Arc<Self>) -> TaskGuard {
        *self.running.lock() += 1;
        TaskGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Number of tasks currently registered
    pub fn running(&self) -> usize {
        *self.running.lock()
    }

    /// Block until no task is running or `timeout` elapses
    ///
    /// Returns true if every task finished in time.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut running = self.running.lock();

        while *running > 0 {
            if self.idle.wait_until(&mut running, deadline).timed_out() {
                return *running == 0;
            }
        }
        true
    }

    fn finish(&self) {
        let mut running = self.running.lock();
        *running -= 1;
        if *running == 0 {
            self.idle.notify_all();
        }
    }
}

/// Keeps a task registered with its tracker
#[derive(Debug)]
pub struct TaskGuard {
    tracker: Arc<TaskTracker>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}
