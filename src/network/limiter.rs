//! Admission gate
//!
//! Counting semaphore bounding how many connections are served at once.
//! Slots are the buffer of a bounded channel: acquiring sends a token,
//! releasing takes one back out.

use std::sync::Arc;

use crossbeam::channel::{self, select, Receiver, Sender};

use super::CancellationToken;

/// Bounds the number of simultaneously active connections
#[derive(Debug)]
pub struct ConnectionLimiter {
    slots_tx: Sender<()>,
    slots_rx: Receiver<()>,
}

impl ConnectionLimiter {
    /// Create a gate with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        let (slots_tx, slots_rx) = channel::bounded(capacity);
        Self { slots_tx, slots_rx }
    }

    /// Block until a slot frees up
    ///
    /// Returns `None` if `cancel` fires first.
    pub fn acquire(self: &Arc<Self>, cancel: &CancellationToken) -> Option<Permit> {
        if cancel.is_cancelled() {
            return None;
        }

        let slots = &self.slots_tx;
        let done = cancel.done();
        select! {
            send(slots, ()) -> res => res.ok().map(|()| self.permit()),
            recv(done) -> _ => None,
        }
    }

    /// Take a slot only if one is free right now
    #[cfg(test)]
    fn try_acquire(self: &Arc<Self>) -> Option<Permit> {
        self.slots_tx.try_send(()).ok().map(|()| self.permit())
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.slots_tx.len()
    }

    fn permit(self: &Arc<Self>) -> Permit {
        Permit {
            limiter: Arc::clone(self),
        }
    }
}

/// One held slot, released when dropped
#[derive(Debug)]
pub struct Permit {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        // One token is buffered per live permit, so this never comes up empty.
        let _ = self.limiter.slots_rx.try_recv();
    }
}
