use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;

/// One-shot slot a caller blocks on until its response arrives.
///
/// Only the first [`complete`](PendingWaiter::complete) stores a payload;
/// later calls are ignored.
#[derive(Debug, Default)]
pub struct PendingWaiter {
    slot: Mutex<Option<Bytes>>,
    ready: Condvar,
}

impl PendingWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` and wake the waiting caller.
    ///
    /// Returns false if the waiter had already completed.
    pub fn complete(&self, payload: &[u8]) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(Bytes::copy_from_slice(payload));
        drop(slot);
        self.ready.notify_all();
        true
    }

    /// Block until completed or `deadline` passes.
    pub fn wait_until(&self, deadline: Instant) -> Option<Bytes> {
        let mut slot = self.lock();
        loop {
            if let Some(payload) = slot.as_ref() {
                return Some(payload.clone());
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            slot = match self.ready.wait_timeout(slot, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Block until completed or `timeout` elapses.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Bytes> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(deadline),
            None => Some(self.wait()),
        }
    }

    /// Block until completed.
    pub fn wait(&self) -> Bytes {
        let mut slot = self.lock();
        loop {
            if let Some(payload) = slot.as_ref() {
                return payload.clone();
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Bytes>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
