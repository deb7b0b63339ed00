//! Registry of parties waiting for incoming frames.
//!
//! Entries are matched on `(dst_id, msg_id)` in registration order; the first
//! match handles the frame and the scan stops. Unmatched frames are dropped.
//!
//! The entry list is copy-on-write: `register` and `unregister` swap in a new
//! list under a short lock, while `dispatch` clones the current list pointer
//! and scans it lock-free. A scan therefore always sees one consistent
//! snapshot, and handlers never run with the lock held.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// Callback invoked with the payload of a matched frame.
pub type Handler = Box<dyn Fn(&[u8]) + Send + Sync>;

/// Token returned by [`DispatchRegistry::register`], used to remove the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

struct Entry {
    id: EntryId,
    dst_id: u8,
    msg_id: u8,
    handler: Handler,
}

type Snapshot = Arc<Vec<Arc<Entry>>>;

/// Concurrent set of dispatch entries shared by the receive path and callers.
pub struct DispatchRegistry {
    entries: Mutex<Snapshot>,
    next_id: AtomicU64,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append an entry for `(dst_id, msg_id)`.
    pub fn register<F>(&self, dst_id: u8, msg_id: u8, handler: F) -> EntryId
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(Entry {
            id,
            dst_id,
            msg_id,
            handler: Box::new(handler),
        });

        let mut current = self.lock();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(entry);
        *current = Arc::new(next);

        trace!(entry = id.0, dst_id, msg_id, "dispatch entry registered");
        id
    }

    /// Remove an entry. Returns false if it was not registered.
    pub fn unregister(&self, id: EntryId) -> bool {
        let mut current = self.lock();
        if !current.iter().any(|entry| entry.id == id) {
            return false;
        }

        let next: Vec<_> = current
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        *current = Arc::new(next);

        trace!(entry = id.0, "dispatch entry removed");
        true
    }

    /// Hand a verified frame's payload to the first matching entry.
    ///
    /// Returns true if a handler ran.
    pub fn dispatch(&self, dst_id: u8, msg_id: u8, payload: &[u8]) -> bool {
        let snapshot = self.snapshot();

        match snapshot
            .iter()
            .find(|entry| entry.dst_id == dst_id && entry.msg_id == msg_id)
        {
            Some(entry) => {
                (entry.handler)(payload);
                true
            }
            None => {
                trace!(dst_id, msg_id, len = payload.len(), "no waiter for frame");
                false
            }
        }
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.lock())
    }

    // Nothing user-supplied runs under this lock, so a poisoned list is still valid.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
