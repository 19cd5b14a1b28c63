//! Listener registry and synchronous dispatch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::listener::VehicleDataListener;

/// Shared handle to a registered listener. Registry identity is the `Arc`
/// allocation, compared with [`Arc::ptr_eq`].
pub type ListenerHandle = Arc<dyn VehicleDataListener>;

/// Ordered set of listeners with snapshot-then-iterate dispatch.
///
/// Registration and removal are idempotent and may happen concurrently with
/// an in-flight dispatch. Dispatch iterates a snapshot taken when the
/// dispatch starts, so a listener removed (or added) mid-dispatch may or may
/// not see that dispatch's callbacks. No stronger guarantee is made.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<ListenerHandle>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. A handle already present is not added twice.
    pub fn register(&self, listener: ListenerHandle) {
        let mut listeners = self.write_lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Removes a listener; no-op if it was never registered.
    pub fn unregister(&self, listener: &ListenerHandle) {
        self.write_lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    /// Invokes `notify` on every listener registered at the moment the call
    /// begins, in registration order. The lock is released before the first
    /// callback runs. A panicking listener is logged and skipped; remaining
    /// listeners are still notified.
    pub(crate) fn dispatch<F>(&self, notify: F)
    where
        F: Fn(&dyn VehicleDataListener),
    {
        let snapshot = self.read_lock().clone();
        for listener in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| notify(listener.as_ref()))).is_err() {
                warn!("listener panicked during dispatch; continuing with remaining listeners");
            }
        }
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, Vec<ListenerHandle>> {
        // Listener callbacks never run under the lock, so a poisoned lock
        // can only mean a panic between guard acquisition and drop inside
        // this module; the vector is still consistent.
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Vec<ListenerHandle>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
