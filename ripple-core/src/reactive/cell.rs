//! StateCell Implementation
//!
//! A StateCell is the fundamental observable primitive. It holds a single
//! value and an ordered list of listeners that are told about every write.
//!
//! # How StateCells Work
//!
//! 1. `set_state` replaces the value wholesale. Listeners never observe a
//!    partially updated value.
//!
//! 2. The listener list is snapshotted before the notification pass starts.
//!    Listeners registered during the pass are not invoked for that pass.
//!
//! 3. Before each invocation the listener is checked against the live list,
//!    so a listener removed by an earlier listener in the same pass is
//!    skipped.
//!
//! 4. A panicking listener is caught and reported. The remaining listeners
//!    still run and the write is not rolled back.
//!
//! # Locking
//!
//! The value and the listener list sit behind separate `parking_lot` locks.
//! The value is kept as an `Arc<T>` snapshot, so readers take a reference
//! and release the lock before any caller code runs. No lock is held while a
//! listener or a `with_state`/`update` closure runs; both are free to read
//! the cell, subscribe, unsubscribe, or write to it again.

use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use super::subscriber::{SubscriberId, Subscription};
use crate::error::{panic_message, ListenerError};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Outcome of one notification pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotifyReport {
    /// Number of listeners that were invoked, including ones that panicked.
    pub notified: usize,

    /// Listeners that panicked during the pass.
    pub failures: Vec<ListenerError>,
}

impl NotifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct CellInner<T> {
    id: u64,
    value: RwLock<Arc<T>>,
    listeners: Mutex<IndexMap<SubscriberId, Listener<T>>>,
}

/// An observable value of type `T`.
///
/// Cloning a `StateCell` produces another handle to the same value and
/// listener list.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::StateCell;
///
/// let count = StateCell::new(0);
/// let sub = count.subscribe(|value| println!("count is now {value}"));
///
/// count.set_state(5);
/// assert_eq!(count.get_state(), 5);
/// drop(sub);
/// ```
pub struct StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<CellInner<T>>,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                id: next_cell_id(),
                value: RwLock::new(Arc::new(value)),
                listeners: Mutex::new(IndexMap::new()),
            }),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get a clone of the current value.
    pub fn get_state(&self) -> T {
        (*self.snapshot()).clone()
    }

    /// Shared handle to the current value.
    pub(crate) fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.inner.value.read())
    }

    /// Read the current value without cloning it.
    ///
    /// The closure sees the value as of the call. It runs without any lock
    /// held, so it may write to this cell.
    pub fn with_state<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.snapshot())
    }

    /// Replace the value and notify every listener, in subscription order.
    pub fn set_state(&self, value: T) -> NotifyReport {
        let value = Arc::new(value);
        *self.inner.value.write() = Arc::clone(&value);
        self.notify(&value)
    }

    /// Update the value using a function of the current value.
    ///
    /// This is a read followed by a write, not an atomic step: a write made
    /// from another thread in between is overwritten.
    pub fn update<F>(&self, f: F) -> NotifyReport
    where
        F: FnOnce(&T) -> T,
    {
        let next = self.with_state(f);
        self.set_state(next)
    }

    /// Register a listener for subsequent writes.
    ///
    /// The returned [`Subscription`] removes exactly this listener, even if a
    /// structurally identical closure is registered elsewhere.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.inner.listeners.lock().insert(id, Arc::new(listener));

        let weak: Weak<CellInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().shift_remove(&id);
            }
        })
    }

    /// Remove a listener by its ID. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.listeners.lock().shift_remove(&id).is_some()
    }

    /// Get the number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn notify(&self, value: &T) -> NotifyReport {
        let snapshot: Vec<(SubscriberId, Listener<T>)> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut report = NotifyReport::default();
        for (id, listener) in snapshot {
            if !self.inner.listeners.lock().contains_key(&id) {
                continue;
            }

            report.notified += 1;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(value))) {
                let failure = ListenerError {
                    subscriber: id,
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(cell = self.inner.id, error = %failure, "listener failed");
                report.failures.push(failure);
            }
        }
        report
    }
}

impl<T> Clone for StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for StateCell<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
