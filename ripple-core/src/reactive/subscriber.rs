//! Subscriber identities and subscription handles.
//!
//! Listeners are removed by identity, never by value: every registration
//! gets a fresh [`SubscriberId`], and the [`Subscription`] handed back to the
//! caller removes exactly that registration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one listener or observer registration.
///
/// Two registrations of the same closure get different ids, which is what
/// lets [`StateCell::unsubscribe`](super::StateCell::unsubscribe) remove one
/// of them and keep the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(0);

impl SubscriberId {
    /// Allocate an id no other registration in this process has used.
    pub fn new() -> Self {
        Self(NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

type Remove = Box<dyn FnOnce(SubscriberId) + Send + Sync>;

/// Handle to a registered listener.
///
/// Dropping the handle unsubscribes the listener. Call [`detach`] to keep
/// the listener registered for as long as its source lives.
///
/// [`detach`]: Subscription::detach
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: SubscriberId,
    remove: Option<Remove>,
}

impl Subscription {
    pub(crate) fn new<F>(id: SubscriberId, remove: F) -> Self
    where
        F: FnOnce(SubscriberId) + Send + Sync + 'static,
    {
        Self {
            id,
            remove: Some(Box::new(remove)),
        }
    }

    /// Identity of the registered listener.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether this handle still owns a live registration.
    pub fn is_active(&self) -> bool {
        self.remove.is_some()
    }

    /// Remove the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove(self.id);
        }
    }

    /// Give up the handle without unsubscribing.
    pub fn detach(mut self) -> SubscriberId {
        self.remove = None;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
