//! Devtools: transition logging and action history.
//!
//! Both tools are store observers. They see every applied transition as
//! `(previous, action, next)` and never touch the state.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::reactive::Subscription;
use crate::store::{Action, ReducerStore};

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}

/// Logs every transition of a store through `tracing`.
///
/// Each transition gets an `action` span tagged with the action's tag, with
/// the previous state, the action and the next state logged as JSON inside
/// it.
pub struct StateLogger;

impl StateLogger {
    pub fn attach<S, A>(store: &ReducerStore<S, A>) -> Subscription
    where
        S: Clone + Send + Sync + Serialize + 'static,
        A: Action + Send + Serialize + 'static,
    {
        store.observe(|previous, action, next| {
            let span = tracing::info_span!("action", tag = action.tag());
            let _entered = span.enter();
            tracing::info!(state = %to_json(previous), "previous state");
            tracing::info!(action = %to_json(action), "action");
            tracing::info!(state = %to_json(next), "next state");
        })
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<S, A> {
    /// Position of this transition since recording started.
    pub sequence: u64,
    pub action: A,
    pub state: S,
}

struct HistoryInner<S, A> {
    entries: VecDeque<HistoryEntry<S, A>>,
    next_sequence: u64,
    /// State before the oldest retained entry.
    base: Option<S>,
}

/// A bounded log of the transitions applied to a store.
///
/// When full, the oldest entry is evicted and becomes the new replay base,
/// so [`replay`](ActionHistory::replay) keeps reproducing the latest state.
pub struct ActionHistory<S, A> {
    capacity: usize,
    inner: Arc<Mutex<HistoryInner<S, A>>>,
}

impl<S, A> ActionHistory<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action + Clone + Send + 'static,
{
    /// Create an empty history that keeps at most `capacity` entries.
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Arc::new(Mutex::new(HistoryInner {
                entries: VecDeque::new(),
                next_sequence: 0,
                base: None,
            })),
        }
    }

    /// Create a history sized by the store's config and start recording.
    pub fn attach(store: &ReducerStore<S, A>) -> (Self, Subscription) {
        let history = Self::new(store.config().history_capacity);
        let subscription = history.record_from(store);
        (history, subscription)
    }

    /// Record every transition of `store` until the subscription is dropped.
    pub fn record_from(&self, store: &ReducerStore<S, A>) -> Subscription {
        let inner = Arc::clone(&self.inner);
        let capacity = self.capacity;
        store.observe(move |previous, action, next| {
            let mut inner = inner.lock();
            if inner.base.is_none() && inner.entries.is_empty() {
                inner.base = Some(previous.clone());
            }
            if inner.entries.len() == capacity {
                if let Some(evicted) = inner.entries.pop_front() {
                    inner.base = Some(evicted.state);
                }
            }
            let sequence = inner.next_sequence;
            inner.next_sequence += 1;
            inner.entries.push_back(HistoryEntry {
                sequence,
                action: action.clone(),
                state: next.clone(),
            });
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry<S, A>> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    /// The recorded actions, oldest first.
    pub fn actions(&self) -> Vec<A> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|entry| entry.action.clone())
            .collect()
    }

    /// State before the oldest retained entry, once anything was recorded.
    pub fn base(&self) -> Option<S> {
        self.inner.lock().base.clone()
    }

    /// Forget all entries. Recording continues from the next transition.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.base = None;
    }

    /// Fold `reducer` over the retained actions, starting from the replay
    /// base. For a pure reducer the result equals the recorded latest state.
    ///
    /// Returns `None` when nothing has been recorded.
    pub fn replay<R>(&self, reducer: R) -> Option<S>
    where
        R: Fn(&S, &A) -> S,
    {
        let inner = self.inner.lock();
        let base = inner.base.clone()?;
        Some(
            inner
                .entries
                .iter()
                .fold(base, |state, entry| reducer(&state, &entry.action)),
        )
    }
}

impl<S, A> Debug for ActionHistory<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ActionHistory")
            .field("capacity", &self.capacity)
            .field("len", &inner.entries.len())
            .field("next_sequence", &inner.next_sequence)
            .finish()
    }
}
