//! ReducerStore Implementation
//!
//! A ReducerStore owns a [`StateCell`] and a reducer fixed for the store's
//! whole life. The only way to change the state is to dispatch an action.
//!
//! # How Dispatch Works
//!
//! 1. The reducer computes `next = reducer(&current, &action)`. A reducer
//!    error or panic is returned to the caller and the state is untouched.
//!
//! 2. Observers receive `(previous, action, next)`.
//!
//! 3. The cell takes the new value and notifies its listeners exactly once,
//!    before `dispatch` returns.
//!
//! # Re-entrant Dispatch
//!
//! A listener or observer may dispatch while a notification pass is running.
//! Such actions are queued and applied, in order, once the current pass has
//! finished, each one with its own complete reduce and notify pass. One outer
//! dispatch accepts at most [`StoreConfig::max_queued_dispatches`] queued
//! actions in total, so a listener that always re-dispatches cannot loop
//! forever. A reducer that dispatches gets [`StoreError::DispatchInReducer`].
//!
//! The thread running a dispatch owns the store until its queue is drained.
//! A dispatch from any other thread in that window joins the same queue and
//! returns at once with [`DispatchReport::queued`] set, so a listener that
//! waits on another thread's dispatch cannot deadlock. The store's locks
//! only guard bookkeeping; none is held while the reducer, an observer or a
//! listener runs.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::action::Action;
use crate::config::StoreConfig;
use crate::error::{panic_message, ListenerError, ReducerError, StoreError};
use crate::reactive::{StateCell, SubscriberId, Subscription};

type BoxedReducer<S, A> = Box<dyn Fn(&S, &A) -> Result<S, ReducerError> + Send + Sync>;
type Observer<S, A> = Arc<dyn Fn(&S, &A, &S) + Send + Sync>;

/// Where the store currently is within a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchPhase {
    Idle,
    Reducing,
    Notifying,
}

/// Per-store dispatch bookkeeping.
struct DispatchState<A> {
    /// Thread running the outer dispatch, if any.
    owner: Option<ThreadId>,
    phase: DispatchPhase,
    /// Actions queued since the outer dispatch started.
    accepted: usize,
    queue: VecDeque<A>,
}

/// Outcome of a successful [`ReducerStore::dispatch`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Transitions applied by this call: the dispatched action plus any
    /// actions queued by its listeners.
    pub applied: usize,

    /// The action was queued behind a running dispatch and will be applied
    /// by it.
    pub queued: bool,

    /// Listener and observer invocations across all applied transitions.
    pub notified: usize,

    /// Listeners and observers that panicked.
    pub listener_failures: Vec<ListenerError>,

    /// Queued actions that could not be applied.
    pub queued_failures: Vec<StoreError>,
}

impl DispatchReport {
    fn queued() -> Self {
        Self {
            queued: true,
            ..Self::default()
        }
    }

    fn absorb(&mut self, other: DispatchReport) {
        self.applied += other.applied;
        self.notified += other.notified;
        self.listener_failures.extend(other.listener_failures);
        self.queued_failures.extend(other.queued_failures);
    }

    /// No listener, observer or queued action failed.
    pub fn is_clean(&self) -> bool {
        self.listener_failures.is_empty() && self.queued_failures.is_empty()
    }
}

struct StoreInner<S, A>
where
    S: Clone + Send + Sync + 'static,
{
    cell: StateCell<S>,
    reducer: BoxedReducer<S, A>,
    observers: Mutex<IndexMap<SubscriberId, Observer<S, A>>>,
    dispatch: Mutex<DispatchState<A>>,
    config: StoreConfig,
}

/// A state container whose state only changes through a reducer.
///
/// Cloning a `ReducerStore` produces another handle to the same store.
///
/// # Example
///
/// ```rust
/// use ripple_core::form::{form_reducer, update_name, FormState};
/// use ripple_core::store::ReducerStore;
///
/// let store = ReducerStore::new(FormState::default(), form_reducer);
/// store.dispatch(update_name("Ann")).unwrap();
/// assert_eq!(store.get_state().name, "Ann");
/// ```
pub struct ReducerStore<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action + Send + 'static,
{
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A> ReducerStore<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action + Send + 'static,
{
    /// Create a store with an infallible reducer and the default config.
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        Self::with_config(initial, reducer, StoreConfig::default())
    }

    /// Create a store with an infallible reducer.
    pub fn with_config<R>(initial: S, reducer: R, config: StoreConfig) -> Self
    where
        R: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        Self::from_boxed(
            initial,
            Box::new(move |state: &S, action: &A| Ok(reducer(state, action))),
            config,
        )
    }

    /// Create a store whose reducer may reject actions.
    pub fn fallible<R>(initial: S, reducer: R, config: StoreConfig) -> Self
    where
        R: Fn(&S, &A) -> Result<S, ReducerError> + Send + Sync + 'static,
    {
        Self::from_boxed(initial, Box::new(reducer), config)
    }

    fn from_boxed(initial: S, reducer: BoxedReducer<S, A>, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                cell: StateCell::new(initial),
                reducer,
                observers: Mutex::new(IndexMap::new()),
                dispatch: Mutex::new(DispatchState {
                    owner: None,
                    phase: DispatchPhase::Idle,
                    accepted: 0,
                    queue: VecDeque::new(),
                }),
                config,
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn get_state(&self) -> S {
        self.inner.cell.get_state()
    }

    /// Read the current state without cloning it.
    ///
    /// The closure runs on a snapshot with no lock held, so it may dispatch.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.inner.cell.with_state(f)
    }

    /// Register a listener that receives the new state after every dispatch.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.inner.cell.subscribe(listener)
    }

    /// Remove a listener by its ID.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.cell.unsubscribe(id)
    }

    /// Register an observer that receives `(previous, action, next)` for
    /// every applied transition, before ordinary listeners run.
    ///
    /// Observers are for logging and devtools. They must not mutate state;
    /// a dispatch issued from an observer is queued like one from a listener.
    pub fn observe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&S, &A, &S) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.inner.observers.lock().insert(id, Arc::new(observer));

        let weak: Weak<StoreInner<S, A>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.observers.lock().shift_remove(&id);
            }
        })
    }

    /// Number of registered listeners, not counting observers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.cell.subscriber_count()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Number of actions waiting behind the running dispatch.
    pub fn pending(&self) -> usize {
        self.inner.dispatch.lock().queue.len()
    }

    /// Apply an action.
    ///
    /// On success every listener has seen the new state by the time this
    /// returns. On a reducer error the state is unchanged and no listener
    /// runs. Actions that arrive while this call is running, from its own
    /// listeners or from other threads, are applied before it returns; their
    /// failures are collected in [`DispatchReport::queued_failures`].
    pub fn dispatch(&self, action: A) -> Result<DispatchReport, StoreError> {
        {
            let mut state = self.inner.dispatch.lock();
            let current = thread::current().id();
            let owner = state.owner;
            match owner {
                Some(owner) if owner == current && state.phase == DispatchPhase::Reducing => {
                    return Err(StoreError::DispatchInReducer {
                        tag: action.tag().to_string(),
                    })
                }
                Some(_) => return self.enqueue(&mut state, action),
                None => {
                    state.owner = Some(current);
                    state.accepted = 0;
                }
            }
        }

        let mut outcome = self.apply(action);
        while let Some(next) = self.next_queued() {
            match self.apply(next) {
                Ok(applied) => {
                    if let Ok(report) = &mut outcome {
                        report.absorb(applied);
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "queued dispatch failed");
                    if let Ok(report) = &mut outcome {
                        report.queued_failures.push(err);
                    }
                }
            }
        }
        outcome
    }

    fn enqueue(&self, state: &mut DispatchState<A>, action: A) -> Result<DispatchReport, StoreError> {
        let limit = self.inner.config.max_queued_dispatches;
        if state.accepted >= limit {
            tracing::warn!(tag = action.tag(), limit, "dispatch queue full");
            return Err(StoreError::QueueOverflow {
                limit,
                tag: action.tag().to_string(),
            });
        }

        state.accepted += 1;
        tracing::debug!(tag = action.tag(), depth = state.queue.len() + 1, "dispatch queued");
        state.queue.push_back(action);
        Ok(DispatchReport::queued())
    }

    /// Pop the next queued action, or give up ownership when none is left.
    fn next_queued(&self) -> Option<A> {
        let mut state = self.inner.dispatch.lock();
        let next = state.queue.pop_front();
        if next.is_none() {
            state.owner = None;
            state.phase = DispatchPhase::Idle;
        }
        next
    }

    fn set_phase(&self, phase: DispatchPhase) {
        self.inner.dispatch.lock().phase = phase;
    }

    fn apply(&self, action: A) -> Result<DispatchReport, StoreError> {
        let snapshot = self.inner.cell.snapshot();
        let previous: &S = &snapshot;

        self.set_phase(DispatchPhase::Reducing);
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.inner.reducer)(previous, &action)));
        self.set_phase(DispatchPhase::Idle);

        let next = match outcome {
            Ok(Ok(next)) => next,
            Ok(Err(err)) => return Err(err.into()),
            Err(payload) => {
                let err = ReducerError::Panicked {
                    tag: action.tag().to_string(),
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(error = %err, "reducer failed");
                return Err(err.into());
            }
        };

        tracing::debug!(tag = action.tag(), "dispatch applied");

        self.set_phase(DispatchPhase::Notifying);
        let mut report = DispatchReport {
            applied: 1,
            ..DispatchReport::default()
        };
        self.notify_observers(previous, &action, &next, &mut report);
        let notified = self.inner.cell.set_state(next);
        self.set_phase(DispatchPhase::Idle);

        report.notified += notified.notified;
        report.listener_failures.extend(notified.failures);
        Ok(report)
    }

    fn notify_observers(&self, previous: &S, action: &A, next: &S, report: &mut DispatchReport) {
        let snapshot: Vec<(SubscriberId, Observer<S, A>)> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect();

        for (id, observer) in snapshot {
            if !self.inner.observers.lock().contains_key(&id) {
                continue;
            }

            report.notified += 1;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer(previous, action, next)))
            {
                let failure = ListenerError {
                    subscriber: id,
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(tag = action.tag(), error = %failure, "observer failed");
                report.listener_failures.push(failure);
            }
        }
    }
}

impl<S, A> Clone for ReducerStore<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action + Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> Debug for ReducerStore<S, A>
where
    S: Clone + Send + Sync + Debug + 'static,
    A: Action + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducerStore")
            .field("state", &self.get_state())
            .field("subscriber_count", &self.subscriber_count())
            .field("pending", &self.pending())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
