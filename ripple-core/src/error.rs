//! Error Types
//!
//! Every failure the kernel can observe is represented here. Only reducer
//! failures ever reach the caller of `dispatch` as an `Err`; listener,
//! observer, effect and cleanup failures are isolated, logged, and handed
//! back inside the report of the operation that triggered them.

use std::any::Any;

use thiserror::Error;

use crate::reactive::SubscriberId;

/// A reducer refused or failed to compute the next state.
///
/// When a reducer fails the store keeps its previous state and no
/// subscriber is notified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReducerError {
    /// The reducer returned an error for this action.
    #[error("reducer rejected action `{tag}`: {reason}")]
    Rejected { tag: String, reason: String },

    /// The reducer panicked while handling this action.
    #[error("reducer panicked on action `{tag}`: {message}")]
    Panicked { tag: String, message: String },
}

impl ReducerError {
    /// Build a rejection for the action with the given tag.
    pub fn rejected(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Tag of the action that failed.
    pub fn tag(&self) -> &str {
        match self {
            Self::Rejected { tag, .. } | Self::Panicked { tag, .. } => tag,
        }
    }
}

/// A listener or observer panicked during a notification pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber {subscriber:?} panicked: {message}")]
pub struct ListenerError {
    pub subscriber: SubscriberId,
    pub message: String,
}

/// An effect callback or its cleanup panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("effect callback panicked: {message}")]
    Callback { message: String },

    #[error("effect cleanup panicked: {message}")]
    Cleanup { message: String },
}

/// Errors returned by [`ReducerStore::dispatch`](crate::store::ReducerStore::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Reducer(#[from] ReducerError),

    /// Too many actions were dispatched from inside notification passes.
    #[error("dispatch queue is full ({limit} pending), dropped action `{tag}`")]
    QueueOverflow { limit: usize, tag: String },

    /// A reducer tried to dispatch while computing the next state.
    #[error("action `{tag}` dispatched from inside a reducer")]
    DispatchInReducer { tag: String },
}

/// Errors produced while loading a [`StoreConfig`](crate::config::StoreConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse store config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid store config: `{field}` {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Render a panic payload as a message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
