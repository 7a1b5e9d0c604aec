//! Store configuration.
//!
//! Every field has a default, so an empty JSON object (or
//! `StoreConfig::default()`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for a [`ReducerStore`](crate::store::ReducerStore) and the
/// devtools attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of actions that may be queued by dispatches issued
    /// while a notification pass is running. Zero rejects every re-entrant
    /// dispatch.
    pub max_queued_dispatches: usize,

    /// Number of transitions kept by an
    /// [`ActionHistory`](crate::devtools::ActionHistory).
    pub history_capacity: usize,
}

impl StoreConfig {
    pub const DEFAULT_MAX_QUEUED_DISPATCHES: usize = 64;
    pub const DEFAULT_HISTORY_CAPACITY: usize = 128;

    /// Parse and validate a configuration from JSON.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_queued_dispatches(mut self, limit: usize) -> Self {
        self.max_queued_dispatches = limit;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "history_capacity",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_queued_dispatches: Self::DEFAULT_MAX_QUEUED_DISPATCHES,
            history_capacity: Self::DEFAULT_HISTORY_CAPACITY,
        }
    }
}
