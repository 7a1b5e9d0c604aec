//! Actions.
//!
//! Actions are ordinary Rust values, usually one enum per state domain with a
//! variant per transition. The [`Action`] trait only asks for a stable tag so
//! that logs and errors can name the action that caused them.

use serde::{Deserialize, Serialize};

/// A value describing an intended state transition.
pub trait Action {
    /// Stable, human readable name of this action kind, e.g. `UPDATE_NAME`.
    fn tag(&self) -> &str;
}

/// An untyped action as it arrives from outside the program.
///
/// Deserializes from `{ "type": "UPDATE_NAME", "payload": "Ann" }`. The
/// payload is optional. Reducers over raw actions must fall through to the
/// unchanged state for tags they do not recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl RawAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: impl Into<serde_json::Value>) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload.into()),
        }
    }

    /// The payload as a string, if it is one.
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_ref().and_then(serde_json::Value::as_str)
    }
}

impl Action for RawAction {
    fn tag(&self) -> &str {
        &self.kind
    }
}
