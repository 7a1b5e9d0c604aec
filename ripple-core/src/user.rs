//! The reference async domain: a user name and the profile fetched for it.
//!
//! Changing the name is expected to start a profile request from an effect
//! keyed on the name. The request's result comes back as [`UserAction::SetData`]
//! or [`UserAction::SetError`]. A request cancelled by the effect's cleanup
//! reports nothing, so a stale failure never overwrites the newer request's
//! outcome.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub name: String,
    pub data: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    SetName(String),
    SetData(Value),
    SetError(String),
}

impl Action for UserAction {
    fn tag(&self) -> &str {
        match self {
            UserAction::SetName(_) => "SET_NAME",
            UserAction::SetData(_) => "SET_DATA",
            UserAction::SetError(_) => "SET_ERROR",
        }
    }
}

/// Data and error are exclusive: setting one clears the other.
pub fn user_reducer(state: &UserState, action: &UserAction) -> UserState {
    match action {
        UserAction::SetName(name) => UserState {
            name: name.clone(),
            ..state.clone()
        },
        UserAction::SetData(data) => UserState {
            data: Some(data.clone()),
            error: None,
            ..state.clone()
        },
        UserAction::SetError(error) => UserState {
            data: None,
            error: Some(error.clone()),
            ..state.clone()
        },
    }
}

/// The action to dispatch once a profile request settles, if any.
///
/// Cancelled requests yield `None` whatever their result.
pub fn fetch_settled(result: Result<Value, String>, cancelled: bool) -> Option<UserAction> {
    if cancelled {
        tracing::debug!("profile request cancelled");
        return None;
    }
    Some(match result {
        Ok(data) => UserAction::SetData(data),
        Err(error) => UserAction::SetError(error),
    })
}
