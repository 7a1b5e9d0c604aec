//! The reference form domain: a name/email form driven by a reducer.
//!
//! [`FormAction`] is the typed action set. JSON actions of the shape
//! `{ "type": "UPDATE_NAME", "payload": "Ann" }` deserialize straight into
//! it. [`raw_form_reducer`] handles untyped [`RawAction`]s and leaves the
//! state unchanged for tags it does not know.

use serde::{Deserialize, Serialize};

use crate::store::{Action, RawAction};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormAction {
    UpdateName(String),
    UpdateEmail(String),
    #[serde(alias = "RESET_FORM")]
    Reset,
}

impl Action for FormAction {
    fn tag(&self) -> &str {
        match self {
            FormAction::UpdateName(_) => "UPDATE_NAME",
            FormAction::UpdateEmail(_) => "UPDATE_EMAIL",
            FormAction::Reset => "RESET",
        }
    }
}

impl FormAction {
    /// Interpret an untyped action. Unknown tags and missing or non-string
    /// payloads yield `None`.
    pub fn from_raw(raw: &RawAction) -> Option<Self> {
        match raw.kind.as_str() {
            "UPDATE_NAME" => raw.payload_str().map(|name| Self::UpdateName(name.to_string())),
            "UPDATE_EMAIL" => raw
                .payload_str()
                .map(|email| Self::UpdateEmail(email.to_string())),
            "RESET" | "RESET_FORM" => Some(Self::Reset),
            _ => None,
        }
    }
}

pub fn update_name(name: impl Into<String>) -> FormAction {
    FormAction::UpdateName(name.into())
}

pub fn update_email(email: impl Into<String>) -> FormAction {
    FormAction::UpdateEmail(email.into())
}

pub fn reset_form() -> FormAction {
    FormAction::Reset
}

pub fn form_reducer(state: &FormState, action: &FormAction) -> FormState {
    match action {
        FormAction::UpdateName(name) => FormState {
            name: name.clone(),
            ..state.clone()
        },
        FormAction::UpdateEmail(email) => FormState {
            email: email.clone(),
            ..state.clone()
        },
        FormAction::Reset => FormState::default(),
    }
}

pub fn raw_form_reducer(state: &FormState, action: &RawAction) -> FormState {
    match FormAction::from_raw(action) {
        Some(action) => form_reducer(state, &action),
        None => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_scenario() {
        let state = FormState::default();

        let state = form_reducer(&state, &update_name("Ann"));
        assert_eq!(
            state,
            FormState {
                name: "Ann".into(),
                email: String::new()
            }
        );

        let state = form_reducer(&state, &update_email("a@x.com"));
        assert_eq!(
            state,
            FormState {
                name: "Ann".into(),
                email: "a@x.com".into()
            }
        );

        let state = form_reducer(&state, &reset_form());
        assert_eq!(state, FormState::default());
    }

    #[test]
    fn actions_parse_from_json() {
        let action: FormAction =
            serde_json::from_str(r#"{ "type": "UPDATE_NAME", "payload": "Ann" }"#).unwrap();
        assert_eq!(action, update_name("Ann"));

        let action: FormAction = serde_json::from_str(r#"{ "type": "RESET" }"#).unwrap();
        assert_eq!(action, reset_form());

        let action: FormAction = serde_json::from_str(r#"{ "type": "RESET_FORM" }"#).unwrap();
        assert_eq!(action, reset_form());
    }

    #[test]
    fn tags_match_the_wire_names() {
        for action in [update_name("a"), update_email("b"), reset_form()] {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.tag());
        }
    }

    #[test]
    fn unknown_raw_action_leaves_state_unchanged() {
        let state = FormState {
            name: "Ann".into(),
            email: "a@x.com".into(),
        };

        let next = raw_form_reducer(&state, &RawAction::with_payload("SET_AGE", 30));
        assert_eq!(next, state);

        let next = raw_form_reducer(&state, &RawAction::new("UPDATE_NAME"));
        assert_eq!(next, state);
    }

    #[test]
    fn known_raw_actions_apply() {
        let state = raw_form_reducer(
            &FormState::default(),
            &RawAction::with_payload("UPDATE_EMAIL", "a@x.com"),
        );
        assert_eq!(state.email, "a@x.com");

        let state = raw_form_reducer(&state, &RawAction::new("RESET_FORM"));
        assert_eq!(state, FormState::default());
    }
}
