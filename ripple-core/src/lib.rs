//! Ripple Core
//!
//! This crate provides a minimal reactive kernel for UI state. It
//! implements:
//!
//! - Observable state cells with identity-based subscriptions
//! - Reducer-based dispatch with an observer hook for devtools
//! - Effect scheduling with dependency diffing and ordered cleanups
//!
//! Rendering is not part of the kernel. UI glue reads state with
//! `get_state`, changes it with `dispatch`, and registers its update
//! functions with `subscribe`.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: `StateCell` and subscription handles
//! - `store`: `ReducerStore`, the `Action` trait and untyped actions
//! - `effect`: dependency lists, per-site effect records and the runner
//! - `devtools`: transition logging and bounded action history
//! - `form`: the reference name/email form domain
//! - `user`: the reference async domain, a name and its fetched profile
//!
//! # Example
//!
//! ```rust
//! use ripple_core::deps;
//! use ripple_core::effect::EffectRunner;
//! use ripple_core::form::{form_reducer, update_name, FormState};
//! use ripple_core::store::ReducerStore;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! let store = ReducerStore::new(FormState::default(), form_reducer);
//!
//! // Re-run a greeting effect whenever the name changes.
//! let runner = Arc::new(Mutex::new(EffectRunner::new()));
//! let _sub = store.subscribe(move |state: &FormState| {
//!     let mut runner = runner.lock();
//!     runner.begin_cycle();
//!     let name = state.name.clone();
//!     let _ = runner.use_effect(
//!         move || {
//!             println!("hello {name}");
//!             None
//!         },
//!         Some(deps![state.name.as_str()]),
//!     );
//! });
//!
//! store.dispatch(update_name("Ann")).unwrap();
//! assert_eq!(store.get_state().name, "Ann");
//! ```

pub mod config;
pub mod devtools;
pub mod effect;
pub mod error;
pub mod form;
pub mod reactive;
pub mod store;
pub mod user;

pub use config::StoreConfig;
pub use error::{ConfigError, EffectError, ListenerError, ReducerError, StoreError};
