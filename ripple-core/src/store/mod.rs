//! Reducer-Based Dispatch
//!
//! This module layers a reducer on top of a [`StateCell`](crate::reactive::StateCell).
//! State changes only by dispatching actions; the reducer maps
//! `(current state, action)` to the next state and must be pure.
//!
//! # Reducer Contract
//!
//! - The same `(state, action)` always yields the same next state.
//! - The input state is never mutated; a new value is always returned, even
//!   when every field is copied through unchanged.
//! - Actions the reducer does not handle return the state unchanged.
//!
//! Purity is not enforced at runtime. An impure reducer breaks history
//! replay but never the store itself.

mod action;
mod reducer_store;

pub use action::{Action, RawAction};
pub use reducer_store::{DispatchReport, ReducerStore};
