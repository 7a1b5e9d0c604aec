//! Observable State
//!
//! This module implements the bottom layer of the kernel: a single mutable
//! value with a notify-on-write subscription list.
//!
//! # Concepts
//!
//! ## StateCells
//!
//! A [`StateCell`] is a container for state that is only ever replaced
//! wholesale. Every write is followed by a synchronous notification pass
//! over the listeners registered when the pass started.
//!
//! ## Subscriptions
//!
//! Registering a listener hands back a [`Subscription`]. The handle removes
//! exactly the listener it was created for, and it does so when dropped
//! unless it has been detached.

mod cell;
mod subscriber;

pub use cell::{NotifyReport, StateCell};
pub use subscriber::{SubscriberId, Subscription};
