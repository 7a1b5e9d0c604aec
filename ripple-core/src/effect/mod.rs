//! Effect Scheduling
//!
//! An effect is a side-effecting callback conditioned on a dependency list.
//! Effects synchronize state with the outside world: updating a view,
//! logging, starting network requests, arming timers.
//!
//! # How Effects Work
//!
//! 1. Each update cycle, the effect site is invoked with its callback and
//!    its current dependencies.
//!
//! 2. If the dependencies match the ones used by the site's last run, the
//!    call is a no-op.
//!
//! 3. Otherwise the cleanup returned by the last run is invoked first, then
//!    the callback runs and its returned cleanup is kept for next time.
//!
//! # Dependency Lists
//!
//! - `None`: run on every cycle.
//! - `Some(deps![])`: run on the first cycle only; clean up at teardown.
//! - `Some(deps![a, b])`: run when `a` or `b` changes.
//!
//! # Cancellation
//!
//! Cleanups are the only cancellation primitive. Work started by a callback
//! that outlives it (a spawned task, a timer) should install its
//! cancellation in the returned [`Cleanup`]. The runner guarantees the
//! cleanup runs before the next run of the same site; it does not wait for
//! the cancelled work to settle.

mod dependency;
mod record;
mod runner;

pub use dependency::{should_run, Dependencies, Dependency, IdentityToken};
pub use record::{run_effect, Cleanup, EffectOutcome, EffectRecord};
pub use runner::EffectRunner;
