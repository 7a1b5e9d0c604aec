//! Effect Records
//!
//! An [`EffectRecord`] is the memory of one effect site: the dependencies
//! its last run used and the cleanup that run returned. [`run_effect`] is
//! invoked once per render/update cycle for the site and decides whether to
//! skip, or to clean up and run again.
//!
//! # Ordering
//!
//! When a run is due:
//!
//! 1. The stored cleanup (if any) runs and is cleared.
//! 2. The callback runs; its returned cleanup is stored.
//! 3. The new dependencies are stored.
//!
//! A panicking cleanup does not prevent the callback from running. A
//! panicking callback leaves no cleanup behind, and its dependencies are
//! still recorded, so the site is not retried until they change.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::dependency::{should_run, Dependencies, Dependency};
use crate::error::{panic_message, EffectError};

/// A function returned by an effect, run before the effect's next run or
/// when the site is torn down.
pub struct Cleanup(Box<dyn FnOnce() + Send>);

impl Cleanup {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Run the cleanup, catching a panic.
    fn run(self) -> Result<(), EffectError> {
        catch_unwind(AssertUnwindSafe(self.0)).map_err(|payload| EffectError::Cleanup {
            message: panic_message(payload.as_ref()),
        })
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup")
    }
}

/// What [`run_effect`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum EffectOutcome {
    /// Dependencies were unchanged; nothing ran.
    Skipped,

    /// The previous cleanup (if any) and the callback ran.
    Ran { errors: Vec<EffectError> },
}

impl EffectOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, EffectOutcome::Ran { .. })
    }

    pub fn errors(&self) -> &[EffectError] {
        match self {
            EffectOutcome::Skipped => &[],
            EffectOutcome::Ran { errors } => errors,
        }
    }
}

/// Per-site effect state.
#[derive(Debug, Default)]
pub struct EffectRecord {
    previous_dependencies: Option<Dependencies>,
    cleanup: Option<Cleanup>,
    run_count: usize,
}

impl EffectRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dependencies used by the last run, if the site has run with a
    /// dependency list.
    pub fn previous_dependencies(&self) -> Option<&[Dependency]> {
        self.previous_dependencies.as_deref()
    }

    /// Whether a cleanup from the last run is pending.
    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Number of times the callback has been invoked.
    pub fn run_count(&self) -> usize {
        self.run_count
    }

    /// Run the effect for this cycle. See [`run_effect`].
    pub fn run<F>(&mut self, callback: F, dependencies: Option<Dependencies>) -> EffectOutcome
    where
        F: FnOnce() -> Option<Cleanup>,
    {
        if !should_run(self.previous_dependencies.as_deref(), dependencies.as_deref()) {
            return EffectOutcome::Skipped;
        }

        let mut errors = Vec::new();
        if let Err(err) = self.run_cleanup() {
            errors.push(err);
        }

        self.run_count += 1;
        match catch_unwind(AssertUnwindSafe(callback)) {
            Ok(cleanup) => self.cleanup = cleanup,
            Err(payload) => {
                let err = EffectError::Callback {
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(error = %err, "effect failed");
                errors.push(err);
            }
        }
        self.previous_dependencies = dependencies;

        tracing::trace!(run = self.run_count, "effect ran");
        EffectOutcome::Ran { errors }
    }

    /// Run and clear the pending cleanup, and forget the previous
    /// dependencies so the next call runs unconditionally.
    pub fn teardown(&mut self) -> Result<(), EffectError> {
        self.previous_dependencies = None;
        self.run_count = 0;
        self.run_cleanup()
    }

    fn run_cleanup(&mut self) -> Result<(), EffectError> {
        match self.cleanup.take() {
            Some(cleanup) => cleanup.run().inspect_err(|err| {
                tracing::error!(error = %err, "effect cleanup failed");
            }),
            None => Ok(()),
        }
    }
}

/// Run `callback` for the site described by `record` if `dependencies`
/// differ from the ones its last run used.
///
/// - `None` dependencies run on every call.
/// - An empty list runs on the first call only.
/// - Otherwise the callback runs when the list changes in length or in any
///   position, after the previous cleanup.
pub fn run_effect<F>(
    record: &mut EffectRecord,
    callback: F,
    dependencies: Option<Dependencies>,
) -> EffectOutcome
where
    F: FnOnce() -> Option<Cleanup>,
{
    record.run(callback, dependencies)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct Counts {
        runs: Arc<AtomicUsize>,
        cleanups: Arc<AtomicUsize>,
    }

    impl Counts {
        fn effect(&self) -> impl FnOnce() -> Option<Cleanup> {
            let runs = Arc::clone(&self.runs);
            let cleanups = Arc::clone(&self.cleanups);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Some(Cleanup::new(move || {
                    cleanups.fetch_add(1, Ordering::SeqCst);
                }))
            }
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }

        fn cleanups(&self) -> usize {
            self.cleanups.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn empty_dependencies_run_once() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        assert!(run_effect(&mut record, counts.effect(), Some(deps![])).ran());
        for _ in 0..5 {
            assert_eq!(
                run_effect(&mut record, counts.effect(), Some(deps![])),
                EffectOutcome::Skipped
            );
        }
        assert_eq!(counts.runs(), 1);
        assert_eq!(counts.cleanups(), 0);

        record.teardown().unwrap();
        assert_eq!(counts.cleanups(), 1);

        // The cleanup ran already; tearing down again does nothing.
        record.teardown().unwrap();
        assert_eq!(counts.cleanups(), 1);
    }

    #[test]
    fn equal_dependencies_skip() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        let _ = run_effect(&mut record, counts.effect(), Some(deps!["a"]));
        let outcome = run_effect(&mut record, counts.effect(), Some(deps!["a"]));

        assert_eq!(outcome, EffectOutcome::Skipped);
        assert_eq!(counts.runs(), 1);
        assert_eq!(counts.cleanups(), 0);
    }

    #[test]
    fn changed_dependencies_clean_up_then_run() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut record = EffectRecord::new();

        let effect = |label: &'static str| {
            let order = Arc::clone(&order);
            move || {
                order.lock().push(format!("run {label}"));
                let order = Arc::clone(&order);
                Some(Cleanup::new(move || {
                    order.lock().push(format!("cleanup {label}"))
                }))
            }
        };

        let _ = run_effect(&mut record, effect("a"), Some(deps!["a"]));
        let outcome = run_effect(&mut record, effect("b"), Some(deps!["b"]));

        assert!(outcome.ran());
        assert_eq!(
            *order.lock(),
            vec!["run a", "cleanup a", "run b"]
        );
        assert_eq!(record.previous_dependencies(), Some(&deps!["b"][..]));
    }

    #[test]
    fn absent_dependencies_run_every_time() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        for _ in 0..3 {
            assert!(run_effect(&mut record, counts.effect(), None).ran());
        }
        assert_eq!(counts.runs(), 3);
        assert_eq!(counts.cleanups(), 2);
        assert!(record.has_cleanup());
        assert_eq!(record.run_count(), 3);
    }

    #[test]
    fn effect_without_cleanup() {
        let mut record = EffectRecord::new();
        let _ = run_effect(&mut record, || None, Some(deps![1]));
        assert!(!record.has_cleanup());

        let outcome = run_effect(&mut record, || None, Some(deps![2]));
        assert_eq!(outcome, EffectOutcome::Ran { errors: vec![] });
    }

    #[test]
    fn failing_cleanup_does_not_block_the_next_run() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        let _ = run_effect(
            &mut record,
            || Some(Cleanup::new(|| panic!("cleanup broke"))),
            Some(deps![1]),
        );
        let outcome = run_effect(&mut record, counts.effect(), Some(deps![2]));

        assert_eq!(counts.runs(), 1);
        assert_eq!(
            outcome.errors(),
            &[EffectError::Cleanup {
                message: "cleanup broke".to_string()
            }]
        );
        assert!(record.has_cleanup());
    }

    #[test]
    fn failing_callback_leaves_no_cleanup() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        let _ = run_effect(&mut record, counts.effect(), Some(deps![1]));
        let outcome = run_effect(&mut record, || panic!("effect broke"), Some(deps![2]));

        // The old cleanup ran before the failing callback.
        assert_eq!(counts.cleanups(), 1);
        assert_eq!(
            outcome.errors(),
            &[EffectError::Callback {
                message: "effect broke".to_string()
            }]
        );
        assert!(!record.has_cleanup());
        assert_eq!(record.previous_dependencies(), Some(&deps![2][..]));

        // Same dependencies: not retried.
        assert_eq!(
            run_effect(&mut record, counts.effect(), Some(deps![2])),
            EffectOutcome::Skipped
        );
    }

    #[test]
    fn teardown_resets_the_site() {
        let counts = Counts::default();
        let mut record = EffectRecord::new();

        let _ = run_effect(&mut record, counts.effect(), Some(deps![]));
        record.teardown().unwrap();
        assert!(record.previous_dependencies().is_none());

        assert!(run_effect(&mut record, counts.effect(), Some(deps![])).ran());
        assert_eq!(counts.runs(), 2);
    }
}
