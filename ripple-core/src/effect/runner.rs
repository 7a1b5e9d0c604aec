//! Hook-style effect driver.
//!
//! An [`EffectRunner`] owns one [`EffectRecord`] per effect site and maps
//! `use_effect` calls to sites by call order within a cycle, so the N-th
//! `use_effect` of every cycle always talks to the same record. A component
//! that calls `use_effect` conditionally breaks this mapping; the runner
//! logs a warning when consecutive cycles use a different number of sites.

use super::dependency::Dependencies;
use super::record::{run_effect, Cleanup, EffectOutcome, EffectRecord};
use crate::error::EffectError;

/// Drives the effects of one render site across update cycles.
///
/// # Example
///
/// ```rust
/// use ripple_core::deps;
/// use ripple_core::effect::EffectRunner;
///
/// let mut runner = EffectRunner::new();
/// for name in ["ann", "ann", "bob"] {
///     runner.begin_cycle();
///     let _ = runner.use_effect(|| { println!("hello {name}"); None }, Some(deps![name]));
/// }
/// // Printed "hello ann" and "hello bob" once each.
/// runner.teardown();
/// ```
#[derive(Debug, Default)]
pub struct EffectRunner {
    records: Vec<EffectRecord>,
    cursor: usize,
    cycles: u64,
}

impl EffectRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new update cycle. The next `use_effect` addresses the first
    /// site again.
    pub fn begin_cycle(&mut self) {
        if self.cycles > 0 && self.cursor != self.records.len() {
            tracing::warn!(
                used = self.cursor,
                sites = self.records.len(),
                "effect sites changed between cycles"
            );
        }
        self.cursor = 0;
        self.cycles += 1;
    }

    /// Register the next effect site of the current cycle and run it if its
    /// dependencies changed.
    pub fn use_effect<F>(&mut self, callback: F, dependencies: Option<Dependencies>) -> EffectOutcome
    where
        F: FnOnce() -> Option<Cleanup>,
    {
        if self.cursor == self.records.len() {
            self.records.push(EffectRecord::new());
        }
        let record = &mut self.records[self.cursor];
        self.cursor += 1;
        run_effect(record, callback, dependencies)
    }

    /// Run every pending cleanup in site order and reset all sites.
    ///
    /// The sites are kept, so a later cycle runs every effect afresh.
    pub fn teardown(&mut self) -> Vec<EffectError> {
        let errors: Vec<EffectError> = self
            .records
            .iter_mut()
            .filter_map(|record| record.teardown().err())
            .collect();
        self.cursor = 0;
        self.cycles = 0;
        errors
    }

    /// Number of effect sites seen so far.
    pub fn site_count(&self) -> usize {
        self.records.len()
    }

    /// The record of a site, by call-order index.
    pub fn record(&self, site: usize) -> Option<&EffectRecord> {
        self.records.get(site)
    }

    /// Number of cycles started since creation or the last teardown.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
