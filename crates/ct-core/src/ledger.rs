//! Per-branch focus accumulation.
//!
//! The flow engine only knows about one attribution context. The ledger
//! tracks which branch that context belongs to, and on a branch switch moves
//! the engine's active time into the old branch before resetting it.

use std::collections::BTreeMap;

use crate::activity::ActivityEvent;
use crate::flow::{FlowConfig, FlowEngine};
use crate::types::BranchName;

#[derive(Debug, Clone)]
pub struct FocusLedger {
    engine: FlowEngine,
    current: Option<BranchName>,
    /// Seconds captured from finished contexts.
    settled: BTreeMap<BranchName, f64>,
}

impl FocusLedger {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            engine: FlowEngine::new(config),
            current: None,
            settled: BTreeMap::new(),
        }
    }

    /// Records an activity event, switching context if its branch changed.
    pub fn record(&mut self, event: &ActivityEvent) {
        if self.current.as_ref() != Some(&event.branch) {
            self.switch_to(event.branch.clone());
        }
        self.engine.record_event(event.timestamp_ms);
    }

    /// Captures the live context's active time and starts a fresh one on `branch`.
    pub fn switch_to(&mut self, branch: BranchName) {
        if let Some(previous) = self.current.take() {
            let seconds = self.engine.active_seconds();
            if seconds > 0.0 {
                tracing::debug!(branch = %previous, seconds, "capturing focus before branch switch");
                *self.settled.entry(previous).or_insert(0.0) += seconds;
            }
        }
        self.engine.reset();
        self.current = Some(branch);
    }

    pub const fn current_branch(&self) -> Option<&BranchName> {
        self.current.as_ref()
    }

    /// Focus seconds for one branch, including the live context.
    pub fn seconds_for(&self, branch: &BranchName) -> f64 {
        let settled = self.settled.get(branch).copied().unwrap_or(0.0);
        if self.current.as_ref() == Some(branch) {
            settled + self.engine.active_seconds()
        } else {
            settled
        }
    }

    /// Focus seconds for every branch seen, including the live context.
    pub fn totals(&self) -> BTreeMap<BranchName, f64> {
        let mut totals = self.settled.clone();
        if let Some(current) = &self.current {
            *totals.entry(current.clone()).or_insert(0.0) += self.engine.active_seconds();
        }
        totals
    }
}
