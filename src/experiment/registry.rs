//! Label Registry - unit and run-index assignment for one aggregation
//!
//! Every run that enters a loader receives:
//! - a **unit** index, counted per label (`0, 1, 2, ...` for each label)
//! - a **secondary label** `"{label}-{n}"`, where `n` counts every run
//!   seen by the registry regardless of label
//!
//! Units let the aggregator tell repeated seeds of one label apart; the
//! secondary label gives every run its own curve in per-run mode.

use rustc_hash::FxHashMap;

/// Identity assigned to one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    /// Primary label (`Condition1`)
    pub condition1: String,
    /// Secondary label, unique per registry (`Condition2`)
    pub condition2: String,
    /// Per-label sequence index (`Unit`)
    pub unit: usize,
}

/// Per-invocation label → next-unit counter plus a global run counter.
///
/// Owned by a [`DatasetLoader`](crate::storage::DatasetLoader); a fresh
/// loader starts from zero, so separate aggregations never share units.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    units: FxHashMap<String, usize>,
    runs: usize,
}

impl LabelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no run has been assigned yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.runs == 0
    }

    /// Total number of runs assigned.
    #[must_use]
    pub const fn run_count(&self) -> usize {
        self.runs
    }

    /// Number of units assigned to a label so far.
    #[must_use]
    pub fn unit_count(&self, label: &str) -> usize {
        self.units.get(label).copied().unwrap_or(0)
    }

    /// Assign the next identity for a run under `label`.
    ///
    /// Both counters advance on every call, including for runs whose
    /// results later fail to load.
    pub fn assign(&mut self, label: &str) -> RunIdentity {
        let condition2 = format!("{label}-{}", self.runs);
        self.runs += 1;

        let next = self.units.entry(label.to_string()).or_insert(0);
        let unit = *next;
        *next += 1;

        RunIdentity {
            condition1: label.to_string(),
            condition2,
            unit,
        }
    }

    /// Forget all assignments.
    pub fn reset(&mut self) {
        self.units.clear();
        self.runs = 0;
    }
}
