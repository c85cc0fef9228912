//! Performance column selection

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

/// Source columns for the synthetic `Performance` column.
///
/// Selection is a fixed priority list: success rate first, average
/// episode return second. No other metric names are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceMetric {
    /// Evaluation success rate (goal-conditioned tasks)
    TestSuccess,
    /// Average training episode return
    AverageEpRet,
}

impl PerformanceMetric {
    /// Candidates in selection order.
    pub const PRIORITY: [Self; 2] = [Self::TestSuccess, Self::AverageEpRet];

    /// Column name in the results table.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::TestSuccess => "TestSuccess",
            Self::AverageEpRet => "AverageEpRet",
        }
    }

    /// First candidate present in `schema`, if any.
    #[must_use]
    pub fn select(schema: &Schema) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|metric| schema.index_of(metric.column_name()).is_ok())
    }
}
