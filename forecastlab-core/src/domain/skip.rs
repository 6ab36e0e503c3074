//! Skipped-record accounting.
//!
//! Malformed records never abort a run; they are dropped and tallied here so
//! the caller can report how much of the source was unusable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a record was dropped before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No settlement period.
    MissingPeriod,
    /// Usage or export price absent or unparseable.
    MissingPrice,
    /// Neither a lead nor an issuance instant to derive one from.
    MissingLead,
    /// Forecast issued after the period it predicts.
    NegativeLead,
    /// Lead or timestamp outside the representable range.
    OutOfRange,
    /// A second actual for a period that already has one.
    DuplicateActual,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingPeriod => "missing period",
            Self::MissingPrice => "missing price",
            Self::MissingLead => "missing lead",
            Self::NegativeLead => "negative lead",
            Self::OutOfRange => "out of range",
            Self::DuplicateActual => "duplicate actual",
        };
        f.write_str(s)
    }
}

/// Which collection a skipped record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Forecast,
    Actual,
}

/// Per-reason counts of skipped records for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReport {
    pub forecasts: BTreeMap<SkipReason, usize>,
    pub actuals: BTreeMap<SkipReason, usize>,
}

impl SkipReport {
    pub fn record(&mut self, kind: RecordKind, reason: SkipReason) {
        let counts = match kind {
            RecordKind::Forecast => &mut self.forecasts,
            RecordKind::Actual => &mut self.actuals,
        };
        *counts.entry(reason).or_insert(0) += 1;
    }

    pub fn forecast_count(&self) -> usize {
        self.forecasts.values().sum()
    }

    pub fn actual_count(&self) -> usize {
        self.actuals.values().sum()
    }

    /// Total skipped records across both collections.
    pub fn total(&self) -> usize {
        self.forecast_count() + self.actual_count()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Count for one reason in one collection.
    pub fn count(&self, kind: RecordKind, reason: SkipReason) -> usize {
        let counts = match kind {
            RecordKind::Forecast => &self.forecasts,
            RecordKind::Actual => &self.actuals,
        };
        counts.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for SkipReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no records skipped");
        }
        let mut parts = Vec::new();
        for (reason, n) in &self.forecasts {
            parts.push(format!("forecast {reason}: {n}"));
        }
        for (reason, n) in &self.actuals {
            parts.push(format!("actual {reason}: {n}"));
        }
        write!(f, "{} skipped ({})", self.total(), parts.join(", "))
    }
}
