//! Forecast accuracy summary — pure functions over reconciliation rows.
//!
//! Only rows with a delta contribute. Deltas are realized minus predicted,
//! so a positive mean delta means forecasts ran low.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ReconciliationRow;

/// Accuracy of one price series (usage or export).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAccuracy {
    /// Rows with a non-null delta.
    pub matched: usize,
    /// Mean signed delta (bias).
    pub mean_delta: Option<Decimal>,
    /// Mean absolute delta.
    pub mean_abs_delta: Option<Decimal>,
    /// Largest absolute delta.
    pub max_abs_delta: Option<Decimal>,
    /// Period of the largest absolute delta (earliest on ties).
    pub max_abs_delta_time: Option<DateTime<Utc>>,
}

impl SeriesAccuracy {
    /// Compute from `(time, delta)` pairs.
    pub fn compute<I>(deltas: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, Decimal)>,
    {
        let mut matched = 0usize;
        // None once a running total overflows.
        let mut sum = Some(Decimal::ZERO);
        let mut abs_sum = Some(Decimal::ZERO);
        let mut max: Option<(DateTime<Utc>, Decimal)> = None;

        for (time, delta) in deltas {
            matched += 1;
            sum = sum.and_then(|s| s.checked_add(delta));
            abs_sum = abs_sum.and_then(|s| s.checked_add(delta.abs()));
            if max.map_or(true, |(_, m)| delta.abs() > m) {
                max = Some((time, delta.abs()));
            }
        }

        if matched == 0 {
            return Self::default();
        }
        let n = Decimal::from(matched);
        Self {
            matched,
            mean_delta: sum.and_then(|s| s.checked_div(n)),
            mean_abs_delta: abs_sum.and_then(|s| s.checked_div(n)),
            max_abs_delta: max.map(|(_, m)| m),
            max_abs_delta_time: max.map(|(t, _)| t),
        }
    }
}

/// Accuracy of both series over a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub rows: usize,
    /// Rows with a realized price.
    pub settled: usize,
    pub usage: SeriesAccuracy,
    pub export: SeriesAccuracy,
}

impl AccuracySummary {
    pub fn from_rows(rows: &[ReconciliationRow]) -> Self {
        Self {
            rows: rows.len(),
            settled: rows.iter().filter(|r| r.has_actual()).count(),
            usage: SeriesAccuracy::compute(
                rows.iter().filter_map(|r| r.usage_delta.map(|d| (r.time, d))),
            ),
            export: SeriesAccuracy::compute(
                rows.iter().filter_map(|r| r.export_delta.map(|d| (r.time, d))),
            ),
        }
    }
}
