//! Ranked forecasts and reconciliation output rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The first `k` lead-ranked forecasts for a period.
///
/// Index 0 is rank 1 (smallest lead). Both vectors always have length `k`;
/// ranks beyond the available forecasts are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedForecast {
    pub period: DateTime<Utc>,
    pub usage_prices: Vec<Option<Decimal>>,
    pub export_prices: Vec<Option<Decimal>>,
}

impl RankedForecast {
    /// A period with no forecasts at all: every rank is null.
    pub fn empty(period: DateTime<Utc>, k: usize) -> Self {
        Self {
            period,
            usage_prices: vec![None; k],
            export_prices: vec![None; k],
        }
    }

    /// Number of rank slots.
    pub fn k(&self) -> usize {
        self.usage_prices.len()
    }

    /// Usage price at a 1-based rank.
    pub fn usage_rank(&self, rank: usize) -> Option<Decimal> {
        rank.checked_sub(1)
            .and_then(|i| self.usage_prices.get(i).copied().flatten())
    }

    /// Export price at a 1-based rank.
    pub fn export_rank(&self, rank: usize) -> Option<Decimal> {
        rank.checked_sub(1)
            .and_then(|i| self.export_prices.get(i).copied().flatten())
    }
}

/// One output row: realized price, ranked forecasts, and the realized-minus-nearest delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub time: DateTime<Utc>,
    pub actual_usage_price: Option<Decimal>,
    pub usage_forecasts: Vec<Option<Decimal>>,
    pub usage_delta: Option<Decimal>,
    pub actual_export_price: Option<Decimal>,
    pub export_forecasts: Vec<Option<Decimal>>,
    pub export_delta: Option<Decimal>,
}

impl ReconciliationRow {
    /// Nearest-term usage forecast (rank 1).
    pub fn usage_forecast_1(&self) -> Option<Decimal> {
        self.usage_forecasts.first().copied().flatten()
    }

    /// Nearest-term export forecast (rank 1).
    pub fn export_forecast_1(&self) -> Option<Decimal> {
        self.export_forecasts.first().copied().flatten()
    }

    pub fn has_actual(&self) -> bool {
        self.actual_usage_price.is_some() || self.actual_export_price.is_some()
    }

    /// Number of non-null forecast ranks.
    pub fn forecast_count(&self) -> usize {
        self.usage_forecasts.iter().filter(|p| p.is_some()).count()
    }
}
