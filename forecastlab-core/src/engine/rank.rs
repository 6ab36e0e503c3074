//! Fixed-depth ranked extraction from a period group.

use super::aggregate::PeriodGroup;
use super::ReconcileError;
use crate::domain::RankedForecast;

/// Number of ranked forecasts carried per period.
pub const DEFAULT_RANKS: usize = 3;

/// Take the first `k` forecasts of a group, padding with nulls.
///
/// Never looks past the group's own forecasts and never interpolates.
pub fn extract(group: &PeriodGroup, k: usize) -> Result<RankedForecast, ReconcileError> {
    if k == 0 {
        return Err(ReconcileError::InvalidRank { k });
    }
    Ok(extract_unchecked(group, k))
}

/// `extract` for an already-validated `k`.
pub(crate) fn extract_unchecked(group: &PeriodGroup, k: usize) -> RankedForecast {
    let mut ranked = RankedForecast::empty(group.period(), k);
    for (slot, forecast) in group.ordered_forecasts().iter().take(k).enumerate() {
        ranked.usage_prices[slot] = Some(forecast.usage_price);
        ranked.export_prices[slot] = Some(forecast.export_price);
    }
    ranked
}
