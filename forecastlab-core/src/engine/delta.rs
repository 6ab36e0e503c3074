//! Join ranked forecasts with realized prices.

use rust_decimal::Decimal;

use crate::domain::{ActualObservation, RankedForecast, ReconciliationRow};

/// Build the output row for one period.
///
/// Left-join semantics: a row is produced whether or not an actual exists.
/// Deltas are `actual - rank_1` and are only present when both sides are.
pub fn reconcile(ranked: RankedForecast, actual: Option<&ActualObservation>) -> ReconciliationRow {
    let actual_usage_price = actual.map(|a| a.usage_price);
    let actual_export_price = actual.map(|a| a.export_price);
    let usage_delta = delta(actual_usage_price, ranked.usage_rank(1));
    let export_delta = delta(actual_export_price, ranked.export_rank(1));

    ReconciliationRow {
        time: ranked.period,
        actual_usage_price,
        usage_forecasts: ranked.usage_prices,
        usage_delta,
        actual_export_price,
        export_forecasts: ranked.export_prices,
        export_delta,
    }
}

/// Realized minus predicted. Signed; `None` if either side is missing.
fn delta(actual: Option<Decimal>, forecast: Option<Decimal>) -> Option<Decimal> {
    actual?.checked_sub(forecast?)
}
