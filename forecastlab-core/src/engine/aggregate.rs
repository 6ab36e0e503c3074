//! Group windowed forecasts by settlement period and order each group.
//!
//! Ordering within a group:
//! 1. `forecast_lead` ascending (nearest-term first)
//! 2. `forecasted_at` descending (for an identical lead, latest issuance wins)
//! 3. usage then export price ascending, so fully identical keys still sort
//!    the same way regardless of input order

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::ForecastObservation;

/// All forecasts for one period, in rank order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodGroup {
    period: DateTime<Utc>,
    ordered_forecasts: Vec<ForecastObservation>,
}

impl PeriodGroup {
    pub fn period(&self) -> DateTime<Utc> {
        self.period
    }

    /// Forecasts sorted by rank order; the first entry is rank 1.
    pub fn ordered_forecasts(&self) -> &[ForecastObservation] {
        &self.ordered_forecasts
    }

    pub fn len(&self) -> usize {
        self.ordered_forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_forecasts.is_empty()
    }
}

/// Rank order between two forecasts for the same period.
pub fn rank_order(a: &ForecastObservation, b: &ForecastObservation) -> Ordering {
    a.forecast_lead
        .cmp(&b.forecast_lead)
        .then_with(|| b.forecasted_at.cmp(&a.forecasted_at))
        .then_with(|| a.usage_price.cmp(&b.usage_price))
        .then_with(|| a.export_price.cmp(&b.export_price))
}

/// Group forecasts by exact period equality.
///
/// The map iterates in ascending period order.
pub fn group<I>(observations: I) -> BTreeMap<DateTime<Utc>, PeriodGroup>
where
    I: IntoIterator<Item = ForecastObservation>,
{
    let mut by_period: BTreeMap<DateTime<Utc>, Vec<ForecastObservation>> = BTreeMap::new();
    for obs in observations {
        by_period.entry(obs.period).or_default().push(obs);
    }

    by_period
        .into_iter()
        .filter(|(_, forecasts)| !forecasts.is_empty())
        .map(|(period, mut forecasts)| {
            forecasts.sort_by(rank_order);
            (
                period,
                PeriodGroup {
                    period,
                    ordered_forecasts: forecasts,
                },
            )
        })
        .collect()
}
