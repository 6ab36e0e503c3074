//! Issuance-revision view of a period group.
//!
//! Where `rank` answers "what were the nearest-term forecasts", this answers
//! "how did the forecast move as it was re-issued". It looks only at
//! forecasts issued within `horizon` of the period, walks them from oldest to
//! newest issuance, and reports each price together with its change from the
//! previous issuance.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::aggregate::PeriodGroup;
use super::ReconcileError;

/// Default lookback from the period start for the revision view.
pub const DEFAULT_ISSUANCE_HORIZON_HOURS: i64 = 3;

/// One issuance of a forecast and how it moved from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRevision {
    pub period: DateTime<Utc>,
    pub forecasted_at: DateTime<Utc>,
    pub forecast_lead_secs: i64,
    pub usage_price: Decimal,
    pub export_price: Decimal,
    /// `usage_price` minus the previous issuance's; null for the first.
    pub usage_revision: Option<Decimal>,
    /// `export_price` minus the previous issuance's; null for the first.
    pub export_revision: Option<Decimal>,
}

/// Revisions for a group, oldest issuance first.
///
/// Fails with `InvalidHorizon` when `horizon` is zero or negative.
pub fn revisions(
    group: &PeriodGroup,
    horizon: Duration,
) -> Result<Vec<IssuanceRevision>, ReconcileError> {
    if horizon <= Duration::zero() {
        return Err(ReconcileError::InvalidHorizon {
            horizon_secs: horizon.num_seconds(),
        });
    }
    Ok(revisions_unchecked(group, horizon))
}

pub(crate) fn revisions_unchecked(group: &PeriodGroup, horizon: Duration) -> Vec<IssuanceRevision> {
    let mut in_horizon: Vec<_> = group
        .ordered_forecasts()
        .iter()
        .filter(|f| f.forecast_lead <= horizon)
        .collect();
    // Stable sort keeps the group's rank order as the tie-break.
    in_horizon.sort_by_key(|f| f.forecasted_at);

    let mut out: Vec<IssuanceRevision> = Vec::with_capacity(in_horizon.len());
    for f in in_horizon {
        let prev = out.last();
        let usage_revision = prev.and_then(|p| f.usage_price.checked_sub(p.usage_price));
        let export_revision = prev.and_then(|p| f.export_price.checked_sub(p.export_price));
        out.push(IssuanceRevision {
            period: group.period(),
            forecasted_at: f.forecasted_at,
            forecast_lead_secs: f.forecast_lead.num_seconds(),
            usage_price: f.usage_price,
            export_price: f.export_price,
            usage_revision,
            export_revision,
        });
    }
    out
}
