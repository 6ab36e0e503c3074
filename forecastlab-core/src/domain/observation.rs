//! Forecast and actual price observations.
//!
//! Stores hand back loosely-typed records (every field optional, the way a
//! row in the external table may arrive). `ForecastObservation::from_record`
//! and `ActualObservation::from_record` turn them into the strict types the
//! engine works with, or a `SkipReason` when the record cannot be used.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::skip::SkipReason;

/// One forecast issued for a future settlement period.
///
/// `forecast_lead` is the distance between issuance and the period start;
/// `forecasted_at + forecast_lead == period` for records that carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastObservation {
    pub period: DateTime<Utc>,
    pub forecast_lead: Duration,
    pub forecasted_at: DateTime<Utc>,
    pub usage_price: Decimal,
    pub export_price: Decimal,
}

impl ForecastObservation {
    /// Build an observation whose issuance instant is derived from the lead.
    pub fn with_lead(
        period: DateTime<Utc>,
        forecast_lead: Duration,
        usage_price: Decimal,
        export_price: Decimal,
    ) -> Self {
        Self {
            period,
            forecast_lead,
            forecasted_at: period - forecast_lead,
            usage_price,
            export_price,
        }
    }

    /// Validate a raw store record.
    ///
    /// A missing lead is derived from `period - forecasted_at`; a missing
    /// issuance instant from `period - forecast_lead`. When both are present
    /// the stored lead is kept as-is.
    pub fn from_record(record: &ForecastRecord) -> Result<Self, SkipReason> {
        let period = record.period.ok_or(SkipReason::MissingPeriod)?;
        let (usage_price, export_price) = match (record.usage_price, record.export_price) {
            (Some(usage), Some(export)) => (usage, export),
            _ => return Err(SkipReason::MissingPrice),
        };

        let (forecast_lead, forecasted_at) =
            match (record.forecast_lead_secs, record.forecasted_at) {
                (Some(secs), Some(at)) => (lead_from_secs(secs)?, at),
                (Some(secs), None) => {
                    let lead = lead_from_secs(secs)?;
                    let at = period
                        .checked_sub_signed(lead)
                        .ok_or(SkipReason::OutOfRange)?;
                    (lead, at)
                }
                (None, Some(at)) => (period - at, at),
                (None, None) => return Err(SkipReason::MissingLead),
            };

        if forecast_lead < Duration::zero() {
            return Err(SkipReason::NegativeLead);
        }

        Ok(Self {
            period,
            forecast_lead,
            forecasted_at,
            usage_price,
            export_price,
        })
    }
}

fn lead_from_secs(secs: i64) -> Result<Duration, SkipReason> {
    if secs < 0 {
        return Err(SkipReason::NegativeLead);
    }
    Duration::try_seconds(secs).ok_or(SkipReason::OutOfRange)
}

/// The realized price for one settlement period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualObservation {
    pub period: DateTime<Utc>,
    pub usage_price: Decimal,
    pub export_price: Decimal,
}

impl ActualObservation {
    pub fn new(period: DateTime<Utc>, usage_price: Decimal, export_price: Decimal) -> Self {
        Self {
            period,
            usage_price,
            export_price,
        }
    }

    /// Validate a raw store record.
    pub fn from_record(record: &ActualRecord) -> Result<Self, SkipReason> {
        let period = record.period.ok_or(SkipReason::MissingPeriod)?;
        match (record.usage_price, record.export_price) {
            (Some(usage_price), Some(export_price)) => Ok(Self {
                period,
                usage_price,
                export_price,
            }),
            _ => Err(SkipReason::MissingPrice),
        }
    }
}

/// A forecast row as read from a store, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastRecord {
    pub period: Option<DateTime<Utc>>,
    pub forecasted_at: Option<DateTime<Utc>>,
    /// Lead time in whole seconds.
    pub forecast_lead_secs: Option<i64>,
    pub usage_price: Option<Decimal>,
    pub export_price: Option<Decimal>,
}

impl From<&ForecastObservation> for ForecastRecord {
    fn from(obs: &ForecastObservation) -> Self {
        Self {
            period: Some(obs.period),
            forecasted_at: Some(obs.forecasted_at),
            forecast_lead_secs: Some(obs.forecast_lead.num_seconds()),
            usage_price: Some(obs.usage_price),
            export_price: Some(obs.export_price),
        }
    }
}

/// An actual-price row as read from a store, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActualRecord {
    pub period: Option<DateTime<Utc>>,
    pub usage_price: Option<Decimal>,
    pub export_price: Option<Decimal>,
}

impl From<&ActualObservation> for ActualRecord {
    fn from(obs: &ActualObservation) -> Self {
        Self {
            period: Some(obs.period),
            usage_price: Some(obs.usage_price),
            export_price: Some(obs.export_price),
        }
    }
}
