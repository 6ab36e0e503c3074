//! Record validation: raw store rows in, strict observations plus skip counts out.

use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::{
    ActualObservation, ActualRecord, ForecastObservation, ForecastRecord, RecordKind, SkipReason,
    SkipReport,
};

/// Validate forecast records, dropping malformed ones into `skipped`.
pub fn validate_forecasts(
    records: &[ForecastRecord],
    skipped: &mut SkipReport,
) -> Vec<ForecastObservation> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        match ForecastObservation::from_record(record) {
            Ok(obs) => out.push(obs),
            Err(reason) => {
                debug!(?record, %reason, "skipping forecast record");
                skipped.record(RecordKind::Forecast, reason);
            }
        }
    }
    out
}

/// Validate actual records and key them by period.
///
/// At most one actual may exist per period. If the store hands back more,
/// the first one seen is kept and the rest count as `DuplicateActual`.
pub fn validate_actuals(
    records: &[ActualRecord],
    skipped: &mut SkipReport,
) -> BTreeMap<DateTime<Utc>, ActualObservation> {
    let mut out = BTreeMap::new();
    for record in records {
        let obs = match ActualObservation::from_record(record) {
            Ok(obs) => obs,
            Err(reason) => {
                debug!(?record, %reason, "skipping actual record");
                skipped.record(RecordKind::Actual, reason);
                continue;
            }
        };
        match out.entry(obs.period) {
            Entry::Vacant(slot) => {
                slot.insert(obs);
            }
            Entry::Occupied(_) => {
                warn!(period = %obs.period, "duplicate actual for period, keeping first");
                skipped.record(RecordKind::Actual, SkipReason::DuplicateActual);
            }
        }
    }
    out
}
