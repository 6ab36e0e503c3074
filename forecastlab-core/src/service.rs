//! Reconciliation service — one run over a trailing window.
//!
//! A run reads both stores (concurrently; they are independent), validates
//! and windows the records, then performs a single synchronous pass of
//! grouping, ranking and joining. Each run takes its own `now`; two runs with
//! the same `now`, parameters and source data produce identical output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::data::{
    validate_actuals, validate_forecasts, ActualStore, ForecastStore, PeriodRange,
};
use crate::domain::{
    ActualObservation, ForecastObservation, RankedForecast, ReconciliationRow, SkipReport,
};
use crate::engine::issuance::revisions_unchecked;
use crate::engine::rank::extract_unchecked;
use crate::engine::{
    group, reconcile, IssuanceRevision, ReconcileError, Window, DEFAULT_ISSUANCE_HORIZON_HOURS,
    DEFAULT_RANKS,
};

/// Parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Trailing window length. Must be positive.
    pub window: Duration,
    /// Ranked forecasts per period. Must be at least 1.
    pub k: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            window: Window::default().length(),
            k: DEFAULT_RANKS,
        }
    }
}

impl RunParams {
    /// Check window and rank before any source is touched.
    pub fn validate(&self) -> Result<Window, ReconcileError> {
        let window = Window::new(self.window)?;
        if self.k == 0 {
            return Err(ReconcileError::InvalidRank { k: self.k });
        }
        Ok(window)
    }
}

/// Output of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub now: DateTime<Utc>,
    pub window_secs: i64,
    pub k: usize,
    /// Sorted ascending by `time`, one row per period.
    pub rows: Vec<ReconciliationRow>,
    pub skipped: SkipReport,
}

impl Reconciliation {
    /// BLAKE3 over the serialized rows.
    ///
    /// Depends only on row content, so reruns over unchanged data match.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for row in &self.rows {
            // Serializing plain data into a Vec cannot fail.
            if let Ok(bytes) = serde_json::to_vec(row) {
                hasher.update(&bytes);
            }
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Issuance revisions for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRevisions {
    pub period: DateTime<Utc>,
    pub revisions: Vec<IssuanceRevision>,
}

/// Output of a revision run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRun {
    pub now: DateTime<Utc>,
    pub window_secs: i64,
    pub horizon_secs: i64,
    /// Sorted ascending by period; periods with no issuance inside the horizon are omitted.
    pub periods: Vec<PeriodRevisions>,
    pub skipped: SkipReport,
}

/// Default revision horizon.
pub fn default_horizon() -> Duration {
    Duration::hours(DEFAULT_ISSUANCE_HORIZON_HOURS)
}

/// Validated observations for one window.
struct Snapshot {
    forecasts: Vec<ForecastObservation>,
    actuals: BTreeMap<DateTime<Utc>, ActualObservation>,
    skipped: SkipReport,
}

/// Orchestrates window selection, grouping, ranking and the actual join.
pub struct ReconciliationService<'a, F: ?Sized, A: ?Sized> {
    forecasts: &'a F,
    actuals: &'a A,
}

impl<'a, F, A> ReconciliationService<'a, F, A>
where
    F: ForecastStore + ?Sized,
    A: ActualStore + ?Sized,
{
    pub fn new(forecasts: &'a F, actuals: &'a A) -> Self {
        Self { forecasts, actuals }
    }

    /// Reconcile the window ending at `now`.
    ///
    /// Rows cover every period in the window that has a forecast, an actual,
    /// or both, in ascending time order.
    pub fn run(
        &self,
        now: DateTime<Utc>,
        params: &RunParams,
    ) -> Result<Reconciliation, ReconcileError> {
        let window = params.validate()?;
        let snapshot = self.snapshot(now, &window)?;

        let groups = group(window.select(snapshot.forecasts, now));
        let periods: BTreeSet<DateTime<Utc>> = groups
            .keys()
            .copied()
            .chain(
                snapshot
                    .actuals
                    .keys()
                    .copied()
                    .filter(|p| window.contains(now, *p)),
            )
            .collect();

        let rows: Vec<ReconciliationRow> = periods
            .into_iter()
            .map(|period| {
                let ranked = groups
                    .get(&period)
                    .map(|g| extract_unchecked(g, params.k))
                    .unwrap_or_else(|| RankedForecast::empty(period, params.k));
                reconcile(ranked, snapshot.actuals.get(&period))
            })
            .collect();

        info!(
            %now,
            window_secs = window.length().num_seconds(),
            k = params.k,
            rows = rows.len(),
            forecast_periods = groups.len(),
            skipped = snapshot.skipped.total(),
            "reconciliation complete"
        );

        Ok(Reconciliation {
            now,
            window_secs: window.length().num_seconds(),
            k: params.k,
            rows,
            skipped: snapshot.skipped,
        })
    }

    /// Issuance revisions for every forecast period in the window.
    pub fn revisions(
        &self,
        now: DateTime<Utc>,
        params: &RunParams,
        horizon: Duration,
    ) -> Result<RevisionRun, ReconcileError> {
        let window = params.validate()?;
        if horizon <= Duration::zero() {
            return Err(ReconcileError::InvalidHorizon {
                horizon_secs: horizon.num_seconds(),
            });
        }
        let snapshot = self.snapshot(now, &window)?;

        let periods: Vec<PeriodRevisions> = group(window.select(snapshot.forecasts, now))
            .into_values()
            .filter_map(|g| {
                let revisions = revisions_unchecked(&g, horizon);
                (!revisions.is_empty()).then(|| PeriodRevisions {
                    period: g.period(),
                    revisions,
                })
            })
            .collect();

        info!(
            %now,
            horizon_secs = horizon.num_seconds(),
            periods = periods.len(),
            skipped = snapshot.skipped.total(),
            "revision run complete"
        );

        Ok(RevisionRun {
            now,
            window_secs: window.length().num_seconds(),
            horizon_secs: horizon.num_seconds(),
            periods,
            skipped: snapshot.skipped,
        })
    }

    /// Read both stores for the window and validate the records.
    fn snapshot(&self, now: DateTime<Utc>, window: &Window) -> Result<Snapshot, ReconcileError> {
        let range = PeriodRange::from_start(window.start(now));
        let (forecast_records, actual_records) = rayon::join(
            || self.forecasts.query(&range),
            || self.actuals.query(&range),
        );
        let forecast_records = forecast_records?;
        let actual_records = actual_records?;
        debug!(
            forecast_store = self.forecasts.name(),
            actual_store = self.actuals.name(),
            forecasts = forecast_records.len(),
            actuals = actual_records.len(),
            "source read"
        );

        let mut skipped = SkipReport::default();
        let forecasts = validate_forecasts(&forecast_records, &mut skipped);
        let actuals = validate_actuals(&actual_records, &mut skipped);
        if !skipped.is_empty() {
            warn!(%skipped, "malformed records skipped");
        }

        Ok(Snapshot {
            forecasts,
            actuals,
            skipped,
        })
    }
}
