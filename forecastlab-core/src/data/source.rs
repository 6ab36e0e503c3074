//! Store traits and structured error types.
//!
//! `ForecastStore` and `ActualStore` abstract over wherever the observations
//! live (CSV export, database, in-memory fixtures) so the engine can be run
//! and tested without knowing about storage. Stores are read-only.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{ActualRecord, ForecastRecord};

/// Errors raised by a store read. Propagated unchanged; never retried here.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to decode source data: {0}")]
    Decode(String),
}

/// Half-open range of settlement periods: `start <= period < end`.
///
/// An unset bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl PeriodRange {
    /// Every period.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every period at or after `start`.
    pub fn from_start(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, period: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| period >= s) && self.end.map_or(true, |e| period < e)
    }

    /// Whether a raw record belongs in a query result.
    ///
    /// Records with no period are kept so that the engine can count them as
    /// skipped instead of having them vanish silently.
    pub fn admits(&self, period: Option<DateTime<Utc>>) -> bool {
        period.map_or(true, |p| self.contains(p))
    }
}

/// Read access to recorded forecasts.
pub trait ForecastStore: Send + Sync {
    /// Human-readable name of this store.
    fn name(&self) -> &str;

    /// All forecast records whose period falls in `range`.
    fn query(&self, range: &PeriodRange) -> Result<Vec<ForecastRecord>, SourceError>;
}

/// Read access to realized prices. At most one record per period is expected.
pub trait ActualStore: Send + Sync {
    /// Human-readable name of this store.
    fn name(&self) -> &str;

    /// All actual records whose period falls in `range`.
    fn query(&self, range: &PeriodRange) -> Result<Vec<ActualRecord>, SourceError>;
}

/// Store backed by vectors held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub forecasts: Vec<ForecastRecord>,
    pub actuals: Vec<ActualRecord>,
}

impl InMemoryStore {
    pub fn new(forecasts: Vec<ForecastRecord>, actuals: Vec<ActualRecord>) -> Self {
        Self { forecasts, actuals }
    }
}

impl ForecastStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn query(&self, range: &PeriodRange) -> Result<Vec<ForecastRecord>, SourceError> {
        Ok(self
            .forecasts
            .iter()
            .filter(|r| range.admits(r.period))
            .cloned()
            .collect())
    }
}

impl ActualStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn query(&self, range: &PeriodRange) -> Result<Vec<ActualRecord>, SourceError> {
        Ok(self
            .actuals
            .iter()
            .filter(|r| range.admits(r.period))
            .cloned()
            .collect())
    }
}

/// Store that always fails. Useful for exercising error propagation.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    pub reason: String,
}

impl ForecastStore for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn query(&self, _range: &PeriodRange) -> Result<Vec<ForecastRecord>, SourceError> {
        Err(SourceError::Unavailable(self.reason.clone()))
    }
}

impl ActualStore for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn query(&self, _range: &PeriodRange) -> Result<Vec<ActualRecord>, SourceError> {
        Err(SourceError::Unavailable(self.reason.clone()))
    }
}
