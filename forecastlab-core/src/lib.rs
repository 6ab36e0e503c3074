//! ForecastLab Core — rolling forecast reconciliation engine.
//!
//! Reconciles electricity-price forecasts against realized prices, per
//! settlement period, over a trailing window:
//! - Domain types (observations, store records, ranked forecasts, output rows)
//! - Store traits over forecast and actual collections
//! - Window selection, lead-rank grouping, ranked extraction, delta join
//! - Issuance-revision view and accuracy summary
//!
//! Everything here is a pure read/transform; nothing is persisted.

pub mod accuracy;
pub mod data;
pub mod domain;
pub mod engine;
pub mod service;

pub use accuracy::{AccuracySummary, SeriesAccuracy};
pub use data::{ActualStore, ForecastStore, InMemoryStore, PeriodRange, SourceError};
pub use domain::{
    ActualObservation, ActualRecord, ForecastObservation, ForecastRecord, RankedForecast,
    ReconciliationRow, RecordKind, SkipReason, SkipReport,
};
pub use engine::{
    IssuanceRevision, PeriodGroup, ReconcileError, Window, DEFAULT_ISSUANCE_HORIZON_HOURS,
    DEFAULT_RANKS, DEFAULT_WINDOW_HOURS,
};
pub use service::{
    default_horizon, PeriodRevisions, Reconciliation, ReconciliationService, RevisionRun,
    RunParams,
};
