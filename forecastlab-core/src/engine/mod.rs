//! Reconciliation engine — pure transforms over already-fetched observations.
//!
//! Stages, in data-flow order:
//!
//! 1. `window`: keep forecasts whose period is inside the trailing window
//! 2. `aggregate`: group by exact period, order each group by lead
//! 3. `rank`: take the first `k` forecasts of each group
//! 4. `delta`: left-join with the realized price and compute the delta
//!
//! `issuance` is a second, independent extractor over the same groups.

pub mod aggregate;
pub mod delta;
pub mod issuance;
pub mod rank;
pub mod window;

pub use aggregate::{group, PeriodGroup};
pub use delta::reconcile;
pub use issuance::{revisions, IssuanceRevision, DEFAULT_ISSUANCE_HORIZON_HOURS};
pub use rank::{extract, DEFAULT_RANKS};
pub use window::{select, Window, DEFAULT_WINDOW_HOURS};

use thiserror::Error;

use crate::data::SourceError;

/// Errors from a reconciliation run.
///
/// Configuration errors are raised before any source read.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid window: {window_secs}s (must be positive)")]
    InvalidWindow { window_secs: i64 },

    #[error("invalid rank count: {k} (must be at least 1)")]
    InvalidRank { k: usize },

    #[error("invalid issuance horizon: {horizon_secs}s (must be positive)")]
    InvalidHorizon { horizon_secs: i64 },

    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),
}
