//! Domain types for forecast reconciliation

pub mod observation;
pub mod row;
pub mod skip;

pub use observation::{ActualObservation, ActualRecord, ForecastObservation, ForecastRecord};
pub use row::{RankedForecast, ReconciliationRow};
pub use skip::{RecordKind, SkipReason, SkipReport};
