//! Observation sources and record validation

pub mod source;
pub mod validate;

pub use source::{
    ActualStore, ForecastStore, InMemoryStore, PeriodRange, SourceError, UnavailableStore,
};
pub use validate::{validate_actuals, validate_forecasts};
