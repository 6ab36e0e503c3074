//! Run entry points — wire config, CSV stores, and the service together.
//!
//! - `run_reconciliation()`: the reconciliation table for one window.
//! - `run_revisions()`: the issuance-revision view for the same window.
//!
//! Both capture `now` exactly once, from the config or the wall clock.

use thiserror::Error;
use tracing::info;

use forecastlab_core::{ReconcileError, Reconciliation, ReconciliationService, RevisionRun};

use crate::config::{ConfigError, ReconcileConfig};
use crate::csv_store::{CsvActualStore, CsvForecastStore};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

fn stores(config: &ReconcileConfig) -> (CsvForecastStore, CsvActualStore) {
    (
        CsvForecastStore::new(&config.source.forecasts),
        CsvActualStore::new(&config.source.actuals),
    )
}

/// Reconcile the configured sources over the configured window.
pub fn run_reconciliation(config: &ReconcileConfig) -> Result<Reconciliation, RunError> {
    config.validate()?;
    let now = config.now();
    let (forecasts, actuals) = stores(config);

    info!(
        forecasts = %forecasts.path().display(),
        actuals = %actuals.path().display(),
        %now,
        "starting reconciliation"
    );
    let run = ReconciliationService::new(&forecasts, &actuals).run(now, &config.run_params())?;
    Ok(run)
}

/// Issuance revisions for the configured sources and window.
pub fn run_revisions(config: &ReconcileConfig) -> Result<RevisionRun, RunError> {
    config.validate()?;
    let now = config.now();
    let (forecasts, actuals) = stores(config);

    info!(
        forecasts = %forecasts.path().display(),
        %now,
        horizon_secs = config.horizon().num_seconds(),
        "starting revision run"
    );
    let run = ReconciliationService::new(&forecasts, &actuals).revisions(
        now,
        &config.run_params(),
        config.horizon(),
    )?;
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_fails_before_reading() {
        let mut config = ReconcileConfig::for_sources("/nope/f.csv", "/nope/a.csv");
        config.reconcile.ranks = 0;
        let err = run_reconciliation(&config).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_files_surface_as_source_unavailable() {
        let config = ReconcileConfig::for_sources("/nope/f.csv", "/nope/a.csv");
        let err = run_reconciliation(&config).unwrap_err();
        assert!(matches!(
            err,
            RunError::Reconcile(ReconcileError::SourceUnavailable(_))
        ));
    }
}
