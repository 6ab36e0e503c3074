//! Serializable reconciliation configuration.
//!
//! ```toml
//! [reconcile]
//! window_hours = 24
//! ranks = 3
//! now = "2024-05-01T12:00:00Z"
//!
//! [source]
//! forecasts = "data/forecasts.csv"
//! actuals = "data/actuals.csv"
//!
//! [issuance]
//! horizon_hours = 3
//! ```
//!
//! Every field except the source paths is optional. Relative source paths
//! are resolved against the directory of the config file.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use forecastlab_core::{
    RunParams, DEFAULT_ISSUANCE_HORIZON_HOURS, DEFAULT_RANKS, DEFAULT_WINDOW_HOURS,
};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub reconcile: ReconcileSection,
    pub source: SourceSection,
    #[serde(default)]
    pub issuance: IssuanceSection,
}

/// Window, rank depth, and evaluation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSection {
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    /// Overrides `window_hours` when set.
    #[serde(default)]
    pub window_secs: Option<i64>,
    #[serde(default = "default_ranks")]
    pub ranks: usize,
    /// Evaluation instant; the wall clock at run start when unset.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            window_secs: None,
            ranks: default_ranks(),
            now: None,
        }
    }
}

/// Locations of the forecast and actual CSV files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSection {
    pub forecasts: PathBuf,
    pub actuals: PathBuf,
}

/// Revision view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuanceSection {
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: i64,
}

impl Default for IssuanceSection {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon_hours(),
        }
    }
}

fn default_window_hours() -> i64 {
    DEFAULT_WINDOW_HOURS
}

fn default_ranks() -> usize {
    DEFAULT_RANKS
}

fn default_horizon_hours() -> i64 {
    DEFAULT_ISSUANCE_HORIZON_HOURS
}

impl ReconcileConfig {
    /// Config for two CSV files with every other setting at its default.
    pub fn for_sources(forecasts: impl Into<PathBuf>, actuals: impl Into<PathBuf>) -> Self {
        Self {
            reconcile: ReconcileSection::default(),
            source: SourceSection {
                forecasts: forecasts.into(),
                actuals: actuals.into(),
            },
            issuance: IssuanceSection::default(),
        }
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Parse and validate a TOML string. Paths are left as written.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Make relative source paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.source.forecasts, &mut self.source.actuals] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Reject window, rank, and horizon values the engine would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window_in_range = match self.reconcile.window_secs {
            Some(secs) => Duration::try_seconds(secs).is_some(),
            None => Duration::try_hours(self.reconcile.window_hours).is_some(),
        };
        if !window_in_range {
            return Err(ConfigError::Invalid(match self.reconcile.window_secs {
                Some(secs) => format!("reconcile.window_secs out of range, got {secs}"),
                None => format!(
                    "reconcile.window_hours out of range, got {}",
                    self.reconcile.window_hours
                ),
            }));
        }
        self.run_params()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let horizon = self.issuance.horizon_hours;
        if horizon <= 0 || Duration::try_hours(horizon).is_none() {
            return Err(ConfigError::Invalid(format!(
                "issuance.horizon_hours must be a positive number of hours, got {}",
                self.issuance.horizon_hours
            )));
        }
        Ok(())
    }

    /// Window length, preferring `window_secs` over `window_hours`.
    ///
    /// Out-of-range values map to zero; `validate` reports them first.
    pub fn window(&self) -> Duration {
        match self.reconcile.window_secs {
            Some(secs) => Duration::try_seconds(secs).unwrap_or(Duration::zero()),
            None => Duration::try_hours(self.reconcile.window_hours).unwrap_or(Duration::zero()),
        }
    }

    pub fn run_params(&self) -> RunParams {
        RunParams {
            window: self.window(),
            k: self.reconcile.ranks,
        }
    }

    pub fn horizon(&self) -> Duration {
        Duration::try_hours(self.issuance.horizon_hours).unwrap_or(Duration::zero())
    }

    /// The configured evaluation instant, or the wall clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.reconcile.now.unwrap_or_else(Utc::now)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::for_sources("forecasts.csv", "actuals.csv")
    }
}
