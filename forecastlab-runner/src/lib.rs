//! ForecastLab Runner — runs the reconciliation engine against real data.
//!
//! This crate builds on `forecastlab-core` to provide:
//! - TOML configuration with defaults and eager validation
//! - CSV-backed forecast and actual stores
//! - Run entry points that capture `now` once per run
//! - CSV, JSON, and plain-text renderers for the output

pub mod config;
pub mod csv_store;
pub mod export;
pub mod runner;

pub use config::{ConfigError, IssuanceSection, ReconcileConfig, ReconcileSection, SourceSection};
pub use csv_store::{CsvActualStore, CsvForecastStore};
pub use export::{
    export_revisions_csv, export_revisions_json, export_rows_csv, export_rows_json,
    render_revisions_table, render_summary, render_table,
};
pub use runner::{run_reconciliation, run_revisions, RunError};
