//! Integration tests for the runner's CSV pipeline.
//!
//! Writes forecast and actual files into a temp directory, then runs the
//! reconciliation and revision views through the config and export layers.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use forecastlab_core::{
    ActualStore, ForecastStore, PeriodRange, ReconcileError, RecordKind, SkipReason,
};
use forecastlab_runner::{
    export_revisions_csv, export_rows_csv, export_rows_json, render_revisions_table,
    render_summary, render_table, run_reconciliation, run_revisions, CsvActualStore,
    CsvForecastStore, ReconcileConfig, RunError,
};
use rust_decimal_macros::dec;
use tempfile::TempDir;

const FORECASTS: &str = "\
period,forecasted_at,forecast_lead,usage_price,export_price
2024-05-01T12:00:00Z,2024-05-01T11:30:00Z,1800,10.00,2.00
2024-05-01T12:00:00Z,2024-05-01T11:00:00Z,3600,12.00,3.00
2024-05-01T12:00:00Z,2024-05-01T10:30:00Z,5400,15.00,4.00
2024-05-01T18:00:00Z,,3600,20.00,5.00
,2024-05-01T11:00:00Z,1800,9.00,1.00
2024-05-01T12:30:00Z,2024-05-01T12:00:00Z,1800,not-a-price,1.00
";

const ACTUALS: &str = "\
period,usage_price,export_price
2024-05-01T12:00:00Z,11.00,2.50
2024-05-01T11:00:00Z,8.00,1.50
2024-04-29T11:00:00Z,8.00,1.50
";

fn write_fixture(dir: &Path) {
    fs::write(dir.join("forecasts.csv"), FORECASTS).unwrap();
    fs::write(dir.join("actuals.csv"), ACTUALS).unwrap();
}

fn config_in(dir: &TempDir) -> ReconcileConfig {
    write_fixture(dir.path());
    let toml = r#"
[reconcile]
now = "2024-05-01T13:00:00Z"

[source]
forecasts = "forecasts.csv"
actuals = "actuals.csv"
"#;
    let path = dir.path().join("forecastlab.toml");
    fs::write(&path, toml).unwrap();
    ReconcileConfig::from_file(&path).unwrap()
}

// ── Stores ───────────────────────────────────────────────────────────

#[test]
fn csv_stores_filter_by_range_but_keep_periodless_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let forecasts = CsvForecastStore::new(dir.path().join("forecasts.csv"));
    let range = PeriodRange::between(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
    );
    let records = forecasts.query(&range).unwrap();
    // Three noon rows, the 12:30 row, and the row without a period.
    assert_eq!(records.len(), 5);
    assert_eq!(records.iter().filter(|r| r.period.is_none()).count(), 1);

    let actuals = CsvActualStore::new(dir.path().join("actuals.csv"));
    assert_eq!(actuals.query(&PeriodRange::all()).unwrap().len(), 3);
}

#[test]
fn columns_may_appear_in_any_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actuals.csv");
    fs::write(
        &path,
        "export_price,period,usage_price\n2.50,2024-05-01T12:00:00Z,11.00\n",
    )
    .unwrap();

    let records = CsvActualStore::new(&path).query(&PeriodRange::all()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].usage_price, Some(dec!(11.00)));
    assert_eq!(records[0].export_price, Some(dec!(2.50)));
}

#[test]
fn short_rows_become_blank_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actuals.csv");
    fs::write(
        &path,
        "period,usage_price,export_price\n2024-05-01T12:00:00Z,11.00\n",
    )
    .unwrap();

    let records = CsvActualStore::new(&path).query(&PeriodRange::all()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].export_price, None);
}

#[test]
fn missing_column_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actuals.csv");
    fs::write(&path, "period,usage_price\n2024-05-01T12:00:00Z,11.00\n").unwrap();

    let err = CsvActualStore::new(&path)
        .query(&PeriodRange::all())
        .unwrap_err();
    assert!(err.to_string().contains("export_price"));
}

// ── Reconciliation ───────────────────────────────────────────────────

#[test]
fn reconciles_csv_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let run = run_reconciliation(&config).unwrap();
    let times: Vec<_> = run.rows.iter().map(|r| r.time.to_rfc3339()).collect();
    assert_eq!(
        times,
        vec![
            "2024-05-01T11:00:00+00:00",
            "2024-05-01T12:00:00+00:00",
            "2024-05-01T18:00:00+00:00",
        ]
    );

    let noon = &run.rows[1];
    assert_eq!(
        noon.usage_forecasts,
        vec![Some(dec!(10.00)), Some(dec!(12.00)), Some(dec!(15.00))]
    );
    assert_eq!(noon.usage_delta, Some(dec!(1.00)));
    assert_eq!(noon.export_delta, Some(dec!(0.50)));

    // Actual-only row
    assert_eq!(run.rows[0].usage_forecasts, vec![None, None, None]);
    assert_eq!(run.rows[0].usage_delta, None);

    // Lead-only forecast for a future period
    assert_eq!(run.rows[2].usage_forecast_1(), Some(dec!(20.00)));
    assert_eq!(run.rows[2].actual_usage_price, None);

    assert_eq!(run.skipped.count(RecordKind::Forecast, SkipReason::MissingPeriod), 1);
    assert_eq!(run.skipped.count(RecordKind::Forecast, SkipReason::MissingPrice), 1);
    assert_eq!(run.skipped.total(), 2);
}

#[test]
fn reruns_share_a_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let a = run_reconciliation(&config).unwrap();
    let b = run_reconciliation(&config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn missing_source_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReconcileConfig::for_sources(
        dir.path().join("absent.csv"),
        dir.path().join("absent_too.csv"),
    );

    let err = run_reconciliation(&config).unwrap_err();
    assert!(matches!(
        err,
        RunError::Reconcile(ReconcileError::SourceUnavailable(_))
    ));
}

// ── Export ───────────────────────────────────────────────────────────

#[test]
fn csv_export_has_rank_columns_and_empty_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_reconciliation(&config_in(&dir)).unwrap();

    let csv = export_rows_csv(&run.rows, run.k).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "time,actual_usage_price,usage_forecast_1,usage_forecast_2,usage_forecast_3,usage_delta,\
         actual_export_price,export_forecast_1,export_forecast_2,export_forecast_3,export_delta"
    );
    assert_eq!(lines[1], "2024-05-01T11:00:00+00:00,8.00,,,,,1.50,,,,");
    assert_eq!(
        lines[2],
        "2024-05-01T12:00:00+00:00,11.00,10.00,12.00,15.00,1.00,2.50,2.00,3.00,4.00,0.50"
    );
    assert_eq!(lines.len(), 4);
}

#[test]
fn json_export_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_reconciliation(&config_in(&dir)).unwrap();

    let json = export_rows_json(&run).unwrap();
    let back: forecastlab_core::Reconciliation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, run);
}

#[test]
fn table_and_summary_render() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_reconciliation(&config_in(&dir)).unwrap();

    let table = render_table(&run.rows, run.k);
    assert_eq!(table.lines().count(), 2 + run.rows.len());
    assert!(table.lines().next().unwrap().starts_with("time"));

    let summary = render_summary(&run);
    assert!(summary.contains("3 rows, 2 settled"));
    assert!(summary.contains("usage  matched=1 mean_delta=1"));
    assert!(summary.contains(&run.fingerprint()));
}

// ── Revisions ────────────────────────────────────────────────────────

#[test]
fn revision_view_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    config.issuance.horizon_hours = 1;

    let run = run_revisions(&config).unwrap();
    // Noon has leads 30m and 60m inside the horizon; 18:00 has one at 60m.
    assert_eq!(run.periods.len(), 2);
    let noon = &run.periods[0].revisions;
    assert_eq!(noon.len(), 2);
    assert_eq!(noon[0].usage_price, dec!(12.00));
    assert_eq!(noon[0].usage_revision, None);
    assert_eq!(noon[1].usage_revision, Some(dec!(-2.00)));

    let csv = export_revisions_csv(&run).unwrap();
    assert_eq!(csv.lines().count(), 1 + 3);
    let table = render_revisions_table(&run);
    assert!(table.contains("usage_rev"));
}
