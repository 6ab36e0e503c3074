//! Rendering reconciliation output: CSV, JSON, and plain-text tables.
//!
//! Nulls render as empty cells in CSV and as `-` in tables. Decimals are
//! written with the scale they were read with.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use forecastlab_core::{AccuracySummary, Reconciliation, ReconciliationRow, RevisionRun};

fn cell(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn table_cell(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

/// Column names for `k` ranks, in output order.
pub fn row_headers(k: usize) -> Vec<String> {
    let mut headers = vec!["time".to_string(), "actual_usage_price".to_string()];
    headers.extend((1..=k).map(|r| format!("usage_forecast_{r}")));
    headers.push("usage_delta".into());
    headers.push("actual_export_price".into());
    headers.extend((1..=k).map(|r| format!("export_forecast_{r}")));
    headers.push("export_delta".into());
    headers
}

fn row_cells(row: &ReconciliationRow, k: usize, null: fn(Option<Decimal>) -> String) -> Vec<String> {
    let rank = |prices: &[Option<Decimal>], r: usize| null(prices.get(r).copied().flatten());

    let mut cells = Vec::with_capacity(2 * k + 5);
    cells.push(row.time.to_rfc3339());
    cells.push(null(row.actual_usage_price));
    cells.extend((0..k).map(|r| rank(&row.usage_forecasts, r)));
    cells.push(null(row.usage_delta));
    cells.push(null(row.actual_export_price));
    cells.extend((0..k).map(|r| rank(&row.export_forecasts, r)));
    cells.push(null(row.export_delta));
    cells
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Rows as CSV with `k` rank columns per price type.
pub fn export_rows_csv(rows: &[ReconciliationRow], k: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(row_headers(k))?;
    for row in rows {
        wtr.write_record(row_cells(row, k, cell))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Issuance revisions as CSV, one line per issuance.
pub fn export_revisions_csv(run: &RevisionRun) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "period",
        "forecasted_at",
        "forecast_lead",
        "usage_price",
        "usage_revision",
        "export_price",
        "export_revision",
    ])?;
    for rev in run.periods.iter().flat_map(|p| &p.revisions) {
        wtr.write_record([
            rev.period.to_rfc3339(),
            rev.forecasted_at.to_rfc3339(),
            rev.forecast_lead_secs.to_string(),
            rev.usage_price.to_string(),
            cell(rev.usage_revision),
            rev.export_price.to_string(),
            cell(rev.export_revision),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON ───────────────────────────────────────────────────────────

/// The whole run, rows plus skip report and parameters, as pretty JSON.
pub fn export_rows_json(run: &Reconciliation) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize reconciliation to JSON")
}

pub fn export_revisions_json(run: &RevisionRun) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize revisions to JSON")
}

// ─── Plain text ─────────────────────────────────────────────────────

fn render_grid(headers: &[String], body: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for line in body {
        for (w, c) in widths.iter_mut().zip(line) {
            *w = (*w).max(c.len());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, &w))| {
                if i == 0 {
                    format!("{c:<w$}")
                } else {
                    format!("{c:>w$}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    push_line(headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&rule);
    for line in body {
        push_line(line);
    }
    out
}

/// Fixed-width table of rows for a terminal.
pub fn render_table(rows: &[ReconciliationRow], k: usize) -> String {
    if rows.is_empty() {
        return "No periods in window.\n".into();
    }
    let body: Vec<Vec<String>> = rows.iter().map(|r| row_cells(r, k, table_cell)).collect();
    render_grid(&row_headers(k), &body)
}

/// Fixed-width table of issuance revisions, grouped by period.
pub fn render_revisions_table(run: &RevisionRun) -> String {
    if run.periods.is_empty() {
        return "No issuances within the horizon.\n".into();
    }
    let headers: Vec<String> = [
        "period",
        "forecasted_at",
        "lead_min",
        "usage",
        "usage_rev",
        "export",
        "export_rev",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let body: Vec<Vec<String>> = run
        .periods
        .iter()
        .flat_map(|p| &p.revisions)
        .map(|rev| {
            vec![
                rev.period.to_rfc3339(),
                rev.forecasted_at.to_rfc3339(),
                (rev.forecast_lead_secs / 60).to_string(),
                rev.usage_price.to_string(),
                table_cell(rev.usage_revision),
                rev.export_price.to_string(),
                table_cell(rev.export_revision),
            ]
        })
        .collect();
    render_grid(&headers, &body)
}

/// Short accuracy and skip summary printed after a table.
pub fn render_summary(run: &Reconciliation) -> String {
    let summary = AccuracySummary::from_rows(&run.rows);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} rows, {} settled, window {}s, k={}",
        summary.rows, summary.settled, run.window_secs, run.k
    );
    for (label, series) in [("usage", &summary.usage), ("export", &summary.export)] {
        let _ = writeln!(
            out,
            "{label:<6} matched={} mean_delta={} mean_abs_delta={} max_abs_delta={}{}",
            series.matched,
            table_cell(series.mean_delta),
            table_cell(series.mean_abs_delta),
            table_cell(series.max_abs_delta),
            series
                .max_abs_delta_time
                .map(|t| format!(" at {}", t.to_rfc3339()))
                .unwrap_or_default(),
        );
    }
    let _ = writeln!(out, "skipped: {}", run.skipped);
    let _ = writeln!(out, "fingerprint: {}", run.fingerprint());
    out
}
