//! CSV-backed forecast and actual stores.
//!
//! Forecast files carry `period,forecasted_at,forecast_lead,usage_price,export_price`
//! (lead in seconds); actual files carry `period,usage_price,export_price`.
//! Column order does not matter and any cell may be blank. A cell that does
//! not parse is treated as blank, so the record is later skipped and counted
//! instead of failing the read.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use forecastlab_core::{
    ActualRecord, ActualStore, ForecastRecord, ForecastStore, PeriodRange, SourceError,
};

/// Raw forecast row; every cell is kept as text until parsed.
#[derive(Debug, Default, Deserialize)]
struct ForecastRow {
    period: Option<String>,
    forecasted_at: Option<String>,
    forecast_lead: Option<String>,
    usage_price: Option<String>,
    export_price: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ActualRow {
    period: Option<String>,
    usage_price: Option<String>,
    export_price: Option<String>,
}

impl From<ForecastRow> for ForecastRecord {
    fn from(row: ForecastRow) -> Self {
        Self {
            period: parse_time(row.period.as_deref()),
            forecasted_at: parse_time(row.forecasted_at.as_deref()),
            forecast_lead_secs: parse_lead(row.forecast_lead.as_deref()),
            usage_price: parse_price(row.usage_price.as_deref()),
            export_price: parse_price(row.export_price.as_deref()),
        }
    }
}

impl From<ActualRow> for ActualRecord {
    fn from(row: ActualRow) -> Self {
        Self {
            period: parse_time(row.period.as_deref()),
            usage_price: parse_price(row.usage_price.as_deref()),
            export_price: parse_price(row.export_price.as_deref()),
        }
    }
}

/// Parse a timestamp cell: RFC 3339, or `YYYY-MM-DD HH:MM:SS+HH:MM`.
pub fn parse_time(cell: Option<&str>) -> Option<DateTime<Utc>> {
    let s = non_blank(cell)?;
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z"))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Parse a price cell as an exact decimal. Scientific notation is accepted.
pub fn parse_price(cell: Option<&str>) -> Option<Decimal> {
    let s = non_blank(cell)?;
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a lead cell as whole seconds.
pub fn parse_lead(cell: Option<&str>) -> Option<i64> {
    non_blank(cell)?.parse().ok()
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Read every row of `path` as `R`, then convert.
///
/// Rows the reader cannot decode come back as an all-blank row.
fn read_rows<R, T>(path: &Path, required: &[&str]) -> Result<Vec<T>, SourceError>
where
    R: for<'de> Deserialize<'de> + Default,
    T: From<R>,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let headers = reader
        .headers()
        .map_err(|e| SourceError::Decode(format!("{}: {e}", path.display())))?
        .clone();
    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(SourceError::Decode(format!(
            "{}: missing column '{missing}'",
            path.display()
        )));
    }

    let mut out = Vec::new();
    for (i, result) in reader.deserialize::<R>().enumerate() {
        match result {
            Ok(row) => out.push(T::from(row)),
            Err(e) => {
                warn!(path = %path.display(), line = i + 2, error = %e, "unreadable csv row");
                out.push(T::from(R::default()));
            }
        }
    }
    Ok(out)
}

/// Forecast observations stored in a CSV file. The file is re-read per query.
#[derive(Debug, Clone)]
pub struct CsvForecastStore {
    path: PathBuf,
    name: String,
}

impl CsvForecastStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ForecastStore for CsvForecastStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, range: &PeriodRange) -> Result<Vec<ForecastRecord>, SourceError> {
        let records: Vec<ForecastRecord> =
            read_rows::<ForecastRow, _>(&self.path, &["period", "usage_price", "export_price"])?;
        let total = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|r| range.admits(r.period))
            .collect();
        debug!(store = %self.name, total, kept = kept.len(), "read forecast csv");
        Ok(kept)
    }
}

/// Realized prices stored in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvActualStore {
    path: PathBuf,
    name: String,
}

impl CsvActualStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActualStore for CsvActualStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, range: &PeriodRange) -> Result<Vec<ActualRecord>, SourceError> {
        let records: Vec<ActualRecord> =
            read_rows::<ActualRow, _>(&self.path, &["period", "usage_price", "export_price"])?;
        let total = records.len();
        let kept: Vec<_> = records
            .into_iter()
            .filter(|r| range.admits(r.period))
            .collect();
        debug!(store = %self.name, total, kept = kept.len(), "read actual csv");
        Ok(kept)
    }
}
