//! Cook-log CSV export and re-import.
//!
//! Layout:
//! Timestamp,Pit Temp,Meat 1 Temp,Fan Speed
//! 2024-05-04T14:02:11.000Z,224.6,161.3,35
//!
//! Timestamps are RFC 3339 UTC with milliseconds; temperatures carry one
//! decimal. The meat column is the primary probe and is left empty when a
//! sample has no probes.
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use pitwatch_traits::Sample;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::FanColumn;
use crate::error::MonitorError;

pub const HEADERS: [&str; 4] = ["Timestamp", "Pit Temp", "Meat 1 Temp", "Fan Speed"];

/// One re-parsed cook-log row.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Pit Temp")]
    pub pit: f64,
    #[serde(rename = "Meat 1 Temp")]
    pub meat: Option<f64>,
    #[serde(rename = "Fan Speed")]
    pub fan: u8,
}

/// Export with the current fan duty on every row.
pub fn export_csv<'a, I>(history: I, current_fan: u8) -> Result<String, MonitorError>
where
    I: IntoIterator<Item = &'a Sample>,
{
    export_csv_with(history, FanColumn::Current(current_fan))
}

pub fn export_csv_with<'a, I>(history: I, fan: FanColumn) -> Result<String, MonitorError>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(HEADERS)
        .map_err(|e| MonitorError::Export(e.to_string()))?;
    for s in history {
        let ts = s.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let pit = format!("{:.1}", s.pit);
        let meat = s
            .primary_probe()
            .map(|p| format!("{:.1}", p.temperature))
            .unwrap_or_default();
        let duty = match fan {
            FanColumn::Current(d) => d,
            FanColumn::PerSample => s.fan_duty,
        };
        wtr.write_record([ts, pit, meat, duty.to_string()])
            .map_err(|e| MonitorError::Export(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| MonitorError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| MonitorError::Export(e.to_string()))
}

/// `cook_log_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("cook_log_{}.csv", date.format("%Y-%m-%d"))
}

/// Write a cook log into `dir` atomically and return its path.
pub fn write_export(dir: &Path, date: NaiveDate, csv: &str) -> Result<PathBuf, MonitorError> {
    let path = dir.join(export_file_name(date));
    crate::atomic::write_atomic(&path, csv.as_bytes())
        .map_err(|e| MonitorError::Io(format!("write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "cook log written");
    Ok(path)
}

/// Parse a cook log produced by `export_csv`. Headers must match exactly.
pub fn parse_csv(data: &[u8]) -> Result<Vec<LogRow>, MonitorError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = rdr
        .headers()
        .map_err(|e| MonitorError::Export(format!("read CSV headers: {e}")))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != HEADERS {
        return Err(MonitorError::Export(format!(
            "cook log must have headers '{}', got: {}",
            HEADERS.join(","),
            actual.join(",")
        )));
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<LogRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                return Err(MonitorError::Export(format!(
                    "invalid CSV row {}: {}",
                    idx + 2,
                    e
                )));
            }
        }
    }
    Ok(rows)
}

pub fn load_csv(path: &Path) -> Result<Vec<LogRow>, MonitorError> {
    let data = std::fs::read(path)
        .map_err(|e| MonitorError::Io(format!("open cook log {}: {e}", path.display())))?;
    parse_csv(&data)
}
