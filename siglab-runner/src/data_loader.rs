//! CSV bar loading.
//!
//! Expects a header `timestamp,open,high,low,close,volume` (extra columns are
//! ignored). Timestamps may be RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC assumed)
//! or a bare `YYYY-MM-DD` (midnight UTC). The loaded series is validated
//! before it is returned; a file that loads is a file the core can use.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use siglab_core::domain::{validate_series, Bar, BarError};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("no bars in input")]
    Empty,

    #[error("invalid bar series: {0}")]
    Invalid(#[from] BarError),
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub fn load_csv_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_csv_bars(file)?;
    debug!(path = %path.display(), bars = bars.len(), "loaded bars from CSV");
    Ok(bars)
}

pub fn read_csv_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, record) in rdr.deserialize::<CsvBar>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        bars.push(Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    validate_series(&bars)?;
    Ok(bars)
}

/// Write bars in the format [`read_csv_bars`] accepts.
pub fn write_csv_bars(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        wtr.write_record([
            bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Parse a timestamp into naive UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    #[test]
    fn parses_supported_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01T13:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T15:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 13:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("01/03/2024"), None);
    }

    #[test]
    fn reads_bars_in_order() {
        let csv = format!(
            "{HEADER}2024-01-01 00:00:00,100,101,99,100.5,10\n2024-01-01 01:00:00,100.5,102,100,101,12\n"
        );
        let bars = read_csv_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 101.0);
        assert_eq!(bars[1].volume, 12.0);
    }

    #[test]
    fn rejects_out_of_order_rows() {
        let csv = format!(
            "{HEADER}2024-01-01 01:00:00,100,101,99,100.5,10\n2024-01-01 00:00:00,100.5,102,100,101,12\n"
        );
        assert!(matches!(
            read_csv_bars(csv.as_bytes()),
            Err(LoadError::Invalid(BarError::NotIncreasing { index: 1, .. }))
        ));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let csv = format!("{HEADER}yesterday,100,101,99,100.5,10\n");
        match read_csv_bars(csv.as_bytes()) {
            Err(LoadError::Timestamp { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inconsistent_ohlc() {
        let csv = format!("{HEADER}2024-01-01,100,99,98,100.5,10\n");
        assert!(matches!(read_csv_bars(csv.as_bytes()), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(read_csv_bars(HEADER.as_bytes()), Err(LoadError::Empty)));
    }
}
