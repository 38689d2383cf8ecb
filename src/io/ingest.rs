//! CSV price ingest.
//!
//! Turns a daily price export into a clean `PriceSeries`.
//!
//! - **Strict schema** for required columns: a date column and a close column
//! - **Row-level validation**: bad rows are skipped and counted, not fatal
//! - **Deterministic**: rows are sorted by date; duplicates keep the later row

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{PricePoint, PriceSeries};
use crate::error::ProviderError;

/// Close columns in order of preference.
const CLOSE_COLUMNS: [&str; 4] = ["adj close", "adj_close", "adjclose", "close"];

/// Ingest output: the series plus row bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedPrices {
    pub series: PriceSeries,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Read `path`, keeping rows dated in `[start, end)`.
pub fn read_price_csv(
    path: &Path,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IngestedPrices, ProviderError> {
    let file = File::open(path).map_err(|e| ProviderError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ProviderError::Malformed {
            ticker: ticker.to_string(),
            message: format!("failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map.get("date").ok_or_else(|| ProviderError::Malformed {
        ticker: ticker.to_string(),
        message: "missing required column `Date`".into(),
    })?;
    let close_idx = CLOSE_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| ProviderError::Malformed {
            ticker: ticker.to_string(),
            message: "missing a `Close` or `Adj Close` column".into(),
        })?;

    let mut points = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, date_idx, close_idx));
        match parsed {
            Ok(point) => {
                if point.date >= start && point.date < end {
                    points.push(point);
                }
            }
            Err(message) => {
                debug!(ticker, line, %message, "skipping CSV row");
                rows_skipped += 1;
            }
        }
    }

    if rows_skipped > 0 {
        warn!(ticker, rows_skipped, rows_read, "some CSV rows were not usable");
    }

    Ok(IngestedPrices {
        series: PriceSeries::new(points),
        rows_read,
        rows_skipped,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, date_idx: usize, close_idx: usize) -> Result<PricePoint, String> {
    let raw_date = record
        .get(date_idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing date".to_string())?;
    let date = parse_date(raw_date)?;

    let raw_close = record
        .get(close_idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing close".to_string())?;
    let close = raw_close
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| format!("invalid close '{raw_close}'"))?;

    Ok(PricePoint { date, close })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO is expected; a few common export formats are accepted, as is a
    // trailing time component ("2024-01-02 00:00:00-05:00").
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let candidates = [s, s.get(..10).unwrap_or(s)];
    for candidate in candidates {
        for fmt in FMTS {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
                return Ok(d);
            }
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("etfsim_ingest_{}_{name}.csv", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reads_adjusted_close_and_skips_bad_rows() {
        let path = write_temp(
            "adj",
            "\u{feff}Date,Open,Close,Adj Close\n\
             2024-01-03,1,101,100.5\n\
             2024-01-02,1,100,99.5\n\
             not-a-date,1,1,1\n\
             2024-01-04,1,102,\n\
             2024-01-05 00:00:00-05:00,1,103,102.5\n",
        );
        let out = read_price_csv(&path, "SPY", d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(out.rows_read, 5);
        assert_eq!(out.rows_skipped, 2);
        assert_eq!(out.series.closes(), vec![99.5, 100.5, 102.5]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn filters_to_half_open_range() {
        let path = write_temp("range", "date,close\n2024-01-02,1\n2024-01-03,2\n2024-01-04,3\n");
        let out = read_price_csv(&path, "SPY", d(2024, 1, 3), d(2024, 1, 4)).unwrap();
        assert_eq!(out.series.closes(), vec![2.0]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_columns_are_malformed() {
        let path = write_temp("cols", "day,price\n2024-01-02,1\n");
        let err = read_price_csv(&path, "SPY", d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_price_csv(Path::new("/nonexistent/SPY.csv"), "SPY", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Io { .. }));
    }
}
