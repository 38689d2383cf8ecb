//! Prices from a directory of `<TICKER>.csv` files.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use crate::data::PriceSeriesProvider;
use crate::domain::PriceSeries;
use crate::error::ProviderError;
use crate::io::ingest::read_price_csv;

pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }
}

impl PriceSeriesProvider for CsvDirectory {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError> {
        let path = self.path_for(ticker);
        let ingested = read_price_csv(&path, ticker, start, end)?;
        debug!(
            ticker,
            path = %path.display(),
            rows_read = ingested.rows_read,
            kept = ingested.series.len(),
            "loaded CSV prices"
        );
        Ok(ingested.series)
    }
}
