//! Price series retrieval.
//!
//! Providers sit behind `PriceSeriesProvider` so the analytics never know where
//! prices came from. Failures are reported as `ProviderError`; the pipeline
//! turns them into empty series via `fetch_or_empty`, so one ticker failing
//! never blocks the others.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{PriceSeries, SeriesKey};
use crate::error::ProviderError;

pub mod csv_dir;
pub mod synthetic;
pub mod yahoo;

pub use csv_dir::CsvDirectory;
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooClient;

pub trait PriceSeriesProvider {
    /// Short label for logs and reports.
    fn name(&self) -> &'static str;

    /// Daily closes for `ticker` in `[start, end)`, oldest first.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError>;
}

/// Fetch, degrading any failure to an empty series.
pub fn fetch_or_empty(
    provider: &dyn PriceSeriesProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> PriceSeries {
    match provider.fetch(ticker, start, end) {
        Ok(series) => {
            if series.is_empty() {
                warn!(ticker, source = provider.name(), "no price data returned");
            }
            series
        }
        Err(err) => {
            warn!(ticker, source = provider.name(), error = %err, "price fetch failed; continuing without data");
            PriceSeries::empty()
        }
    }
}

/// Memoizes successful fetches by `(ticker, start, end)` for the session.
pub struct CachedProvider<P> {
    inner: P,
    cache: RefCell<HashMap<SeriesKey, PriceSeries>>,
}

impl<P: PriceSeriesProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<P: PriceSeriesProvider> PriceSeriesProvider for CachedProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError> {
        let key = SeriesKey {
            ticker: ticker.to_string(),
            start,
            end,
        };
        if let Some(hit) = self.cache.borrow().get(&key) {
            debug!(ticker, %start, %end, "price cache hit");
            return Ok(hit.clone());
        }
        let series = self.inner.fetch(ticker, start, end)?;
        self.cache.borrow_mut().insert(key, series.clone());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        fail: bool,
    }

    impl PriceSeriesProvider for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn fetch(&self, ticker: &str, start: NaiveDate, _end: NaiveDate) -> Result<PriceSeries, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(ProviderError::NotFound(ticker.to_string()));
            }
            Ok(PriceSeries::from_pairs([(start, 1.0)]))
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn cache_reuses_same_key() {
        let cached = CachedProvider::new(Counting {
            calls: Cell::new(0),
            fail: false,
        });
        cached.fetch("SPY", d(1), d(10)).unwrap();
        cached.fetch("SPY", d(1), d(10)).unwrap();
        cached.fetch("SPY", d(2), d(10)).unwrap();
        cached.fetch("QQQ", d(1), d(10)).unwrap();
        assert_eq!(cached.inner.calls.get(), 3);
        assert_eq!(cached.cached_len(), 3);
    }

    #[test]
    fn failures_are_not_cached_and_degrade_to_empty() {
        let cached = CachedProvider::new(Counting {
            calls: Cell::new(0),
            fail: true,
        });
        assert!(fetch_or_empty(&cached, "SPY", d(1), d(10)).is_empty());
        assert!(fetch_or_empty(&cached, "SPY", d(1), d(10)).is_empty());
        assert_eq!(cached.inner.calls.get(), 2);
        assert_eq!(cached.cached_len(), 0);
    }
}
