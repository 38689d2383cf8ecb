//! Synthetic daily closes for offline runs.
//!
//! Prices follow a geometric Brownian motion on weekdays:
//!
//! `S(t+1) = S(t) * exp((μ - σ²/2) Δt + σ √Δt z)`, with `Δt = 1/252`.
//!
//! Drift and volatility come from a per-ticker profile that roughly matches each
//! fund's long-run behaviour. The RNG is seeded from `(seed, ticker)` through a
//! fixed FNV-1a mix, so the same inputs always produce the same series,
//! independent of fetch order and toolchain.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::data::PriceSeriesProvider;
use crate::domain::{PricePoint, PriceSeries, TRADING_DAYS_PER_YEAR};
use crate::error::ProviderError;

/// Annual drift, annual volatility and starting price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerProfile {
    pub drift: f64,
    pub volatility: f64,
    pub start_price: f64,
}

pub fn profile_for(ticker: &str) -> TickerProfile {
    let (drift, volatility, start_price) = match ticker {
        "SPY" | "IVV" | "VOO" => (0.10, 0.17, 400.0),
        "VTI" => (0.10, 0.18, 200.0),
        "QQQ" => (0.14, 0.23, 350.0),
        "EEM" => (0.04, 0.21, 40.0),
        "IEMG" => (0.04, 0.20, 50.0),
        "BND" => (0.02, 0.05, 75.0),
        "GLD" => (0.06, 0.15, 170.0),
        _ => (0.07, 0.20, 100.0),
    };
    TickerProfile {
        drift,
        volatility,
        start_price,
    }
}

pub struct SyntheticProvider {
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn ticker_seed(&self, ticker: &str) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
        let hash = ticker
            .bytes()
            .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
        hash ^ self.seed
    }
}

impl PriceSeriesProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError> {
        let profile = profile_for(ticker);
        let normal = Normal::new(0.0, 1.0).map_err(|e| ProviderError::Malformed {
            ticker: ticker.to_string(),
            message: format!("noise distribution error: {e}"),
        })?;
        let mut rng = StdRng::seed_from_u64(self.ticker_seed(ticker));

        let dt = 1.0 / TRADING_DAYS_PER_YEAR as f64;
        let drift = (profile.drift - 0.5 * profile.volatility * profile.volatility) * dt;
        let diffusion = profile.volatility * dt.sqrt();

        let mut points = Vec::new();
        let mut price = profile.start_price;
        let mut date = start;
        while date < end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                if !points.is_empty() {
                    let z: f64 = normal.sample(&mut rng);
                    price *= (drift + diffusion * z).exp();
                }
                points.push(PricePoint { date, close: price });
            }
            date += Duration::days(1);
        }
        Ok(PriceSeries::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn deterministic_for_same_seed_and_ticker() {
        let p = SyntheticProvider::new(7);
        let a = p.fetch("SPY", d(2023, 1, 1), d(2023, 6, 1)).unwrap();
        let b = p.fetch("SPY", d(2023, 1, 1), d(2023, 6, 1)).unwrap();
        let c = p.fetch("QQQ", d(2023, 1, 1), d(2023, 6, 1)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn ticker_seed_is_a_fixed_mix() {
        assert_eq!(SyntheticProvider::new(0).ticker_seed("SPY"), 0x97fc_9619_fa5d_47fd);
        assert_eq!(SyntheticProvider::new(7).ticker_seed("SPY"), 0x97fc_9619_fa5d_47fa);
        assert_ne!(
            SyntheticProvider::new(7).ticker_seed("QQQ"),
            SyntheticProvider::new(7).ticker_seed("SPY")
        );
    }

    #[test]
    fn weekdays_only_and_positive() {
        let s = SyntheticProvider::new(1)
            .fetch("GLD", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap();
        // January 2024 has 23 weekdays.
        assert_eq!(s.len(), 23);
        assert!(s.points().iter().all(|p| p.close > 0.0));
        assert!(s.points().iter().all(|p| p.date.weekday().number_from_monday() <= 5));
        assert_eq!(s.first().unwrap().close, profile_for("GLD").start_price);
    }

    #[test]
    fn empty_range_is_empty_series() {
        let s = SyntheticProvider::new(1).fetch("SPY", d(2024, 1, 5), d(2024, 1, 5)).unwrap();
        assert!(s.is_empty());
    }
}
