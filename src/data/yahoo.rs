//! Yahoo Finance chart API integration (daily closes).

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::PriceSeriesProvider;
use crate::domain::{PricePoint, PriceSeries};
use crate::error::{AppError, EXIT_INPUT, ProviderError};

const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Build a client, honouring `YAHOO_CHART_URL` and `ETFSIM_USER_AGENT`.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url = std::env::var("YAHOO_CHART_URL").unwrap_or_else(|_| DEFAULT_CHART_URL.to_string());
        let user_agent = std::env::var("ETFSIM_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl PriceSeriesProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, ProviderError> {
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end);
        let url = format!("{}/{}", self.base_url, ticker);
        debug!(%url, period1, period2, "fetching Yahoo chart");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| ProviderError::Request {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ProviderError::Request {
                ticker: ticker.to_string(),
                message: format!("status {}", resp.status()),
            });
        }

        let body: ChartResponse = resp.json().map_err(|e| ProviderError::Malformed {
            ticker: ticker.to_string(),
            message: e.to_string(),
        })?;

        let series = parse_chart(ticker, body)?;
        // period2 is exclusive on our side even if the API returns the end day.
        Ok(PriceSeries::new(
            series.points().iter().copied().filter(|p| p.date >= start && p.date < end).collect(),
        ))
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Turn a chart payload into a series.
///
/// Adjusted closes are preferred; raw closes are the fallback. Null values are
/// skipped. Timestamps are shifted by the exchange's GMT offset before taking
/// the calendar date.
fn parse_chart(ticker: &str, body: ChartResponse) -> Result<PriceSeries, ProviderError> {
    if let Some(err) = body.chart.error {
        return Err(ProviderError::Request {
            ticker: ticker.to_string(),
            message: format!("{}: {}", err.code, err.description),
        });
    }
    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::NotFound(ticker.to_string()))?;

    let offset = result.meta.as_ref().map(|m| m.gmtoffset).unwrap_or(0);
    let closes = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut points = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::Malformed {
                ticker: ticker.to_string(),
                message: format!("invalid timestamp {ts}"),
            })?
            .date_naive();
        points.push(PricePoint { date, close });
    }
    Ok(PriceSeries::new(points))
}
