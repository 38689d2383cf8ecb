//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - price data (`PriceSeries`, `AssetSeries`, `SeriesKey`)
//! - analytics outputs (`PeriodStats`, `PortfolioStats`, `SimulationResult`)
//! - run configuration (`PlannerConfig` and its enums)

pub mod types;

pub use types::*;
