//! Return and risk analytics.
//!
//! - per-series trailing windows (`period`)
//! - weighted portfolio return/volatility (`portfolio`)
//! - chart overlays: moving averages and a momentum oscillator (`indicators`)

pub mod indicators;
pub mod period;
pub mod portfolio;

pub use indicators::*;
pub use period::*;
pub use portfolio::*;
