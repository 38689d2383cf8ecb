//! Mathematical utilities: slice statistics and return-matrix covariance.

pub mod covariance;
pub mod stats;

pub use covariance::*;
pub use stats::*;
