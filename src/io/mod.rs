//! Input/output helpers.
//!
//! - CSV price ingest (`ingest`)
//! - trajectory/portfolio CSV and run-summary JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
