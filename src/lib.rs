//! `etf-planner` library crate.
//!
//! The binary (`etfsim`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - analytics stay independent of where prices come from
//! - code stays easy to navigate as the project grows

pub mod analytics;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod portfolio;
pub mod projection;
pub mod report;
