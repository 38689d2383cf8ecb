//! Reporting: plain-text tables for the terminal.

pub mod format;

pub use format::*;
