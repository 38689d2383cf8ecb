//! Long-horizon wealth projection under periodic contributions.

pub mod simulator;

pub use simulator::*;
