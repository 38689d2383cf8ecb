//! Portfolio construction.
//!
//! - weights: selection-driven initialization and normalization (`weights`)
//! - date alignment of several series (`align`)
//! - weighted value series (`aggregate`)

pub mod aggregate;
pub mod align;
pub mod weights;

pub use aggregate::*;
pub use align::*;
pub use weights::*;
