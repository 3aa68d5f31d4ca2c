//! Analysis modules.
//!
//! Aggregation over the in-memory dataset.

pub mod aggregator;

pub use aggregator::*;
