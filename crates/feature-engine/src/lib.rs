//! Feature Engineering Engine
//!
//! Provides the window statistics used to judge how consistent a sensor's
//! recent history is.

mod statistics;

pub use statistics::{linear_trend, StatisticalFeatures};
