//! HTTP Route Handlers

pub mod analyze;
pub mod model;
pub mod sensors;
pub mod statistics;
