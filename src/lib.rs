//! SMAAWA Monitor - water-level monitoring dashboard for SMAAWA devices
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod refresh;
pub mod routes;
pub mod series;
pub mod smaawa;
pub mod store;
