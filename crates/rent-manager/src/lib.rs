//! Affordable housing portfolio records plus the compliance and financial analytics
//! derived from them.

pub mod analytics;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod telemetry;
