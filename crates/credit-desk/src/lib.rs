//! Scoring engine and approval lifecycle for credit applications.

pub mod applications;
pub mod clients;
pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;
