//! Runtime bootstrap: logging and metric registration.

pub mod error;
pub mod telemetry;
