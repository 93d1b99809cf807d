//! Simulated home-automation devices with rule-based automation and
//! periodic random drift.

pub mod config;
pub mod devices;
pub mod error;
/// Snapshot export of device state.
pub mod io;
/// Automation engine, registry, scheduler and analysis.
pub mod sim;

pub use error::{ConfigError, SimError};
