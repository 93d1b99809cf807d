//! Error types shared across the simulator.

use crate::devices::DeviceId;

/// Errors surfaced by the simulator to its callers.
///
/// Device setters never produce errors: out-of-range values are clamped.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Invalid configuration value (interval, probabilities, ranges, ...).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A device with the same id is already registered.
    #[error("device \"{id}\" is already registered")]
    DuplicateDevice {
        /// The colliding device id.
        id: DeviceId,
    },

    /// `run_periodic_simulation` was called while a simulation is running.
    #[error("periodic simulation is already running")]
    AlreadyRunning,

    /// The periodic task ended before the requested number of ticks ran.
    #[error("periodic simulation stopped after {ticks} ticks")]
    Stopped {
        /// Ticks completed when the task was found stopped.
        ticks: u64,
    },

    /// Writing an export failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV export failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.interval_secs"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
