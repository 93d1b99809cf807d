use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::devices::types::{Device, DeviceId, write_base};

/// Default per-tick probability that an active camera raises an alert.
pub const DEFAULT_ALERT_PROBABILITY: f64 = 0.1;

/// Security state of a camera.
///
/// `Idle` and `Recording` are accepted as aliases of [`SecurityState::Disarmed`]
/// and [`SecurityState::Armed`] when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SecurityState {
    #[default]
    Disarmed,
    Armed,
    Alert,
}

impl SecurityState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::Armed => "Armed",
            Self::Alert => "Alert",
        }
    }
}

impl fmt::Display for SecurityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized security state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown security state \"{0}\", expected Disarmed, Armed or Alert")]
pub struct ParseSecurityStateError(String);

impl FromStr for SecurityState {
    type Err = ParseSecurityStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disarmed" | "idle" => Ok(Self::Disarmed),
            "armed" | "recording" => Ok(Self::Armed),
            "alert" => Ok(Self::Alert),
            _ => Err(ParseSecurityStateError(s.to_string())),
        }
    }
}

/// A security camera with an armed/disarmed/alert state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityCamera {
    id: DeviceId,
    is_on: bool,
    security_state: SecurityState,
    #[serde(skip)]
    alert_probability: f64,
}

impl SecurityCamera {
    /// Creates a camera that is off and disarmed.
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            is_on: false,
            security_state: SecurityState::Disarmed,
            alert_probability: DEFAULT_ALERT_PROBABILITY,
        }
    }

    pub fn with_security_state(mut self, state: SecurityState) -> Self {
        self.security_state = state;
        self
    }

    /// Sets the per-tick alert probability, saturated into `[0, 1]`.
    pub fn with_alert_probability(mut self, p: f64) -> Self {
        self.alert_probability = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self
    }

    pub fn security_state(&self) -> SecurityState {
        self.security_state
    }

    pub fn alert_probability(&self) -> f64 {
        self.alert_probability
    }

    pub fn arm(&mut self) {
        self.security_state = SecurityState::Armed;
    }

    pub fn disarm(&mut self) {
        self.security_state = SecurityState::Disarmed;
    }

    pub fn set_security_state(&mut self, state: SecurityState) {
        self.security_state = state;
    }
}

impl Device for SecurityCamera {
    fn id(&self) -> &DeviceId {
        &self.id
    }

    fn is_on(&self) -> bool {
        self.is_on
    }

    fn set_on(&mut self, on: bool) {
        self.is_on = on;
    }

    /// While on, raises an alert with the configured probability; otherwise
    /// the current (or explicitly set) state is kept.
    fn randomize(&mut self, rng: &mut StdRng) {
        if self.is_on && rng.random_bool(self.alert_probability) {
            self.security_state = SecurityState::Alert;
        }
    }

    fn device_type(&self) -> &'static str {
        "SecurityCamera"
    }
}

impl fmt::Display for SecurityCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_base(f, &self.id, self.is_on)?;
        write!(f, ", Security Status: {}", self.security_state)
    }
}
