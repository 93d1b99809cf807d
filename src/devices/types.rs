//! Common types and traits for simulated home devices.

use std::fmt;

use rand::rngs::StdRng;
use serde::Serialize;

/// Stable identifier of a device, unique within a registry.
///
/// Assigned at creation and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

/// Capability set shared by every simulated device.
///
/// `Display` is the device's `describe()` line:
/// `Device ID: <id>, Status: <On|Off>[, <Field>: <value>]`.
pub trait Device: fmt::Display {
    /// Returns the device's stable identifier.
    fn id(&self) -> &DeviceId;

    /// Returns whether the device is on.
    ///
    /// This flag is the only input to on/off aggregates.
    fn is_on(&self) -> bool;

    /// Sets the on/off flag. Unconditional.
    fn set_on(&mut self, on: bool);

    /// Turns the device on. Idempotent.
    fn turn_on(&mut self) {
        self.set_on(true);
    }

    /// Turns the device off. Idempotent.
    fn turn_off(&mut self) {
        self.set_on(false);
    }

    /// Flips the on/off flag. Two toggles restore the original state.
    fn toggle(&mut self) {
        let on = self.is_on();
        self.set_on(!on);
    }

    /// Applies one tick of variant-specific random drift.
    ///
    /// Drift only happens while the device is on; an off device is left
    /// untouched.
    fn randomize(&mut self, rng: &mut StdRng);

    /// Returns a human-readable type name for the device.
    fn device_type(&self) -> &'static str;

    /// Returns the one-line description used for logging and export.
    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Formats the shared `Device ID: .., Status: ..` prefix.
pub(crate) fn write_base(f: &mut fmt::Formatter<'_>, id: &DeviceId, is_on: bool) -> fmt::Result {
    write!(f, "Device ID: {id}, Status: {}", status_label(is_on))
}

/// `"On"` / `"Off"` label for an on/off flag.
pub fn status_label(is_on: bool) -> &'static str {
    if is_on { "On" } else { "Off" }
}
