use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::devices::types::{Device, DeviceId, write_base};
use crate::error::ConfigError;

/// Default per-tick temperature drift (degrees).
pub const DEFAULT_TEMPERATURE_STEP: f64 = 1.0;
/// Largest per-tick temperature drift a thermostat accepts (degrees).
pub const MAX_TEMPERATURE_STEP: f64 = 100.0;

/// Temperature scale used by a thermostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit suffix used in descriptions (`°C` / `°F`).
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "\u{b0}C",
            Self::Fahrenheit => "\u{b0}F",
        }
    }
}

/// Closed temperature range `[min, max]` in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureRange {
    min: f64,
    max: f64,
    unit: TemperatureUnit,
}

impl TemperatureRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if either bound is not finite, `min > max`,
    /// or the width `max - min` is too large to sample from.
    pub fn new(min: f64, max: f64, unit: TemperatureUnit) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigError::new(
                "thermostat.range",
                format!("bounds must be finite, got [{min}, {max}]"),
            ));
        }
        if min > max {
            return Err(ConfigError::new(
                "thermostat.min",
                format!("must be <= max ({min} > {max})"),
            ));
        }
        // Keeps the uniform sampling scale finite.
        if !(max - min).is_finite() || max - min > f64::MAX / 2.0 {
            return Err(ConfigError::new(
                "thermostat.range",
                format!("width of [{min}, {max}] is not representable"),
            ));
        }
        Ok(Self { min, max, unit })
    }

    /// 10–30 °C.
    pub fn celsius() -> Self {
        Self {
            min: 10.0,
            max: 30.0,
            unit: TemperatureUnit::Celsius,
        }
    }

    /// 60–80 °F.
    pub fn fahrenheit() -> Self {
        Self {
            min: 60.0,
            max: 80.0,
            unit: TemperatureUnit::Fahrenheit,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Default set point for the unit, pulled into the range.
    pub fn default_temperature(&self) -> f64 {
        let preferred = match self.unit {
            TemperatureUnit::Celsius => 20.0,
            TemperatureUnit::Fahrenheit => 72.0,
        };
        self.clamp(preferred)
    }

    /// Saturates `value` at the range bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// A thermostat holding a temperature set point within a configured range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thermostat {
    id: DeviceId,
    is_on: bool,
    temperature: f64,
    range: TemperatureRange,
    #[serde(skip)]
    drift_step: f64,
}

impl Thermostat {
    /// Creates a Celsius thermostat (10–30 °C) that is off at 20 °C.
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self::with_range(id, TemperatureRange::celsius())
    }

    /// Creates a thermostat with the given range, at its default set point.
    pub fn with_range(id: impl Into<DeviceId>, range: TemperatureRange) -> Self {
        Self {
            id: id.into(),
            is_on: false,
            temperature: range.default_temperature(),
            range,
            drift_step: DEFAULT_TEMPERATURE_STEP,
        }
    }

    /// Sets the initial temperature (clamped).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.set_temperature(temperature);
        self
    }

    /// Sets the per-tick drift bound. Negative values are taken by magnitude,
    /// non-finite ones fall back to zero, and the result saturates at
    /// [`MAX_TEMPERATURE_STEP`].
    pub fn with_drift_step(mut self, step: f64) -> Self {
        self.drift_step = if step.is_finite() {
            step.abs().min(MAX_TEMPERATURE_STEP)
        } else {
            0.0
        };
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn range(&self) -> &TemperatureRange {
        &self.range
    }

    pub fn drift_step(&self) -> f64 {
        self.drift_step
    }

    /// Sets the temperature, saturating at the range bounds. NaN is ignored.
    pub fn set_temperature(&mut self, temperature: f64) {
        if temperature.is_nan() {
            return;
        }
        self.temperature = self.range.clamp(temperature);
    }
}

impl Device for Thermostat {
    fn id(&self) -> &DeviceId {
        &self.id
    }

    fn is_on(&self) -> bool {
        self.is_on
    }

    fn set_on(&mut self, on: bool) {
        self.is_on = on;
    }

    /// Shifts the temperature by a uniform delta in `[-drift, +drift]` while on.
    fn randomize(&mut self, rng: &mut StdRng) {
        if !self.is_on {
            return;
        }
        let delta = rng.random_range(-self.drift_step..=self.drift_step);
        self.set_temperature(self.temperature + delta);
    }

    fn device_type(&self) -> &'static str {
        "Thermostat"
    }
}

impl fmt::Display for Thermostat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_base(f, &self.id, self.is_on)?;
        write!(
            f,
            ", Temperature: {:.1}{}",
            self.temperature,
            self.range.unit.symbol()
        )
    }
}
