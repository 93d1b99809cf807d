use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::devices::types::{Device, DeviceId, write_base};

/// Highest brightness level.
pub const MAX_BRIGHTNESS: u8 = 100;

/// Default per-tick brightness drift (in brightness points).
pub const DEFAULT_BRIGHTNESS_STEP: i32 = 5;

/// A dimmable smart light.
///
/// Brightness is kept in `[0, 100]` after every mutation, including drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartLight {
    id: DeviceId,
    is_on: bool,
    brightness: u8,
    /// Maximum absolute brightness change applied per tick while on.
    #[serde(skip)]
    drift_step: i32,
}

impl SmartLight {
    /// Creates a light that is off with brightness 0.
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            is_on: false,
            brightness: 0,
            drift_step: DEFAULT_BRIGHTNESS_STEP,
        }
    }

    /// Sets the initial brightness (clamped).
    pub fn with_brightness(mut self, brightness: i32) -> Self {
        self.set_brightness(brightness);
        self
    }

    /// Sets the per-tick drift bound. Negative values are taken by magnitude.
    pub fn with_drift_step(mut self, step: i32) -> Self {
        self.drift_step = step.saturating_abs();
        self
    }

    /// Current brightness in `[0, 100]`.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Per-tick drift bound.
    pub fn drift_step(&self) -> i32 {
        self.drift_step
    }

    /// Sets the brightness, saturating at 0 and 100.
    pub fn set_brightness(&mut self, brightness: i32) {
        self.brightness = clamp_brightness(brightness);
    }
}

fn clamp_brightness(value: i32) -> u8 {
    // Lossless: the value is clamped to [0, 100] first.
    value.clamp(0, i32::from(MAX_BRIGHTNESS)) as u8
}

impl Device for SmartLight {
    fn id(&self) -> &DeviceId {
        &self.id
    }

    fn is_on(&self) -> bool {
        self.is_on
    }

    fn set_on(&mut self, on: bool) {
        self.is_on = on;
    }

    /// Nudges brightness by a uniform step in `[-drift, +drift]` while on.
    fn randomize(&mut self, rng: &mut StdRng) {
        if !self.is_on {
            return;
        }
        let delta = rng.random_range(-self.drift_step..=self.drift_step);
        self.set_brightness(i32::from(self.brightness).saturating_add(delta));
    }

    fn device_type(&self) -> &'static str {
        "SmartLight"
    }
}

impl fmt::Display for SmartLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_base(f, &self.id, self.is_on)?;
        write!(f, ", Brightness: {}", self.brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn new_light_is_off_and_dark() {
        let light = SmartLight::new("Light");
        assert!(!light.is_on());
        assert_eq!(light.brightness(), 0);
        assert_eq!(light.id().as_str(), "Light");
    }

    #[test]
    fn extreme_drift_step_saturates() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut light = SmartLight::new("Light")
            .with_brightness(100)
            .with_drift_step(i32::MAX);
        light.turn_on();
        for _ in 0..200 {
            light.randomize(&mut rng);
            assert!(light.brightness() <= MAX_BRIGHTNESS);
        }
        let mut light = SmartLight::new("Light").with_drift_step(i32::MIN);
        assert_eq!(light.drift_step(), i32::MAX);
        light.turn_on();
        light.randomize(&mut rng);
        assert!(light.brightness() <= MAX_BRIGHTNESS);
    }

    #[test]
    fn set_brightness_clamps_silently() {
        let mut light = SmartLight::new("Light");
        light.set_brightness(150);
        assert_eq!(light.brightness(), 100);
        light.set_brightness(-20);
        assert_eq!(light.brightness(), 0);
        light.set_brightness(42);
        assert_eq!(light.brightness(), 42);
    }

    #[test]
    fn randomize_is_noop_while_off() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut light = SmartLight::new("Light").with_brightness(50);
        for _ in 0..100 {
            light.randomize(&mut rng);
        }
        assert_eq!(light.brightness(), 50);
    }

    #[test]
    fn randomize_stays_within_step_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut light = SmartLight::new("Light").with_brightness(98);
        light.turn_on();
        for _ in 0..1000 {
            let before = i32::from(light.brightness());
            light.randomize(&mut rng);
            let after = i32::from(light.brightness());
            assert!((after - before).abs() <= DEFAULT_BRIGHTNESS_STEP);
            assert!(light.brightness() <= MAX_BRIGHTNESS);
        }
    }

    #[test]
    fn zero_drift_keeps_brightness() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut light = SmartLight::new("Light")
            .with_brightness(30)
            .with_drift_step(0);
        light.turn_on();
        light.randomize(&mut rng);
        assert_eq!(light.brightness(), 30);
    }

    #[test]
    fn describe_format() {
        let mut light = SmartLight::new("Light").with_brightness(75);
        assert_eq!(
            light.describe(),
            "Device ID: Light, Status: Off, Brightness: 75"
        );
        light.turn_on();
        assert_eq!(light.describe(), "Device ID: Light, Status: On, Brightness: 75");
    }
}
