//! Rule-based automation applied to every device once per tick.

use rand::Rng;
use rand::rngs::StdRng;

use crate::devices::{Device, SmartDevice};

/// Default probability that the light rule switches a light on.
pub const DEFAULT_LIGHT_ON_PROBABILITY: f64 = 0.1;
/// Default probability that the camera rule arms a camera.
pub const DEFAULT_ARM_PROBABILITY: f64 = 0.1;

/// Probabilities driving the per-tick automation rules.
///
/// - lights: on with `light_on_probability`, otherwise off
/// - thermostats: a fresh uniform target within their own range
/// - cameras: armed with `arm_probability`, otherwise disarmed
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationRules {
    light_on_probability: f64,
    arm_probability: f64,
}

impl Default for AutomationRules {
    fn default() -> Self {
        Self {
            light_on_probability: DEFAULT_LIGHT_ON_PROBABILITY,
            arm_probability: DEFAULT_ARM_PROBABILITY,
        }
    }
}

impl AutomationRules {
    /// Creates a rule set. Probabilities are saturated into `[0, 1]`.
    pub fn new(light_on_probability: f64, arm_probability: f64) -> Self {
        Self {
            light_on_probability: probability(light_on_probability),
            arm_probability: probability(arm_probability),
        }
    }

    pub fn light_on_probability(&self) -> f64 {
        self.light_on_probability
    }

    pub fn arm_probability(&self) -> f64 {
        self.arm_probability
    }

    /// Applies the rule matching the device's variant.
    pub fn apply(&self, device: &mut SmartDevice, rng: &mut StdRng) {
        match device {
            SmartDevice::Light(light) => {
                if rng.random_bool(self.light_on_probability) {
                    light.turn_on();
                } else {
                    light.turn_off();
                }
            }
            SmartDevice::Thermostat(thermostat) => {
                let range = *thermostat.range();
                let target = rng.random_range(range.min()..=range.max());
                thermostat.set_temperature(target);
            }
            SmartDevice::Camera(camera) => {
                if rng.random_bool(self.arm_probability) {
                    camera.arm();
                } else {
                    camera.disarm();
                }
            }
        }
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
