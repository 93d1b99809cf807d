//! Shared test fixtures for integration tests.

use smart_home_sim::devices::{
    SecurityCamera, SmartDevice, SmartLight, TemperatureRange, Thermostat,
};
use smart_home_sim::sim::{AutomationEngine, AutomationRules};

/// Default seed used across integration tests.
pub const SEED: u64 = 42;

/// The three devices of the control-panel home, all off.
pub fn home_devices() -> Vec<SmartDevice> {
    vec![
        SmartLight::new("Light").into(),
        Thermostat::new("Thermostat").into(),
        SecurityCamera::new("SecurityCamera").into(),
    ]
}

/// Engine with the dashboard devices (ids 1–3, Fahrenheit thermostat).
pub fn dashboard_engine(rules: AutomationRules) -> AutomationEngine {
    let mut engine = AutomationEngine::with_rules(rules, SEED);
    engine
        .discover(SmartLight::new(1))
        .expect("light should be discovered");
    engine
        .discover(Thermostat::with_range(2, TemperatureRange::fahrenheit()))
        .expect("thermostat should be discovered");
    engine
        .discover(SecurityCamera::new(3))
        .expect("camera should be discovered");
    engine
}
