//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::devices::camera::DEFAULT_ALERT_PROBABILITY;
use crate::devices::light::DEFAULT_BRIGHTNESS_STEP;
use crate::devices::thermostat::{DEFAULT_TEMPERATURE_STEP, MAX_TEMPERATURE_STEP};
use crate::devices::{
    Device, SecurityCamera, SecurityState, SmartDevice, SmartLight, TemperatureRange,
    TemperatureUnit, Thermostat,
};
use crate::error::{ConfigError, SimError};
use crate::sim::AutomationEngine;
use crate::sim::rules::{AutomationRules, DEFAULT_ARM_PROBABILITY, DEFAULT_LIGHT_ON_PROBABILITY};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::home`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Tick timing and random seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Automation rule probabilities.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Per-tick drift parameters.
    #[serde(default)]
    pub drift: DriftConfig,
    /// Devices to discover, in order.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Tick timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seconds between ticks (must be > 0).
    pub interval_secs: f64,
    /// Number of periodic ticks a CLI run lets elapse before pausing.
    pub ticks: u64,
    /// Random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5.0,
            ticks: 3,
            seed: 42,
        }
    }
}

/// Automation rule probabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Probability that the light rule switches a light on (0.0–1.0).
    pub light_on_probability: f64,
    /// Probability that the camera rule arms a camera (0.0–1.0).
    pub arm_probability: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            light_on_probability: DEFAULT_LIGHT_ON_PROBABILITY,
            arm_probability: DEFAULT_ARM_PROBABILITY,
        }
    }
}

/// Per-tick drift parameters shared by all devices of a kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriftConfig {
    /// Maximum brightness change per tick (>= 0).
    pub brightness_step: i32,
    /// Maximum temperature change per tick (>= 0).
    pub temperature_step: f64,
    /// Per-tick alert probability for active cameras (0.0–1.0).
    pub alert_probability: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            brightness_step: DEFAULT_BRIGHTNESS_STEP,
            temperature_step: DEFAULT_TEMPERATURE_STEP,
            alert_probability: DEFAULT_ALERT_PROBABILITY,
        }
    }
}

/// One device entry (`[[devices]]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// `"light"`, `"thermostat"` or `"camera"`.
    pub kind: String,
    /// Unique device id.
    pub id: String,
    /// Initial on/off state.
    #[serde(default)]
    pub on: bool,
    /// Light: initial brightness (clamped to 0–100).
    pub brightness: Option<i32>,
    /// Thermostat: initial temperature (clamped to the range).
    pub temperature: Option<f64>,
    /// Thermostat: `"celsius"` (default) or `"fahrenheit"`.
    pub unit: Option<String>,
    /// Thermostat: lower bound, defaults per unit.
    pub min: Option<f64>,
    /// Thermostat: upper bound, defaults per unit.
    pub max: Option<f64>,
    /// Camera: initial security state.
    pub security_state: Option<String>,
}

impl DeviceConfig {
    fn new(kind: &str, id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
            on: false,
            brightness: None,
            temperature: None,
            unit: None,
            min: None,
            max: None,
            security_state: None,
        }
    }

    /// Builds the device, validating variant-specific fields.
    ///
    /// `field` is the dotted path used in error messages.
    fn build(&self, drift: &DriftConfig, field: &str) -> Result<SmartDevice, ConfigError> {
        let mut device: SmartDevice = match self.kind.as_str() {
            "light" => {
                let light = SmartLight::new(self.id.as_str())
                    .with_drift_step(drift.brightness_step)
                    .with_brightness(self.brightness.unwrap_or(0));
                light.into()
            }
            "thermostat" => {
                let unit = match self.unit.as_deref() {
                    None | Some("celsius") => TemperatureUnit::Celsius,
                    Some("fahrenheit") => TemperatureUnit::Fahrenheit,
                    Some(other) => {
                        return Err(ConfigError::new(
                            format!("{field}.unit"),
                            format!("must be \"celsius\" or \"fahrenheit\", got \"{other}\""),
                        ));
                    }
                };
                let defaults = match unit {
                    TemperatureUnit::Celsius => TemperatureRange::celsius(),
                    TemperatureUnit::Fahrenheit => TemperatureRange::fahrenheit(),
                };
                let range = TemperatureRange::new(
                    self.min.unwrap_or(defaults.min()),
                    self.max.unwrap_or(defaults.max()),
                    unit,
                )
                .map_err(|e| {
                    let leaf = e.field.rsplit('.').next().unwrap_or("range");
                    ConfigError::new(format!("{field}.{leaf}"), e.message)
                })?;
                let mut thermostat = Thermostat::with_range(self.id.as_str(), range)
                    .with_drift_step(drift.temperature_step);
                if let Some(t) = self.temperature {
                    thermostat.set_temperature(t);
                }
                thermostat.into()
            }
            "camera" => {
                let state = match self.security_state.as_deref() {
                    Some(s) => s.parse::<SecurityState>().map_err(|e| {
                        ConfigError::new(format!("{field}.security_state"), e.to_string())
                    })?,
                    None => SecurityState::Disarmed,
                };
                SecurityCamera::new(self.id.as_str())
                    .with_security_state(state)
                    .with_alert_probability(drift.alert_probability)
                    .into()
            }
            other => {
                return Err(ConfigError::new(
                    format!("{field}.kind"),
                    format!("must be \"light\", \"thermostat\" or \"camera\", got \"{other}\""),
                ));
            }
        };
        device.set_on(self.on);
        Ok(device)
    }
}

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["home", "dashboard"];

    /// Control-panel home: a light, a Celsius thermostat (10–30 °C) and a camera.
    pub fn home() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            rules: RulesConfig::default(),
            drift: DriftConfig::default(),
            devices: vec![
                DeviceConfig::new("light", "Light"),
                DeviceConfig::new("thermostat", "Thermostat"),
                DeviceConfig::new("camera", "SecurityCamera"),
            ],
        }
    }

    /// Monitoring dashboard: numeric ids and a Fahrenheit thermostat (60–80 °F).
    pub fn dashboard() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            rules: RulesConfig::default(),
            drift: DriftConfig::default(),
            devices: vec![
                DeviceConfig::new("light", "1"),
                DeviceConfig {
                    unit: Some("fahrenheit".to_string()),
                    ..DeviceConfig::new("thermostat", "2")
                },
                DeviceConfig::new("camera", "3"),
            ],
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "home" => Ok(Self::home()),
            "dashboard" => Ok(Self::dashboard()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if !s.interval_secs.is_finite() || s.interval_secs <= 0.0 {
            errors.push(ConfigError::new(
                "simulation.interval_secs",
                format!("must be a finite number > 0, got {}", s.interval_secs),
            ));
        }

        let r = &self.rules;
        check_probability(&mut errors, "rules.light_on_probability", r.light_on_probability);
        check_probability(&mut errors, "rules.arm_probability", r.arm_probability);

        let d = &self.drift;
        if d.brightness_step < 0 {
            errors.push(ConfigError::new("drift.brightness_step", "must be >= 0"));
        }
        if !(0.0..=MAX_TEMPERATURE_STEP).contains(&d.temperature_step) {
            errors.push(ConfigError::new(
                "drift.temperature_step",
                format!(
                    "must be in [0.0, {MAX_TEMPERATURE_STEP}], got {}",
                    d.temperature_step
                ),
            ));
        }
        check_probability(&mut errors, "drift.alert_probability", d.alert_probability);

        let mut seen = HashSet::new();
        for (i, device) in self.devices.iter().enumerate() {
            let field = format!("devices[{i}]");
            if !seen.insert(device.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("{field}.id"),
                    format!("duplicate device id \"{}\"", device.id),
                ));
            }
            if let Err(e) = device.build(d, &field) {
                errors.push(e);
            }
        }

        errors
    }

    /// Builds an engine with all devices discovered in order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for the first invalid device entry and
    /// [`SimError::DuplicateDevice`] for a repeated id.
    pub fn build(&self) -> Result<AutomationEngine, SimError> {
        let rules =
            AutomationRules::new(self.rules.light_on_probability, self.rules.arm_probability);
        let mut engine = AutomationEngine::with_rules(rules, self.simulation.seed);
        for (i, device) in self.devices.iter().enumerate() {
            let device = device.build(&self.drift, &format!("devices[{i}]"))?;
            engine.discover(device)?;
        }
        if engine.registry().is_empty() {
            tracing::warn!("scenario has no devices");
        }
        Ok(engine)
    }
}

fn check_probability(errors: &mut Vec<ConfigError>, field: &str, p: f64) {
    if !(0.0..=1.0).contains(&p) {
        errors.push(ConfigError::new(field, format!("must be in [0.0, 1.0], got {p}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name).unwrap();
            let errors = cfg.validate();
            assert!(errors.is_empty(), "{name} should be valid: {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let e = ScenarioConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn home_preset_builds_three_devices() {
        let engine = ScenarioConfig::home().build().unwrap();
        let ids: Vec<String> = engine.registry().ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["Light", "Thermostat", "SecurityCamera"]);
        let t = engine.device(&"Thermostat".into()).and_then(SmartDevice::as_thermostat).unwrap();
        assert_eq!(t.range().unit(), TemperatureUnit::Celsius);
        assert_eq!(t.temperature(), 20.0);
    }

    #[test]
    fn dashboard_preset_uses_fahrenheit() {
        let engine = ScenarioConfig::dashboard().build().unwrap();
        let t = engine.device(&2.into()).and_then(SmartDevice::as_thermostat).unwrap();
        assert_eq!(t.range().unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(t.temperature(), 72.0);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
interval_secs = 0.25
ticks = 10
seed = 7

[rules]
light_on_probability = 0.5
arm_probability = 0.3

[drift]
brightness_step = 3
temperature_step = 0.5
alert_probability = 0.2

[[devices]]
kind = "light"
id = "porch"
on = true
brightness = 120

[[devices]]
kind = "thermostat"
id = "hall"
unit = "fahrenheit"
min = 62.0
max = 75.0
temperature = 90.0

[[devices]]
kind = "camera"
id = "door"
security_state = "Recording"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.simulation.ticks, 10);

        let engine = cfg.build().unwrap();
        assert_eq!(engine.rules().light_on_probability(), 0.5);
        assert_eq!(engine.rules().arm_probability(), 0.3);
        let porch = engine.device(&"porch".into()).unwrap();
        assert!(porch.is_on());
        assert_eq!(porch.as_light().map(SmartLight::brightness), Some(100));
        assert_eq!(porch.as_light().map(SmartLight::drift_step), Some(3));

        let hall = engine.device(&"hall".into()).and_then(SmartDevice::as_thermostat).unwrap();
        assert_eq!(hall.temperature(), 75.0);

        let door = engine.device(&"door".into()).and_then(SmartDevice::as_camera).unwrap();
        assert_eq!(door.security_state(), SecurityState::Armed);
        assert_eq!(door.alert_probability(), 0.2);
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = "[simulation]\nbogus = 1\n";
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.simulation.interval_secs, 5.0);
        assert!(cfg.devices.is_empty());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_collects_errors() {
        let toml = r#"
[simulation]
interval_secs = 0.0

[rules]
light_on_probability = 1.5

[drift]
brightness_step = -1

[[devices]]
kind = "toaster"
id = "a"

[[devices]]
kind = "light"
id = "a"

[[devices]]
kind = "thermostat"
id = "t"
min = 30.0
max = 10.0

[[devices]]
kind = "camera"
id = "c"
security_state = "asleep"
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"simulation.interval_secs".to_string()));
        assert!(fields.contains(&"rules.light_on_probability".to_string()));
        assert!(fields.contains(&"drift.brightness_step".to_string()));
        assert!(fields.contains(&"devices[0].kind".to_string()));
        assert!(fields.contains(&"devices[1].id".to_string()));
        assert!(fields.contains(&"devices[2].min".to_string()));
        assert!(fields.contains(&"devices[3].security_state".to_string()));
    }

    #[test]
    fn build_reports_duplicate_ids() {
        let mut cfg = ScenarioConfig::home();
        cfg.devices.push(DeviceConfig::new("camera", "Light"));
        assert!(matches!(cfg.build(), Err(SimError::DuplicateDevice { .. })));
    }

    #[test]
    fn unrepresentable_drift_and_range_rejected() {
        let toml = r#"
[drift]
temperature_step = 1.7e308

[[devices]]
kind = "thermostat"
id = "wide"
min = -1.7e308
max = 1.7e308
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"drift.temperature_step".to_string()));
        assert!(fields.contains(&"devices[0].range".to_string()));
        assert!(matches!(cfg.build(), Err(SimError::Config(_))));
    }

    #[test]
    fn drift_step_at_cap_runs_without_panicking() {
        let mut cfg = ScenarioConfig::dashboard();
        cfg.drift.temperature_step = MAX_TEMPERATURE_STEP;
        cfg.drift.brightness_step = i32::MAX;
        for device in &mut cfg.devices {
            device.on = true;
        }
        assert!(cfg.validate().is_empty());

        let mut engine = cfg.build().unwrap();
        engine.run(200);
        let t = engine.device(&2.into()).and_then(SmartDevice::as_thermostat).unwrap();
        assert!(t.range().contains(t.temperature()));
    }
}
