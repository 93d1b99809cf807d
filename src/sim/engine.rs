//! Automation engine that owns the registry and drives simulation ticks.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::devices::{Device, DeviceId, SmartDevice};
use crate::error::SimError;

use super::analysis::{AnalysisReport, analyze};
use super::registry::DeviceRegistry;
use super::rules::AutomationRules;

/// Simulation engine owning all devices, rules and the random source.
///
/// One tick applies two layers of stochastic mutation: the automation
/// rules (macro state such as on/off or armed/disarmed) and then each
/// device's own drift.
#[derive(Debug)]
pub struct AutomationEngine {
    registry: DeviceRegistry,
    rules: AutomationRules,
    rng: StdRng,
    ticks: u64,
}

impl AutomationEngine {
    /// Creates an empty engine with default rules.
    ///
    /// # Arguments
    ///
    /// * `seed` - Random seed for reproducible runs
    pub fn new(seed: u64) -> Self {
        Self::with_rules(AutomationRules::default(), seed)
    }

    /// Creates an empty engine with the given rules.
    pub fn with_rules(rules: AutomationRules, seed: u64) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            rules,
            rng: StdRng::seed_from_u64(seed),
            ticks: 0,
        }
    }

    /// Registers a device.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateDevice`] if a device with the same id is
    /// already registered.
    pub fn discover(&mut self, device: impl Into<SmartDevice>) -> Result<(), SimError> {
        let device = device.into();
        let id = device.id().clone();
        let kind = device.device_type();
        match self.registry.discover(device) {
            Ok(()) => {
                tracing::info!(device_id = %id, kind, "device discovered");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(device_id = %id, kind, "duplicate device rejected");
                Err(err)
            }
        }
    }

    /// Applies the automation rules to every device.
    pub fn run_automation_tick(&mut self) {
        for device in self.registry.iter_mut() {
            self.rules.apply(device, &mut self.rng);
        }
    }

    /// Applies each device's own drift.
    pub fn randomize_all(&mut self) {
        for device in self.registry.iter_mut() {
            device.randomize(&mut self.rng);
        }
    }

    /// Executes one full tick (rules, then drift) and returns the tick number.
    pub fn tick(&mut self) -> u64 {
        self.run_automation_tick();
        self.randomize_all();
        self.ticks += 1;

        if tracing::enabled!(tracing::Level::TRACE) {
            for device in self.registry.iter() {
                tracing::trace!(tick = self.ticks, "{device}");
            }
        }
        tracing::debug!(
            tick = self.ticks,
            devices = self.registry.len(),
            "automation tick complete"
        );
        self.ticks
    }

    /// Executes `n` ticks back to back.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Number of ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rules(&self) -> &AutomationRules {
        &self.rules
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    pub fn device(&self, id: &DeviceId) -> Option<&SmartDevice> {
        self.registry.get(id)
    }

    pub fn device_mut(&mut self, id: &DeviceId) -> Option<&mut SmartDevice> {
        self.registry.get_mut(id)
    }

    /// On/off analysis of the registered devices.
    pub fn analyze(&self) -> AnalysisReport {
        analyze(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{SecurityCamera, SecurityState, SmartLight, TemperatureRange, Thermostat};

    fn engine(rules: AutomationRules, seed: u64) -> AutomationEngine {
        let mut e = AutomationEngine::with_rules(rules, seed);
        e.discover(SmartLight::new(1).with_brightness(50)).unwrap();
        e.discover(Thermostat::with_range(2, TemperatureRange::fahrenheit()))
            .unwrap();
        e.discover(SecurityCamera::new(3)).unwrap();
        e
    }

    #[test]
    fn discover_rejects_duplicates() {
        let mut e = engine(AutomationRules::default(), 1);
        let err = e.discover(SmartLight::new(1));
        assert!(matches!(err, Err(SimError::DuplicateDevice { .. })));
        assert_eq!(e.registry().len(), 3);
    }

    #[test]
    fn tick_counts() {
        let mut e = engine(AutomationRules::default(), 1);
        assert_eq!(e.ticks(), 0);
        assert_eq!(e.tick(), 1);
        e.run(4);
        assert_eq!(e.ticks(), 5);
    }

    #[test]
    fn rules_then_drift() {
        // Light always switched on by the rule, so its drift applies in the same tick.
        let mut e = engine(AutomationRules::new(1.0, 1.0), 9);
        e.tick();
        let light = e.device(&1.into()).and_then(SmartDevice::as_light).unwrap();
        assert!(light.is_on());
        assert!((45..=55).contains(&light.brightness()));
        let cam = e.device(&3.into()).and_then(SmartDevice::as_camera).unwrap();
        assert_eq!(cam.security_state(), SecurityState::Armed);
    }

    #[test]
    fn invariants_hold_over_many_ticks() {
        let mut e = engine(AutomationRules::new(0.5, 0.5), 77);
        e.device_mut(&2.into()).unwrap().turn_on();
        for _ in 0..500 {
            e.tick();
            for device in e.registry() {
                if let Some(light) = device.as_light() {
                    assert!(light.brightness() <= 100);
                }
                if let Some(t) = device.as_thermostat() {
                    assert!(t.range().contains(t.temperature()));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_outcome() {
        let mut a = engine(AutomationRules::new(0.5, 0.5), 42);
        let mut b = engine(AutomationRules::new(0.5, 0.5), 42);
        a.run(25);
        b.run(25);
        let da: Vec<String> = a.registry().iter().map(Device::describe).collect();
        let db: Vec<String> = b.registry().iter().map(Device::describe).collect();
        assert_eq!(da, db);
    }

    #[test]
    fn analyze_uses_registry() {
        let mut e = engine(AutomationRules::default(), 1);
        let report = e.analyze();
        assert_eq!((report.on_count, report.off_count), (0, 3));
        e.device_mut(&1.into()).unwrap().turn_on();
        e.device_mut(&3.into()).unwrap().turn_on();
        assert_eq!(e.analyze().on_count, 2);
    }
}
