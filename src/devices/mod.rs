//! Simulated home devices.

/// Security camera model.
pub mod camera;
/// Dimmable smart light model.
pub mod light;
/// Thermostat model with a bounded set point.
pub mod thermostat;
pub mod types;

use std::fmt;

use rand::rngs::StdRng;
use serde::Serialize;

pub use camera::{SecurityCamera, SecurityState};
pub use light::SmartLight;
pub use thermostat::{TemperatureRange, TemperatureUnit, Thermostat};
pub use types::{Device, DeviceId};

/// Any supported device, dispatched by variant.
///
/// The registry stores devices as this enum so the automation rules and the
/// engine never need to inspect concrete types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmartDevice {
    Light(SmartLight),
    Thermostat(Thermostat),
    Camera(SecurityCamera),
}

impl SmartDevice {
    fn inner(&self) -> &dyn Device {
        match self {
            Self::Light(d) => d,
            Self::Thermostat(d) => d,
            Self::Camera(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Device {
        match self {
            Self::Light(d) => d,
            Self::Thermostat(d) => d,
            Self::Camera(d) => d,
        }
    }

    pub fn as_light(&self) -> Option<&SmartLight> {
        match self {
            Self::Light(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut SmartLight> {
        match self {
            Self::Light(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_thermostat(&self) -> Option<&Thermostat> {
        match self {
            Self::Thermostat(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_thermostat_mut(&mut self) -> Option<&mut Thermostat> {
        match self {
            Self::Thermostat(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&SecurityCamera> {
        match self {
            Self::Camera(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut SecurityCamera> {
        match self {
            Self::Camera(d) => Some(d),
            _ => None,
        }
    }
}

impl Device for SmartDevice {
    fn id(&self) -> &DeviceId {
        self.inner().id()
    }

    fn is_on(&self) -> bool {
        self.inner().is_on()
    }

    fn set_on(&mut self, on: bool) {
        self.inner_mut().set_on(on);
    }

    fn randomize(&mut self, rng: &mut StdRng) {
        self.inner_mut().randomize(rng);
    }

    fn device_type(&self) -> &'static str {
        self.inner().device_type()
    }
}

impl fmt::Display for SmartDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light(d) => d.fmt(f),
            Self::Thermostat(d) => d.fmt(f),
            Self::Camera(d) => d.fmt(f),
        }
    }
}

impl From<SmartLight> for SmartDevice {
    fn from(d: SmartLight) -> Self {
        Self::Light(d)
    }
}

impl From<Thermostat> for SmartDevice {
    fn from(d: Thermostat) -> Self {
        Self::Thermostat(d)
    }
}

impl From<SecurityCamera> for SmartDevice {
    fn from(d: SecurityCamera) -> Self {
        Self::Camera(d)
    }
}
