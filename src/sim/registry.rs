//! Ordered collection of discovered devices.

use crate::devices::{Device, DeviceId, SmartDevice};
use crate::error::SimError;

/// Devices in discovery order.
///
/// Ids are unique; a device is never removed once discovered.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<SmartDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device at the end of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateDevice`] if the id is already present;
    /// the registry is left unchanged.
    pub fn discover(&mut self, device: impl Into<SmartDevice>) -> Result<(), SimError> {
        let device = device.into();
        if self.contains(device.id()) {
            return Err(SimError::DuplicateDevice {
                id: device.id().clone(),
            });
        }
        self.devices.push(device);
        Ok(())
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.iter().any(|d| d.id() == id)
    }

    pub fn get(&self, id: &DeviceId) -> Option<&SmartDevice> {
        self.devices.iter().find(|d| d.id() == id)
    }

    pub fn get_mut(&mut self, id: &DeviceId) -> Option<&mut SmartDevice> {
        self.devices.iter_mut().find(|d| d.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SmartDevice> {
        self.devices.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SmartDevice> {
        self.devices.iter_mut()
    }

    /// Ids in discovery order.
    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|d| d.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a SmartDevice;
    type IntoIter = std::slice::Iter<'a, SmartDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut DeviceRegistry {
    type Item = &'a mut SmartDevice;
    type IntoIter = std::slice::IterMut<'a, SmartDevice>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
