//! On/off analysis with an advisory suggestion.

use std::fmt;

use serde::Serialize;

use crate::devices::{Device, SmartDevice};

/// Advice derived from comparing on and off device counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Suggestion {
    /// More devices on than off.
    SaveEnergy,
    /// More devices off than on.
    IncreaseComfort,
    /// Equal counts.
    None,
}

impl Suggestion {
    /// The exact message shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SaveEnergy => "Suggestion: Turn off some devices to save energy.",
            Self::IncreaseComfort => {
                "Suggestion: Turn on some devices for better security or comfort."
            }
            Self::None => "No specific suggestions.",
        }
    }

    fn from_counts(on_count: usize, off_count: usize) -> Self {
        match on_count.cmp(&off_count) {
            std::cmp::Ordering::Greater => Self::SaveEnergy,
            std::cmp::Ordering::Less => Self::IncreaseComfort,
            std::cmp::Ordering::Equal => Self::None,
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate on/off counts and the resulting suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub on_count: usize,
    pub off_count: usize,
    pub suggestion: Suggestion,
}

/// Partitions devices by their on/off flag and derives a suggestion.
///
/// # Examples
///
/// ```
/// use smart_home_sim::devices::{Device, SmartDevice, SmartLight, Thermostat};
/// use smart_home_sim::sim::analysis::{Suggestion, analyze};
///
/// let mut light = SmartDevice::from(SmartLight::new("Light"));
/// light.turn_on();
/// let devices = vec![light, Thermostat::new("Thermostat").into()];
///
/// let report = analyze(&devices);
/// assert_eq!(report.on_count, 1);
/// assert_eq!(report.off_count, 1);
/// assert_eq!(report.suggestion, Suggestion::None);
/// ```
pub fn analyze<'a>(devices: impl IntoIterator<Item = &'a SmartDevice>) -> AnalysisReport {
    let (on_count, off_count) = devices
        .into_iter()
        .fold((0, 0), |(on, off), d| {
            if d.is_on() { (on + 1, off) } else { (on, off + 1) }
        });

    AnalysisReport {
        on_count,
        off_count,
        suggestion: Suggestion::from_counts(on_count, off_count),
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of On Devices: {}", self.on_count)?;
        writeln!(f, "Number of Off Devices: {}", self.off_count)?;
        write!(f, "{}", self.suggestion)
    }
}
