//! Text and CSV export of device snapshots.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::devices::types::status_label;
use crate::devices::{Device, DeviceId, SmartDevice};
use crate::error::SimError;

/// Default file name for the text export.
pub const DEFAULT_TEXT_EXPORT: &str = "smart_home_data.txt";

/// Column header for the CSV snapshot.
const HEADER: &str = "id,type,status,brightness,temperature,unit,security_state";

/// Writes one `describe()` line per device to the file at `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if file creation or writing fails.
pub fn export_text<'a>(
    devices: impl IntoIterator<Item = &'a SmartDevice>,
    path: &Path,
) -> Result<(), SimError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_text(devices, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes one `describe()` line per device to any writer.
///
/// # Errors
///
/// Returns [`SimError::Io`] if writing fails.
pub fn write_text<'a>(
    devices: impl IntoIterator<Item = &'a SmartDevice>,
    mut writer: impl Write,
) -> Result<(), SimError> {
    for device in devices {
        writeln!(writer, "{}", device.describe())?;
    }
    Ok(())
}

/// Exports a CSV snapshot of the devices to the file at `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be created and
/// [`SimError::Csv`] if writing a record fails.
pub fn export_csv<'a>(
    devices: impl IntoIterator<Item = &'a SmartDevice>,
    path: &Path,
) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_csv(devices, BufWriter::new(file))
}

/// Writes a CSV snapshot of the devices to any writer.
///
/// Columns that do not apply to a device type are left empty.
///
/// # Errors
///
/// Returns [`SimError::Csv`] if writing a record fails.
pub fn write_csv<'a>(
    devices: impl IntoIterator<Item = &'a SmartDevice>,
    writer: impl Write,
) -> Result<(), SimError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(','))?;

    for device in devices {
        let mut brightness = String::new();
        let mut temperature = String::new();
        let mut unit = String::new();
        let mut security_state = String::new();
        match device {
            SmartDevice::Light(light) => brightness = light.brightness().to_string(),
            SmartDevice::Thermostat(t) => {
                temperature = format!("{:.2}", t.temperature());
                unit = t.range().unit().symbol().to_string();
            }
            SmartDevice::Camera(cam) => security_state = cam.security_state().to_string(),
        }
        wtr.write_record([
            device.id().as_str(),
            device.device_type(),
            status_label(device.is_on()),
            brightness.as_str(),
            temperature.as_str(),
            unit.as_str(),
            security_state.as_str(),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// A device description parsed back from its text export line.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub is_on: bool,
    /// Variant-specific `(name, value)` pair, e.g. `("Brightness", "75")`.
    pub field: Option<(String, String)>,
}

/// Reasons a text export line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRecordError {
    #[error("line does not start with \"Device ID: \"")]
    MissingId,
    #[error("line has no \", Status: \" section")]
    MissingStatus,
    #[error("status must be On or Off, got \"{0}\"")]
    InvalidStatus(String),
    #[error("field \"{0}\" is not of the form \"Name: value\"")]
    MalformedField(String),
}

/// Parses a `Device ID: <id>, Status: <On|Off>[, <Field>: <value>]` line.
///
/// # Errors
///
/// Returns a [`ParseRecordError`] describing the first malformed section.
pub fn parse_line(line: &str) -> Result<DeviceRecord, ParseRecordError> {
    let rest = line
        .trim_end()
        .strip_prefix("Device ID: ")
        .ok_or(ParseRecordError::MissingId)?;
    let (id, rest) = rest
        .split_once(", Status: ")
        .ok_or(ParseRecordError::MissingStatus)?;
    let (status, field) = match rest.split_once(", ") {
        Some((status, field)) => (status, Some(field)),
        None => (rest, None),
    };
    let is_on = match status {
        "On" => true,
        "Off" => false,
        other => return Err(ParseRecordError::InvalidStatus(other.to_string())),
    };
    let field = field
        .map(|f| {
            f.split_once(": ")
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| ParseRecordError::MalformedField(f.to_string()))
        })
        .transpose()?;

    Ok(DeviceRecord {
        id: DeviceId::new(id),
        is_on,
        field,
    })
}
