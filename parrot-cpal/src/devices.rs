//! Audio device enumeration over the default cpal host.

use cpal::traits::{DeviceTrait, HostTrait};

use parrot_core::AudioError;

/// A capture or playback endpoint visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// List capture (microphone) devices.
pub fn list_input_devices() -> Result<Vec<DeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());
    let devices = host.input_devices().map_err(|e| {
        AudioError::DeviceUnavailable(format!("failed to enumerate input devices: {}", e))
    })?;
    Ok(collect(devices, default_name))
}

/// List render (speaker/headphone) devices.
pub fn list_output_devices() -> Result<Vec<DeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| d.name().ok());
    let devices = host.output_devices().map_err(|e| {
        AudioError::DeviceUnavailable(format!("failed to enumerate output devices: {}", e))
    })?;
    Ok(collect(devices, default_name))
}

fn collect(
    devices: impl Iterator<Item = cpal::Device>,
    default_name: Option<String>,
) -> Vec<DeviceInfo> {
    devices
        .enumerate()
        .map(|(i, device)| {
            let name = device.name().unwrap_or_else(|_| format!("Device {}", i));
            let is_default = default_name.as_deref() == Some(name.as_str());
            DeviceInfo { name, is_default }
        })
        .collect()
}
