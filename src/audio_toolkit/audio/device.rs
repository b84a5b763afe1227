use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait};
use log::debug;

pub struct CpalDeviceInfo {
    pub name: String,
    pub device: cpal::Device,
}

pub fn list_input_devices() -> Result<Vec<CpalDeviceInfo>> {
    let host = cpal::default_host();
    let mut result = Vec::new();

    for device in host.input_devices()? {
        match device.name() {
            Ok(name) => result.push(CpalDeviceInfo { name, device }),
            Err(e) => debug!("Skipping input device with unreadable name: {}", e),
        }
    }

    Ok(result)
}

/// Resolve a device by name, falling back to the system default when the
/// name is unset or no longer present.
pub fn find_input_device(name: Option<&str>) -> Option<cpal::Device> {
    if let Some(name) = name {
        match list_input_devices() {
            Ok(devices) => {
                if let Some(info) = devices.into_iter().find(|d| d.name == name) {
                    return Some(info.device);
                }
                debug!("Input device '{}' not found, using default", name);
            }
            Err(e) => debug!("Failed to list devices, using default: {}", e),
        }
    }

    cpal::default_host().default_input_device()
}
