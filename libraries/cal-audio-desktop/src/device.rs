// cal-audio-desktop/src/device.rs
//
// Output device enumeration. A device id is the device's index in the default
// host's output device list, so ids are stable for as long as the set of
// connected devices does not change.

use cal_core::DeviceInfo;
use cpal::traits::{DeviceTrait, HostTrait};
use tracing::debug;

use crate::error::{OutputError, Result};

#[allow(deprecated)]
fn device_name(device: &cpal::Device) -> Option<String> {
    device.name().ok()
}

fn describe(id: i32, device: &cpal::Device, default_name: Option<&str>) -> Result<DeviceInfo> {
    let name = device_name(device).unwrap_or_else(|| format!("Output {}", id));
    let config = device.default_output_config()?;

    Ok(DeviceInfo {
        id,
        is_default: default_name == Some(name.as_str()),
        name,
        channels: config.channels(),
        sample_rate: config.sample_rate(),
    })
}

/// Enumerate the output devices of the default host, in id order
///
/// Devices that cannot report a default output configuration are skipped but
/// keep their id, so ids always match [`find_device`].
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().as_ref().and_then(device_name);

    let mut device_list = Vec::new();
    for (idx, device) in host.output_devices()?.enumerate() {
        let id = i32::try_from(idx).map_err(|_| OutputError::EnumerationFailed("too many devices".into()))?;
        match describe(id, &device, default_name.as_deref()) {
            Ok(info) => device_list.push(info),
            Err(e) => debug!("Skipping output device {}: {}", id, e),
        }
    }

    Ok(device_list)
}

/// Resolve a device id to the cpal device and its description
///
/// # Errors
/// `DeviceNotFound` for a negative id or an id past the end of the list
pub fn find_device(device_id: i32) -> Result<(cpal::Device, DeviceInfo)> {
    let idx = usize::try_from(device_id)
        .map_err(|_| OutputError::DeviceNotFound(format!("device id {} is negative", device_id)))?;

    let host = cpal::default_host();
    let default_name = host.default_output_device().as_ref().and_then(device_name);

    let device = host
        .output_devices()?
        .nth(idx)
        .ok_or_else(|| OutputError::DeviceNotFound(format!("no output device with id {}", device_id)))?;

    let info = describe(device_id, &device, default_name.as_deref())?;
    Ok((device, info))
}
