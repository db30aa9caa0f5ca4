//! Best-effort microphone access probe.

use cpal::traits::{DeviceTrait, HostTrait};

use parrot_core::{AudioError, PermissionGate};

/// Permission gate that probes the default input device.
///
/// Desktop hosts expose no uniform consent API, so this asks sideways:
/// a default input device that exists but refuses to describe any
/// stream configuration is treated as blocked, which is how an OS
/// privacy toggle usually manifests through the host. A machine with
/// no input device at all is not a permission problem; capture later
/// fails with `DeviceUnavailable` instead.
pub struct MicProbeGate;

impl PermissionGate for MicProbeGate {
    fn microphone_allowed(&self) -> Result<bool, AudioError> {
        let host = cpal::default_host();
        let Some(device) = host.default_input_device() else {
            return Ok(true);
        };
        match device.supported_input_configs() {
            Ok(mut configs) => Ok(configs.next().is_some()),
            Err(e) => {
                log::warn!("microphone access probe failed: {}", e);
                Ok(false)
            }
        }
    }
}
