//! Video capture device enumeration via Media Foundation.

use camera_session_core::models::error::CaptureError;
use camera_session_core::models::media::{CameraDevice, DeviceInput, DevicePosition, DeviceType, MediaKind};
use camera_session_core::models::permission::PermissionState;
use camera_session_core::traits::device_provider::DeviceProvider;

use crate::descriptor::select_default;
use crate::media_foundation::{MediaFoundation, ProbeResult};

/// `DeviceProvider` backed by `MFEnumDeviceSources`.
///
/// Enumerates on every call, so cameras plugged in after construction are
/// picked up by the next configuration pass.
#[derive(Debug, Default)]
pub struct MediaFoundationDevices;

impl MediaFoundationDevices {
    pub fn new() -> Self {
        Self
    }

    fn enumerate(&self) -> Result<Vec<CameraDevice>, CaptureError> {
        let mf = MediaFoundation::startup()?;
        let devices = mf
            .video_devices()?
            .iter()
            .map(|d| d.to_camera_device())
            .collect();
        Ok(devices)
    }
}

impl DeviceProvider for MediaFoundationDevices {
    fn default_device(
        &self,
        device_type: DeviceType,
        kind: MediaKind,
        position: DevicePosition,
    ) -> Option<CameraDevice> {
        if kind != MediaKind::Video {
            return None;
        }
        select_default(&self.available_devices(), device_type, position)
    }

    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, CaptureError> {
        let mf = MediaFoundation::startup()?;
        match mf.probe(&device.id) {
            ProbeResult::Opened => Ok(DeviceInput::new(device.clone())),
            ProbeResult::AccessDenied => Err(CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: PermissionState::Denied,
            }),
            ProbeResult::Failed(reason) => Err(CaptureError::InputConstruction(format!(
                "{}: {}",
                device.name, reason
            ))),
        }
    }

    fn available_devices(&self) -> Vec<CameraDevice> {
        match self.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                log::error!("video device enumeration failed: {}", e);
                Vec::new()
            }
        }
    }
}
