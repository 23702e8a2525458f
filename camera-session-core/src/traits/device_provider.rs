use crate::models::error::CaptureError;
use crate::models::media::{CameraDevice, DeviceInput, DevicePosition, DeviceType, MediaKind};

/// Interface to the platform's capture device registry.
pub trait DeviceProvider: Send + Sync {
    /// The default device of `device_type` for `kind` at `position`, if one exists.
    fn default_device(
        &self,
        device_type: DeviceType,
        kind: MediaKind,
        position: DevicePosition,
    ) -> Option<CameraDevice>;

    /// Wrap `device` as a session input. Fails when the device cannot be opened.
    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, CaptureError>;

    /// All cameras currently connected.
    fn available_devices(&self) -> Vec<CameraDevice>;
}
