use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::media::{CameraDevice, DeviceInput, DevicePosition, DeviceType, MediaKind};
use crate::traits::device_provider::DeviceProvider;

#[derive(Debug, Default)]
struct DeviceRegistry {
    devices: Vec<CameraDevice>,
    busy: HashSet<String>,
}

/// In-memory camera registry.
///
/// Clones share the same registry, so devices can be plugged, unplugged or
/// marked busy after the provider has been handed to a controller.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDevices {
    inner: Arc<Mutex<DeviceRegistry>>,
}

impl HeadlessDevices {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DeviceRegistry {
                devices,
                busy: HashSet::new(),
            })),
        }
    }

    /// A phone-like registry: one wide-angle camera on each side.
    pub fn front_and_back() -> Self {
        Self::new(vec![
            CameraDevice {
                id: "headless-front".into(),
                name: "Front Camera".into(),
                position: DevicePosition::Front,
                device_type: DeviceType::BuiltInWideAngle,
            },
            CameraDevice {
                id: "headless-back".into(),
                name: "Back Camera".into(),
                position: DevicePosition::Back,
                device_type: DeviceType::BuiltInWideAngle,
            },
        ])
    }

    pub fn connect(&self, device: CameraDevice) {
        log::debug!("headless device connected: {}", device.id);
        self.inner.lock().devices.push(device);
    }

    pub fn disconnect(&self, id: &str) {
        log::debug!("headless device disconnected: {}", id);
        self.inner.lock().devices.retain(|d| d.id != id);
    }

    /// Make `make_input` fail for `id`, as when another process holds the camera.
    pub fn set_busy(&self, id: &str, busy: bool) {
        let mut registry = self.inner.lock();
        if busy {
            registry.busy.insert(id.to_string());
        } else {
            registry.busy.remove(id);
        }
    }
}

impl DeviceProvider for HeadlessDevices {
    fn default_device(
        &self,
        device_type: DeviceType,
        kind: MediaKind,
        position: DevicePosition,
    ) -> Option<CameraDevice> {
        if kind != MediaKind::Video {
            return None;
        }
        self.inner
            .lock()
            .devices
            .iter()
            .find(|d| d.position == position && d.device_type == device_type)
            .cloned()
    }

    fn make_input(&self, device: &CameraDevice) -> Result<DeviceInput, CaptureError> {
        let registry = self.inner.lock();
        if !registry.devices.iter().any(|d| d.id == device.id) {
            return Err(CaptureError::InputConstruction(format!(
                "device {} is not connected",
                device.id
            )));
        }
        if registry.busy.contains(&device.id) {
            return Err(CaptureError::InputConstruction(format!(
                "device {} is in use",
                device.id
            )));
        }
        Ok(DeviceInput::new(device.clone()))
    }

    fn available_devices(&self) -> Vec<CameraDevice> {
        self.inner.lock().devices.clone()
    }
}
