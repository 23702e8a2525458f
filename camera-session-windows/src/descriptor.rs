//! Mapping from Media Foundation device descriptors to core camera models.
//!
//! Windows does not report which side of the device a camera faces to
//! desktop apps, so the position is inferred from the friendly name
//! ("Microsoft Camera Front", "Rear Camera", ...). Cameras without a hint
//! are treated as front-facing, which matches laptop webcams.

use camera_session_core::models::media::{CameraDevice, DevicePosition, DeviceType};

/// Raw identity of a video capture source as reported by Media Foundation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDeviceDescriptor {
    pub friendly_name: String,
    pub symbolic_link: String,
}

const FRONT_HINTS: [&str; 4] = ["front", "user facing", "user-facing", "selfie"];
const BACK_HINTS: [&str; 4] = ["rear", "back", "world facing", "world-facing"];

pub fn infer_position(friendly_name: &str) -> DevicePosition {
    let name = friendly_name.to_lowercase();
    if BACK_HINTS.iter().any(|hint| name.contains(hint)) {
        return DevicePosition::Back;
    }
    if FRONT_HINTS.iter().any(|hint| name.contains(hint)) {
        return DevicePosition::Front;
    }
    DevicePosition::Front
}

/// USB cameras are external unless the name marks them as integrated
/// (most laptop webcams sit on an internal USB bus).
pub fn infer_device_type(friendly_name: &str, symbolic_link: &str) -> DeviceType {
    let link = symbolic_link.to_lowercase();
    let name = friendly_name.to_lowercase();
    let integrated = ["integrated", "built-in", "internal"]
        .iter()
        .any(|hint| name.contains(hint))
        || FRONT_HINTS.iter().chain(BACK_HINTS.iter()).any(|hint| name.contains(hint));

    if link.contains("usb#") && !integrated {
        DeviceType::External
    } else {
        DeviceType::BuiltInWideAngle
    }
}

impl VideoDeviceDescriptor {
    pub fn to_camera_device(&self) -> CameraDevice {
        CameraDevice {
            id: self.symbolic_link.clone(),
            name: self.friendly_name.clone(),
            position: infer_position(&self.friendly_name),
            device_type: infer_device_type(&self.friendly_name, &self.symbolic_link),
        }
    }
}

/// Pick the default camera of `device_type` at `position`.
///
/// A wide-angle request falls back to an external camera at the same
/// position, so desktops with only a USB webcam still get an input.
pub fn select_default(
    devices: &[CameraDevice],
    device_type: DeviceType,
    position: DevicePosition,
) -> Option<CameraDevice> {
    let at_position = || devices.iter().filter(|d| d.position == position);

    at_position()
        .find(|d| d.device_type == device_type)
        .or_else(|| {
            if device_type == DeviceType::BuiltInWideAngle {
                at_position().find(|d| d.device_type == DeviceType::External)
            } else {
                None
            }
        })
        .cloned()
}
