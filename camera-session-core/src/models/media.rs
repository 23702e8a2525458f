use serde::{Deserialize, Serialize};

/// Kind of media a permission or device applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Which physical camera to bind as the session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    #[default]
    Front,
    Back,
}

impl DevicePosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Capture mode. Determines which output sink type is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Photo => Self::Video,
            Self::Video => Self::Photo,
        }
    }
}

/// Physical camera type. The controller resolves one type per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    BuiltInWideAngle,
    BuiltInUltraWide,
    BuiltInTelephoto,
    External,
}

/// A camera available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
    pub device_type: DeviceType,
}

/// Identifier of a device wrapped as a session input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId(pub uuid::Uuid);

/// A camera device wrapped as a session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    pub id: InputId,
    pub device: CameraDevice,
}

impl DeviceInput {
    pub fn new(device: CameraDevice) -> Self {
        Self {
            id: InputId(uuid::Uuid::new_v4()),
            device,
        }
    }
}
