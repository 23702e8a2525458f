use thiserror::Error;

use super::capture::CaptureId;
use super::media::{CaptureMode, DevicePosition, MediaKind};
use super::permission::PermissionState;

/// Errors that can occur while configuring or driving a capture session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("{kind:?} permission not granted ({state:?})")]
    PermissionDenied {
        kind: MediaKind,
        state: PermissionState,
    },

    #[error("no {position:?} camera available")]
    DeviceNotFound { position: DevicePosition },

    #[error("failed to create device input: {0}")]
    InputConstruction(String),

    #[error("session cannot accept the device input")]
    InputRejected,

    #[error("session cannot accept a {0:?} output")]
    OutputRejected(CaptureMode),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("a capture is already in progress")]
    CaptureInProgress,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("no capture in flight with id {0}")]
    UnknownCapture(CaptureId),
}

impl CaptureError {
    /// Whether the error came from the permission subsystem.
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
