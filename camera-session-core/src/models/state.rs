use serde::{Deserialize, Serialize};

use super::capture::CaptureId;
use super::error::CaptureError;
use super::media::{CaptureMode, DevicePosition};
use super::permission::PermissionState;
use super::preview::SessionHandle;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// unpermitted ─grant→ configuring ─commit→ ready(mode) ⇄ idle(mode)
///      │                   ↑                  │   ↑
///      deny                └─ switch mode ────┘   │
///      ↓                      or camera           │
///   denied                       ready ─capture→ capturing
/// ```
/// `Denied` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    Unpermitted,
    Configuring,
    /// Configured, session not running.
    Idle { mode: CaptureMode },
    /// Configured and running.
    Ready { mode: CaptureMode },
    Capturing { mode: CaptureMode, capture_id: CaptureId },
    Denied,
}

impl SessionPhase {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Denied)
    }

    /// Whether the session has been configured at least once.
    pub fn is_configured(&self) -> bool {
        matches!(
            self,
            Self::Idle { .. } | Self::Ready { .. } | Self::Capturing { .. }
        )
    }
}

/// Plain snapshot of the controller state, published on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionHandle,
    pub phase: SessionPhase,
    pub position: DevicePosition,
    pub mode: CaptureMode,
    pub camera_permission: PermissionState,
    pub microphone_permission: PermissionState,
    pub running: bool,
    /// Id of the camera bound as input, if any.
    pub input_device: Option<String>,
    /// Kind of the attached output sink, if any.
    pub output: Option<CaptureMode>,
    pub switch_deferred: bool,
}

impl SessionSnapshot {
    pub(crate) fn initial(session: SessionHandle, position: DevicePosition, mode: CaptureMode) -> Self {
        Self {
            session,
            phase: SessionPhase::Unpermitted,
            position,
            mode,
            camera_permission: PermissionState::Undetermined,
            microphone_permission: PermissionState::Undetermined,
            running: false,
            input_device: None,
            output: None,
            switch_deferred: false,
        }
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string(self)
            .map_err(|e| CaptureError::InvalidState(format!("snapshot serialization failed: {}", e)))
    }
}
