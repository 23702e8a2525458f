use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::media::{CaptureMode, DevicePosition, DeviceType, MediaKind};
use super::preview::VideoGravity;

/// What to do with a camera or mode switch requested while a capture is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchPolicy {
    /// Fail the intent with `CaptureError::CaptureInProgress`.
    #[default]
    Reject,
    /// Remember the latest request and apply it once the capture completes.
    Defer,
}

/// Configuration for a capture session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Camera bound on first configuration (default: front).
    pub initial_position: DevicePosition,

    /// Capture mode on first configuration (default: photo).
    pub initial_mode: CaptureMode,

    /// Camera type resolved for each position (default: built-in wide angle).
    pub device_type: DeviceType,

    /// Media kinds checked by `activate()`, in order. Must include video.
    pub required_media: Vec<MediaKind>,

    /// Mid-capture switch handling (default: reject).
    pub switch_policy: SwitchPolicy,

    /// Start the session as soon as it is first configured (default: true).
    pub auto_start_running: bool,

    /// Gravity passed to preview surfaces (default: resize aspect fill).
    pub preview_gravity: VideoGravity,

    /// Maximum movie duration in seconds (None = unlimited).
    pub max_movie_duration_secs: Option<f64>,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !self.required_media.contains(&MediaKind::Video) {
            return Err("required media must include video".into());
        }
        if let Some(max) = self.max_movie_duration_secs {
            if !max.is_finite() || max <= 0.0 {
                return Err(format!("max movie duration must be positive: {}", max));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid configuration: {}", e)))?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            initial_position: DevicePosition::Front,
            initial_mode: CaptureMode::Photo,
            device_type: DeviceType::BuiltInWideAngle,
            required_media: vec![MediaKind::Video],
            switch_policy: SwitchPolicy::Reject,
            auto_start_running: true,
            preview_gravity: VideoGravity::ResizeAspectFill,
            max_movie_duration_secs: None,
        }
    }
}
