use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::DevicePosition;

/// Identifies one photo capture or movie recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(pub uuid::Uuid);

impl CaptureId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A finished still capture, handed to the host for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    pub capture_id: CaptureId,
    pub position: DevicePosition,
    /// Encoded image bytes exactly as delivered by the platform.
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

/// A finished movie recording, handed to the host for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMovie {
    pub capture_id: CaptureId,
    pub position: DevicePosition,
    pub file_path: PathBuf,
    pub finished_at: DateTime<Utc>,
}
