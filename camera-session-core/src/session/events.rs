use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::capture::CaptureId;
use crate::models::error::CaptureError;
use crate::models::media::MediaKind;
use crate::models::state::SessionSnapshot;

/// Asynchronous notifications marshaled back onto the controller's owner thread.
#[derive(Debug)]
pub enum ControllerEvent {
    PermissionResolved {
        kind: MediaKind,
        granted: bool,
    },
    PhotoFinished {
        capture_id: CaptureId,
        result: Result<Vec<u8>, CaptureError>,
    },
    MovieFinished {
        capture_id: CaptureId,
        result: Result<PathBuf, CaptureError>,
    },
}

/// Cloneable handle for posting events to a controller from any thread.
///
/// Events are applied when the owner calls `process_events` or `wait_for_event`.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<ControllerEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: Sender<ControllerEvent>) -> Self {
        Self { tx }
    }

    /// Post an event. Returns false if the controller has been dropped.
    pub fn send(&self, event: ControllerEvent) -> bool {
        if self.tx.send(event).is_err() {
            log::debug!("controller gone, dropping event");
            return false;
        }
        true
    }

    pub fn permission_resolved(&self, kind: MediaKind, granted: bool) -> bool {
        self.send(ControllerEvent::PermissionResolved { kind, granted })
    }

    pub fn photo_finished(&self, capture_id: CaptureId, result: Result<Vec<u8>, CaptureError>) -> bool {
        self.send(ControllerEvent::PhotoFinished { capture_id, result })
    }

    pub fn movie_finished(&self, capture_id: CaptureId, result: Result<PathBuf, CaptureError>) -> bool {
        self.send(ControllerEvent::MovieFinished { capture_id, result })
    }
}

/// Read-only view of the latest published `SessionSnapshot`, for polling
/// from other threads.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    inner: Arc<Mutex<SessionSnapshot>>,
}

impl SnapshotReader {
    pub(crate) fn new(inner: Arc<Mutex<SessionSnapshot>>) -> Self {
        Self { inner }
    }

    pub fn get(&self) -> SessionSnapshot {
        self.inner.lock().clone()
    }
}
