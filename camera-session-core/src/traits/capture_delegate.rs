use crate::models::capture::{CapturedPhoto, RecordedMovie};
use crate::models::error::CaptureError;
use crate::models::media::MediaKind;
use crate::models::permission::PermissionState;
use crate::models::state::SessionSnapshot;

/// Event delegate for controller notifications and output processing.
///
/// All methods are called on the controller's owner thread.
pub trait CaptureDelegate: Send + Sync {
    /// Called whenever the published state changes.
    fn on_state_changed(&self, snapshot: &SessionSnapshot);

    /// Called when access to `kind` is denied or restricted.
    ///
    /// Hosts typically offer a redirect to the system privacy settings here.
    fn on_permission_denied(&self, kind: MediaKind, state: PermissionState) {
        let _ = (kind, state);
    }

    /// Called for errors absorbed by the controller (device resolution,
    /// failed captures).
    fn on_error(&self, error: &CaptureError);

    /// Output processing for a finished still capture.
    fn on_photo_captured(&self, photo: &CapturedPhoto);

    /// Output processing for a finished movie recording.
    fn on_movie_recorded(&self, movie: &RecordedMovie);
}
