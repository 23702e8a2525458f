use crate::models::preview::{PreviewFrame, SessionHandle, VideoGravity};

/// A host rendering surface that displays a session's live video.
///
/// No data flows back to the controller.
pub trait PreviewSurface {
    fn attach(&self, session: SessionHandle, frame: PreviewFrame, gravity: VideoGravity);
}
