use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::media::{DeviceInput, InputId};
use crate::models::output::{MovieFileSink, OutputSink, PhotoSink, SinkId};

/// Completion for a still capture: encoded image bytes or an error.
pub type PhotoCompletion = Box<dyn FnOnce(Result<Vec<u8>, CaptureError>) + Send + 'static>;

/// Completion for a movie recording: the finished file or an error.
pub type MovieCompletion = Box<dyn FnOnce(Result<PathBuf, CaptureError>) + Send + 'static>;

/// Interface to the platform capture session.
///
/// Only the controller mutates a backend; the begin/commit bracket marks a
/// configuration transaction during which the session must not run
/// half-configured.
pub trait SessionBackend: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn inputs(&self) -> Vec<DeviceInput>;

    fn outputs(&self) -> Vec<OutputSink>;

    /// Capability check. The controller never adds an input this rejects.
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: DeviceInput);

    fn remove_input(&mut self, id: InputId);

    /// Capability check. The controller never adds an output this rejects.
    fn can_add_output(&self, output: &OutputSink) -> bool;

    fn add_output(&mut self, output: OutputSink);

    fn remove_output(&mut self, id: SinkId);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;

    /// Capture a still through `sink`. `completion` fires exactly once, on any
    /// thread, unless this returns an error.
    fn capture_photo(&mut self, sink: &PhotoSink, completion: PhotoCompletion) -> Result<(), CaptureError>;

    /// Start recording through `sink` to `path`. `completion` fires exactly
    /// once when the file is finalized, after `stop_recording` or on its own
    /// (max duration, device loss). On error `completion` never fires.
    fn start_recording(
        &mut self,
        sink: &MovieFileSink,
        path: &Path,
        completion: MovieCompletion,
    ) -> Result<(), CaptureError>;

    fn stop_recording(&mut self, sink: &MovieFileSink) -> Result<(), CaptureError>;
}
