use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::media::{DeviceInput, InputId};
use crate::models::output::{MovieFileSink, OutputSink, PhotoSink, SinkId};
use crate::traits::capture_session::{MovieCompletion, PhotoCompletion, SessionBackend};

struct ActiveRecording {
    sink: SinkId,
    path: PathBuf,
    completion: MovieCompletion,
}

/// Internal mutable session state, shared with `HeadlessCaptureControl`.
struct SessionInner {
    inputs: Vec<DeviceInput>,
    outputs: Vec<OutputSink>,
    in_transaction: bool,
    transactions: u64,
    running: bool,
    pending_photos: VecDeque<PhotoCompletion>,
    recording: Option<ActiveRecording>,
}

/// In-memory capture session with no hardware behind it.
///
/// Honors the single-input/single-output capacity of a camera session
/// (configurable), records configuration transactions, and parks capture
/// completions until they are finished through a `HeadlessCaptureControl`.
pub struct HeadlessSession {
    inner: Arc<Mutex<SessionInner>>,
    input_capacity: usize,
    output_capacity: usize,
    auto_photo: Option<Vec<u8>>,
}

impl HeadlessSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                inputs: Vec::new(),
                outputs: Vec::new(),
                in_transaction: false,
                transactions: 0,
                running: false,
                pending_photos: VecDeque::new(),
                recording: None,
            })),
            input_capacity: 1,
            output_capacity: 1,
            auto_photo: None,
        }
    }

    /// Maximum number of inputs accepted (0 rejects every input).
    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        self.input_capacity = capacity;
        self
    }

    /// Maximum number of outputs accepted (0 rejects every output).
    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    /// Complete every photo capture immediately with `data`.
    pub fn with_auto_photo(mut self, data: Vec<u8>) -> Self {
        self.auto_photo = Some(data);
        self
    }

    /// Handle for inspecting the session and finishing captures.
    pub fn control(&self) -> HeadlessCaptureControl {
        HeadlessCaptureControl {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for HeadlessSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for HeadlessSession {
    fn begin_configuration(&mut self) {
        let mut s = self.inner.lock();
        if s.in_transaction {
            log::warn!("nested configuration transaction");
        }
        s.in_transaction = true;
    }

    fn commit_configuration(&mut self) {
        let mut s = self.inner.lock();
        if !s.in_transaction {
            log::warn!("commit without begin");
        }
        s.in_transaction = false;
        s.transactions += 1;
    }

    fn inputs(&self) -> Vec<DeviceInput> {
        self.inner.lock().inputs.clone()
    }

    fn outputs(&self) -> Vec<OutputSink> {
        self.inner.lock().outputs.clone()
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        let s = self.inner.lock();
        s.inputs.len() < self.input_capacity && !s.inputs.iter().any(|i| i.id == input.id)
    }

    fn add_input(&mut self, input: DeviceInput) {
        self.inner.lock().inputs.push(input);
    }

    fn remove_input(&mut self, id: InputId) {
        self.inner.lock().inputs.retain(|i| i.id != id);
    }

    fn can_add_output(&self, output: &OutputSink) -> bool {
        let s = self.inner.lock();
        s.outputs.len() < self.output_capacity && !s.outputs.iter().any(|o| o.id() == output.id())
    }

    fn add_output(&mut self, output: OutputSink) {
        self.inner.lock().outputs.push(output);
    }

    fn remove_output(&mut self, id: SinkId) {
        self.inner.lock().outputs.retain(|o| o.id() != id);
    }

    fn start_running(&mut self) {
        self.inner.lock().running = true;
    }

    fn stop_running(&mut self) {
        self.inner.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    fn capture_photo(&mut self, sink: &PhotoSink, completion: PhotoCompletion) -> Result<(), CaptureError> {
        {
            let mut s = self.inner.lock();
            if !s.running {
                return Err(CaptureError::CaptureFailed("session is not running".into()));
            }
            if !s.outputs.iter().any(|o| o.id() == sink.id) {
                return Err(CaptureError::CaptureFailed("photo output is not attached".into()));
            }
            if self.auto_photo.is_none() {
                s.pending_photos.push_back(completion);
                return Ok(());
            }
        }
        if let Some(data) = &self.auto_photo {
            completion(Ok(data.clone()));
        }
        Ok(())
    }

    fn start_recording(
        &mut self,
        sink: &MovieFileSink,
        path: &Path,
        completion: MovieCompletion,
    ) -> Result<(), CaptureError> {
        let mut s = self.inner.lock();
        if !s.running {
            return Err(CaptureError::CaptureFailed("session is not running".into()));
        }
        if s.recording.is_some() {
            return Err(CaptureError::CaptureInProgress);
        }
        if !s.outputs.iter().any(|o| o.id() == sink.id) {
            return Err(CaptureError::CaptureFailed("movie output is not attached".into()));
        }
        s.recording = Some(ActiveRecording {
            sink: sink.id,
            path: path.to_path_buf(),
            completion,
        });
        Ok(())
    }

    fn stop_recording(&mut self, sink: &MovieFileSink) -> Result<(), CaptureError> {
        let recording = {
            let mut s = self.inner.lock();
            match &s.recording {
                Some(r) if r.sink == sink.id => s.recording.take(),
                _ => return Err(CaptureError::InvalidState("not recording".into())),
            }
        };
        if let Some(r) = recording {
            (r.completion)(Ok(r.path));
        }
        Ok(())
    }
}

/// Shared handle onto a `HeadlessSession` for hosts and tests: inspect the
/// attached inputs/outputs and deliver capture completions.
#[derive(Clone)]
pub struct HeadlessCaptureControl {
    inner: Arc<Mutex<SessionInner>>,
}

impl HeadlessCaptureControl {
    pub fn inputs(&self) -> Vec<DeviceInput> {
        self.inner.lock().inputs.clone()
    }

    pub fn outputs(&self) -> Vec<OutputSink> {
        self.inner.lock().outputs.clone()
    }

    /// Number of committed configuration transactions.
    pub fn transactions(&self) -> u64 {
        self.inner.lock().transactions
    }

    pub fn in_transaction(&self) -> bool {
        self.inner.lock().in_transaction
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn pending_photos(&self) -> usize {
        self.inner.lock().pending_photos.len()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().recording.is_some()
    }

    /// Finish the oldest pending photo capture. Returns false if none is pending.
    pub fn finish_photo(&self, result: Result<Vec<u8>, CaptureError>) -> bool {
        let completion = self.inner.lock().pending_photos.pop_front();
        match completion {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }

    /// End the active recording with `error`, as on device loss.
    /// Returns false if nothing is recording.
    pub fn interrupt_recording(&self, error: CaptureError) -> bool {
        let recording = self.inner.lock().recording.take();
        match recording {
            Some(r) => {
                (r.completion)(Err(error));
                true
            }
            None => false,
        }
    }
}
