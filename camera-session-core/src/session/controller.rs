use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::capture::{CaptureId, CapturedPhoto, RecordedMovie};
use crate::models::config::{SessionConfiguration, SwitchPolicy};
use crate::models::error::CaptureError;
use crate::models::media::{CameraDevice, CaptureMode, DeviceInput, DevicePosition, MediaKind};
use crate::models::output::{MovieFileSink, OutputSink};
use crate::models::permission::PermissionState;
use crate::models::preview::{PreviewFrame, SessionHandle};
use crate::models::state::{SessionPhase, SessionSnapshot};
use crate::session::events::{ControllerEvent, EventSender, SnapshotReader};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_session::SessionBackend;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::permission_provider::PermissionProvider;
use crate::traits::preview_surface::PreviewSurface;

/// Outcome of one configuration pass.
///
/// Input and output failures are absorbed (the session still commits) and
/// reported here so callers can react, e.g. retry after a hot-plug.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationReport {
    pub position: DevicePosition,
    pub mode: CaptureMode,
    pub input: Result<DeviceInput, CaptureError>,
    pub output: Result<OutputSink, CaptureError>,
}

impl ConfigurationReport {
    /// Both an input and an output were attached.
    pub fn is_complete(&self) -> bool {
        self.input.is_ok() && self.output.is_ok()
    }
}

enum InFlight {
    Photo {
        capture_id: CaptureId,
    },
    Movie {
        capture_id: CaptureId,
        sink: MovieFileSink,
        stop_requested: bool,
    },
}

/// Camera capture session controller.
///
/// Generic over the platform's session, device and permission subsystems.
/// Owns the session exclusively: every mutation goes through an intent
/// method on `&mut self`, so configuration transactions never interleave.
/// Completions from the platform arrive on arbitrary threads as
/// `ControllerEvent`s and are applied by `process_events`/`wait_for_event`.
///
/// ```text
/// [PermissionProvider] ─┐                 ┌→ [CaptureDelegate]
/// [DeviceProvider]     ─┼→ [controller] ──┼→ [SnapshotReader]
/// [SessionBackend]     ─┘       ↑         └→ [PreviewSurface]
///                       completions (mpsc)
/// ```
pub struct CaptureSessionController<B: SessionBackend, D: DeviceProvider, P: PermissionProvider> {
    backend: B,
    devices: D,
    permissions: P,
    config: SessionConfiguration,
    handle: SessionHandle,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    phase: SessionPhase,
    position: DevicePosition,
    mode: CaptureMode,
    camera_permission: PermissionState,
    microphone_permission: PermissionState,
    pending_requests: HashSet<MediaKind>,

    input: Option<DeviceInput>,
    output: Option<OutputSink>,
    in_flight: Option<InFlight>,
    // Latest (position, mode) requested while a capture was in flight.
    deferred: Option<(DevicePosition, CaptureMode)>,

    events_tx: Sender<ControllerEvent>,
    events_rx: Receiver<ControllerEvent>,
    published: Arc<Mutex<SessionSnapshot>>,
}

impl<B: SessionBackend, D: DeviceProvider, P: PermissionProvider> CaptureSessionController<B, D, P> {
    pub fn new(
        backend: B,
        devices: D,
        permissions: P,
        config: SessionConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let handle = SessionHandle::new();
        let (events_tx, events_rx) = mpsc::channel();
        let published = SessionSnapshot::initial(handle, config.initial_position, config.initial_mode);

        Ok(Self {
            backend,
            devices,
            permissions,
            handle,
            delegate: None,
            phase: SessionPhase::Unpermitted,
            position: config.initial_position,
            mode: config.initial_mode,
            camera_permission: PermissionState::Undetermined,
            microphone_permission: PermissionState::Undetermined,
            pending_requests: HashSet::new(),
            input: None,
            output: None,
            in_flight: None,
            deferred: None,
            events_tx,
            events_rx,
            published: Arc::new(Mutex::new(published)),
            config,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn position(&self) -> DevicePosition {
        self.position
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// The session backend, for inspection. Mutation stays with the controller.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.build_snapshot()
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.published))
    }

    /// Handle for posting platform completions to this controller.
    pub fn event_sender(&self) -> EventSender {
        EventSender::new(self.events_tx.clone())
    }

    pub fn available_devices(&self) -> Vec<CameraDevice> {
        self.devices.available_devices()
    }

    // --- Permissions ---

    /// Check every media kind listed in `required_media`, video first.
    /// Only a camera refusal fails activation.
    pub fn activate(&mut self) -> Result<(), CaptureError> {
        let mut kinds = self.config.required_media.clone();
        kinds.sort_by_key(|kind| *kind != MediaKind::Video);
        kinds.dedup();
        for kind in kinds {
            match self.check_permissions(kind) {
                Err(e) if kind == MediaKind::Video => return Err(e),
                Err(e) => log::warn!("continuing without {:?}: {}", kind, e),
                Ok(()) => {}
            }
        }
        Ok(())
    }

    /// Query the permission for `kind` and act on it.
    ///
    /// Undetermined issues an asynchronous request; Authorized video
    /// configures the session; Denied/Restricted fires the delegate's
    /// denial hook and returns `PermissionDenied`. Only video gates
    /// configuration.
    pub fn check_permissions(&mut self, kind: MediaKind) -> Result<(), CaptureError> {
        if kind == MediaKind::Video && self.camera_permission.is_refused() {
            return Err(CaptureError::PermissionDenied {
                kind,
                state: self.camera_permission,
            });
        }

        let state = self.permissions.authorization_status(kind);
        log::debug!("{:?} permission is {:?}", kind, state);

        match state {
            PermissionState::Undetermined => {
                if !self.pending_requests.insert(kind) {
                    log::debug!("{:?} permission request already pending", kind);
                    return Ok(());
                }
                self.record_permission(kind, state);
                let sender = self.event_sender();
                self.permissions.request_access(
                    kind,
                    Box::new(move |granted| {
                        sender.permission_resolved(kind, granted);
                    }),
                );
                Ok(())
            }
            PermissionState::Authorized => {
                self.permission_granted(kind);
                Ok(())
            }
            PermissionState::Denied | PermissionState::Restricted => {
                self.permission_refused(kind, state);
                Err(CaptureError::PermissionDenied { kind, state })
            }
        }
    }

    fn record_permission(&mut self, kind: MediaKind, state: PermissionState) {
        match kind {
            MediaKind::Video => self.camera_permission = state,
            MediaKind::Audio => self.microphone_permission = state,
        }
        self.publish();
    }

    fn permission_granted(&mut self, kind: MediaKind) {
        self.record_permission(kind, PermissionState::Authorized);
        if kind != MediaKind::Video {
            return;
        }
        if self.in_flight.is_some() {
            log::debug!("camera authorized during capture, keeping current configuration");
            return;
        }
        if let Err(e) = self.configure_devices() {
            log::error!("configuration after permission grant failed: {}", e);
        }
    }

    fn permission_refused(&mut self, kind: MediaKind, state: PermissionState) {
        log::warn!("{:?} permission refused: {:?}", kind, state);
        self.record_permission(kind, state);

        if kind == MediaKind::Video {
            if self.phase.is_configured() {
                self.tear_down();
            }
            self.deferred = None;
            self.set_phase(SessionPhase::Denied);
        }

        if let Some(ref delegate) = self.delegate {
            delegate.on_permission_denied(kind, state);
        }
    }

    /// Release the camera after access was revoked. An in-flight capture is
    /// failed here; its late completion is dropped as stale.
    fn tear_down(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            let capture_id = match in_flight {
                InFlight::Photo { capture_id } => capture_id,
                InFlight::Movie {
                    capture_id,
                    sink,
                    stop_requested,
                } => {
                    if !stop_requested {
                        if let Err(e) = self.backend.stop_recording(&sink) {
                            log::warn!("failed to stop recording {}: {}", capture_id, e);
                        }
                    }
                    capture_id
                }
            };
            log::warn!("capture {} aborted by permission revocation", capture_id);
            self.report_error(CaptureError::CaptureFailed("camera access revoked".into()));
        }

        self.backend.begin_configuration();
        for input in self.backend.inputs() {
            self.backend.remove_input(input.id);
        }
        for output in self.backend.outputs() {
            self.backend.remove_output(output.id());
        }
        self.backend.commit_configuration();
        self.backend.stop_running();
        self.input = None;
        self.output = None;
    }

    // --- Configuration ---

    /// Rebuild the session for the current position and mode inside one
    /// configuration transaction: clear all inputs and outputs, attach one
    /// input and one output, commit.
    ///
    /// Requires camera authorization. Input/output failures do not abort
    /// the transaction; they are reported in the returned report and to the
    /// delegate.
    pub fn configure_devices(&mut self) -> Result<ConfigurationReport, CaptureError> {
        if !self.camera_permission.is_authorized() {
            return Err(CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: self.camera_permission,
            });
        }
        if self.in_flight.is_some() {
            return Err(CaptureError::CaptureInProgress);
        }

        let first_configuration = !self.phase.is_configured();
        self.set_phase(SessionPhase::Configuring);

        self.backend.begin_configuration();
        let input = self.configure_input();
        let output = self.configure_output();
        self.backend.commit_configuration();

        if let Err(ref e) = input {
            self.report_error(e.clone());
        }
        if let Err(ref e) = output {
            self.report_error(e.clone());
        }

        if first_configuration && self.config.auto_start_running && !self.backend.is_running() {
            log::info!("starting capture session");
            self.backend.start_running();
        }

        let mode = self.mode;
        self.set_phase(if self.backend.is_running() {
            SessionPhase::Ready { mode }
        } else {
            SessionPhase::Idle { mode }
        });

        Ok(ConfigurationReport {
            position: self.position,
            mode,
            input,
            output,
        })
    }

    fn configure_input(&mut self) -> Result<DeviceInput, CaptureError> {
        log::debug!("configuring input with {:?} camera", self.position);

        for input in self.backend.inputs() {
            self.backend.remove_input(input.id);
        }
        self.input = None;

        let device = self
            .devices
            .default_device(self.config.device_type, MediaKind::Video, self.position)
            .ok_or(CaptureError::DeviceNotFound {
                position: self.position,
            })?;

        let input = self.devices.make_input(&device).map_err(|e| match e {
            CaptureError::InputConstruction(_) => e,
            other => CaptureError::InputConstruction(other.to_string()),
        })?;

        if !self.backend.can_add_input(&input) {
            return Err(CaptureError::InputRejected);
        }

        self.backend.add_input(input.clone());
        self.input = Some(input.clone());
        Ok(input)
    }

    fn configure_output(&mut self) -> Result<OutputSink, CaptureError> {
        for output in self.backend.outputs() {
            self.backend.remove_output(output.id());
        }
        self.output = None;

        let output = OutputSink::for_mode(self.mode, self.config.max_movie_duration_secs);
        if !self.backend.can_add_output(&output) {
            return Err(CaptureError::OutputRejected(self.mode));
        }

        self.backend.add_output(output.clone());
        self.output = Some(output.clone());
        Ok(output)
    }

    // --- Intents ---

    /// Flip between the front and back camera.
    pub fn switch_camera(&mut self) -> Result<(), CaptureError> {
        let (position, mode) = self.target();
        self.request_switch(position.opposite(), mode)
    }

    pub fn set_position(&mut self, position: DevicePosition) -> Result<(), CaptureError> {
        let (_, mode) = self.target();
        self.request_switch(position, mode)
    }

    /// Flip between photo and video mode.
    pub fn switch_mode(&mut self) -> Result<(), CaptureError> {
        let (position, mode) = self.target();
        self.request_switch(position, mode.toggled())
    }

    pub fn set_mode(&mut self, mode: CaptureMode) -> Result<(), CaptureError> {
        let (position, _) = self.target();
        self.request_switch(position, mode)
    }

    /// The position and mode the session is heading to, including a deferred switch.
    fn target(&self) -> (DevicePosition, CaptureMode) {
        self.deferred.unwrap_or((self.position, self.mode))
    }

    fn request_switch(&mut self, position: DevicePosition, mode: CaptureMode) -> Result<(), CaptureError> {
        match self.phase {
            SessionPhase::Denied => Err(CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: self.camera_permission,
            }),
            SessionPhase::Configuring => Err(CaptureError::InvalidState(
                "configuration in progress".into(),
            )),
            SessionPhase::Capturing { .. } => match self.config.switch_policy {
                SwitchPolicy::Reject => Err(CaptureError::CaptureInProgress),
                SwitchPolicy::Defer => {
                    if (position, mode) == (self.position, self.mode) {
                        self.deferred = None;
                    } else {
                        log::debug!("deferring switch to {:?}/{:?} until capture completes", position, mode);
                        self.deferred = Some((position, mode));
                    }
                    self.publish();
                    Ok(())
                }
            },
            SessionPhase::Unpermitted => {
                self.position = position;
                self.mode = mode;
                self.publish();
                Ok(())
            }
            SessionPhase::Idle { .. } | SessionPhase::Ready { .. } => {
                if (position, mode) == (self.position, self.mode) {
                    return Ok(());
                }
                log::info!("switching to {:?} camera in {:?} mode", position, mode);
                self.position = position;
                self.mode = mode;
                self.configure_devices().map(|_| ())
            }
        }
    }

    /// Start the configured session. Idle → Ready.
    pub fn start_running(&mut self) -> Result<(), CaptureError> {
        match self.phase {
            SessionPhase::Idle { mode } => {
                self.backend.start_running();
                self.set_phase(SessionPhase::Ready { mode });
                Ok(())
            }
            SessionPhase::Ready { .. } => Ok(()),
            other => Err(CaptureError::InvalidState(format!(
                "cannot start running while {:?}",
                other
            ))),
        }
    }

    /// Stop the session without tearing down its configuration. Ready → Idle.
    pub fn stop_running(&mut self) -> Result<(), CaptureError> {
        match self.phase {
            SessionPhase::Ready { mode } => {
                self.backend.stop_running();
                self.set_phase(SessionPhase::Idle { mode });
                Ok(())
            }
            SessionPhase::Idle { .. } => Ok(()),
            SessionPhase::Capturing { .. } => Err(CaptureError::CaptureInProgress),
            other => Err(CaptureError::InvalidState(format!(
                "cannot stop running while {:?}",
                other
            ))),
        }
    }

    /// Take a still. Requires Ready(photo). The result arrives through the
    /// delegate once the completion has been processed.
    pub fn capture_photo(&mut self) -> Result<CaptureId, CaptureError> {
        self.ensure_ready_for(CaptureMode::Photo)?;
        let sink = match &self.output {
            Some(OutputSink::Photo(sink)) => sink.clone(),
            _ => return Err(CaptureError::InvalidState("no photo output attached".into())),
        };

        let capture_id = CaptureId::new();
        let sender = self.event_sender();
        self.backend.capture_photo(
            &sink,
            Box::new(move |result| {
                sender.photo_finished(capture_id, result);
            }),
        )?;

        log::debug!("photo capture {} started", capture_id);
        self.in_flight = Some(InFlight::Photo { capture_id });
        self.set_phase(SessionPhase::Capturing {
            mode: CaptureMode::Photo,
            capture_id,
        });
        Ok(capture_id)
    }

    /// Start recording a movie to `path`. Requires Ready(video).
    pub fn start_recording(&mut self, path: impl AsRef<Path>) -> Result<CaptureId, CaptureError> {
        self.ensure_ready_for(CaptureMode::Video)?;
        let sink = match &self.output {
            Some(OutputSink::MovieFile(sink)) => sink.clone(),
            _ => return Err(CaptureError::InvalidState("no movie output attached".into())),
        };

        let capture_id = CaptureId::new();
        let sender = self.event_sender();
        self.backend.start_recording(
            &sink,
            path.as_ref(),
            Box::new(move |result| {
                sender.movie_finished(capture_id, result);
            }),
        )?;

        log::info!("recording {} started: {}", capture_id, path.as_ref().display());
        self.in_flight = Some(InFlight::Movie {
            capture_id,
            sink,
            stop_requested: false,
        });
        self.set_phase(SessionPhase::Capturing {
            mode: CaptureMode::Video,
            capture_id,
        });
        Ok(capture_id)
    }

    /// Ask the backend to finish the active recording. The movie is
    /// delivered when its completion is processed.
    pub fn stop_recording(&mut self) -> Result<(), CaptureError> {
        match self.in_flight {
            Some(InFlight::Movie {
                ref sink,
                ref mut stop_requested,
                ..
            }) => {
                if *stop_requested {
                    return Ok(());
                }
                self.backend.stop_recording(sink)?;
                *stop_requested = true;
                Ok(())
            }
            _ => Err(CaptureError::InvalidState("no recording in progress".into())),
        }
    }

    fn ensure_ready_for(&self, wanted: CaptureMode) -> Result<(), CaptureError> {
        match self.phase {
            SessionPhase::Ready { mode } if mode == wanted => {}
            SessionPhase::Capturing { .. } => return Err(CaptureError::CaptureInProgress),
            other => {
                return Err(CaptureError::InvalidState(format!(
                    "cannot capture in {:?} mode while {:?}",
                    wanted, other
                )))
            }
        }
        if self.input.is_none() {
            return Err(CaptureError::InvalidState("no camera input attached".into()));
        }
        Ok(())
    }

    /// Bind a host preview surface to this session.
    pub fn bind_preview(&self, surface: &dyn PreviewSurface, frame: PreviewFrame) {
        log::debug!(
            "binding preview {}x{} to session {}",
            frame.width,
            frame.height,
            self.handle
        );
        surface.attach(self.handle, frame, self.config.preview_gravity);
    }

    // --- Event processing ---

    /// Apply every queued event without blocking. Returns how many were applied.
    pub fn process_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Block up to `timeout` for an event, then drain the queue.
    /// Returns false if nothing arrived.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                self.process_events();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::PermissionResolved { kind, granted } => {
                self.pending_requests.remove(&kind);
                if kind == MediaKind::Video && self.camera_permission.is_refused() {
                    log::debug!("ignoring camera permission result after denial");
                    return;
                }
                let state = PermissionState::from_grant(granted);
                if granted {
                    self.permission_granted(kind);
                } else {
                    self.permission_refused(kind, state);
                }
            }
            ControllerEvent::PhotoFinished { capture_id, result } => {
                if !self.take_in_flight(capture_id, CaptureMode::Photo) {
                    return;
                }
                match result {
                    Ok(data) => {
                        log::debug!("photo capture {} finished ({} bytes)", capture_id, data.len());
                        let photo = CapturedPhoto {
                            capture_id,
                            position: self.position,
                            data,
                            captured_at: chrono::Utc::now(),
                        };
                        if let Some(ref delegate) = self.delegate {
                            delegate.on_photo_captured(&photo);
                        }
                    }
                    Err(e) => self.report_error(e),
                }
                self.finish_capture();
            }
            ControllerEvent::MovieFinished { capture_id, result } => {
                if !self.take_in_flight(capture_id, CaptureMode::Video) {
                    return;
                }
                match result {
                    Ok(file_path) => {
                        log::info!("recording {} finished: {}", capture_id, file_path.display());
                        self.deliver_movie(capture_id, file_path);
                    }
                    Err(e) => self.report_error(e),
                }
                self.finish_capture();
            }
        }
    }

    /// Clear the in-flight capture if `capture_id` names it. Completions
    /// for anything else are stale or duplicated and are dropped.
    fn take_in_flight(&mut self, capture_id: CaptureId, mode: CaptureMode) -> bool {
        let matches = match &self.in_flight {
            Some(InFlight::Photo { capture_id: id }) => mode == CaptureMode::Photo && *id == capture_id,
            Some(InFlight::Movie { capture_id: id, .. }) => mode == CaptureMode::Video && *id == capture_id,
            None => false,
        };
        if !matches {
            log::warn!("dropping completion: {}", CaptureError::UnknownCapture(capture_id));
            return false;
        }
        self.in_flight = None;
        true
    }

    fn deliver_movie(&self, capture_id: CaptureId, file_path: PathBuf) {
        let movie = RecordedMovie {
            capture_id,
            position: self.position,
            file_path,
            finished_at: chrono::Utc::now(),
        };
        if let Some(ref delegate) = self.delegate {
            delegate.on_movie_recorded(&movie);
        }
    }

    /// Return to Ready/Idle after a capture and apply any deferred switch.
    fn finish_capture(&mut self) {
        let deferred = self.deferred.take();
        let mode = self.mode;
        self.set_phase(if self.backend.is_running() {
            SessionPhase::Ready { mode }
        } else {
            SessionPhase::Idle { mode }
        });

        if let Some((position, mode)) = deferred {
            if let Err(e) = self.request_switch(position, mode) {
                log::error!("deferred switch failed: {}", e);
            }
        }
    }

    // --- Internal helpers ---

    fn report_error(&self, error: CaptureError) {
        log::error!("{}", error);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.publish();
    }

    fn build_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.handle,
            phase: self.phase,
            position: self.position,
            mode: self.mode,
            camera_permission: self.camera_permission,
            microphone_permission: self.microphone_permission,
            running: self.backend.is_running(),
            input_device: self.input.as_ref().map(|i| i.device.id.clone()),
            output: self.output.as_ref().map(OutputSink::mode),
            switch_deferred: self.deferred.is_some(),
        }
    }

    /// Publish the current state if it changed.
    fn publish(&self) {
        let snapshot = self.build_snapshot();
        {
            let mut published = self.published.lock();
            if *published == snapshot {
                return;
            }
            *published = snapshot.clone();
        }
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessCaptureControl, HeadlessDevices, HeadlessPermissions, HeadlessSession};
    use crate::models::media::DeviceType;
    use crate::models::preview::VideoGravity;
    use std::thread;

    type Controller = CaptureSessionController<HeadlessSession, HeadlessDevices, HeadlessPermissions>;

    #[derive(Default)]
    struct RecordingDelegate {
        states: Mutex<Vec<SessionSnapshot>>,
        denials: Mutex<Vec<(MediaKind, PermissionState)>>,
        errors: Mutex<Vec<CaptureError>>,
        photos: Mutex<Vec<CapturedPhoto>>,
        movies: Mutex<Vec<RecordedMovie>>,
    }

    impl CaptureDelegate for RecordingDelegate {
        fn on_state_changed(&self, snapshot: &SessionSnapshot) {
            self.states.lock().push(snapshot.clone());
        }

        fn on_permission_denied(&self, kind: MediaKind, state: PermissionState) {
            self.denials.lock().push((kind, state));
        }

        fn on_error(&self, error: &CaptureError) {
            self.errors.lock().push(error.clone());
        }

        fn on_photo_captured(&self, photo: &CapturedPhoto) {
            self.photos.lock().push(photo.clone());
        }

        fn on_movie_recorded(&self, movie: &RecordedMovie) {
            self.movies.lock().push(movie.clone());
        }
    }

    struct Harness {
        controller: Controller,
        control: HeadlessCaptureControl,
        devices: HeadlessDevices,
        permissions: HeadlessPermissions,
        delegate: Arc<RecordingDelegate>,
    }

    fn harness_with(
        session: HeadlessSession,
        devices: HeadlessDevices,
        permissions: HeadlessPermissions,
        config: SessionConfiguration,
    ) -> Harness {
        let control = session.control();
        let delegate = Arc::new(RecordingDelegate::default());
        let mut controller =
            CaptureSessionController::new(session, devices.clone(), permissions.clone(), config).unwrap();
        controller.set_delegate(delegate.clone());
        Harness {
            controller,
            control,
            devices,
            permissions,
            delegate,
        }
    }

    fn harness(permissions: HeadlessPermissions) -> Harness {
        harness_with(
            HeadlessSession::new(),
            HeadlessDevices::front_and_back(),
            permissions,
            SessionConfiguration::default(),
        )
    }

    /// Authorized and configured, Ready(photo) on the front camera.
    fn ready(config: SessionConfiguration) -> Harness {
        let mut h = harness_with(
            HeadlessSession::new(),
            HeadlessDevices::front_and_back(),
            HeadlessPermissions::granted(),
            config,
        );
        h.controller.activate().unwrap();
        assert!(h.controller.phase().is_ready());
        h
    }

    fn assert_single_output(control: &HeadlessCaptureControl, mode: CaptureMode) {
        let outputs = control.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].mode(), mode);
    }

    // --- Permissions ---

    #[test]
    fn grant_after_prompt_configures_exactly_once() {
        let mut h = harness(HeadlessPermissions::new());

        h.controller.check_permissions(MediaKind::Video).unwrap();
        assert_eq!(h.permissions.request_count(MediaKind::Video), 1);
        assert_eq!(h.controller.phase(), SessionPhase::Unpermitted);
        assert_eq!(h.control.transactions(), 0);

        assert!(h.permissions.resolve(MediaKind::Video, true));
        // Nothing changes until the owner drains the queue.
        assert_eq!(h.control.transactions(), 0);
        assert_eq!(h.controller.process_events(), 1);

        assert_eq!(h.control.transactions(), 1);
        assert_eq!(h.controller.snapshot().camera_permission, PermissionState::Authorized);
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Photo });
        assert_eq!(h.control.inputs().len(), 1);
        assert_single_output(&h.control, CaptureMode::Photo);
    }

    #[test]
    fn authorized_configures_immediately() {
        let mut h = harness(HeadlessPermissions::granted());
        h.controller.check_permissions(MediaKind::Video).unwrap();

        assert_eq!(h.permissions.request_count(MediaKind::Video), 0);
        assert_eq!(h.control.transactions(), 1);
        assert!(h.control.is_running());
    }

    #[test]
    fn denied_never_configures() {
        let permissions = HeadlessPermissions::new();
        permissions.set_status(MediaKind::Video, PermissionState::Denied);
        let mut h = harness(permissions);

        let err = h.controller.check_permissions(MediaKind::Video).unwrap_err();
        assert_eq!(
            err,
            CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: PermissionState::Denied
            }
        );
        assert_eq!(h.controller.phase(), SessionPhase::Denied);
        assert_eq!(*h.delegate.denials.lock(), vec![(MediaKind::Video, PermissionState::Denied)]);

        assert!(h.controller.configure_devices().unwrap_err().is_permission());
        assert!(h.controller.switch_camera().unwrap_err().is_permission());
        assert!(h.controller.switch_mode().unwrap_err().is_permission());
        assert_eq!(h.control.transactions(), 0);
        assert!(h.control.inputs().is_empty());
    }

    #[test]
    fn denial_is_terminal() {
        let permissions = HeadlessPermissions::new();
        permissions.set_status(MediaKind::Video, PermissionState::Restricted);
        let mut h = harness(permissions);

        assert!(h.controller.check_permissions(MediaKind::Video).is_err());

        // Even if the OS later reports authorization, the controller does not re-check.
        h.permissions.set_status(MediaKind::Video, PermissionState::Authorized);
        let err = h.controller.check_permissions(MediaKind::Video).unwrap_err();
        assert_eq!(
            err,
            CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: PermissionState::Restricted
            }
        );
        assert_eq!(h.control.transactions(), 0);
        assert_eq!(h.delegate.denials.lock().len(), 1);
    }

    #[test]
    fn refused_prompt_moves_to_denied() {
        let permissions = HeadlessPermissions::new();
        permissions.answer_prompts(MediaKind::Video, false);
        let mut h = harness(permissions);

        h.controller.check_permissions(MediaKind::Video).unwrap();
        h.controller.process_events();

        assert_eq!(h.controller.phase(), SessionPhase::Denied);
        assert_eq!(h.control.transactions(), 0);
        assert_eq!(*h.delegate.denials.lock(), vec![(MediaKind::Video, PermissionState::Denied)]);
    }

    #[test]
    fn pending_request_is_not_repeated() {
        let mut h = harness(HeadlessPermissions::new());

        h.controller.check_permissions(MediaKind::Video).unwrap();
        h.controller.check_permissions(MediaKind::Video).unwrap();
        assert_eq!(h.permissions.request_count(MediaKind::Video), 1);

        h.permissions.resolve(MediaKind::Video, true);
        h.controller.process_events();
        assert_eq!(h.control.transactions(), 1);
    }

    #[test]
    fn permission_resolved_on_another_thread() {
        let mut h = harness(HeadlessPermissions::new());
        h.controller.check_permissions(MediaKind::Video).unwrap();

        let remote = h.permissions.clone();
        let worker = thread::spawn(move || {
            assert!(remote.resolve(MediaKind::Video, true));
        });

        assert!(h.controller.wait_for_event(Duration::from_secs(5)));
        worker.join().unwrap();
        assert!(h.controller.phase().is_ready());
        assert!(!h.controller.wait_for_event(Duration::from_millis(10)));
    }

    #[test]
    fn audio_permission_does_not_configure() {
        let permissions = HeadlessPermissions::new();
        permissions.set_status(MediaKind::Audio, PermissionState::Authorized);
        let mut h = harness(permissions);

        h.controller.check_permissions(MediaKind::Audio).unwrap();

        assert_eq!(h.control.transactions(), 0);
        assert_eq!(h.controller.phase(), SessionPhase::Unpermitted);
        assert_eq!(h.controller.snapshot().microphone_permission, PermissionState::Authorized);
    }

    #[test]
    fn activate_survives_audio_denial() {
        let permissions = HeadlessPermissions::new();
        permissions.set_status(MediaKind::Video, PermissionState::Authorized);
        permissions.set_status(MediaKind::Audio, PermissionState::Denied);
        let mut h = harness_with(
            HeadlessSession::new(),
            HeadlessDevices::front_and_back(),
            permissions,
            SessionConfiguration {
                required_media: vec![MediaKind::Audio, MediaKind::Video],
                ..Default::default()
            },
        );

        h.controller.activate().unwrap();

        assert!(h.controller.phase().is_ready());
        assert_eq!(*h.delegate.denials.lock(), vec![(MediaKind::Audio, PermissionState::Denied)]);
    }

    #[test]
    fn revoked_camera_releases_session() {
        let mut h = ready(SessionConfiguration::default());

        h.permissions.set_status(MediaKind::Video, PermissionState::Denied);
        assert!(h.controller.check_permissions(MediaKind::Video).is_err());

        assert_eq!(h.controller.phase(), SessionPhase::Denied);
        assert!(h.control.inputs().is_empty());
        assert!(h.control.outputs().is_empty());
        assert!(!h.control.is_running());
    }

    #[test]
    fn revocation_fails_pending_photo_once() {
        let mut h = ready(SessionConfiguration::default());
        h.controller.capture_photo().unwrap();

        h.permissions.set_status(MediaKind::Video, PermissionState::Denied);
        assert!(h.controller.check_permissions(MediaKind::Video).is_err());

        assert_eq!(h.controller.phase(), SessionPhase::Denied);
        assert_eq!(
            *h.delegate.errors.lock(),
            vec![CaptureError::CaptureFailed("camera access revoked".into())]
        );

        // The backend still answers the parked capture; it must not surface.
        assert!(h.control.finish_photo(Ok(vec![0xFF, 0xD8])));
        h.controller.process_events();

        assert!(h.delegate.photos.lock().is_empty());
        assert_eq!(h.delegate.errors.lock().len(), 1);
    }

    #[test]
    fn revocation_stops_recording_and_fails_it_once() {
        let mut h = ready(SessionConfiguration {
            initial_mode: CaptureMode::Video,
            ..Default::default()
        });
        h.controller.start_recording("/tmp/clip.mov").unwrap();

        h.permissions.set_status(MediaKind::Video, PermissionState::Denied);
        assert!(h.controller.check_permissions(MediaKind::Video).is_err());

        assert!(!h.control.is_recording());
        assert!(!h.control.interrupt_recording(CaptureError::CaptureFailed("late".into())));
        h.controller.process_events();

        assert!(h.delegate.movies.lock().is_empty());
        assert_eq!(
            *h.delegate.errors.lock(),
            vec![CaptureError::CaptureFailed("camera access revoked".into())]
        );
        assert_eq!(h.controller.phase(), SessionPhase::Denied);
    }

    // --- Configuration ---

    #[test]
    fn configure_requires_authorization() {
        let mut h = harness(HeadlessPermissions::new());
        let err = h.controller.configure_devices().unwrap_err();
        assert_eq!(
            err,
            CaptureError::PermissionDenied {
                kind: MediaKind::Video,
                state: PermissionState::Undetermined
            }
        );
        assert_eq!(h.control.transactions(), 0);
    }

    #[test]
    fn switch_camera_keeps_single_input() {
        let mut h = ready(SessionConfiguration::default());

        for expected in [DevicePosition::Back, DevicePosition::Front, DevicePosition::Back] {
            h.controller.switch_camera().unwrap();
            let inputs = h.control.inputs();
            assert_eq!(inputs.len(), 1);
            assert_eq!(inputs[0].device.position, expected);
            assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Photo });
        }
        assert_eq!(h.control.transactions(), 4);
        assert!(!h.control.in_transaction());
    }

    #[test]
    fn mode_round_trip_restores_photo_sink() {
        let mut h = ready(SessionConfiguration::default());
        let original = h.control.outputs()[0].id();

        h.controller.switch_mode().unwrap();
        assert_single_output(&h.control, CaptureMode::Video);
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Video });

        h.controller.switch_mode().unwrap();
        assert_single_output(&h.control, CaptureMode::Photo);
        // Same sink type, fresh sink.
        assert_ne!(h.control.outputs()[0].id(), original);
        assert_eq!(h.control.inputs().len(), 1);
    }

    #[test]
    fn setting_current_value_is_a_no_op() {
        let mut h = ready(SessionConfiguration::default());

        h.controller.set_mode(CaptureMode::Photo).unwrap();
        h.controller.set_position(DevicePosition::Front).unwrap();

        assert_eq!(h.control.transactions(), 1);
    }

    #[test]
    fn missing_device_fails_soft() {
        let front_only = HeadlessDevices::front_and_back();
        front_only.disconnect("headless-back");
        let mut h = harness_with(
            HeadlessSession::new(),
            front_only,
            HeadlessPermissions::granted(),
            SessionConfiguration::default(),
        );
        h.controller.activate().unwrap();

        h.controller.switch_camera().unwrap();

        assert!(h.control.inputs().is_empty());
        assert_single_output(&h.control, CaptureMode::Photo);
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Photo });
        assert_eq!(
            *h.delegate.errors.lock(),
            vec![CaptureError::DeviceNotFound {
                position: DevicePosition::Back
            }]
        );
        assert_eq!(h.controller.snapshot().input_device, None);
        assert!(matches!(
            h.controller.capture_photo(),
            Err(CaptureError::InvalidState(_))
        ));
    }

    #[test]
    fn report_allows_retry_after_hot_plug() {
        let mut h = harness_with(
            HeadlessSession::new(),
            HeadlessDevices::default(),
            HeadlessPermissions::granted(),
            SessionConfiguration::default(),
        );
        h.controller.activate().unwrap();
        assert!(h.control.inputs().is_empty());

        h.devices.connect(CameraDevice {
            id: "usb-front".into(),
            name: "USB Camera".into(),
            position: DevicePosition::Front,
            device_type: DeviceType::BuiltInWideAngle,
        });

        let report = h.controller.configure_devices().unwrap();
        assert!(report.is_complete());
        assert_eq!(report.input.unwrap().device.id, "usb-front");
        assert_eq!(h.control.inputs().len(), 1);
    }

    #[test]
    fn busy_device_reports_input_construction_error() {
        let mut h = ready(SessionConfiguration::default());
        h.devices.set_busy("headless-back", true);

        h.controller.switch_camera().unwrap();

        assert!(h.control.inputs().is_empty());
        assert!(matches!(
            h.delegate.errors.lock().as_slice(),
            [CaptureError::InputConstruction(_)]
        ));
    }

    #[test]
    fn capability_checks_are_respected() {
        let mut h = harness_with(
            HeadlessSession::new().with_input_capacity(0).with_output_capacity(0),
            HeadlessDevices::front_and_back(),
            HeadlessPermissions::granted(),
            SessionConfiguration::default(),
        );
        h.controller.activate().unwrap();

        let report = h.controller.configure_devices().unwrap();
        assert_eq!(report.input, Err(CaptureError::InputRejected));
        assert_eq!(report.output, Err(CaptureError::OutputRejected(CaptureMode::Photo)));
        assert!(h.control.inputs().is_empty());
        assert!(h.control.outputs().is_empty());
        assert_eq!(h.control.transactions(), 2);
    }

    #[test]
    fn intents_before_permission_shape_first_configuration() {
        let mut h = harness(HeadlessPermissions::new());

        h.controller.switch_camera().unwrap();
        h.controller.set_mode(CaptureMode::Video).unwrap();
        assert_eq!(h.control.transactions(), 0);

        h.controller.check_permissions(MediaKind::Video).unwrap();
        h.permissions.resolve(MediaKind::Video, true);
        h.controller.process_events();

        assert_eq!(h.control.inputs()[0].device.position, DevicePosition::Back);
        assert_single_output(&h.control, CaptureMode::Video);
        assert_eq!(h.control.transactions(), 1);
    }

    // --- Running ---

    #[test]
    fn stop_and_start_running() {
        let mut h = ready(SessionConfiguration::default());

        h.controller.stop_running().unwrap();
        assert_eq!(h.controller.phase(), SessionPhase::Idle { mode: CaptureMode::Photo });
        assert!(!h.control.is_running());
        assert!(h.controller.capture_photo().is_err());

        // Switching while idle reconfigures but stays idle.
        h.controller.switch_camera().unwrap();
        assert_eq!(h.controller.phase(), SessionPhase::Idle { mode: CaptureMode::Photo });

        h.controller.start_running().unwrap();
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Photo });
        assert!(h.control.is_running());
    }

    #[test]
    fn without_auto_start_session_is_idle() {
        let mut h = harness_with(
            HeadlessSession::new(),
            HeadlessDevices::front_and_back(),
            HeadlessPermissions::granted(),
            SessionConfiguration {
                auto_start_running: false,
                ..Default::default()
            },
        );
        h.controller.activate().unwrap();

        assert_eq!(h.controller.phase(), SessionPhase::Idle { mode: CaptureMode::Photo });
        assert!(!h.controller.snapshot().running);
    }

    #[test]
    fn running_requires_configuration() {
        let mut h = harness(HeadlessPermissions::new());
        assert!(matches!(
            h.controller.start_running(),
            Err(CaptureError::InvalidState(_))
        ));
    }

    // --- Capture ---

    #[test]
    fn photo_capture_delivers_payload() {
        let mut h = ready(SessionConfiguration::default());

        let capture_id = h.controller.capture_photo().unwrap();
        assert!(h.controller.phase().is_capturing());

        assert!(h.control.finish_photo(Ok(vec![0xFF, 0xD8, 0xFF])));
        h.controller.process_events();

        let photos = h.delegate.photos.lock();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].capture_id, capture_id);
        assert_eq!(photos[0].data, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(photos[0].position, DevicePosition::Front);
        assert!(h.delegate.errors.lock().is_empty());
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Photo });
    }

    #[test]
    fn photo_error_skips_output_processing() {
        let mut h = ready(SessionConfiguration::default());
        h.controller.capture_photo().unwrap();

        h.control
            .finish_photo(Err(CaptureError::CaptureFailed("sensor timeout".into())));
        h.controller.process_events();

        assert!(h.delegate.photos.lock().is_empty());
        assert_eq!(
            *h.delegate.errors.lock(),
            vec![CaptureError::CaptureFailed("sensor timeout".into())]
        );
        assert!(h.controller.phase().is_ready());
    }

    #[test]
    fn synchronous_completion_is_still_marshaled() {
        let mut h = harness_with(
            HeadlessSession::new().with_auto_photo(vec![1, 2, 3]),
            HeadlessDevices::front_and_back(),
            HeadlessPermissions::granted(),
            SessionConfiguration::default(),
        );
        h.controller.activate().unwrap();

        h.controller.capture_photo().unwrap();
        assert!(h.controller.phase().is_capturing());
        assert!(h.delegate.photos.lock().is_empty());

        h.controller.process_events();
        assert_eq!(h.delegate.photos.lock().len(), 1);
    }

    #[test]
    fn stale_completions_are_ignored() {
        let mut h = ready(SessionConfiguration::default());
        let sender = h.controller.event_sender();

        sender.photo_finished(CaptureId::new(), Ok(vec![9]));
        h.controller.process_events();
        assert!(h.delegate.photos.lock().is_empty());

        let capture_id = h.controller.capture_photo().unwrap();
        sender.photo_finished(capture_id, Ok(vec![1]));
        sender.photo_finished(capture_id, Ok(vec![2]));
        // Wrong kind for the in-flight capture.
        sender.movie_finished(capture_id, Ok(PathBuf::from("/tmp/x.mov")));
        h.controller.process_events();

        let photos = h.delegate.photos.lock();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].data, vec![1]);
        assert!(h.delegate.movies.lock().is_empty());
    }

    #[test]
    fn second_capture_while_busy_is_rejected() {
        let mut h = ready(SessionConfiguration::default());
        h.controller.capture_photo().unwrap();
        assert_eq!(h.controller.capture_photo(), Err(CaptureError::CaptureInProgress));
        assert_eq!(h.controller.stop_running(), Err(CaptureError::CaptureInProgress));
    }

    #[test]
    fn capture_requires_matching_mode() {
        let mut h = ready(SessionConfiguration::default());
        assert!(matches!(
            h.controller.start_recording("/tmp/clip.mov"),
            Err(CaptureError::InvalidState(_))
        ));

        h.controller.switch_mode().unwrap();
        assert!(matches!(
            h.controller.capture_photo(),
            Err(CaptureError::InvalidState(_))
        ));
    }

    #[test]
    fn recording_round_trip() {
        let mut h = ready(SessionConfiguration {
            initial_mode: CaptureMode::Video,
            max_movie_duration_secs: Some(30.0),
            ..Default::default()
        });
        match &h.control.outputs()[0] {
            OutputSink::MovieFile(sink) => assert_eq!(sink.max_duration_secs, Some(30.0)),
            other => panic!("expected movie sink, got {:?}", other),
        }

        let capture_id = h.controller.start_recording("/tmp/clip.mov").unwrap();
        assert!(h.control.is_recording());

        h.controller.stop_recording().unwrap();
        // A second stop before the completion lands is harmless.
        h.controller.stop_recording().unwrap();
        h.controller.process_events();

        let movies = h.delegate.movies.lock();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].capture_id, capture_id);
        assert_eq!(movies[0].file_path, PathBuf::from("/tmp/clip.mov"));
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Video });
        assert!(matches!(
            h.controller.stop_recording(),
            Err(CaptureError::InvalidState(_))
        ));
    }

    #[test]
    fn interrupted_recording_reports_error() {
        let mut h = ready(SessionConfiguration {
            initial_mode: CaptureMode::Video,
            ..Default::default()
        });
        h.controller.start_recording("/tmp/clip.mov").unwrap();

        h.control
            .interrupt_recording(CaptureError::CaptureFailed("camera disconnected".into()));
        h.controller.process_events();

        assert!(h.delegate.movies.lock().is_empty());
        assert_eq!(h.delegate.errors.lock().len(), 1);
        assert!(h.controller.phase().is_ready());
    }

    // --- Mid-capture switching ---

    #[test]
    fn switch_during_capture_is_rejected_by_default() {
        let mut h = ready(SessionConfiguration::default());
        h.controller.capture_photo().unwrap();

        assert_eq!(h.controller.switch_camera(), Err(CaptureError::CaptureInProgress));
        assert_eq!(h.controller.switch_mode(), Err(CaptureError::CaptureInProgress));
        assert_eq!(h.controller.configure_devices(), Err(CaptureError::CaptureInProgress));
        assert_eq!(h.control.transactions(), 1);

        h.control.finish_photo(Ok(vec![1]));
        h.controller.process_events();
        assert_eq!(h.controller.position(), DevicePosition::Front);
    }

    #[test]
    fn deferred_switch_applies_after_completion() {
        let mut h = ready(SessionConfiguration {
            switch_policy: SwitchPolicy::Defer,
            ..Default::default()
        });
        let capture_id = h.controller.capture_photo().unwrap();

        h.controller.switch_camera().unwrap();
        h.controller.switch_mode().unwrap();
        assert!(h.controller.snapshot().switch_deferred);
        assert_eq!(h.control.transactions(), 1);
        assert_eq!(
            h.controller.phase(),
            SessionPhase::Capturing {
                mode: CaptureMode::Photo,
                capture_id
            }
        );

        h.control.finish_photo(Ok(vec![1]));
        h.controller.process_events();

        // The photo is attributed to the camera that took it.
        assert_eq!(h.delegate.photos.lock()[0].position, DevicePosition::Front);
        // Both deferred intents land in a single reconfiguration.
        assert_eq!(h.control.transactions(), 2);
        assert_eq!(h.controller.position(), DevicePosition::Back);
        assert_eq!(h.controller.phase(), SessionPhase::Ready { mode: CaptureMode::Video });
        assert_single_output(&h.control, CaptureMode::Video);
        assert!(!h.controller.snapshot().switch_deferred);
    }

    #[test]
    fn deferred_switch_back_to_current_cancels() {
        let mut h = ready(SessionConfiguration {
            switch_policy: SwitchPolicy::Defer,
            ..Default::default()
        });
        h.controller.capture_photo().unwrap();

        h.controller.switch_camera().unwrap();
        h.controller.switch_camera().unwrap();
        assert!(!h.controller.snapshot().switch_deferred);

        h.control.finish_photo(Ok(vec![1]));
        h.controller.process_events();
        assert_eq!(h.control.transactions(), 1);
    }

    // --- Observation ---

    #[test]
    fn snapshot_reader_tracks_state() {
        let mut h = harness(HeadlessPermissions::granted());
        let reader = h.controller.snapshot_reader();
        assert_eq!(reader.get().phase, SessionPhase::Unpermitted);

        h.controller.activate().unwrap();
        let snapshot = thread::spawn(move || reader.get()).join().unwrap();

        assert_eq!(snapshot, h.controller.snapshot());
        assert_eq!(snapshot.input_device.as_deref(), Some("headless-front"));
        assert_eq!(snapshot.output, Some(CaptureMode::Photo));
        assert!(snapshot.running);
    }

    #[test]
    fn delegate_sees_configuring_then_ready() {
        let h = ready(SessionConfiguration::default());
        let phases: Vec<SessionPhase> = h.delegate.states.lock().iter().map(|s| s.phase).collect();

        assert!(phases.contains(&SessionPhase::Configuring));
        assert_eq!(phases.last(), Some(&SessionPhase::Ready { mode: CaptureMode::Photo }));
        // Unchanged state is not re-broadcast.
        assert!(h.delegate.states.lock().windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn preview_binds_session_handle() {
        struct SpySurface(Mutex<Option<(SessionHandle, PreviewFrame, VideoGravity)>>);

        impl PreviewSurface for SpySurface {
            fn attach(&self, session: SessionHandle, frame: PreviewFrame, gravity: VideoGravity) {
                *self.0.lock() = Some((session, frame, gravity));
            }
        }

        let h = harness(HeadlessPermissions::new());
        let surface = SpySurface(Mutex::new(None));
        let frame = PreviewFrame::new(390.0, 844.0);

        h.controller.bind_preview(&surface, frame);

        assert_eq!(
            *surface.0.lock(),
            Some((h.controller.handle(), frame, VideoGravity::ResizeAspectFill))
        );
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let result = CaptureSessionController::new(
            HeadlessSession::new(),
            HeadlessDevices::default(),
            HeadlessPermissions::new(),
            SessionConfiguration {
                required_media: Vec::new(),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
    }
}
