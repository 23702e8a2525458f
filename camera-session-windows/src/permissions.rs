//! Windows camera and microphone privacy checks.
//!
//! Camera and microphone access are controlled by Settings > Privacy.
//! Unpackaged desktop apps get no per-app consent dialog, so a request
//! cannot prompt: it re-checks and reports what the settings allow.

use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use camera_session_core::models::media::MediaKind;
use camera_session_core::models::permission::PermissionState;
use camera_session_core::traits::permission_provider::{PermissionCallback, PermissionProvider};

use crate::media_foundation::{MediaFoundation, ProbeResult};

/// `PermissionProvider` for the Windows privacy settings.
#[derive(Debug, Default)]
pub struct WindowsCameraPermissions;

impl WindowsCameraPermissions {
    pub fn new() -> Self {
        Self
    }
}

impl PermissionProvider for WindowsCameraPermissions {
    fn authorization_status(&self, kind: MediaKind) -> PermissionState {
        match kind {
            MediaKind::Video => check_camera_permission(),
            MediaKind::Audio => check_microphone_permission(),
        }
    }

    fn request_access(&self, kind: MediaKind, completion: PermissionCallback) {
        let state = self.authorization_status(kind);
        log::debug!("{:?} access re-checked: {:?}", kind, state);
        completion(state.is_authorized());
    }
}

/// Try to open the first video capture source.
///
/// With no camera attached there is nothing to deny; the state is reported
/// as authorized and device resolution fails later instead.
fn check_camera_permission() -> PermissionState {
    let mf = match MediaFoundation::startup() {
        Ok(mf) => mf,
        Err(e) => {
            log::warn!("cannot check camera permission: {}", e);
            return PermissionState::Undetermined;
        }
    };
    let devices = match mf.video_devices() {
        Ok(devices) => devices,
        Err(e) => {
            log::warn!("cannot enumerate cameras for permission check: {}", e);
            return PermissionState::Undetermined;
        }
    };
    let Some(first) = devices.first() else {
        return PermissionState::Authorized;
    };

    match mf.probe(&first.symbolic_link) {
        ProbeResult::Opened => PermissionState::Authorized,
        ProbeResult::AccessDenied => PermissionState::Denied,
        ProbeResult::Failed(reason) => {
            // In use by another app, driver error, ... not a privacy decision.
            log::warn!("unexpected error checking camera permission: {}", reason);
            PermissionState::Authorized
        }
    }
}

/// Try to activate an audio client on the default capture endpoint.
fn check_microphone_permission() -> PermissionState {
    unsafe {
        let com_initialized = CoInitializeEx(None, COINIT_MULTITHREADED).is_ok();
        let state = check_mic_access_inner();
        if com_initialized {
            CoUninitialize();
        }
        state
    }
}

unsafe fn check_mic_access_inner() -> PermissionState {
    let enumerator: IMMDeviceEnumerator = match CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("failed to create audio enumerator: {}", e);
            return PermissionState::Undetermined;
        }
    };

    let device = match enumerator.GetDefaultAudioEndpoint(eCapture, eConsole) {
        Ok(d) => d,
        Err(_) => return PermissionState::Authorized, // No capture device
    };

    let result: windows::core::Result<IAudioClient> = device.Activate(CLSCTX_ALL, None);
    match result {
        Ok(_) => PermissionState::Authorized,
        Err(e) if e.code() == E_ACCESSDENIED => PermissionState::Denied,
        Err(e) => {
            log::warn!("unexpected error checking microphone permission: {}", e);
            PermissionState::Authorized
        }
    }
}
