//! Media Foundation plumbing: COM/MF lifetime and video capture source
//! enumeration.

use windows::core::{HSTRING, PCWSTR, PWSTR};
use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::MediaFoundation::*;
use windows::Win32::System::Com::*;

use camera_session_core::models::error::CaptureError;

use crate::descriptor::VideoDeviceDescriptor;

/// Outcome of opening a capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProbeResult {
    Opened,
    AccessDenied,
    Failed(String),
}

/// COM + Media Foundation initialized for the current scope.
///
/// COM is only uninitialized if this scope initialized it, so nesting on a
/// thread that already entered an apartment is harmless.
pub(crate) struct MediaFoundation {
    com_initialized: bool,
}

impl MediaFoundation {
    pub(crate) fn startup() -> Result<Self, CaptureError> {
        unsafe {
            let com_initialized = CoInitializeEx(None, COINIT_MULTITHREADED).is_ok();
            if let Err(e) = MFStartup(MF_VERSION, MFSTARTUP_FULL) {
                if com_initialized {
                    CoUninitialize();
                }
                return Err(CaptureError::ConfigurationFailed(format!("MFStartup failed: {}", e)));
            }
            Ok(Self { com_initialized })
        }
    }

    /// List active video capture sources.
    pub(crate) fn video_devices(&self) -> Result<Vec<VideoDeviceDescriptor>, CaptureError> {
        unsafe {
            let attributes = video_capture_attributes()?;

            let mut activates: *mut Option<IMFActivate> = std::ptr::null_mut();
            let mut count: u32 = 0;
            MFEnumDeviceSources(&attributes, &mut activates, &mut count)
                .map_err(|e| CaptureError::ConfigurationFailed(format!("MFEnumDeviceSources failed: {}", e)))?;

            let mut devices = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                // Take ownership so each activation object is released.
                let Some(activate) = std::ptr::read(activates.add(i)) else {
                    continue;
                };
                let friendly_name = allocated_string(&activate, &MF_DEVSOURCE_ATTRIBUTE_FRIENDLY_NAME);
                let symbolic_link = allocated_string(
                    &activate,
                    &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE_VIDCAP_SYMBOLIC_LINK,
                );
                match (friendly_name, symbolic_link) {
                    (Some(friendly_name), Some(symbolic_link)) => devices.push(VideoDeviceDescriptor {
                        friendly_name,
                        symbolic_link,
                    }),
                    _ => log::warn!("skipping video source {} without name or link", i),
                }
            }
            if !activates.is_null() {
                CoTaskMemFree(Some(activates as *const _));
            }

            Ok(devices)
        }
    }

    /// Open and immediately release the source at `symbolic_link`.
    ///
    /// Access is denied when camera use is disabled under
    /// Settings > Privacy > Camera.
    pub(crate) fn probe(&self, symbolic_link: &str) -> ProbeResult {
        unsafe {
            let attributes = match video_capture_attributes() {
                Ok(a) => a,
                Err(e) => return ProbeResult::Failed(e.to_string()),
            };
            let link = HSTRING::from(symbolic_link);
            if let Err(e) = attributes.SetString(
                &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE_VIDCAP_SYMBOLIC_LINK,
                PCWSTR(link.as_ptr()),
            ) {
                return ProbeResult::Failed(e.to_string());
            }

            match MFCreateDeviceSource(&attributes) {
                Ok(source) => {
                    if let Err(e) = source.Shutdown() {
                        log::warn!("failed to release probed camera: {}", e);
                    }
                    ProbeResult::Opened
                }
                Err(e) if e.code() == E_ACCESSDENIED => ProbeResult::AccessDenied,
                Err(e) => ProbeResult::Failed(e.to_string()),
            }
        }
    }
}

impl Drop for MediaFoundation {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = MFShutdown() {
                log::warn!("MFShutdown failed: {}", e);
            }
            if self.com_initialized {
                CoUninitialize();
            }
        }
    }
}

unsafe fn video_capture_attributes() -> Result<IMFAttributes, CaptureError> {
    let mut attributes: Option<IMFAttributes> = None;
    MFCreateAttributes(&mut attributes, 2)
        .map_err(|e| CaptureError::ConfigurationFailed(format!("MFCreateAttributes failed: {}", e)))?;
    let attributes = attributes
        .ok_or_else(|| CaptureError::ConfigurationFailed("MFCreateAttributes returned nothing".into()))?;
    attributes
        .SetGUID(
            &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE,
            &MF_DEVSOURCE_ATTRIBUTE_SOURCE_TYPE_VIDCAP_GUID,
        )
        .map_err(|e| CaptureError::ConfigurationFailed(format!("SetGUID failed: {}", e)))?;
    Ok(attributes)
}

unsafe fn allocated_string(activate: &IMFActivate, key: &windows::core::GUID) -> Option<String> {
    let mut value = PWSTR::null();
    let mut length: u32 = 0;
    activate.GetAllocatedString(key, &mut value, &mut length).ok()?;
    let result = value.to_string().ok();
    CoTaskMemFree(Some(value.0 as *const _));
    result
}
