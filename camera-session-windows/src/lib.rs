//! # camera-session-windows
//!
//! Windows backend for camera-session-kit.
//!
//! Provides:
//! - `MediaFoundationDevices`: video capture device enumeration via Media Foundation
//! - `WindowsCameraPermissions`: camera/microphone privacy settings check
//! - `descriptor`: portable mapping from device descriptors to `CameraDevice`
//!
//! ## Platform Requirements
//! - Windows 10 1803+ for the camera privacy settings
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! This crate resolves devices and permissions only. The `SessionBackend`
//! comes from the host's capture pipeline, or `HeadlessSession` from
//! camera-session-core when no frames are needed.
//!
//! ```ignore
//! use camera_session_windows::{MediaFoundationDevices, WindowsCameraPermissions};
//! use camera_session_core::headless::HeadlessSession;
//! use camera_session_core::CaptureSessionController;
//!
//! let mut controller = CaptureSessionController::new(
//!     HeadlessSession::new(),
//!     MediaFoundationDevices::new(),
//!     WindowsCameraPermissions::new(),
//!     Default::default(),
//! )?;
//! controller.activate()?;
//! ```

pub mod descriptor;

#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
mod media_foundation;
#[cfg(target_os = "windows")]
pub mod permissions;

pub use descriptor::VideoDeviceDescriptor;
#[cfg(target_os = "windows")]
pub use device_enumerator::MediaFoundationDevices;
#[cfg(target_os = "windows")]
pub use permissions::WindowsCameraPermissions;
