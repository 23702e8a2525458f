//! # camera-session-core
//!
//! Platform-agnostic camera capture session controller.
//!
//! Gates camera access on OS permission, binds one camera input and one
//! photo or movie output per configuration transaction, switches cameras
//! and capture modes, and dispatches capture completions to the host.
//! Platform backends implement `SessionBackend`, `DeviceProvider` and
//! `PermissionProvider` and plug into the generic `CaptureSessionController`.
//!
//! ## Architecture
//!
//! ```text
//! camera-session-core (this crate)
//! ├── traits/     ← SessionBackend, DeviceProvider, PermissionProvider, CaptureDelegate, PreviewSurface
//! ├── models/     ← CaptureError, SessionPhase, SessionConfiguration, OutputSink, etc.
//! ├── session/    ← CaptureSessionController, event marshaling
//! └── headless/   ← in-memory backends (no hardware)
//! ```

pub mod headless;
pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::capture::{CaptureId, CapturedPhoto, RecordedMovie};
pub use models::config::{SessionConfiguration, SwitchPolicy};
pub use models::error::CaptureError;
pub use models::media::{CameraDevice, CaptureMode, DeviceInput, DevicePosition, DeviceType, InputId, MediaKind};
pub use models::output::{MovieFileSink, OutputSink, PhotoSink, SinkId};
pub use models::permission::PermissionState;
pub use models::preview::{PreviewFrame, SessionHandle, VideoGravity};
pub use models::state::{SessionPhase, SessionSnapshot};
pub use session::controller::{CaptureSessionController, ConfigurationReport};
pub use session::events::{ControllerEvent, EventSender, SnapshotReader};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_session::{MovieCompletion, PhotoCompletion, SessionBackend};
pub use traits::device_provider::DeviceProvider;
pub use traits::permission_provider::{PermissionCallback, PermissionProvider};
pub use traits::preview_surface::PreviewSurface;
