use crate::models::media::MediaKind;
use crate::models::permission::PermissionState;

/// Completion for an access request. `true` means the user granted access.
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Interface to the OS permission subsystem.
///
/// Implemented by:
/// - `HeadlessPermissions` (this crate)
/// - `WindowsCameraPermissions` (camera-session-windows)
pub trait PermissionProvider: Send + Sync {
    /// Current authorization for `kind`, without prompting.
    fn authorization_status(&self, kind: MediaKind) -> PermissionState;

    /// Ask the user for access to `kind`.
    ///
    /// `completion` may run on any thread, possibly before this returns.
    fn request_access(&self, kind: MediaKind, completion: PermissionCallback);
}
