use serde::{Deserialize, Serialize};

/// Authorization state reported by the OS permission subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Undetermined,
    Authorized,
    Denied,
    /// Blocked by policy (e.g. parental controls); the user cannot grant it.
    Restricted,
}

impl PermissionState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Denied or restricted. Terminal for the camera in this controller.
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }

    pub fn from_grant(granted: bool) -> Self {
        if granted {
            Self::Authorized
        } else {
            Self::Denied
        }
    }
}
