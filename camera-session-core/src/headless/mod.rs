//! In-memory backends for hosts without camera hardware (CI, simulators)
//! and for exercising the controller in tests.

pub mod devices;
pub mod permissions;
pub mod session;

pub use devices::HeadlessDevices;
pub use permissions::HeadlessPermissions;
pub use session::{HeadlessCaptureControl, HeadlessSession};
