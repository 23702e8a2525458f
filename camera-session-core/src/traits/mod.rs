pub mod capture_delegate;
pub mod capture_session;
pub mod device_provider;
pub mod permission_provider;
pub mod preview_surface;
