pub mod capture;
pub mod config;
pub mod error;
pub mod media;
pub mod output;
pub mod permission;
pub mod preview;
pub mod state;
