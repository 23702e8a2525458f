pub mod controller;
pub mod events;
