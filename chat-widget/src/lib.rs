pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod interop;
pub mod socket;

pub use components::*;
pub use config::*;
pub use controller::*;
pub use error::ChatError;
pub use identity::*;
pub use socket::*;
