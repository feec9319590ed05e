//! # Tether Core
//!
//! Connection options and resolution for the Tether client.
//!
//! This crate provides:
//! - The [`ClientOptions`] boundary type (URL string or field bag)
//! - Resolution into an immutable [`ConnectionConfig`]
//! - Redacted secret handling for passwords, API keys and tokens

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod secrets;

pub use config::{ClientOptions, ConnectOptions, ConnectionConfig, ValidationError};
pub use secrets::Secret;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::{ClientOptions, ConnectOptions, ConnectionConfig};
    pub use crate::secrets::Secret;
}
