//! Error types for the nsddns core
//!
//! Startup and infrastructure failures use [`Error`]. Per-request failures
//! are modelled by the narrower enums in their own modules
//! ([`AddressError`](crate::address::AddressError),
//! [`UpdateFailure`](crate::traits::UpdateFailure) and
//! [`Rejection`](crate::pipeline::Rejection)) because they are reported to
//! the client rather than propagated.

use thiserror::Error;

/// Result type alias for nsddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nsddns
#[derive(Error, Debug)]
pub enum Error {
    /// Credential loading errors
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a credential error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
