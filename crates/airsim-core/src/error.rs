//! Error types for airsim-core.
//!
//! Only structurally invalid construction arguments are errors. Requests that
//! are merely out of the operating range (an air change rate the system cannot
//! run at, an unknown pollutant tag, a command to a powered-off appliance)
//! return `false` from the operation instead.
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`Error::Composition`] | [`AirComposition::new`](airsim_types::AirComposition::new) and friends |
//! | [`Error::InvalidRoom`] | [`Room::new`](crate::Room::new) |
//! | [`Error::InvalidConfig`] | [`SystemConfig::validate`](crate::SystemConfig::validate), [`AirPurifier::new`](crate::AirPurifier::new) |

use thiserror::Error;

use airsim_types::CompositionError;

/// Errors that can occur when building airsim objects.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An air composition field was out of bounds.
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// Room construction arguments were invalid.
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    /// Configuration values were invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using airsim-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
