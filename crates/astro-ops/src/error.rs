//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Images have incompatible sizes.
    #[error("incompatible image sizes: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised by the core image types.
    #[error(transparent)]
    Core(#[from] astro_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
