//! Error types for the metadata service.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error raised by a mapping source or a database driver.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors returned by [`MetadataService`](crate::service::MetadataService).
///
/// Argument and disposal errors are raised by the service itself, before any
/// collaborator is called. Everything else is the collaborator's own error,
/// passed through untouched: `Display` and `source()` are those of the
/// original error, and [`MetadataError::driver_error`] /
/// [`MetadataError::mapping_error`] recover its concrete type.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A required argument was missing or blank.
    #[error("{message}")]
    InvalidArgument {
        /// Name of the offending parameter.
        param: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// The service was used after `dispose()`.
    #[error("metadata service has been disposed")]
    Disposed,

    /// The mapping source failed.
    #[error(transparent)]
    Mapping(BoxError),

    /// The database driver failed (open, execute, read or close).
    #[error(transparent)]
    Driver(BoxError),
}

impl MetadataError {
    /// `<param> must not be null`
    pub fn null_argument(param: &'static str) -> Self {
        Self::InvalidArgument {
            param,
            message: format!("{param} must not be null"),
        }
    }

    /// `<param> must not be null or whitespace`
    pub fn blank_argument(param: &'static str) -> Self {
        Self::InvalidArgument {
            param,
            message: format!("{param} must not be null or whitespace"),
        }
    }

    /// Invalid argument with a custom message.
    pub fn invalid_argument(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    /// Wrap a mapping-source error.
    pub fn mapping<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Mapping(Box::new(err))
    }

    /// Wrap a driver error.
    pub fn driver<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Driver(Box::new(err))
    }

    /// Name of the offending parameter, for argument errors.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { param, .. } => Some(*param),
            _ => None,
        }
    }

    /// Check if this is an argument validation error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// The original driver error, if this is one of type `E`.
    pub fn driver_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Driver(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// The original mapping error, if this is one of type `E`.
    pub fn mapping_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Mapping(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
