//! Loader error types.

use crate::container::ContainerError;
use ncch_format::FormatError;

/// Errors that can occur while loading an application.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Load was called on a loader that already loaded its title
    #[error("Application is already loaded")]
    AlreadyLoaded,

    /// Operation requires a prior successful load
    #[error("Application is not loaded")]
    NotLoaded,

    /// Invalid or unsupported data
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// GBA Virtual Console code section
    #[error("Unsupported legacy payload (GBA Virtual Console)")]
    UnsupportedLegacyPayload,

    /// Error reported by a container
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Code patch could not be applied
    #[error("Code patch failed: {0}")]
    Patch(#[source] ContainerError),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structure decoding error
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

impl LoaderError {
    /// Message to show the user when a title fails to boot.
    ///
    /// Loading is a deterministic pass over static data, so every failure
    /// is reported the same way and never retried.
    pub fn user_message(&self) -> &'static str {
        "incompatible or corrupt title image"
    }
}

/// Loader operation result
pub type LoaderResult<T> = Result<T, LoaderError>;
