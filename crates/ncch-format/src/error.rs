//! Container format errors

use crate::reader::DecodeError;
use thiserror::Error;

/// Errors produced while decoding container structures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Low-level decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Structure is smaller than its fixed layout
    #[error("{what} too small: expected at least {expected:#x} bytes, got {actual:#x}")]
    Truncated {
        /// Name of the structure being decoded
        what: &'static str,
        /// Required size in bytes
        expected: usize,
        /// Actual size in bytes
        actual: usize,
    },

    /// Magic number did not match
    #[error("Invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        /// Expected magic bytes
        expected: [u8; 4],
        /// Magic bytes found in the data
        actual: [u8; 4],
    },

    /// Resource limit category outside the known set
    #[error("Invalid resource limit category: {0}")]
    InvalidResourceLimitCategory(u8),
}
