//! Crate-wide error type
//!
//! Every component reports failures as a typed `Error` and lets the caller
//! decide what to do; only the CLI turns an error into a process exit.

use thiserror::Error;

/// Error type for conversion failures
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: bad dimensions, out-of-range rectangles,
    /// unsupported pixel formats, sizes that are not multiples of 8, ...
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or malformed animation metadata
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Compression codec failure
    #[error("codec error: {0}")]
    Codec(String),

    /// A format-specific hard limit was exceeded (e.g. tile count)
    #[error("{0}")]
    FormatLimit(String),

    /// Internal invariant violation; indicates a bug, not a user error
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error during file operations
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Source image decoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
