//! Error types for qxprust library

use std::io;
use thiserror::Error;

/// Main error type for qxprust operations
#[derive(Debug, Error)]
pub enum QxpError {
    /// IO error occurred while reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input stream could not be accessed
    #[error("File access error: {0}")]
    FileAccess(String),

    /// Signature, version or document subtype not recognized
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Recognized signature but a version this reader does not decode
    #[error("Unsupported version: {0:#x}")]
    UnsupportedVersion(u16),

    /// Structural violation where recovery is unsafe
    #[error("Parse error: {0}")]
    Parse(String),

    /// A read ran past the end of the current stream
    #[error("Unexpected end of stream at offset {position} (requested {requested} bytes)")]
    EndOfStream { position: u64, requested: u64 },

    /// A seek target outside the current stream
    #[error("Seek out of range: {0}")]
    SeekOutOfRange(u64),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for qxprust operations
pub type Result<T> = std::result::Result<T, QxpError>;

impl From<String> for QxpError {
    fn from(s: String) -> Self {
        QxpError::Custom(s)
    }
}

impl From<&str> for QxpError {
    fn from(s: &str) -> Self {
        QxpError::Custom(s.to_string())
    }
}

/// Outcome of a top-level parse, as reported to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    /// The document was decoded (possibly with recovered errors).
    Ok,
    /// The input stream could not be read.
    FileAccessError,
    /// The input is not a supported document or template.
    UnsupportedFormat,
    /// Decoding aborted on a structural error.
    UnknownError,
}

impl ParseStatus {
    /// Process exit code a command line wrapper reports for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            ParseStatus::Ok => 0,
            ParseStatus::FileAccessError => 1,
            ParseStatus::UnsupportedFormat => 2,
            ParseStatus::UnknownError => 3,
        }
    }
}

impl QxpError {
    /// Map this error onto the top-level outcome taxonomy.
    pub fn status(&self) -> ParseStatus {
        match self {
            QxpError::Io(_) | QxpError::FileAccess(_) => ParseStatus::FileAccessError,
            QxpError::UnsupportedFormat(_) | QxpError::UnsupportedVersion(_) => {
                ParseStatus::UnsupportedFormat
            }
            _ => ParseStatus::UnknownError,
        }
    }

    /// Shorthand for a [`QxpError::Parse`] error.
    pub fn parse(msg: impl Into<String>) -> Self {
        QxpError::Parse(msg.into())
    }
}
