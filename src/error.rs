//! Error types for NC block decoding.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::BlockKind;

/// Error codes for decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input file not readable (-1)
    FileNotFound = -1,
    /// Empty input (-2)
    EmptyInput = -2,
    /// Malformed block hand-off data (-3)
    InvalidInput = -3,
    /// Block has fewer fields than its kind requires (E100)
    TooFewFields = 100,
    /// Mandatory numeric field did not parse (E101)
    InvalidNumber = 101,
    /// Mandatory field absent (E102)
    MissingField = 102,
    /// Block code not recognised (E200)
    UnknownBlock = 200,
    /// No decoder registered for the block kind (E201)
    NoDecoder = 201,
}

/// Structural failure while decoding a single block.
///
/// A block that fails this way is skipped by the caller; it never aborts the
/// rest of the file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{kind} block has {found} field(s), at least {minimum} required")]
    TooFewFields {
        kind: BlockKind,
        minimum: usize,
        found: usize,
    },

    #[error("{kind} block: field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        kind: BlockKind,
        field: String,
        value: String,
    },

    #[error("{kind} block: missing required field '{field}'")]
    MissingField { kind: BlockKind, field: String },

    #[error("Unknown block code '{code}'")]
    UnknownBlock { code: String },

    #[error("No decoder registered for {kind} blocks")]
    NoDecoder { kind: BlockKind },
}

impl DecodeError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::TooFewFields { .. } => ErrorCode::TooFewFields,
            DecodeError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            DecodeError::MissingField { .. } => ErrorCode::MissingField,
            DecodeError::UnknownBlock { .. } => ErrorCode::UnknownBlock,
            DecodeError::NoDecoder { .. } => ErrorCode::NoDecoder,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Top-level error for loading and processing block files.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Empty input: {path}")]
    EmptyInput { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid block data: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Decode(e) => e.code(),
            Error::EmptyInput { .. } => ErrorCode::EmptyInput,
            Error::Io(_) => ErrorCode::FileNotFound,
            Error::Json(_) => ErrorCode::InvalidInput,
        }
    }
}

/// Result type alias for single-block decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type alias for file-level operations.
pub type Result<T> = std::result::Result<T, Error>;
