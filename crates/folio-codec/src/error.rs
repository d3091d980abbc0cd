use thiserror::Error;

/// Errors produced while encoding or decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be represented in the target format.
    #[error("{format} encode error: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// The bytes are malformed, truncated, or do not match the target type.
    #[error("{format} decode error: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns `true` if this error came from the value side rather than the
    /// byte stream.
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }

    /// Returns `true` for malformed or truncated input.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Returned when a format name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown record format {0:?} (expected \"binary\" or \"json\")")]
pub struct ParseFormatError(pub String);
