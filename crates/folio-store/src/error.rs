//! Error types for store operations.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use folio_codec::CodecError;
use thiserror::Error;

/// The two kinds of node in a store tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Collection,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// A rejected document key or collection name.
///
/// This is the payload a handle carries once it is poisoned, so it is
/// `Clone` and never wraps I/O state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The key or name was the empty string.
    #[error("{kind} identifier is empty")]
    MissingIdentifier { kind: NodeKind },

    /// The key or name would escape its parent or names nothing.
    #[error("invalid {kind} identifier {name:?}: {reason}")]
    InvalidIdentifier {
        kind: NodeKind,
        name: String,
        reason: String,
    },
}

/// Errors from document and collection operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The handle was constructed from an invalid identifier.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// An ancestor handle was constructed from an invalid identifier.
    #[error("handle poisoned by an earlier failure: {cause}")]
    PoisonedHandle { cause: IdentifierError },

    /// The handle has no location on disk to operate on.
    #[error("missing document - no place to save record")]
    NoPath,

    /// The document record or collection directory does not exist.
    #[error("not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// A collection path exists but is not a directory.
    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    /// An underlying filesystem operation failed.
    #[error("{op} failed for {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[source] CodecError),

    /// The stored record could not be decoded.
    #[error("decode failed: {0}")]
    Decode(#[source] CodecError),

    /// The store configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Map an I/O error to [`StoreError::NotFound`] when the path is absent.
    pub(crate) fn io_or_not_found(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.as_ref().to_path_buf(),
            }
        } else {
            Self::io(op, path, source)
        }
    }

    /// Stream errors raised mid-encode belong to the file being written.
    pub(crate) fn encode(err: CodecError, path: impl AsRef<Path>) -> Self {
        match err {
            CodecError::Io(source) => Self::io("write record", path, source),
            other => Self::Encode(other),
        }
    }

    pub(crate) fn decode(err: CodecError, path: impl AsRef<Path>) -> Self {
        match err {
            CodecError::Io(source) => Self::io("read record", path, source),
            other => Self::Decode(other),
        }
    }

    /// The identifier problem behind this error, whether the handle's own
    /// or inherited from an ancestor.
    pub fn identifier_error(&self) -> Option<&IdentifierError> {
        match self {
            Self::Identifier(cause) | Self::PoisonedHandle { cause } => Some(cause),
            _ => None,
        }
    }

    /// Returns `true` if this error comes from a poisoned handle.
    pub fn is_identifier_error(&self) -> bool {
        self.identifier_error().is_some()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
