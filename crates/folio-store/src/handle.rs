//! State shared by document and collection handles.

use std::path::{Path, PathBuf};

use folio_codec::Codec;

use crate::config::{DeletePolicy, SyncMode};
use crate::error::{IdentifierError, NodeKind, StoreError, StoreResult};
use crate::locks::LockRegistry;
use crate::path::resolve;
use crate::writer::AtomicWriter;

/// Per-store context behind an `Arc`, threaded unchanged through every
/// handle derived from the root.
#[derive(Debug)]
pub(crate) struct Shared<C> {
    pub(crate) codec: C,
    pub(crate) locks: LockRegistry,
    pub(crate) sync: SyncMode,
    pub(crate) missing_on_delete: DeletePolicy,
}

impl<C: Codec> Shared<C> {
    pub(crate) fn writer(&self) -> AtomicWriter<'_> {
        AtomicWriter::new(&self.locks, self.sync)
    }
}

/// Where a handle points, decided once at construction.
#[derive(Clone, Debug)]
pub(crate) enum Location {
    Valid(PathBuf),
    Poisoned(Poison),
}

/// A construction failure carried by a handle for its whole life.
#[derive(Clone, Debug)]
pub(crate) struct Poison {
    cause: IdentifierError,
    inherited: bool,
}

impl Poison {
    fn to_error(&self) -> StoreError {
        if self.inherited {
            StoreError::PoisonedHandle {
                cause: self.cause.clone(),
            }
        } else {
            StoreError::Identifier(self.cause.clone())
        }
    }
}

impl Location {
    /// Location of the child `name`. Poison is inherited before the name is
    /// even looked at.
    pub(crate) fn child(&self, name: &str, kind: NodeKind) -> Location {
        match self {
            Self::Valid(dir) => match resolve(dir, name, kind) {
                Ok(path) => Self::Valid(path),
                Err(cause) => Self::Poisoned(Poison {
                    cause,
                    inherited: false,
                }),
            },
            Self::Poisoned(poison) => Self::Poisoned(Poison {
                cause: poison.cause.clone(),
                inherited: true,
            }),
        }
    }

    /// The directory this handle operates on, or the error every operation
    /// on a bad handle must report.
    pub(crate) fn dir(&self) -> StoreResult<&Path> {
        match self {
            Self::Valid(path) if path.as_os_str().is_empty() => Err(StoreError::NoPath),
            Self::Valid(path) => Ok(path),
            Self::Poisoned(poison) => Err(poison.to_error()),
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            Self::Valid(path) => Some(path),
            Self::Poisoned(_) => None,
        }
    }
}
