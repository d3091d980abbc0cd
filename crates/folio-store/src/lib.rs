//! Embeddable, file-system-backed hierarchical document store.
//!
//! A store is a tree of **documents** and **collections** laid out directly
//! on disk:
//!
//! ```text
//! <root>/doc.<ext>                      root document
//! <root>/fish/                          collection "fish"
//! <root>/fish/redfish/doc.<ext>         document "redfish"
//! <root>/fish/redfish/fins/left/doc.<ext>
//! ```
//!
//! Callers open a store, then alternate [`Document::collection`] and
//! [`Collection::document`] to descend, finishing with `write`, `read`,
//! `delete`, or a listing.
//!
//! ```no_run
//! use folio_store::{Format, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Fish { kind: String }
//!
//! let store = Store::open("db", Format::Json)?;
//! let red = store.collection("fish").document("redfish");
//! red.write(&Fish { kind: "red".into() })?;
//! let fish: Fish = red.read_value()?;
//! # Ok::<(), folio_store::StoreError>(())
//! ```
//!
//! # Design Rules
//!
//! 1. Records are replaced by write-to-temp-then-rename; a reader never sees
//!    a partial record.
//! 2. Writes and deletes are serialized per path through the store's
//!    [`LockRegistry`]; different paths proceed in parallel.
//! 3. Reads take no lock.
//! 4. A handle built from an invalid identifier is poisoned for life and
//!    never touches the filesystem.
//! 5. The record encoding is fixed when the store is opened and shared by
//!    every handle derived from it.
//! 6. All I/O and codec errors are returned to the caller; nothing is
//!    retried or swallowed.
//!
//! Locking is in-process only. Two processes writing the same store are not
//! coordinated.

pub mod collection;
pub mod config;
pub mod document;
pub mod error;
mod handle;
pub mod locks;
pub mod path;
pub mod store;
pub mod writer;

use std::path::Path;

pub use collection::Collection;
pub use config::{DeletePolicy, StoreConfig, SyncMode};
pub use document::Document;
pub use error::{IdentifierError, NodeKind, StoreError, StoreResult};
pub use locks::LockRegistry;
pub use store::Store;
pub use writer::AtomicWriter;

pub use folio_codec::{BinaryCodec, Codec, CodecError, Format, JsonCodec};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open (or create) a store at `dir` and return its root document.
pub fn open(dir: impl AsRef<Path>, format: Format) -> StoreResult<Document> {
    Store::open(dir, format).map(Store::into_root)
}
