//! Opening and bootstrapping a store.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use folio_codec::{Codec, Format};
use tracing::{debug, info};

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::handle::{Location, Shared};
use crate::locks::LockRegistry;
use crate::path::clean;
use crate::writer::record_file_name;

/// An open store: the root document plus the configuration and lock
/// registry every handle derived from it shares.
pub struct Store<C: Codec = Format> {
    config: StoreConfig,
    root: Document<C>,
    shared: Arc<Shared<C>>,
}

impl Store<Format> {
    /// Open (or create) a store at `dir` using one of the built-in formats.
    pub fn open(dir: impl AsRef<Path>, format: Format) -> StoreResult<Self> {
        Self::open_with_config(StoreConfig::new(dir.as_ref(), format))
    }

    /// Open (or create) a store as described by `config`.
    pub fn open_with_config(config: StoreConfig) -> StoreResult<Self> {
        let format = config.format;
        Self::open_with_codec(config, format)
    }

    /// Open a store described by `config` that must already exist.
    ///
    /// Nothing is created on disk; a missing root record is
    /// [`StoreError::NotFound`].
    pub fn open_existing(config: StoreConfig) -> StoreResult<Self> {
        let format = config.format;
        Self::open_inner(config, format, false)
    }
}

impl<C: Codec> Store<C> {
    /// Open (or create) a store with an explicit codec instance.
    ///
    /// `config.format` is ignored; `codec` decides the record encoding and
    /// file extension for the whole tree.
    ///
    /// If `<root>/doc.<ext>` already exists it is reused untouched.
    /// Otherwise the root directory is created and an empty placeholder
    /// record is written.
    pub fn open_with_codec(config: StoreConfig, codec: C) -> StoreResult<Self> {
        Self::open_inner(config, codec, true)
    }

    fn open_inner(config: StoreConfig, codec: C, bootstrap: bool) -> StoreResult<Self> {
        let root = clean(&config.root);
        if root.as_os_str().is_empty() {
            return Err(StoreError::NoPath);
        }

        let shared = Arc::new(Shared {
            codec,
            locks: LockRegistry::new(),
            sync: config.sync,
            missing_on_delete: config.missing_on_delete,
        });

        let extension = shared.codec.extension();
        let record = root.join(record_file_name(extension));
        match fs::metadata(&record) {
            Ok(meta) if meta.is_file() => {
                debug!(path = %record.display(), "reusing existing store root");
            }
            Ok(_) => {
                return Err(StoreError::io(
                    "open root",
                    &record,
                    io::Error::other("root record path is not a file"),
                ));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !bootstrap => {
                return Err(StoreError::NotFound { path: record });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let placeholder = shared
                    .codec
                    .empty_record()
                    .map_err(|e| StoreError::encode(e, &record))?;
                let created = shared
                    .writer()
                    .write_bytes_if_absent(&root, extension, &placeholder)?;
                if created {
                    info!(path = %root.display(), format = shared.codec.name(), "created store");
                }
            }
            Err(e) => return Err(StoreError::io("stat root", &record, e)),
        }

        let id = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root_doc = Document::new(id, Location::Valid(root), Arc::clone(&shared));

        Ok(Self {
            config,
            root: root_doc,
            shared,
        })
    }

    /// The root document.
    pub fn root(&self) -> &Document<C> {
        &self.root
    }

    /// Consume the store, keeping only its root handle.
    pub fn into_root(self) -> Document<C> {
        self.root
    }

    /// Shorthand for `self.root().collection(name)`.
    pub fn collection(&self, name: &str) -> Collection<C> {
        self.root.collection(name)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.shared.codec
    }

    /// Number of distinct paths the store has locked so far.
    pub fn tracked_locks(&self) -> usize {
        self.shared.locks.len()
    }
}

impl<C: Codec> std::fmt::Debug for Store<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("root", &self.root)
            .finish()
    }
}
