//! Collection handles: a directory of documents.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use folio_codec::{Codec, Format};
use tracing::debug;

use crate::document::Document;
use crate::error::{NodeKind, StoreError, StoreResult};
use crate::handle::{Location, Shared};

/// Handle to one directory of documents.
///
/// Each immediate sub-directory is a document. Poisoning works exactly as
/// for [`Document`].
#[derive(Clone)]
pub struct Collection<C: Codec = Format> {
    id: String,
    location: Location,
    shared: Arc<Shared<C>>,
}

impl<C: Codec> Collection<C> {
    pub(crate) fn new(id: impl Into<String>, location: Location, shared: Arc<Shared<C>>) -> Self {
        Self {
            id: id.into(),
            location,
            shared,
        }
    }

    /// The name this collection was reached by.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The collection's directory, or `None` for a poisoned handle.
    pub fn path(&self) -> Option<&Path> {
        self.location.path()
    }

    /// Report the error this handle was poisoned with, if any.
    pub fn check(&self) -> StoreResult<()> {
        self.location.dir().map(|_| ())
    }

    /// Child document `key`. Poison propagates.
    pub fn document(&self, key: &str) -> Document<C> {
        Document::new(
            key,
            self.location.child(key, NodeKind::Document),
            Arc::clone(&self.shared),
        )
    }

    /// Whether the collection's directory exists.
    pub fn exists(&self) -> StoreResult<bool> {
        let dir = self.location.dir()?;
        match fs::metadata(dir) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io("stat collection", dir, e)),
        }
    }

    /// Every document in the collection, in directory-listing order.
    pub fn get_all_documents(&self) -> StoreResult<Vec<Document<C>>> {
        self.get_documents(0, 0)
    }

    /// Documents `[start, end)` of the directory listing.
    ///
    /// `end == 0` means no upper bound and an `end` past the listing is
    /// clamped to its length. A `start` at or past the end yields an empty
    /// list. The order is whatever the filesystem lists, so windows are only
    /// stable while the collection is not modified.
    pub fn get_documents(&self, start: usize, end: usize) -> StoreResult<Vec<Document<C>>> {
        let dir = self.location.dir()?;
        let meta = fs::metadata(dir)
            .map_err(|e| StoreError::io_or_not_found("stat collection", dir, e))?;
        if !meta.is_dir() {
            return Err(StoreError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut names = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io("list collection", dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("list collection", dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::io("stat entry", entry.path(), e))?;
            if !file_type.is_dir() {
                debug!(path = %entry.path().display(), "skipping non-document entry");
                continue;
            }
            names.push(entry.file_name());
        }

        let window = window(names.len(), start, end);
        debug!(
            path = %dir.display(),
            total = names.len(),
            start = window.start,
            end = window.end,
            "listed collection"
        );
        Ok(names[window]
            .iter()
            .map(|name| {
                Document::new(
                    name.to_string_lossy(),
                    Location::Valid(dir.join(name)),
                    Arc::clone(&self.shared),
                )
            })
            .collect())
    }

    /// Remove the collection and everything beneath it.
    pub fn delete(&self) -> StoreResult<()> {
        let dir = self.location.dir()?;
        self.shared
            .writer()
            .remove_tree(dir, self.shared.missing_on_delete)?;
        Ok(())
    }

    /// Make sure the collection's directory exists.
    pub fn pregen(&self) -> StoreResult<()> {
        let dir = self.location.dir()?;
        fs::create_dir_all(dir).map_err(|e| StoreError::io("create directory", dir, e))
    }
}

impl<C: Codec> fmt::Debug for Collection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("id", &self.id)
            .field("location", &self.location)
            .field("format", &self.shared.codec.name())
            .finish()
    }
}

fn window(len: usize, start: usize, end: usize) -> Range<usize> {
    let end = if end == 0 { len } else { end.min(len) };
    start.min(end)..end
}
