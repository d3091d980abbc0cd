//! Crash-safe record replacement.
//!
//! A record is replaced by writing `doc.<ext>.tmp` next to the live
//! `doc.<ext>` and renaming it into place. The rename either fully succeeds
//! (new content visible) or fully fails (old content untouched); a reader
//! never sees a partially written record. Directory creation, temp-file
//! creation, encoding and rename all happen under the per-path lock, so
//! concurrent writers and deletes on one document never interleave.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use folio_codec::Codec;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{DeletePolicy, SyncMode};
use crate::error::{StoreError, StoreResult};
use crate::locks::LockRegistry;

/// File stem of every document record.
pub const RECORD_STEM: &str = "doc";

/// `doc.<ext>`
pub fn record_file_name(extension: &str) -> String {
    format!("{RECORD_STEM}.{extension}")
}

/// `doc.<ext>.tmp`
pub fn temp_file_name(extension: &str) -> String {
    format!("{RECORD_STEM}.{extension}.tmp")
}

/// Writes and removes records under the per-path locks of a registry.
#[derive(Clone, Copy, Debug)]
pub struct AtomicWriter<'a> {
    locks: &'a LockRegistry,
    sync: SyncMode,
}

impl<'a> AtomicWriter<'a> {
    pub fn new(locks: &'a LockRegistry, sync: SyncMode) -> Self {
        Self { locks, sync }
    }

    /// Stream-encode `value` with `codec` and atomically replace the record
    /// in `dir`. Returns the path of the live record.
    pub fn write_document<C, T>(&self, dir: &Path, codec: &C, value: &T) -> StoreResult<PathBuf>
    where
        C: Codec,
        T: Serialize + ?Sized,
    {
        self.replace(dir, codec.extension(), |tmp_path, out| {
            codec
                .encode(value, out)
                .map_err(|e| StoreError::encode(e, tmp_path))
        })
    }

    /// Atomically replace the record in `dir` with already-encoded bytes.
    pub fn write_bytes(&self, dir: &Path, extension: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        self.replace(dir, extension, |tmp_path, out| {
            out.write_all(bytes)
                .map_err(|e| StoreError::io("write record", tmp_path, e))
        })
    }

    /// Write `bytes` as the record in `dir` only if no record exists yet.
    ///
    /// The existence check and the write share one critical section, so a
    /// record written concurrently is never replaced. Returns `Ok(true)` if
    /// this call created the record.
    pub fn write_bytes_if_absent(&self, dir: &Path, extension: &str, bytes: &[u8]) -> StoreResult<bool> {
        self.locks.with_lock(dir, || {
            let final_path = dir.join(record_file_name(extension));
            let present = final_path
                .try_exists()
                .map_err(|e| StoreError::io("stat record", &final_path, e))?;
            if present {
                return Ok(false);
            }
            self.replace_locked(dir, extension, |tmp_path, out| {
                out.write_all(bytes)
                    .map_err(|e| StoreError::io("write record", tmp_path, e))
            })?;
            Ok(true)
        })
    }

    /// Remove `dir` and everything beneath it under its per-path lock.
    ///
    /// Returns `Ok(false)` when the path was already absent and `policy`
    /// allows that.
    pub fn remove_tree(&self, dir: &Path, policy: DeletePolicy) -> StoreResult<bool> {
        self.locks.with_lock(dir, || {
            match fs::symlink_metadata(dir) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return match policy {
                        DeletePolicy::Error => Err(StoreError::NotFound {
                            path: dir.to_path_buf(),
                        }),
                        DeletePolicy::Ignore => Ok(false),
                    };
                }
                Err(e) => return Err(StoreError::io("stat", dir, e)),
            }

            fs::remove_dir_all(dir).map_err(|e| StoreError::io("remove", dir, e))?;
            debug!(path = %dir.display(), "removed subtree");
            Ok(true)
        })
    }

    fn replace<F>(&self, dir: &Path, extension: &str, fill: F) -> StoreResult<PathBuf>
    where
        F: FnOnce(&Path, &mut BufWriter<File>) -> StoreResult<()>,
    {
        self.locks
            .with_lock(dir, || self.replace_locked(dir, extension, fill))
    }

    // Caller holds the lock for `dir`. The directory is created here too, so
    // a concurrent delete cannot remove it between mkdir and temp creation.
    fn replace_locked<F>(&self, dir: &Path, extension: &str, fill: F) -> StoreResult<PathBuf>
    where
        F: FnOnce(&Path, &mut BufWriter<File>) -> StoreResult<()>,
    {
        fs::create_dir_all(dir).map_err(|e| StoreError::io("create directory", dir, e))?;

        let final_path = dir.join(record_file_name(extension));
        let tmp_path = dir.join(temp_file_name(extension));

        let file = File::create(&tmp_path)
            .map_err(|e| StoreError::io("create temp file", &tmp_path, e))?;
        let mut out = BufWriter::new(file);

        let written = fill(tmp_path.as_path(), &mut out).and_then(|()| {
            out.flush()
                .map_err(|e| StoreError::io("flush temp file", &tmp_path, e))?;
            if self.sync == SyncMode::EveryWrite {
                out.get_ref()
                    .sync_all()
                    .map_err(|e| StoreError::io("sync temp file", &tmp_path, e))?;
            }
            Ok(())
        });
        drop(out);

        if let Err(e) = written.and_then(|()| {
            fs::rename(&tmp_path, &final_path)
                .map_err(|e| StoreError::io("rename", &final_path, e))
        }) {
            discard_temp(&tmp_path);
            return Err(e);
        }

        if self.sync == SyncMode::EveryWrite {
            sync_dir(dir)?;
        }

        debug!(path = %final_path.display(), "record replaced");
        Ok(final_path)
    }
}

fn discard_temp(tmp_path: &Path) {
    if let Err(e) = fs::remove_file(tmp_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %tmp_path.display(), error = %e, "failed to remove temp file");
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io("sync directory", dir, e))
}

// Directories cannot be opened for syncing here; the rename is still atomic.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}
