//! Document handles: one record per directory.

use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_codec::{Codec, Format};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::collection::Collection;
use crate::error::{NodeKind, StoreError, StoreResult};
use crate::handle::{Location, Shared};
use crate::writer::record_file_name;

/// Handle to one record location in a store.
///
/// A document at logical path `P` lives in the file `P/doc.<ext>`; the
/// directory `P` may also hold sub-collections. Handles are cheap to clone
/// and hold no open files. A handle built from an invalid key is poisoned:
/// every operation on it, and on anything derived from it, returns the
/// original identifier error without touching the filesystem.
#[derive(Clone)]
pub struct Document<C: Codec = Format> {
    id: String,
    location: Location,
    shared: Arc<Shared<C>>,
}

impl<C: Codec> Document<C> {
    pub(crate) fn new(id: impl Into<String>, location: Location, shared: Arc<Shared<C>>) -> Self {
        Self {
            id: id.into(),
            location,
            shared,
        }
    }

    /// The key this document was reached by.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document's directory, or `None` for a poisoned handle.
    pub fn path(&self) -> Option<&Path> {
        self.location.path()
    }

    /// Report the error this handle was poisoned with, if any.
    pub fn check(&self) -> StoreResult<()> {
        self.location.dir().map(|_| ())
    }

    /// Path of the record file (`<dir>/doc.<ext>`).
    pub fn record_path(&self) -> StoreResult<PathBuf> {
        let dir = self.location.dir()?;
        Ok(dir.join(record_file_name(self.shared.codec.extension())))
    }

    /// Child collection `name`. Poison propagates.
    pub fn collection(&self, name: &str) -> Collection<C> {
        Collection::new(
            name,
            self.location.child(name, NodeKind::Collection),
            Arc::clone(&self.shared),
        )
    }

    /// Encode `value` and atomically replace this document's record,
    /// creating the directory chain if needed.
    pub fn write<T>(&self, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let dir = self.location.dir()?;
        self.shared
            .writer()
            .write_document(dir, &self.shared.codec, value)?;
        Ok(())
    }

    /// Decode the current record into `out`.
    ///
    /// Takes no lock: a read racing a write sees either the old or the new
    /// record, never a mix. On error `out` is left as it was.
    pub fn read<T>(&self, out: &mut T) -> StoreResult<()>
    where
        T: DeserializeOwned,
    {
        let (path, file) = self.open_record()?;
        self.shared
            .codec
            .decode_into(BufReader::new(file), out)
            .map_err(|e| StoreError::decode(e, &path))
    }

    /// Decode the current record into a fresh value.
    pub fn read_value<T>(&self) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let (path, file) = self.open_record()?;
        self.shared
            .codec
            .decode(BufReader::new(file))
            .map_err(|e| StoreError::decode(e, &path))
    }

    /// The record's encoded bytes, undecoded.
    pub fn read_raw(&self) -> StoreResult<Vec<u8>> {
        let path = self.record_path()?;
        fs::read(&path).map_err(|e| StoreError::io_or_not_found("read record", &path, e))
    }

    /// Whether a record file currently exists for this document.
    pub fn exists(&self) -> StoreResult<bool> {
        let path = self.record_path()?;
        path.try_exists()
            .map_err(|e| StoreError::io("stat record", &path, e))
    }

    /// Remove the record and every collection nested beneath it.
    pub fn delete(&self) -> StoreResult<()> {
        let dir = self.location.dir()?;
        self.shared
            .writer()
            .remove_tree(dir, self.shared.missing_on_delete)?;
        Ok(())
    }

    /// Make sure the record exists, writing an empty placeholder record if
    /// it does not. An existing record is left untouched.
    pub fn pregen(&self) -> StoreResult<()> {
        let dir = self.location.dir()?;
        let codec = &self.shared.codec;
        let placeholder = codec
            .empty_record()
            .map_err(|e| StoreError::encode(e, dir))?;
        let created = self
            .shared
            .writer()
            .write_bytes_if_absent(dir, codec.extension(), &placeholder)?;
        if created {
            debug!(path = %dir.display(), "pre-generated document");
        }
        Ok(())
    }

    fn open_record(&self) -> StoreResult<(PathBuf, File)> {
        let path = self.record_path()?;
        let file =
            File::open(&path).map_err(|e| StoreError::io_or_not_found("open record", &path, e))?;
        Ok((path, file))
    }
}

impl<C: Codec> fmt::Debug for Document<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("location", &self.location)
            .field("format", &self.shared.codec.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::thread;

    use super::*;
    use crate::config::{DeletePolicy, StoreConfig};
    use crate::error::IdentifierError;
    use crate::store::Store;
    use folio_codec::JsonCodec;
    use proptest::prelude::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Fish {
        #[serde(rename = "Type")]
        kind: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Tank {
        name: String,
        litres: u32,
        residents: Vec<Fish>,
        heater: Option<bool>,
    }

    fn fish(kind: &str) -> Fish {
        Fish { kind: kind.into() }
    }

    fn open(format: Format) -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("deep/school"), format).unwrap();
        (dir, store)
    }

    #[test]
    fn write_then_read() {
        for format in Format::ALL {
            let (_dir, store) = open(format);
            let doc = store.collection("fish").document("redfish");
            doc.write(&fish("red")).unwrap();

            let mut out = Fish::default();
            doc.read(&mut out).unwrap();
            assert_eq!(out, fish("red"));
        }
    }

    #[test]
    fn record_file_uses_codec_extension() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("redfish");
        doc.write(&fish("red")).unwrap();

        let path = doc.record_path().unwrap();
        assert!(path.ends_with("fish/redfish/doc.json"));
        assert_eq!(fs::read(&path).unwrap(), br#"{"Type":"red"}"#);
        assert_eq!(doc.read_raw().unwrap(), br#"{"Type":"red"}"#);
    }

    #[test]
    fn read_value_allocates_fresh() {
        let (_dir, store) = open(Format::Binary);
        let doc = store.collection("tanks").document("main");
        let tank = Tank {
            name: "reef".into(),
            litres: 400,
            residents: vec![fish("red"), fish("blue")],
            heater: Some(true),
        };
        doc.write(&tank).unwrap();
        assert_eq!(doc.read_value::<Tank>().unwrap(), tank);
    }

    #[test]
    fn overwrite_replaces_content() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("one");
        doc.write(&fish("red")).unwrap();
        doc.write(&fish("blue")).unwrap();
        assert_eq!(doc.read_value::<Fish>().unwrap(), fish("blue"));
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, store) = open(Format::Binary);
        let doc = store.collection("fish").document("ghost");
        let mut out = fish("unchanged");
        let err = doc.read(&mut out).unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
        assert_eq!(out, fish("unchanged"));
        assert!(!doc.exists().unwrap());
    }

    #[test]
    fn read_into_wrong_shape_is_decode_error() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("red");
        doc.write(&vec![1, 2, 3]).unwrap();
        let err = doc.read_value::<Fish>().unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn poisoned_handles_never_touch_disk() {
        let (dir, store) = open(Format::Binary);
        let cases = [
            store.collection("").document("x"),
            store.collection("fish").document(""),
            store.root().collection("fish").document("x").collection("").document("y"),
        ];
        for doc in &cases {
            assert!(doc.check().unwrap_err().is_identifier_error());
            assert!(doc.write(&fish("red")).unwrap_err().is_identifier_error());
            assert!(doc.read_value::<Fish>().unwrap_err().is_identifier_error());
            assert!(doc.read_raw().unwrap_err().is_identifier_error());
            assert!(doc.delete().unwrap_err().is_identifier_error());
            assert!(doc.pregen().unwrap_err().is_identifier_error());
            assert!(doc.exists().unwrap_err().is_identifier_error());
            assert!(doc.path().is_none());
        }
        // Only the bootstrapped root record exists.
        let entries: Vec<_> = fs::read_dir(dir.path().join("deep/school")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn poisoned_document_yields_poisoned_collection() {
        let (_dir, store) = open(Format::Json);
        let coll = store.collection("fish").document("").collection("fins");
        match coll.check().unwrap_err() {
            StoreError::PoisonedHandle { cause } => assert_eq!(
                cause,
                IdentifierError::MissingIdentifier {
                    kind: NodeKind::Document
                }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn delete_removes_nested_collections() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("red");
        doc.write(&fish("red")).unwrap();
        let nested = doc.collection("fins").document("left");
        nested.write(&fish("fin")).unwrap();

        doc.delete().unwrap();

        assert!(doc.read_value::<Fish>().unwrap_err().is_not_found());
        assert!(nested.read_value::<Fish>().unwrap_err().is_not_found());
        assert!(!doc.collection("fins").exists().unwrap());
    }

    #[test]
    fn delete_missing_follows_policy() {
        let dir = tempfile::tempdir().unwrap();
        let strict = Store::open(dir.path().join("strict"), Format::Json).unwrap();
        let err = strict.collection("fish").document("ghost").delete().unwrap_err();
        assert!(err.is_not_found());

        let config = StoreConfig {
            missing_on_delete: DeletePolicy::Ignore,
            ..StoreConfig::new(dir.path().join("lenient"), Format::Json)
        };
        let lenient = Store::open_with_config(config).unwrap();
        lenient.collection("fish").document("ghost").delete().unwrap();
    }

    #[test]
    fn interrupted_write_leaves_previous_record() {
        let (_dir, store) = open(Format::Binary);
        let doc = store.collection("fish").document("red");
        doc.write(&fish("red")).unwrap();

        // A crash between temp-file creation and rename leaves this behind.
        let dir = doc.path().unwrap().to_path_buf();
        fs::write(dir.join("doc.bin.tmp"), b"\x05\x00\x00").unwrap();
        assert_eq!(doc.read_value::<Fish>().unwrap(), fish("red"));

        // The next write reclaims the stale temp file.
        doc.write(&fish("blue")).unwrap();
        assert_eq!(doc.read_value::<Fish>().unwrap(), fish("blue"));
        assert!(!dir.join("doc.bin.tmp").exists());
    }

    #[test]
    fn pregen_creates_placeholder_once() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("new");
        assert!(!doc.exists().unwrap());

        doc.pregen().unwrap();
        assert!(doc.exists().unwrap());
        let empty: BTreeMap<String, String> = doc.read_value().unwrap();
        assert!(empty.is_empty());

        doc.write(&fish("red")).unwrap();
        doc.pregen().unwrap();
        assert_eq!(doc.read_value::<Fish>().unwrap(), fish("red"));
    }

    #[test]
    fn pregen_never_replaces_a_concurrent_write() {
        let (_dir, store) = open(Format::Json);
        let docs: Vec<Document> = (0..16)
            .map(|i| store.collection("fish").document(&format!("f{i}")))
            .collect();

        thread::scope(|s| {
            for doc in &docs {
                s.spawn(move || doc.pregen().unwrap());
                s.spawn(move || doc.write(&fish("real")).unwrap());
            }
        });

        for doc in &docs {
            assert_eq!(doc.read_value::<Fish>().unwrap(), fish("real"));
        }
    }

    #[test]
    fn corrupt_length_prefix_is_a_decode_error() {
        let (_dir, store) = open(Format::Binary);
        let doc = store.collection("fish").document("red");
        doc.pregen().unwrap();
        // Claims a 1 TiB string followed by a single byte.
        fs::write(doc.record_path().unwrap(), [0, 0, 0, 0, 0, 1, 0, 0, b'x']).unwrap();

        let err = doc.read_value::<String>().unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)), "got {err:?}");
        let mut out = String::from("kept");
        assert!(doc.read(&mut out).is_err());
        assert_eq!(out, "kept");
    }

    #[test]
    fn concurrent_writers_never_tear_a_record() {
        let (_dir, store) = open(Format::Json);
        let doc = store.collection("fish").document("contested");
        doc.write(&fish("seed")).unwrap();
        let colours: Vec<String> = (0..8).map(|i| format!("colour-{i}")).collect();

        thread::scope(|s| {
            for colour in &colours {
                let writer = doc.clone();
                s.spawn(move || {
                    for _ in 0..20 {
                        writer.write(&fish(colour)).unwrap();
                    }
                });
            }
            let reader = doc.clone();
            s.spawn(move || {
                for _ in 0..50 {
                    let seen: Fish = reader.read_value().unwrap();
                    assert!(seen.kind == "seed" || seen.kind.starts_with("colour-"));
                }
            });
        });

        let last: Fish = doc.read_value().unwrap();
        assert!(colours.contains(&last.kind));
    }

    #[test]
    fn custom_codec_instance_is_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            Store::open_with_codec(StoreConfig::new(dir.path(), Format::Json), JsonCodec::pretty())
                .unwrap();
        let doc = store.collection("fish").document("red");
        doc.write(&fish("red")).unwrap();
        let text = String::from_utf8(doc.read_raw().unwrap()).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(doc.read_value::<Fish>().unwrap(), fish("red"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_both_formats(
            name in "[a-zA-Z0-9 ]{0,24}",
            litres in any::<u32>(),
            kinds in proptest::collection::vec("[a-z]{1,8}", 0..5),
            heater in any::<Option<bool>>(),
        ) {
            let tank = Tank {
                name,
                litres,
                residents: kinds.iter().map(|k| fish(k)).collect(),
                heater,
            };
            for format in Format::ALL {
                let (_dir, store) = open(format);
                let doc = store.collection("tanks").document("t");
                doc.write(&tank).unwrap();
                let back: Tank = doc.read_value().unwrap();
                prop_assert_eq!(back, tank.clone());
            }
        }
    }
}
