//! Compact binary encoding backed by bincode.

use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

const NAME: &str = "binary";

/// bincode (fixed-width integers, little-endian) record encoding.
///
/// This is the default folio encoding. It is not self-describing: a record
/// can only be decoded into the same shape it was written from, and
/// `deserialize_any`-based targets such as `serde_json::Value` are rejected
/// with a decode error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinaryCodec;

impl BinaryCodec {
    pub const EXTENSION: &'static str = "bin";

    pub fn new() -> Self {
        Self
    }
}

impl Codec for BinaryCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extension(&self) -> &'static str {
        Self::EXTENSION
    }

    fn encode<T, W>(&self, value: &T, writer: W) -> CodecResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        bincode::serialize_into(writer, value).map_err(encode_error)
    }

    // The whole record is buffered first: decoding from a slice lets bincode
    // check every length prefix against the bytes actually present instead
    // of allocating whatever a corrupt prefix claims.
    fn decode<T, R>(&self, mut reader: R) -> CodecResult<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        bincode::deserialize(&bytes).map_err(decode_error)
    }
}

fn encode_error(err: bincode::Error) -> CodecError {
    match *err {
        bincode::ErrorKind::Io(e) => CodecError::Io(e),
        other => CodecError::Encode {
            format: NAME,
            message: other.to_string(),
        },
    }
}

// A short read means the record itself is truncated.
fn decode_error(err: bincode::Error) -> CodecError {
    match *err {
        bincode::ErrorKind::Io(e) if e.kind() != io::ErrorKind::UnexpectedEof => CodecError::Io(e),
        other => CodecError::Decode {
            format: NAME,
            message: other.to_string(),
        },
    }
}
