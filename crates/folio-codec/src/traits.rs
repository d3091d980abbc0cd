use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecResult;

/// A record encoding.
///
/// Implementations must satisfy these invariants:
/// - `decode` of the bytes produced by `encode` yields a value equal to the
///   one encoded.
/// - A failed `decode_into` leaves the destination untouched.
/// - Truncated or malformed input is reported as
///   [`CodecError::Decode`](crate::CodecError::Decode), never as a panic.
/// - The extension is stable for the life of the codec value; the store
///   derives file names from it.
pub trait Codec: Clone + Debug + Send + Sync + 'static {
    /// Short human-readable name of the format (used in errors and logs).
    fn name(&self) -> &'static str;

    /// File extension for records in this format, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Stream-encode `value` into `writer`.
    fn encode<T, W>(&self, value: &T, writer: W) -> CodecResult<()>
    where
        T: Serialize + ?Sized,
        W: Write;

    /// Decode a freshly allocated value from `reader`.
    fn decode<T, R>(&self, reader: R) -> CodecResult<T>
    where
        T: DeserializeOwned,
        R: Read;

    /// Decode from `reader` into an existing destination.
    ///
    /// The default implementation decodes a fresh value and moves it into
    /// `out` only once decoding has succeeded.
    fn decode_into<T, R>(&self, reader: R, out: &mut T) -> CodecResult<()>
    where
        T: DeserializeOwned,
        R: Read,
    {
        *out = self.decode(reader)?;
        Ok(())
    }

    /// Encode `value` into an owned buffer.
    fn to_bytes<T>(&self, value: &T) -> CodecResult<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Decode a value from a byte slice.
    fn from_bytes<T>(&self, bytes: &[u8]) -> CodecResult<T>
    where
        T: DeserializeOwned,
    {
        self.decode(bytes)
    }

    /// The placeholder record written when a store root is bootstrapped:
    /// an empty string-keyed map in this codec's encoding.
    fn empty_record(&self) -> CodecResult<Vec<u8>> {
        self.to_bytes(&BTreeMap::<String, String>::new())
    }
}
