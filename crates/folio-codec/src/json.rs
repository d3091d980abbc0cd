//! Human-readable JSON encoding backed by serde_json.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

const NAME: &str = "json";

/// JSON record encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec {
    /// Emit indented output instead of a single line.
    pub pretty: bool,
}

impl JsonCodec {
    pub const EXTENSION: &'static str = "json";

    /// Compact, single-line output.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented output, easier to inspect by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
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
        let result = if self.pretty {
            serde_json::to_writer_pretty(writer, value)
        } else {
            serde_json::to_writer(writer, value)
        };
        result.map_err(|e| {
            if e.is_io() {
                CodecError::Io(e.into())
            } else {
                CodecError::Encode {
                    format: NAME,
                    message: e.to_string(),
                }
            }
        })
    }

    fn decode<T, R>(&self, reader: R) -> CodecResult<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                CodecError::Io(e.into())
            } else {
                CodecError::Decode {
                    format: NAME,
                    message: e.to_string(),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Fish {
        #[serde(rename = "Type")]
        kind: String,
    }

    #[test]
    fn output_is_plain_json() {
        let bytes = JsonCodec::new().to_bytes(&Fish { kind: "red".into() }).unwrap();
        assert_eq!(bytes, br#"{"Type":"red"}"#);
    }

    #[test]
    fn pretty_output_is_indented() {
        let bytes = JsonCodec::pretty().to_bytes(&Fish { kind: "red".into() }).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains('\n'));
        let back: Fish = JsonCodec::new().from_bytes(text.as_bytes()).unwrap();
        assert_eq!(back.kind, "red");
    }

    #[test]
    fn truncated_input_is_a_decode_error() {
        let err = JsonCodec::new().from_bytes::<Fish>(br#"{"Type":"re"#).unwrap_err();
        assert!(err.is_decode(), "got {err:?}");
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let err = JsonCodec::new().from_bytes::<Fish>(b"[1, 2, 3]").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn non_string_map_keys_are_an_encode_error() {
        let mut value: HashMap<Vec<u8>, u32> = HashMap::new();
        value.insert(vec![1, 2], 3);
        let err = JsonCodec::new().to_bytes(&value).unwrap_err();
        assert!(err.is_encode(), "got {err:?}");
    }

    #[test]
    fn empty_record_is_empty_object() {
        assert_eq!(JsonCodec::new().empty_record().unwrap(), b"{}");
    }

    #[test]
    fn decodes_into_dynamic_value() {
        let value: serde_json::Value = JsonCodec::new().from_bytes(br#"{"Type":"blue"}"#).unwrap();
        assert_eq!(value["Type"], "blue");
    }
}
