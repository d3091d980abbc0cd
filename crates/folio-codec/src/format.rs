//! Runtime selection between the built-in encodings.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::binary::BinaryCodec;
use crate::error::{CodecResult, ParseFormatError};
use crate::json::JsonCodec;
use crate::traits::Codec;

/// One of the built-in record encodings, chosen at runtime (configuration
/// files, command-line flags).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// [`BinaryCodec`], files named `doc.bin`.
    #[default]
    Binary,
    /// [`JsonCodec`] (compact), files named `doc.json`.
    Json,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Binary, Format::Json];
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" | "bincode" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

impl Codec for Format {
    fn name(&self) -> &'static str {
        match self {
            Self::Binary => BinaryCodec.name(),
            Self::Json => JsonCodec::new().name(),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Binary => BinaryCodec::EXTENSION,
            Self::Json => JsonCodec::EXTENSION,
        }
    }

    fn encode<T, W>(&self, value: &T, writer: W) -> CodecResult<()>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        match self {
            Self::Binary => BinaryCodec.encode(value, writer),
            Self::Json => JsonCodec::new().encode(value, writer),
        }
    }

    fn decode<T, R>(&self, reader: R) -> CodecResult<T>
    where
        T: DeserializeOwned,
        R: Read,
    {
        match self {
            Self::Binary => BinaryCodec.decode(reader),
            Self::Json => JsonCodec::new().decode(reader),
        }
    }
}
