//! Record encodings for the folio document store.
//!
//! A folio store keeps every document as a single encoded file named
//! `doc.<extension>`. This crate defines the boundary between the store and
//! the bytes on disk: the [`Codec`] trait plus the two encodings shipped with
//! folio.
//!
//! # Encodings
//!
//! - [`BinaryCodec`] -- compact bincode encoding, extension `bin`
//! - [`JsonCodec`] -- human-readable JSON, extension `json`
//! - [`Format`] -- runtime selector over the two, itself a [`Codec`]
//!
//! The encoding is chosen once when a store is opened and every handle
//! derived from that store shares it. Files written with one encoding are
//! never sniffed or converted by the other.

pub mod binary;
pub mod error;
pub mod format;
pub mod json;
pub mod traits;

pub use binary::BinaryCodec;
pub use error::{CodecError, CodecResult, ParseFormatError};
pub use format::Format;
pub use json::JsonCodec;
pub use traits::Codec;
