//! # retxt - Streaming Character Encoding Transcoder
//!
//! Converts byte streams between legacy character encodings and the Unicode
//! transformation formats without holding the whole input in memory.
//!
//! ## Features
//!
//! - **Named encodings** resolved case- and punctuation-insensitively
//! - **EBCDIC, DOS, Windows, ISO-8859, KOI8, Mac and East-Asian** character sets,
//!   including the 7-bit HZ mail encoding
//! - **UTF-8, UTF-16 and UTF-32** in both byte orders, with or without BOM
//! - **Strict conversion** that stops at the first bad byte and reports where
//!
//! ## Quick Start
//!
//! ```rust
//! use retxt::Registry;
//!
//! let registry = Registry::standard()?;
//! let from = registry.lookup("IBM037")?;
//! let to = registry.lookup("utf8")?;
//!
//! // "HELLO" in EBCDIC
//! let ebcdic: &[u8] = &[0xC8, 0xC5, 0xD3, 0xD3, 0xD6];
//! let mut out = Vec::new();
//! retxt::transcode(ebcdic, &mut out, from, to)?;
//! assert_eq!(out, b"HELLO");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

pub mod charmap;
pub mod codec;
pub mod hz;
pub mod legacy;
pub mod pipeline;
pub mod registry;
mod tables;
pub mod unicode;

pub use codec::{Decoder, Encoder, Encoding, EncodingRef, Family};
pub use pipeline::{
    Fault, Labels, TranscodeError, TranscodeOptions, Transcoded, Transcoder, transcode,
};
pub use registry::{CatalogEntry, NamePolicy, Registry};

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or querying a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The catalog violates a naming rule
    #[error("invalid encoding catalog: {0}")]
    Catalog(String),
    /// No encoding is registered under this name
    #[error("invalid encoding name: {0}")]
    UnknownEncoding(String),
}
