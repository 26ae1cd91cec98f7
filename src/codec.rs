//! Codec capabilities shared by every encoding family
//!
//! An [`Encoding`] is a process-wide constant that hands out fresh, stateful
//! [`Decoder`] and [`Encoder`] transducers. Decoders turn bytes into UTF-8
//! text, encoders turn UTF-8 text back into bytes. Both work incrementally so
//! a stream can be pushed through them one chunk at a time.

use std::fmt;

use serde::Serialize;

/// Reference to one of the statically allocated encodings
pub type EncodingRef = &'static dyn Encoding;

/// Broad grouping of encodings, used for listing only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// One byte per character, fixed 256-entry mapping
    SingleByte,
    /// Variable-length East-Asian character sets
    MultiByte,
    /// Unicode transformation formats
    Unicode,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::SingleByte => "single-byte",
            Family::MultiByte => "multi-byte",
            Family::Unicode => "unicode",
        };
        f.write_str(name)
    }
}

/// A character encoding able to produce decoders and encoders
pub trait Encoding: Send + Sync + fmt::Debug {
    /// Intrinsic name of the encoding. Not necessarily unique: the registry
    /// may override it with a display name.
    fn name(&self) -> &'static str;

    /// Family this encoding belongs to
    fn family(&self) -> Family;

    /// Create a decoder positioned at the start of a stream
    fn new_decoder(&self) -> Box<dyn Decoder>;

    /// Create an encoder positioned at the start of a stream
    fn new_encoder(&self) -> Box<dyn Encoder>;

    /// Whether every Unicode scalar value can be encoded
    fn is_unicode(&self) -> bool {
        self.family() == Family::Unicode
    }
}

/// Whether two references point at the same encoding
pub fn same(a: EncodingRef, b: EncodingRef) -> bool {
    std::ptr::addr_eq(a, b)
}

/// Malformed or unmappable byte sequence found while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    /// Bytes of the current input slice consumed before the bad sequence.
    /// Zero when the sequence started in an earlier slice.
    pub valid_up_to: usize,
    /// Bytes of the bad sequence that arrived in earlier slices
    pub carried: usize,
}

impl Malformed {
    /// Fault whose sequence starts `start` bytes into the current slice;
    /// negative values reach back into earlier slices.
    pub fn at(start: isize) -> Self {
        Self {
            valid_up_to: usize::try_from(start).unwrap_or(0),
            carried: usize::try_from(-start).unwrap_or(0),
        }
    }
}

/// Character with no representation in the target encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unmappable {
    /// The character that could not be encoded
    pub ch: char,
    /// Byte index of `ch` in the text handed to the encoder
    pub position: usize,
}

/// Incremental bytes-to-text transducer
pub trait Decoder: Send {
    /// Decode all of `src`, appending text to `dst`.
    ///
    /// Incomplete trailing sequences are kept until the next call. When
    /// `last` is set the stream ends with `src` and anything still pending
    /// is malformed. On error, text decoded from `src[..valid_up_to]` has
    /// already been appended.
    fn decode(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<usize, Malformed>;

    /// Whether the input so far stops partway through a character or an
    /// escape sequence. Byte order marks and shift sequences decode to no
    /// text but still leave the decoder idle once complete.
    fn is_pending(&self) -> bool;
}

/// Incremental text-to-bytes transducer
pub trait Encoder: Send {
    /// Encode all of `src`, appending bytes to `dst`.
    ///
    /// `last` finalizes the stream (closing shift states and the like).
    /// On error, everything before the unmappable character has already
    /// been appended.
    fn encode(&mut self, src: &str, dst: &mut Vec<u8>, last: bool) -> Result<(), Unmappable>;
}
