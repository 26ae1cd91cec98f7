//! Encodings backed by `encoding_rs`
//!
//! Covers the East-Asian multi-byte sets together with the ISO-8859,
//! Windows, KOI8 and Macintosh single-byte sets. Decoding and encoding run
//! without replacement so that every malformed or unmappable sequence
//! surfaces as a fault.

use std::slice;

use encoding_rs::{DecoderResult, EncoderResult};

use crate::codec::{Decoder, Encoder, Encoding, Family, Malformed, Unmappable};

/// An encoding implemented by `encoding_rs`
#[derive(Debug)]
pub struct Legacy {
    encoding: &'static &'static encoding_rs::Encoding,
}

impl Legacy {
    /// Wrap one of the `encoding_rs` statics
    pub const fn new(encoding: &'static &'static encoding_rs::Encoding) -> Self {
        Self { encoding }
    }

    fn inner(&self) -> &'static encoding_rs::Encoding {
        *self.encoding
    }
}

macro_rules! legacy {
    ($($(#[$doc:meta])* $name:ident => $source:ident,)*) => {
        $(
            $(#[$doc])*
            pub static $name: Legacy = Legacy::new(&encoding_rs::$source);
        )*
    };
}

legacy! {
    /// Big5 (Traditional Chinese)
    BIG5 => BIG5,
    /// EUC-JP (Japanese)
    EUC_JP => EUC_JP,
    /// ISO-2022-JP (Japanese, 7-bit stateful)
    ISO_2022_JP => ISO_2022_JP,
    /// Shift_JIS (Japanese)
    SHIFT_JIS => SHIFT_JIS,
    /// EUC-KR (Korean)
    EUC_KR => EUC_KR,
    /// GB18030 (Simplified Chinese)
    GB18030 => GB18030,
    /// GBK (Simplified Chinese)
    GBK => GBK,
    /// IBM code page 866 (Russian OEM)
    IBM_866 => IBM866,
    /// ISO 8859-2 (Latin-2)
    ISO_8859_2 => ISO_8859_2,
    /// ISO 8859-3 (Latin-3)
    ISO_8859_3 => ISO_8859_3,
    /// ISO 8859-4 (Latin-4)
    ISO_8859_4 => ISO_8859_4,
    /// ISO 8859-5 (Cyrillic)
    ISO_8859_5 => ISO_8859_5,
    /// ISO 8859-6 (Arabic)
    ISO_8859_6 => ISO_8859_6,
    /// ISO 8859-6E, the explicitly directional Arabic variant
    ISO_8859_6E => ISO_8859_6,
    /// ISO 8859-6I, the implicitly directional Arabic variant
    ISO_8859_6I => ISO_8859_6,
    /// ISO 8859-7 (Greek)
    ISO_8859_7 => ISO_8859_7,
    /// ISO 8859-8 (Hebrew, visual order)
    ISO_8859_8 => ISO_8859_8,
    /// ISO 8859-8E, the explicitly directional Hebrew variant
    ISO_8859_8E => ISO_8859_8,
    /// ISO 8859-8I (Hebrew, logical order)
    ISO_8859_8I => ISO_8859_8_I,
    /// ISO 8859-10 (Latin-6)
    ISO_8859_10 => ISO_8859_10,
    /// ISO 8859-13 (Latin-7)
    ISO_8859_13 => ISO_8859_13,
    /// ISO 8859-14 (Latin-8)
    ISO_8859_14 => ISO_8859_14,
    /// ISO 8859-15 (Latin-9)
    ISO_8859_15 => ISO_8859_15,
    /// ISO 8859-16 (Latin-10)
    ISO_8859_16 => ISO_8859_16,
    /// KOI8-R (Russian)
    KOI8_R => KOI8_R,
    /// KOI8-U (Ukrainian)
    KOI8_U => KOI8_U,
    /// Classic Mac OS Roman
    MACINTOSH => MACINTOSH,
    /// Classic Mac OS Cyrillic
    MACINTOSH_CYRILLIC => X_MAC_CYRILLIC,
    /// Windows-874 (Thai)
    WINDOWS_874 => WINDOWS_874,
    /// Windows-1250 (Central European)
    WINDOWS_1250 => WINDOWS_1250,
    /// Windows-1251 (Cyrillic)
    WINDOWS_1251 => WINDOWS_1251,
    /// Windows-1252 (Western European)
    WINDOWS_1252 => WINDOWS_1252,
    /// Windows-1253 (Greek)
    WINDOWS_1253 => WINDOWS_1253,
    /// Windows-1254 (Turkish)
    WINDOWS_1254 => WINDOWS_1254,
    /// Windows-1255 (Hebrew)
    WINDOWS_1255 => WINDOWS_1255,
    /// Windows-1256 (Arabic)
    WINDOWS_1256 => WINDOWS_1256,
    /// Windows-1257 (Baltic)
    WINDOWS_1257 => WINDOWS_1257,
    /// Windows-1258 (Vietnamese)
    WINDOWS_1258 => WINDOWS_1258,
}

impl Encoding for Legacy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn family(&self) -> Family {
        if self.inner().is_single_byte() {
            Family::SingleByte
        } else {
            Family::MultiByte
        }
    }

    fn new_decoder(&self) -> Box<dyn Decoder> {
        Box::new(LegacyDecoder::new(
            self.inner().new_decoder_without_bom_handling(),
        ))
    }

    fn new_encoder(&self) -> Box<dyn Encoder> {
        Box::new(LegacyEncoder(self.inner().new_encoder()))
    }
}

/// Escape character opening an ISO-2022-JP shift sequence
const ESC: u8 = 0x1B;
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub(crate) struct LegacyDecoder {
    inner: encoding_rs::Decoder,
    silent: Silent,
    pending: bool,
}

/// Byte sequences `encoding_rs` consumes without producing text, tracked
/// so the decoder can tell when one of them has just ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Silent {
    Plain,
    /// Leading UTF-8 BOM, `matched` bytes of it seen so far
    Bom { matched: usize },
    /// ISO-2022-JP escape, `seen` bytes of the current one so far
    Escape { seen: usize },
}

impl Silent {
    /// Feed one input byte. True when it completes a silent sequence.
    fn completes(&mut self, byte: u8) -> bool {
        match *self {
            Silent::Plain => false,
            Silent::Bom { matched } if byte == UTF8_BOM[matched] => {
                if matched + 1 == UTF8_BOM.len() {
                    *self = Silent::Plain;
                    true
                } else {
                    *self = Silent::Bom {
                        matched: matched + 1,
                    };
                    false
                }
            }
            Silent::Bom { .. } => {
                *self = Silent::Plain;
                false
            }
            Silent::Escape { seen: 0 } => {
                if byte == ESC {
                    *self = Silent::Escape { seen: 1 };
                }
                false
            }
            Silent::Escape { seen: 1 } if matches!(byte, b'(' | b'$') => {
                *self = Silent::Escape { seen: 2 };
                false
            }
            Silent::Escape { seen } => {
                *self = Silent::Escape { seen: 0 };
                seen == 2
            }
        }
    }
}

impl LegacyDecoder {
    pub(crate) fn new(inner: encoding_rs::Decoder) -> Self {
        let silent = if inner.encoding() == encoding_rs::ISO_2022_JP {
            Silent::Escape { seen: 0 }
        } else {
            Silent::Plain
        };
        Self {
            inner,
            silent,
            pending: false,
        }
    }

    /// UTF-8 decoder that drops a leading byte order mark
    pub(crate) fn utf8_without_bom() -> Self {
        Self {
            inner: encoding_rs::UTF_8.new_decoder_with_bom_removal(),
            silent: Silent::Bom { matched: 0 },
            pending: false,
        }
    }

    /// Push `src` through the inner decoder. A malformed sequence is
    /// reported by where it started relative to `src`.
    fn feed(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<(), isize> {
        let mut read_total = 0;
        loop {
            let remaining = &src[read_total..];
            let needed = self
                .inner
                .max_utf8_buffer_length_without_replacement(remaining.len())
                .unwrap_or(remaining.len().saturating_mul(3));
            dst.reserve(needed);

            let (result, read) = self
                .inner
                .decode_to_string_without_replacement(remaining, dst, last);
            read_total += read;

            match result {
                DecoderResult::InputEmpty => return Ok(()),
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(bad, after) => {
                    let span = bad as isize + after as isize;
                    return Err(read_total as isize - span);
                }
            }
        }
    }
}

impl Decoder for LegacyDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<usize, Malformed> {
        // The final byte goes in on its own so it is known whether it
        // finished a character.
        let Some((&final_byte, body)) = src.split_last() else {
            self.feed(src, dst, last).map_err(Malformed::at)?;
            self.pending &= !last;
            return Ok(0);
        };
        self.feed(body, dst, false).map_err(Malformed::at)?;
        let before = dst.len();
        self.feed(slice::from_ref(&final_byte), dst, last)
            .map_err(|start| Malformed::at(body.len() as isize + start))?;

        let mut closes_silent = false;
        for &byte in src {
            closes_silent = self.silent.completes(byte);
        }
        self.pending = !(last || closes_silent || dst.len() > before);
        Ok(src.len())
    }

    fn is_pending(&self) -> bool {
        self.pending
    }
}

struct LegacyEncoder(encoding_rs::Encoder);

impl Encoder for LegacyEncoder {
    fn encode(&mut self, src: &str, dst: &mut Vec<u8>, last: bool) -> Result<(), Unmappable> {
        let mut read_total = 0;
        loop {
            let remaining = &src[read_total..];
            let needed = self
                .0
                .max_buffer_length_from_utf8_without_replacement(remaining.len())
                .unwrap_or(remaining.len().saturating_mul(4));
            dst.reserve(needed);

            let (result, read) = self
                .0
                .encode_from_utf8_to_vec_without_replacement(remaining, dst, last);
            read_total += read;

            match result {
                EncoderResult::InputEmpty => return Ok(()),
                EncoderResult::OutputFull => continue,
                EncoderResult::Unmappable(ch) => {
                    return Err(Unmappable {
                        ch,
                        position: read_total - ch.len_utf8(),
                    });
                }
            }
        }
    }
}
