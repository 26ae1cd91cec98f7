//! Unicode transformation formats
//!
//! UTF-8, UTF-16 and UTF-32 in both byte orders, each with two byte order
//! mark policies:
//!
//! - [`BomPolicy::Ignore`]: a leading BOM is decoded like any other
//!   character (U+FEFF) and the encoder never writes one.
//! - [`BomPolicy::Use`]: the decoder consumes a leading BOM of either byte
//!   order and switches to that order; the encoder writes a BOM first.

use crate::codec::{Decoder, Encoder, Encoding, Family, Malformed, Unmappable};
use crate::legacy::LegacyDecoder;

const BOM: char = '\u{FEFF}';

/// Byte order of multi-byte code units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

impl Endian {
    fn flip(self) -> Self {
        match self {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }
}

/// Handling of the byte order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomPolicy {
    /// Treat a BOM as text on read, never write one
    Ignore,
    /// Strip a BOM on read, always write one
    Use,
}

/// Code unit width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// 8-bit code units
    Utf8,
    /// 16-bit code units with surrogate pairs
    Utf16,
    /// 32-bit code units
    Utf32,
}

/// A Unicode transformation format with fixed byte order and BOM policy
#[derive(Debug)]
pub struct Utf {
    name: &'static str,
    form: Form,
    endian: Endian,
    bom: BomPolicy,
}

impl Utf {
    /// Describe a transformation format variant
    pub const fn new(name: &'static str, form: Form, endian: Endian, bom: BomPolicy) -> Self {
        Self {
            name,
            form,
            endian,
            bom,
        }
    }

    /// Code unit width
    pub fn form(&self) -> Form {
        self.form
    }

    /// Byte order used when no BOM says otherwise
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Byte order mark policy
    pub fn bom(&self) -> BomPolicy {
        self.bom
    }
}

/// UTF-8, BOM passed through as text
pub static UTF_8: Utf = Utf::new("UTF-8", Form::Utf8, Endian::Big, BomPolicy::Ignore);
/// UTF-8 with a byte order mark
pub static UTF_8_BOM: Utf = Utf::new("UTF-8", Form::Utf8, Endian::Big, BomPolicy::Use);
/// UTF-16 big endian
pub static UTF_16_BE: Utf = Utf::new("UTF-16BE", Form::Utf16, Endian::Big, BomPolicy::Ignore);
/// UTF-16 big endian with a byte order mark
pub static UTF_16_BE_BOM: Utf = Utf::new("UTF-16BE", Form::Utf16, Endian::Big, BomPolicy::Use);
/// UTF-16 little endian
pub static UTF_16_LE: Utf = Utf::new("UTF-16LE", Form::Utf16, Endian::Little, BomPolicy::Ignore);
/// UTF-16 little endian with a byte order mark
pub static UTF_16_LE_BOM: Utf = Utf::new("UTF-16LE", Form::Utf16, Endian::Little, BomPolicy::Use);
/// UTF-32 big endian
pub static UTF_32_BE: Utf = Utf::new("UTF-32BE", Form::Utf32, Endian::Big, BomPolicy::Ignore);
/// UTF-32 big endian with a byte order mark
pub static UTF_32_BE_BOM: Utf = Utf::new("UTF-32BE", Form::Utf32, Endian::Big, BomPolicy::Use);
/// UTF-32 little endian
pub static UTF_32_LE: Utf = Utf::new("UTF-32LE", Form::Utf32, Endian::Little, BomPolicy::Ignore);
/// UTF-32 little endian with a byte order mark
pub static UTF_32_LE_BOM: Utf = Utf::new("UTF-32LE", Form::Utf32, Endian::Little, BomPolicy::Use);

impl Encoding for Utf {
    fn name(&self) -> &'static str {
        self.name
    }

    fn family(&self) -> Family {
        Family::Unicode
    }

    fn new_decoder(&self) -> Box<dyn Decoder> {
        match (self.form, self.bom) {
            (Form::Utf8, BomPolicy::Ignore) => Box::new(LegacyDecoder::new(
                encoding_rs::UTF_8.new_decoder_without_bom_handling(),
            )),
            (Form::Utf8, BomPolicy::Use) => Box::new(LegacyDecoder::utf8_without_bom()),
            (form, bom) => Box::new(UnitDecoder {
                width: if form == Form::Utf16 { 2 } else { 4 },
                endian: self.endian,
                expect_bom: bom == BomPolicy::Use,
                pending: [0; 4],
                pending_len: 0,
                high: None,
            }),
        }
    }

    fn new_encoder(&self) -> Box<dyn Encoder> {
        Box::new(UtfEncoder {
            form: self.form,
            endian: self.endian,
            write_bom: self.bom == BomPolicy::Use,
        })
    }
}

/// Decoder for the fixed-width UTF-16 and UTF-32 code units
struct UnitDecoder {
    width: usize,
    endian: Endian,
    expect_bom: bool,
    pending: [u8; 4],
    pending_len: usize,
    high: Option<u16>,
}

impl UnitDecoder {
    fn read_unit(&self) -> u32 {
        let b = &self.pending;
        match (self.width, self.endian) {
            (2, Endian::Big) => u32::from(u16::from_be_bytes([b[0], b[1]])),
            (2, Endian::Little) => u32::from(u16::from_le_bytes([b[0], b[1]])),
            (_, Endian::Big) => u32::from_be_bytes(*b),
            (_, Endian::Little) => u32::from_le_bytes(*b),
        }
    }

    fn swapped_bom(&self) -> u32 {
        if self.width == 2 { 0xFFFE } else { 0xFFFE_0000 }
    }

    /// Handle one complete code unit that started at `start` bytes into the
    /// current input. `high_start` tracks where a pending high surrogate began.
    fn push_unit(
        &mut self,
        unit: u32,
        start: isize,
        high_start: &mut isize,
        dst: &mut String,
    ) -> Result<(), Malformed> {
        if self.expect_bom {
            self.expect_bom = false;
            if unit == u32::from(BOM) {
                return Ok(());
            }
            if unit == self.swapped_bom() {
                self.endian = self.endian.flip();
                return Ok(());
            }
        }

        if self.width == 4 {
            let ch = char::from_u32(unit).ok_or(Malformed::at(start))?;
            dst.push(ch);
            return Ok(());
        }

        match (self.high.take(), unit) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let code = 0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (unit - 0xDC00);
                let ch = char::from_u32(code).ok_or(Malformed::at(*high_start))?;
                dst.push(ch);
                Ok(())
            }
            (Some(_), _) => Err(Malformed::at(*high_start)),
            (None, 0xD800..=0xDBFF) => {
                self.high = Some(unit as u16);
                *high_start = start;
                Ok(())
            }
            (None, _) => {
                let ch = char::from_u32(unit).ok_or(Malformed::at(start))?;
                dst.push(ch);
                Ok(())
            }
        }
    }
}

impl Decoder for UnitDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<usize, Malformed> {
        dst.reserve(src.len());
        // Negative offsets point into an earlier call's input. A surrogate
        // still pending from the last call sits just before its leftover bytes.
        let mut high_start = -(2 + self.pending_len as isize);
        let mut pos = 0;

        loop {
            let start = pos as isize - self.pending_len as isize;
            let take = (self.width - self.pending_len).min(src.len() - pos);
            self.pending[self.pending_len..self.pending_len + take]
                .copy_from_slice(&src[pos..pos + take]);
            self.pending_len += take;
            pos += take;

            if self.pending_len < self.width {
                break;
            }
            self.pending_len = 0;
            let unit = self.read_unit();
            self.push_unit(unit, start, &mut high_start, dst)?;
        }

        if last {
            if self.high.is_some() {
                return Err(Malformed::at(high_start));
            }
            if self.pending_len > 0 {
                return Err(Malformed::at(src.len() as isize - self.pending_len as isize));
            }
        }
        Ok(src.len())
    }

    fn is_pending(&self) -> bool {
        self.pending_len > 0 || self.high.is_some()
    }
}

struct UtfEncoder {
    form: Form,
    endian: Endian,
    write_bom: bool,
}

impl UtfEncoder {
    fn put(&self, ch: char, dst: &mut Vec<u8>) {
        match self.form {
            Form::Utf8 => {
                let mut buf = [0u8; 4];
                dst.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Form::Utf16 => {
                let mut buf = [0u16; 2];
                for unit in ch.encode_utf16(&mut buf).iter() {
                    match self.endian {
                        Endian::Big => dst.extend_from_slice(&unit.to_be_bytes()),
                        Endian::Little => dst.extend_from_slice(&unit.to_le_bytes()),
                    }
                }
            }
            Form::Utf32 => match self.endian {
                Endian::Big => dst.extend_from_slice(&u32::from(ch).to_be_bytes()),
                Endian::Little => dst.extend_from_slice(&u32::from(ch).to_le_bytes()),
            },
        }
    }
}

impl Encoder for UtfEncoder {
    fn encode(&mut self, src: &str, dst: &mut Vec<u8>, _last: bool) -> Result<(), Unmappable> {
        if self.write_bom {
            self.write_bom = false;
            self.put(BOM, dst);
        }
        match self.form {
            Form::Utf8 => dst.extend_from_slice(src.as_bytes()),
            Form::Utf16 => {
                dst.reserve(src.len() * 2);
                src.chars().for_each(|ch| self.put(ch, dst));
            }
            Form::Utf32 => {
                dst.reserve(src.len() * 4);
                src.chars().for_each(|ch| self.put(ch, dst));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    static ALL: [&Utf; 10] = [
        &UTF_8,
        &UTF_8_BOM,
        &UTF_16_BE,
        &UTF_16_BE_BOM,
        &UTF_16_LE,
        &UTF_16_LE_BOM,
        &UTF_32_BE,
        &UTF_32_BE_BOM,
        &UTF_32_LE,
        &UTF_32_LE_BOM,
    ];

    fn decode_all(enc: &Utf, bytes: &[u8]) -> Result<String, Malformed> {
        let mut text = String::new();
        enc.new_decoder().decode(bytes, &mut text, true)?;
        Ok(text)
    }

    fn encode_all(enc: &Utf, text: &str) -> Vec<u8> {
        let mut out = Vec::new();
        enc.new_encoder().encode(text, &mut out, true).unwrap();
        out
    }

    #[test]
    fn test_utf16_endianness() {
        assert_eq!(encode_all(&UTF_16_LE, "Hi"), [0x48, 0x00, 0x69, 0x00]);
        assert_eq!(encode_all(&UTF_16_BE, "Hi"), [0x00, 0x48, 0x00, 0x69]);
        assert_eq!(decode_all(&UTF_16_BE, &[0x00, 0x48, 0x00, 0x69]).unwrap(), "Hi");
    }

    #[test]
    fn test_single_byte_to_utf16() {
        // U+20AC in UTF-16LE
        assert_eq!(encode_all(&UTF_16_LE, "€"), [0xAC, 0x20]);
        assert_eq!(encode_all(&UTF_32_BE, "€"), [0x00, 0x00, 0x20, 0xAC]);
    }

    #[test]
    fn test_bom_written_once() {
        let mut encoder = UTF_16_BE_BOM.new_encoder();
        let mut out = Vec::new();
        encoder.encode("a", &mut out, false).unwrap();
        encoder.encode("b", &mut out, true).unwrap();
        assert_eq!(out, [0xFE, 0xFF, 0x00, b'a', 0x00, b'b']);

        assert_eq!(encode_all(&UTF_8_BOM, ""), [0xEF, 0xBB, 0xBF]);
        assert_eq!(encode_all(&UTF_32_LE_BOM, ""), [0xFF, 0xFE, 0x00, 0x00]);
        assert!(encode_all(&UTF_16_LE, "").is_empty());
    }

    #[test]
    fn test_bom_decoding_policies() {
        let le_with_bom = [0xFF, 0xFE, b'H', 0x00];
        // BOM-aware decoder follows the mark even when it disagrees
        assert_eq!(decode_all(&UTF_16_BE_BOM, &le_with_bom).unwrap(), "H");
        assert_eq!(decode_all(&UTF_16_LE_BOM, &le_with_bom).unwrap(), "H");
        // BOM-ignoring decoder keeps it as text
        assert_eq!(decode_all(&UTF_16_LE, &le_with_bom).unwrap(), "\u{FEFF}H");

        assert_eq!(decode_all(&UTF_8_BOM, b"\xEF\xBB\xBFok").unwrap(), "ok");
        assert_eq!(decode_all(&UTF_8, b"\xEF\xBB\xBFok").unwrap(), "\u{FEFF}ok");
        assert_eq!(
            decode_all(&UTF_32_LE_BOM, &[0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, b'x']).unwrap(),
            "x"
        );
    }

    #[test]
    fn test_surrogate_pair_split_across_calls() {
        let bytes = encode_all(&UTF_16_LE, "a🌍");
        let mut decoder = UTF_16_LE.new_decoder();
        let mut text = String::new();
        for byte in &bytes {
            decoder.decode(std::slice::from_ref(byte), &mut text, false).unwrap();
        }
        decoder.decode(&[], &mut text, true).unwrap();
        assert_eq!(text, "a🌍");
    }

    #[test]
    fn test_unpaired_surrogates_are_malformed() {
        // "ab", lone high surrogate, "c"
        let bytes = [b'a', 0, b'b', 0, 0x00, 0xD8, b'c', 0];
        let mut text = String::new();
        let err = UTF_16_LE.new_decoder().decode(&bytes, &mut text, true).unwrap_err();
        assert_eq!(err.valid_up_to, 4);
        assert_eq!(text, "ab");

        let lone_low = [b'a', 0, 0x00, 0xDC];
        assert_eq!(decode_all(&UTF_16_LE, &lone_low), Err(Malformed::at(2)));

        let trailing_high = [b'a', 0, 0x3D, 0xD8];
        assert_eq!(decode_all(&UTF_16_LE, &trailing_high), Err(Malformed::at(2)));
    }

    #[test]
    fn test_fault_reaches_back_into_earlier_calls() {
        let mut decoder = UTF_16_LE.new_decoder();
        let mut text = String::new();
        decoder.decode(&[b'a', 0, 0x3D], &mut text, false).unwrap();
        decoder.decode(&[0xD8], &mut text, false).unwrap();
        let err = decoder.decode(&[], &mut text, true).unwrap_err();
        assert_eq!(err, Malformed { valid_up_to: 0, carried: 2 });
        assert_eq!(text, "a");
    }

    #[test]
    fn test_consumed_bom_leaves_decoder_idle() {
        let feed = |enc: &Utf, bytes: &[u8]| -> Vec<bool> {
            let mut decoder = enc.new_decoder();
            let mut text = String::new();
            bytes
                .iter()
                .map(|byte| {
                    decoder.decode(std::slice::from_ref(byte), &mut text, false).unwrap();
                    decoder.is_pending()
                })
                .collect()
        };
        // BOM, then the low half of a surrogate pair split byte by byte
        assert_eq!(
            feed(&UTF_16_LE_BOM, &[0xFF, 0xFE, 0x3D, 0xD8, 0x0D, 0xDF]),
            [true, false, true, true, true, false]
        );
        assert_eq!(
            feed(&UTF_8_BOM, b"\xEF\xBB\xBF\xE2\x82\xAC"),
            [true, true, false, true, true, false]
        );
        assert_eq!(feed(&UTF_8, b"\xEF\xBB\xBF"), [true, true, false]);
    }

    #[test]
    fn test_truncated_unit_is_malformed() {
        assert_eq!(
            decode_all(&UTF_16_BE, &[0x00, b'a', 0x00]),
            Err(Malformed::at(2))
        );
        assert_eq!(
            decode_all(&UTF_32_LE, &[b'a', 0, 0, 0, b'b']),
            Err(Malformed::at(4))
        );
    }

    #[test]
    fn test_utf32_rejects_out_of_range() {
        assert_eq!(
            decode_all(&UTF_32_BE, &[0x00, 0x11, 0x00, 0x00]),
            Err(Malformed::at(0))
        );
        assert!(decode_all(&UTF_32_BE, &[0x00, 0x00, 0xD8, 0x00]).is_err());
    }

    #[test]
    fn test_utf8_invalid_sequence() {
        let err = decode_all(&UTF_8, b"caf\xC3(").unwrap_err();
        assert_eq!(err.valid_up_to, 3);
    }

    proptest! {
        #[test]
        fn prop_round_trip_identity(text in any::<String>()) {
            for enc in ALL {
                let bytes = encode_all(enc, &text);
                let decoded = decode_all(enc, &bytes).unwrap();
                prop_assert_eq!(encode_all(enc, &decoded), bytes);
            }
        }
    }
}
