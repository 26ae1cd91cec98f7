//! Table-driven single-byte encodings
//!
//! Each [`Charmap`] owns a 256-entry byte to character table. Decoding is a
//! plain lookup; encoding builds the reverse map once per encoder.

use std::collections::HashMap;

use crate::codec::{Decoder, Encoder, Encoding, Family, Malformed, Unmappable};
use crate::tables;

/// Single-byte encoding defined by a fixed mapping table
#[derive(Debug)]
pub struct Charmap {
    name: &'static str,
    table: &'static [char; 256],
}

impl Charmap {
    /// Create a charmap over a static table
    pub const fn new(name: &'static str, table: &'static [char; 256]) -> Self {
        Self { name, table }
    }

    /// Character stored at `byte`
    #[inline]
    pub fn decode_byte(&self, byte: u8) -> char {
        self.table[byte as usize]
    }
}

/// IBM EBCDIC code page 037 (US/Canada)
pub static IBM_037: Charmap = Charmap::new("IBM Code Page 037", &tables::IBM_037);
/// IBM EBCDIC code page 1047 (Open Systems Latin-1)
pub static IBM_1047: Charmap = Charmap::new("IBM Code Page 1047", &tables::IBM_1047);
/// IBM EBCDIC code page 1140 (037 with euro)
pub static IBM_1140: Charmap = Charmap::new("IBM Code Page 1140", &tables::IBM_1140);
/// DOS code page 437 (US OEM)
pub static IBM_437: Charmap = Charmap::new("IBM Code Page 437", &tables::IBM_437);
/// DOS code page 850 (Western European OEM)
pub static IBM_850: Charmap = Charmap::new("IBM Code Page 850", &tables::IBM_850);
/// DOS code page 858 (850 with euro)
pub static IBM_858: Charmap = Charmap::new("IBM Code Page 00858", &tables::IBM_858);
/// DOS code page 852 (Central European OEM)
pub static IBM_852: Charmap = Charmap::new("IBM Code Page 852", &tables::IBM_852);
/// DOS code page 855 (Cyrillic OEM)
pub static IBM_855: Charmap = Charmap::new("IBM Code Page 855", &tables::IBM_855);
/// DOS code page 860 (Portuguese OEM)
pub static IBM_860: Charmap = Charmap::new("IBM Code Page 860", &tables::IBM_860);
/// DOS code page 862 (Hebrew OEM)
pub static IBM_862: Charmap = Charmap::new("IBM Code Page 862", &tables::IBM_862);
/// DOS code page 863 (Canadian French OEM)
pub static IBM_863: Charmap = Charmap::new("IBM Code Page 863", &tables::IBM_863);
/// DOS code page 865 (Nordic OEM)
pub static IBM_865: Charmap = Charmap::new("IBM Code Page 865", &tables::IBM_865);
/// ISO 8859-1 (Latin-1)
pub static ISO_8859_1: Charmap = Charmap::new("ISO 8859-1", &tables::ISO_8859_1);
/// ISO 8859-9 (Latin-5, Turkish)
pub static ISO_8859_9: Charmap = Charmap::new("ISO 8859-9", &tables::ISO_8859_9);

impl Encoding for Charmap {
    fn name(&self) -> &'static str {
        self.name
    }

    fn family(&self) -> Family {
        Family::SingleByte
    }

    fn new_decoder(&self) -> Box<dyn Decoder> {
        Box::new(CharmapDecoder { table: self.table })
    }

    fn new_encoder(&self) -> Box<dyn Encoder> {
        let mut reverse = HashMap::with_capacity(256);
        for (byte, &ch) in self.table.iter().enumerate() {
            reverse.entry(ch).or_insert(byte as u8);
        }
        Box::new(CharmapEncoder { reverse })
    }
}

struct CharmapDecoder {
    table: &'static [char; 256],
}

impl Decoder for CharmapDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut String, _last: bool) -> Result<usize, Malformed> {
        dst.reserve(src.len());
        dst.extend(src.iter().map(|&byte| self.table[byte as usize]));
        Ok(src.len())
    }

    fn is_pending(&self) -> bool {
        false
    }
}

struct CharmapEncoder {
    reverse: HashMap<char, u8>,
}

impl Encoder for CharmapEncoder {
    fn encode(&mut self, src: &str, dst: &mut Vec<u8>, _last: bool) -> Result<(), Unmappable> {
        dst.reserve(src.len());
        for (position, ch) in src.char_indices() {
            match self.reverse.get(&ch) {
                Some(&byte) => dst.push(byte),
                None => return Err(Unmappable { ch, position }),
            }
        }
        Ok(())
    }
}
