//! HZ-GB2312, the 7-bit mail encoding of GB 2312
//!
//! Text starts in ASCII mode. `~{` switches to GB mode, where every pair of
//! bytes in `0x21..=0x7E` is a GB 2312 character with the high bits
//! cleared, and `~}` switches back. `~~` is a literal tilde and `~` before
//! a newline is a line continuation. The character set itself comes from
//! the `encoding_rs` GBK tables, of which GB 2312 is the two-byte core.

use encoding_rs::{EncoderResult, GBK};

use crate::codec::{Decoder, Encoder, Encoding, Family, Malformed, Unmappable};

/// The HZ encoding
#[derive(Debug)]
pub struct Hz;

/// HZ-GB-2312 (RFC 1843)
pub static HZ_GB2312: Hz = Hz;

const SHIFT_OUT: &[u8] = b"~{";
const SHIFT_IN: &[u8] = b"~}";

impl Encoding for Hz {
    fn name(&self) -> &'static str {
        "HZ-GB2312"
    }

    fn family(&self) -> Family {
        Family::MultiByte
    }

    fn new_decoder(&self) -> Box<dyn Decoder> {
        Box::new(HzDecoder {
            gb: false,
            held: None,
        })
    }

    fn new_encoder(&self) -> Box<dyn Encoder> {
        Box::new(HzEncoder {
            gbk: GBK.new_encoder(),
            gb: false,
        })
    }
}

/// First byte of a two-byte unit waiting for its partner
#[derive(Debug, Clone, Copy)]
enum Held {
    Tilde,
    Lead(u8),
}

struct HzDecoder {
    gb: bool,
    held: Option<Held>,
}

/// GB 2312 character for a pair of 7-bit bytes
fn gb2312(lead: u8, trail: u8) -> Option<char> {
    if !(0x21..=0x7E).contains(&trail) {
        return None;
    }
    let bytes = [lead | 0x80, trail | 0x80];
    let text = GBK.decode_without_bom_handling_and_without_replacement(&bytes)?;
    let mut chars = text.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

impl Decoder for HzDecoder {
    fn decode(&mut self, src: &[u8], dst: &mut String, last: bool) -> Result<usize, Malformed> {
        dst.reserve(src.len());
        // A byte held over from the previous call sits just before `src`.
        let mut held_at: isize = -1;

        for (i, &byte) in src.iter().enumerate() {
            let at = i as isize;
            match self.held.take() {
                Some(Held::Tilde) => match byte {
                    b'{' => self.gb = true,
                    b'}' => self.gb = false,
                    b'~' => dst.push('~'),
                    b'\n' => {}
                    _ => return Err(Malformed::at(held_at)),
                },
                Some(Held::Lead(lead)) => {
                    let ch = gb2312(lead, byte).ok_or(Malformed::at(held_at))?;
                    dst.push(ch);
                }
                None => match byte {
                    b'~' => {
                        self.held = Some(Held::Tilde);
                        held_at = at;
                    }
                    0x21..=0x7E if self.gb => {
                        self.held = Some(Held::Lead(byte));
                        held_at = at;
                    }
                    0x00..=0x7F if !self.gb => dst.push(char::from(byte)),
                    _ => return Err(Malformed::at(at)),
                },
            }
        }

        if last && self.held.is_some() {
            return Err(Malformed::at(held_at));
        }
        Ok(src.len())
    }

    fn is_pending(&self) -> bool {
        self.held.is_some()
    }
}

struct HzEncoder {
    gbk: encoding_rs::Encoder,
    gb: bool,
}

impl HzEncoder {
    /// GB 2312 byte pair for `ch`, high bits still set
    fn pair(&mut self, ch: char) -> Option<[u8; 2]> {
        let mut utf8 = [0u8; 4];
        let mut bytes = [0u8; 4];
        let (result, _, written) = self.gbk.encode_from_utf8_without_replacement(
            ch.encode_utf8(&mut utf8),
            &mut bytes,
            false,
        );
        match (result, &bytes[..written]) {
            (EncoderResult::InputEmpty, &[lead @ 0xA1..=0xFE, trail @ 0xA1..=0xFE]) => {
                Some([lead, trail])
            }
            _ => None,
        }
    }

    fn shift(&mut self, gb: bool, dst: &mut Vec<u8>) {
        if self.gb != gb {
            dst.extend_from_slice(if gb { SHIFT_OUT } else { SHIFT_IN });
            self.gb = gb;
        }
    }
}

impl Encoder for HzEncoder {
    fn encode(&mut self, src: &str, dst: &mut Vec<u8>, last: bool) -> Result<(), Unmappable> {
        dst.reserve(src.len());
        for (position, ch) in src.char_indices() {
            if ch.is_ascii() {
                self.shift(false, dst);
                if ch == '~' {
                    dst.extend_from_slice(b"~~");
                } else {
                    dst.push(ch as u8);
                }
                continue;
            }
            let [lead, trail] = self.pair(ch).ok_or(Unmappable { ch, position })?;
            self.shift(true, dst);
            dst.extend_from_slice(&[lead & 0x7F, trail & 0x7F]);
        }
        if last {
            self.shift(false, dst);
        }
        Ok(())
    }
}
