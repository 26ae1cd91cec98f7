//! Byte to character tables for the charmap family
//!
//! Only code pages that `encoding_rs` does not carry live here. Tables are
//! indexed by byte value and map every byte. The upper halves of the less
//! common DOS pages come from `oem_cp`.

use oem_cp::code_table::{
    DECODING_TABLE_CP852, DECODING_TABLE_CP855, DECODING_TABLE_CP860, DECODING_TABLE_CP862,
    DECODING_TABLE_CP863, DECODING_TABLE_CP865,
};

/// Build a table whose lower half is ASCII
const fn with_ascii(high: [char; 128]) -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut i = 0;
    while i < 128 {
        table[i] = i as u8 as char;
        i += 1;
    }
    while i < 256 {
        table[i] = high[i - 128];
        i += 1;
    }
    table
}

/// Copy `base` with a few positions reassigned
const fn patched(base: [char; 256], changes: &[(u8, char)]) -> [char; 256] {
    let mut table = base;
    let mut i = 0;
    while i < changes.len() {
        let (byte, ch) = changes[i];
        table[byte as usize] = ch;
        i += 1;
    }
    table
}

const fn latin1() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8 as char;
        i += 1;
    }
    table
}

/// ISO 8859-1, identical to the first 256 code points
pub(crate) static ISO_8859_1: [char; 256] = latin1();

/// ISO 8859-9 (Latin-5), Latin-1 with the Icelandic letters swapped for Turkish
pub(crate) static ISO_8859_9: [char; 256] = patched(
    latin1(),
    &[
        (0xD0, '\u{011E}'),
        (0xDD, '\u{0130}'),
        (0xDE, '\u{015E}'),
        (0xF0, '\u{011F}'),
        (0xFD, '\u{0131}'),
        (0xFE, '\u{015F}'),
    ],
);

/// IBM EBCDIC code page 037 (US/Canada)
#[rustfmt::skip]
pub(crate) static IBM_037: [char; 256] = [
    // 0x00
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{9C}', '\u{09}', '\u{86}', '\u{7F}',
    '\u{97}', '\u{8D}', '\u{8E}', '\u{0B}', '\u{0C}', '\u{0D}', '\u{0E}', '\u{0F}',
    // 0x10
    '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{9D}', '\u{85}', '\u{08}', '\u{87}',
    '\u{18}', '\u{19}', '\u{92}', '\u{8F}', '\u{1C}', '\u{1D}', '\u{1E}', '\u{1F}',
    // 0x20
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\u{0A}', '\u{17}', '\u{1B}',
    '\u{88}', '\u{89}', '\u{8A}', '\u{8B}', '\u{8C}', '\u{05}', '\u{06}', '\u{07}',
    // 0x30
    '\u{90}', '\u{91}', '\u{16}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{04}',
    '\u{98}', '\u{99}', '\u{9A}', '\u{9B}', '\u{14}', '\u{15}', '\u{9E}', '\u{1A}',
    // 0x40
    ' ', '\u{A0}', '\u{E2}', '\u{E4}', '\u{E0}', '\u{E1}', '\u{E3}', '\u{E5}',
    '\u{E7}', '\u{F1}', '\u{A2}', '.', '<', '(', '+', '|',
    // 0x50
    '&', '\u{E9}', '\u{EA}', '\u{EB}', '\u{E8}', '\u{ED}', '\u{EE}', '\u{EF}',
    '\u{EC}', '\u{DF}', '!', '$', '*', ')', ';', '\u{AC}',
    // 0x60
    '-', '/', '\u{C2}', '\u{C4}', '\u{C0}', '\u{C1}', '\u{C3}', '\u{C5}',
    '\u{C7}', '\u{D1}', '\u{A6}', ',', '%', '_', '>', '?',
    // 0x70
    '\u{F8}', '\u{C9}', '\u{CA}', '\u{CB}', '\u{C8}', '\u{CD}', '\u{CE}', '\u{CF}',
    '\u{CC}', '`', ':', '#', '@', '\'', '=', '"',
    // 0x80
    '\u{D8}', 'a', 'b', 'c', 'd', 'e', 'f', 'g',
    'h', 'i', '\u{AB}', '\u{BB}', '\u{F0}', '\u{FD}', '\u{FE}', '\u{B1}',
    // 0x90
    '\u{B0}', 'j', 'k', 'l', 'm', 'n', 'o', 'p',
    'q', 'r', '\u{AA}', '\u{BA}', '\u{E6}', '\u{B8}', '\u{C6}', '\u{A4}',
    // 0xA0
    '\u{B5}', '~', 's', 't', 'u', 'v', 'w', 'x',
    'y', 'z', '\u{A1}', '\u{BF}', '\u{D0}', '\u{DD}', '\u{DE}', '\u{AE}',
    // 0xB0
    '^', '\u{A3}', '\u{A5}', '\u{B7}', '\u{A9}', '\u{A7}', '\u{B6}', '\u{BC}',
    '\u{BD}', '\u{BE}', '[', ']', '\u{AF}', '\u{A8}', '\u{B4}', '\u{D7}',
    // 0xC0
    '{', 'A', 'B', 'C', 'D', 'E', 'F', 'G',
    'H', 'I', '\u{AD}', '\u{F4}', '\u{F6}', '\u{F2}', '\u{F3}', '\u{F5}',
    // 0xD0
    '}', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
    'Q', 'R', '\u{B9}', '\u{FB}', '\u{FC}', '\u{F9}', '\u{FA}', '\u{FF}',
    // 0xE0
    '\\', '\u{F7}', 'S', 'T', 'U', 'V', 'W', 'X',
    'Y', 'Z', '\u{B2}', '\u{D4}', '\u{D6}', '\u{D2}', '\u{D3}', '\u{D5}',
    // 0xF0
    '0', '1', '2', '3', '4', '5', '6', '7',
    '8', '9', '\u{B3}', '\u{DB}', '\u{DC}', '\u{D9}', '\u{DA}', '\u{9F}',
];

/// IBM EBCDIC code page 1047 (Open Systems Latin-1)
pub(crate) static IBM_1047: [char; 256] = patched(
    IBM_037,
    &[
        (0x5F, '^'),
        (0xAD, '['),
        (0xB0, '\u{AC}'),
        (0xBA, '\u{DD}'),
        (0xBB, '\u{A8}'),
        (0xBD, ']'),
    ],
);

/// IBM EBCDIC code page 1140, code page 037 with the euro sign
pub(crate) static IBM_1140: [char; 256] = patched(IBM_037, &[(0x9F, '\u{20AC}')]);

/// IBM PC code page 437 (US OEM)
#[rustfmt::skip]
pub(crate) static IBM_437: [char; 256] = with_ascii([
    // 0x80
    '\u{C7}', '\u{FC}', '\u{E9}', '\u{E2}', '\u{E4}', '\u{E0}', '\u{E5}', '\u{E7}',
    '\u{EA}', '\u{EB}', '\u{E8}', '\u{EF}', '\u{EE}', '\u{EC}', '\u{C4}', '\u{C5}',
    // 0x90
    '\u{C9}', '\u{E6}', '\u{C6}', '\u{F4}', '\u{F6}', '\u{F2}', '\u{FB}', '\u{F9}',
    '\u{FF}', '\u{D6}', '\u{DC}', '\u{A2}', '\u{A3}', '\u{A5}', '\u{20A7}', '\u{192}',
    // 0xA0
    '\u{E1}', '\u{ED}', '\u{F3}', '\u{FA}', '\u{F1}', '\u{D1}', '\u{AA}', '\u{BA}',
    '\u{BF}', '\u{2310}', '\u{AC}', '\u{BD}', '\u{BC}', '\u{A1}', '\u{AB}', '\u{BB}',
    // 0xB0
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{255C}', '\u{255B}', '\u{2510}',
    // 0xC0
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{255E}', '\u{255F}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{2567}',
    // 0xD0
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256B}',
    '\u{256A}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{258C}', '\u{2590}', '\u{2580}',
    // 0xE0
    '\u{3B1}', '\u{DF}', '\u{393}', '\u{3C0}', '\u{3A3}', '\u{3C3}', '\u{B5}', '\u{3C4}',
    '\u{3A6}', '\u{398}', '\u{3A9}', '\u{3B4}', '\u{221E}', '\u{3C6}', '\u{3B5}', '\u{2229}',
    // 0xF0
    '\u{2261}', '\u{B1}', '\u{2265}', '\u{2264}', '\u{2320}', '\u{2321}', '\u{F7}', '\u{2248}',
    '\u{B0}', '\u{2219}', '\u{B7}', '\u{221A}', '\u{207F}', '\u{B2}', '\u{25A0}', '\u{A0}',
]);

/// IBM PC code page 850 (Western European OEM)
#[rustfmt::skip]
pub(crate) static IBM_850: [char; 256] = with_ascii([
    // 0x80
    '\u{C7}', '\u{FC}', '\u{E9}', '\u{E2}', '\u{E4}', '\u{E0}', '\u{E5}', '\u{E7}',
    '\u{EA}', '\u{EB}', '\u{E8}', '\u{EF}', '\u{EE}', '\u{EC}', '\u{C4}', '\u{C5}',
    // 0x90
    '\u{C9}', '\u{E6}', '\u{C6}', '\u{F4}', '\u{F6}', '\u{F2}', '\u{FB}', '\u{F9}',
    '\u{FF}', '\u{D6}', '\u{DC}', '\u{F8}', '\u{A3}', '\u{D8}', '\u{D7}', '\u{192}',
    // 0xA0
    '\u{E1}', '\u{ED}', '\u{F3}', '\u{FA}', '\u{F1}', '\u{D1}', '\u{AA}', '\u{BA}',
    '\u{BF}', '\u{AE}', '\u{AC}', '\u{BD}', '\u{BC}', '\u{A1}', '\u{AB}', '\u{BB}',
    // 0xB0
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{C1}', '\u{C2}', '\u{C0}',
    '\u{A9}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{A2}', '\u{A5}', '\u{2510}',
    // 0xC0
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{E3}', '\u{C3}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{A4}',
    // 0xD0
    '\u{F0}', '\u{D0}', '\u{CA}', '\u{CB}', '\u{C8}', '\u{131}', '\u{CD}', '\u{CE}',
    '\u{CF}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{A6}', '\u{CC}', '\u{2580}',
    // 0xE0
    '\u{D3}', '\u{DF}', '\u{D4}', '\u{D2}', '\u{F5}', '\u{D5}', '\u{B5}', '\u{FE}',
    '\u{DE}', '\u{DA}', '\u{DB}', '\u{D9}', '\u{FD}', '\u{DD}', '\u{AF}', '\u{B4}',
    // 0xF0
    '\u{AD}', '\u{B1}', '\u{2017}', '\u{BE}', '\u{B6}', '\u{A7}', '\u{F7}', '\u{B8}',
    '\u{B0}', '\u{A8}', '\u{B7}', '\u{B9}', '\u{B3}', '\u{B2}', '\u{25A0}', '\u{A0}',
]);

/// IBM PC code page 858, code page 850 with the euro sign replacing dotless i
pub(crate) static IBM_858: [char; 256] = patched(IBM_850, &[(0xD5, '\u{20AC}')]);

/// IBM PC code page 852 (Central European OEM)
pub(crate) static IBM_852: [char; 256] = with_ascii(DECODING_TABLE_CP852);
/// IBM PC code page 855 (Cyrillic OEM)
pub(crate) static IBM_855: [char; 256] = with_ascii(DECODING_TABLE_CP855);
/// IBM PC code page 860 (Portuguese OEM)
pub(crate) static IBM_860: [char; 256] = with_ascii(DECODING_TABLE_CP860);
/// IBM PC code page 862 (Hebrew OEM)
pub(crate) static IBM_862: [char; 256] = with_ascii(DECODING_TABLE_CP862);
/// IBM PC code page 863 (Canadian French OEM)
pub(crate) static IBM_863: [char; 256] = with_ascii(DECODING_TABLE_CP863);
/// IBM PC code page 865 (Nordic OEM)
pub(crate) static IBM_865: [char; 256] = with_ascii(DECODING_TABLE_CP865);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_bijective(table: &[char; 256]) {
        let distinct: HashSet<char> = table.iter().copied().collect();
        assert_eq!(distinct.len(), 256);
    }

    #[test]
    fn test_tables_are_bijective() {
        for table in [
            &ISO_8859_1,
            &ISO_8859_9,
            &IBM_037,
            &IBM_1047,
            &IBM_1140,
            &IBM_437,
            &IBM_850,
            &IBM_858,
            &IBM_852,
            &IBM_855,
            &IBM_860,
            &IBM_862,
            &IBM_863,
            &IBM_865,
        ] {
            assert_bijective(table);
        }
    }

    #[test]
    fn test_ebcdic_variants_differ_from_037() {
        assert_eq!(IBM_037[0xBA], '[');
        assert_eq!(IBM_1047[0xAD], '[');
        assert_eq!(IBM_1047[0x5F], '^');
        assert_eq!(IBM_1140[0x9F], '€');
        assert_eq!(IBM_037[0x9F], '\u{A4}');
    }

    #[test]
    fn test_oem_tables_keep_ascii() {
        assert_eq!(IBM_437[b'A' as usize], 'A');
        assert_eq!(IBM_437[0xC9], '╔');
        assert_eq!(IBM_850[0xD5], 'ı');
        assert_eq!(IBM_858[0xD5], '€');
    }

    #[test]
    fn test_regional_dos_pages() {
        assert_eq!(IBM_852[0x80], 'Ç');
        assert_eq!(IBM_852[0x85], 'ů');
        assert_eq!(IBM_855[0x80], 'ђ');
        assert_eq!(IBM_855[0x81], 'Ђ');
        assert_eq!(IBM_860[0x84], 'ã');
        assert_eq!(IBM_860[0x8E], 'Ã');
        assert_eq!(IBM_862[0x80], 'א');
        assert_eq!(IBM_862[0x9A], 'ת');
        assert_eq!(IBM_863[0x84], 'Â');
        assert_eq!(IBM_863[0x86], '¶');
        assert_eq!(IBM_865[0x9B], 'ø');
        assert_eq!(IBM_865[0x9D], 'Ø');
        assert_eq!(IBM_865[0xAF], '¤');
        for table in [&IBM_852, &IBM_855, &IBM_860, &IBM_862, &IBM_863, &IBM_865] {
            assert_eq!(table[b'z' as usize], 'z');
        }
    }
}
