//! Catalog of supported encodings and lookup by user-supplied name
//!
//! Every catalog row gets a display name (its own override or the
//! encoding's intrinsic name) and a lookup key derived from that name by
//! [`NamePolicy::normalize`]. Aliases are normalized the same way, so
//! `"UTF-8"`, `"utf8"` and `"Utf_8"` all land on the same entry.

use std::collections::HashMap;
use std::collections::hash_map::Entry as Slot;
use std::iter;

use tracing::debug;

use crate::codec::{EncodingRef, Family, same};
use crate::pipeline::Labels;
use crate::{Error, Result, charmap, hz, legacy, unicode};

/// Prefix shared by the display names of the Unicode encodings
pub const UTF_PREFIX: &str = "UTF";

/// Rules for turning a raw encoding name into a lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamePolicy {
    /// Fold the `windows` and `IBM Code Page` vendor prefixes into `cp`
    pub vendor_aliases: bool,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            vendor_aliases: true,
        }
    }
}

impl NamePolicy {
    /// Lowercase `raw` and drop spaces, hyphens and underscores.
    ///
    /// With vendor aliases enabled, `windows` and `ibmcodepage` are then
    /// rewritten to `cp`, so `"Windows 1252"` and `"CP1252"` share a key.
    pub fn normalize(&self, raw: &str) -> String {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        if self.vendor_aliases {
            key.replace("windows", "cp").replace("ibmcodepage", "cp")
        } else {
            key
        }
    }
}

/// One row of an encoding catalog
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// The encoding itself
    pub encoding: EncodingRef,
    /// Display name overriding the intrinsic one
    pub display: Option<&'static str>,
    /// Extra names that resolve to this row
    pub aliases: &'static [&'static str],
}

impl CatalogEntry {
    /// Row listed under the encoding's intrinsic name
    pub const fn intrinsic(encoding: EncodingRef) -> Self {
        Self {
            encoding,
            display: None,
            aliases: &[],
        }
    }

    /// Row listed under `display`
    pub const fn named(encoding: EncodingRef, display: &'static str) -> Self {
        Self {
            encoding,
            display: Some(display),
            aliases: &[],
        }
    }

    /// Add alternative spellings
    pub const fn aka(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }
}

/// Every supported encoding, in listing order
pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry::intrinsic(&legacy::BIG5),
    CatalogEntry::intrinsic(&charmap::IBM_037).aka(&["IBM037", "EBCDIC 037"]),
    CatalogEntry::intrinsic(&charmap::IBM_437).aka(&["IBM437"]),
    CatalogEntry::intrinsic(&charmap::IBM_850).aka(&["IBM850"]),
    CatalogEntry::intrinsic(&charmap::IBM_852).aka(&["IBM852"]),
    CatalogEntry::intrinsic(&charmap::IBM_855).aka(&["IBM855"]),
    CatalogEntry::named(&charmap::IBM_858, "IBM Code Page 858").aka(&["IBM00858", "IBM858"]),
    CatalogEntry::intrinsic(&charmap::IBM_860).aka(&["IBM860"]),
    CatalogEntry::intrinsic(&charmap::IBM_862).aka(&["IBM862"]),
    CatalogEntry::intrinsic(&charmap::IBM_863).aka(&["IBM863"]),
    CatalogEntry::intrinsic(&charmap::IBM_865).aka(&["IBM865"]),
    CatalogEntry::named(&legacy::IBM_866, "IBM Code Page 866").aka(&["IBM866"]),
    CatalogEntry::named(&legacy::WINDOWS_874, "Windows 874"),
    CatalogEntry::intrinsic(&charmap::IBM_1047).aka(&["IBM1047"]),
    CatalogEntry::intrinsic(&charmap::IBM_1140).aka(&["IBM01140", "IBM1140"]),
    CatalogEntry::named(&legacy::WINDOWS_1250, "Windows 1250"),
    CatalogEntry::named(&legacy::WINDOWS_1251, "Windows 1251"),
    CatalogEntry::named(&legacy::WINDOWS_1252, "Windows 1252"),
    CatalogEntry::named(&legacy::WINDOWS_1253, "Windows 1253"),
    CatalogEntry::named(&legacy::WINDOWS_1254, "Windows 1254"),
    CatalogEntry::named(&legacy::WINDOWS_1255, "Windows 1255"),
    CatalogEntry::named(&legacy::WINDOWS_1256, "Windows 1256"),
    CatalogEntry::named(&legacy::WINDOWS_1257, "Windows 1257"),
    CatalogEntry::named(&legacy::WINDOWS_1258, "Windows 1258"),
    CatalogEntry::named(&legacy::EUC_JP, "EUCJP"),
    CatalogEntry::named(&legacy::EUC_KR, "EUCKR"),
    CatalogEntry::named(&legacy::GB18030, "GB18030"),
    CatalogEntry::intrinsic(&legacy::GBK),
    CatalogEntry::intrinsic(&hz::HZ_GB2312).aka(&["HZ"]),
    CatalogEntry::named(&legacy::ISO_2022_JP, "ISO 2022-JP"),
    CatalogEntry::intrinsic(&charmap::ISO_8859_1).aka(&["Latin1"]),
    CatalogEntry::named(&legacy::ISO_8859_2, "ISO 8859-2").aka(&["Latin2"]),
    CatalogEntry::named(&legacy::ISO_8859_3, "ISO 8859-3").aka(&["Latin3"]),
    CatalogEntry::named(&legacy::ISO_8859_4, "ISO 8859-4").aka(&["Latin4"]),
    CatalogEntry::named(&legacy::ISO_8859_5, "ISO 8859-5"),
    CatalogEntry::named(&legacy::ISO_8859_6, "ISO 8859-6"),
    CatalogEntry::named(&legacy::ISO_8859_6E, "ISO 8859-6E"),
    CatalogEntry::named(&legacy::ISO_8859_6I, "ISO 8859-6I"),
    CatalogEntry::named(&legacy::ISO_8859_7, "ISO 8859-7"),
    CatalogEntry::named(&legacy::ISO_8859_8, "ISO 8859-8"),
    CatalogEntry::named(&legacy::ISO_8859_8E, "ISO 8859-8E"),
    CatalogEntry::named(&legacy::ISO_8859_8I, "ISO 8859-8I"),
    CatalogEntry::intrinsic(&charmap::ISO_8859_9).aka(&["Latin5"]),
    CatalogEntry::named(&legacy::ISO_8859_10, "ISO 8859-10").aka(&["Latin6"]),
    CatalogEntry::named(&legacy::ISO_8859_13, "ISO 8859-13").aka(&["Latin7"]),
    CatalogEntry::named(&legacy::ISO_8859_14, "ISO 8859-14").aka(&["Latin8"]),
    CatalogEntry::named(&legacy::ISO_8859_15, "ISO 8859-15").aka(&["Latin9"]),
    CatalogEntry::named(&legacy::ISO_8859_16, "ISO 8859-16").aka(&["Latin10"]),
    CatalogEntry::intrinsic(&legacy::KOI8_R),
    CatalogEntry::intrinsic(&legacy::KOI8_U),
    CatalogEntry::named(&legacy::MACINTOSH, "Macintosh").aka(&["MacRoman"]),
    CatalogEntry::named(&legacy::MACINTOSH_CYRILLIC, "Macintosh Cyrillic")
        .aka(&["MacCyrillic"]),
    CatalogEntry::named(&legacy::SHIFT_JIS, "SHIFT-JIS").aka(&["SJIS"]),
    CatalogEntry::intrinsic(&unicode::UTF_8),
    CatalogEntry::named(&unicode::UTF_8_BOM, "UTF-8-BOM"),
    CatalogEntry::named(&unicode::UTF_16_BE, "UTF-16-BE"),
    CatalogEntry::named(&unicode::UTF_16_BE_BOM, "UTF-16-BE-BOM"),
    CatalogEntry::named(&unicode::UTF_16_LE, "UTF-16-LE"),
    CatalogEntry::named(&unicode::UTF_16_LE_BOM, "UTF-16-LE-BOM"),
    CatalogEntry::named(&unicode::UTF_32_BE, "UTF-32-BE"),
    CatalogEntry::named(&unicode::UTF_32_BE_BOM, "UTF-32-BE-BOM"),
    CatalogEntry::named(&unicode::UTF_32_LE, "UTF-32-LE"),
    CatalogEntry::named(&unicode::UTF_32_LE_BOM, "UTF-32-LE-BOM"),
];

/// A resolved catalog row
#[derive(Debug, Clone)]
pub struct Entry {
    display: &'static str,
    key: String,
    encoding: EncodingRef,
}

impl Entry {
    /// Name shown in listings
    pub fn display(&self) -> &'static str {
        self.display
    }

    /// Normalized lookup key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The encoding
    pub fn encoding(&self) -> EncodingRef {
        self.encoding
    }

    /// Family of the encoding
    pub fn family(&self) -> Family {
        self.encoding.family()
    }
}

/// Immutable name index over a catalog
#[derive(Debug)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    policy: NamePolicy,
}

impl Registry {
    /// Index `catalog` under `policy`.
    ///
    /// Fails on rows without a usable name and on repeated display names.
    /// When two different rows normalize to the same key, the earlier row
    /// keeps it.
    pub fn build(catalog: &[CatalogEntry], policy: NamePolicy) -> Result<Self> {
        let mut entries: Vec<Entry> = Vec::with_capacity(catalog.len());
        let mut index = HashMap::with_capacity(catalog.len() * 2);

        for (row, item) in catalog.iter().enumerate() {
            let shown = item.display.unwrap_or_else(|| item.encoding.name());
            let key = policy.normalize(shown);
            if key.is_empty() {
                return Err(Error::Catalog(format!("row {row} has no usable name")));
            }
            if entries.iter().any(|e| e.display == shown) {
                return Err(Error::Catalog(format!(
                    "duplicate display name {shown:?}"
                )));
            }

            let position = entries.len();
            let names = iter::once(key.clone())
                .chain(item.aliases.iter().map(|alias| policy.normalize(alias)));
            for name in names {
                if name.is_empty() {
                    return Err(Error::Catalog(format!("empty alias for {shown:?}")));
                }
                match index.entry(name) {
                    Slot::Vacant(slot) => {
                        slot.insert(position);
                    }
                    Slot::Occupied(slot) => {
                        let kept: &Entry = &entries[*slot.get()];
                        if !same(kept.encoding, item.encoding) {
                            debug!(
                                key = %slot.key(),
                                kept = kept.display,
                                dropped = shown,
                                "encoding name collision"
                            );
                        }
                    }
                }
            }

            entries.push(Entry {
                display: shown,
                key,
                encoding: item.encoding,
            });
        }

        debug!(
            entries = entries.len(),
            names = index.len(),
            "encoding registry built"
        );
        Ok(Self {
            entries,
            index,
            policy,
        })
    }

    /// Registry over [`CATALOG`] with default normalization
    pub fn standard() -> Result<Self> {
        Self::build(CATALOG, NamePolicy::default())
    }

    /// Find the encoding registered under `raw` or any spelling of it
    pub fn resolve(&self, raw: &str) -> Option<EncodingRef> {
        let key = self.policy.normalize(raw);
        self.index.get(&key).map(|&i| self.entries[i].encoding)
    }

    /// Like [`Registry::resolve`], but unknown names are an error
    pub fn lookup(&self, raw: &str) -> Result<EncodingRef> {
        self.resolve(raw)
            .ok_or_else(|| Error::UnknownEncoding(raw.to_string()))
    }

    /// Display names starting with `prefix`, in catalog order
    pub fn list<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.entries
            .iter()
            .map(Entry::display)
            .filter(move |name| name.starts_with(prefix))
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Display name of `encoding` if it is registered
    pub fn display_name(&self, encoding: EncodingRef) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| same(e.encoding, encoding))
            .map(Entry::display)
    }

    /// Fault labels for a transcode between two encodings, using display
    /// names where the encodings are registered
    pub fn labels(&self, input: EncodingRef, output: EncodingRef) -> Labels {
        Labels {
            input: self.display_name(input).unwrap_or_else(|| input.name()),
            output: self.display_name(output).unwrap_or_else(|| output.name()),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
