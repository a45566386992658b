//! Unicode scripts and per-font script sets
//!
//! Scripts are identified by their ISO 15924 tag packed in a big-endian
//! `u32`. [`SCRIPT_RANGES`] is a block-level approximation of the Unicode
//! Scripts property: precise enough to route a rune to the fonts that claim
//! its writing system, without embedding the full property table.

use crate::{FontError, Result};
use std::fmt;

/// ISO 15924 script identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Script(pub u32);

impl Script {
    pub const fn from_tag(tag: &[u8; 4]) -> Self {
        Script(u32::from_be_bytes(*tag))
    }

    pub fn tag(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const UNKNOWN: Script = Script::from_tag(b"Zzzz");
    pub const COMMON: Script = Script::from_tag(b"Zyyy");
    pub const INHERITED: Script = Script::from_tag(b"Zinh");

    pub const ADLAM: Script = Script::from_tag(b"Adlm");
    pub const ARABIC: Script = Script::from_tag(b"Arab");
    pub const ARMENIAN: Script = Script::from_tag(b"Armn");
    pub const BALINESE: Script = Script::from_tag(b"Bali");
    pub const BAMUM: Script = Script::from_tag(b"Bamu");
    pub const BATAK: Script = Script::from_tag(b"Batk");
    pub const BENGALI: Script = Script::from_tag(b"Beng");
    pub const BOPOMOFO: Script = Script::from_tag(b"Bopo");
    pub const BRAHMI: Script = Script::from_tag(b"Brah");
    pub const BRAILLE: Script = Script::from_tag(b"Brai");
    pub const BUGINESE: Script = Script::from_tag(b"Bugi");
    pub const BUHID: Script = Script::from_tag(b"Buhd");
    pub const CANADIAN_ABORIGINAL: Script = Script::from_tag(b"Cans");
    pub const CHAM: Script = Script::from_tag(b"Cham");
    pub const CHEROKEE: Script = Script::from_tag(b"Cher");
    pub const COPTIC: Script = Script::from_tag(b"Copt");
    pub const CUNEIFORM: Script = Script::from_tag(b"Xsux");
    pub const CYPRIOT: Script = Script::from_tag(b"Cprt");
    pub const CYRILLIC: Script = Script::from_tag(b"Cyrl");
    pub const DESERET: Script = Script::from_tag(b"Dsrt");
    pub const DEVANAGARI: Script = Script::from_tag(b"Deva");
    pub const EGYPTIAN_HIEROGLYPHS: Script = Script::from_tag(b"Egyp");
    pub const ETHIOPIC: Script = Script::from_tag(b"Ethi");
    pub const GEORGIAN: Script = Script::from_tag(b"Geor");
    pub const GLAGOLITIC: Script = Script::from_tag(b"Glag");
    pub const GOTHIC: Script = Script::from_tag(b"Goth");
    pub const GREEK: Script = Script::from_tag(b"Grek");
    pub const GUJARATI: Script = Script::from_tag(b"Gujr");
    pub const GURMUKHI: Script = Script::from_tag(b"Guru");
    pub const HAN: Script = Script::from_tag(b"Hani");
    pub const HANGUL: Script = Script::from_tag(b"Hang");
    pub const HANUNOO: Script = Script::from_tag(b"Hano");
    pub const HEBREW: Script = Script::from_tag(b"Hebr");
    pub const HIRAGANA: Script = Script::from_tag(b"Hira");
    pub const JAVANESE: Script = Script::from_tag(b"Java");
    pub const KANNADA: Script = Script::from_tag(b"Knda");
    pub const KATAKANA: Script = Script::from_tag(b"Kana");
    pub const KAYAH_LI: Script = Script::from_tag(b"Kali");
    pub const KHAROSHTHI: Script = Script::from_tag(b"Khar");
    pub const KHMER: Script = Script::from_tag(b"Khmr");
    pub const LAO: Script = Script::from_tag(b"Laoo");
    pub const LATIN: Script = Script::from_tag(b"Latn");
    pub const LEPCHA: Script = Script::from_tag(b"Lepc");
    pub const LIMBU: Script = Script::from_tag(b"Limb");
    pub const LINEAR_B: Script = Script::from_tag(b"Linb");
    pub const LISU: Script = Script::from_tag(b"Lisu");
    pub const MALAYALAM: Script = Script::from_tag(b"Mlym");
    pub const MANDAIC: Script = Script::from_tag(b"Mand");
    pub const MEETEI_MAYEK: Script = Script::from_tag(b"Mtei");
    pub const MENDE_KIKAKUI: Script = Script::from_tag(b"Mend");
    pub const MONGOLIAN: Script = Script::from_tag(b"Mong");
    pub const MYANMAR: Script = Script::from_tag(b"Mymr");
    pub const NEW_TAI_LUE: Script = Script::from_tag(b"Talu");
    pub const NKO: Script = Script::from_tag(b"Nkoo");
    pub const OGHAM: Script = Script::from_tag(b"Ogam");
    pub const OL_CHIKI: Script = Script::from_tag(b"Olck");
    pub const OLD_ITALIC: Script = Script::from_tag(b"Ital");
    pub const OLD_PERSIAN: Script = Script::from_tag(b"Xpeo");
    pub const ORIYA: Script = Script::from_tag(b"Orya");
    pub const OSMANYA: Script = Script::from_tag(b"Osma");
    pub const PHAGS_PA: Script = Script::from_tag(b"Phag");
    pub const PHOENICIAN: Script = Script::from_tag(b"Phnx");
    pub const REJANG: Script = Script::from_tag(b"Rjng");
    pub const RUNIC: Script = Script::from_tag(b"Runr");
    pub const SAMARITAN: Script = Script::from_tag(b"Samr");
    pub const SAURASHTRA: Script = Script::from_tag(b"Saur");
    pub const SHAVIAN: Script = Script::from_tag(b"Shaw");
    pub const SINHALA: Script = Script::from_tag(b"Sinh");
    pub const SUNDANESE: Script = Script::from_tag(b"Sund");
    pub const SYLOTI_NAGRI: Script = Script::from_tag(b"Sylo");
    pub const SYRIAC: Script = Script::from_tag(b"Syrc");
    pub const TAGALOG: Script = Script::from_tag(b"Tglg");
    pub const TAGBANWA: Script = Script::from_tag(b"Tagb");
    pub const TAI_LE: Script = Script::from_tag(b"Tale");
    pub const TAI_THAM: Script = Script::from_tag(b"Lana");
    pub const TAI_VIET: Script = Script::from_tag(b"Tavt");
    pub const TAMIL: Script = Script::from_tag(b"Taml");
    pub const TELUGU: Script = Script::from_tag(b"Telu");
    pub const THAANA: Script = Script::from_tag(b"Thaa");
    pub const THAI: Script = Script::from_tag(b"Thai");
    pub const TIBETAN: Script = Script::from_tag(b"Tibt");
    pub const TIFINAGH: Script = Script::from_tag(b"Tfng");
    pub const UGARITIC: Script = Script::from_tag(b"Ugar");
    pub const VAI: Script = Script::from_tag(b"Vaii");
    pub const YI: Script = Script::from_tag(b"Yiii");
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.tag() {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// An inclusive range of code points assigned to one script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub start: u32,
    pub end: u32,
    pub script: Script,
}

const fn range(start: u32, end: u32, script: Script) -> ScriptRange {
    ScriptRange { start, end, script }
}

/// Sorted, non-overlapping script ranges. Code points outside every range
/// (unassigned blocks, surrogates, private use) belong to no script.
pub static SCRIPT_RANGES: &[ScriptRange] = &[
    range(0x0000, 0x0040, Script::COMMON),
    range(0x0041, 0x005A, Script::LATIN),
    range(0x005B, 0x0060, Script::COMMON),
    range(0x0061, 0x007A, Script::LATIN),
    range(0x007B, 0x00A9, Script::COMMON),
    range(0x00AA, 0x00AA, Script::LATIN),
    range(0x00AB, 0x00B9, Script::COMMON),
    range(0x00BA, 0x00BA, Script::LATIN),
    range(0x00BB, 0x00BF, Script::COMMON),
    range(0x00C0, 0x00D6, Script::LATIN),
    range(0x00D7, 0x00D7, Script::COMMON),
    range(0x00D8, 0x00F6, Script::LATIN),
    range(0x00F7, 0x00F7, Script::COMMON),
    range(0x00F8, 0x02B8, Script::LATIN),
    range(0x02B9, 0x02DF, Script::COMMON),
    range(0x02E0, 0x02E4, Script::LATIN),
    range(0x02E5, 0x02FF, Script::COMMON),
    range(0x0300, 0x036F, Script::INHERITED),
    range(0x0370, 0x0373, Script::GREEK),
    range(0x0374, 0x0374, Script::COMMON),
    range(0x0375, 0x03FF, Script::GREEK),
    range(0x0400, 0x052F, Script::CYRILLIC),
    range(0x0531, 0x058F, Script::ARMENIAN),
    range(0x0591, 0x05FF, Script::HEBREW),
    range(0x0600, 0x06FF, Script::ARABIC),
    range(0x0700, 0x074F, Script::SYRIAC),
    range(0x0750, 0x077F, Script::ARABIC),
    range(0x0780, 0x07BF, Script::THAANA),
    range(0x07C0, 0x07FF, Script::NKO),
    range(0x0800, 0x083F, Script::SAMARITAN),
    range(0x0840, 0x085F, Script::MANDAIC),
    range(0x0860, 0x086F, Script::SYRIAC),
    range(0x0870, 0x08FF, Script::ARABIC),
    range(0x0900, 0x097F, Script::DEVANAGARI),
    range(0x0980, 0x09FF, Script::BENGALI),
    range(0x0A00, 0x0A7F, Script::GURMUKHI),
    range(0x0A80, 0x0AFF, Script::GUJARATI),
    range(0x0B00, 0x0B7F, Script::ORIYA),
    range(0x0B80, 0x0BFF, Script::TAMIL),
    range(0x0C00, 0x0C7F, Script::TELUGU),
    range(0x0C80, 0x0CFF, Script::KANNADA),
    range(0x0D00, 0x0D7F, Script::MALAYALAM),
    range(0x0D80, 0x0DFF, Script::SINHALA),
    range(0x0E00, 0x0E7F, Script::THAI),
    range(0x0E80, 0x0EFF, Script::LAO),
    range(0x0F00, 0x0FFF, Script::TIBETAN),
    range(0x1000, 0x109F, Script::MYANMAR),
    range(0x10A0, 0x10FF, Script::GEORGIAN),
    range(0x1100, 0x11FF, Script::HANGUL),
    range(0x1200, 0x139F, Script::ETHIOPIC),
    range(0x13A0, 0x13FF, Script::CHEROKEE),
    range(0x1400, 0x167F, Script::CANADIAN_ABORIGINAL),
    range(0x1680, 0x169F, Script::OGHAM),
    range(0x16A0, 0x16FF, Script::RUNIC),
    range(0x1700, 0x171F, Script::TAGALOG),
    range(0x1720, 0x173F, Script::HANUNOO),
    range(0x1740, 0x175F, Script::BUHID),
    range(0x1760, 0x177F, Script::TAGBANWA),
    range(0x1780, 0x17FF, Script::KHMER),
    range(0x1800, 0x18AF, Script::MONGOLIAN),
    range(0x18B0, 0x18FF, Script::CANADIAN_ABORIGINAL),
    range(0x1900, 0x194F, Script::LIMBU),
    range(0x1950, 0x197F, Script::TAI_LE),
    range(0x1980, 0x19DF, Script::NEW_TAI_LUE),
    range(0x19E0, 0x19FF, Script::KHMER),
    range(0x1A00, 0x1A1F, Script::BUGINESE),
    range(0x1A20, 0x1AAF, Script::TAI_THAM),
    range(0x1AB0, 0x1AFF, Script::INHERITED),
    range(0x1B00, 0x1B7F, Script::BALINESE),
    range(0x1B80, 0x1BBF, Script::SUNDANESE),
    range(0x1BC0, 0x1BFF, Script::BATAK),
    range(0x1C00, 0x1C4F, Script::LEPCHA),
    range(0x1C50, 0x1C7F, Script::OL_CHIKI),
    range(0x1C80, 0x1C8F, Script::CYRILLIC),
    range(0x1C90, 0x1CBF, Script::GEORGIAN),
    range(0x1CC0, 0x1CCF, Script::SUNDANESE),
    range(0x1CD0, 0x1CFF, Script::INHERITED),
    range(0x1D00, 0x1DBF, Script::LATIN),
    range(0x1DC0, 0x1DFF, Script::INHERITED),
    range(0x1E00, 0x1EFF, Script::LATIN),
    range(0x1F00, 0x1FFF, Script::GREEK),
    range(0x2000, 0x20CF, Script::COMMON),
    range(0x20D0, 0x20FF, Script::INHERITED),
    range(0x2100, 0x27FF, Script::COMMON),
    range(0x2800, 0x28FF, Script::BRAILLE),
    range(0x2900, 0x2BFF, Script::COMMON),
    range(0x2C00, 0x2C5F, Script::GLAGOLITIC),
    range(0x2C60, 0x2C7F, Script::LATIN),
    range(0x2C80, 0x2CFF, Script::COPTIC),
    range(0x2D00, 0x2D2F, Script::GEORGIAN),
    range(0x2D30, 0x2D7F, Script::TIFINAGH),
    range(0x2D80, 0x2DDF, Script::ETHIOPIC),
    range(0x2DE0, 0x2DFF, Script::CYRILLIC),
    range(0x2E00, 0x2E7F, Script::COMMON),
    range(0x2E80, 0x2FDF, Script::HAN),
    range(0x2FF0, 0x303F, Script::COMMON),
    range(0x3041, 0x309F, Script::HIRAGANA),
    range(0x30A0, 0x30FF, Script::KATAKANA),
    range(0x3105, 0x312F, Script::BOPOMOFO),
    range(0x3131, 0x318F, Script::HANGUL),
    range(0x3190, 0x319F, Script::COMMON),
    range(0x31A0, 0x31BF, Script::BOPOMOFO),
    range(0x31C0, 0x31EF, Script::COMMON),
    range(0x31F0, 0x31FF, Script::KATAKANA),
    range(0x3200, 0x33FF, Script::COMMON),
    range(0x3400, 0x4DBF, Script::HAN),
    range(0x4DC0, 0x4DFF, Script::COMMON),
    range(0x4E00, 0x9FFF, Script::HAN),
    range(0xA000, 0xA4CF, Script::YI),
    range(0xA4D0, 0xA4FF, Script::LISU),
    range(0xA500, 0xA63F, Script::VAI),
    range(0xA640, 0xA69F, Script::CYRILLIC),
    range(0xA6A0, 0xA6FF, Script::BAMUM),
    range(0xA700, 0xA721, Script::COMMON),
    range(0xA722, 0xA7FF, Script::LATIN),
    range(0xA800, 0xA82F, Script::SYLOTI_NAGRI),
    range(0xA830, 0xA83F, Script::COMMON),
    range(0xA840, 0xA87F, Script::PHAGS_PA),
    range(0xA880, 0xA8DF, Script::SAURASHTRA),
    range(0xA8E0, 0xA8FF, Script::DEVANAGARI),
    range(0xA900, 0xA92F, Script::KAYAH_LI),
    range(0xA930, 0xA95F, Script::REJANG),
    range(0xA960, 0xA97F, Script::HANGUL),
    range(0xA980, 0xA9DF, Script::JAVANESE),
    range(0xA9E0, 0xA9FF, Script::MYANMAR),
    range(0xAA00, 0xAA5F, Script::CHAM),
    range(0xAA60, 0xAA7F, Script::MYANMAR),
    range(0xAA80, 0xAADF, Script::TAI_VIET),
    range(0xAAE0, 0xAAFF, Script::MEETEI_MAYEK),
    range(0xAB00, 0xAB2F, Script::ETHIOPIC),
    range(0xAB30, 0xAB6F, Script::LATIN),
    range(0xAB70, 0xABBF, Script::CHEROKEE),
    range(0xABC0, 0xABFF, Script::MEETEI_MAYEK),
    range(0xAC00, 0xD7FF, Script::HANGUL),
    range(0xF900, 0xFAFF, Script::HAN),
    range(0xFB00, 0xFB06, Script::LATIN),
    range(0xFB13, 0xFB17, Script::ARMENIAN),
    range(0xFB1D, 0xFB4F, Script::HEBREW),
    range(0xFB50, 0xFDFF, Script::ARABIC),
    range(0xFE00, 0xFE0F, Script::INHERITED),
    range(0xFE10, 0xFE1F, Script::COMMON),
    range(0xFE20, 0xFE2F, Script::INHERITED),
    range(0xFE30, 0xFE6F, Script::COMMON),
    range(0xFE70, 0xFEFF, Script::ARABIC),
    range(0xFF00, 0xFF20, Script::COMMON),
    range(0xFF21, 0xFF3A, Script::LATIN),
    range(0xFF3B, 0xFF40, Script::COMMON),
    range(0xFF41, 0xFF5A, Script::LATIN),
    range(0xFF5B, 0xFF65, Script::COMMON),
    range(0xFF66, 0xFF9D, Script::KATAKANA),
    range(0xFF9E, 0xFF9F, Script::COMMON),
    range(0xFFA0, 0xFFDF, Script::HANGUL),
    range(0xFFE0, 0xFFFF, Script::COMMON),
    range(0x10000, 0x100FF, Script::LINEAR_B),
    range(0x10100, 0x1013F, Script::COMMON),
    range(0x10140, 0x1018F, Script::GREEK),
    range(0x10300, 0x1032F, Script::OLD_ITALIC),
    range(0x10330, 0x1034F, Script::GOTHIC),
    range(0x10380, 0x1039F, Script::UGARITIC),
    range(0x103A0, 0x103DF, Script::OLD_PERSIAN),
    range(0x10400, 0x1044F, Script::DESERET),
    range(0x10450, 0x1047F, Script::SHAVIAN),
    range(0x10480, 0x104AF, Script::OSMANYA),
    range(0x10800, 0x1083F, Script::CYPRIOT),
    range(0x10900, 0x1091F, Script::PHOENICIAN),
    range(0x10A00, 0x10A5F, Script::KHAROSHTHI),
    range(0x11000, 0x1107F, Script::BRAHMI),
    range(0x12000, 0x1254F, Script::CUNEIFORM),
    range(0x13000, 0x1345F, Script::EGYPTIAN_HIEROGLYPHS),
    range(0x16800, 0x16A3F, Script::BAMUM),
    range(0x1B000, 0x1B0FF, Script::HIRAGANA),
    range(0x1D000, 0x1D24F, Script::COMMON),
    range(0x1D400, 0x1D7FF, Script::COMMON),
    range(0x1E800, 0x1E8DF, Script::MENDE_KIKAKUI),
    range(0x1E900, 0x1E95F, Script::ADLAM),
    range(0x1EE00, 0x1EEFF, Script::ARABIC),
    range(0x1F000, 0x1FAFF, Script::COMMON),
    range(0x20000, 0x2A6DF, Script::HAN),
    range(0x2A700, 0x2EBEF, Script::HAN),
    range(0x2F800, 0x2FA1F, Script::HAN),
    range(0x30000, 0x323AF, Script::HAN),
    range(0xE0001, 0xE007F, Script::COMMON),
    range(0xE0100, 0xE01EF, Script::INHERITED),
];

/// Returns the script of `r`, or [`Script::UNKNOWN`] for code points no
/// range claims.
pub fn lookup_script(r: char) -> Script {
    let r = u32::from(r);
    let pos = SCRIPT_RANGES.partition_point(|range| range.end < r);
    match SCRIPT_RANGES.get(pos) {
        Some(range) if range.start <= r => range.script,
        _ => Script::UNKNOWN,
    }
}

/// Sorted, duplicate-free set of scripts covered by a font
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSet(Vec<Script>);

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, script: Script) {
        if let Err(pos) = self.0.binary_search(&script) {
            self.0.insert(pos, script);
        }
    }

    pub fn contains(&self, script: Script) -> bool {
        self.0.binary_search(&script).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Script> + '_ {
        self.0.iter().copied()
    }

    /// Scripts used by `ranges`, which must be sorted, non-overlapping and
    /// inclusive.
    pub fn from_ranges(ranges: &[(u32, u32)]) -> Self {
        Self::from_ranges_with_table(ranges, SCRIPT_RANGES)
    }

    /// Same as [`ScriptSet::from_ranges`] against a custom sorted table.
    ///
    /// Both inputs are walked once; [`Script::UNKNOWN`] is added when some
    /// covered rune falls between two table entries or past the last one.
    pub fn from_ranges_with_table(ranges: &[(u32, u32)], table: &[ScriptRange]) -> Self {
        let mut out = Self::new();
        let mut has_unknown = false;
        let mut cursor = 0;

        for &(start, end) in ranges {
            while cursor < table.len() && table[cursor].end < start {
                cursor += 1;
            }

            // first rune of the current range not yet claimed by a table entry
            let mut next_uncovered = start;
            let mut i = cursor;
            while i < table.len() && table[i].start <= end {
                let item = table[i];
                if item.start > next_uncovered {
                    has_unknown = true;
                }
                out.insert(item.script);
                if item.end >= end {
                    next_uncovered = end.saturating_add(1);
                    break;
                }
                next_uncovered = item.end + 1;
                i += 1;
            }
            if next_uncovered <= end {
                has_unknown = true;
            }
        }

        if has_unknown {
            out.insert(Script::UNKNOWN);
        }
        out
    }

    /// Appends the binary form: u8 count followed by big-endian u32 codes.
    pub fn encode_into(&self, dst: &mut Vec<u8>) {
        let count = self.0.len().min(usize::from(u8::MAX));
        dst.push(count as u8);
        for script in &self.0[..count] {
            dst.extend_from_slice(&script.0.to_be_bytes());
        }
    }

    /// Reads the format written by [`ScriptSet::encode_into`], returning the
    /// set and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let Some(&count) = data.first() else {
            return Err(FontError::decode("script set (EOF)"));
        };
        let size = 1 + 4 * usize::from(count);
        if data.len() < size {
            return Err(FontError::decode("script set size (EOF)"));
        }
        let scripts = data[1..size]
            .chunks_exact(4)
            .map(|c| Script(u32::from_be_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Ok((Self(scripts), size))
    }
}

impl FromIterator<Script> for ScriptSet {
    fn from_iter<I: IntoIterator<Item = Script>>(iter: I) -> Self {
        let mut set = Self::new();
        for script in iter {
            set.insert(script);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[ScriptRange] = &[
        range(0x10, 0x1F, Script::LATIN),
        range(0x20, 0x2F, Script::GREEK),
        range(0x40, 0x4F, Script::CYRILLIC),
    ];

    #[test]
    fn test_table_is_sorted_and_disjoint() {
        for pair in SCRIPT_RANGES.windows(2) {
            assert!(pair[0].start <= pair[0].end, "{:x?}", pair[0]);
            assert!(pair[0].end < pair[1].start, "{:x?} / {:x?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_lookup_script() {
        assert_eq!(lookup_script('a'), Script::LATIN);
        assert_eq!(lookup_script(' '), Script::COMMON);
        assert_eq!(lookup_script('Ж'), Script::CYRILLIC);
        assert_eq!(lookup_script('中'), Script::HAN);
        assert_eq!(lookup_script('ひ'), Script::HIRAGANA);
        assert_eq!(lookup_script('\u{0301}'), Script::INHERITED);
        assert_eq!(lookup_script('\u{E000}'), Script::UNKNOWN);
        assert_eq!(lookup_script('\u{10FFFF}'), Script::UNKNOWN);
    }

    #[test]
    fn test_ranges_inside_one_script() {
        let set = ScriptSet::from_ranges_with_table(&[(0x11, 0x15), (0x18, 0x1F)], TABLE);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Script::LATIN]);
        assert!(!set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_contiguous_entries_have_no_gap() {
        let set = ScriptSet::from_ranges_with_table(&[(0x18, 0x25)], TABLE);
        assert!(set.contains(Script::LATIN));
        assert!(set.contains(Script::GREEK));
        assert!(!set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_range_straddling_a_gap() {
        let set = ScriptSet::from_ranges_with_table(&[(0x2E, 0x41)], TABLE);
        assert!(set.contains(Script::GREEK));
        assert!(set.contains(Script::CYRILLIC));
        assert!(set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_range_inside_a_gap() {
        let set = ScriptSet::from_ranges_with_table(&[(0x31, 0x35)], TABLE);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Script::UNKNOWN]);
    }

    #[test]
    fn test_range_before_and_after_table() {
        let set = ScriptSet::from_ranges_with_table(&[(0x00, 0x02)], TABLE);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Script::UNKNOWN]);

        let set = ScriptSet::from_ranges_with_table(&[(0x45, 0x60)], TABLE);
        assert!(set.contains(Script::CYRILLIC));
        assert!(set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_entry_shared_by_several_ranges() {
        let set = ScriptSet::from_ranges_with_table(&[(0x10, 0x11), (0x1E, 0x22), (0x24, 0x24)], TABLE);
        assert_eq!(set.iter().collect::<Vec<_>>().len(), 2);
        assert!(!set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_builtin_table() {
        let set = ScriptSet::from_ranges(&[(0x20, 0x7E), (0x0400, 0x04FF)]);
        assert!(set.contains(Script::COMMON));
        assert!(set.contains(Script::LATIN));
        assert!(set.contains(Script::CYRILLIC));
        assert!(!set.contains(Script::UNKNOWN));

        let set = ScriptSet::from_ranges(&[(0xE000, 0xE0FF)]);
        assert!(set.contains(Script::UNKNOWN));
    }

    #[test]
    fn test_encoding() {
        let set: ScriptSet = [Script::LATIN, Script::ARABIC, Script::LATIN].into_iter().collect();
        let mut bytes = Vec::new();
        set.encode_into(&mut bytes);
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[1..5], b"Arab");

        let (decoded, read) = ScriptSet::decode(&bytes).unwrap();
        assert_eq!(read, 9);
        assert_eq!(decoded, set);

        assert!(ScriptSet::decode(&[]).is_err());
        assert!(ScriptSet::decode(&bytes[..6]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Script::LATIN.to_string(), "Latn");
        assert_eq!(Script::UNKNOWN.to_string(), "Zzzz");
    }
}
