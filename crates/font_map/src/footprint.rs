//! Font footprints
//!
//! A footprint is the lightweight summary of a face kept in the index: enough
//! to decide whether the face is worth loading for a given query and rune.

use crate::aspect::{normalize_family, Aspect, AspectHint, Stretch, Style, Weight};
use crate::coverage::RuneCoverage;
use crate::face::{collection_len, Face};
use crate::script::ScriptSet;
use crate::{FontError, Result};
use rustybuzz::ttf_parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a face comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path, or the caller supplied identifier for in-memory fonts
    pub file: String,
    /// Index of the face in a collection
    pub index: u16,
    /// Index of the named instance in a variable font
    pub instance: u16,
}

impl Location {
    pub fn new(file: impl Into<String>, index: u16) -> Self {
        Self {
            file: file.into(),
            index,
            instance: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file, self.index)?;
        if self.instance != 0 {
            write!(f, ":{}", self.instance)?;
        }
        Ok(())
    }
}

/// Summary of one face
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub location: Location,
    /// Normalized family name
    pub family: String,
    pub runes: RuneCoverage,
    pub scripts: ScriptSet,
    pub aspect: Aspect,
    /// Added through `add_font`/`add_face` rather than found by a scan
    pub is_user_provided: bool,
}

impl Footprint {
    /// Summarize a parsed face
    ///
    /// `family` overrides the family name read from the `name` table.
    pub fn from_tables(face: &ttf_parser::Face<'_>, location: Location, family: Option<&str>) -> Self {
        let family = match family {
            Some(family) if !family.is_empty() => family.to_string(),
            _ => family_name(face).unwrap_or_default(),
        };
        Self::with_description(face, location, &family, read_aspect(face))
    }

    /// Summarize a face whose metadata is already known
    pub fn with_description(
        face: &ttf_parser::Face<'_>,
        location: Location,
        family: &str,
        aspect: Aspect,
    ) -> Self {
        let ranges = cmap_ranges(face);
        Self {
            location,
            family: normalize_family(family),
            runes: RuneCoverage::from_ranges(&ranges),
            scripts: ScriptSet::from_ranges(&ranges),
            aspect: aspect.with_defaults(),
            is_user_provided: false,
        }
    }

    /// Summarize every face of a font file
    ///
    /// Faces which cannot be parsed are skipped.
    pub fn from_file_data(data: &[u8], file: &str) -> Result<Vec<Self>> {
        let count = match collection_len(data)? {
            Some(count) => count,
            None => {
                let face = ttf_parser::Face::parse(data, 0)
                    .map_err(|err| FontError::UnsupportedResource(format!("{}: {}", file, err)))?;
                return Ok(vec![Self::from_tables(&face, Location::new(file, 0), None)]);
            }
        };
        let mut out = Vec::with_capacity(count as usize);
        for index in 0..count {
            match ttf_parser::Face::parse(data, index) {
                Ok(face) => out.push(Self::from_tables(&face, Location::new(file, index as u16), None)),
                Err(err) => tracing::debug!("{}: skipping face {}: {}", file, index, err),
            }
        }
        Ok(out)
    }

    /// Read the face back from its file
    pub fn load_from_disk(&self) -> Result<Face> {
        let data = std::fs::read(&self.location.file)?;
        Face::from_data(Arc::new(data), u32::from(self.location.index))
    }
}

/// Family name, preferring the typographic family over the legacy one
pub fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    find_name(face, ttf_parser::name_id::TYPOGRAPHIC_FAMILY)
        .or_else(|| find_name(face, ttf_parser::name_id::FAMILY))
}

fn style_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    find_name(face, ttf_parser::name_id::TYPOGRAPHIC_SUBFAMILY)
        .or_else(|| find_name(face, ttf_parser::name_id::SUBFAMILY))
}

fn find_name(face: &ttf_parser::Face<'_>, name_id: u16) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == name_id && name.is_unicode())
        .find_map(|name| name.to_string())
        .filter(|name| !name.is_empty())
}

/// Aspect from the `OS/2` table, completed with what the style name tells.
pub fn read_aspect(face: &ttf_parser::Face<'_>) -> Aspect {
    let mut hint = AspectHint::default();
    if let Some(os2) = face.tables().os2 {
        hint.style = Some(match os2.style() {
            ttf_parser::Style::Normal => Style::Normal,
            ttf_parser::Style::Italic => Style::Italic,
            ttf_parser::Style::Oblique => Style::Oblique,
        });
        let weight = os2.weight().to_number();
        if weight != 0 {
            hint.weight = Some(Weight(weight));
        }
        hint.stretch = Some(Stretch::from_width_class(os2.width().to_number()));
    }
    if let Some(name) = style_name(face) {
        hint.infer_from_style_name(&name);
    }
    hint.resolve()
}

/// Sorted, coalesced ranges of the code points mapped by the Unicode
/// `cmap` subtables.
pub fn cmap_ranges(face: &ttf_parser::Face<'_>) -> Vec<(u32, u32)> {
    let mut codepoints = Vec::new();
    if let Some(cmap) = face.tables().cmap {
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|cp| {
                if cp <= u32::from(char::MAX) {
                    codepoints.push(cp);
                }
            });
        }
    }
    codepoints.sort_unstable();
    codepoints.dedup();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for cp in codepoints {
        match ranges.last_mut() {
            Some(last) if last.1 + 1 == cp => last.1 = cp,
            _ => ranges.push((cp, cp)),
        }
    }
    ranges
}
