//! Font Map - Font indexing, family substitution, and per-rune face resolution
//!
//! This crate builds a lightweight index of the fonts installed on the
//! system, and selects for each rune of a text the face that should render
//! it, following CSS font matching and fontconfig-like family substitutions.
//!
//! # Modules
//!
//! - `aspect`: Style, weight and stretch of a face
//! - `coverage`: Compact sets of supported runes
//! - `script`: Unicode scripts and script sets
//! - `face`: Loaded faces
//! - `footprint`: Face summaries stored in the index
//! - `substitutions`: Family substitution rules
//! - `matcher`: Font set and CSS aspect matching
//! - `lru`: Cache of rune resolutions
//! - `discovery`: Platform font directories and fontconfig files
//! - `scan`: Incremental system font scanning
//! - `serialize`: Binary format of the index
//! - `font_map`: Per-rune face resolution

mod error;
pub mod aspect;
pub mod coverage;
pub mod discovery;
pub mod face;
pub mod font_map;
pub mod footprint;
pub mod lru;
pub mod matcher;
pub mod scan;
pub mod script;
pub mod serialize;
pub mod substitutions;

pub use error::*;

// Re-export commonly used types from submodules
pub use aspect::{normalize_family, Aspect, Stretch, Style, Weight};
pub use coverage::RuneCoverage;
pub use face::{Description, Face, FaceId};
pub use font_map::{FontMap, FontMapConfig};
pub use footprint::{Footprint, Location};
pub use lru::CacheStats;
pub use matcher::{FontSet, Query};
pub use scan::{FileFootprints, SystemFontsIndex};
pub use script::{lookup_script, Script, ScriptSet};
