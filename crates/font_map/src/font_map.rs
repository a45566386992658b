//! Per-rune font resolution
//!
//! [`FontMap`] owns the footprints of the system fonts and of the fonts added
//! by the caller. For a [`Query`] and a rune, it returns the face to shape the
//! rune with, falling back through family substitutions, user fonts and
//! script coverage until some face is found.

use crate::aspect::Aspect;
use crate::discovery::default_font_directories;
use crate::face::{Description, Face, FaceId};
use crate::footprint::{Footprint, Location};
use crate::lru::{CacheStats, RuneLru, DEFAULT_RUNE_CACHE_SIZE};
use crate::matcher::{FontSet, Query};
use crate::scan::{default_cache_dir, refresh_system_index, SystemFontsIndex};
use crate::script::{lookup_script, Script};
use crate::{FontError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

static SYSTEM_FONTS: OnceLock<SystemFontsIndex> = OnceLock::new();
static SYSTEM_FONTS_INIT: Mutex<()> = Mutex::new(());

/// Scan the system fonts the first time it is called, then return the
/// shared index. A failed scan is retried by the next call.
fn system_fonts(cache_dir: &Path, font_dirs: Option<&[PathBuf]>) -> Result<&'static SystemFontsIndex> {
    if let Some(index) = SYSTEM_FONTS.get() {
        return Ok(index);
    }
    // concurrent first callers wait for the single scan
    let _guard = SYSTEM_FONTS_INIT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(index) = SYSTEM_FONTS.get() {
        return Ok(index);
    }

    let dirs = match font_dirs {
        Some(dirs) if !dirs.is_empty() => dirs.to_vec(),
        Some(_) => return Err(FontError::NoFontDirectory),
        None => default_font_directories()?,
    };
    let index = refresh_system_index(cache_dir, &dirs)?;
    Ok(SYSTEM_FONTS.get_or_init(|| index))
}

/// Configuration for the font map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMapConfig {
    /// Maximum number of cached rune resolutions
    pub rune_cache_size: usize,
    /// Directory holding the system font index; the user cache
    /// directory when `None`
    pub cache_dir: Option<PathBuf>,
    /// Directories to scan instead of the platform ones
    pub font_dirs: Option<Vec<PathBuf>>,
}

impl Default for FontMapConfig {
    fn default() -> Self {
        Self {
            rune_cache_size: DEFAULT_RUNE_CACHE_SIZE,
            cache_dir: None,
            font_dirs: None,
        }
    }
}

impl FontMapConfig {
    /// Load the configuration from a JSON file, using the defaults when the
    /// file is missing or invalid
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!("no font map configuration at {:?}: {}", path, err);
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("invalid font map configuration {:?}: {}", path, err);
                Self::default()
            }
        }
    }
}

/// Footprint indices matching the current query
#[derive(Debug, Default)]
struct Candidates {
    /// Best exact match of each requested family
    without_fallback: Vec<Option<usize>>,
    /// Matches of each requested family after substitutions
    with_fallback: Vec<Vec<usize>>,
    /// User provided fonts, whatever their family
    manual: Vec<usize>,
}

/// Metadata of a face handed out by the map
#[derive(Debug, Clone)]
struct FaceMeta {
    location: Location,
    family: String,
    aspect: Aspect,
}

/// Font selection for text shaping
///
/// A `FontMap` is not meant to be shared between threads: resolving a rune
/// updates its caches. The index of the system fonts is built once per
/// process and shared by every map.
pub struct FontMap {
    config: FontMapConfig,
    fonts: FontSet,
    /// Footprint indices by supported script
    script_map: HashMap<Script, Vec<usize>>,
    /// Faces already loaded, by location
    faces: HashMap<Location, Face>,
    meta: HashMap<FaceId, FaceMeta>,
    /// Returned when nothing better is found
    first_face: Option<Face>,
    lru: RuneLru,
    query: Query,
    candidates: Candidates,
    built: bool,
}

impl FontMap {
    /// Create an empty font map with the default configuration
    pub fn new() -> Self {
        Self::with_config(FontMapConfig::default())
    }

    /// Create an empty font map with the given configuration
    pub fn with_config(config: FontMapConfig) -> Self {
        Self {
            lru: RuneLru::new(config.rune_cache_size),
            config,
            fonts: FontSet::new(),
            script_map: HashMap::new(),
            faces: HashMap::new(),
            meta: HashMap::new(),
            first_face: None,
            query: Query::new([""], Aspect::default()),
            candidates: Candidates::default(),
            built: false,
        }
    }

    pub fn config(&self) -> &FontMapConfig {
        &self.config
    }

    /// Change the capacity of the rune cache, dropping its content
    pub fn set_rune_cache_size(&mut self, size: usize) {
        self.config.rune_cache_size = size;
        self.lru.set_capacity(size);
    }

    /// Get the rune cache statistics
    pub fn rune_cache_stats(&self) -> CacheStats {
        self.lru.stats()
    }

    /// Number of known footprints
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Distinct normalized families, in insertion order
    pub fn families(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.fonts
            .iter()
            .map(|fp| fp.family.as_str())
            .filter(|family| seen.insert(*family))
            .collect()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Make the system fonts available
    ///
    /// The font directories are scanned once per process; the resulting
    /// index is stored in `cache_dir` (or the configured cache directory,
    /// or the user cache directory) so that following launches only look
    /// at modified files.
    pub fn use_system_fonts(&mut self, cache_dir: Option<&Path>) -> Result<()> {
        let cache_dir = match cache_dir.or(self.config.cache_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => default_cache_dir()?,
        };
        let index = system_fonts(&cache_dir, self.config.font_dirs.as_deref())?;
        self.append_footprints(index.flatten());
        self.invalidate();
        Ok(())
    }

    /// Add the faces of a font file or collection
    ///
    /// `file_id` identifies the resource in [`FontMap::font_location`].
    /// A non-empty `family` replaces the family names found in the font.
    pub fn add_font(&mut self, data: Vec<u8>, file_id: &str, family: Option<&str>) -> Result<()> {
        let faces = Face::collection(Arc::new(data))?;
        if faces.is_empty() {
            return Err(FontError::EmptyResource(format!("{}: no usable face", file_id)));
        }

        let mut added = 0;
        for face in faces {
            let Some(tables) = face.tables() else {
                continue;
            };
            let index = u16::try_from(face.index()).unwrap_or(u16::MAX);
            let mut fp = Footprint::from_tables(&tables, Location::new(file_id, index), family);
            fp.is_user_provided = true;
            drop(tables);
            self.cache(&fp, face);
            self.append_footprint(fp);
            added += 1;
        }
        if added == 0 {
            return Err(FontError::EmptyResource(format!("{}: no usable face", file_id)));
        }
        tracing::debug!("added {} face(s) from {}", added, file_id);
        self.invalidate();
        Ok(())
    }

    /// Add an already loaded face
    ///
    /// The description is trusted: it is not checked against the font.
    pub fn add_face(&mut self, face: Face, description: Description) {
        let location = Location::new(face.id().to_string(), 0);
        let Some(tables) = face.tables() else {
            tracing::warn!("ignoring face {}: tables are not readable", description);
            return;
        };
        let mut fp = Footprint::with_description(&tables, location, &description.family, description.aspect);
        fp.is_user_provided = true;
        drop(tables);
        self.cache(&fp, face);
        self.append_footprint(fp);
        self.invalidate();
    }

    /// Location of a face returned by [`FontMap::resolve_face`]
    pub fn font_location(&self, face: &Face) -> Option<&Location> {
        self.meta.get(&face.id()).map(|meta| &meta.location)
    }

    /// Normalized family and aspect of a face returned by
    /// [`FontMap::resolve_face`]
    pub fn font_metadata(&self, face: &Face) -> Option<(&str, Aspect)> {
        self.meta
            .get(&face.id())
            .map(|meta| (meta.family.as_str(), meta.aspect))
    }

    /// Set the query used by the following calls to
    /// [`FontMap::resolve_face`]
    pub fn set_query(&mut self, mut query: Query) {
        if query.families.is_empty() {
            query.families.push(String::new());
        }
        self.query = query;
        self.built = false;
    }

    /// Face to use for `r`
    ///
    /// Only `None` when no font at all is known.
    pub fn resolve_face(&mut self, r: char) -> Option<Face> {
        let aspect = self.query.aspect;
        if let Some(face) = self.lru.get(&self.query.families, aspect, r) {
            return Some(face);
        }
        let face = self.resolve_uncached(r)?;
        self.lru.insert(&self.query.families, aspect, r, face.clone());
        Some(face)
    }

    fn resolve_uncached(&mut self, r: char) -> Option<Face> {
        self.build_candidates();

        let exact: Vec<usize> = self.candidates.without_fallback.iter().flatten().copied().collect();
        for index in exact {
            if let Some(face) = self.resolve_for_rune(&[index], r) {
                return Some(face);
            }
        }

        let with_fallback = std::mem::take(&mut self.candidates.with_fallback);
        let found = with_fallback
            .iter()
            .find_map(|candidates| self.resolve_for_rune(candidates, r));
        self.candidates.with_fallback = with_fallback;
        if found.is_some() {
            return found;
        }

        let manual = std::mem::take(&mut self.candidates.manual);
        let found = self.resolve_for_rune(&manual, r);
        self.candidates.manual = manual;
        if found.is_some() {
            return found;
        }

        let script = lookup_script(r);
        tracing::debug!(
            "no font matched {:?} for {:?} (U+{:04X}), searching by script {} and aspect",
            self.query.families,
            r,
            r as u32,
            script
        );
        if let Some(script_candidates) = self.script_map.get(&script).cloned() {
            let mut by_aspect = script_candidates.clone();
            self.fonts.retain_best_matches(&mut by_aspect, &self.query.aspect);
            if let Some(face) = self.resolve_for_rune(&by_aspect, r) {
                return Some(face);
            }
            tracing::debug!(
                "no font matched aspect {} for script {}, searching by script only",
                self.query.aspect,
                script
            );
            let others: Vec<usize> = script_candidates
                .into_iter()
                .filter(|index| !by_aspect.contains(index))
                .collect();
            if let Some(face) = self.resolve_for_rune(&others, r) {
                return Some(face);
            }
        }

        tracing::debug!("no font matched script {} for U+{:04X}, using an arbitrary face", script, r as u32);
        self.arbitrary_face()
    }

    fn arbitrary_face(&mut self) -> Option<Face> {
        if let Some(face) = &self.first_face {
            return Some(face.clone());
        }
        for index in 0..self.fonts.len() {
            if let Some(face) = self.load_font(index) {
                return Some(face);
            }
        }
        None
    }

    /// First candidate supporting `r` which can be loaded
    fn resolve_for_rune(&mut self, candidates: &[usize], r: char) -> Option<Face> {
        for &index in candidates {
            if !self.fonts[index].runes.contains(r) {
                continue;
            }
            if let Some(face) = self.load_font(index) {
                return Some(face);
            }
        }
        None
    }

    fn load_font(&mut self, index: usize) -> Option<Face> {
        let fp = &self.fonts[index];
        if let Some(face) = self.faces.get(&fp.location) {
            return Some(face.clone());
        }
        match fp.load_from_disk() {
            Ok(face) => {
                let fp = fp.clone();
                self.cache(&fp, face.clone());
                Some(face)
            }
            Err(err) => {
                tracing::warn!("failed loading face {}: {}", fp.location, err);
                None
            }
        }
    }

    fn cache(&mut self, fp: &Footprint, face: Face) {
        if self.first_face.is_none() {
            self.first_face = Some(face.clone());
        }
        self.meta.insert(
            face.id(),
            FaceMeta {
                location: fp.location.clone(),
                family: fp.family.clone(),
                aspect: fp.aspect,
            },
        );
        self.faces.insert(fp.location.clone(), face);
    }

    fn build_candidates(&mut self) {
        if self.built {
            return;
        }
        let aspect = self.query.aspect;
        let families = &self.query.families;

        let mut without_fallback = Vec::with_capacity(families.len());
        let mut with_fallback = Vec::with_capacity(families.len());
        for family in families {
            let mut exact = self.fonts.select_by_family(family, false);
            self.fonts.retain_best_matches(&mut exact, &aspect);
            // only the best face of an exact family is tried
            without_fallback.push(exact.first().copied());

            let mut substituted = self.fonts.select_by_family(family, true);
            self.fonts.retain_best_matches(&mut substituted, &aspect);
            with_fallback.push(substituted);
        }

        let mut manual = self.fonts.user_provided();
        self.fonts.retain_best_matches(&mut manual, &aspect);

        self.candidates = Candidates {
            without_fallback,
            with_fallback,
            manual,
        };
        self.built = true;
    }

    fn append_footprints(&mut self, footprints: FontSet) {
        for fp in footprints.iter() {
            self.append_footprint(fp.clone());
        }
    }

    fn append_footprint(&mut self, fp: Footprint) {
        let scripts: Vec<Script> = fp.scripts.iter().collect();
        let index = self.fonts.push(fp);
        for script in scripts {
            self.script_map.entry(script).or_default().push(index);
        }
    }

    fn invalidate(&mut self) {
        self.built = false;
        self.lru.clear();
    }
}

impl Default for FontMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMap")
            .field("footprints", &self.fonts.len())
            .field("loaded_faces", &self.faces.len())
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspect::{Style, Weight};
    use crate::coverage::RuneCoverage;
    use crate::script::ScriptSet;

    fn footprint(family: &str, runes: &str, aspect: Aspect, user: bool) -> Footprint {
        let runes: RuneCoverage = runes.chars().collect();
        let ranges = runes.ranges();
        Footprint {
            location: Location::new(family, 0),
            family: crate::aspect::normalize_family(family),
            scripts: ScriptSet::from_ranges(&ranges),
            runes,
            aspect,
            is_user_provided: user,
        }
    }

    /// Register a footprint with a placeholder face, as if it had been
    /// loaded already
    fn add(map: &mut FontMap, fp: Footprint) -> Face {
        let face = Face::unchecked(Arc::new(Vec::new()), 0);
        map.cache(&fp, face.clone());
        map.append_footprint(fp);
        map.invalidate();
        face
    }

    #[test]
    fn test_config_defaults() {
        let config = FontMapConfig::default();
        assert_eq!(config.rune_cache_size, DEFAULT_RUNE_CACHE_SIZE);
        assert!(config.cache_dir.is_none());
        assert!(config.font_dirs.is_none());
    }

    #[test]
    fn test_config_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fonts.json");
        std::fs::write(&path, r#"{"rune_cache_size": 12}"#).unwrap();
        let config = FontMapConfig::load(&path);
        assert_eq!(config.rune_cache_size, 12);
        assert!(config.font_dirs.is_none());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FontMapConfig::load(&path), FontMapConfig::default());
        assert_eq!(FontMapConfig::load(&dir.path().join("missing.json")), FontMapConfig::default());
    }

    #[test]
    fn test_empty_map_resolves_nothing() {
        let mut map = FontMap::new();
        assert!(map.is_empty());
        assert!(map.resolve_face('a').is_none());
    }

    #[test]
    fn test_empty_query_families() {
        let mut map = FontMap::new();
        map.set_query(Query::new(Vec::<String>::new(), Aspect::default()));
        assert_eq!(map.query().families, vec![String::new()]);
    }

    #[test]
    fn test_substituted_family_covers_rune() {
        let mut map = FontMap::new();
        let arial = add(&mut map, footprint("Arial", "A", Aspect::default(), false));
        let arimo = add(&mut map, footprint("Arimo", "AB", Aspect::default(), false));
        map.set_query(Query::new(["Arial"], Aspect::default()));

        assert_eq!(map.resolve_face('A'), Some(arial));
        assert_eq!(map.resolve_face('B'), Some(arimo.clone()));
        assert_eq!(map.font_metadata(&arimo), Some(("arimo", Aspect::default())));
        assert_eq!(map.font_location(&arimo), Some(&Location::new("Arimo", 0)));
    }

    #[test]
    fn test_exact_family_prefers_best_aspect() {
        let mut map = FontMap::new();
        let regular = add(&mut map, footprint("Foo", "a", Aspect::default(), false));
        let bold_aspect = Aspect::default().with_weight(Weight::BOLD);
        let bold = add(&mut map, footprint("Foo", "a", bold_aspect, false));

        map.set_query(Query::new(["foo"], bold_aspect));
        assert_eq!(map.resolve_face('a'), Some(bold));
        map.set_query(Query::new(["foo"], Aspect::default()));
        assert_eq!(map.resolve_face('a'), Some(regular));
    }

    #[test]
    fn test_manual_fonts_before_script_fallback() {
        let mut map = FontMap::new();
        add(&mut map, footprint("System", "xyz", Aspect::default(), false));
        let user = add(&mut map, footprint("Mine", "xyz", Aspect::default(), true));
        map.set_query(Query::new(["unknown"], Aspect::default()));
        assert_eq!(map.resolve_face('x'), Some(user));
    }

    #[test]
    fn test_script_fallback() {
        let mut map = FontMap::new();
        add(&mut map, footprint("Latin", "a", Aspect::default(), false));
        let regular = add(&mut map, footprint("Greek", "\u{3b2}", Aspect::default(), false));
        let italic = Aspect::default().with_style(Style::Italic);
        let greek_italic = add(&mut map, footprint("Greek Italic", "\u{3b1}", italic, false));
        map.set_query(Query::new(["unknown"], Aspect::default()));

        assert_eq!(map.resolve_face('\u{3b2}'), Some(regular));
        // the regular face lacks the rune, any aspect is then accepted
        assert_eq!(map.resolve_face('\u{3b1}'), Some(greek_italic));
    }

    #[test]
    fn test_arbitrary_face_as_last_resort() {
        let mut map = FontMap::new();
        let first = add(&mut map, footprint("Foo", "a", Aspect::default(), false));
        add(&mut map, footprint("Bar", "b", Aspect::default(), false));
        map.set_query(Query::new(["nothing"], Aspect::default()));
        assert_eq!(map.resolve_face('\u{4e00}'), Some(first));
    }

    #[test]
    fn test_resolutions_are_cached() {
        let mut map = FontMap::new();
        add(&mut map, footprint("Foo", "a", Aspect::default(), false));
        map.set_query(Query::new(["foo"], Aspect::default()));
        let first = map.resolve_face('a');
        let second = map.resolve_face('a');
        assert_eq!(first, second);
        assert_eq!(map.rune_cache_stats().hits, 1);

        add(&mut map, footprint("Bar", "a", Aspect::default(), false));
        map.resolve_face('a');
        assert_eq!(map.rune_cache_stats().hits, 1);
    }

    #[test]
    fn test_families_are_distinct() {
        let mut map = FontMap::new();
        add(&mut map, footprint("Foo", "a", Aspect::default(), false));
        add(&mut map, footprint("Bar", "a", Aspect::default(), false));
        add(&mut map, footprint("foo", "b", Aspect::default(), false));
        assert_eq!(map.families(), vec!["foo", "bar"]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_unknown_face_has_no_metadata() {
        let map = FontMap::new();
        let face = Face::unchecked(Arc::new(Vec::new()), 0);
        assert!(map.font_location(&face).is_none());
        assert!(map.font_metadata(&face).is_none());
    }

    #[test]
    fn test_add_font_rejects_garbage() {
        let mut map = FontMap::new();
        let err = map.add_font(b"not a font".to_vec(), "junk", None).unwrap_err();
        assert!(matches!(err, FontError::UnsupportedResource(_)));
        assert!(map.is_empty());
    }
}
