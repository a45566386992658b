//! System font scanning
//!
//! Walks font directories and summarizes every font file into footprints.
//! Files whose modification time did not change since the previous index
//! are not opened again: their footprints are copied from that index.

use crate::footprint::Footprint;
use crate::matcher::FontSet;
use crate::serialize::index_file_path;
use crate::{FontError, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// The footprints of one file, as found by the scanner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFootprints {
    pub path: String,
    /// Modification time, in nanoseconds since the Unix epoch
    pub modified: i64,
    /// Empty for files which are not fonts, so that they are not
    /// parsed again by the next scan
    pub footprints: Vec<Footprint>,
}

/// Scanned footprints, grouped by file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemFontsIndex(Vec<FileFootprints>);

impl SystemFontsIndex {
    pub fn from_files(files: Vec<FileFootprints>) -> Self {
        Self(files)
    }

    pub fn files(&self) -> &[FileFootprints] {
        &self.0
    }

    /// Number of footprints across all files
    pub fn footprint_count(&self) -> usize {
        self.0.iter().map(|f| f.footprints.len()).sum()
    }

    /// All footprints, in file order
    pub fn flatten(&self) -> FontSet {
        self.0.iter().flat_map(|f| f.footprints.iter().cloned()).collect()
    }

    /// Check that at least one footprint can be loaded from disk
    pub fn assert_valid(&self) -> Result<()> {
        let loadable = self
            .0
            .iter()
            .flat_map(|f| f.footprints.iter())
            .any(|fp| fp.load_from_disk().is_ok());
        if loadable {
            Ok(())
        } else {
            Err(FontError::NoValidFont)
        }
    }

    /// Scan `dirs`, reusing the entries of `self` for unchanged files
    pub fn rescan(&self, dirs: &[PathBuf]) -> Self {
        let mut scanner = FootprintScanner::new(self);
        for dir in dirs {
            scanner.scan_directory(dir);
        }
        scanner.finish()
    }
}

/// Files which are never fonts: hidden files, encodings, metrics, bitmap
/// and Type 1 fonts
pub fn ignore_font_file(name: &str) -> bool {
    const IGNORED: &[&str] = &[
        ".enc.gz", ".afm", ".pfm", ".dir", ".scale", ".alias", ".pcf", ".pcf.gz", ".pfb",
    ];
    name.is_empty() || name.starts_with('.') || IGNORED.iter().any(|ext| name.ends_with(ext))
}

fn modification_time(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
}

/// Incremental scanner accumulating the footprints of visited files
pub struct FootprintScanner {
    previous: HashMap<String, FileFootprints>,
    dst: Vec<FileFootprints>,
    visited_files: HashSet<PathBuf>,
    visited_dirs: HashSet<PathBuf>,
    /// Number of files actually opened and parsed
    pub parsed_files: usize,
}

impl FootprintScanner {
    pub fn new(previous: &SystemFontsIndex) -> Self {
        Self {
            previous: previous
                .files()
                .iter()
                .map(|f| (f.path.clone(), f.clone()))
                .collect(),
            dst: Vec::new(),
            visited_files: HashSet::new(),
            visited_dirs: HashSet::new(),
            parsed_files: 0,
        }
    }

    pub fn finish(self) -> SystemFontsIndex {
        SystemFontsIndex(self.dst)
    }

    /// Recursively scan `dir`. Errors are logged and the offending entry
    /// skipped.
    pub fn scan_directory(&mut self, dir: &Path) {
        // symbolic links may loop back to a parent
        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.visited_dirs.insert(canonical) {
            return;
        }

        let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(err) => {
                tracing::warn!("error walking font directory {:?}: {}", dir, err);
                return;
            }
        };
        // deterministic output for identical directories
        entries.sort();

        for path in entries {
            // follows symbolic links
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!("skipping {:?}: {}", path, err);
                    continue;
                }
            };
            if meta.is_dir() {
                self.scan_directory(&path);
                continue;
            }
            let ignored = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(true, ignore_font_file);
            if ignored || !self.visited_files.insert(path.clone()) {
                continue;
            }
            if let Err(err) = self.consume(&path, &meta) {
                tracing::warn!("skipping font file {:?}: {}", path, err);
            }
        }
    }

    fn consume(&mut self, path: &Path, meta: &fs::Metadata) -> Result<()> {
        let path_str = path.to_string_lossy().into_owned();
        let modified = modification_time(meta);

        if let Some(indexed) = self.previous.get(&path_str) {
            if indexed.modified == modified {
                self.dst.push(indexed.clone());
                return Ok(());
            }
        }

        let data = fs::read(path)?;
        self.parsed_files += 1;
        let footprints = match Footprint::from_file_data(&data, &path_str) {
            Ok(footprints) => footprints,
            Err(err) => {
                tracing::debug!("not a font file: {}", err);
                Vec::new()
            }
        };
        self.dst.push(FileFootprints {
            path: path_str,
            modified,
            footprints,
        });
        Ok(())
    }
}

/// Refresh the index stored in `cache_dir` against `dirs`
///
/// A missing, outdated or corrupted index file only costs a full scan. The
/// refreshed index is written back; failing to write it is not fatal.
pub fn refresh_system_index(cache_dir: &Path, dirs: &[PathBuf]) -> Result<SystemFontsIndex> {
    let cache_file = index_file_path(cache_dir);
    let previous = match SystemFontsIndex::read_from_file(&cache_file) {
        Ok(index) => index,
        Err(FontError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no font index at {:?}, scanning", cache_file);
            SystemFontsIndex::default()
        }
        Err(err) => {
            tracing::info!("font index {:?} rejected ({}), rescanning", cache_file, err);
            SystemFontsIndex::default()
        }
    };

    let index = previous.rescan(dirs);
    index.assert_valid()?;

    if let Err(err) = index.write_to_file(&cache_file) {
        tracing::warn!("unable to save font index {:?}: {}", cache_file, err);
    }
    tracing::info!(
        "font index: {} files, {} faces",
        index.files().len(),
        index.footprint_count()
    );
    Ok(index)
}

/// Default location of the index, under the user cache directory
pub fn default_cache_dir() -> Result<PathBuf> {
    if cfg!(target_os = "android") {
        return Err(FontError::CacheDirectory(
            "no default cache directory on Android, one must be provided".into(),
        ));
    }
    dirs::cache_dir()
        .map(|dir| dir.join("font_map"))
        .ok_or_else(|| FontError::CacheDirectory("user cache directory unknown".into()))
}
