//! Integration tests for the system font index
//!
//! Font directories are built in temporary directories with synthesized
//! fonts, then scanned and cached like the system ones.

mod common;

use common::TestFont;
use font_map::scan::{refresh_system_index, FootprintScanner};
use font_map::serialize::{index_file_path, INDEX_FORMAT_VERSION};
use font_map::{FontError, Script, SystemFontsIndex};
use std::fs;
use std::path::{Path, PathBuf};

fn font_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("latin.ttf"), TestFont::new("Latin Sans").range('a', 'z').build()).unwrap();
    fs::create_dir(dir.path().join("greek")).unwrap();
    fs::write(
        dir.path().join("greek").join("greek.otf"),
        TestFont::new("Greek Serif").range('\u{3b1}', '\u{3c9}').italic().build(),
    )
    .unwrap();
    fs::write(dir.path().join("README"), "not a font").unwrap();
    fs::write(dir.path().join("fonts.dir"), "ignored").unwrap();
    dir
}

fn index_bytes(cache_dir: &Path) -> Vec<u8> {
    fs::read(index_file_path(cache_dir)).unwrap()
}

#[test]
fn test_scan_summarizes_fonts() {
    let fonts = font_dir();
    let index = SystemFontsIndex::default().rescan(&[fonts.path().to_path_buf()]);

    // README is recorded without footprints; fonts.dir is ignored
    assert_eq!(index.files().len(), 3);
    assert_eq!(index.footprint_count(), 2);

    let set = index.flatten();
    let greek = set.iter().find(|fp| fp.family == "greekserif").unwrap();
    assert!(greek.runes.contains('\u{3b2}'));
    assert!(!greek.runes.contains('a'));
    assert!(greek.scripts.contains(Script::GREEK));
    assert!(!greek.is_user_provided);
    assert!(greek.load_from_disk().is_ok());

    index.assert_valid().unwrap();
}

#[test]
fn test_incremental_scan_is_stable() {
    let fonts = font_dir();
    let cache = tempfile::tempdir().unwrap();
    let dirs = [fonts.path().to_path_buf()];

    let first = refresh_system_index(cache.path(), &dirs).unwrap();
    let first_bytes = index_bytes(cache.path());

    let second = refresh_system_index(cache.path(), &dirs).unwrap();
    assert_eq!(first, second);
    assert_eq!(index_bytes(cache.path()), first_bytes);

    // nothing changed: no file is opened again
    let mut scanner = FootprintScanner::new(&second);
    scanner.scan_directory(fonts.path());
    assert_eq!(scanner.parsed_files, 0);
    assert_eq!(scanner.finish().to_bytes(), first.to_bytes());
}

#[test]
fn test_corrupted_cache_triggers_rescan() {
    let fonts = font_dir();
    let cache = tempfile::tempdir().unwrap();
    let dirs = [fonts.path().to_path_buf()];

    fs::write(index_file_path(cache.path()), b"garbage").unwrap();
    let index = refresh_system_index(cache.path(), &dirs).unwrap();
    assert_eq!(index.footprint_count(), 2);

    // the rejected file was replaced by a valid index
    let reloaded = SystemFontsIndex::read_from_file(&index_file_path(cache.path())).unwrap();
    assert_eq!(reloaded, index);
}

#[test]
fn test_other_version_is_rejected() {
    let mut bytes = SystemFontsIndex::default().to_bytes();
    bytes[0..2].copy_from_slice(&(INDEX_FORMAT_VERSION + 1).to_be_bytes());
    let err = SystemFontsIndex::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        FontError::VersionMismatch { found, expected } if found == INDEX_FORMAT_VERSION + 1 && expected == INDEX_FORMAT_VERSION
    ));
}

#[test]
fn test_modified_file_is_parsed_again() {
    let fonts = font_dir();
    let dirs = [fonts.path().to_path_buf()];
    let first = SystemFontsIndex::default().rescan(&dirs);

    let path = fonts.path().join("latin.ttf");
    fs::write(&path, TestFont::new("Latin Sans").range('a', 'c').build()).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(10))
        .unwrap();

    let mut scanner = FootprintScanner::new(&first);
    scanner.scan_directory(fonts.path());
    assert_eq!(scanner.parsed_files, 1);
    let second = scanner.finish();
    let latin = second.flatten().iter().find(|fp| fp.family == "latinsans").cloned().unwrap();
    assert!(latin.runes.contains('b'));
    assert!(!latin.runes.contains('z'));
}

#[test]
fn test_directory_without_fonts_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "no fonts here").unwrap();
    let cache = tempfile::tempdir().unwrap();
    let result = refresh_system_index(cache.path(), &[PathBuf::from(dir.path())]);
    assert!(matches!(result, Err(FontError::NoValidFont)));
}
