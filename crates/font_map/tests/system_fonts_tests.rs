//! Integration test for the process-wide system font index
//!
//! The index is built once per process, so this file holds a single test.

mod common;

use common::TestFont;
use font_map::{Aspect, FontMap, FontMapConfig, Query};
use std::fs;

#[test]
fn test_system_fonts_are_shared() {
    let fonts = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    fs::write(fonts.path().join("dejavu.ttf"), TestFont::new("DejaVu Sans").range('a', 'z').build()).unwrap();
    fs::write(fonts.path().join("mono.ttf"), TestFont::new("DejaVu Sans Mono").range('a', 'z').build()).unwrap();

    let config = FontMapConfig {
        cache_dir: Some(cache.path().to_path_buf()),
        font_dirs: Some(vec![fonts.path().to_path_buf()]),
        ..FontMapConfig::default()
    };

    let mut first = FontMap::with_config(config.clone());
    first.use_system_fonts(None).unwrap();
    assert_eq!(first.len(), 2);
    assert!(font_map::serialize::index_file_path(cache.path()).exists());

    // the second map reuses the index built by the first one
    let mut second = FontMap::with_config(config);
    second.use_system_fonts(None).unwrap();
    assert_eq!(second.len(), 2);

    second.set_query(Query::new(["monospace"], Aspect::default()));
    let face = second.resolve_face('m').unwrap();
    assert_eq!(second.font_metadata(&face).unwrap().0, "dejavusansmono");

    second.set_query(Query::new(["sans-serif"], Aspect::default()));
    let face = second.resolve_face('m').unwrap();
    assert_eq!(second.font_metadata(&face).unwrap().0, "dejavusans");
}
