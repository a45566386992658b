//! Concurrent first use of the process-wide system font index
//!
//! The index is built once per process, so this file holds a single test.

mod common;

use common::TestFont;
use font_map::serialize::index_file_path;
use font_map::{FontMap, FontMapConfig};
use std::fs;
use std::sync::Barrier;
use std::thread;

const THREADS: usize = 8;

fn footprint_counts(config: &FontMapConfig) -> Vec<usize> {
    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    let mut map = FontMap::with_config(config.clone());
                    barrier.wait();
                    map.use_system_fonts(None).unwrap();
                    map.len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn test_concurrent_callers_share_one_scan() {
    let fonts = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    fs::write(fonts.path().join("sans.ttf"), TestFont::new("Noto Sans").range('a', 'z').build()).unwrap();
    fs::write(fonts.path().join("serif.ttf"), TestFont::new("Noto Serif").range('a', 'z').build()).unwrap();
    fs::write(fonts.path().join("mono.ttf"), TestFont::new("Noto Sans Mono").range('0', '9').build()).unwrap();

    let config = FontMapConfig {
        cache_dir: Some(cache.path().to_path_buf()),
        font_dirs: Some(vec![fonts.path().to_path_buf()]),
        ..FontMapConfig::default()
    };

    let counts = footprint_counts(&config);
    assert_eq!(counts, vec![3; THREADS]);

    let index_file = index_file_path(cache.path());
    let written = fs::metadata(&index_file).unwrap().modified().unwrap();
    let bytes = fs::read(&index_file).unwrap();

    // later callers reuse the shared index without touching the cache file
    let counts = footprint_counts(&config);
    assert_eq!(counts, vec![3; THREADS]);
    assert_eq!(fs::metadata(&index_file).unwrap().modified().unwrap(), written);
    assert_eq!(fs::read(&index_file).unwrap(), bytes);
}
