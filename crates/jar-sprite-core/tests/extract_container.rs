use image::{ImageFormat, Rgba, RgbaImage};
use jar_sprite_core::error::SpriteError;
use jar_sprite_core::prelude::*;
use jar_sprite_core::validate_container_path;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

fn build_jar(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zw = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zw.add_directory(*name, opts).expect("add dir");
        } else {
            zw.start_file(*name, opts).expect("start file");
            zw.write_all(bytes).expect("write entry");
        }
    }
    zw.finish().expect("finish zip").into_inner()
}

fn sample_jar() -> Vec<u8> {
    build_jar(&[
        ("META-INF/", vec![]),
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ("assets/", vec![]),
        ("assets/gui/zeta.png", png_bytes(16, 16, [255, 0, 0, 255])),
        ("com/example/Main.class", vec![0xCA, 0xFE, 0xBA, 0xBE]),
        ("assets/items/alpha.png", png_bytes(64, 32, [0, 255, 0, 255])),
        ("readme.txt", b"not an image".to_vec()),
        ("assets/items/upper.PNG", png_bytes(8, 8, [0, 0, 255, 255])),
        ("mid.png", png_bytes(32, 32, [9, 9, 9, 9])),
    ])
}

#[test]
fn only_png_entries_in_enumeration_order() {
    let cfg = SpriteConfig::default();
    let ex = AssetExtractor::from_reader(Cursor::new(sample_jar()), &cfg).expect("open");
    let names: Vec<&str> = ex.image_entries().collect();
    assert_eq!(
        names,
        vec!["assets/gui/zeta.png", "assets/items/alpha.png", "mid.png"]
    );
    let images = ex.extract().expect("extract");
    let keys: Vec<&str> = images.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(images[1].path, "assets/items/alpha.png");
    assert_eq!((images[1].image.width(), images[1].image.height()), (64, 32));
}

#[test]
fn events_are_reported_per_entry() {
    let cfg = SpriteConfig::default();
    let ex = AssetExtractor::from_reader(Cursor::new(sample_jar()), &cfg).expect("open");
    let mut seen = Vec::new();
    ex.extract_with(|ev| {
        if let ExtractEvent::Decoded { key, width, .. } = ev {
            seen.push((key.to_string(), width));
        }
    })
    .expect("extract");
    assert_eq!(
        seen,
        vec![("zeta".into(), 16), ("alpha".into(), 64), ("mid".into(), 32)]
    );
}

#[test]
fn decode_failure_aborts_by_default() {
    let jar = build_jar(&[
        ("a.png", png_bytes(4, 4, [1, 2, 3, 255])),
        ("broken.png", b"definitely not a png".to_vec()),
        ("c.png", png_bytes(4, 4, [1, 2, 3, 255])),
    ]);
    let cfg = SpriteConfig::default();
    let ex = AssetExtractor::from_reader(Cursor::new(jar), &cfg).expect("open");
    match ex.extract() {
        Err(SpriteError::Decode { entry, .. }) => assert_eq!(entry, "broken.png"),
        other => panic!("expected Decode error, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn decode_failure_can_be_skipped() {
    let jar = build_jar(&[
        ("a.png", png_bytes(4, 4, [1, 2, 3, 255])),
        ("broken.png", b"definitely not a png".to_vec()),
        ("c.png", png_bytes(4, 4, [1, 2, 3, 255])),
    ]);
    let cfg = SpriteConfig::builder()
        .on_decode_error(DecodeErrorPolicy::Skip)
        .build();
    let ex = AssetExtractor::from_reader(Cursor::new(jar), &cfg).expect("open");
    let mut skipped = Vec::new();
    let images = ex
        .extract_with(|ev| {
            if let ExtractEvent::Skipped { path, error } = ev {
                assert_eq!(error.category(), "decode error");
                skipped.push(path.to_string());
            }
        })
        .expect("extract");
    let keys: Vec<&str> = images.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "c"]);
    assert_eq!(skipped, vec!["broken.png"]);
}

#[test]
fn include_and_exclude_globs() {
    let cfg = SpriteConfig::builder()
        .include(vec!["assets/**".into()])
        .exclude(vec!["**/gui/**".into()])
        .build();
    let ex = AssetExtractor::from_reader(Cursor::new(sample_jar()), &cfg).expect("open");
    let names: Vec<&str> = ex.image_entries().collect();
    assert_eq!(names, vec!["assets/items/alpha.png"]);
}

#[test]
fn invalid_glob_is_reported() {
    let cfg = SpriteConfig::builder().include(vec!["a[".into()]).build();
    match AssetExtractor::from_reader(Cursor::new(sample_jar()), &cfg) {
        Err(SpriteError::Pattern(_)) => {}
        Err(e) => panic!("expected Pattern error, got {e}"),
        Ok(_) => panic!("expected Pattern error"),
    }
}

#[test]
fn custom_image_suffix() {
    let cfg = SpriteConfig::builder().image_suffix(".PNG").build();
    let ex = AssetExtractor::from_reader(Cursor::new(sample_jar()), &cfg).expect("open");
    let images = ex.extract().expect("extract");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].key, "upper");
}

#[test]
fn missing_container_is_an_open_error() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("nope.jar");
    match AssetExtractor::open(&path, &SpriteConfig::default()) {
        Err(e @ SpriteError::ContainerOpen { .. }) => {
            assert_eq!(e.category(), "container open error")
        }
        Err(e) => panic!("expected ContainerOpen, got {e}"),
        Ok(_) => panic!("expected ContainerOpen"),
    }
}

#[test]
fn corrupt_container_is_a_format_error() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("garbage.jar");
    std::fs::write(&path, b"this is not a zip archive at all").expect("write");
    match AssetExtractor::open(&path, &SpriteConfig::default()) {
        Err(e) => assert_eq!(e.category(), "container open error", "got {e}"),
        Ok(_) => panic!("garbage must not open as a container"),
    }
}

#[test]
fn container_suffix_is_checked() {
    let cfg = SpriteConfig::default();
    assert!(validate_container_path(Path::new("/tmp/icons.jar"), &cfg).is_ok());
    match validate_container_path(Path::new("/tmp/icons.zip"), &cfg) {
        Err(e @ SpriteError::InvalidInputExtension { .. }) => {
            assert_eq!(e.category(), "invalid input extension");
            assert!(e.to_string().contains(".jar"));
        }
        other => panic!("expected InvalidInputExtension, got {:?}", other),
    }
    // suffix match is case-sensitive
    assert!(validate_container_path(Path::new("ICONS.JAR"), &cfg).is_err());
}

/// Rewrites the uncompressed size recorded for `entry` in the central directory.
fn patch_declared_size(jar: &mut [u8], entry: &str, size: u32) {
    let sig = [0x50, 0x4b, 0x01, 0x02];
    let mut i = 0;
    while i + 46 <= jar.len() {
        if jar[i..i + 4] == sig {
            let name_len = u16::from_le_bytes([jar[i + 28], jar[i + 29]]) as usize;
            if &jar[i + 46..i + 46 + name_len] == entry.as_bytes() {
                jar[i + 24..i + 28].copy_from_slice(&size.to_le_bytes());
                return;
            }
        }
        i += 1;
    }
    panic!("entry {entry} not in central directory");
}

#[test]
fn oversized_declared_entry_does_not_abort_extraction() {
    let mut jar = build_jar(&[
        ("huge.png", png_bytes(4, 4, [9, 9, 9, 255])),
        ("good.png", png_bytes(4, 4, [1, 2, 3, 255])),
    ]);
    patch_declared_size(&mut jar, "huge.png", 0xFFFF_FFF0);
    let cfg = SpriteConfig::builder()
        .on_decode_error(DecodeErrorPolicy::Skip)
        .build();
    match AssetExtractor::from_reader(Cursor::new(jar), &cfg) {
        Ok(ex) => {
            let images = ex.extract().expect("extract");
            assert!(images.iter().any(|img| img.key == "good"));
            assert!(images.len() <= 2);
        }
        // rejecting the archive up front is fine too, as long as it is an error
        Err(e) => assert_eq!(e.category(), "container open error"),
    }
}
