use image::RgbaImage;

use super::*;
use crate::assets::source::SourceAsset;
use crate::pipeline::convert::{ConvertOpts, convert};

#[test]
fn writes_tiles_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("tiles");
    let source = SourceAsset::raster(RgbaImage::new(250, 120));
    let result = convert(&source, &ConvertOpts::default()).unwrap();

    let manifest = write_tiles(&result, &out).unwrap();
    assert_eq!((manifest.cols, manifest.rows), (3, 2));
    assert_eq!(manifest.format, TileFormat::Png);

    for entry in &manifest.tiles {
        let bytes = std::fs::read(out.join(&entry.file)).unwrap();
        assert_eq!(bytes.len(), entry.bytes);
    }

    let on_disk: TileManifest =
        serde_json::from_slice(&std::fs::read(out.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(on_disk, manifest);
}

#[test]
fn unwritable_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let source = SourceAsset::raster(RgbaImage::new(100, 100));
    let result = convert(&source, &ConvertOpts::default()).unwrap();

    let err = write_tiles(&result, &blocker.join("out")).unwrap_err();
    assert!(format!("{err:#}").contains("create output directory"), "{err:#}");
}
