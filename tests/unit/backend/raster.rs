use image::{Rgba, RgbaImage};

use super::*;
use crate::backend::build_thread_pool;
use crate::effects::keying::KeyingSpec;
use crate::foundation::core::Constraints;
use crate::layout::resolver::resolve_dimensions;

fn solid(w: u32, h: u32, px: [u8; 4]) -> SourceAsset {
    SourceAsset::raster(RgbaImage::from_pixel(w, h, Rgba(px)))
}

fn decode(tile: &TileDescriptor) -> RgbaImage {
    image::load_from_memory_with_format(&tile.bytes, ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[test]
fn wide_image_is_resized_and_cut_into_png_tiles() {
    let constraints = Constraints::default();
    let source = solid(1600, 400, [200, 10, 10, 255]);
    let resolved = resolve_dimensions(&constraints, 1600, 400, None).unwrap();
    let pool = build_thread_pool(Some(2)).unwrap();
    let job = TileJob {
        constraints: &constraints,
        resolved: &resolved,
        keying: None,
        pool: &pool,
        deadline: None,
    };

    let out = RasterBackend::new().materialize(&source, &job).unwrap();
    assert_eq!((out.grid.cols, out.grid.rows), (8, 2));
    assert_eq!(out.tiles.len(), 16);
    assert_eq!((out.tiles[9].row, out.tiles[9].col), (1, 1));
    for tile in &out.tiles {
        assert_eq!(tile.format, TileFormat::Png);
        let img = decode(tile);
        assert_eq!(img.dimensions(), (100, 100));
        assert_eq!(*img.get_pixel(50, 50), Rgba([200, 10, 10, 255]));
    }
}

#[test]
fn partial_edge_tiles_are_padded_transparent() {
    let constraints = Constraints::default();
    let source = solid(150, 80, [0, 0, 255, 255]);
    let resolved = resolve_dimensions(&constraints, 150, 80, None).unwrap();
    assert!(resolved.is_passthrough());
    let pool = build_thread_pool(Some(1)).unwrap();
    let job = TileJob {
        constraints: &constraints,
        resolved: &resolved,
        keying: None,
        pool: &pool,
        deadline: None,
    };

    let out = RasterBackend::new().materialize(&source, &job).unwrap();
    assert_eq!(out.tiles.len(), 2);
    let edge = decode(&out.tiles[1]);
    assert_eq!(edge.get_pixel(10, 10).0, [0, 0, 255, 255]);
    assert_eq!(edge.get_pixel(60, 10).0[3], 0);
    assert_eq!(edge.get_pixel(10, 90).0[3], 0);
}

#[test]
fn keying_clears_background_before_tiling() {
    let constraints = Constraints::default();
    let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 255, 0, 255]));
    img.put_pixel(50, 50, Rgba([255, 255, 255, 255]));
    let source = SourceAsset::raster(img);
    let resolved = resolve_dimensions(&constraints, 100, 100, None).unwrap();
    let spec = KeyingSpec::new([0, 255, 0], 0.1, 0.0).unwrap();
    let pool = build_thread_pool(Some(1)).unwrap();
    let job = TileJob {
        constraints: &constraints,
        resolved: &resolved,
        keying: Some(&spec),
        pool: &pool,
        deadline: None,
    };

    let out = RasterBackend::new().materialize(&source, &job).unwrap();
    let tile = decode(&out.tiles[0]);
    assert_eq!(tile.get_pixel(0, 0).0[3], 0);
    assert_eq!(tile.get_pixel(50, 50).0, [255, 255, 255, 255]);
}

#[test]
fn clip_source_is_rejected() {
    let constraints = Constraints::default();
    let resolved = resolve_dimensions(&constraints, 100, 100, None).unwrap();
    let source = SourceAsset::Clip(crate::assets::source::ClipSource {
        path: "clip.webm".into(),
        info: crate::tools::ffmpeg::ClipInfo {
            width: 100,
            height: 100,
            duration_secs: None,
            codec_name: None,
        },
    });
    let pool = build_thread_pool(Some(1)).unwrap();
    let job = TileJob {
        constraints: &constraints,
        resolved: &resolved,
        keying: None,
        pool: &pool,
        deadline: None,
    };
    let err = RasterBackend::new().materialize(&source, &job).unwrap_err();
    assert!(matches!(err, TilerError::Validation(_)));
}

#[test]
fn nearest_filter_never_blends_colors() {
    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    let constraints = Constraints::default();
    let img = RgbaImage::from_fn(1600, 400, |x, _| Rgba(if x < 800 { RED } else { BLUE }));
    let source = SourceAsset::raster(img);
    let resolved = resolve_dimensions(&constraints, 1600, 400, None).unwrap();
    let pool = build_thread_pool(Some(2)).unwrap();
    let job = TileJob {
        constraints: &constraints,
        resolved: &resolved,
        keying: None,
        pool: &pool,
        deadline: None,
    };

    let out = RasterBackend::with_filter(FilterType::Nearest)
        .materialize(&source, &job)
        .unwrap();
    assert_eq!(out.tiles.len(), 16);
    for tile in &out.tiles {
        let img = decode(tile);
        assert!(img.pixels().all(|p| p.0 == RED || p.0 == BLUE));
    }
    assert_eq!(decode(&out.tiles[3]).get_pixel(50, 50).0, RED);
    assert_eq!(decode(&out.tiles[4]).get_pixel(50, 50).0, BLUE);
}
