use std::io::Cursor;

use image::Rgba;

use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn classify_by_extension() {
    assert_eq!(classify_path(Path::new("a/b/clip.MP4")), AssetKind::Clip);
    assert_eq!(classify_path(Path::new("anim.gif")), AssetKind::Clip);
    assert_eq!(classify_path(Path::new("sticker.webm")), AssetKind::Clip);
    assert_eq!(classify_path(Path::new("photo.jpg")), AssetKind::Raster);
    assert_eq!(classify_path(Path::new("noext")), AssetKind::Raster);
}

#[test]
fn raster_from_png_bytes_keeps_size_and_alpha() {
    let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let src = SourceAsset::raster_from_bytes(&buf).unwrap();
    assert_eq!(src.kind(), AssetKind::Raster);
    assert_eq!((src.width(), src.height()), (3, 2));
    assert_eq!(src.duration_secs(), None);
    let SourceAsset::Raster(r) = src else {
        panic!("expected raster");
    };
    assert_eq!(*r.image.get_pixel(2, 1), Rgba([1, 2, 3, 4]));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let err = SourceAsset::raster_from_bytes(b"definitely not an image").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn clip_accessors_read_probe_info() {
    let src = SourceAsset::Clip(ClipSource {
        path: PathBuf::from("in.webm"),
        info: ClipInfo {
            width: 512,
            height: 512,
            duration_secs: Some(2.5),
            codec_name: Some("vp9".to_string()),
        },
    });
    assert_eq!(src.kind(), AssetKind::Clip);
    assert_eq!((src.width(), src.height()), (512, 512));
    assert_eq!(src.duration_secs(), Some(2.5));
}

#[test]
fn open_reports_missing_raster_file() {
    let err = SourceAsset::open(Path::new("does/not/exist.png"), &MediaTools::new()).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.png"));
}

#[test]
fn expired_deadline_stops_clip_probe_before_spawn() {
    let tools = MediaTools {
        ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
        ffprobe: PathBuf::from("/definitely/not/ffprobe"),
    };
    let deadline = Instant::now();
    let err = SourceAsset::open_with_deadline(Path::new("in.webm"), &tools, Some(deadline))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    assert!(err.to_string().contains("deadline elapsed"), "{err}");
}
