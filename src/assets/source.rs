use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::core::AssetKind;
use crate::foundation::error::TilerResult;
use crate::tools::ffmpeg::{ClipInfo, MediaTools, probe_clip};

const CLIP_EXTENSIONS: &[&str] = &["gif", "mp4", "webm", "mov", "mkv", "avi", "m4v"];

/// Decoded still image, straight-alpha RGBA8.
#[derive(Clone, Debug)]
pub struct RasterSource {
    /// Pixels. Shared so callers can convert one source several times without copying.
    pub image: Arc<RgbaImage>,
}

/// Encoded clip on disk plus its probed stream facts.
#[derive(Clone, Debug)]
pub struct ClipSource {
    /// Path of the encoded file. The clip backend copies it into its working directory.
    pub path: PathBuf,
    /// Probed stream facts.
    pub info: ClipInfo,
}

/// Immutable source media for one conversion.
#[derive(Clone, Debug)]
pub enum SourceAsset {
    /// Still image.
    Raster(RasterSource),
    /// Video or animation.
    Clip(ClipSource),
}

impl SourceAsset {
    /// Wrap an already decoded image.
    pub fn raster(image: RgbaImage) -> Self {
        Self::Raster(RasterSource {
            image: Arc::new(image),
        })
    }

    /// Decode encoded image bytes (format guessed from content).
    pub fn raster_from_bytes(bytes: &[u8]) -> TilerResult<Self> {
        let img = image::load_from_memory(bytes).context("decode image from memory")?;
        Ok(Self::raster(img.to_rgba8()))
    }

    /// Probe a clip file with `ffprobe`.
    pub fn clip(path: impl Into<PathBuf>, tools: &MediaTools) -> TilerResult<Self> {
        Self::clip_with_deadline(path, tools, None)
    }

    /// Probe a clip file, killing `ffprobe` once `deadline` passes.
    pub fn clip_with_deadline(
        path: impl Into<PathBuf>,
        tools: &MediaTools,
        deadline: Option<Instant>,
    ) -> TilerResult<Self> {
        let path = path.into();
        let info = probe_clip(tools, &path, deadline)?;
        Ok(Self::Clip(ClipSource { path, info }))
    }

    /// Open `path` as a clip or raster depending on its extension.
    pub fn open(path: &Path, tools: &MediaTools) -> TilerResult<Self> {
        Self::open_with_deadline(path, tools, None)
    }

    /// Like [`SourceAsset::open`], with clip probing bounded by `deadline`.
    pub fn open_with_deadline(
        path: &Path,
        tools: &MediaTools,
        deadline: Option<Instant>,
    ) -> TilerResult<Self> {
        match classify_path(path) {
            AssetKind::Clip => Self::clip_with_deadline(path, tools, deadline),
            AssetKind::Raster => {
                let img = image::ImageReader::open(path)
                    .with_context(|| format!("open image '{}'", path.display()))?
                    .with_guessed_format()
                    .with_context(|| format!("sniff image format of '{}'", path.display()))?
                    .decode()
                    .with_context(|| format!("decode image '{}'", path.display()))?;
                Ok(Self::raster(img.to_rgba8()))
            }
        }
    }

    /// Raster or clip.
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Raster(_) => AssetKind::Raster,
            Self::Clip(_) => AssetKind::Clip,
        }
    }

    /// Native width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Self::Raster(r) => r.image.width(),
            Self::Clip(c) => c.info.width,
        }
    }

    /// Native height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Self::Raster(r) => r.image.height(),
            Self::Clip(c) => c.info.height,
        }
    }

    /// Clip duration, when known. Always `None` for rasters.
    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            Self::Raster(_) => None,
            Self::Clip(c) => c.info.duration_secs,
        }
    }
}

/// Classify a file by extension. Unknown extensions are treated as rasters.
pub fn classify_path(path: &Path) -> AssetKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext {
        Some(e) if CLIP_EXTENSIONS.contains(&e.as_str()) => AssetKind::Clip,
        _ => AssetKind::Raster,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
