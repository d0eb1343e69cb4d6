use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::TileFormat;
use crate::foundation::error::TilerResult;
use crate::pipeline::convert::ConversionResult;

/// File name of the manifest written next to the tiles.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Layout of a written tile set.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TileManifest {
    /// Tiled raster width before padding.
    pub width: u32,
    /// Tiled raster height before padding.
    pub height: u32,
    /// Grid columns.
    pub cols: u32,
    /// Grid rows.
    pub rows: u32,
    /// Tile side in pixels.
    pub tile_side: u32,
    /// Tile encoding.
    pub format: TileFormat,
    /// One entry per tile, row-major.
    pub tiles: Vec<ManifestEntry>,
}

/// One written tile.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    /// 0-based row.
    pub row: u32,
    /// 0-based column.
    pub col: u32,
    /// File name relative to the output directory.
    pub file: String,
    /// Encoded size.
    pub bytes: usize,
}

/// Write every tile plus [`MANIFEST_FILE`] into `dir`, creating it if needed.
pub fn write_tiles(result: &ConversionResult, dir: &Path) -> TilerResult<TileManifest> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output directory '{}'", dir.display()))?;

    for tile in result {
        let path = dir.join(tile.file_name());
        std::fs::write(&path, &tile.bytes)
            .with_context(|| format!("write tile '{}'", path.display()))?;
    }

    let manifest = result.manifest();
    let json = serde_json::to_vec_pretty(&manifest).context("serialize tile manifest")?;
    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;

    tracing::debug!(dir = %dir.display(), tiles = result.len(), "tiles written");
    Ok(manifest)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/output.rs"]
mod tests;
