//! Media backends that turn a source plus resolved geometry into encoded tiles.
//!
//! Both variants sit behind [`TileBackend`]:
//!
//! - [`raster::RasterBackend`]: in-memory keying, resize, crop and PNG encode.
//! - [`clip::ClipBackend`]: `ffmpeg` invocations inside a scoped working directory.

use std::time::Instant;

use crate::assets::source::SourceAsset;
use crate::effects::keying::KeyingSpec;
use crate::foundation::core::{AssetKind, Constraints, TileFormat};
use crate::foundation::error::{TilerError, TilerResult};
use crate::layout::grid::TileGrid;
use crate::layout::resolver::ResolvedDimensions;

/// `ffmpeg`-driven clip backend.
pub mod clip;
/// In-memory raster backend.
pub mod raster;

/// One encoded tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileDescriptor {
    /// 0-based row.
    pub row: u32,
    /// 0-based column.
    pub col: u32,
    /// Payload encoding.
    pub format: TileFormat,
    /// Encoded payload.
    pub bytes: Vec<u8>,
}

impl TileDescriptor {
    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return `true` for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Output file name, `tile{row}_{col}.{ext}`.
    pub fn file_name(&self) -> String {
        format!("tile{}_{}.{}", self.row, self.col, self.format.extension())
    }
}

/// Everything a backend needs for one conversion, besides the source.
pub struct TileJob<'a> {
    /// Platform limits.
    pub constraints: &'a Constraints,
    /// Target geometry from the resolver.
    pub resolved: &'a ResolvedDimensions,
    /// Optional background keying.
    pub keying: Option<&'a KeyingSpec>,
    /// Pool used for per-tile work.
    pub pool: &'a rayon::ThreadPool,
    /// Conversion deadline; external tools are killed once it passes.
    pub deadline: Option<Instant>,
}

/// Backend output: the grid actually tiled plus its tiles in row-major order.
#[derive(Clone, Debug)]
pub struct Materialized {
    /// Grid over the achieved raster size.
    pub grid: TileGrid,
    /// Tiles, row-major.
    pub tiles: Vec<TileDescriptor>,
}

/// Capability boundary for crop-and-encode.
pub trait TileBackend: Send + Sync {
    /// Source kind this backend accepts.
    fn kind(&self) -> AssetKind;

    /// Encoding of the produced tiles.
    fn format(&self) -> TileFormat;

    /// Produce every tile of the grid, row-major.
    fn materialize(&self, source: &SourceAsset, job: &TileJob<'_>) -> TilerResult<Materialized>;
}

/// Backend for a source kind.
pub fn create_backend(kind: AssetKind, clip_opts: &clip::ClipEncodeOpts) -> Box<dyn TileBackend> {
    match kind {
        AssetKind::Raster => Box::new(raster::RasterBackend::new()),
        AssetKind::Clip => Box::new(clip::ClipBackend::new(clip_opts.clone())),
    }
}

/// Build the per-conversion worker pool. `None` uses rayon defaults.
pub fn build_thread_pool(threads: Option<usize>) -> TilerResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TilerError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        TilerError::conversion(format!("failed to build rayon thread pool: {e}"))
    })
}

/// Collect per-tile results in order, keeping the first error.
pub(crate) fn collect_tiles(
    results: Vec<TilerResult<TileDescriptor>>,
) -> TilerResult<Vec<TileDescriptor>> {
    let mut tiles = Vec::with_capacity(results.len());
    for item in results {
        tiles.push(item?);
    }
    Ok(tiles)
}

#[cfg(test)]
#[path = "../../tests/unit/backend/mod.rs"]
mod tests;
