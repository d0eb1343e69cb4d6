use std::time::{Duration, Instant};

use crate::assets::source::SourceAsset;
use crate::backend::clip::ClipEncodeOpts;
use crate::backend::{Materialized, TileDescriptor, TileJob, build_thread_pool, create_backend};
use crate::effects::keying::KeyingSpec;
use crate::foundation::core::{Constraints, TileFormat};
use crate::foundation::error::{TilerError, TilerResult};
use crate::layout::grid::TileGrid;
use crate::layout::resolver::{ResolvedDimensions, UserOverride, resolve_dimensions};
use crate::pipeline::output::{ManifestEntry, TileManifest};
use crate::validate::budget::validate_tile_budget;

/// Options for one conversion.
///
/// Deserializable from JSON; every field is optional:
///
/// ```json
/// { "override": { "width": 300 }, "keying": { "color": [0, 255, 0], "similarity": 10 },
///   "timeout_secs": 60, "threads": 4, "clip": { "crf": 36 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertOpts {
    /// Requested output size.
    #[serde(rename = "override")]
    pub user_override: Option<UserOverride>,
    /// Background keying applied before tiling.
    pub keying: Option<KeyingSpec>,
    /// Wall-clock limit for the whole conversion.
    pub timeout_secs: Option<f64>,
    /// Worker threads for per-tile work. `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Clip encoder settings. Ignored for raster sources.
    pub clip: ClipEncodeOpts,
}

impl ConvertOpts {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate option values.
    pub fn validate(&self) -> TilerResult<()> {
        if let Some(k) = &self.keying {
            k.validate()?;
        }
        if let Some(t) = self.timeout_secs
            && (!t.is_finite() || t <= 0.0)
        {
            return Err(TilerError::validation(format!(
                "timeout_secs must be finite and > 0, got {t}"
            )));
        }
        if self.threads == Some(0) {
            return Err(TilerError::validation("'threads' must be >= 1 when set"));
        }
        self.clip.validate()
    }

    /// Conversion timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs_f64)
    }
}

/// What a conversion would do, without touching any media.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConversionPlan {
    /// Resolved size and resize steps.
    pub resolved: ResolvedDimensions,
    /// Grid over the resolved size.
    pub grid: TileGrid,
    /// Number of tiles.
    pub tiles: usize,
}

/// Resolve dimensions and grid for a `width x height` source.
pub fn plan(
    constraints: &Constraints,
    width: u32,
    height: u32,
    opts: &ConvertOpts,
) -> TilerResult<ConversionPlan> {
    let resolved = resolve_dimensions(constraints, width, height, opts.user_override.as_ref())?;
    let grid = resolved.grid(constraints);
    Ok(ConversionPlan {
        tiles: grid.len(),
        resolved,
        grid,
    })
}

/// Tiles produced by one conversion, row-major.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    /// Grid actually tiled.
    pub grid: TileGrid,
    /// Resolver output for the source.
    pub resolved: ResolvedDimensions,
    /// Tile encoding.
    pub format: TileFormat,
    /// Tiles in row-major order.
    pub tiles: Vec<TileDescriptor>,
}

impl ConversionResult {
    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Return `true` when no tiles were produced.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Sum of encoded tile sizes.
    pub fn total_bytes(&self) -> usize {
        self.tiles.iter().map(TileDescriptor::len).sum()
    }

    /// Iterate tiles row-major.
    pub fn iter(&self) -> std::slice::Iter<'_, TileDescriptor> {
        self.tiles.iter()
    }

    /// Describe the result for `manifest.json`.
    pub fn manifest(&self) -> TileManifest {
        TileManifest {
            width: self.grid.width,
            height: self.grid.height,
            cols: self.grid.cols,
            rows: self.grid.rows,
            tile_side: self.grid.side,
            format: self.format,
            tiles: self
                .tiles
                .iter()
                .map(|t| ManifestEntry {
                    row: t.row,
                    col: t.col,
                    file: t.file_name(),
                    bytes: t.len(),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConversionResult {
    type Item = &'a TileDescriptor;
    type IntoIter = std::slice::Iter<'a, TileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Convert `source` under the platform limits.
pub fn convert(source: &SourceAsset, opts: &ConvertOpts) -> TilerResult<ConversionResult> {
    convert_with(&Constraints::PLATFORM, source, opts)
}

/// Convert `source` under custom limits.
///
/// The batch either fully succeeds or fails: a tool failure, timeout or over-budget tile rejects
/// every tile.
#[tracing::instrument(skip_all, fields(kind = ?source.kind(), width = source.width(), height = source.height()))]
pub fn convert_with(
    constraints: &Constraints,
    source: &SourceAsset,
    opts: &ConvertOpts,
) -> TilerResult<ConversionResult> {
    opts.validate()?;
    let started = Instant::now();
    let deadline = opts.timeout().map(|t| started + t);

    let resolved = resolve_dimensions(
        constraints,
        source.width(),
        source.height(),
        opts.user_override.as_ref(),
    )?;
    let pool = build_thread_pool(opts.threads)?;
    let backend = create_backend(source.kind(), &opts.clip);
    let job = TileJob {
        constraints,
        resolved: &resolved,
        keying: opts.keying.as_ref(),
        pool: &pool,
        deadline,
    };

    let Materialized { grid, tiles } = backend.materialize(source, &job)?;
    validate_tile_budget(&tiles, constraints.max_tile_bytes)?;

    let result = ConversionResult {
        grid,
        resolved,
        format: backend.format(),
        tiles,
    };
    tracing::info!(
        cols = result.grid.cols,
        rows = result.grid.rows,
        tiles = result.len(),
        bytes = result.total_bytes(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "conversion finished"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/convert.rs"]
mod tests;
