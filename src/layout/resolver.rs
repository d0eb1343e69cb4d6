//! Dimension resolution.
//!
//! One resolver serves both backends. It returns the final size together with the ordered
//! [`ResizeStep`]s that produced it: the raster backend only needs the final size, while the clip
//! backend runs every step as its own `ffmpeg` invocation and re-probes in between.

use std::cmp::Ordering;

use crate::foundation::core::Constraints;
use crate::foundation::error::{TilerError, TilerResult};
use crate::foundation::math::{even_floor_min2, scale_floor, tiles_along};
use crate::layout::grid::TileGrid;

/// Caller-requested output size in pixels, per axis.
///
/// Values are normally whole tiles (multiples of 100). A missing axis is derived from the source
/// aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserOverride {
    /// Requested width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Requested height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

impl UserOverride {
    /// Override with the given pixel sizes.
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Override expressed in tile counts (`cols` wide, `rows` high).
    pub fn tiles(cols: Option<u32>, rows: Option<u32>, tile_side: u32) -> Self {
        Self {
            width: cols.map(|c| c.saturating_mul(tile_side)),
            height: rows.map(|r| r.saturating_mul(tile_side)),
        }
    }

    /// Return `true` when neither axis is set.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    fn validate(&self) -> TilerResult<()> {
        if self.width == Some(0) || self.height == Some(0) {
            return Err(TilerError::validation("override width/height must be non-zero"));
        }
        Ok(())
    }
}

/// Why a resize step was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeReason {
    /// Caller-requested size.
    Override,
    /// Width above the platform width cap.
    WidthCap,
    /// Height above the platform height cap.
    HeightCap,
    /// Minor axis capped so the tile count fits.
    TileCap,
    /// Uniform downscale after rounding broke the tile cap.
    SafetyScale,
}

/// One resize to an absolute target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ResizeStep {
    /// Why the step exists.
    pub reason: ResizeReason,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

/// Final raster size plus the steps that led to it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedDimensions {
    /// Final width in pixels.
    pub width: u32,
    /// Final height in pixels.
    pub height: u32,
    /// Native source width.
    pub source_width: u32,
    /// Native source height.
    pub source_height: u32,
    /// Resize steps in execution order. Empty when the source passes through unchanged.
    pub steps: Vec<ResizeStep>,
}

impl ResolvedDimensions {
    /// Return `true` when no resize is needed.
    pub fn is_passthrough(&self) -> bool {
        self.width == self.source_width && self.height == self.source_height
    }

    /// Tile grid over the final size.
    pub fn grid(&self, constraints: &Constraints) -> TileGrid {
        TileGrid::with_side(self.width, self.height, constraints.tile_side)
    }
}

struct Trace {
    source_width: u32,
    source_height: u32,
    width: u32,
    height: u32,
    steps: Vec<ResizeStep>,
}

impl Trace {
    fn new(width: u32, height: u32) -> Self {
        Self {
            source_width: width,
            source_height: height,
            width,
            height,
            steps: Vec::new(),
        }
    }

    fn apply(&mut self, reason: ResizeReason, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        tracing::debug!(?reason, width, height, "resize step");
        self.width = width;
        self.height = height;
        self.steps.push(ResizeStep {
            reason,
            width,
            height,
        });
    }

    fn finish(self) -> ResolvedDimensions {
        ResolvedDimensions {
            width: self.width,
            height: self.height,
            source_width: self.source_width,
            source_height: self.source_height,
            steps: self.steps,
        }
    }
}

/// Resolve the output raster size for a `width x height` source.
///
/// Errors:
/// - [`TilerError::Dimension`] when the aspect ratio is outside the supported range.
/// - [`TilerError::TileLimit`] when an explicit override cannot fit the tile cap.
/// - [`TilerError::Validation`] for zero override axes or degenerate constraints.
///
/// The returned size always satisfies `ceil(w/side) * ceil(h/side) <= max_tiles`.
#[tracing::instrument(level = "debug", skip(constraints))]
pub fn resolve_dimensions(
    constraints: &Constraints,
    width: u32,
    height: u32,
    user: Option<&UserOverride>,
) -> TilerResult<ResolvedDimensions> {
    if constraints.max_tiles == 0 || constraints.tile_side == 0 {
        return Err(TilerError::validation(
            "constraints need a non-zero tile side and tile cap",
        ));
    }
    let aspect = check_aspect(constraints, width, height)?;

    let mut trace = Trace::new(width, height);
    match user.filter(|o| !o.is_empty()) {
        Some(o) => {
            o.validate()?;
            resolve_override(constraints, aspect, o, &mut trace)?;
        }
        None => resolve_auto(constraints, &mut trace),
    }
    enforce_tile_cap(constraints, &mut trace);

    Ok(trace.finish())
}

fn check_aspect(constraints: &Constraints, width: u32, height: u32) -> TilerResult<f64> {
    let dimension_err = |aspect: f64, reason: String| TilerError::Dimension {
        width,
        height,
        aspect,
        reason,
    };
    if width == 0 || height == 0 {
        return Err(dimension_err(0.0, "source has a zero-sized axis".to_string()));
    }

    let aspect = f64::from(width) / f64::from(height);
    if aspect < constraints.min_aspect {
        return Err(dimension_err(
            aspect,
            format!("aspect ratio below {}", constraints.min_aspect),
        ));
    }
    if aspect > constraints.max_aspect {
        return Err(dimension_err(
            aspect,
            format!("aspect ratio above {}", constraints.max_aspect),
        ));
    }
    Ok(aspect)
}

fn resolve_override(
    constraints: &Constraints,
    aspect: f64,
    user: &UserOverride,
    trace: &mut Trace,
) -> TilerResult<()> {
    let side = constraints.tile_side;
    let max_tiles = constraints.max_tiles;
    let limit_err = |width: u32, height: u32, tiles: u64| TilerError::TileLimit {
        width,
        height,
        tiles,
        max_tiles,
    };

    let (width, height) = match (user.width, user.height) {
        (Some(w), Some(h)) => {
            if constraints.exceeds_tile_cap(w, h) {
                return Err(limit_err(w, h, constraints.tile_count(w, h)));
            }
            (w, h)
        }
        (Some(w), None) => {
            let cols = tiles_along(w, side);
            if cols > max_tiles {
                return Err(limit_err(w, side, u64::from(cols)));
            }
            let mut h = ((f64::from(w) / aspect).floor() as u32).max(side);
            if constraints.exceeds_tile_cap(w, h) {
                h = (max_tiles / cols) * side;
            }
            (w, h)
        }
        (None, Some(h)) => {
            let rows = tiles_along(h, side);
            if rows > max_tiles {
                return Err(limit_err(side, h, u64::from(rows)));
            }
            let mut w = ((f64::from(h) * aspect).floor() as u32).max(side);
            if constraints.exceeds_tile_cap(w, h) {
                w = (max_tiles / rows) * side;
            }
            (w, h)
        }
        (None, None) => return Ok(()),
    };

    trace.apply(ResizeReason::Override, width.max(side), height.max(side));
    Ok(())
}

fn resolve_auto(constraints: &Constraints, trace: &mut Trace) {
    let side = constraints.tile_side;
    let (mut w, mut h) = (trace.width, trace.height);
    if w <= side && h <= side {
        return;
    }

    if w > constraints.max_width {
        h = scale_floor(h, constraints.max_width, w).max(side);
        w = constraints.max_width;
        trace.apply(ResizeReason::WidthCap, w, h);
    }
    if h > constraints.max_height {
        w = scale_floor(w, constraints.max_height, h).max(side);
        h = constraints.max_height;
        trace.apply(ResizeReason::HeightCap, w, h);
    }

    // Cap the minor axis; orientation follows the native size.
    match trace.source_width.cmp(&trace.source_height) {
        Ordering::Greater => {
            let cap = (constraints.max_tiles / tiles_along(w, side)) * side;
            h = h.min(cap.max(side));
        }
        Ordering::Equal => {
            let cap = ((constraints.max_tiles / tiles_along(w, side)) * side).max(side);
            w = w.min(cap);
            h = h.min(cap);
        }
        Ordering::Less => {
            let cap = (constraints.max_tiles / tiles_along(h, side)) * side;
            w = w.min(cap.max(side));
        }
    }
    trace.apply(ResizeReason::TileCap, w, h);
}

fn enforce_tile_cap(constraints: &Constraints, trace: &mut Trace) {
    while constraints.exceeds_tile_cap(trace.width, trace.height) {
        let count = constraints.tile_count(trace.width, trace.height);
        let factor = (f64::from(constraints.max_tiles) / count as f64).sqrt();
        let w = even_floor_min2(f64::from(trace.width) * factor);
        let h = even_floor_min2(f64::from(trace.height) * factor);
        tracing::warn!(
            tiles = count,
            max_tiles = constraints.max_tiles,
            width = w,
            height = h,
            "tile cap still exceeded after resize rules, scaling down uniformly"
        );
        trace.apply(ResizeReason::SafetyScale, w, h);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
