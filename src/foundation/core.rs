use crate::foundation::math::tiles_along;

/// Side of one square tile in pixels.
pub const TILE_SIDE: u32 = 100;
/// Maximum number of tiles in one emoji set.
pub const MAX_TILES: u32 = 50;
/// Maximum raster width the platform accepts for a whole set.
pub const MAX_WIDTH: u32 = 800;
/// Maximum raster height the platform accepts for a whole set.
pub const MAX_HEIGHT: u32 = 5000;
/// Smallest supported `width / height`.
pub const MIN_ASPECT: f64 = 0.02;
/// Largest supported `width / height`.
pub const MAX_ASPECT: f64 = 50.0;
/// Per-tile encoded size ceiling in bytes.
pub const MAX_TILE_BYTES: usize = 64 * 1024;

/// Hard platform limits, grouped so the resolver and validator can be parameterized.
///
/// Production code uses [`Constraints::PLATFORM`]; tests may shrink the limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    /// Tile side in pixels.
    pub tile_side: u32,
    /// Tile cap.
    pub max_tiles: u32,
    /// Width cap in pixels.
    pub max_width: u32,
    /// Height cap in pixels.
    pub max_height: u32,
    /// Inclusive lower aspect bound.
    pub min_aspect: f64,
    /// Inclusive upper aspect bound.
    pub max_aspect: f64,
    /// Per-tile byte budget.
    pub max_tile_bytes: usize,
}

impl Constraints {
    /// Limits enforced by the sticker platform.
    pub const PLATFORM: Self = Self {
        tile_side: TILE_SIDE,
        max_tiles: MAX_TILES,
        max_width: MAX_WIDTH,
        max_height: MAX_HEIGHT,
        min_aspect: MIN_ASPECT,
        max_aspect: MAX_ASPECT,
        max_tile_bytes: MAX_TILE_BYTES,
    };

    /// Number of tiles a `width x height` raster occupies once padded to whole tiles.
    ///
    /// Computed in 64 bits so caller-chosen sizes cannot wrap.
    pub fn tile_count(&self, width: u32, height: u32) -> u64 {
        let cols = u64::from(tiles_along(width, self.tile_side));
        let rows = u64::from(tiles_along(height, self.tile_side));
        cols * rows
    }

    /// Return `true` when a `width x height` raster needs more tiles than allowed.
    pub fn exceeds_tile_cap(&self, width: u32, height: u32) -> bool {
        self.tile_count(width, height) > u64::from(self.max_tiles)
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::PLATFORM
    }
}

/// Kind of source media.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Still image.
    Raster,
    /// Video or animation.
    Clip,
}

/// Encoding of a produced tile payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileFormat {
    /// Static PNG (raster sources).
    Png,
    /// VP9 WebM with alpha (clip sources).
    Webm,
}

impl TileFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webm => "webm",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
