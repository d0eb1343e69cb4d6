//! Geometry: resolving the target raster size and slicing it into tiles.

/// Row-major tile grid over a resolved raster.
pub mod grid;
/// Target-size resolution under the platform limits.
pub mod resolver;
