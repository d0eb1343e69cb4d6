//! Loading source media into immutable [`source::SourceAsset`] values.

/// Raster and clip sources.
pub mod source;
