//! Pixel transforms applied before partitioning.

/// Chroma-key background removal.
pub mod keying;
