//! End-to-end conversion: resolve, materialize, validate, and write results to disk.

/// Conversion entry points and options.
pub mod convert;
/// Tile files and manifest on disk.
pub mod output;
