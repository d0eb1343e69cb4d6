//! tilemoji converts a still image or short clip into a grid of 100x100 tiles for an emoji or
//! sticker set, under hard platform limits (tile count, axis sizes, per-tile bytes).
//!
//! The flow for one conversion:
//!
//! - Load a [`SourceAsset`] (decoded raster, or a clip probed with `ffprobe`)
//! - Resolve the target size with [`resolve_dimensions`]
//! - Materialize tiles with a [`TileBackend`] (in-memory PNG, or `ffmpeg` WebM)
//! - Reject the whole batch if any tile breaks the byte budget
//!
//! [`convert`] runs all of it; [`write_tiles`] puts the result on disk.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Source media loading.
pub mod assets;
/// Tile materialization backends.
pub mod backend;
/// Pixel transforms applied before partitioning.
pub mod effects;
/// Size resolution and tile grids.
pub mod layout;
/// End-to-end conversion.
pub mod pipeline;
/// External media tools.
pub mod tools;
/// Post-encode batch checks.
pub mod validate;

pub use crate::foundation::core::{
    AssetKind, Constraints, MAX_ASPECT, MAX_HEIGHT, MAX_TILE_BYTES, MAX_TILES, MAX_WIDTH,
    MIN_ASPECT, TILE_SIDE, TileFormat,
};
pub use crate::foundation::error::{ErrorKind, TilerError, TilerResult};

pub use crate::assets::source::{ClipSource, RasterSource, SourceAsset, classify_path};
pub use crate::backend::clip::{ClipBackend, ClipEncodeOpts};
pub use crate::backend::raster::RasterBackend;
pub use crate::backend::{Materialized, TileBackend, TileDescriptor, TileJob, build_thread_pool};
pub use crate::effects::keying::{KeyingSpec, apply_keying, parse_hex_color};
pub use crate::layout::grid::{TileCell, TileGrid, pad_to_grid};
pub use crate::layout::resolver::{
    ResizeReason, ResizeStep, ResolvedDimensions, UserOverride, resolve_dimensions,
};
pub use crate::pipeline::convert::{
    ConversionPlan, ConversionResult, ConvertOpts, convert, convert_with, plan,
};
pub use crate::pipeline::output::{MANIFEST_FILE, ManifestEntry, TileManifest, write_tiles};
pub use crate::tools::ffmpeg::{ClipInfo, MediaTools, is_ffmpeg_on_path, probe_clip};
pub use crate::validate::budget::validate_tile_budget;
