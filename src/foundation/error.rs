/// Convenience result type used across tilemoji.
pub type TilerResult<T> = Result<T, TilerError>;

/// Coarse classification of a [`TilerError`], for callers that map errors to user replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source aspect ratio or size cannot be tiled.
    Dimension,
    /// An explicit override exceeds the tile cap.
    TileLimit,
    /// Backend materialization or size-budget failure.
    Conversion,
    /// Malformed typed input.
    Validation,
    /// Lower-level failure (decode, IO outside the clip working directory).
    Other,
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TilerError {
    /// Source aspect ratio outside the supported range, or a zero-sized source.
    #[error("dimension error: {width}x{height} (aspect {aspect:.4}) cannot be tiled: {reason}")]
    Dimension {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
        /// `width / height`.
        aspect: f64,
        /// Which bound was violated.
        reason: String,
    },

    /// Explicit override that would exceed the tile cap.
    #[error("tile limit error: {width}x{height} needs {tiles} tiles, at most {max_tiles} allowed")]
    TileLimit {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Tile count the request would produce.
        tiles: u64,
        /// Configured tile cap.
        max_tiles: u32,
    },

    /// External tool failure, timeout or working-directory failure.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// At least one produced tile is over the per-tile byte budget.
    #[error(
        "conversion error: {oversized} of {total} tiles exceed {limit} bytes; largest is tile ({row}, {col}) at {largest} bytes"
    )]
    TileBudget {
        /// Number of tiles over the budget.
        oversized: usize,
        /// Number of tiles in the batch.
        total: usize,
        /// Byte budget per tile.
        limit: usize,
        /// Row of the largest offending tile.
        row: u32,
        /// Column of the largest offending tile.
        col: u32,
        /// Encoded size of the largest offending tile.
        largest: usize,
    },

    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TilerError {
    /// Build a [`TilerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TilerError::Conversion`] value.
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dimension { .. } => ErrorKind::Dimension,
            Self::TileLimit { .. } => ErrorKind::TileLimit,
            Self::Conversion(_) | Self::TileBudget { .. } => ErrorKind::Conversion,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
