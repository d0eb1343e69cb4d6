use crate::backend::TileDescriptor;
use crate::foundation::error::{TilerError, TilerResult};

/// Fail the whole batch when any tile is over `limit` bytes.
///
/// Nothing is partially delivered: one oversized tile rejects every tile. The error names the
/// largest offender.
pub fn validate_tile_budget(tiles: &[TileDescriptor], limit: usize) -> TilerResult<()> {
    let mut oversized = 0usize;
    let mut largest: Option<&TileDescriptor> = None;
    for tile in tiles.iter().filter(|t| t.len() > limit) {
        oversized += 1;
        if largest.is_none_or(|l| tile.len() > l.len()) {
            largest = Some(tile);
        }
    }

    match largest {
        None => Ok(()),
        Some(tile) => {
            tracing::warn!(
                oversized,
                total = tiles.len(),
                limit,
                largest = tile.len(),
                "tile batch over budget"
            );
            Err(TilerError::TileBudget {
                oversized,
                total: tiles.len(),
                limit,
                row: tile.row,
                col: tile.col,
                largest: tile.len(),
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/budget.rs"]
mod tests;
