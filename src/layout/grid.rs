use std::iter::FusedIterator;

use image::RgbaImage;

use crate::foundation::core::TILE_SIDE;
use crate::foundation::math::tiles_along;

/// Row-major grid of square tiles covering a `width x height` raster.
///
/// The raster is conceptually padded with transparent pixels up to
/// `(cols * side, rows * side)`, so every cell is exactly `side x side`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TileGrid {
    /// Raster width in pixels (before padding).
    pub width: u32,
    /// Raster height in pixels (before padding).
    pub height: u32,
    /// Number of tile columns.
    pub cols: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Tile side in pixels.
    pub side: u32,
}

impl TileGrid {
    /// Grid of platform-sized tiles.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_side(width, height, TILE_SIDE)
    }

    /// Grid with a custom tile side.
    pub fn with_side(width: u32, height: u32, side: u32) -> Self {
        let side = side.max(1);
        Self {
            width,
            height,
            cols: tiles_along(width, side),
            rows: tiles_along(height, side),
            side,
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Return `true` when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width after padding to whole tiles.
    pub fn padded_width(&self) -> u32 {
        self.cols * self.side
    }

    /// Height after padding to whole tiles.
    pub fn padded_height(&self) -> u32 {
        self.rows * self.side
    }

    /// Cell at `(row, col)`, if inside the grid.
    pub fn cell(&self, row: u32, col: u32) -> Option<TileCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let x = col * self.side;
        let y = row * self.side;
        Some(TileCell {
            row,
            col,
            x,
            y,
            visible_width: self.width.saturating_sub(x).min(self.side),
            visible_height: self.height.saturating_sub(y).min(self.side),
        })
    }

    /// Iterate cells in row-major order. The iterator can be cloned to restart traversal.
    pub fn cells(&self) -> TileCells {
        TileCells {
            grid: *self,
            next: 0,
        }
    }
}

/// One cell of a [`TileGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TileCell {
    /// 0-based row.
    pub row: u32,
    /// 0-based column.
    pub col: u32,
    /// Left edge in the padded raster.
    pub x: u32,
    /// Top edge in the padded raster.
    pub y: u32,
    /// Width of the part covered by source pixels.
    pub visible_width: u32,
    /// Height of the part covered by source pixels.
    pub visible_height: u32,
}

impl TileCell {
    /// Return `true` when part of the cell is padding.
    pub fn is_partial(&self, side: u32) -> bool {
        self.visible_width < side || self.visible_height < side
    }

    /// Output file stem, `tile{row}_{col}`.
    pub fn file_stem(&self) -> String {
        format!("tile{}_{}", self.row, self.col)
    }
}

/// Row-major iterator over the cells of a [`TileGrid`].
#[derive(Clone, Debug)]
pub struct TileCells {
    grid: TileGrid,
    next: usize,
}

impl Iterator for TileCells {
    type Item = TileCell;

    fn next(&mut self) -> Option<TileCell> {
        if self.next >= self.grid.len() {
            return None;
        }
        let cols = self.grid.cols as usize;
        let row = (self.next / cols) as u32;
        let col = (self.next % cols) as u32;
        self.next += 1;
        self.grid.cell(row, col)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.grid.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for TileCells {}

impl FusedIterator for TileCells {}

/// Copy `image` onto a transparent canvas sized to the padded grid.
pub fn pad_to_grid(image: &RgbaImage, grid: &TileGrid) -> RgbaImage {
    let (pw, ph) = (grid.padded_width(), grid.padded_height());
    if image.dimensions() == (pw, ph) {
        return image.clone();
    }
    let mut canvas = RgbaImage::new(pw, ph);
    image::imageops::replace(&mut canvas, image, 0, 0);
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
