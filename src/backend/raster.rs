use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use rayon::prelude::*;

use crate::assets::source::SourceAsset;
use crate::backend::{Materialized, TileBackend, TileDescriptor, TileJob, collect_tiles};
use crate::effects::keying::apply_keying;
use crate::foundation::core::{AssetKind, TileFormat};
use crate::foundation::error::{TilerError, TilerResult};
use crate::layout::grid::{TileCell, pad_to_grid};

/// In-memory backend for still images.
///
/// Keys once on the native raster, resizes once to the resolved size, pads to whole tiles and
/// then crops and PNG-encodes every cell in parallel.
#[derive(Clone, Copy, Debug)]
pub struct RasterBackend {
    filter: FilterType,
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterBackend {
    /// Backend resampling with Lanczos3.
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Backend with a custom resampling filter.
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl TileBackend for RasterBackend {
    fn kind(&self) -> AssetKind {
        AssetKind::Raster
    }

    fn format(&self) -> TileFormat {
        TileFormat::Png
    }

    #[tracing::instrument(level = "debug", skip_all, fields(width = job.resolved.width, height = job.resolved.height))]
    fn materialize(&self, source: &SourceAsset, job: &TileJob<'_>) -> TilerResult<Materialized> {
        let SourceAsset::Raster(src) = source else {
            return Err(TilerError::validation(
                "raster backend needs a raster source",
            ));
        };

        let keyed;
        let native: &RgbaImage = match job.keying {
            Some(spec) => {
                let mut img = src.image.as_ref().clone();
                apply_keying(&mut img, spec);
                keyed = img;
                &keyed
            }
            None => src.image.as_ref(),
        };

        let resized;
        let sized: &RgbaImage = if job.resolved.is_passthrough() {
            native
        } else {
            resized = image::imageops::resize(
                native,
                job.resolved.width,
                job.resolved.height,
                self.filter,
            );
            &resized
        };

        let grid = job.resolved.grid(job.constraints);
        let padded = pad_to_grid(sized, &grid);
        let cells: Vec<TileCell> = grid.cells().collect();
        let side = grid.side;

        let encoded = job.pool.install(|| {
            cells
                .par_iter()
                .map(|cell| encode_cell(&padded, cell, side))
                .collect::<Vec<_>>()
        });
        let tiles = collect_tiles(encoded)?;

        Ok(Materialized { grid, tiles })
    }
}

fn encode_cell(padded: &RgbaImage, cell: &TileCell, side: u32) -> TilerResult<TileDescriptor> {
    let tile = image::imageops::crop_imm(padded, cell.x, cell.y, side, side).to_image();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(tile)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| {
            TilerError::conversion(format!(
                "PNG encode failed for tile ({}, {}): {e}",
                cell.row, cell.col
            ))
        })?;

    Ok(TileDescriptor {
        row: cell.row,
        col: cell.col,
        format: TileFormat::Png,
        bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/backend/raster.rs"]
mod tests;
