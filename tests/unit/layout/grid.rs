use std::collections::HashSet;

use image::Rgba;

use super::*;

#[test]
fn cells_are_row_major_and_complete() {
    let grid = TileGrid::new(250, 120);
    assert_eq!((grid.cols, grid.rows), (3, 2));
    assert_eq!(grid.len(), 6);

    let order: Vec<(u32, u32)> = grid.cells().map(|c| (c.row, c.col)).collect();
    assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
}

#[test]
fn cells_cover_padded_raster_without_overlap() {
    for (w, h) in [(100, 100), (800, 200), (101, 99), (1, 5000), (799, 601)] {
        let grid = TileGrid::new(w, h);
        let mut seen = HashSet::new();
        let mut area = 0u64;
        for cell in grid.cells() {
            assert_eq!(cell.x % 100, 0);
            assert_eq!(cell.y % 100, 0);
            assert!(seen.insert((cell.x, cell.y)), "overlap at {cell:?}");
            area += 100 * 100;
        }
        assert_eq!(seen.len(), grid.len());
        assert_eq!(
            area,
            u64::from(grid.padded_width()) * u64::from(grid.padded_height())
        );
        assert_eq!(grid.len(), (w.div_ceil(100) * h.div_ceil(100)) as usize);
    }
}

#[test]
fn edge_cells_report_visible_extent() {
    let grid = TileGrid::new(250, 120);
    let last = grid.cell(1, 2).unwrap();
    assert_eq!((last.x, last.y), (200, 100));
    assert_eq!((last.visible_width, last.visible_height), (50, 20));
    assert!(last.is_partial(100));
    assert!(!grid.cell(0, 0).unwrap().is_partial(100));
    assert!(grid.cell(2, 0).is_none());
}

#[test]
fn iterator_is_exact_size_and_restartable() {
    let grid = TileGrid::new(800, 200);
    let cells = grid.cells();
    assert_eq!(cells.len(), 16);
    let first: Vec<_> = cells.clone().collect();
    let second: Vec<_> = cells.collect();
    assert_eq!(first, second);

    let mut it = grid.cells();
    it.next();
    assert_eq!(it.len(), 15);
}

#[test]
fn empty_grid_yields_nothing() {
    let grid = TileGrid::new(0, 0);
    assert!(grid.is_empty());
    assert_eq!(grid.cells().count(), 0);
}

#[test]
fn file_stem_uses_row_then_column() {
    let cell = TileGrid::new(300, 300).cell(2, 1).unwrap();
    assert_eq!(cell.file_stem(), "tile2_1");
}

#[test]
fn padding_is_transparent_and_preserves_source() {
    let src = RgbaImage::from_pixel(150, 50, Rgba([10, 20, 30, 255]));
    let grid = TileGrid::new(150, 50);
    let padded = pad_to_grid(&src, &grid);
    assert_eq!(padded.dimensions(), (200, 100));
    assert_eq!(*padded.get_pixel(149, 49), Rgba([10, 20, 30, 255]));
    assert_eq!(*padded.get_pixel(150, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*padded.get_pixel(0, 50), Rgba([0, 0, 0, 0]));
}
