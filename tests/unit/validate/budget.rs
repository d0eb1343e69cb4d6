use super::*;
use crate::foundation::core::{MAX_TILE_BYTES, TileFormat};
use crate::foundation::error::ErrorKind;

fn tile(row: u32, col: u32, len: usize) -> TileDescriptor {
    TileDescriptor {
        row,
        col,
        format: TileFormat::Webm,
        bytes: vec![0; len],
    }
}

#[test]
fn tiles_at_the_limit_pass() {
    let tiles = vec![tile(0, 0, MAX_TILE_BYTES), tile(0, 1, 10)];
    assert!(validate_tile_budget(&tiles, MAX_TILE_BYTES).is_ok());
    assert!(validate_tile_budget(&[], MAX_TILE_BYTES).is_ok());
}

#[test]
fn one_oversized_tile_fails_the_batch() {
    let mut tiles: Vec<TileDescriptor> = (0..50).map(|i| tile(i / 10, i % 10, 1024)).collect();
    tiles[23] = tile(2, 3, MAX_TILE_BYTES + 1);

    let err = validate_tile_budget(&tiles, MAX_TILE_BYTES).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    match err {
        TilerError::TileBudget {
            oversized,
            total,
            row,
            col,
            largest,
            ..
        } => {
            assert_eq!((oversized, total), (1, 50));
            assert_eq!((row, col), (2, 3));
            assert_eq!(largest, MAX_TILE_BYTES + 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn error_names_the_largest_offender() {
    let tiles = vec![tile(0, 0, 200), tile(0, 1, 500), tile(1, 0, 300), tile(1, 1, 50)];
    let err = validate_tile_budget(&tiles, 100).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("3 of 4 tiles"), "{msg}");
    assert!(msg.contains("tile (0, 1) at 500 bytes"), "{msg}");
}
