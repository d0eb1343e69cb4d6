use super::*;

#[test]
fn platform_constants_match_the_sticker_limits() {
    let c = Constraints::PLATFORM;
    assert_eq!(c.tile_side, 100);
    assert_eq!(c.max_tiles, 50);
    assert_eq!(c.max_width, 800);
    assert_eq!(c.max_height, 5000);
    assert_eq!(c.max_tile_bytes, 65_536);
    assert_eq!(Constraints::default(), c);
}

#[test]
fn tile_count_rounds_partial_tiles_up() {
    let c = Constraints::PLATFORM;
    assert_eq!(c.tile_count(100, 100), 1);
    assert_eq!(c.tile_count(101, 100), 2);
    assert_eq!(c.tile_count(800, 200), 16);
    assert_eq!(c.tile_count(900, 600), 54);
    assert_eq!(c.tile_count(1, 1), 1);
}

#[test]
fn tile_count_does_not_wrap_for_huge_sizes() {
    let c = Constraints::PLATFORM;
    assert_eq!(c.tile_count(6_553_600, 6_553_600), 65_536 * 65_536);
    assert_eq!(c.tile_count(u32::MAX, u32::MAX), 42_949_673 * 42_949_673);
    assert!(c.exceeds_tile_cap(6_553_600, 6_553_600));
    assert!(c.exceeds_tile_cap(900, 600));
    assert!(!c.exceeds_tile_cap(800, 200));
}

#[test]
fn tile_format_extensions() {
    assert_eq!(TileFormat::Png.extension(), "png");
    assert_eq!(TileFormat::Webm.extension(), "webm");
}
