use super::*;

#[test]
fn tiles_along_is_ceiling_division() {
    assert_eq!(tiles_along(0, 100), 0);
    assert_eq!(tiles_along(1, 100), 1);
    assert_eq!(tiles_along(100, 100), 1);
    assert_eq!(tiles_along(5000, 100), 50);
    assert_eq!(tiles_along(5001, 100), 51);
}

#[test]
fn scale_floor_does_not_overflow() {
    assert_eq!(scale_floor(400, 800, 1600), 200);
    assert_eq!(scale_floor(u32::MAX, 800, u32::MAX), 800);
    assert_eq!(scale_floor(7, 1, 0), 7);
}

#[test]
fn even_floor_min2_rounds_down_to_even() {
    assert_eq!(even_floor_min2(101.9), 100);
    assert_eq!(even_floor_min2(99.0), 98);
    assert_eq!(even_floor_min2(1.0), 2);
    assert_eq!(even_floor_min2(-4.0), 2);
}
