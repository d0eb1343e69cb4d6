/// Number of `side`-sized tiles needed to cover `len` pixels.
pub(crate) fn tiles_along(len: u32, side: u32) -> u32 {
    len.div_ceil(side)
}

/// `value * num / den`, floored, computed in 64 bits.
pub(crate) fn scale_floor(value: u32, num: u32, den: u32) -> u32 {
    if den == 0 {
        return value;
    }
    (u64::from(value) * u64::from(num) / u64::from(den)) as u32
}

/// Round down to an even integer, never below 2.
pub(crate) fn even_floor_min2(value: f64) -> u32 {
    let v = value.floor().max(0.0) as u32;
    (v - v % 2).max(2)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
