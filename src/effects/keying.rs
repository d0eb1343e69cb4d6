use image::RgbaImage;

use crate::foundation::error::{TilerError, TilerResult};

// 255 * sqrt(3): largest possible RGB distance.
const MAX_RGB_DISTANCE: f32 = 441.672_94;

/// Smallest similarity the `ffmpeg` `colorkey` filter accepts.
const FFMPEG_MIN_SIMILARITY: f32 = 0.000_01;

/// Background removal parameters.
///
/// `similarity` and `blend` are percentages in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyingSpec {
    /// Reference color (RGB).
    pub color: [u8; 3],
    /// Distance (percent of the RGB cube diagonal) under which pixels become transparent.
    pub similarity: f32,
    /// Width (percent) of the soft transition above `similarity`. `0` gives a hard cut.
    #[serde(default)]
    pub blend: f32,
}

impl KeyingSpec {
    /// Create a validated keying spec.
    pub fn new(color: [u8; 3], similarity: f32, blend: f32) -> TilerResult<Self> {
        let spec = Self {
            color,
            similarity,
            blend,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check that `similarity` and `blend` are finite and inside `[0, 100]`.
    pub fn validate(&self) -> TilerResult<()> {
        for (name, v) in [("similarity", self.similarity), ("blend", self.blend)] {
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                return Err(TilerError::validation(format!(
                    "keying {name} must be within [0, 100], got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Equivalent `ffmpeg` filter, for clip sources.
    ///
    /// `colorkey` measures distance in its own normalized RGB space, so edges can differ slightly
    /// from [`apply_keying`].
    pub fn colorkey_filter(&self) -> String {
        let [r, g, b] = self.color;
        let similarity = (self.similarity / 100.0).max(FFMPEG_MIN_SIMILARITY);
        let blend = self.blend / 100.0;
        format!("colorkey=0x{r:02X}{g:02X}{b:02X}:{similarity:.5}:{blend:.5}")
    }
}

/// Parse `RRGGBB`, `#RRGGBB` or `0xRRGGBB`.
pub fn parse_hex_color(s: &str) -> TilerResult<[u8; 3]> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TilerError::validation(format!(
            "expected a color like RRGGBB, got '{s}'"
        )));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|e| TilerError::validation(format!("bad color '{s}': {e}")))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Normalized RGB distance in `[0, 1]`.
pub(crate) fn color_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let sq: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f32::from(x) - f32::from(y);
            d * d
        })
        .sum();
    sq.sqrt() / MAX_RGB_DISTANCE
}

fn keyed_alpha(alpha: u8, distance: f32, similarity: f32, blend: f32) -> u8 {
    if blend > 0.0 {
        let t = ((distance - similarity) / blend).clamp(0.0, 1.0);
        (f32::from(alpha) * t).round() as u8
    } else if distance > similarity {
        alpha
    } else {
        0
    }
}

/// Make pixels close to `spec.color` transparent. Only the alpha channel changes.
pub fn apply_keying(image: &mut RgbaImage, spec: &KeyingSpec) {
    let similarity = spec.similarity / 100.0;
    let blend = spec.blend / 100.0;
    for px in image.pixels_mut() {
        let [r, g, b, a] = px.0;
        if a == 0 {
            continue;
        }
        let d = color_distance([r, g, b], spec.color);
        px.0[3] = keyed_alpha(a, d, similarity, blend);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/keying.rs"]
mod tests;
