//! Rainbow palette and strip pattern generators.
//!
//! The palette is computed once at startup: [`STRIP_LEN`] hues evenly spaced
//! over 0..360° at full saturation and value.  Two patterns are built
//! from it:
//!
//! | Pattern  | Used by  | Shape                                        |
//! |----------|----------|----------------------------------------------|
//! | Ordered  | DOOR     | palette forward or reversed                  |
//! | Random   | IN / OUT | `STRIP_LEN` uniform draws, with replacement  |

use crate::app::ports::EntropySource;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Number of LEDs on the strip, and palette size.
pub const STRIP_LEN: usize = 7;

/// Immutable rainbow palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainbowPalette {
    colors: [Rgb; STRIP_LEN],
}

impl RainbowPalette {
    pub fn new() -> Self {
        let mut colors = [(0, 0, 0); STRIP_LEN];
        for (i, c) in colors.iter_mut().enumerate() {
            let hue = i as f32 * 360.0 / STRIP_LEN as f32;
            *c = hsv_to_rgb(hue, 1.0, 1.0);
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb; STRIP_LEN] {
        &self.colors
    }

    /// Palette in order, or reversed when `forward` is false.
    pub fn ordered(&self, forward: bool) -> [Rgb; STRIP_LEN] {
        let mut out = self.colors;
        if !forward {
            out.reverse();
        }
        out
    }

    /// Independent uniform draws from the palette.
    pub fn random(&self, rng: &mut impl EntropySource) -> [Rgb; STRIP_LEN] {
        let mut out = [(0, 0, 0); STRIP_LEN];
        for slot in &mut out {
            *slot = self.colors[rng.pick(STRIP_LEN)];
        }
        out
    }
}

impl Default for RainbowPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// HSV (hue in degrees, s/v in 0..=1) to 8-bit RGB.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    (to_byte(r), to_byte(g), to_byte(b))
}

fn to_byte(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}
