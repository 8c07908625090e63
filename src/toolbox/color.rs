//! Color conversion between RGB, HSV, HSL and hex strings
//!
//! Hue is in degrees `[0, 360)`, saturation, value and lightness in `[0, 1]`.

use serde::{Deserialize, Serialize};
use super::{Result, ToolboxError};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue, saturation, value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Hue, saturation, lightness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

fn to_channel(x: f64) -> u8 {
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || ToolboxError::InvalidColor(hex.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let parse = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            6 => Ok(Self::new(parse(&digits[0..2])?, parse(&digits[2..4])?, parse(&digits[4..6])?)),
            3 => {
                // Each short digit is doubled: "f80" -> "ff8800"
                let r = parse(&digits[0..1])?;
                let g = parse(&digits[1..2])?;
                let b = parse(&digits[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from float channels in `[0, 1]`, clamping out-of-range values
    pub fn from_normalized(r: f64, g: f64, b: f64) -> Self {
        Self::new(to_channel(r), to_channel(g), to_channel(b))
    }

    /// Channels as floats in `[0, 1]`
    pub fn to_normalized(&self) -> (f64, f64, f64) {
        (self.r as f64 / 255.0, self.g as f64 / 255.0, self.b as f64 / 255.0)
    }

    /// Relative luminance (WCAG 2.x)
    pub fn luminance(&self) -> f64 {
        let linear = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Contrast ratio between two colors, from 1.0 to 21.0
    pub fn contrast_ratio(&self, other: &Rgb) -> f64 {
        let (a, b) = (self.luminance(), other.luminance());
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }

    /// Linear mix, `t = 0` gives self and `t = 1` gives other
    pub fn mix(&self, other: &Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Hue in degrees plus the max and min channel
fn hue_and_range(rgb: &Rgb) -> (f64, f64, f64) {
    let (r, g, b) = rgb.to_normalized();
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (hue, max, min)
}

/// Map chroma and hue back to RGB, adding `m` to every channel
fn from_chroma(h: f64, c: f64, m: f64) -> Rgb {
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::from_normalized(r + m, g + m, b + m)
}

/// Convert RGB to HSV
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let (h, max, min) = hue_and_range(&rgb);
    let s = if max == 0.0 { 0.0 } else { (max - min) / max };
    Hsv { h, s, v: max }
}

/// Convert HSV to RGB
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);
    let c = v * s;
    from_chroma(hsv.h, c, v - c)
}

/// Convert RGB to HSL
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let (h, max, min) = hue_and_range(&rgb);
    let l = (max + min) / 2.0;
    let delta = max - min;
    let s = if delta == 0.0 { 0.0 } else { delta / (1.0 - (2.0 * l - 1.0).abs()) };
    Hsl { h, s: s.clamp(0.0, 1.0), l }
}

/// Convert HSL to RGB
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let s = hsl.s.clamp(0.0, 1.0);
    let l = hsl.l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    from_chroma(hsl.h, c, l - c / 2.0)
}
