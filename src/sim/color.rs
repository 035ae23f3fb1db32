//! Color math: HSL conversion, hex parsing, interpolation and the
//! time-driven hue walk that gives every blob its drifting gradient.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrbError;

/// 8-bit sRGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert from HSL (`h` in degrees, `s` and `l` in percent)
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = (s / 100.0).clamp(0.0, 1.0);
        let l = (l / 100.0).clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };

        Self::new(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Per-channel linear interpolation, rounded to the nearest byte
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Channels as floats in [0, 1] (still sRGB encoded)
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[inline]
fn to_byte(x: f64) -> u8 {
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = OrbError;

    /// Parse `#rrggbb` (leading `#` optional, case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(OrbError::InvalidColor(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| OrbError::InvalidColor(s.to_string()))?;
        Ok(Rgb::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }
}

impl TryFrom<String> for Rgb {
    type Error = OrbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// HSL to `#rrggbb`
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    Rgb::from_hsl(h, s, l).to_hex()
}

/// Interpolate two hex colors at `t` in [0, 1]
pub fn lerp_color(a: &str, b: &str, t: f64) -> Result<String, OrbError> {
    let a: Rgb = a.parse()?;
    let b: Rgb = b.parse()?;
    Ok(a.lerp(b, t).to_hex())
}

/// Hue of blob `index` at `now_ms` (first color of its family)
#[inline]
pub fn family_hue(index: usize, now_ms: f64) -> f64 {
    (index as f64 * 67.0 + now_ms * 0.018).rem_euclid(360.0)
}

/// Two-color family for blob `index`: a bright and a deep tone whose hues
/// drift apart and together over time
pub fn color_family(index: usize, now_ms: f64) -> [Rgb; 2] {
    let i = index as f64;
    let base_hue = family_hue(index, now_ms);
    let hue2 = (base_hue + 40.0 + 20.0 * (now_ms * 0.0007 + i).sin()).rem_euclid(360.0);
    let sat = 80.0 + 10.0 * (now_ms * 0.0005 + i).sin();
    let light1 = 60.0 + 10.0 * (now_ms * 0.0004 + i * 2.0).cos();
    let light2 = 35.0 + 15.0 * (now_ms * 0.0006 + i * 3.0).sin();
    [
        Rgb::from_hsl(base_hue, sat, light1),
        Rgb::from_hsl(hue2, sat, light2),
    ]
}

/// Gradient pair published to sibling UI each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientPair {
    pub start: Rgb,
    pub end: Rgb,
}

/// Base hue of the parent gradient at `now_ms`
#[inline]
fn parent_base_hue(now_ms: f64) -> f64 {
    (now_ms * 0.01).rem_euclid(360.0)
}

/// Exported start/end colors
pub fn gradient_pair(now_ms: f64) -> GradientPair {
    let base = parent_base_hue(now_ms);
    let end_hue = base + 60.0 * (now_ms * 0.00015 + std::f64::consts::FRAC_PI_2).sin();
    GradientPair {
        start: Rgb::from_hsl(base, 80.0, 60.0),
        end: Rgb::from_hsl(end_hue, 80.0, 60.0),
    }
}

/// Parent gradient stop color at phase `phase`
pub fn parent_stop(now_ms: f64, phase: f64) -> Rgb {
    let base = parent_base_hue(now_ms);
    let hue = base + 60.0 * (now_ms * 0.00015 + phase).sin();
    let sat = 80.0 + 10.0 * (now_ms * 0.0002 + phase).sin();
    let light = 60.0 + 10.0 * (now_ms * 0.00018 + phase).cos();
    Rgb::from_hsl(hue, sat, light)
}
