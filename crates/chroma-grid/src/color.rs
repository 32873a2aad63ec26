//! RGBA colors for tiles and objects.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);
    pub const LIGHT_GRAY: Color = Color::rgb(0xC0, 0xC0, 0xC0);
    pub const DARK_GRAY: Color = Color::rgb(0x40, 0x40, 0x40);
    pub const MAGENTA: Color = Color::rgb(0xFF, 0x00, 0xFF);
    /// Drawn for tile ids that are not registered.
    pub const FALLBACK: Color = Color::rgb(0xFF, 0x66, 0x00);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise inversion. Alpha is kept.
    pub fn invert(self) -> Self {
        Self {
            r: 0xFF - self.r,
            g: 0xFF - self.g,
            b: 0xFF - self.b,
            a: self.a,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: lerp(self.a, other.a),
        }
    }
}
