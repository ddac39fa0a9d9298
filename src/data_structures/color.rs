//! sRGB colors as they are written in hex (`0xB1E1FF`, `#b1e1ff`).
//!
//! Colors are stored in sRGB space and converted to linear space whenever they
//! are uploaded to the GPU, since all render targets use `*Srgb` formats.

use anyhow::{Context, bail};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Lowercase `#rrggbb`, the format color pickers read and write.
    pub fn to_hex_string(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    /// Parses `#rrggbb`, `rrggbb` or `0xrrggbb`.
    pub fn from_hex_str(value: &str) -> anyhow::Result<Self> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .unwrap_or(trimmed);
        if digits.len() != 6 {
            bail!("expected six hex digits in color {value:?}");
        }
        let hex = u32::from_str_radix(digits, 16)
            .with_context(|| format!("invalid hex color {value:?}"))?;
        Ok(Self::from_hex(hex))
    }

    /// Channels as bytes, the layout of an sRGB color picker.
    pub fn to_srgb8(&self) -> [u8; 3] {
        let [_, r, g, b] = self.to_hex().to_be_bytes();
        [r, g, b]
    }

    pub fn from_srgb8([r, g, b]: [u8; 3]) -> Self {
        Self::from_hex(u32::from_be_bytes([0, r, g, b]))
    }

    pub fn to_linear(&self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    /// Linear color with a scalar packed into `w`, the layout the shaders expect.
    pub fn to_linear_with(&self, w: f32) -> [f32; 4] {
        let [r, g, b] = self.to_linear();
        [r, g, b, w]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        let [r, g, b] = color.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
