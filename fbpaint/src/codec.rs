//! Pixel codec: depth-independent colors and their native framebuffer encoding.

use crate::error::{Error, Result};

/// Bits per pixel the engine can draw into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelDepth {
    /// RGB565, alpha discarded.
    Depth16,
    /// Packed 8-bit RGBA.
    Depth32,
}

impl PixelDepth {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            16 => Ok(Self::Depth16),
            32 => Ok(Self::Depth32),
            other => Err(Error::UnsupportedDepth(other)),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::Depth16 => 16,
            Self::Depth32 => 32,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Depth16 => 2,
            Self::Depth32 => 4,
        }
    }
}

/// An 8-bit-per-channel color, independent of the device depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs the channels into the 32-bit value used for 32bpp devices.
    ///
    /// The layout depends on host byte order so that the in-memory bytes of
    /// the value are the same on every host: little-endian packs R into the
    /// most significant byte, big-endian packs it into the least.
    pub const fn packed(self) -> u32 {
        let (r, g, b, a) = (self.r as u32, self.g as u32, self.b as u32, self.a as u32);
        if cfg!(target_endian = "little") {
            r << 24 | g << 16 | b << 8 | a
        } else {
            a << 24 | b << 16 | g << 8 | r
        }
    }

    /// Inverse of [`Color::packed`].
    pub const fn from_packed(value: u32) -> Self {
        let bytes = value.to_be_bytes();
        if cfg!(target_endian = "little") {
            Self::rgba(bytes[0], bytes[1], bytes[2], bytes[3])
        } else {
            Self::rgba(bytes[3], bytes[2], bytes[1], bytes[0])
        }
    }

    /// RGB565 value. Channels are truncated, not rounded.
    pub const fn rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_packed(value)
    }
}

/// A color already converted to the byte pattern of one device depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPixel {
    bytes: [u8; 4],
    depth: PixelDepth,
}

impl EncodedPixel {
    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Exactly `depth.bytes_per_pixel()` bytes, in device order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.depth.bytes_per_pixel()]
    }
}

pub fn encode(color: Color, depth: PixelDepth) -> EncodedPixel {
    let mut bytes = [0u8; 4];
    match depth {
        PixelDepth::Depth32 => bytes.copy_from_slice(&color.packed().to_ne_bytes()),
        PixelDepth::Depth16 => bytes[..2].copy_from_slice(&color.rgb565().to_ne_bytes()),
    }
    EncodedPixel { bytes, depth }
}

/// Like [`encode`], for a raw bits-per-pixel value as reported by the driver.
pub fn encode_bits(color: Color, bits: u32) -> Result<EncodedPixel> {
    Ok(encode(color, PixelDepth::from_bits(bits)?))
}
