//! Scene files: a JSON list of shapes drawn in order onto the framebuffer.

use std::path::Path;

use anyhow::{bail, Context, Result};
use fbpaint::{Color, Device, Framebuffer};
use serde::Deserialize;

/// Colors as written in scene files: `[r, g, b]`, `[r, g, b, a]`,
/// `"#rrggbb"`, `"#rrggbbaa"`, or a packed 32-bit value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
    Hex(String),
    Packed(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ColorSpec")]
pub struct Paint(pub Color);

impl TryFrom<ColorSpec> for Paint {
    type Error = anyhow::Error;

    fn try_from(spec: ColorSpec) -> Result<Self> {
        let color = match spec {
            ColorSpec::Rgb([r, g, b]) => Color::rgb(r, g, b),
            ColorSpec::Rgba([r, g, b, a]) => Color::rgba(r, g, b, a),
            ColorSpec::Packed(value) => Color::from_packed(value),
            ColorSpec::Hex(hex) => parse_hex(&hex)?,
        };
        Ok(Paint(color))
    }
}

fn parse_hex(hex: &str) -> Result<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
        bail!("bad color {hex:?}, expected #rrggbb or #rrggbbaa");
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).with_context(|| format!("bad color {hex:?}"))
    };
    let alpha = if digits.len() == 8 { channel(6)? } else { 0xFF };
    Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Pixel { x: i32, y: i32, color: Paint },
    Hline { x: i32, y: i32, len: i32, color: Paint },
    Vline { x: i32, y: i32, len: i32, color: Paint },
    Line { x1: i32, y1: i32, x2: i32, y2: i32, color: Paint },
    Circle { x: i32, y: i32, r: i32, color: Paint },
    Rect { x: i32, y: i32, w: i32, h: i32, color: Paint },
    FillRect { x: i32, y: i32, w: i32, h: i32, color: Paint },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub clear: Option<Paint>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse scene {}", path.display()))
    }

    /// Draws into the offscreen buffer; the caller flushes.
    pub fn draw<D: Device>(&self, fb: &mut Framebuffer<D>) {
        if let Some(Paint(color)) = self.clear {
            fb.fill(color);
        }
        for shape in &self.shapes {
            match *shape {
                Shape::Pixel { x, y, color } => fb.set_pixel(x, y, color.0),
                Shape::Hline { x, y, len, color } => fb.horizontal_line(x, y, len, color.0),
                Shape::Vline { x, y, len, color } => fb.vertical_line(x, y, len, color.0),
                Shape::Line { x1, y1, x2, y2, color } => fb.line(x1, y1, x2, y2, color.0),
                Shape::Circle { x, y, r, color } => fb.circle(x, y, r, color.0),
                Shape::Rect { x, y, w, h, color } => fb.rect(x, y, w, h, color.0),
                Shape::FillRect { x, y, w, h, color } => fb.fill_rect(x, y, w, h, color.0),
            }
        }
    }
}

const BG: Color = Color::rgb(0x0D, 0x11, 0x17);
const BORDER: Color = Color::rgb(0x30, 0x36, 0x3D);
const ACCENT_BLUE: Color = Color::rgb(0x58, 0xA6, 0xFF);
const ACCENT_GREEN: Color = Color::rgb(0x3F, 0xB9, 0x50);
const ACCENT_RED: Color = Color::rgb(0xF8, 0x51, 0x49);

/// Border, both diagonals, a crosshair and concentric circles, scaled to
/// the screen.
pub fn test_pattern(width: u32, height: u32) -> Scene {
    let (w, h) = (width as i32, height as i32);
    let (cx, cy) = (w / 2, h / 2);
    let paint = Paint;

    let mut shapes = vec![
        Shape::Rect { x: 0, y: 0, w, h, color: paint(BORDER) },
        Shape::Line { x1: 0, y1: 0, x2: w - 1, y2: h - 1, color: paint(ACCENT_BLUE) },
        Shape::Line { x1: w - 1, y1: 0, x2: 0, y2: h - 1, color: paint(ACCENT_BLUE) },
        Shape::Hline { x: 0, y: cy, len: w, color: paint(BORDER) },
        Shape::Vline { x: cx, y: 0, len: h, color: paint(BORDER) },
    ];

    let step = (w.min(h) / 10).max(1);
    for (i, r) in (1..5).map(|k| k * step).enumerate() {
        let color = if i % 2 == 0 { ACCENT_GREEN } else { ACCENT_RED };
        shapes.push(Shape::Circle { x: cx, y: cy, r, color: paint(color) });
    }
    shapes.push(Shape::FillRect { x: cx - 2, y: cy - 2, w: 5, h: 5, color: paint(Color::WHITE) });

    Scene { clear: Some(paint(BG)), shapes }
}
