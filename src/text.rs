use std::collections::HashMap;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use crate::assets::ImageHandle;
use crate::canvas::Color;

/// Colour used when text is requested without one.
pub const DEFAULT_TEXT_COLOR: Color = Color::rgb(30, 10, 100);

// ── Glyph ────────────────────────────────────────────────────────────────────

/// Pixel rectangle of one character inside the font atlas.  The glyph's
/// advance is its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Glyph {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

// ── Font ─────────────────────────────────────────────────────────────────────

/// A bitmap font: an atlas whose alpha channel is the glyph coverage, plus a
/// character → rectangle map.  Glyphs are scaled up by a whole-number factor.
#[derive(Clone)]
pub struct Font {
    atlas: RgbaImage,
    glyphs: HashMap<char, Glyph>,
    /// Unscaled line height in atlas pixels.
    line_height: u32,
    scale: u32,
}

impl Font {
    /// Build a font from an atlas image and the **atlas JSON** format, where
    /// each key is a single character and the value its pixel rectangle:
    ///
    /// ```json
    /// { "A": { "x": 0, "y": 0, "w": 16, "h": 24 }, ... }
    /// ```
    ///
    /// Keys that are not exactly one character are ignored.
    pub fn from_atlas_json(atlas: RgbaImage, json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Glyph> = serde_json::from_str(json)?;
        let glyphs: HashMap<char, Glyph> = raw
            .into_iter()
            .filter_map(|(key, g)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some((ch, g)),
                    _ => None,
                }
            })
            .collect();
        let line_height = glyphs.values().map(|g| g.h).max().unwrap_or(0);
        Ok(Self { atlas, glyphs, line_height, scale: 1 })
    }

    /// The built-in 5×7 font covering printable ASCII from space to `Z`.
    /// Lower-case letters are drawn with their upper-case glyphs.
    pub fn builtin() -> Self {
        let cell_w = BUILTIN_CELL_W;
        let cell_h = BUILTIN_CELL_H;
        let mut atlas = RgbaImage::new(cell_w * BUILTIN_GLYPHS.len() as u32, cell_h);
        let mut glyphs = HashMap::with_capacity(BUILTIN_GLYPHS.len());

        for (i, columns) in BUILTIN_GLYPHS.iter().enumerate() {
            let ox = i as u32 * cell_w;
            for (cx, bits) in columns.iter().enumerate() {
                for row in 0..cell_h {
                    if bits & (1 << row) != 0 {
                        atlas.put_pixel(ox + cx as u32, row, Rgba([255, 255, 255, 255]));
                    }
                }
            }
            let ch = char::from(BUILTIN_FIRST + i as u8);
            glyphs.insert(ch, Glyph { x: ox, y: 0, w: cell_w, h: cell_h });
        }

        Self { atlas, glyphs, line_height: cell_h, scale: 3 }
    }

    /// Scale so a line is as close to `size` pixels as a whole factor allows.
    pub fn with_size(mut self, size: u32) -> Self {
        if self.line_height > 0 {
            self.scale = (size / self.line_height).max(1);
        }
        self
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Rendered line height in pixels.
    pub fn line_height(&self) -> u32 {
        self.line_height * self.scale
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&ch.to_ascii_uppercase()))
    }

    /// Pixel size of `content` rendered on one line.  Unknown characters are
    /// skipped.
    pub fn measure(&self, content: &str) -> (u32, u32) {
        let w: u32 = content.chars().filter_map(|c| self.glyph(c)).map(|g| g.w * self.scale).sum();
        (w, self.line_height())
    }

    /// Render `content` into a new bitmap, with an opaque `background` or a
    /// transparent one.
    pub fn render(&self, content: &str, color: Color, background: Option<Color>) -> RgbaImage {
        let (w, h) = self.measure(content);
        let bg = background.unwrap_or(Color::TRANSPARENT).to_rgba();
        let mut out = RgbaImage::from_pixel(w.max(1), h.max(1), bg);
        let [r, g, b, a] = color.0;

        let mut pen_x = 0;
        for glyph in content.chars().filter_map(|c| self.glyph(c)) {
            for gy in 0..glyph.h {
                for gx in 0..glyph.w {
                    let coverage = self
                        .atlas
                        .get_pixel_checked(glyph.x + gx, glyph.y + gy)
                        .map_or(0, |p| p.0[3]);
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (coverage as u16 * a as u16 / 255) as u8;
                    for sy in 0..self.scale {
                        for sx in 0..self.scale {
                            let px = pen_x + gx * self.scale + sx;
                            let py = gy * self.scale + sy;
                            if px < out.width() && py < out.height() {
                                out.put_pixel(px, py, Rgba([r, g, b, alpha]));
                            }
                        }
                    }
                }
            }
            pen_x += glyph.w * self.scale;
        }
        out
    }
}

// ── TextCache ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    content: String,
    color: Color,
    background: Option<Color>,
}

/// Keeps rendered strings around so per-frame labels are rasterised once.
#[derive(Default)]
pub struct TextCache {
    entries: HashMap<TextKey, ImageHandle>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered bitmap for `content`, reused when the same content, colour
    /// and background were requested before.
    pub fn text(
        &mut self,
        font: &Font,
        content: &str,
        color: Option<Color>,
        background: Option<Color>,
    ) -> ImageHandle {
        let key = TextKey {
            content: content.to_string(),
            color: color.unwrap_or(DEFAULT_TEXT_COLOR),
            background,
        };
        if let Some(handle) = self.entries.get(&key) {
            return Arc::clone(handle);
        }
        let handle = Arc::new(font.render(&key.content, key.color, key.background));
        self.entries.insert(key, Arc::clone(&handle));
        handle
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached bitmap (after switching fonts).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ── Built-in glyph table ─────────────────────────────────────────────────────

const BUILTIN_FIRST: u8 = b' ';
const BUILTIN_CELL_W: u32 = 6;
const BUILTIN_CELL_H: u32 = 8;

/// Column bitmaps (bit 0 = top row) for ' '..='Z'.  The sixth column is the
/// inter-character gap.
const BUILTIN_GLYPHS: [[u8; 6]; 59] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14, 0x00], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12, 0x00], // $
    [0x23, 0x13, 0x08, 0x64, 0x62, 0x00], // %
    [0x36, 0x49, 0x56, 0x20, 0x50, 0x00], // &
    [0x00, 0x08, 0x07, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00, 0x00], // )
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A, 0x00], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08, 0x00], // +
    [0x00, 0x80, 0x70, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08, 0x00], // -
    [0x00, 0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02, 0x00], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E, 0x00], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00, 0x00], // 1
    [0x72, 0x49, 0x49, 0x49, 0x46, 0x00], // 2
    [0x21, 0x41, 0x49, 0x4D, 0x33, 0x00], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10, 0x00], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39, 0x00], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x31, 0x00], // 6
    [0x41, 0x21, 0x11, 0x09, 0x07, 0x00], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36, 0x00], // 8
    [0x46, 0x49, 0x49, 0x29, 0x1E, 0x00], // 9
    [0x00, 0x00, 0x14, 0x00, 0x00, 0x00], // :
    [0x00, 0x40, 0x34, 0x00, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14, 0x00], // =
    [0x00, 0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x59, 0x09, 0x06, 0x00], // ?
    [0x3E, 0x41, 0x5D, 0x59, 0x4E, 0x00], // @
    [0x7C, 0x12, 0x11, 0x12, 0x7C, 0x00], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36, 0x00], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22, 0x00], // C
    [0x7F, 0x41, 0x41, 0x41, 0x3E, 0x00], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41, 0x00], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01, 0x00], // F
    [0x3E, 0x41, 0x41, 0x51, 0x73, 0x00], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F, 0x00], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01, 0x00], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41, 0x00], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40, 0x00], // L
    [0x7F, 0x02, 0x1C, 0x02, 0x7F, 0x00], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F, 0x00], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E, 0x00], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06, 0x00], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E, 0x00], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46, 0x00], // R
    [0x26, 0x49, 0x49, 0x49, 0x32, 0x00], // S
    [0x03, 0x01, 0x7F, 0x01, 0x03, 0x00], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F, 0x00], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F, 0x00], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F, 0x00], // W
    [0x63, 0x14, 0x08, 0x14, 0x63, 0x00], // X
    [0x03, 0x04, 0x78, 0x04, 0x03, 0x00], // Y
    [0x61, 0x59, 0x49, 0x4D, 0x43, 0x00], // Z
];
