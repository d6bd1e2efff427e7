use glam::IVec2;
use image::{Pixel, Rgba, RgbaImage};

use crate::entity::{Entity, Visual};
use crate::geometry::Rect;
use crate::text::Font;

// ── Color ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GRAY: Self = Self::rgb(150, 150, 150);
    pub const RED: Self = Self::rgb(200, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 150, 40);
    pub const BLUE: Self = Self::rgb(0, 15, 64);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }
}

// ── Canvas ─────────────────────────────────────────────────────────────────

/// Fixed-size CPU pixel buffer that a frame is composed into before it is
/// handed to the presenter.
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::from_pixel(width, height, Color::BLACK.to_rgba()) }
    }

    pub fn width(&self) -> u32 { self.pixels.width() }
    pub fn height(&self) -> u32 { self.pixels.height() }
    pub fn pixels(&self) -> &RgbaImage { &self.pixels }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(Color(self.pixels.get_pixel(x, y).0))
        } else {
            None
        }
    }

    /// Paint the whole surface with an opaque colour.
    pub fn fill(&mut self, color: Color) {
        let px = color.to_rgba();
        for p in self.pixels.pixels_mut() {
            *p = px;
        }
    }

    /// Paint `rect`, clipped to the surface.  Translucent colours are blended.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.left().max(0) as u32;
        let y0 = rect.top().max(0) as u32;
        let x1 = rect.right().clamp(0, self.width() as i32) as u32;
        let y1 = rect.bottom().clamp(0, self.height() as i32) as u32;
        let px = color.to_rgba();
        for y in y0..y1 {
            for x in x0..x1 {
                if color.0[3] == 255 {
                    self.pixels.put_pixel(x, y, px);
                } else {
                    self.pixels.get_pixel_mut(x, y).blend(&px);
                }
            }
        }
    }

    /// Alpha-composite `image` with its top-left corner at `pos`.  Parts that
    /// fall off the surface are dropped.
    pub fn blit(&mut self, image: &RgbaImage, pos: IVec2) {
        image::imageops::overlay(&mut self.pixels, image, pos.x as i64, pos.y as i64);
    }

    /// Render `content` with `font` and blit it at `pos`.  Uncached; see
    /// [`TextCache`](crate::text::TextCache) for labels drawn every frame.
    pub fn draw_text(&mut self, font: &Font, content: &str, pos: IVec2, color: Color, background: Option<Color>) {
        let rendered = font.render(content, color, background);
        self.blit(&rendered, pos);
    }

    pub fn draw_entity(&mut self, entity: &Entity) {
        match entity.visual() {
            Visual::Image(handle) => self.blit(handle, entity.pos),
            Visual::Fill { color, .. } => self.fill_rect(entity.rect(), *color),
        }
    }
}
