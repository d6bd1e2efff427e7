// =============================================================================
// GEOMETRY.RS: Integer rectangles for screen-space sprites
//
// Everything here works in whole pixels with the origin at the top-left
// corner of the screen and y pointing down:
// - Axis-aligned rectangles (sprite bounds, obstacle bounds)
// - Strict interval overlap (collision gating)
// - Clamping a position into a range (screen restriction)
// - Small proximity boxes (bullet hit detection)
// =============================================================================

use glam::IVec2;

/// Axis-aligned rectangle in pixels.  `x`/`y` are the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> i32 { self.x }
    #[inline]
    pub fn top(&self) -> i32 { self.y }
    #[inline]
    pub fn right(&self) -> i32 { self.x.saturating_add(self.w) }
    #[inline]
    pub fn bottom(&self) -> i32 { self.y.saturating_add(self.h) }

    pub fn translated(&self, delta: IVec2) -> Self {
        Self::new(self.x.saturating_add(delta.x), self.y.saturating_add(delta.y), self.w, self.h)
    }

    /// True when the two rectangles share interior area.
    ///
    /// Edges that merely touch (`a.right == b.left`) do not count, so a sprite
    /// can slide along a wall without sticking to it.
    pub fn overlaps(&self, other: &Rect) -> bool {
        intervals_overlap(self.left(), self.right(), other.left(), other.right())
            && intervals_overlap(self.top(), self.bottom(), other.top(), other.bottom())
    }
}

// =============================================================================
// INTERVALS
// =============================================================================

/// Open-interval overlap test on one axis: `(a0, a1)` against `(b0, b1)`.
#[inline]
pub fn intervals_overlap(a0: i32, a1: i32, b0: i32, b1: i32) -> bool {
    a0 < b1 && a1 > b0
}

/// Clamp `v` into `[0, max]`.  A negative `max` (object larger than the
/// screen) pins the value to 0.
#[inline]
pub fn clamp_to_range(v: i32, max: i32) -> i32 {
    v.clamp(0, max.max(0))
}

/// True when `point` lies strictly inside the square of half-width `radius`
/// centred on `center`: `center - radius < point < center + radius` on both axes.
#[inline]
pub fn within_box(center: IVec2, point: IVec2, radius: i32) -> bool {
    center.x.saturating_sub(radius) < point.x
        && point.x < center.x.saturating_add(radius)
        && center.y.saturating_sub(radius) < point.y
        && point.y < center.y.saturating_add(radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_negative_max_pins_to_zero() {
        assert_eq!(clamp_to_range(50, -10), 0);
        assert_eq!(clamp_to_range(-50, -10), 0);
    }

    #[test]
    fn test_within_box_is_exclusive() {
        let c = IVec2::new(10, 10);
        assert!(within_box(c, IVec2::new(14, 6), 5));
        assert!(!within_box(c, IVec2::new(15, 10), 5));
        assert!(!within_box(c, IVec2::new(10, 5), 5));
    }
}
