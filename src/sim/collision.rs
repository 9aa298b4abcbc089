//! Axis-aligned boxes and bound clamping
//!
//! Everything in the level is an axis-aligned rectangle. Boxes are used both
//! in world space (geometry queries) and viewport space (overlap tests).

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box with its top-left corner at `pos`
    pub fn at(pos: DVec2, width: f64, height: f64) -> Self {
        Self::new(pos.x, pos.y, width, height)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Strict overlap test; boxes that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Clamp a value into `[lo, hi]`, collapsing to `lo` when the range is inverted
///
/// Level geometry can report bounds that cross (e.g. ground above ceiling);
/// the lower limit wins so the result is always well defined.
#[inline]
pub fn clamp_to_bounds(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}
