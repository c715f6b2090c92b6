//! Geometry helpers for the 2D playfield
//!
//! Everything in the level is either a circle (player, extinguisher) or an
//! axis-aligned rectangle (obstacles, ground, fire zones). Screen space is
//! y-down with the origin at the top-left corner.

use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle defined by its top-left corner and size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from two arbitrary corners (drag start/end).
    /// Dragging up or left yields a positive size anchored at the smaller corner.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn top_left(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Vec2 {
        vec2(self.right(), self.bottom())
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn half_extents(&self) -> Vec2 {
        vec2(self.w * 0.5, self.h * 0.5)
    }

    /// Check if a point is inside (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Closest point on (or in) the rectangle to `point`.
    ///
    /// Clamps the offset from the centre to the half extents, so a point that is
    /// already inside maps to itself.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let center = self.center();
        let half = self.half_extents();
        let offset = (point - center).clamp(-half, half);
        center + offset
    }

    /// True if a circle overlaps this rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) < radius * radius
    }

    /// True if the two rectangles share any interior area
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Project `a` onto `b`. Returns zero when `b` has no length.
pub fn project(a: Vec2, b: Vec2) -> Vec2 {
    let len_sq = b.length_squared();
    if len_sq <= f32::EPSILON {
        return Vec2::ZERO;
    }
    b * (a.dot(b) / len_sq)
}

/// Serialize a `Vec2` as an `(x, y)` tuple.
///
/// macroquad's glam build does not enable serde, so level records go through this.
pub mod serde_vec2 {
    use macroquad::math::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec2, s: S) -> Result<S::Ok, S::Error> {
        (v.x, v.y).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec2, D::Error> {
        let (x, y) = <(f32, f32)>::deserialize(d)?;
        Ok(Vec2::new(x, y))
    }
}
