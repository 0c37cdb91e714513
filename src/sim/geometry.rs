//! Axis-aligned box geometry
//!
//! Every entity in the arena is an axis-aligned box described by its center
//! and half extents. All functions here are total: they never fail and never
//! divide by a length.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box (center + half extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    /// Square box of side `size` centered at `center`
    pub fn square(center: Vec2, size: f32) -> Self {
        Self::new(center, Vec2::splat(size))
    }

    /// Box from its top-left corner and size
    pub fn from_corner(min: Vec2, size: Vec2) -> Self {
        Self::new(min + size * 0.5, size)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Same box moved to a new center
    #[inline]
    pub fn at(&self, center: Vec2) -> Self {
        Self {
            center,
            half: self.half,
        }
    }
}

/// Strict overlap test (touching edges do not overlap)
#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    let d = (a.center - b.center).abs();
    let reach = a.half + b.half;
    d.x < reach.x && d.y < reach.y
}

/// Euclidean distance between box centers
#[inline]
pub fn center_distance(a: &Aabb, b: &Aabb) -> f32 {
    a.center.distance(b.center)
}

/// Squared-distance fast reject: true when the centers are closer than `radius`
#[inline]
pub fn within_distance(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Circle overlap between the two box centers with the given radii
#[inline]
pub fn circles_overlap(a: &Aabb, b: &Aabb, radius_a: f32, radius_b: f32) -> bool {
    center_distance(a, b) < radius_a + radius_b
}

/// Inclusive point-in-box test
#[inline]
pub fn contains_point(b: &Aabb, point: Vec2) -> bool {
    let min = b.min();
    let max = b.max();
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Clamp a box center so the whole box stays inside `[lo, hi]`
#[inline]
pub fn clamp_inside(center: Vec2, half: Vec2, lo: Vec2, hi: Vec2) -> Vec2 {
    let min = lo + half;
    let max = (hi - half).max(min);
    center.clamp(min, max)
}
