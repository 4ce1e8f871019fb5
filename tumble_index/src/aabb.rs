// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes and the ray-cast value types shared by the tree and shapes.

use kurbo::{Point, Rect, Vec2};

/// Axis-aligned bounding box in 2D.
///
/// Invariant: `lower <= upper` componentwise (see [`Aabb::is_valid`]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Lower vertex (minimum x and y).
    pub lower: Point,
    /// Upper vertex (maximum x and y).
    pub upper: Point,
}

/// Input for a ray cast: the segment `p1 + t * (p2 - p1)` for `t` in `[0, max_fraction]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastInput {
    /// Ray origin.
    pub p1: Point,
    /// Point the ray passes through at fraction `1`.
    pub p2: Point,
    /// Largest fraction of `p2 - p1` considered.
    pub max_fraction: f64,
}

/// Result of a successful ray cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastOutput {
    /// Surface normal at the hit, in world space.
    pub normal: Vec2,
    /// Hit fraction along `p2 - p1`.
    pub fraction: f64,
}

impl RayCastInput {
    /// A ray from `p1` through `p2` with `max_fraction = 1`.
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            max_fraction: 1.0,
        }
    }

    /// Point on the ray at `fraction`.
    pub fn point_at(&self, fraction: f64) -> Point {
        self.p1 + fraction * (self.p2 - self.p1)
    }
}

impl Aabb {
    /// Create a new AABB from lower/upper corners.
    pub const fn new(lower: Point, upper: Point) -> Self {
        Self { lower, upper }
    }

    /// Create an AABB from coordinates.
    pub const fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            lower: Point::new(min_x, min_y),
            upper: Point::new(max_x, max_y),
        }
    }

    /// The tight box around two points.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            lower: min_point(a, b),
            upper: max_point(a, b),
        }
    }

    /// Componentwise union of two boxes.
    pub fn combine(a: &Self, b: &Self) -> Self {
        Self {
            lower: min_point(a.lower, b.lower),
            upper: max_point(a.upper, b.upper),
        }
    }

    /// Union of this box with another.
    pub fn union(&self, other: &Self) -> Self {
        Self::combine(self, other)
    }

    /// Whether `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Self) -> bool {
        self.lower.x <= other.lower.x
            && self.lower.y <= other.lower.y
            && other.upper.x <= self.upper.x
            && other.upper.y <= self.upper.y
    }

    /// Whether the two boxes overlap. Touching boxes overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let d1 = other.lower - self.upper;
        let d2 = self.lower - other.upper;
        !(d1.x > 0.0 || d1.y > 0.0 || d2.x > 0.0 || d2.y > 0.0)
    }

    /// Perimeter of the box. Used as the insertion cost metric, not as a true area.
    pub fn perimeter(&self) -> f64 {
        let w = self.upper - self.lower;
        2.0 * (w.x + w.y)
    }

    /// Center point.
    pub fn center(&self) -> Point {
        self.lower.midpoint(self.upper)
    }

    /// Half-widths along each axis.
    pub fn extents(&self) -> Vec2 {
        0.5 * (self.upper - self.lower)
    }

    /// Finite corners with `lower <= upper`.
    pub fn is_valid(&self) -> bool {
        let d = self.upper - self.lower;
        d.x >= 0.0
            && d.y >= 0.0
            && self.lower.x.is_finite()
            && self.lower.y.is_finite()
            && self.upper.x.is_finite()
            && self.upper.y.is_finite()
    }

    /// The box grown by `margin` on every side.
    pub fn fattened(&self, margin: f64) -> Self {
        let r = Vec2::new(margin, margin);
        Self {
            lower: self.lower - r,
            upper: self.upper + r,
        }
    }

    /// The box moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            lower: self.lower + offset,
            upper: self.upper + offset,
        }
    }

    /// Slab test of a ray against this box.
    ///
    /// Returns `None` when the ray misses, when it starts inside the box, or when the
    /// entry fraction is beyond `input.max_fraction`.
    pub fn ray_cast(&self, input: &RayCastInput) -> Option<RayCastOutput> {
        let mut tmin = f64::MIN;
        let mut tmax = f64::MAX;

        let p = input.p1;
        let d = input.p2 - input.p1;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let (p_i, d_i, lo, hi) = if axis == 0 {
                (p.x, d.x, self.lower.x, self.upper.x)
            } else {
                (p.y, d.y, self.lower.y, self.upper.y)
            };
            if d_i.abs() < f64::EPSILON {
                // Parallel to this slab.
                if p_i < lo || hi < p_i {
                    return None;
                }
            } else {
                let inv_d = 1.0 / d_i;
                let mut t1 = (lo - p_i) * inv_d;
                let mut t2 = (hi - p_i) * inv_d;
                let mut s = -1.0;
                if t1 > t2 {
                    core::mem::swap(&mut t1, &mut t2);
                    s = 1.0;
                }
                if t1 > tmin {
                    normal = if axis == 0 {
                        Vec2::new(s, 0.0)
                    } else {
                        Vec2::new(0.0, s)
                    };
                    tmin = t1;
                }
                tmax = tmax.min(t2);
                if tmin > tmax {
                    return None;
                }
            }
        }

        if tmin < 0.0 || input.max_fraction < tmin {
            return None;
        }
        Some(RayCastOutput {
            normal,
            fraction: tmin,
        })
    }
}

impl From<Rect> for Aabb {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::from_coords(r.x0, r.y0, r.x1, r.y1)
    }
}

impl From<Aabb> for Rect {
    fn from(a: Aabb) -> Self {
        Self::from_points(a.lower, a.upper)
    }
}

pub(crate) fn min_point(a: Point, b: Point) -> Point {
    Point::new(a.x.min(b.x), a.y.min(b.y))
}

pub(crate) fn max_point(a: Point, b: Point) -> Point {
    Point::new(a.x.max(b.x), a.y.max(b.y))
}
