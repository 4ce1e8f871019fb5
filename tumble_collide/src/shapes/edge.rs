// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use tumble_index::{Aabb, RayCastInput, RayCastOutput};

use super::{MassData, segment_aabb};
use crate::math::{Transform, normalize};
use crate::settings::POLYGON_RADIUS;

/// A line segment.
///
/// One-sided edges collide only from the right of `vertex1 -> vertex2` (the side the
/// outward normal of a counter-clockwise polygon would point to). The ghost vertices
/// `vertex0` and `vertex3` describe the neighboring geometry so contacts can be smoothed
/// across edge junctions.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeShape {
    /// Ghost vertex preceding `vertex1`.
    pub vertex0: Point,
    /// First vertex.
    pub vertex1: Point,
    /// Second vertex.
    pub vertex2: Point,
    /// Ghost vertex following `vertex2`.
    pub vertex3: Point,
    /// Whether only the right-hand side collides.
    pub one_sided: bool,
}

impl EdgeShape {
    /// A two-sided segment from `v1` to `v2`.
    pub fn new_two_sided(v1: Point, v2: Point) -> Self {
        Self {
            vertex0: v1,
            vertex1: v1,
            vertex2: v2,
            vertex3: v2,
            one_sided: false,
        }
    }

    /// A one-sided segment from `v1` to `v2` with ghost neighbors `v0` and `v3`.
    pub fn new_one_sided(v0: Point, v1: Point, v2: Point, v3: Point) -> Self {
        Self {
            vertex0: v0,
            vertex1: v1,
            vertex2: v2,
            vertex3: v3,
            one_sided: true,
        }
    }

    /// Skin thickness, shared with polygons.
    pub fn radius(&self) -> f64 {
        POLYGON_RADIUS
    }

    pub(crate) fn ray_cast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        ray_cast_segment(self.vertex1, self.vertex2, self.one_sided, input, xf)
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform) -> Aabb {
        segment_aabb(xf.apply(self.vertex1), xf.apply(self.vertex2), self.radius())
    }

    pub(crate) fn compute_mass(&self) -> MassData {
        MassData {
            mass: 0.0,
            center: self.vertex1.midpoint(self.vertex2),
            inertia: 0.0,
        }
    }
}

/// Ray cast against the segment `v1 -> v2` given in the local frame of `xf`.
pub(crate) fn ray_cast_segment(
    v1: Point,
    v2: Point,
    one_sided: bool,
    input: &RayCastInput,
    xf: &Transform,
) -> Option<RayCastOutput> {
    // Put the ray into the edge's frame of reference.
    let p1 = xf.apply_inverse(input.p1);
    let p2 = xf.apply_inverse(input.p2);
    let d = p2 - p1;

    let e = v2 - v1;
    let normal = normalize(Vec2::new(e.y, -e.x));

    // q = p1 + t * d
    // dot(normal, q - v1) = 0
    let numerator = normal.dot(v1 - p1);
    if one_sided && numerator > 0.0 {
        return None;
    }

    let denominator = normal.dot(d);
    if denominator == 0.0 {
        return None;
    }

    let t = numerator / denominator;
    if t < 0.0 || input.max_fraction < t {
        return None;
    }

    let q = p1 + t * d;

    // q = v1 + s * r
    // s = dot(q - v1, r) / dot(r, r)
    let rr = e.hypot2();
    if rr == 0.0 {
        return None;
    }
    let s = (q - v1).dot(e) / rr;
    if !(0.0..=1.0).contains(&s) {
        return None;
    }

    let world_normal = xf.q.rotate(normal);
    Some(RayCastOutput {
        normal: if numerator > 0.0 {
            -world_normal
        } else {
            world_normal
        },
        fraction: t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ground() -> (EdgeShape, EdgeShape) {
        let v1 = Point::new(-1.0, 0.0);
        let v2 = Point::new(1.0, 0.0);
        // Running right to left, so the solid side faces up.
        let one_sided = EdgeShape::new_one_sided(
            Point::new(2.0, 0.0),
            v2,
            v1,
            Point::new(-2.0, 0.0),
        );
        (EdgeShape::new_two_sided(v1, v2), one_sided)
    }

    #[test]
    fn two_sided_edge_is_hit_from_both_sides() {
        let (edge, _) = ground();
        let xf = Transform::IDENTITY;

        let down = RayCastInput::new(Point::new(0.5, 2.0), Point::new(0.5, -2.0));
        let hit = edge.ray_cast(&down, &xf).unwrap();
        assert_relative_eq!(hit.fraction, 0.5);
        assert_relative_eq!(hit.normal.y, 1.0);

        let up = RayCastInput::new(Point::new(0.5, -2.0), Point::new(0.5, 2.0));
        let hit = edge.ray_cast(&up, &xf).unwrap();
        assert_relative_eq!(hit.fraction, 0.5);
        assert_relative_eq!(hit.normal.y, -1.0);
    }

    #[test]
    fn one_sided_edge_ignores_the_back_face() {
        let (_, edge) = ground();
        let xf = Transform::IDENTITY;

        let down = RayCastInput::new(Point::new(0.5, 2.0), Point::new(0.5, -2.0));
        let hit = edge.ray_cast(&down, &xf).unwrap();
        assert_relative_eq!(hit.normal.y, 1.0);

        let up = RayCastInput::new(Point::new(0.5, -2.0), Point::new(0.5, 2.0));
        assert!(edge.ray_cast(&up, &xf).is_none());
    }

    #[test]
    fn ray_past_the_end_misses() {
        let (edge, _) = ground();
        let input = RayCastInput::new(Point::new(1.5, 2.0), Point::new(1.5, -2.0));
        assert!(edge.ray_cast(&input, &Transform::IDENTITY).is_none());
    }

    #[test]
    fn aabb_spans_both_vertices() {
        let edge = EdgeShape::new_two_sided(Point::new(0.0, 1.0), Point::new(2.0, -1.0));
        let aabb = edge.compute_aabb(&Transform::IDENTITY);
        assert_relative_eq!(aabb.lower.x, -POLYGON_RADIUS);
        assert_relative_eq!(aabb.lower.y, -1.0 - POLYGON_RADIUS);
        assert_relative_eq!(aabb.upper.x, 2.0 + POLYGON_RADIUS);
        assert_relative_eq!(aabb.upper.y, 1.0 + POLYGON_RADIUS);
        assert_eq!(edge.compute_mass().center, Point::new(1.0, 0.0));
    }
}
