// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use tumble_index::{Aabb, RayCastInput, RayCastOutput};

use super::MassData;
use crate::error::GeometryError;
use crate::math::{Transform, cross_vs, normalize};
use crate::settings::{EPSILON, LINEAR_SLOP, MAX_POLYGON_VERTICES, POLYGON_RADIUS};

/// A solid convex polygon with counter-clockwise winding.
///
/// Polygons carry a skin of [`POLYGON_RADIUS`] around their vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonShape {
    vertices: Vec<Point>,
    normals: Vec<Vec2>,
    centroid: Point,
}

impl PolygonShape {
    /// Build the convex hull of `points`.
    ///
    /// Points closer than half of [`LINEAR_SLOP`] to an earlier point are welded away, then
    /// the hull is found by gift wrapping. Collinear points on the hull boundary are
    /// dropped.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::VertexCount`] unless `3 <= points.len() <= MAX_POLYGON_VERTICES`.
    /// - [`GeometryError::TooFewUniqueVertices`] if welding leaves fewer than 3 points.
    /// - [`GeometryError::TooFewHullVertices`] if the points are collinear.
    /// - [`GeometryError::DegenerateEdge`] if a hull edge has zero length.
    /// - [`GeometryError::AreaTooSmall`] if the hull encloses no area.
    pub fn new(points: &[Point]) -> Result<Self, GeometryError> {
        let count = points.len();
        if !(3..=MAX_POLYGON_VERTICES).contains(&count) {
            return Err(GeometryError::VertexCount {
                count,
                max: MAX_POLYGON_VERTICES,
            });
        }

        // Weld close points.
        let weld_distance_sq = (0.5 * LINEAR_SLOP) * (0.5 * LINEAR_SLOP);
        let mut ps: Vec<Point> = Vec::with_capacity(count);
        for &v in points {
            if ps.iter().all(|p| (v - *p).hypot2() >= weld_distance_sq) {
                ps.push(v);
            }
        }
        let n = ps.len();
        if n < 3 {
            return Err(GeometryError::TooFewUniqueVertices(n));
        }

        // Start with the right-most point, lowest on ties; it is on the hull.
        let mut i0 = 0;
        let mut x0 = ps[0].x;
        for (i, p) in ps.iter().enumerate().skip(1) {
            if p.x > x0 || (p.x == x0 && p.y < ps[i0].y) {
                i0 = i;
                x0 = p.x;
            }
        }

        let mut hull: Vec<usize> = Vec::with_capacity(n);
        let mut ih = i0;
        loop {
            hull.push(ih);
            let current = ps[ih];

            let mut ie = 0;
            for j in 1..n {
                if ie == ih {
                    ie = j;
                    continue;
                }
                let r = ps[ie] - current;
                let v = ps[j] - current;
                let c = r.cross(v);
                if c < 0.0 {
                    ie = j;
                }
                // Collinearity check.
                if c == 0.0 && v.hypot2() > r.hypot2() {
                    ie = j;
                }
            }

            ih = ie;
            if ie == i0 || hull.len() == n {
                break;
            }
        }

        if hull.len() < 3 {
            return Err(GeometryError::TooFewHullVertices(hull.len()));
        }

        let vertices: Vec<Point> = hull.iter().map(|&i| ps[i]).collect();
        let m = vertices.len();
        let mut normals = Vec::with_capacity(m);
        for i in 0..m {
            let edge = vertices[(i + 1) % m] - vertices[i];
            if edge.hypot2() <= EPSILON * EPSILON {
                return Err(GeometryError::DegenerateEdge { index: i });
            }
            normals.push(normalize(cross_vs(edge, 1.0)));
        }

        let centroid = compute_centroid(&vertices)?;
        Ok(Self {
            vertices,
            normals,
            centroid,
        })
    }

    /// An axis-aligned box with half-widths `hx` and `hy`, centered on the origin.
    pub fn new_box(hx: f64, hy: f64) -> Self {
        Self {
            vertices: Vec::from([
                Point::new(-hx, -hy),
                Point::new(hx, -hy),
                Point::new(hx, hy),
                Point::new(-hx, hy),
            ]),
            normals: Vec::from([
                Vec2::new(0.0, -1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(-1.0, 0.0),
            ]),
            centroid: Point::ORIGIN,
        }
    }

    /// A box with half-widths `hx` and `hy`, centered at `center` and rotated by `angle`.
    pub fn new_oriented_box(hx: f64, hy: f64, center: Point, angle: f64) -> Self {
        let mut shape = Self::new_box(hx, hy);
        let xf = Transform::new(center, angle);
        for v in &mut shape.vertices {
            *v = xf.apply(*v);
        }
        for n in &mut shape.normals {
            *n = xf.q.rotate(*n);
        }
        shape.centroid = center;
        shape
    }

    /// Hull vertices in counter-clockwise order.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Outward unit normal of each edge `vertices[i] -> vertices[i + 1]`.
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Area centroid.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Skin thickness.
    pub fn radius(&self) -> f64 {
        POLYGON_RADIUS
    }

    /// Check that the vertices are convex and wound counter-clockwise.
    pub fn validate(&self) -> bool {
        let n = self.vertices.len();
        for i1 in 0..n {
            let i2 = (i1 + 1) % n;
            let p = self.vertices[i1];
            let e = self.vertices[i2] - p;
            for (j, v) in self.vertices.iter().enumerate() {
                if j == i1 || j == i2 {
                    continue;
                }
                if e.cross(*v - p) < 0.0 {
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn test_point(&self, xf: &Transform, p: Point) -> bool {
        let local = xf.apply_inverse(p);
        self.vertices
            .iter()
            .zip(&self.normals)
            .all(|(v, n)| n.dot(local - *v) <= 0.0)
    }

    pub(crate) fn ray_cast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        // Put the ray into the polygon's frame of reference.
        let p1 = xf.apply_inverse(input.p1);
        let p2 = xf.apply_inverse(input.p2);
        let d = p2 - p1;

        let mut lower = 0.0;
        let mut upper = input.max_fraction;
        let mut index = None;

        for (i, (v, n)) in self.vertices.iter().zip(&self.normals).enumerate() {
            // p = p1 + a * d
            // dot(normal, p - v) = 0
            // dot(normal, p1 - v) + a * dot(normal, d) = 0
            let numerator = n.dot(*v - p1);
            let denominator = n.dot(d);

            if denominator == 0.0 {
                if numerator < 0.0 {
                    return None;
                }
            } else if denominator < 0.0 && numerator < lower * denominator {
                // The segment enters this half-space.
                lower = numerator / denominator;
                index = Some(i);
            } else if denominator > 0.0 && numerator < upper * denominator {
                // The segment exits this half-space.
                upper = numerator / denominator;
            }

            if upper < lower {
                return None;
            }
        }

        index.map(|i| RayCastOutput {
            normal: xf.q.rotate(self.normals[i]),
            fraction: lower,
        })
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let first = xf.apply(self.vertices[0]);
        let tight = self.vertices[1..]
            .iter()
            .fold(Aabb::from_points(first, first), |aabb, v| {
                let p = xf.apply(*v);
                aabb.union(&Aabb::from_points(p, p))
            });
        tight.fattened(self.radius())
    }

    pub(crate) fn compute_mass(&self, density: f64) -> MassData {
        // The polygon is split into triangles fanning out from the first vertex, which also
        // serves as the reference point to keep the sums well conditioned.
        const INV3: f64 = 1.0 / 3.0;
        let s = self.vertices[0];
        let n = self.vertices.len();

        let mut center = Vec2::ZERO;
        let mut area = 0.0;
        let mut inertia = 0.0;
        for i in 0..n {
            let e1 = self.vertices[i] - s;
            let e2 = self.vertices[(i + 1) % n] - s;
            let d = e1.cross(e2);

            let triangle_area = 0.5 * d;
            area += triangle_area;
            center += triangle_area * INV3 * (e1 + e2);

            let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
            let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
            inertia += (0.25 * INV3 * d) * (intx2 + inty2);
        }

        let mass = density * area;
        // Construction guarantees a positive area.
        debug_assert!(area > EPSILON, "polygon area is degenerate");
        center /= area;
        let world_center = center + s.to_vec2();

        MassData {
            mass,
            center: world_center.to_point(),
            // Shift the inertia from the reference point to the shape origin.
            inertia: density * inertia
                + mass * (world_center.dot(world_center) - center.dot(center)),
        }
    }
}

fn compute_centroid(vertices: &[Point]) -> Result<Point, GeometryError> {
    const INV3: f64 = 1.0 / 3.0;
    // Triangle fan relative to the first vertex.
    let s = vertices[0];
    let n = vertices.len();

    let mut c = Vec2::ZERO;
    let mut area = 0.0;
    for i in 0..n {
        let p2 = vertices[i] - s;
        let p3 = vertices[(i + 1) % n] - s;
        let triangle_area = 0.5 * p2.cross(p3);
        area += triangle_area;
        c += triangle_area * INV3 * (p2 + p3);
    }

    if area <= EPSILON {
        return Err(GeometryError::AreaTooSmall(area));
    }
    Ok(s + c / area)
}
