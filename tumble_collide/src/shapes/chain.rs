// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use tumble_index::{Aabb, RayCastInput, RayCastOutput};

use super::edge::{EdgeShape, ray_cast_segment};
use super::segment_aabb;
use crate::error::GeometryError;
use crate::math::Transform;
use crate::settings::{EPSILON, LINEAR_SLOP, POLYGON_RADIUS};

/// A polyline of one-sided edges, open or closed.
///
/// Each consecutive vertex pair is one child. Solid geometry should be on the right of
/// the winding (closed loops wound counter-clockwise collide from outside). The vertex
/// before the first child and after the last one serve as ghost vertices so that shapes
/// sliding along the chain see a continuous surface.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainShape {
    /// For loops the first vertex is repeated at the end.
    vertices: Vec<Point>,
    prev_vertex: Point,
    next_vertex: Point,
    is_loop: bool,
}

impl ChainShape {
    /// A closed loop through `vertices`. The closing edge is added automatically.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::LoopTooShort`] for fewer than 3 vertices.
    /// - [`GeometryError::VerticesTooClose`] if two consecutive vertices, including the
    ///   last and the first, are within [`LINEAR_SLOP`].
    /// - [`GeometryError::AreaTooSmall`] if the loop encloses no area.
    pub fn new_loop(vertices: &[Point]) -> Result<Self, GeometryError> {
        let count = vertices.len();
        if count < 3 {
            return Err(GeometryError::LoopTooShort(count));
        }
        check_spacing(vertices)?;
        if (vertices[count - 1] - vertices[0]).hypot2() <= LINEAR_SLOP * LINEAR_SLOP {
            return Err(GeometryError::VerticesTooClose { index: 0 });
        }

        let area = signed_area(vertices);
        if area.abs() <= EPSILON {
            return Err(GeometryError::AreaTooSmall(area));
        }

        let mut stored = Vec::with_capacity(count + 1);
        stored.extend_from_slice(vertices);
        stored.push(vertices[0]);
        Ok(Self {
            prev_vertex: vertices[count - 1],
            next_vertex: vertices[1],
            vertices: stored,
            is_loop: true,
        })
    }

    /// An open chain through `vertices`, with `prev_vertex` and `next_vertex` as the ghost
    /// neighbors of its two ends.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::ChainTooShort`] for fewer than 2 vertices.
    /// - [`GeometryError::VerticesTooClose`] if two consecutive vertices are within
    ///   [`LINEAR_SLOP`].
    pub fn new_chain(
        vertices: &[Point],
        prev_vertex: Point,
        next_vertex: Point,
    ) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::ChainTooShort(vertices.len()));
        }
        check_spacing(vertices)?;
        Ok(Self {
            vertices: vertices.to_vec(),
            prev_vertex,
            next_vertex,
            is_loop: false,
        })
    }

    /// Stored vertices. Loops repeat their first vertex at the end.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Ghost vertex before the first child.
    pub fn prev_vertex(&self) -> Point {
        self.prev_vertex
    }

    /// Ghost vertex after the last child.
    pub fn next_vertex(&self) -> Point {
        self.next_vertex
    }

    /// Whether the chain is closed.
    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    /// Number of edges.
    pub fn child_count(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Skin thickness.
    pub fn radius(&self) -> f64 {
        POLYGON_RADIUS
    }

    /// The one-sided edge for child `index`, with its ghost vertices filled in from the
    /// neighboring children.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.child_count()`.
    pub fn child_edge(&self, index: usize) -> EdgeShape {
        assert!(
            index < self.child_count(),
            "chain child {index} out of range ({} children)",
            self.child_count()
        );
        let v = &self.vertices;
        let v0 = if index > 0 {
            v[index - 1]
        } else {
            self.prev_vertex
        };
        let v3 = if index + 2 < v.len() {
            v[index + 2]
        } else {
            self.next_vertex
        };
        EdgeShape::new_one_sided(v0, v[index], v[index + 1], v3)
    }

    /// The two vertices of child `index`.
    pub(crate) fn child_vertices(&self, index: usize) -> (Point, Point) {
        (self.vertices[index], self.vertices[index + 1])
    }

    pub(crate) fn ray_cast(
        &self,
        input: &RayCastInput,
        xf: &Transform,
        child_index: usize,
    ) -> Option<RayCastOutput> {
        let (v1, v2) = self.child_vertices(child_index);
        ray_cast_segment(v1, v2, false, input, xf)
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform, child_index: usize) -> Aabb {
        let (v1, v2) = self.child_vertices(child_index);
        segment_aabb(xf.apply(v1), xf.apply(v2), self.radius())
    }
}

fn check_spacing(vertices: &[Point]) -> Result<(), GeometryError> {
    for (i, pair) in vertices.windows(2).enumerate() {
        if (pair[1] - pair[0]).hypot2() <= LINEAR_SLOP * LINEAR_SLOP {
            return Err(GeometryError::VerticesTooClose { index: i + 1 });
        }
    }
    Ok(())
}

/// Shoelace area of a closed polygon, positive for counter-clockwise winding.
fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            vertices[i]
                .to_vec2()
                .cross(vertices[(i + 1) % n].to_vec2())
        })
        .sum();
    0.5 * twice_area
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn loop_children_wrap_around() {
        let chain = ChainShape::new_loop(&square()).unwrap();
        assert!(chain.is_loop());
        assert_eq!(chain.child_count(), 4);
        assert_eq!(chain.vertices().len(), 5);
        assert_eq!(chain.prev_vertex(), Point::new(0.0, 1.0));
        assert_eq!(chain.next_vertex(), Point::new(1.0, 0.0));

        let first = chain.child_edge(0);
        assert!(first.one_sided);
        assert_eq!(first.vertex0, Point::new(0.0, 1.0));
        assert_eq!(first.vertex1, Point::new(0.0, 0.0));
        assert_eq!(first.vertex2, Point::new(1.0, 0.0));
        assert_eq!(first.vertex3, Point::new(1.0, 1.0));

        let last = chain.child_edge(3);
        assert_eq!(last.vertex0, Point::new(1.0, 1.0));
        assert_eq!(last.vertex1, Point::new(0.0, 1.0));
        assert_eq!(last.vertex2, Point::new(0.0, 0.0));
        assert_eq!(last.vertex3, Point::new(1.0, 0.0));
    }

    #[test]
    fn open_chain_uses_explicit_ghosts() {
        let prev = Point::new(-1.0, 0.0);
        let next = Point::new(3.0, 0.0);
        let chain = ChainShape::new_chain(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
            prev,
            next,
        )
        .unwrap();
        assert!(!chain.is_loop());
        assert_eq!(chain.child_count(), 2);
        assert_eq!(chain.child_edge(0).vertex0, prev);
        assert_eq!(chain.child_edge(0).vertex3, Point::new(2.0, 0.0));
        assert_eq!(chain.child_edge(1).vertex0, Point::new(0.0, 0.0));
        assert_eq!(chain.child_edge(1).vertex3, next);
    }

    #[test]
    fn invalid_chains_are_rejected() {
        assert_eq!(
            ChainShape::new_loop(&square()[..2]),
            Err(GeometryError::LoopTooShort(2))
        );
        assert_eq!(
            ChainShape::new_chain(&[Point::ORIGIN], Point::ORIGIN, Point::ORIGIN),
            Err(GeometryError::ChainTooShort(1))
        );

        let mut crowded = square();
        crowded[2] = Point::new(1.0, 0.001);
        assert_eq!(
            ChainShape::new_loop(&crowded),
            Err(GeometryError::VerticesTooClose { index: 2 })
        );

        let closing = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.001, 0.0),
        ];
        assert_eq!(
            ChainShape::new_loop(&closing),
            Err(GeometryError::VerticesTooClose { index: 0 })
        );

        let flat = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert!(matches!(
            ChainShape::new_loop(&flat),
            Err(GeometryError::AreaTooSmall(_))
        ));
    }

    #[test]
    fn child_ray_cast_and_aabb() {
        let chain = ChainShape::new_loop(&square()).unwrap();
        let xf = Transform::IDENTITY;
        let input = RayCastInput::new(Point::new(0.5, -1.0), Point::new(0.5, 1.0));

        let hit = chain.ray_cast(&input, &xf, 0).unwrap();
        assert_relative_eq!(hit.fraction, 0.5);
        assert_relative_eq!(hit.normal.y, -1.0);
        // Chain children are two-sided for rays, so the top edge is hit from inside.
        let hit = chain.ray_cast(&input, &xf, 2).unwrap();
        assert_relative_eq!(hit.fraction, 1.0);
        assert_relative_eq!(hit.normal.y, -1.0);
        assert!(chain.ray_cast(&input, &xf, 1).is_none());

        let aabb = chain.compute_aabb(&xf, 1);
        assert_relative_eq!(aabb.lower.x, 1.0 - POLYGON_RADIUS);
        assert_relative_eq!(aabb.upper.y, 1.0 + POLYGON_RADIUS);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn child_edge_past_the_end_panics() {
        let chain = ChainShape::new_loop(&square()).unwrap();
        let _ = chain.child_edge(4);
    }
}
