// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of collision shapes.
//!
//! Every shape is described in body-local coordinates and placed in the world with a
//! [`Transform`]. Shapes with several *children* (chains) are addressed per child for
//! bounding boxes, ray casts, and distance proxies; single-piece shapes have one child with
//! index `0`.

mod chain;
mod circle;
mod edge;
mod polygon;

pub use chain::ChainShape;
pub use circle::CircleShape;
pub use edge::EdgeShape;
pub use polygon::PolygonShape;

use kurbo::Point;
use tumble_index::{Aabb, RayCastInput, RayCastOutput};

use crate::math::Transform;

/// Discriminant of a [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeType {
    /// [`CircleShape`].
    Circle,
    /// [`EdgeShape`].
    Edge,
    /// [`PolygonShape`].
    Polygon,
    /// [`ChainShape`].
    Chain,
}

/// Mass properties of a shape.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassData {
    /// Mass, usually in kilograms.
    pub mass: f64,
    /// Center of mass relative to the shape origin.
    pub center: Point,
    /// Rotational inertia about the shape origin.
    pub inertia: f64,
}

/// A collision shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A solid disk.
    Circle(CircleShape),
    /// A segment, optionally one-sided with ghost neighbors.
    Edge(EdgeShape),
    /// A solid convex polygon.
    Polygon(PolygonShape),
    /// An open or closed polyline of one-sided edges.
    Chain(ChainShape),
}

impl Shape {
    /// Which variant this is.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Circle(_) => ShapeType::Circle,
            Self::Edge(_) => ShapeType::Edge,
            Self::Polygon(_) => ShapeType::Polygon,
            Self::Chain(_) => ShapeType::Chain,
        }
    }

    /// Number of independently addressable children.
    pub fn child_count(&self) -> usize {
        match self {
            Self::Chain(chain) => chain.child_count(),
            Self::Circle(_) | Self::Edge(_) | Self::Polygon(_) => 1,
        }
    }

    /// Rounding radius added around the core geometry.
    pub fn radius(&self) -> f64 {
        match self {
            Self::Circle(circle) => circle.radius,
            Self::Edge(edge) => edge.radius(),
            Self::Polygon(polygon) => polygon.radius(),
            Self::Chain(chain) => chain.radius(),
        }
    }

    /// Whether the world point `p` lies inside the shape placed at `xf`.
    ///
    /// Edges and chains have no interior and always return `false`.
    pub fn test_point(&self, xf: &Transform, p: Point) -> bool {
        match self {
            Self::Circle(circle) => circle.test_point(xf, p),
            Self::Polygon(polygon) => polygon.test_point(xf, p),
            Self::Edge(_) | Self::Chain(_) => false,
        }
    }

    /// Cast a world-space ray against one child of the shape placed at `xf`.
    pub fn ray_cast(
        &self,
        input: &RayCastInput,
        xf: &Transform,
        child_index: usize,
    ) -> Option<RayCastOutput> {
        match self {
            Self::Circle(circle) => circle.ray_cast(input, xf),
            Self::Edge(edge) => edge.ray_cast(input, xf),
            Self::Polygon(polygon) => polygon.ray_cast(input, xf),
            Self::Chain(chain) => chain.ray_cast(input, xf, child_index),
        }
    }

    /// World bounding box of one child, including the rounding radius.
    pub fn compute_aabb(&self, xf: &Transform, child_index: usize) -> Aabb {
        match self {
            Self::Circle(circle) => circle.compute_aabb(xf),
            Self::Edge(edge) => edge.compute_aabb(xf),
            Self::Polygon(polygon) => polygon.compute_aabb(xf),
            Self::Chain(chain) => chain.compute_aabb(xf, child_index),
        }
    }

    /// Mass properties for a uniform `density`. Edges and chains are massless.
    pub fn compute_mass(&self, density: f64) -> MassData {
        match self {
            Self::Circle(circle) => circle.compute_mass(density),
            Self::Edge(edge) => edge.compute_mass(),
            Self::Polygon(polygon) => polygon.compute_mass(density),
            Self::Chain(_) => MassData::default(),
        }
    }
}

impl From<CircleShape> for Shape {
    fn from(shape: CircleShape) -> Self {
        Self::Circle(shape)
    }
}

impl From<EdgeShape> for Shape {
    fn from(shape: EdgeShape) -> Self {
        Self::Edge(shape)
    }
}

impl From<PolygonShape> for Shape {
    fn from(shape: PolygonShape) -> Self {
        Self::Polygon(shape)
    }
}

impl From<ChainShape> for Shape {
    fn from(shape: ChainShape) -> Self {
        Self::Chain(shape)
    }
}

/// Box around two world points grown by `radius`.
pub(crate) fn segment_aabb(v1: Point, v2: Point, radius: f64) -> Aabb {
    Aabb::from_points(v1, v2).fattened(radius)
}
