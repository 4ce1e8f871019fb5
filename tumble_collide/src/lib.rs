// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tumble Collide: convex 2D shapes, GJK distance, and continuous time of impact.
//!
//! This crate is the narrow phase that sits behind the [`tumble_index`] broad phase. It
//! answers exact questions about one pair of shapes at a time.
//!
//! - [`Shape`] is a closed set of variants: [`CircleShape`], [`EdgeShape`],
//!   [`PolygonShape`] (built by gift-wrapping arbitrary points), and [`ChainShape`].
//!   Every shape computes its bounding box, ray hits, and mass properties.
//! - [`distance`] finds closest points between two [`DistanceProxy`] values with GJK and a
//!   warm-start [`SimplexCache`]. [`shape_cast`] sweeps one proxy along a translation and
//!   [`test_overlap`] checks whether two shape children touch.
//! - [`time_of_impact`] runs conservative advancement over two [`Sweep`]s and reports
//!   whether and when the shapes first come into contact.
//!
//! Geometry uses [`kurbo::Point`] for positions and [`kurbo::Vec2`] for directions.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use tumble_collide::{
//!     CircleShape, DistanceProxy, PolygonShape, Shape, Sweep, ToiInput, ToiState,
//!     time_of_impact,
//! };
//!
//! let ground: Shape = PolygonShape::new_box(5.0, 0.5).into();
//! let ball: Shape = CircleShape::new(Point::ORIGIN, 0.25).into();
//!
//! let input = ToiInput {
//!     proxy_a: &DistanceProxy::from_shape(&ground, 0),
//!     proxy_b: &DistanceProxy::from_shape(&ball, 0),
//!     sweep_a: Sweep::stationary(Point::ORIGIN, 0.0),
//!     // Falling from y = 4 straight through the ground in one step.
//!     sweep_b: Sweep::new(Point::new(0.0, 4.0), 0.0, Point::new(0.0, -4.0), 0.0),
//!     t_max: 1.0,
//! };
//! let out = time_of_impact(&input);
//! assert_eq!(out.state, ToiState::Touching);
//! assert!(out.t > 0.4 && out.t < 0.45);
//! ```

pub mod distance;
pub mod error;
pub mod math;
pub mod settings;
pub mod shapes;
pub mod toi;

pub use distance::{
    DistanceInput, DistanceOutput, DistanceProxy, ShapeCastInput, ShapeCastOutput, SimplexCache,
    distance, shape_cast, test_overlap,
};
pub use error::GeometryError;
pub use math::{Rot, Sweep, Transform};
pub use settings::{EPSILON, LINEAR_SLOP, MAX_POLYGON_VERTICES, POLYGON_RADIUS, ToiConfig};
pub use shapes::{
    ChainShape, CircleShape, EdgeShape, MassData, PolygonShape, Shape, ShapeType,
};
pub use toi::{
    SeparationFunction, SeparationType, ToiInput, ToiOutput, ToiState, ToiStats,
    time_of_impact, time_of_impact_with_config,
};
