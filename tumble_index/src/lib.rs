// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tumble Index: a dynamic AABB tree broad phase for 2D physics.
//!
//! A [`DynamicTree`] stores one leaf per *proxy*. Each leaf holds a fat box, the caller's
//! tight [`Aabb`] grown by a small margin, so that objects jittering in place do not touch
//! the hierarchy. Moving proxies additionally get their box stretched along the direction of
//! motion.
//!
//! - Insert, move, and remove proxies carrying a user payload.
//! - Query all proxies whose fat boxes overlap a box.
//! - Cast a ray through the tree with a callback that can clip or stop the cast.
//! - Inspect quality metrics and rebuild the hierarchy bottom-up.
//!
//! Insertions pick a sibling with a surface-area heuristic over box perimeters, and every
//! mutation is followed by AVL-style rotations on the way back to the root.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use tumble_index::{Aabb, DynamicTree, RayCastInput};
//!
//! let mut tree = DynamicTree::new();
//! let ball = tree.create_proxy(Aabb::from_coords(0.0, 0.0, 1.0, 1.0), "ball");
//! let wall = tree.create_proxy(Aabb::from_coords(10.0, -5.0, 11.0, 5.0), "wall");
//!
//! // Overlap query.
//! let mut hits = Vec::new();
//! tree.query(&Aabb::from_coords(0.5, 0.5, 2.0, 2.0), |id| {
//!     hits.push(id);
//!     true
//! });
//! assert_eq!(hits, vec![ball]);
//!
//! // A small move stays inside the fat box and leaves the tree untouched.
//! let nudged = Aabb::from_coords(0.02, 0.0, 1.02, 1.0);
//! assert!(!tree.move_proxy(ball, nudged, Vec2::new(0.02, 0.0)));
//!
//! // Ray cast: clip the ray at every box hit, keep the closest.
//! let input = RayCastInput::new(Point::new(5.0, 0.0), Point::new(20.0, 0.0));
//! let mut closest = None;
//! tree.ray_cast(&input, |sub_input, id| {
//!     match tree.fat_aabb(id).ray_cast(sub_input) {
//!         Some(hit) => {
//!             closest = Some(*tree.user_data(id).unwrap());
//!             hit.fraction
//!         }
//!         None => -1.0,
//!     }
//! })?;
//! assert_eq!(closest, Some("wall"));
//! # let _ = wall;
//! # Ok::<(), tumble_index::TreeError>(())
//! ```
//!
//! ## Concurrency
//!
//! The tree has no internal synchronization. Queries take `&self` and may run concurrently
//! with each other; mutations take `&mut self`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod aabb;
pub mod error;
pub mod settings;
pub mod tree;

pub use aabb::{Aabb, RayCastInput, RayCastOutput};
pub use error::TreeError;
pub use settings::{AABB_EXTENSION, AABB_MULTIPLIER, INITIAL_CAPACITY, TreeConfig};
pub use tree::{DynamicTree, ProxyId};
