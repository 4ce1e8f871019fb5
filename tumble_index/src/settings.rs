// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning constants and the tree configuration built from them.

/// Margin added on every side of a proxy's tight box to form its fat box.
pub const AABB_EXTENSION: f64 = 0.1;

/// Scale applied to a proxy's displacement to extend its fat box along the motion.
pub const AABB_MULTIPLIER: f64 = 4.0;

/// Number of node slots a new tree allocates up front.
pub const INITIAL_CAPACITY: usize = 16;

/// Configuration for a [`DynamicTree`](crate::DynamicTree).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Fat-box margin, see [`AABB_EXTENSION`].
    pub aabb_extension: f64,
    /// Predictive displacement scale, see [`AABB_MULTIPLIER`].
    pub aabb_multiplier: f64,
    /// Initial node arena size. Must be non-zero.
    pub initial_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            aabb_extension: AABB_EXTENSION,
            aabb_multiplier: AABB_MULTIPLIER,
            initial_capacity: INITIAL_CAPACITY,
        }
    }
}
