// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision tolerances and the time-of-impact configuration.

/// Collision and constraint tolerance, in length units.
pub const LINEAR_SLOP: f64 = 0.005;

/// Skin thickness of polygons, edges, and chains.
pub const POLYGON_RADIUS: f64 = 2.0 * LINEAR_SLOP;

/// Maximum number of vertices of a polygon or distance proxy.
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Smallest meaningful length or area.
pub const EPSILON: f64 = f64::EPSILON;

/// Iteration limits and tolerance for [`time_of_impact_with_config`](crate::time_of_impact_with_config).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToiConfig {
    /// Contact tolerance; the target separation and its band are derived from it.
    pub linear_slop: f64,
    /// Outer conservative-advancement iterations before giving up.
    pub max_iterations: usize,
    /// Bisection/secant steps per root search.
    pub max_root_iterations: usize,
    /// Separating-axis push-back steps per outer iteration.
    pub max_push_back_iterations: usize,
}

impl Default for ToiConfig {
    fn default() -> Self {
        Self {
            linear_slop: LINEAR_SLOP,
            max_iterations: 20,
            max_root_iterations: 50,
            max_push_back_iterations: MAX_POLYGON_VERTICES,
        }
    }
}
