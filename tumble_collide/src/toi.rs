// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time of impact by conservative advancement.
//!
//! Given two proxies moving along [`Sweep`]s, [`time_of_impact`] finds the first time in
//! `[0, t_max]` at which their cores come within a small target separation of each other.
//! Each outer iteration measures the current distance with GJK, builds a
//! [`SeparationFunction`] from the closest features, and advances as far as that separating
//! axis allows using a bisection/secant root search.

use kurbo::{Point, Vec2};
use tracing::{debug, instrument};

use crate::distance::{DistanceInput, DistanceProxy, SimplexCache, distance};
use crate::math::{Sweep, cross_vs, normalize};
use crate::settings::ToiConfig;

/// Outcome of a time-of-impact query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ToiState {
    /// No result yet. Never returned.
    Unknown,
    /// The iteration budget ran out; `t` is the last safe time.
    Failed,
    /// The cores already overlap at the start.
    Overlapped,
    /// The proxies reach the target separation at `t`.
    Touching,
    /// The proxies stay apart for the whole interval.
    Separated,
}

/// Input to [`time_of_impact`].
#[derive(Copy, Clone, Debug)]
pub struct ToiInput<'a> {
    /// First proxy, in the local frame of `sweep_a`.
    pub proxy_a: &'a DistanceProxy,
    /// Second proxy, in the local frame of `sweep_b`.
    pub proxy_b: &'a DistanceProxy,
    /// Motion of the first body.
    pub sweep_a: Sweep,
    /// Motion of the second body.
    pub sweep_b: Sweep,
    /// Upper bound of the search interval, in sweep time.
    pub t_max: f64,
}

/// Iteration counters for one or more [`time_of_impact`] calls.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ToiStats {
    /// Outer conservative-advancement iterations.
    pub iterations: usize,
    /// Root-finder steps, summed over all searches.
    pub root_iterations: usize,
    /// Most root-finder steps spent in a single search.
    pub max_root_iterations: usize,
}

impl ToiStats {
    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        self.iterations += other.iterations;
        self.root_iterations += other.root_iterations;
        self.max_root_iterations = self.max_root_iterations.max(other.max_root_iterations);
    }
}

/// Result of [`time_of_impact`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToiOutput {
    /// How the search ended.
    pub state: ToiState,
    /// Time associated with `state`.
    pub t: f64,
    /// Work done.
    pub stats: ToiStats,
}

/// Which features a [`SeparationFunction`] measures between.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeparationType {
    /// A vertex of A against a vertex of B.
    Points,
    /// An edge of A against a vertex of B.
    FaceA,
    /// A vertex of A against an edge of B.
    FaceB,
}

/// Separation of two moving proxies along an axis fixed to the closest features found by
/// GJK.
///
/// For [`SeparationType::Points`] the axis is in world space; for the face types it is the
/// face normal in the local frame of the body owning the face, and `local_point` is the
/// face midpoint.
#[derive(Clone, Debug)]
pub struct SeparationFunction<'a> {
    proxy_a: &'a DistanceProxy,
    proxy_b: &'a DistanceProxy,
    sweep_a: Sweep,
    sweep_b: Sweep,
    kind: SeparationType,
    local_point: Point,
    axis: Vec2,
}

impl<'a> SeparationFunction<'a> {
    /// Build the separating axis at time `t1` from the simplex left in `cache` by
    /// [`distance`].
    ///
    /// `cache` must hold one or two vertices, as it does after a query that found the cores
    /// apart.
    pub fn new(
        cache: &SimplexCache,
        proxy_a: &'a DistanceProxy,
        sweep_a: Sweep,
        proxy_b: &'a DistanceProxy,
        sweep_b: Sweep,
        t1: f64,
    ) -> Self {
        debug_assert!(
            cache.count == 1 || cache.count == 2,
            "separation needs a point or edge simplex, got {} vertices",
            cache.count
        );

        let xf_a = sweep_a.transform_at(t1);
        let xf_b = sweep_b.transform_at(t1);
        let index_a = cache.index_a.map(usize::from);
        let index_b = cache.index_b.map(usize::from);

        let mut function = Self {
            proxy_a,
            proxy_b,
            sweep_a,
            sweep_b,
            kind: SeparationType::Points,
            local_point: Point::ORIGIN,
            axis: Vec2::ZERO,
        };

        if cache.count == 1 {
            let point_a = xf_a.apply(proxy_a.vertex(index_a[0]));
            let point_b = xf_b.apply(proxy_b.vertex(index_b[0]));
            function.axis = normalize(point_b - point_a);
        } else if index_a[0] == index_a[1] {
            // Two points on B and one on A.
            let b1 = proxy_b.vertex(index_b[0]);
            let b2 = proxy_b.vertex(index_b[1]);
            function.kind = SeparationType::FaceB;
            function.axis = normalize(cross_vs(b2 - b1, 1.0));
            function.local_point = b1.midpoint(b2);

            let normal = xf_b.q.rotate(function.axis);
            let point_b = xf_b.apply(function.local_point);
            let point_a = xf_a.apply(proxy_a.vertex(index_a[0]));
            if (point_a - point_b).dot(normal) < 0.0 {
                function.axis = -function.axis;
            }
        } else {
            // Two points on A and one or two points on B.
            let a1 = proxy_a.vertex(index_a[0]);
            let a2 = proxy_a.vertex(index_a[1]);
            function.kind = SeparationType::FaceA;
            function.axis = normalize(cross_vs(a2 - a1, 1.0));
            function.local_point = a1.midpoint(a2);

            let normal = xf_a.q.rotate(function.axis);
            let point_a = xf_a.apply(function.local_point);
            let point_b = xf_b.apply(proxy_b.vertex(index_b[0]));
            if (point_b - point_a).dot(normal) < 0.0 {
                function.axis = -function.axis;
            }
        }
        function
    }

    /// Which features the axis was built from.
    pub fn kind(&self) -> SeparationType {
        self.kind
    }

    /// Deepest points along the axis at time `t`.
    ///
    /// Returns the separation and the support indices on A and B. For face types the index
    /// on the face side is not meaningful and is reported as `0`.
    pub fn find_min_separation(&self, t: f64) -> (f64, usize, usize) {
        let xf_a = self.sweep_a.transform_at(t);
        let xf_b = self.sweep_b.transform_at(t);

        match self.kind {
            SeparationType::Points => {
                let index_a = self.proxy_a.support(xf_a.q.inv_rotate(self.axis));
                let index_b = self.proxy_b.support(xf_b.q.inv_rotate(-self.axis));
                let point_a = xf_a.apply(self.proxy_a.vertex(index_a));
                let point_b = xf_b.apply(self.proxy_b.vertex(index_b));
                ((point_b - point_a).dot(self.axis), index_a, index_b)
            }
            SeparationType::FaceA => {
                let normal = xf_a.q.rotate(self.axis);
                let point_a = xf_a.apply(self.local_point);
                let index_b = self.proxy_b.support(xf_b.q.inv_rotate(-normal));
                let point_b = xf_b.apply(self.proxy_b.vertex(index_b));
                ((point_b - point_a).dot(normal), 0, index_b)
            }
            SeparationType::FaceB => {
                let normal = xf_b.q.rotate(self.axis);
                let point_b = xf_b.apply(self.local_point);
                let index_a = self.proxy_a.support(xf_a.q.inv_rotate(-normal));
                let point_a = xf_a.apply(self.proxy_a.vertex(index_a));
                ((point_a - point_b).dot(normal), index_a, 0)
            }
        }
    }

    /// Separation at time `t` between the given support vertices.
    pub fn evaluate(&self, index_a: usize, index_b: usize, t: f64) -> f64 {
        let xf_a = self.sweep_a.transform_at(t);
        let xf_b = self.sweep_b.transform_at(t);

        match self.kind {
            SeparationType::Points => {
                let point_a = xf_a.apply(self.proxy_a.vertex(index_a));
                let point_b = xf_b.apply(self.proxy_b.vertex(index_b));
                (point_b - point_a).dot(self.axis)
            }
            SeparationType::FaceA => {
                let normal = xf_a.q.rotate(self.axis);
                let point_a = xf_a.apply(self.local_point);
                let point_b = xf_b.apply(self.proxy_b.vertex(index_b));
                (point_b - point_a).dot(normal)
            }
            SeparationType::FaceB => {
                let normal = xf_b.q.rotate(self.axis);
                let point_b = xf_b.apply(self.local_point);
                let point_a = xf_a.apply(self.proxy_a.vertex(index_a));
                (point_a - point_b).dot(normal)
            }
        }
    }
}

/// First time in `[0, t_max]` at which the two proxies come into contact, using the
/// default [`ToiConfig`].
///
/// Contact means the cores are within `radius_a + radius_b - 3 * LINEAR_SLOP` (but at
/// least [`LINEAR_SLOP`](crate::LINEAR_SLOP)) of each other, so a solver can resolve the
/// remaining gap without tunnelling.
pub fn time_of_impact(input: &ToiInput<'_>) -> ToiOutput {
    time_of_impact_with_config(input, &ToiConfig::default())
}

/// [`time_of_impact`] with explicit tolerance and iteration limits.
#[instrument(level = "trace", skip_all, fields(t_max = input.t_max))]
pub fn time_of_impact_with_config(input: &ToiInput<'_>, config: &ToiConfig) -> ToiOutput {
    let mut stats = ToiStats::default();

    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;

    let mut sweep_a = input.sweep_a;
    let mut sweep_b = input.sweep_b;
    // Large rotations can make the root finder fail, so keep the angles small.
    sweep_a.normalize();
    sweep_b.normalize();

    let t_max = input.t_max;
    let slop = config.linear_slop;
    let total_radius = proxy_a.radius() + proxy_b.radius();
    let target = slop.max(total_radius - 3.0 * slop);
    let tolerance = 0.25 * slop;
    debug_assert!(target > tolerance, "target separation must exceed the tolerance");

    let mut t1 = 0.0;
    let mut cache = SimplexCache::default();

    loop {
        stats.iterations += 1;

        // Get the distance between the cores at t1. The radii are handled by `target`.
        let distance_input = DistanceInput {
            proxy_a,
            proxy_b,
            transform_a: sweep_a.transform_at(t1),
            transform_b: sweep_b.transform_at(t1),
            use_radii: false,
        };
        let output = distance(&mut cache, &distance_input);

        if output.distance <= 0.0 {
            return ToiOutput {
                state: ToiState::Overlapped,
                t: 0.0,
                stats,
            };
        }

        if output.distance < target + tolerance {
            return ToiOutput {
                state: ToiState::Touching,
                t: t1,
                stats,
            };
        }

        let function = SeparationFunction::new(&cache, proxy_a, sweep_a, proxy_b, sweep_b, t1);

        // Resolve the deepest point along the separating axis at t2, pushing t2 back until
        // that point is within the target band. Each new deepest point may belong to a
        // different vertex pair, so this is bounded by the polygon vertex count.
        let mut t2 = t_max;
        for _ in 0..config.max_push_back_iterations {
            let (mut s2, index_a, index_b) = function.find_min_separation(t2);

            if s2 > target + tolerance {
                return ToiOutput {
                    state: ToiState::Separated,
                    t: t_max,
                    stats,
                };
            }

            if s2 > target - tolerance {
                // Advance the sweeps.
                t1 = t2;
                break;
            }

            let mut s1 = function.evaluate(index_a, index_b, t1);

            // The root finder needs the separation to cross the target band.
            if s1 < target - tolerance {
                return ToiOutput {
                    state: ToiState::Failed,
                    t: t1,
                    stats,
                };
            }

            if s1 <= target + tolerance {
                return ToiOutput {
                    state: ToiState::Touching,
                    t: t1,
                    stats,
                };
            }

            // Find the root of s(t) = target on [t1, t2], alternating secant and bisection.
            let mut root_iterations = 0;
            let mut a1 = t1;
            let mut a2 = t2;
            while root_iterations < config.max_root_iterations {
                let t = if root_iterations % 2 == 1 {
                    a1 + (target - s1) * (a2 - a1) / (s2 - s1)
                } else {
                    0.5 * (a1 + a2)
                };
                root_iterations += 1;

                let s = function.evaluate(index_a, index_b, t);
                if (s - target).abs() < tolerance {
                    t2 = t;
                    break;
                }

                // Keep the bracket.
                if s > target {
                    a1 = t;
                    s1 = s;
                } else {
                    a2 = t;
                    s2 = s;
                }
            }
            stats.root_iterations += root_iterations;
            stats.max_root_iterations = stats.max_root_iterations.max(root_iterations);
        }

        if stats.iterations == config.max_iterations {
            debug!(
                iterations = stats.iterations,
                root_iterations = stats.root_iterations,
                t = t1,
                "time of impact did not converge"
            );
            return ToiOutput {
                state: ToiState::Failed,
                t: t1,
                stats,
            };
        }
    }
}
