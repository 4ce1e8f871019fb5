// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::PI;

use kurbo::{Point, Vec2};
use tumble_index::{Aabb, RayCastInput, RayCastOutput};

use super::MassData;
use crate::math::{Transform, normalize};
use crate::settings::EPSILON;

/// A solid disk.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircleShape {
    /// Center in local coordinates.
    pub position: Point,
    /// Radius.
    pub radius: f64,
}

impl CircleShape {
    /// A circle of `radius` centered at the local point `position`.
    pub const fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }

    pub(crate) fn test_point(&self, xf: &Transform, p: Point) -> bool {
        let d = p - xf.apply(self.position);
        d.hypot2() <= self.radius * self.radius
    }

    // Collision Detection in Interactive 3D Environments by Gino van den Bergen,
    // section 3.1.2: x = s + a * r, norm(x) = radius.
    pub(crate) fn ray_cast(&self, input: &RayCastInput, xf: &Transform) -> Option<RayCastOutput> {
        let position = xf.apply(self.position);
        let s = input.p1 - position;
        let b = s.hypot2() - self.radius * self.radius;

        // Solve the quadratic equation.
        let r = input.p2 - input.p1;
        let c = s.dot(r);
        let rr = r.hypot2();
        let sigma = c * c - rr * b;

        // Check for negative discriminant and short segment.
        if sigma < 0.0 || rr < EPSILON {
            return None;
        }

        // Find the point of intersection of the line with the circle.
        let a = -(c + sigma.sqrt());
        if (0.0..=input.max_fraction * rr).contains(&a) {
            let fraction = a / rr;
            return Some(RayCastOutput {
                normal: normalize(s + fraction * r),
                fraction,
            });
        }
        None
    }

    pub(crate) fn compute_aabb(&self, xf: &Transform) -> Aabb {
        let p = xf.apply(self.position);
        let r = Vec2::new(self.radius, self.radius);
        Aabb::new(p - r, p + r)
    }

    pub(crate) fn compute_mass(&self, density: f64) -> MassData {
        let rr = self.radius * self.radius;
        let mass = density * PI * rr;
        let p = self.position.to_vec2();
        MassData {
            mass,
            center: self.position,
            // Inertia about the local origin.
            inertia: mass * (0.5 * rr + p.dot(p)),
        }
    }
}
