// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rigid-body math: rotations, transforms, and sweeps.

use core::f64::consts::TAU;

use kurbo::{Affine, Point, Vec2};

use crate::settings::EPSILON;

/// A rotation stored as its sine and cosine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rot {
    /// Sine of the angle.
    pub s: f64,
    /// Cosine of the angle.
    pub c: f64,
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot {
    /// The zero rotation.
    pub const IDENTITY: Self = Self { s: 0.0, c: 1.0 };

    /// Rotation by `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self { s, c }
    }

    /// Angle in radians, in `(-pi, pi]`.
    pub fn angle(&self) -> f64 {
        self.s.atan2(self.c)
    }

    /// Image of the x axis.
    pub fn x_axis(&self) -> Vec2 {
        Vec2::new(self.c, self.s)
    }

    /// Image of the y axis.
    pub fn y_axis(&self) -> Vec2 {
        Vec2::new(-self.s, self.c)
    }

    /// Rotate a vector.
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotate a vector by the inverse rotation.
    pub fn inv_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// `self * other`: apply `other`, then `self`.
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            s: self.s * other.c + self.c * other.s,
            c: self.c * other.c - self.s * other.s,
        }
    }

    /// `inverse(self) * other`.
    pub fn mul_t(&self, other: &Self) -> Self {
        Self {
            s: self.c * other.s - self.s * other.c,
            c: self.c * other.c + self.s * other.s,
        }
    }
}

/// A rigid transform: rotation followed by translation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Translation.
    pub p: Vec2,
    /// Rotation.
    pub q: Rot,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        p: Vec2::ZERO,
        q: Rot::IDENTITY,
    };

    /// Transform placing the local origin at `position`, rotated by `angle` radians.
    pub fn new(position: Point, angle: f64) -> Self {
        Self {
            p: position.to_vec2(),
            q: Rot::from_angle(angle),
        }
    }

    /// A pure translation.
    pub fn from_translation(p: Vec2) -> Self {
        Self {
            p,
            q: Rot::IDENTITY,
        }
    }

    /// Map a local point to world space.
    pub fn apply(&self, point: Point) -> Point {
        (self.q.rotate(point.to_vec2()) + self.p).to_point()
    }

    /// Map a world point to local space.
    pub fn apply_inverse(&self, point: Point) -> Point {
        self.q.inv_rotate(point.to_vec2() - self.p).to_point()
    }

    /// `self * other`: apply `other`, then `self`.
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            q: self.q.mul(&other.q),
            p: self.q.rotate(other.p) + self.p,
        }
    }

    /// `inverse(self) * other`.
    pub fn mul_t(&self, other: &Self) -> Self {
        Self {
            q: self.q.mul_t(&other.q),
            p: self.q.inv_rotate(other.p - self.p),
        }
    }
}

impl From<Transform> for Affine {
    fn from(xf: Transform) -> Self {
        Self::new([xf.q.c, xf.q.s, -xf.q.s, xf.q.c, xf.p.x, xf.p.y])
    }
}

/// Motion of a body's center of mass over a time step.
///
/// Positions and angles are interpolated linearly in the normalized time `beta`, where
/// `beta = 0` is the state at `alpha0` and `beta = 1` the end of the step.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sweep {
    /// Center of mass in body-local coordinates.
    pub local_center: Point,
    /// World center of mass at `alpha0`.
    pub c0: Point,
    /// World center of mass at the end of the step.
    pub c: Point,
    /// Angle at `alpha0`.
    pub a0: f64,
    /// Angle at the end of the step.
    pub a: f64,
    /// Fraction of the step already consumed, in `[0, 1)`.
    pub alpha0: f64,
}

impl Sweep {
    /// A body whose origin coincides with its center of mass, moving from `(c0, a0)` to
    /// `(c, a)`.
    pub fn new(c0: Point, a0: f64, c: Point, a: f64) -> Self {
        Self {
            local_center: Point::ORIGIN,
            c0,
            c,
            a0,
            a,
            alpha0: 0.0,
        }
    }

    /// A body at rest.
    pub fn stationary(position: Point, angle: f64) -> Self {
        Self::new(position, angle, position, angle)
    }

    /// Body transform at normalized time `beta`.
    pub fn transform_at(&self, beta: f64) -> Transform {
        let center = self.c0.lerp(self.c, beta);
        let q = Rot::from_angle((1.0 - beta) * self.a0 + beta * self.a);
        // Shift from the center of mass back to the body origin.
        Transform {
            p: center.to_vec2() - q.rotate(self.local_center.to_vec2()),
            q,
        }
    }

    /// Advance the start of the sweep to `alpha`, keeping the end state.
    pub fn advance(&mut self, alpha: f64) {
        debug_assert!(self.alpha0 < 1.0, "sweep is already at the end of the step");
        let beta = (alpha - self.alpha0) / (1.0 - self.alpha0);
        self.c0 += beta * (self.c - self.c0);
        self.a0 += beta * (self.a - self.a0);
        self.alpha0 = alpha;
    }

    /// Wrap `a0` into `[0, 2pi)` and shift `a` by the same amount.
    pub fn normalize(&mut self) {
        let d = TAU * (self.a0 / TAU).floor();
        self.a0 -= d;
        self.a -= d;
    }
}

/// `s x v` for a scalar `s`: the vector rotated a quarter turn counter-clockwise and scaled.
pub(crate) fn cross_sv(s: f64, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// `v x s` for a scalar `s`: the vector rotated a quarter turn clockwise and scaled.
pub(crate) fn cross_vs(v: Vec2, s: f64) -> Vec2 {
    Vec2::new(s * v.y, -s * v.x)
}

/// Unit vector along `v` together with the length of `v`.
///
/// Vectors shorter than [`EPSILON`] are returned unchanged with a length of `0`.
pub(crate) fn normalize_with_length(v: Vec2) -> (Vec2, f64) {
    let length = v.hypot();
    if length < EPSILON {
        return (v, 0.0);
    }
    (v / length, length)
}

pub(crate) fn normalize(v: Vec2) -> Vec2 {
    normalize_with_length(v).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::{FRAC_PI_2, PI};

    fn assert_points_eq(a: Point, b: Point) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
    }

    #[test]
    fn rotation_round_trip() {
        let q = Rot::from_angle(0.7);
        let v = Vec2::new(3.0, -2.0);
        let back = q.inv_rotate(q.rotate(v));
        assert_abs_diff_eq!(back.x, v.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, v.y, epsilon = 1e-12);
        assert_abs_diff_eq!(q.angle(), 0.7, epsilon = 1e-12);

        let r = Rot::from_angle(0.5);
        assert_abs_diff_eq!(q.mul(&r).angle(), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(q.mul_t(&r).angle(), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn transform_apply_and_inverse() {
        let xf = Transform::new(Point::new(1.0, 2.0), FRAC_PI_2);
        let p = xf.apply(Point::new(1.0, 0.0));
        assert_points_eq(p, Point::new(1.0, 3.0));
        assert_points_eq(xf.apply_inverse(p), Point::new(1.0, 0.0));

        let affine = Affine::from(xf);
        assert_points_eq(affine * Point::new(1.0, 0.0), p);
    }

    #[test]
    fn transform_composition() {
        let a = Transform::new(Point::new(1.0, 0.0), 0.3);
        let b = Transform::new(Point::new(-2.0, 5.0), -1.1);
        let local = Point::new(0.25, 0.75);

        let ab = a.mul(&b);
        assert_points_eq(ab.apply(local), a.apply(b.apply(local)));

        let a_inv_b = a.mul_t(&b);
        assert_points_eq(a_inv_b.apply(local), a.apply_inverse(b.apply(local)));
    }

    #[test]
    fn sweep_interpolates_about_the_center_of_mass() {
        let mut sweep = Sweep::new(Point::new(0.0, 0.0), 0.0, Point::new(10.0, 0.0), PI);
        sweep.local_center = Point::new(1.0, 0.0);

        let xf = sweep.transform_at(0.5);
        // Center of mass sits at (5, 0) after a quarter turn.
        assert_points_eq(xf.apply(sweep.local_center), Point::new(5.0, 0.0));
        assert_points_eq(xf.apply(Point::ORIGIN), Point::new(5.0, -1.0));
    }

    #[test]
    fn sweep_advance_moves_the_start() {
        let mut sweep = Sweep::new(Point::new(0.0, 0.0), 0.0, Point::new(10.0, 0.0), 1.0);
        sweep.advance(0.25);
        assert_points_eq(sweep.c0, Point::new(2.5, 0.0));
        assert_abs_diff_eq!(sweep.a0, 0.25);
        assert_abs_diff_eq!(sweep.alpha0, 0.25);

        // Half of the remaining step.
        sweep.advance(0.625);
        assert_points_eq(sweep.c0, Point::new(6.25, 0.0));
    }

    #[test]
    fn sweep_normalize_wraps_the_start_angle() {
        let mut sweep = Sweep::new(Point::ORIGIN, 7.0, Point::ORIGIN, 8.0);
        sweep.normalize();
        assert_abs_diff_eq!(sweep.a0, 7.0 - TAU, epsilon = 1e-12);
        assert_abs_diff_eq!(sweep.a - sweep.a0, 1.0, epsilon = 1e-12);

        let mut negative = Sweep::new(Point::ORIGIN, -1.0, Point::ORIGIN, -0.5);
        negative.normalize();
        assert_abs_diff_eq!(negative.a0, TAU - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_leaves_tiny_vectors_alone() {
        let (v, len) = normalize_with_length(Vec2::new(3.0, 4.0));
        assert_abs_diff_eq!(len, 5.0);
        assert_abs_diff_eq!(v.x, 0.6);
        let (z, len) = normalize_with_length(Vec2::ZERO);
        assert_eq!(z, Vec2::ZERO);
        assert_abs_diff_eq!(len, 0.0);
        assert_eq!(cross_sv(1.0, Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0));
        assert_eq!(cross_vs(Vec2::new(1.0, 0.0), 1.0), Vec2::new(0.0, -1.0));
    }
}
