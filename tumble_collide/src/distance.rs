// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closest points between convex proxies (GJK), translational shape cast, and overlap.
//!
//! Every query works on [`DistanceProxy`] values: a convex point cloud of at most
//! [`MAX_POLYGON_VERTICES`] points inflated by a radius. Proxies are built from one child of
//! a [`Shape`] or directly from vertices.

use kurbo::{Point, Vec2};

use crate::math::{Transform, cross_sv, cross_vs, normalize};
use crate::settings::{EPSILON, LINEAR_SLOP, MAX_POLYGON_VERTICES, POLYGON_RADIUS};
use crate::shapes::Shape;

const MAX_GJK_ITERATIONS: usize = 20;

/// A convex shape (or shape child) as seen by the distance routines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceProxy {
    vertices: [Point; MAX_POLYGON_VERTICES],
    count: usize,
    radius: f64,
}

impl DistanceProxy {
    /// A proxy for the convex hull of `vertices` inflated by `radius`.
    ///
    /// # Panics
    ///
    /// Panics if `vertices` is empty or longer than [`MAX_POLYGON_VERTICES`].
    pub fn new(vertices: &[Point], radius: f64) -> Self {
        assert!(
            !vertices.is_empty() && vertices.len() <= MAX_POLYGON_VERTICES,
            "a distance proxy needs between 1 and {MAX_POLYGON_VERTICES} vertices, got {}",
            vertices.len()
        );
        let mut buffer = [Point::ORIGIN; MAX_POLYGON_VERTICES];
        buffer[..vertices.len()].copy_from_slice(vertices);
        Self {
            vertices: buffer,
            count: vertices.len(),
            radius,
        }
    }

    /// The proxy for child `child_index` of `shape`.
    ///
    /// Circles become a single point with the circle's radius; polygons keep their hull;
    /// edges and chain children become a segment with the skin radius.
    pub fn from_shape(shape: &Shape, child_index: usize) -> Self {
        match shape {
            Shape::Circle(circle) => Self::new(&[circle.position], circle.radius),
            Shape::Polygon(polygon) => Self::new(polygon.vertices(), polygon.radius()),
            Shape::Edge(edge) => Self::new(&[edge.vertex1, edge.vertex2], edge.radius()),
            Shape::Chain(chain) => {
                let (v1, v2) = chain.child_vertices(child_index);
                Self::new(&[v1, v2], chain.radius())
            }
        }
    }

    /// Local vertices.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices[..self.count]
    }

    /// Local vertex `index`.
    pub fn vertex(&self, index: usize) -> Point {
        self.vertices()[index]
    }

    /// Inflation radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Index of the vertex furthest along the local direction `d`.
    ///
    /// Ties go to the lowest index.
    pub fn support(&self, d: Vec2) -> usize {
        let mut best = 0;
        let mut best_value = self.vertices[0].to_vec2().dot(d);
        for (i, v) in self.vertices().iter().enumerate().skip(1) {
            let value = v.to_vec2().dot(d);
            if value > best_value {
                best = i;
                best_value = value;
            }
        }
        best
    }

    /// The vertex furthest along the local direction `d`.
    pub fn support_vertex(&self, d: Vec2) -> Point {
        self.vertex(self.support(d))
    }
}

/// Warm-start state carried between [`distance`] calls on the same pair.
///
/// A default cache starts from scratch.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SimplexCache {
    /// Length or area of the cached simplex, used to detect a stale cache.
    pub metric: f64,
    /// Number of cached vertices (0 to 3).
    pub count: u16,
    /// Vertex indices on proxy A.
    pub index_a: [u8; 3],
    /// Vertex indices on proxy B.
    pub index_b: [u8; 3],
}

/// Input to [`distance`].
#[derive(Copy, Clone, Debug)]
pub struct DistanceInput<'a> {
    /// First proxy.
    pub proxy_a: &'a DistanceProxy,
    /// Second proxy.
    pub proxy_b: &'a DistanceProxy,
    /// Placement of the first proxy.
    pub transform_a: Transform,
    /// Placement of the second proxy.
    pub transform_b: Transform,
    /// Whether to measure between the inflated surfaces instead of the cores.
    pub use_radii: bool,
}

/// Result of [`distance`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceOutput {
    /// Closest point on A, in world coordinates.
    pub point_a: Point,
    /// Closest point on B, in world coordinates.
    pub point_b: Point,
    /// Distance between the two points.
    pub distance: f64,
    /// GJK iterations used.
    pub iterations: usize,
}

/// Input to [`shape_cast`].
#[derive(Copy, Clone, Debug)]
pub struct ShapeCastInput<'a> {
    /// Stationary proxy.
    pub proxy_a: &'a DistanceProxy,
    /// Moving proxy.
    pub proxy_b: &'a DistanceProxy,
    /// Placement of A.
    pub transform_a: Transform,
    /// Placement of B at the start of the cast.
    pub transform_b: Transform,
    /// Translation of B over the cast.
    pub translation_b: Vec2,
}

/// Result of a successful [`shape_cast`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeCastOutput {
    /// Contact point on the surface of A.
    pub point: Point,
    /// Contact normal, pointing from A toward B.
    pub normal: Vec2,
    /// Fraction of `translation_b` travelled before contact.
    pub lambda: f64,
    /// GJK iterations used.
    pub iterations: usize,
}

#[derive(Copy, Clone, Debug)]
struct SimplexVertex {
    /// Support point on A, world.
    w_a: Point,
    /// Support point on B, world.
    w_b: Point,
    /// `w_b - w_a`.
    w: Vec2,
    /// Barycentric weight of the closest point.
    a: f64,
    index_a: usize,
    index_b: usize,
}

impl SimplexVertex {
    const EMPTY: Self = Self {
        w_a: Point::ORIGIN,
        w_b: Point::ORIGIN,
        w: Vec2::ZERO,
        a: 0.0,
        index_a: 0,
        index_b: 0,
    };

    fn new(w_a: Point, index_a: usize, w_b: Point, index_b: usize) -> Self {
        Self {
            w_a,
            w_b,
            w: w_b - w_a,
            a: 1.0,
            index_a,
            index_b,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Simplex {
    v: [SimplexVertex; 3],
    count: usize,
}

impl Simplex {
    fn from_cache(
        cache: &SimplexCache,
        proxy_a: &DistanceProxy,
        xf_a: &Transform,
        proxy_b: &DistanceProxy,
        xf_b: &Transform,
    ) -> Self {
        let mut simplex = Self {
            v: [SimplexVertex::EMPTY; 3],
            count: usize::from(cache.count).min(3),
        };
        for i in 0..simplex.count {
            let index_a = usize::from(cache.index_a[i]);
            let index_b = usize::from(cache.index_b[i]);
            let mut vertex = SimplexVertex::new(
                xf_a.apply(proxy_a.vertex(index_a)),
                index_a,
                xf_b.apply(proxy_b.vertex(index_b)),
                index_b,
            );
            vertex.a = 0.0;
            simplex.v[i] = vertex;
        }

        // Flush the cache if the simplex changed shape too much since it was written.
        if simplex.count > 1 {
            let metric1 = cache.metric;
            let metric2 = simplex.metric();
            if metric2 < 0.5 * metric1 || 2.0 * metric1 < metric2 || metric2 < EPSILON {
                simplex.count = 0;
            }
        }

        if simplex.count == 0 {
            simplex.v[0] = SimplexVertex::new(
                xf_a.apply(proxy_a.vertex(0)),
                0,
                xf_b.apply(proxy_b.vertex(0)),
                0,
            );
            simplex.count = 1;
        }
        simplex
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "proxy indices are below MAX_POLYGON_VERTICES and count is at most 3"
    )]
    fn write_cache(&self, cache: &mut SimplexCache) {
        cache.metric = self.metric();
        cache.count = self.count as u16;
        for (i, v) in self.v[..self.count].iter().enumerate() {
            cache.index_a[i] = v.index_a as u8;
            cache.index_b[i] = v.index_b as u8;
        }
    }

    fn search_direction(&self) -> Vec2 {
        match self.count {
            1 => -self.v[0].w,
            2 => {
                let e12 = self.v[1].w - self.v[0].w;
                if e12.cross(-self.v[0].w) > 0.0 {
                    // Origin is left of e12.
                    cross_sv(1.0, e12)
                } else {
                    cross_vs(e12, 1.0)
                }
            }
            _ => Vec2::ZERO,
        }
    }

    fn closest_point(&self) -> Vec2 {
        match self.count {
            1 => self.v[0].w,
            2 => self.v[0].a * self.v[0].w + self.v[1].a * self.v[1].w,
            _ => Vec2::ZERO,
        }
    }

    fn witness_points(&self) -> (Point, Point) {
        let [v1, v2, v3] = &self.v;
        match self.count {
            1 => (v1.w_a, v1.w_b),
            2 => (
                (v1.a * v1.w_a.to_vec2() + v2.a * v2.w_a.to_vec2()).to_point(),
                (v1.a * v1.w_b.to_vec2() + v2.a * v2.w_b.to_vec2()).to_point(),
            ),
            _ => {
                let p = (v1.a * v1.w_a.to_vec2()
                    + v2.a * v2.w_a.to_vec2()
                    + v3.a * v3.w_a.to_vec2())
                .to_point();
                (p, p)
            }
        }
    }

    fn metric(&self) -> f64 {
        match self.count {
            2 => (self.v[0].w - self.v[1].w).hypot(),
            3 => (self.v[1].w - self.v[0].w).cross(self.v[2].w - self.v[0].w),
            _ => 0.0,
        }
    }

    // Closest point on the segment w1-w2 to the origin, in barycentric coordinates.
    // Regions: w1 vertex (d12_2 <= 0), w2 vertex (d12_1 <= 0), or the edge interior.
    fn solve2(&mut self) {
        let w1 = self.v[0].w;
        let w2 = self.v[1].w;
        let e12 = w2 - w1;

        let d12_2 = -w1.dot(e12);
        if d12_2 <= 0.0 {
            self.v[0].a = 1.0;
            self.count = 1;
            return;
        }

        let d12_1 = w2.dot(e12);
        if d12_1 <= 0.0 {
            self.v[1].a = 1.0;
            self.count = 1;
            self.v[0] = self.v[1];
            return;
        }

        let inv = 1.0 / (d12_1 + d12_2);
        self.v[0].a = d12_1 * inv;
        self.v[1].a = d12_2 * inv;
        self.count = 2;
    }

    // Voronoi regions of the triangle: three vertices, three edges, and the interior.
    fn solve3(&mut self) {
        let w1 = self.v[0].w;
        let w2 = self.v[1].w;
        let w3 = self.v[2].w;

        let e12 = w2 - w1;
        let d12_1 = w2.dot(e12);
        let d12_2 = -w1.dot(e12);

        let e13 = w3 - w1;
        let d13_1 = w3.dot(e13);
        let d13_2 = -w1.dot(e13);

        let e23 = w3 - w2;
        let d23_1 = w3.dot(e23);
        let d23_2 = -w2.dot(e23);

        let n123 = e12.cross(e13);
        let d123_1 = n123 * w2.cross(w3);
        let d123_2 = n123 * w3.cross(w1);
        let d123_3 = n123 * w1.cross(w2);

        if d12_2 <= 0.0 && d13_2 <= 0.0 {
            self.v[0].a = 1.0;
            self.count = 1;
            return;
        }

        if d12_1 > 0.0 && d12_2 > 0.0 && d123_3 <= 0.0 {
            let inv = 1.0 / (d12_1 + d12_2);
            self.v[0].a = d12_1 * inv;
            self.v[1].a = d12_2 * inv;
            self.count = 2;
            return;
        }

        if d13_1 > 0.0 && d13_2 > 0.0 && d123_2 <= 0.0 {
            let inv = 1.0 / (d13_1 + d13_2);
            self.v[0].a = d13_1 * inv;
            self.v[2].a = d13_2 * inv;
            self.count = 2;
            self.v[1] = self.v[2];
            return;
        }

        if d12_1 <= 0.0 && d23_2 <= 0.0 {
            self.v[1].a = 1.0;
            self.count = 1;
            self.v[0] = self.v[1];
            return;
        }

        if d13_1 <= 0.0 && d23_1 <= 0.0 {
            self.v[2].a = 1.0;
            self.count = 1;
            self.v[0] = self.v[2];
            return;
        }

        if d23_1 > 0.0 && d23_2 > 0.0 && d123_1 <= 0.0 {
            let inv = 1.0 / (d23_1 + d23_2);
            self.v[1].a = d23_1 * inv;
            self.v[2].a = d23_2 * inv;
            self.count = 2;
            self.v[0] = self.v[2];
            return;
        }

        let inv = 1.0 / (d123_1 + d123_2 + d123_3);
        self.v[0].a = d123_1 * inv;
        self.v[1].a = d123_2 * inv;
        self.v[2].a = d123_3 * inv;
        self.count = 3;
    }

    fn solve(&mut self) {
        match self.count {
            2 => self.solve2(),
            3 => self.solve3(),
            _ => {}
        }
    }
}

/// Closest points between two proxies.
///
/// `cache` warm-starts the search and is updated with the final simplex, so passing the
/// same cache on the next step for the same pair usually converges in one or two
/// iterations. Overlapping cores report a distance of `0`.
pub fn distance(cache: &mut SimplexCache, input: &DistanceInput<'_>) -> DistanceOutput {
    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;
    let xf_a = &input.transform_a;
    let xf_b = &input.transform_b;

    let mut simplex = Simplex::from_cache(cache, proxy_a, xf_a, proxy_b, xf_b);

    let mut save_a = [0_usize; 3];
    let mut save_b = [0_usize; 3];
    let mut iterations = 0;
    while iterations < MAX_GJK_ITERATIONS {
        let save_count = simplex.count;
        for i in 0..save_count {
            save_a[i] = simplex.v[i].index_a;
            save_b[i] = simplex.v[i].index_b;
        }

        simplex.solve();
        // The origin is inside the triangle.
        if simplex.count == 3 {
            break;
        }

        let d = simplex.search_direction();
        // The origin is probably on the simplex; no meaningful direction remains.
        if d.hypot2() < EPSILON * EPSILON {
            break;
        }

        let index_a = proxy_a.support(xf_a.q.inv_rotate(-d));
        let index_b = proxy_b.support(xf_b.q.inv_rotate(d));
        let vertex = SimplexVertex::new(
            xf_a.apply(proxy_a.vertex(index_a)),
            index_a,
            xf_b.apply(proxy_b.vertex(index_b)),
            index_b,
        );
        iterations += 1;

        // A repeated support point means no progress is possible.
        let duplicate = (0..save_count).any(|i| save_a[i] == index_a && save_b[i] == index_b);
        if duplicate {
            break;
        }

        simplex.v[simplex.count] = vertex;
        simplex.count += 1;
    }

    let (mut point_a, mut point_b) = simplex.witness_points();
    let mut dist = (point_b - point_a).hypot();
    simplex.write_cache(cache);

    if input.use_radii {
        if dist < EPSILON {
            let p = point_a.midpoint(point_b);
            point_a = p;
            point_b = p;
            dist = 0.0;
        } else {
            let r_a = proxy_a.radius;
            let r_b = proxy_b.radius;
            let normal = normalize(point_b - point_a);
            dist = (dist - r_a - r_b).max(0.0);
            point_a += r_a * normal;
            point_b -= r_b * normal;
        }
    }

    DistanceOutput {
        point_a,
        point_b,
        distance: dist,
        iterations,
    }
}

/// Sweep proxy B along `translation_b` and report the first contact with proxy A.
///
/// Returns `None` when the proxies never touch within the translation, or when they
/// already overlap at the start.
pub fn shape_cast(input: &ShapeCastInput<'_>) -> Option<ShapeCastOutput> {
    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;
    let xf_a = &input.transform_a;
    let xf_b = &input.transform_b;

    let radius_a = proxy_a.radius.max(POLYGON_RADIUS);
    let radius_b = proxy_b.radius.max(POLYGON_RADIUS);
    let radius = radius_a + radius_b;

    let r = input.translation_b;
    let mut n = Vec2::ZERO;
    let mut lambda = 0.0;

    let mut simplex = Simplex {
        v: [SimplexVertex::EMPTY; 3],
        count: 0,
    };

    // Initial separating direction from an arbitrary pair of support points.
    let index_a = proxy_a.support(xf_a.q.inv_rotate(-r));
    let w_a = xf_a.apply(proxy_a.vertex(index_a));
    let index_b = proxy_b.support(xf_b.q.inv_rotate(r));
    let w_b = xf_b.apply(proxy_b.vertex(index_b));
    let mut v = w_a - w_b;

    // Sigma is the target distance between the cores.
    let sigma = POLYGON_RADIUS.max(radius - POLYGON_RADIUS);
    let tolerance = 0.5 * LINEAR_SLOP;

    let mut iterations = 0;
    while iterations < MAX_GJK_ITERATIONS && v.hypot() - sigma > tolerance {
        let index_a = proxy_a.support(xf_a.q.inv_rotate(-v));
        let w_a = xf_a.apply(proxy_a.vertex(index_a));
        let index_b = proxy_b.support(xf_b.q.inv_rotate(v));
        let w_b = xf_b.apply(proxy_b.vertex(index_b));
        let p = w_a - w_b;

        v = normalize(v);

        // Intersect the ray with the plane through p.
        let vp = v.dot(p);
        let vr = v.dot(r);
        if vp - sigma > lambda * vr {
            if vr <= 0.0 {
                // Moving away.
                return None;
            }
            lambda = (vp - sigma) / vr;
            if lambda > 1.0 {
                return None;
            }
            n = -v;
            simplex.count = 0;
        }

        // The simplex lives in the frame of B translated by lambda * r, so the roles of
        // A and B are swapped in its vertices.
        simplex.v[simplex.count] = SimplexVertex::new(w_b + lambda * r, index_b, w_a, index_a);
        simplex.count += 1;

        simplex.solve();
        if simplex.count == 3 {
            // Overlap.
            return None;
        }

        v = simplex.closest_point();
        iterations += 1;
    }

    if iterations == 0 {
        // Initial overlap.
        return None;
    }

    let (_, point_a) = simplex.witness_points();
    if v.hypot2() > 0.0 {
        n = normalize(-v);
    }

    Some(ShapeCastOutput {
        point: point_a + radius_a * n,
        normal: n,
        lambda,
        iterations,
    })
}

/// Whether child `child_a` of `shape_a` and child `child_b` of `shape_b` overlap, rounding
/// radii included.
pub fn test_overlap(
    shape_a: &Shape,
    child_a: usize,
    shape_b: &Shape,
    child_b: usize,
    xf_a: &Transform,
    xf_b: &Transform,
) -> bool {
    let proxy_a = DistanceProxy::from_shape(shape_a, child_a);
    let proxy_b = DistanceProxy::from_shape(shape_b, child_b);
    let input = DistanceInput {
        proxy_a: &proxy_a,
        proxy_b: &proxy_b,
        transform_a: *xf_a,
        transform_b: *xf_b,
        use_radii: true,
    };
    let mut cache = SimplexCache::default();
    distance(&mut cache, &input).distance < 10.0 * EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ChainShape, CircleShape, EdgeShape, PolygonShape};
    use approx::assert_abs_diff_eq;

    fn boxed(hx: f64) -> DistanceProxy {
        DistanceProxy::from_shape(&PolygonShape::new_box(hx, hx).into(), 0)
    }

    fn at(x: f64, y: f64) -> Transform {
        Transform::from_translation(Vec2::new(x, y))
    }

    fn run(
        a: &DistanceProxy,
        xf_a: Transform,
        b: &DistanceProxy,
        xf_b: Transform,
        use_radii: bool,
        cache: &mut SimplexCache,
    ) -> DistanceOutput {
        distance(
            cache,
            &DistanceInput {
                proxy_a: a,
                proxy_b: b,
                transform_a: xf_a,
                transform_b: xf_b,
                use_radii,
            },
        )
    }

    #[test]
    fn proxies_from_every_shape() {
        let circle =
            DistanceProxy::from_shape(&CircleShape::new(Point::new(1.0, 2.0), 0.5).into(), 0);
        assert_eq!(circle.vertices(), &[Point::new(1.0, 2.0)]);
        assert_abs_diff_eq!(circle.radius(), 0.5);

        let edge = DistanceProxy::from_shape(
            &EdgeShape::new_two_sided(Point::ORIGIN, Point::new(1.0, 0.0)).into(),
            0,
        );
        assert_eq!(edge.vertices().len(), 2);
        assert_abs_diff_eq!(edge.radius(), POLYGON_RADIUS);

        let chain: Shape = ChainShape::new_loop(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap()
        .into();
        let closing = DistanceProxy::from_shape(&chain, 2);
        assert_eq!(closing.vertices(), &[Point::new(1.0, 1.0), Point::new(0.0, 0.0)]);

        let square = boxed(1.0);
        assert_eq!(square.vertices().len(), 4);
        assert_eq!(square.support_vertex(Vec2::new(1.0, 0.1)), Point::new(1.0, 1.0));
        assert_eq!(square.support(Vec2::new(-1.0, -0.1)), 0);
    }

    #[test]
    #[should_panic(expected = "between 1 and")]
    fn empty_proxy_panics() {
        let _ = DistanceProxy::new(&[], 0.0);
    }

    #[test]
    fn separated_boxes() {
        let a = boxed(0.5);
        let b = boxed(0.5);
        let mut cache = SimplexCache::default();

        let core = run(&a, at(0.0, 0.0), &b, at(3.0, 0.2), false, &mut cache);
        assert_abs_diff_eq!(core.distance, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(core.point_a.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(core.point_b.x, 2.5, epsilon = 1e-9);

        let mut cache = SimplexCache::default();
        let rounded = run(&a, at(0.0, 0.0), &b, at(3.0, 0.2), true, &mut cache);
        assert_abs_diff_eq!(rounded.distance, 2.0 - 2.0 * POLYGON_RADIUS, epsilon = 1e-9);
        assert_abs_diff_eq!(rounded.point_a.x, 0.5 + POLYGON_RADIUS, epsilon = 1e-9);
        assert_abs_diff_eq!(rounded.point_b.x, 2.5 - POLYGON_RADIUS, epsilon = 1e-9);
    }

    #[test]
    fn warm_start_reuses_the_simplex() {
        let a = boxed(0.5);
        let b = DistanceProxy::new(&[Point::ORIGIN], 0.25);
        let mut cache = SimplexCache::default();

        let cold = run(&a, at(0.0, 0.0), &b, at(3.0, 0.1), false, &mut cache);
        assert_eq!(cache.count, 2);
        let warm = run(&a, at(0.0, 0.0), &b, at(3.0, 0.1), false, &mut cache);
        assert_abs_diff_eq!(warm.distance, cold.distance, epsilon = 1e-12);
        assert!(
            warm.iterations <= cold.iterations,
            "warm start took {} iterations, cold took {}",
            warm.iterations,
            cold.iterations
        );
    }

    #[test]
    fn rotated_transforms_are_respected() {
        let a = boxed(0.5);
        let b = DistanceProxy::new(&[Point::ORIGIN], 0.0);
        let mut cache = SimplexCache::default();
        // Rotated by 45 degrees the corner points along +x.
        let xf_a = Transform::new(Point::ORIGIN, core::f64::consts::FRAC_PI_4);
        let out = run(&a, xf_a, &b, at(2.0, 0.0), false, &mut cache);
        assert_abs_diff_eq!(out.distance, 2.0 - 0.5 * 2.0_f64.sqrt(), epsilon = 1e-9);
        assert_eq!(cache.count, 1);
    }

    #[test]
    fn point_inside_polygon_has_zero_distance() {
        let a = boxed(1.0);
        let b = DistanceProxy::new(&[Point::ORIGIN], 0.0);
        let mut cache = SimplexCache::default();
        let out = run(&a, at(0.0, 0.0), &b, at(0.1, 0.2), false, &mut cache);
        assert_abs_diff_eq!(out.distance, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn overlapping_radii_collapse_to_the_midpoint() {
        let a = DistanceProxy::new(&[Point::ORIGIN], 1.0);
        let b = DistanceProxy::new(&[Point::ORIGIN], 1.0);
        let mut cache = SimplexCache::default();
        let out = run(&a, at(0.0, 0.0), &b, at(1.5, 0.0), true, &mut cache);
        assert_abs_diff_eq!(out.distance, 0.0);

        let mut cache = SimplexCache::default();
        let same = run(&a, at(1.0, 1.0), &b, at(1.0, 1.0), true, &mut cache);
        assert_eq!(same.point_a, Point::new(1.0, 1.0));
        assert_eq!(same.point_b, Point::new(1.0, 1.0));
        assert_abs_diff_eq!(same.distance, 0.0);
    }

    #[test]
    fn shape_cast_finds_first_contact() {
        let a = DistanceProxy::new(&[Point::ORIGIN], 0.5);
        let b = DistanceProxy::new(&[Point::ORIGIN], 0.5);
        let input = ShapeCastInput {
            proxy_a: &a,
            proxy_b: &b,
            transform_a: Transform::IDENTITY,
            transform_b: at(5.0, 0.0),
            translation_b: Vec2::new(-10.0, 0.0),
        };
        let hit = shape_cast(&input).unwrap();
        assert_abs_diff_eq!(hit.lambda, 0.401, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.normal.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.normal.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hit.point.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.point.y, 0.0, epsilon = 1e-9);

        let away = ShapeCastInput {
            translation_b: Vec2::new(10.0, 0.0),
            ..input
        };
        assert!(shape_cast(&away).is_none());

        let short = ShapeCastInput {
            translation_b: Vec2::new(-3.0, 0.0),
            ..input
        };
        assert!(shape_cast(&short).is_none());

        let overlapping = ShapeCastInput {
            transform_b: at(0.5, 0.0),
            ..input
        };
        assert!(shape_cast(&overlapping).is_none());
    }

    #[test]
    fn shape_cast_box_onto_box() {
        let a = boxed(0.5);
        let b = boxed(0.5);
        let input = ShapeCastInput {
            proxy_a: &a,
            proxy_b: &b,
            transform_a: Transform::IDENTITY,
            transform_b: at(0.0, 4.0),
            translation_b: Vec2::new(0.0, -6.0),
        };
        let hit = shape_cast(&input).unwrap();
        // Cores stop one sigma apart: 3 units of gap minus (2 * radius - radius).
        let sigma = 2.0 * POLYGON_RADIUS - POLYGON_RADIUS;
        assert_abs_diff_eq!(hit.lambda, (3.0 - sigma) / 6.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.normal.y, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.point.y, 0.5 + POLYGON_RADIUS, epsilon = 1e-3);
    }

    #[test]
    fn overlap_test_includes_radii() {
        let circle: Shape = CircleShape::new(Point::ORIGIN, 0.5).into();
        let square: Shape = PolygonShape::new_box(0.5, 0.5).into();
        let xf = Transform::IDENTITY;

        assert!(test_overlap(&circle, 0, &square, 0, &xf, &at(0.9, 0.0)));
        assert!(test_overlap(&square, 0, &square, 0, &xf, &at(1.005, 0.0)));
        assert!(!test_overlap(&square, 0, &square, 0, &xf, &at(1.05, 0.0)));
        assert!(!test_overlap(&circle, 0, &square, 0, &xf, &at(1.2, 0.0)));
    }
}
