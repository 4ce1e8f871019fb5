// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous collision basics.
//!
//! Build a few shapes, measure distances, and find the time of impact of a fast bullet
//! against a thin wall it would otherwise tunnel through.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p tumble_demos --example toi_basics`

use kurbo::{Point, Vec2};
use tracing_subscriber::EnvFilter;
use tumble_collide::{
    ChainShape, CircleShape, DistanceInput, DistanceProxy, PolygonShape, Shape, ShapeCastInput,
    SimplexCache, Sweep, ToiInput, ToiStats, Transform, distance, shape_cast, test_overlap,
    time_of_impact,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let wall: Shape = PolygonShape::new_box(0.05, 2.0).into();
    let bullet: Shape = CircleShape::new(Point::ORIGIN, 0.1).into();
    let triangle: Shape = match PolygonShape::new(&[
        Point::new(0.0, 1.0),
        Point::new(-1.0, -1.0),
        Point::new(1.0, -1.0),
        // Interior point, dropped by the hull.
        Point::new(0.0, 0.0),
    ]) {
        Ok(polygon) => polygon.into(),
        Err(err) => {
            eprintln!("bad polygon: {err}");
            return;
        }
    };
    let mass = triangle.compute_mass(1.0);
    println!("triangle mass {:.3}, center {:?}", mass.mass, mass.center);

    let wall_proxy = DistanceProxy::from_shape(&wall, 0);
    let bullet_proxy = DistanceProxy::from_shape(&bullet, 0);
    let wall_xf = Transform::new(Point::new(5.0, 0.0), 0.0);

    let mut cache = SimplexCache::default();
    let gap = distance(
        &mut cache,
        &DistanceInput {
            proxy_a: &wall_proxy,
            proxy_b: &bullet_proxy,
            transform_a: wall_xf,
            transform_b: Transform::IDENTITY,
            use_radii: true,
        },
    );
    println!(
        "bullet to wall: {:.3} between {:?} and {:?}",
        gap.distance, gap.point_a, gap.point_b
    );

    // Sampled at the start and end of the step the bullet never overlaps the wall.
    let end = Transform::new(Point::new(10.0, 0.0), 0.0);
    println!(
        "overlap at start {}, at end {}",
        test_overlap(&wall, 0, &bullet, 0, &wall_xf, &Transform::IDENTITY),
        test_overlap(&wall, 0, &bullet, 0, &wall_xf, &end)
    );

    let mut stats = ToiStats::default();
    let out = time_of_impact(&ToiInput {
        proxy_a: &wall_proxy,
        proxy_b: &bullet_proxy,
        sweep_a: Sweep::stationary(Point::new(5.0, 0.0), 0.0),
        sweep_b: Sweep::new(Point::ORIGIN, 0.0, Point::new(10.0, 0.0), 0.0),
        t_max: 1.0,
    });
    stats.merge(&out.stats);
    println!("time of impact: {:?} at t = {:.4}", out.state, out.t);

    let cast = shape_cast(&ShapeCastInput {
        proxy_a: &wall_proxy,
        proxy_b: &bullet_proxy,
        transform_a: wall_xf,
        transform_b: Transform::IDENTITY,
        translation_b: Vec2::new(10.0, 0.0),
    });
    if let Some(hit) = cast {
        println!(
            "shape cast: lambda {:.4}, point {:?}, normal {:?}",
            hit.lambda, hit.point, hit.normal
        );
    }

    // A spinning box against a closed chain border.
    let border: Shape = match ChainShape::new_loop(&[
        Point::new(-10.0, -10.0),
        Point::new(10.0, -10.0),
        Point::new(10.0, 10.0),
        Point::new(-10.0, 10.0),
    ]) {
        Ok(chain) => chain.into(),
        Err(err) => {
            eprintln!("bad chain: {err}");
            return;
        }
    };
    let block = DistanceProxy::from_shape(&PolygonShape::new_box(0.5, 0.25).into(), 0);
    let sweep = Sweep::new(Point::new(0.0, 0.0), 0.0, Point::new(0.0, -15.0), 4.0);
    for child in 0..border.child_count() {
        let segment = DistanceProxy::from_shape(&border, child);
        let out = time_of_impact(&ToiInput {
            proxy_a: &segment,
            proxy_b: &block,
            sweep_a: Sweep::stationary(Point::ORIGIN, 0.0),
            sweep_b: sweep,
            t_max: 1.0,
        });
        stats.merge(&out.stats);
        println!("border edge {child}: {:?} at t = {:.4}", out.state, out.t);
    }
    println!("total work: {stats:?}");
    tracing::info!(iterations = stats.iterations, "done");
}
