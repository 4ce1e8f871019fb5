// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use tumble_collide::{
    CircleShape, DistanceInput, DistanceProxy, PolygonShape, Shape, ShapeCastInput, SimplexCache,
    Sweep, ToiInput, ToiStats, Transform, distance, shape_cast, time_of_impact,
};

fn hexagon() -> Shape {
    let points: Vec<_> = (0..6)
        .map(|i| {
            let a = i as f64 * core::f64::consts::TAU / 6.0;
            Point::new(a.cos(), a.sin())
        })
        .collect();
    PolygonShape::new(&points).unwrap().into()
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let a = DistanceProxy::from_shape(&hexagon(), 0);
    let b = DistanceProxy::from_shape(&PolygonShape::new_box(0.5, 0.25).into(), 0);
    let input = DistanceInput {
        proxy_a: &a,
        proxy_b: &b,
        transform_a: Transform::IDENTITY,
        transform_b: Transform::new(Point::new(3.0, 0.7), 0.4),
        use_radii: true,
    };
    group.bench_function("cold_cache", |bench| {
        bench.iter(|| {
            let mut cache = SimplexCache::default();
            black_box(distance(&mut cache, &input));
        });
    });
    let mut warm = SimplexCache::default();
    distance(&mut warm, &input);
    group.bench_function("warm_cache", |bench| {
        bench.iter(|| {
            let mut cache = warm;
            black_box(distance(&mut cache, &input));
        });
    });
    group.bench_function("shape_cast", |bench| {
        let cast = ShapeCastInput {
            proxy_a: &a,
            proxy_b: &b,
            transform_a: Transform::IDENTITY,
            transform_b: Transform::new(Point::new(6.0, 0.2), 0.4),
            translation_b: Vec2::new(-8.0, 0.0),
        };
        bench.iter(|| black_box(shape_cast(&cast)));
    });
    group.finish();
}

fn bench_toi(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_of_impact");
    let ball = DistanceProxy::from_shape(&CircleShape::new(Point::ORIGIN, 0.25).into(), 0);
    let block = DistanceProxy::from_shape(&PolygonShape::new_box(0.5, 0.5).into(), 0);
    let hex = DistanceProxy::from_shape(&hexagon(), 0);

    group.bench_function("ball_into_box", |bench| {
        let input = ToiInput {
            proxy_a: &block,
            proxy_b: &ball,
            sweep_a: Sweep::stationary(Point::ORIGIN, 0.0),
            sweep_b: Sweep::new(Point::new(0.0, 10.0), 0.0, Point::new(0.0, -10.0), 0.0),
            t_max: 1.0,
        };
        bench.iter(|| black_box(time_of_impact(&input)));
    });

    group.bench_function("spinning_hexagons", |bench| {
        let input = ToiInput {
            proxy_a: &hex,
            proxy_b: &hex,
            sweep_a: Sweep::new(Point::new(-4.0, 0.0), 0.0, Point::new(1.0, 0.3), 2.5),
            sweep_b: Sweep::new(Point::new(4.0, 0.0), 0.0, Point::new(-1.0, -0.3), -2.0),
            t_max: 1.0,
        };
        bench.iter(|| {
            let out = time_of_impact(&input);
            let mut stats = ToiStats::default();
            stats.merge(&out.stats);
            black_box((out.state, stats));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_distance, bench_toi);
criterion_main!(benches);
