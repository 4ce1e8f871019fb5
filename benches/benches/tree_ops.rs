// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use tumble_index::{Aabb, DynamicTree, ProxyId, RayCastInput};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_grid_boxes(n: usize, cell: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb::from_coords(x0, y0, x0 + 0.8 * cell, y0 + 0.8 * cell));
        }
    }
    out
}

fn gen_random_boxes(count: usize, extent: f64, size: f64, seed: u64) -> Vec<Aabb> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * extent;
            let y0 = rng.next_f64() * extent;
            Aabb::from_coords(x0, y0, x0 + size, y0 + size)
        })
        .collect()
}

fn build(boxes: &[Aabb]) -> (DynamicTree<u32>, Vec<ProxyId>) {
    let mut tree = DynamicTree::new();
    let ids = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| tree.create_proxy(*b, i as u32))
        .collect();
    (tree, ids)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_build");
    for &n in &[32usize, 64, 128] {
        let boxes = gen_grid_boxes(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter(|| {
                let (tree, _) = build(&boxes);
                black_box(tree.height());
            });
        });
    }
    let boxes = gen_random_boxes(4096, 2000.0, 12.0, 0xCAFE_F00D_DEAD_BEEF);
    group.throughput(Throughput::Elements(boxes.len() as u64));
    group.bench_function("random_4096", |b| {
        b.iter(|| {
            let (tree, _) = build(&boxes);
            black_box(tree.height());
        });
    });
    group.bench_function("random_4096_rebuild_bottom_up", |b| {
        b.iter_batched(
            || build(&boxes).0,
            |mut tree| {
                tree.rebuild_bottom_up();
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_query");
    let boxes = gen_random_boxes(4096, 2000.0, 12.0, 0xBADC_F00D_1234_5678);
    let (tree, _) = build(&boxes);
    group.bench_function("256_windows", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 16) as f64 * 120.0;
                let y = (q / 16) as f64 * 120.0;
                tree.query(&Aabb::from_coords(x, y, x + 64.0, y + 64.0), |_| {
                    total += 1;
                    true
                });
            }
            black_box(total);
        });
    });
    group.bench_function("first_hit_only", |b| {
        b.iter(|| {
            let mut found = None;
            tree.query(&Aabb::from_coords(0.0, 0.0, 2000.0, 2000.0), |id| {
                found = Some(id);
                false
            });
            black_box(found);
        });
    });
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_move");
    let boxes = gen_random_boxes(4096, 2000.0, 12.0, 0xFACE_FEED_CAFE_BABE);
    group.throughput(Throughput::Elements(boxes.len() as u64));
    for &(name, step) in &[("jitter_inside_margin", 0.01), ("drift_out_of_margin", 2.0)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || build(&boxes),
                |(mut tree, ids)| {
                    let mut reinserted = 0usize;
                    for (j, (id, aabb)) in ids.iter().zip(&boxes).enumerate() {
                        let d = Vec2::new(if j % 2 == 0 { step } else { -step }, step);
                        if tree.move_proxy(*id, aabb.translated(d), d) {
                            reinserted += 1;
                        }
                    }
                    black_box(reinserted);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_ray_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_ray_cast");
    let boxes = gen_random_boxes(4096, 2000.0, 12.0, 0xC1A5_7E55_9999_ABCD);
    let (tree, _) = build(&boxes);
    let rays: Vec<_> = (0..128)
        .map(|i| {
            let y = i as f64 * 15.0;
            RayCastInput::new(Point::new(-10.0, y), Point::new(2010.0, 2000.0 - y))
        })
        .collect();
    group.throughput(Throughput::Elements(rays.len() as u64));
    group.bench_function("closest_hit", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for ray in &rays {
                let mut closest = None;
                tree.ray_cast(ray, |sub_input, id| match tree.fat_aabb(id).ray_cast(sub_input) {
                    Some(hit) => {
                        closest = Some(id);
                        hit.fraction
                    }
                    None => -1.0,
                })
                .unwrap();
                hits += usize::from(closest.is_some());
            }
            black_box(hits);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_move, bench_ray_cast);
criterion_main!(benches);
