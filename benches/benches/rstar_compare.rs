// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tumble_index::{Aabb, DynamicTree};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn gen_grid_boxes(n: usize, cell: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb::from_coords(x0, y0, x0 + cell, y0 + cell));
        }
    }
    out
}

fn to_rstar_rects(v: &[Aabb]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|b| Rectangle::from_corners([b.lower.x, b.lower.y], [b.upper.x, b.upper.y]))
        .collect()
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_vs_rstar");
    for &n in &[64usize, 128] {
        let boxes = gen_grid_boxes(n, 10.0);
        let window = Aabb::from_coords(100.0, 100.0, 500.0, 500.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("tumble_incremental_build_query_n{}", n), |b| {
            b.iter(|| {
                let mut tree = DynamicTree::new();
                for (i, aabb) in boxes.iter().enumerate() {
                    tree.create_proxy(*aabb, i as u32);
                }
                let mut hits = 0usize;
                tree.query(&window, |_| {
                    hits += 1;
                    true
                });
                black_box(hits);
            });
        });

        group.bench_function(format!("tumble_rebuild_query_n{}", n), |b| {
            b.iter_batched(
                || {
                    let mut tree = DynamicTree::new();
                    for (i, aabb) in boxes.iter().enumerate() {
                        tree.create_proxy(*aabb, i as u32);
                    }
                    tree
                },
                |mut tree| {
                    tree.rebuild_bottom_up();
                    let mut hits = 0usize;
                    tree.query(&window, |_| {
                        hits += 1;
                        true
                    });
                    black_box(hits);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&boxes),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(
                        [window.lower.x, window.lower.y],
                        [window.upper.x, window.upper.y],
                    );
                    let hits = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
