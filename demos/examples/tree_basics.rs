// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic tree basics.
//!
//! Insert a handful of proxies, move one, query a window, cast a ray, and print the tree
//! quality before and after a bottom-up rebuild.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p tumble_demos --example tree_basics`

use kurbo::{Point, Vec2};
use tracing_subscriber::EnvFilter;
use tumble_index::{Aabb, DynamicTree, RayCastInput};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = DynamicTree::new();
    let mut crates = Vec::new();
    for i in 0..20 {
        let x = f64::from(i) * 3.0;
        let aabb = Aabb::from_coords(x, 0.0, x + 1.0, 1.0);
        crates.push(tree.create_proxy(aabb, format!("crate-{i}")));
    }
    let player = tree.create_proxy(Aabb::from_coords(-5.0, 5.0, -4.0, 6.0), "player".to_owned());
    println!(
        "{} proxies, {} nodes, height {}, area ratio {:.2}",
        tree.proxy_count(),
        tree.node_count(),
        tree.height(),
        tree.area_ratio()
    );

    // Jitter inside the margin: no tree update.
    let d = Vec2::new(0.01, 0.0);
    let moved = tree.move_proxy(player, Aabb::from_coords(-4.99, 5.0, -3.99, 6.0), d);
    println!("small move reinserted: {moved}");

    // A real move: the proxy is reinserted with a box stretched along the motion.
    let d = Vec2::new(12.0, -5.0);
    let moved = tree.move_proxy(player, Aabb::from_coords(7.01, 0.0, 8.01, 1.0), d);
    println!(
        "large move reinserted: {moved}, fat box {:?}",
        tree.fat_aabb(player)
    );

    let mut near = Vec::new();
    tree.query(&Aabb::from_coords(5.0, -1.0, 10.0, 2.0), |id| {
        near.push(tree.user_data(id).cloned().unwrap_or_default());
        true
    });
    near.sort();
    println!("near the player: {near:?}");

    let ray = RayCastInput::new(Point::new(-10.0, 0.5), Point::new(100.0, 0.5));
    let mut first = None;
    let result = tree.ray_cast(&ray, |sub_input, id| {
        match tree.fat_aabb(id).ray_cast(sub_input) {
            Some(hit) => {
                first = Some((id, hit.fraction));
                hit.fraction
            }
            None => -1.0,
        }
    });
    if let Err(err) = result {
        eprintln!("ray cast failed: {err}");
        return;
    }
    if let Some((id, fraction)) = first {
        println!(
            "ray hits {:?} at {:?}",
            tree.user_data(id),
            ray.point_at(fraction)
        );
    }

    let removed = tree.destroy_proxy(crates[0]);
    println!("removed {removed}");

    tree.rebuild_bottom_up();
    println!(
        "after rebuild: height {}, max balance {}, area ratio {:.2}",
        tree.height(),
        tree.max_balance(),
        tree.area_ratio()
    );
}
