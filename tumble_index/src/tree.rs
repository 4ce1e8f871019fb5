// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic AABB tree: arena-backed binary hierarchy of fat proxy boxes.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Vec2};
use tracing::{debug, trace};

use crate::aabb::{Aabb, RayCastInput};
use crate::error::TreeError;
use crate::settings::TreeConfig;

const STACK_CAPACITY: usize = 64;

/// Arena slot index. `NULL` terminates parent chains and the free list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct NodeIdx(u32);

impl NodeIdx {
    const NULL: Self = Self(u32::MAX);

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Tree node indices are intentionally 32-bit."
    )]
    const fn new(i: usize) -> Self {
        Self(i as u32)
    }

    const fn get(self) -> usize {
        self.0 as usize
    }

    const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Handle of a proxy (leaf) stored in a [`DynamicTree`].
///
/// Ids are recycled: once a proxy is destroyed its id may be handed out again by a
/// later [`DynamicTree::create_proxy`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(NodeIdx);

impl ProxyId {
    /// Slot index of this proxy in the tree's node arena.
    pub const fn index(self) -> usize {
        self.0.get()
    }
}

#[derive(Clone, Debug)]
struct TreeNode<P> {
    /// Fat box for leaves, tight union of the children for internal nodes.
    aabb: Aabb,
    /// Leaves only.
    payload: Option<P>,
    /// Parent while allocated, next free slot while on the free list.
    parent_or_next: NodeIdx,
    child1: NodeIdx,
    child2: NodeIdx,
    /// 0 for leaves, -1 for free slots.
    height: i32,
    moved: bool,
}

impl<P> TreeNode<P> {
    fn free(next: NodeIdx) -> Self {
        Self {
            aabb: Aabb::from_coords(0.0, 0.0, 0.0, 0.0),
            payload: None,
            parent_or_next: next,
            child1: NodeIdx::NULL,
            child2: NodeIdx::NULL,
            height: -1,
            moved: false,
        }
    }

    fn is_leaf(&self) -> bool {
        self.child1.is_null()
    }
}

/// A dynamic AABB tree broad phase.
///
/// Each proxy is stored as a leaf holding a *fat* box: the caller's tight box grown by
/// [`TreeConfig::aabb_extension`]. Small motions that stay inside the fat box do not touch
/// the tree. Leaves are inserted with a surface-area heuristic on box perimeters, and the
/// ascent after every insertion or removal applies AVL-style rotations so that sibling
/// heights never differ by more than one.
///
/// Nodes live in a growable arena; freed slots are threaded onto a free list through the
/// same field that holds the parent link of allocated nodes. The arena doubles when the
/// free list runs out and never shrinks.
///
/// The tree is not synchronized. Mutations must be serialized against each other and
/// against queries by the caller.
#[derive(Clone)]
pub struct DynamicTree<P> {
    root: NodeIdx,
    nodes: Vec<TreeNode<P>>,
    node_count: usize,
    free_list: NodeIdx,
    config: TreeConfig,
}

impl<P> Default for DynamicTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Debug for DynamicTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicTree")
            .field("capacity", &self.nodes.len())
            .field("node_count", &self.node_count)
            .field("height", &self.height())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P> DynamicTree<P> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with an explicit configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        let mut tree = Self {
            root: NodeIdx::NULL,
            nodes: Vec::new(),
            node_count: 0,
            free_list: NodeIdx::NULL,
            config,
        };
        tree.grow_free_list(config.initial_capacity.max(1));
        tree
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Create a proxy for `aabb`. The stored box is fattened by the configured extension.
    pub fn create_proxy(&mut self, aabb: Aabb, payload: P) -> ProxyId {
        let id = self.allocate_node();
        let node = &mut self.nodes[id.get()];
        node.aabb = aabb.fattened(self.config.aabb_extension);
        node.payload = Some(payload);
        node.height = 0;
        node.moved = true;
        self.insert_leaf(id);
        ProxyId(id)
    }

    /// Remove a proxy and return its payload. The id becomes invalid.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live proxy.
    pub fn destroy_proxy(&mut self, id: ProxyId) -> P {
        let index = self.leaf_index(id);
        self.remove_leaf(index);
        let payload = self.nodes[index.get()].payload.take();
        self.free_node(index);
        payload.expect("live leaves always carry a payload")
    }

    /// Update a proxy after its shape moved.
    ///
    /// `aabb` is the new tight box and `displacement` the motion since the last update; the
    /// new fat box is extended along the displacement so steadily moving proxies are not
    /// reinserted every step. Returns `false` when the stored fat box still encloses `aabb`
    /// and is not oversized relative to the new fat box, in which case nothing changes.
    /// Otherwise the leaf is reinserted, marked as moved, and `true` is returned.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live proxy.
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) -> bool {
        let index = self.leaf_index(id);
        let extension = self.config.aabb_extension;

        let mut fat_aabb = aabb.fattened(extension);
        let d = self.config.aabb_multiplier * displacement;
        if d.x < 0.0 {
            fat_aabb.lower.x += d.x;
        } else {
            fat_aabb.upper.x += d.x;
        }
        if d.y < 0.0 {
            fat_aabb.lower.y += d.y;
        } else {
            fat_aabb.upper.y += d.y;
        }

        let tree_aabb = self.nodes[index.get()].aabb;
        if tree_aabb.contains(&aabb) {
            // The stored box may still be too large; the huge box bounds how large.
            let huge_aabb = fat_aabb.fattened(4.0 * extension);
            if huge_aabb.contains(&tree_aabb) {
                return false;
            }
        }

        trace!(proxy = index.get(), "reinserting moved proxy");
        self.remove_leaf(index);
        self.nodes[index.get()].aabb = fat_aabb;
        self.insert_leaf(index);
        self.nodes[index.get()].moved = true;
        true
    }

    /// Payload of a proxy, or `None` for ids that are not live proxies.
    pub fn user_data(&self, id: ProxyId) -> Option<&P> {
        self.nodes
            .get(id.index())
            .filter(|n| n.height == 0)
            .and_then(|n| n.payload.as_ref())
    }

    /// Mutable payload of a proxy, or `None` for ids that are not live proxies.
    pub fn user_data_mut(&mut self, id: ProxyId) -> Option<&mut P> {
        self.nodes
            .get_mut(id.index())
            .filter(|n| n.height == 0)
            .and_then(|n| n.payload.as_mut())
    }

    /// The stored (fat) box of a proxy.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live proxy.
    pub fn fat_aabb(&self, id: ProxyId) -> Aabb {
        self.nodes[self.leaf_index(id).get()].aabb
    }

    /// Whether the proxy's fat box changed since the flag was last cleared.
    pub fn was_moved(&self, id: ProxyId) -> bool {
        self.nodes[self.leaf_index(id).get()].moved
    }

    /// Clear the moved flag after the caller has processed the proxy.
    pub fn clear_moved(&mut self, id: ProxyId) {
        let index = self.leaf_index(id);
        self.nodes[index.get()].moved = false;
    }

    /// Iterate over live proxies and their payloads in arena order.
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId, &P)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            if n.height == 0 {
                n.payload.as_ref().map(|p| (ProxyId(NodeIdx::new(i)), p))
            } else {
                None
            }
        })
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        self.proxies().count()
    }

    /// Number of allocated nodes, leaves and internal nodes together.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Size of the node arena, allocated and free slots together.
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Visit every proxy whose fat box overlaps `aabb`.
    ///
    /// The traversal stops as soon as `callback` returns `false`.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(ProxyId) -> bool,
    {
        if self.root.is_null() {
            return;
        }
        let mut stack = Vec::with_capacity(STACK_CAPACITY);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index.get()];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            if node.is_leaf() {
                if !callback(ProxyId(index)) {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Cast a ray against the fat boxes of all proxies.
    ///
    /// For every candidate leaf `callback` receives a copy of `input` whose `max_fraction`
    /// is the current clip fraction, and decides how the cast proceeds:
    /// - `0` terminates the cast,
    /// - a positive value clips the ray to that fraction,
    /// - any other value (e.g. negative) leaves the ray unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ZeroLengthRay`] when `input.p1 == input.p2`.
    pub fn ray_cast<F>(&self, input: &RayCastInput, mut callback: F) -> Result<(), TreeError>
    where
        F: FnMut(&RayCastInput, ProxyId) -> f64,
    {
        let p1 = input.p1;
        let r = input.p2 - p1;
        let length = r.hypot();
        if length == 0.0 {
            return Err(TreeError::ZeroLengthRay);
        }
        let r = r / length;

        // v is perpendicular to the segment.
        let v = Vec2::new(-r.y, r.x);
        let abs_v = Vec2::new(v.x.abs(), v.y.abs());

        let mut max_fraction = input.max_fraction;
        let mut segment_aabb = Aabb::from_points(p1, input.point_at(max_fraction));

        if self.root.is_null() {
            return Ok(());
        }
        let mut stack = Vec::with_capacity(STACK_CAPACITY);
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index.get()];
            if !node.aabb.overlaps(&segment_aabb) {
                continue;
            }

            // Separating axis for the segment: |dot(v, p1 - c)| > dot(|v|, h)
            let c = node.aabb.center();
            let h = node.aabb.extents();
            let separation = v.dot(p1 - c).abs() - abs_v.dot(h);
            if separation > 0.0 {
                continue;
            }

            if node.is_leaf() {
                let sub_input = RayCastInput {
                    p1: input.p1,
                    p2: input.p2,
                    max_fraction,
                };
                let value = callback(&sub_input, ProxyId(index));
                if value == 0.0 {
                    return Ok(());
                }
                if value > 0.0 {
                    max_fraction = value;
                    segment_aabb = Aabb::from_points(p1, input.point_at(max_fraction));
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
        Ok(())
    }

    /// Height of the root, `0` for an empty tree or a single leaf.
    pub fn height(&self) -> i32 {
        if self.root.is_null() {
            0
        } else {
            self.nodes[self.root.get()].height
        }
    }

    /// Largest difference between sibling heights over all internal nodes.
    pub fn max_balance(&self) -> i32 {
        self.nodes
            .iter()
            .filter(|n| n.height > 1)
            .map(|n| (self.nodes[n.child2.get()].height - self.nodes[n.child1.get()].height).abs())
            .max()
            .unwrap_or(0)
    }

    /// Sum of all node perimeters divided by the root perimeter.
    ///
    /// A quality metric for the hierarchy; lower is better. `0` for an empty tree.
    pub fn area_ratio(&self) -> f64 {
        if self.root.is_null() {
            return 0.0;
        }
        let root_area = self.nodes[self.root.get()].aabb.perimeter();
        let total_area: f64 = self
            .nodes
            .iter()
            .filter(|n| n.height >= 0)
            .map(|n| n.aabb.perimeter())
            .sum();
        total_area / root_area
    }

    /// Rebuild the hierarchy from its leaves by greedy pairing.
    ///
    /// All internal nodes are discarded, then the two subtrees whose union has the smallest
    /// perimeter are joined repeatedly until a single root remains. This is `O(n^2)` per
    /// merge and meant for occasional offline use. The result is not rotated, so it may
    /// lean more than the incrementally maintained tree.
    pub fn rebuild_bottom_up(&mut self) {
        let mut subtrees: Vec<NodeIdx> = Vec::with_capacity(self.node_count);
        for i in 0..self.nodes.len() {
            if self.nodes[i].height < 0 {
                continue;
            }
            let index = NodeIdx::new(i);
            if self.nodes[i].is_leaf() {
                self.nodes[i].parent_or_next = NodeIdx::NULL;
                subtrees.push(index);
            } else {
                self.free_node(index);
            }
        }
        let leaf_count = subtrees.len();

        while subtrees.len() > 1 {
            let mut min_cost = f64::MAX;
            let (mut i_min, mut j_min) = (0, 1);
            for i in 0..subtrees.len() {
                let aabb_i = self.nodes[subtrees[i].get()].aabb;
                for j in (i + 1)..subtrees.len() {
                    let aabb_j = self.nodes[subtrees[j].get()].aabb;
                    let cost = Aabb::combine(&aabb_i, &aabb_j).perimeter();
                    if cost < min_cost {
                        i_min = i;
                        j_min = j;
                        min_cost = cost;
                    }
                }
            }

            let index1 = subtrees[i_min];
            let index2 = subtrees[j_min];
            let parent = self.allocate_node();
            {
                let (aabb1, height1) = self.aabb_and_height(index1);
                let (aabb2, height2) = self.aabb_and_height(index2);
                let node = &mut self.nodes[parent.get()];
                node.child1 = index1;
                node.child2 = index2;
                node.height = 1 + height1.max(height2);
                node.aabb = Aabb::combine(&aabb1, &aabb2);
                node.parent_or_next = NodeIdx::NULL;
            }
            self.nodes[index1.get()].parent_or_next = parent;
            self.nodes[index2.get()].parent_or_next = parent;

            subtrees[i_min] = parent;
            subtrees.swap_remove(j_min);
        }

        self.root = subtrees.first().copied().unwrap_or(NodeIdx::NULL);
        debug!(
            leaves = leaf_count,
            height = self.height(),
            "rebuilt dynamic tree bottom-up"
        );
        self.validate();
    }

    /// Translate every stored box by `-new_origin`, for worlds that recenter their origin.
    pub fn shift_origin(&mut self, new_origin: Point) {
        let offset = -new_origin.to_vec2();
        for node in &mut self.nodes {
            node.aabb = node.aabb.translated(offset);
        }
    }

    /// Check the structural and metric invariants of the tree.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant: parent/child links,
    /// leaf shape, heights, internal boxes being the exact union of their children, or
    /// allocated plus free slots not adding up to the arena size.
    pub fn validate(&self) {
        self.validate_structure(self.root);
        self.validate_metrics(self.root);

        let mut free_count = 0;
        let mut free_index = self.free_list;
        while !free_index.is_null() {
            assert!(
                free_index.get() < self.nodes.len(),
                "free list points outside the arena"
            );
            assert_eq!(
                self.nodes[free_index.get()].height,
                -1,
                "free list contains an allocated node"
            );
            free_index = self.nodes[free_index.get()].parent_or_next;
            free_count += 1;
        }

        assert_eq!(
            self.height(),
            self.compute_height(self.root),
            "root height does not match the computed height"
        );
        assert_eq!(
            self.node_count + free_count,
            self.nodes.len(),
            "allocated and free nodes do not cover the arena"
        );
    }

    fn leaf_index(&self, id: ProxyId) -> NodeIdx {
        let index = id.0;
        assert!(
            index.get() < self.nodes.len()
                && self.nodes[index.get()].height == 0
                && self.nodes[index.get()].payload.is_some(),
            "{id:?} does not refer to a live proxy"
        );
        index
    }

    fn aabb_and_height(&self, index: NodeIdx) -> (Aabb, i32) {
        let node = &self.nodes[index.get()];
        (node.aabb, node.height)
    }

    fn grow_free_list(&mut self, new_capacity: usize) {
        let start = self.nodes.len();
        self.nodes.reserve(new_capacity - start);
        for i in start..new_capacity {
            let next = if i + 1 < new_capacity {
                NodeIdx::new(i + 1)
            } else {
                NodeIdx::NULL
            };
            self.nodes.push(TreeNode::free(next));
        }
        self.free_list = NodeIdx::new(start);
    }

    fn allocate_node(&mut self) -> NodeIdx {
        if self.free_list.is_null() {
            debug_assert_eq!(self.node_count, self.nodes.len());
            let old_capacity = self.nodes.len();
            let new_capacity = old_capacity * 2;
            self.grow_free_list(new_capacity);
            debug!(old_capacity, new_capacity, "grew dynamic tree node arena");
        }

        let index = self.free_list;
        let node = &mut self.nodes[index.get()];
        self.free_list = node.parent_or_next;
        node.parent_or_next = NodeIdx::NULL;
        node.child1 = NodeIdx::NULL;
        node.child2 = NodeIdx::NULL;
        node.height = 0;
        node.payload = None;
        node.moved = false;
        self.node_count += 1;
        index
    }

    fn free_node(&mut self, index: NodeIdx) {
        debug_assert!(self.node_count > 0);
        let node = &mut self.nodes[index.get()];
        node.parent_or_next = self.free_list;
        node.child1 = NodeIdx::NULL;
        node.child2 = NodeIdx::NULL;
        node.height = -1;
        node.payload = None;
        self.free_list = index;
        self.node_count -= 1;
    }

    /// Cost of descending into `child` when inserting `leaf_aabb` below it.
    fn descend_cost(&self, child: NodeIdx, leaf_aabb: &Aabb, inheritance_cost: f64) -> f64 {
        let node = &self.nodes[child.get()];
        let combined = Aabb::combine(leaf_aabb, &node.aabb).perimeter();
        if node.is_leaf() {
            combined + inheritance_cost
        } else {
            (combined - node.aabb.perimeter()) + inheritance_cost
        }
    }

    fn insert_leaf(&mut self, leaf: NodeIdx) {
        if self.root.is_null() {
            self.root = leaf;
            self.nodes[leaf.get()].parent_or_next = NodeIdx::NULL;
            return;
        }

        // Find the best sibling for this leaf.
        let leaf_aabb = self.nodes[leaf.get()].aabb;
        let mut index = self.root;
        while !self.nodes[index.get()].is_leaf() {
            let node = &self.nodes[index.get()];
            let (child1, child2) = (node.child1, node.child2);

            let area = node.aabb.perimeter();
            let combined_area = Aabb::combine(&node.aabb, &leaf_aabb).perimeter();

            // Cost of creating a new parent for this node and the new leaf.
            let cost = 2.0 * combined_area;
            // Minimum cost of pushing the leaf further down the tree.
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descend_cost(child1, &leaf_aabb, inheritance_cost);
            let cost2 = self.descend_cost(child2, &leaf_aabb, inheritance_cost);

            if cost < cost1 && cost < cost2 {
                break;
            }
            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;
        let (sibling_aabb, sibling_height) = self.aabb_and_height(sibling);
        let old_parent = self.nodes[sibling.get()].parent_or_next;
        let new_parent = self.allocate_node();
        {
            let node = &mut self.nodes[new_parent.get()];
            node.parent_or_next = old_parent;
            node.aabb = Aabb::combine(&leaf_aabb, &sibling_aabb);
            node.height = sibling_height + 1;
            node.child1 = sibling;
            node.child2 = leaf;
        }
        if old_parent.is_null() {
            self.root = new_parent;
        } else {
            self.replace_child(old_parent, sibling, new_parent);
        }
        self.nodes[sibling.get()].parent_or_next = new_parent;
        self.nodes[leaf.get()].parent_or_next = new_parent;

        self.refit_ancestors(new_parent);
    }

    fn remove_leaf(&mut self, leaf: NodeIdx) {
        if leaf == self.root {
            self.root = NodeIdx::NULL;
            return;
        }

        let parent = self.nodes[leaf.get()].parent_or_next;
        let grand_parent = self.nodes[parent.get()].parent_or_next;
        let sibling = if self.nodes[parent.get()].child1 == leaf {
            self.nodes[parent.get()].child2
        } else {
            self.nodes[parent.get()].child1
        };

        if grand_parent.is_null() {
            self.root = sibling;
            self.nodes[sibling.get()].parent_or_next = NodeIdx::NULL;
            self.free_node(parent);
        } else {
            // Destroy the parent and connect the sibling to the grandparent.
            self.replace_child(grand_parent, parent, sibling);
            self.nodes[sibling.get()].parent_or_next = grand_parent;
            self.free_node(parent);
            self.refit_ancestors(grand_parent);
        }
    }

    /// Walk from `start` to the root, rebalancing and refreshing boxes and heights.
    fn refit_ancestors(&mut self, start: NodeIdx) {
        let mut index = start;
        while !index.is_null() {
            index = self.balance(index);
            self.refresh(index);
            index = self.nodes[index.get()].parent_or_next;
        }
    }

    fn replace_child(&mut self, parent: NodeIdx, old: NodeIdx, new: NodeIdx) {
        let node = &mut self.nodes[parent.get()];
        if node.child1 == old {
            node.child1 = new;
        } else {
            debug_assert_eq!(node.child2, old, "parent link is inconsistent");
            node.child2 = new;
        }
    }

    /// Recompute an internal node's box and height from its children.
    fn refresh(&mut self, index: NodeIdx) {
        let (child1, child2) = {
            let node = &self.nodes[index.get()];
            (node.child1, node.child2)
        };
        let (aabb1, height1) = self.aabb_and_height(child1);
        let (aabb2, height2) = self.aabb_and_height(child2);
        let node = &mut self.nodes[index.get()];
        node.aabb = Aabb::combine(&aabb1, &aabb2);
        node.height = 1 + height1.max(height2);
    }

    /// Rotate the taller child of `a` up if the children differ in height by more than one.
    /// Returns the index of the subtree root now occupying `a`'s place.
    fn balance(&mut self, a: NodeIdx) -> NodeIdx {
        let node = &self.nodes[a.get()];
        if node.is_leaf() || node.height < 2 {
            return a;
        }
        let (b, c) = (node.child1, node.child2);
        let balance = self.nodes[c.get()].height - self.nodes[b.get()].height;

        let raised = if balance > 1 {
            self.rotate_up(a, c, true)
        } else if balance < -1 {
            self.rotate_up(a, b, false)
        } else {
            return a;
        };

        // A rotation starting from an imbalance above two (a new leaf paired with a deep
        // sibling) can leave the demoted node leaning; settle it before refreshing.
        if self.balance(a) != a {
            self.refresh(raised);
        }
        raised
    }

    /// Make `x`, a child of `a`, the parent of `a`.
    ///
    /// `a` becomes the first child of `x`; the taller child of `x` stays on `x` as its second
    /// child, and the shorter one replaces `x` on `a` (second slot when `x` was `a`'s second
    /// child, first slot otherwise).
    fn rotate_up(&mut self, a: NodeIdx, x: NodeIdx, x_is_second: bool) -> NodeIdx {
        let (f, g) = {
            let node = &self.nodes[x.get()];
            (node.child1, node.child2)
        };
        let a_parent = self.nodes[a.get()].parent_or_next;

        self.nodes[x.get()].child1 = a;
        self.nodes[x.get()].parent_or_next = a_parent;
        self.nodes[a.get()].parent_or_next = x;

        if a_parent.is_null() {
            self.root = x;
        } else {
            self.replace_child(a_parent, a, x);
        }

        let (taller, shorter) = if self.nodes[f.get()].height > self.nodes[g.get()].height {
            (f, g)
        } else {
            (g, f)
        };
        self.nodes[x.get()].child2 = taller;
        if x_is_second {
            self.nodes[a.get()].child2 = shorter;
        } else {
            self.nodes[a.get()].child1 = shorter;
        }
        self.nodes[shorter.get()].parent_or_next = a;

        self.refresh(a);
        self.refresh(x);
        x
    }

    fn compute_height(&self, index: NodeIdx) -> i32 {
        if index.is_null() {
            return 0;
        }
        let node = &self.nodes[index.get()];
        if node.is_leaf() {
            return 0;
        }
        1 + self
            .compute_height(node.child1)
            .max(self.compute_height(node.child2))
    }

    fn validate_structure(&self, index: NodeIdx) {
        if index.is_null() {
            return;
        }
        if index == self.root {
            assert!(
                self.nodes[index.get()].parent_or_next.is_null(),
                "root has a parent"
            );
        }

        let node = &self.nodes[index.get()];
        let (child1, child2) = (node.child1, node.child2);
        if node.is_leaf() {
            assert!(child2.is_null(), "leaf has a second child");
            assert_eq!(node.height, 0, "leaf height is not zero");
            assert!(node.payload.is_some(), "leaf has no payload");
            return;
        }

        assert!(
            child1.get() < self.nodes.len() && child2.get() < self.nodes.len(),
            "child index outside the arena"
        );
        assert_eq!(
            self.nodes[child1.get()].parent_or_next,
            index,
            "first child does not point back to its parent"
        );
        assert_eq!(
            self.nodes[child2.get()].parent_or_next,
            index,
            "second child does not point back to its parent"
        );

        self.validate_structure(child1);
        self.validate_structure(child2);
    }

    fn validate_metrics(&self, index: NodeIdx) {
        if index.is_null() {
            return;
        }
        let node = &self.nodes[index.get()];
        if node.is_leaf() {
            return;
        }
        let (child1, child2) = (node.child1, node.child2);
        let (aabb1, height1) = self.aabb_and_height(child1);
        let (aabb2, height2) = self.aabb_and_height(child2);

        assert_eq!(
            node.height,
            1 + height1.max(height2),
            "internal node height is not one more than its tallest child"
        );
        assert_eq!(
            node.aabb,
            Aabb::combine(&aabb1, &aabb2),
            "internal node box is not the union of its children"
        );

        self.validate_metrics(child1);
        self.validate_metrics(child2);
    }
}
