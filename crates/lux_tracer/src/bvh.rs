//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is built once by median-splitting primitive centroids and stored
//! as a flat array in depth-first order. Every node carries a "rope": the
//! index of the node to visit after its subtree is done or its box is
//! missed. Traversal then needs neither recursion nor an explicit stack.

use bytemuck::{Pod, Zeroable};
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};

/// Rope value that ends a traversal.
pub const ROPE_END: i32 = -1;

/// One node of the flattened tree.
///
/// `left_index` is the first child of an internal node (always the node
/// right after it in the array). `right_index` is the rope: for a left
/// child it points to its sibling, for a right child it inherits the
/// parent's rope, and for the last node on the right spine it is
/// [`ROPE_END`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub bbox: Aabb,
    pub is_leaf: u32,
    /// Valid only if `is_leaf != 0`.
    pub primitive_index: i32,
    pub left_index: i32,
    pub right_index: i32,
}

impl BvhNode {
    fn placeholder() -> Self {
        Self {
            bbox: Aabb::EMPTY,
            is_leaf: 0,
            primitive_index: -1,
            left_index: -1,
            right_index: ROPE_END,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf != 0
    }
}

/// Raw bytes of the node array, for handing to an external dispatcher.
pub fn bvh_bytes(nodes: &[BvhNode]) -> &[u8] {
    bytemuck::cast_slice(nodes)
}

struct BvhBuilder {
    boxes: Vec<Aabb>,
    centroids: Vec<Vec3>,
    order: Vec<usize>,
    nodes: Vec<BvhNode>,
    /// Right child of every internal node, kept apart because the node's
    /// own `right_index` is overwritten with the rope.
    right_children: Vec<i32>,
}

impl BvhBuilder {
    fn build_recursive(&mut self, start: usize, end: usize) -> usize {
        let current = self.nodes.len();
        self.nodes.push(BvhNode::placeholder());
        self.right_children.push(-1);

        let span = end - start;
        if span == 1 {
            let primitive = self.order[start];
            let node = &mut self.nodes[current];
            node.is_leaf = 1;
            node.primitive_index = primitive as i32;
            node.bbox = self.boxes[primitive];
            return current;
        }

        // Split on the axis of greatest centroid spread
        let centroids: Vec<Vec3> = self.order[start..end]
            .iter()
            .map(|&i| self.centroids[i])
            .collect();
        let axis = Aabb::from_point_set(&centroids).longest_axis();

        let all_centroids = &self.centroids;
        self.order[start..end].sort_unstable_by(|&a, &b| {
            all_centroids[a][axis]
                .partial_cmp(&all_centroids[b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = start + span / 2;
        let left = self.build_recursive(start, mid);
        let right = self.build_recursive(mid, end);

        let bbox = Aabb::surrounding(&self.nodes[left].bbox, &self.nodes[right].bbox);
        let node = &mut self.nodes[current];
        node.left_index = left as i32;
        node.bbox = bbox;
        self.right_children[current] = right as i32;

        current
    }

    fn assign_ropes(&mut self, node: usize, next: i32) {
        self.nodes[node].right_index = next;
        if self.nodes[node].is_leaf() {
            return;
        }
        let left = self.nodes[node].left_index as usize;
        let right = self.right_children[node];
        self.assign_ropes(left, right);
        self.assign_ropes(right as usize, next);
    }
}

/// Build the flattened BVH over `primitives`.
///
/// Leaves hold exactly one primitive and refer to it by its index in
/// `primitives`; the primitive array itself is never reordered. An empty
/// input yields an empty node array, which every query treats as a miss.
pub fn build_bvh<H: Hittable>(primitives: &[H]) -> Vec<BvhNode> {
    if primitives.is_empty() {
        return Vec::new();
    }

    let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
    let centroids = boxes.iter().map(|b| b.centroid()).collect();
    let mut builder = BvhBuilder {
        boxes,
        centroids,
        order: (0..primitives.len()).collect(),
        nodes: Vec::with_capacity(2 * primitives.len() - 1),
        right_children: Vec::with_capacity(2 * primitives.len() - 1),
    };

    let root = builder.build_recursive(0, primitives.len());
    builder.assign_ropes(root, ROPE_END);

    log::debug!(
        "Built BVH: {} nodes over {} primitives, depth {}",
        builder.nodes.len(),
        primitives.len(),
        bvh_depth(&builder.nodes)
    );

    builder.nodes
}

/// Longest root-to-leaf path, counted in nodes.
pub fn bvh_depth(nodes: &[BvhNode]) -> usize {
    fn depth_of(nodes: &[BvhNode], index: usize) -> usize {
        let node = &nodes[index];
        if node.is_leaf() {
            return 1;
        }
        let left = node.left_index as usize;
        // The right child is the left child's rope
        let right = nodes[left].right_index as usize;
        1 + depth_of(nodes, left).max(depth_of(nodes, right))
    }

    if nodes.is_empty() {
        0
    } else {
        depth_of(nodes, 0)
    }
}

/// Nearest hit of `ray` against the primitives indexed by `nodes`.
///
/// Stackless rope walk: an internal node whose box is hit descends to its
/// left child; a leaf, or any node whose box is missed, follows its rope.
/// Each closer hit shrinks the active interval so later boxes beyond it are
/// culled.
pub fn hit_bvh<H: Hittable>(
    nodes: &[BvhNode],
    primitives: &[H],
    ray: &Ray,
    ray_t: Interval,
    rng: &mut dyn RngCore,
) -> Option<HitRecord> {
    if nodes.is_empty() {
        return None;
    }

    let mut closest: Option<HitRecord> = None;
    let mut active = ray_t;
    let mut index = 0;

    while index != ROPE_END {
        let node = &nodes[index as usize];

        if node.bbox.hit(ray, active) {
            if !node.is_leaf() {
                index = node.left_index;
                continue;
            }
            let primitive = &primitives[node.primitive_index as usize];
            if let Some(rec) = primitive.hit(ray, active, rng) {
                active = active.with_max(rec.t);
                closest = Some(rec);
            }
        }

        index = node.right_index;
    }

    closest
}
