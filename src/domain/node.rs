//! Fractal tree node: one branch segment that owns its whole subtree.

use std::fmt;

use glam::DVec2;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::domain::entities::TreeParams;
use crate::domain::error::DomainResult;
use crate::domain::spectrum::{checked_count, spread};
use crate::domain::traversal::{BreadthFirstIter, DepthFirstIter};

/// Levels below the root whose sibling subtrees are handed to rayon; deeper
/// subtrees are grown on the worker that owns them.
const PARALLEL_LEVELS: usize = 6;

/// Parameters inherited unchanged by every node of a tree.
#[derive(Debug, Clone, Copy)]
struct Shape {
    num_children: usize,
    length_scale: f64,
    delta_angle: f64,
    max_depth: usize,
}

impl Shape {
    fn from_params(params: &TreeParams) -> DomainResult<Self> {
        Ok(Self {
            num_children: checked_count(params.num_children)?,
            length_scale: params.length_scale,
            delta_angle: params.delta_angle,
            max_depth: params.max_depth,
        })
    }

    fn branches_at(&self, depth: usize) -> bool {
        depth < self.max_depth && self.num_children > 0
    }
}

/// A node under construction whose children are still being grown.
struct Frame {
    start: DVec2,
    end: DVec2,
    length: f64,
    angle: f64,
    depth: usize,
    pending: std::vec::IntoIter<f64>,
    children: Vec<TreeNode>,
}

impl Frame {
    fn open(start: DVec2, length: f64, angle: f64, depth: usize, shape: &Shape) -> Self {
        let pending = if shape.branches_at(depth) {
            spread(angle, shape.delta_angle, shape.num_children)
        } else {
            Vec::new()
        };
        Self {
            start,
            end: project(start, length, angle),
            length,
            angle,
            depth,
            children: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
        }
    }

    /// Frame of the next child in spectrum order, if any is left.
    fn next_child(&mut self, shape: &Shape) -> Option<Frame> {
        let angle = self.pending.next()?;
        Some(Frame::open(
            self.end,
            self.length * shape.length_scale,
            angle,
            self.depth + 1,
            shape,
        ))
    }

    fn close(self, shape: &Shape) -> TreeNode {
        TreeNode::assemble(
            self.start,
            self.end,
            self.length,
            self.angle,
            self.depth,
            shape,
            self.children.into_boxed_slice(),
        )
    }
}

/// A single branch of a fractal tree.
///
/// The complete subtree is materialized when the root is constructed and is
/// immutable afterwards. Children are owned exclusively, there are no back
/// references and no sharing between trees.
///
/// Construction, cloning, comparison and dropping all work with explicit
/// stacks, so the height of a tree is bounded by memory only.
pub struct TreeNode {
    start: DVec2,
    end: DVec2,
    length: f64,
    angle: f64,
    num_children: usize,
    length_scale: f64,
    delta_angle: f64,
    depth: usize,
    max_depth: usize,
    /// Spectrum index i <-> children index i
    children: Box<[TreeNode]>,
}

/// `start + length * (cos θ, sin θ)`
fn project(start: DVec2, length: f64, angle: f64) -> DVec2 {
    start + length * DVec2::new(angle.cos(), angle.sin())
}

impl TreeNode {
    /// Construct a root node and its entire subtree down to `max_depth`.
    ///
    /// # Errors
    /// `DomainError::InvalidArgument` if `num_children < 0`. Validation happens
    /// before any geometry is computed, no partial tree is built.
    #[instrument(level = "debug", skip(params), fields(num_children = params.num_children, max_depth = params.max_depth))]
    pub fn new(params: &TreeParams) -> DomainResult<Self> {
        let shape = Shape::from_params(params)?;
        let root = Self::grow(params.start, params.length, params.angle, params.depth, &shape);
        debug!(end = ?root.end, children = root.children.len(), "tree constructed");
        Ok(root)
    }

    /// Same tree as [`TreeNode::new`], sibling subtrees are built on the rayon pool.
    ///
    /// Siblings never read each other's state during construction, so the only
    /// synchronization needed is collecting the results in spectrum order.
    #[instrument(level = "debug", skip(params), fields(num_children = params.num_children, max_depth = params.max_depth))]
    pub fn new_parallel(params: &TreeParams) -> DomainResult<Self> {
        let shape = Shape::from_params(params)?;
        let root = Self::grow_parallel(
            params.start,
            params.length,
            params.angle,
            params.depth,
            &shape,
            PARALLEL_LEVELS,
        );
        debug!(end = ?root.end, children = root.children.len(), "tree constructed in parallel");
        Ok(root)
    }

    /// Grow a subtree depth-first, assembling each node once all of its
    /// children are complete.
    fn grow(start: DVec2, length: f64, angle: f64, depth: usize, shape: &Shape) -> Self {
        let mut open: Vec<Frame> = Vec::new();
        let mut current = Frame::open(start, length, angle, depth, shape);
        loop {
            if let Some(child) = current.next_child(shape) {
                open.push(std::mem::replace(&mut current, child));
                continue;
            }
            let node = current.close(shape);
            match open.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }

    /// Fork sibling subtrees onto the rayon pool for the first `levels`
    /// levels, then fall back to [`TreeNode::grow`].
    fn grow_parallel(
        start: DVec2,
        length: f64,
        angle: f64,
        depth: usize,
        shape: &Shape,
        levels: usize,
    ) -> Self {
        if levels == 0 || !shape.branches_at(depth) {
            return Self::grow(start, length, angle, depth, shape);
        }
        let end = project(start, length, angle);
        let child_length = length * shape.length_scale;
        let children = spread(angle, shape.delta_angle, shape.num_children)
            .into_par_iter()
            .map(|child_angle| {
                Self::grow_parallel(end, child_length, child_angle, depth + 1, shape, levels - 1)
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self::assemble(start, end, length, angle, depth, shape, children)
    }

    fn assemble(
        start: DVec2,
        end: DVec2,
        length: f64,
        angle: f64,
        depth: usize,
        shape: &Shape,
        children: Box<[TreeNode]>,
    ) -> Self {
        Self {
            start,
            end,
            length,
            angle,
            num_children: shape.num_children,
            length_scale: shape.length_scale,
            delta_angle: shape.delta_angle,
            depth,
            max_depth: shape.max_depth,
            children,
        }
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn end(&self) -> DVec2 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Direction in radians
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn num_children(&self) -> usize {
        self.num_children
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn delta_angle(&self) -> f64 {
        self.delta_angle
    }

    /// Distance in edges from the tree root
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Children in spectrum order, empty for a leaf.
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Parameters that reproduce this node and its subtree.
    pub fn params(&self) -> TreeParams {
        TreeParams {
            start: self.start,
            length: self.length,
            angle: self.angle,
            // the count was validated from an i32 at construction
            num_children: i32::try_from(self.num_children).unwrap_or(i32::MAX),
            length_scale: self.length_scale,
            delta_angle: self.delta_angle,
            depth: self.depth,
            max_depth: self.max_depth,
        }
    }

    /// Level-order iterator over this node and all descendants.
    pub fn iter_breadth_first(&self) -> BreadthFirstIter<'_> {
        BreadthFirstIter::new(self)
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn iter_depth_first(&self) -> DepthFirstIter<'_> {
        DepthFirstIter::new(self)
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        self.iter_depth_first().count()
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        self.iter_depth_first().filter(|node| node.is_leaf()).count()
    }

    /// Longest path below this node, in edges. A leaf has height 0.
    pub fn height(&self) -> usize {
        self.iter_depth_first()
            .map(|node| node.depth - self.depth)
            .max()
            .unwrap_or(0)
    }

    /// Axis-aligned bounding box `(min, max)` over all segment endpoints.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        self.iter_depth_first().fold(
            (self.start.min(self.end), self.start.max(self.end)),
            |(lo, hi), node| (lo.min(node.end), hi.max(node.end)),
        )
    }

    /// Copy of this node's own segment with other children.
    fn with_children(&self, children: Box<[TreeNode]>) -> Self {
        Self {
            start: self.start,
            end: self.end,
            length: self.length,
            angle: self.angle,
            num_children: self.num_children,
            length_scale: self.length_scale,
            delta_angle: self.delta_angle,
            depth: self.depth,
            max_depth: self.max_depth,
            children,
        }
    }

    fn same_segment(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.length == other.length
            && self.angle == other.angle
            && self.num_children == other.num_children
            && self.length_scale == other.length_scale
            && self.delta_angle == other.delta_angle
            && self.depth == other.depth
            && self.max_depth == other.max_depth
            && self.children.len() == other.children.len()
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        struct Pending<'a> {
            source: &'a TreeNode,
            children: Vec<TreeNode>,
        }

        fn pending(source: &TreeNode) -> Pending<'_> {
            Pending {
                source,
                children: Vec::with_capacity(source.children.len()),
            }
        }

        let mut open: Vec<Pending<'_>> = Vec::new();
        let mut current = pending(self);
        loop {
            let source = current.source;
            if let Some(child) = source.children.get(current.children.len()) {
                open.push(std::mem::replace(&mut current, pending(child)));
                continue;
            }
            let node = source.with_children(current.children.into_boxed_slice());
            match open.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if !a.same_segment(b) {
                return false;
            }
            pairs.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        // detach grandchildren first so every node is dropped without children
        let mut detached = std::mem::take(&mut self.children).into_vec();
        while let Some(mut node) = detached.pop() {
            detached.extend(std::mem::take(&mut node.children).into_vec());
        }
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("length", &self.length)
            .field("angle", &self.angle)
            .field("num_children", &self.num_children)
            .field("length_scale", &self.length_scale)
            .field("delta_angle", &self.delta_angle)
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .field("subtree_nodes", &self.node_count())
            .finish()
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d{} ({:.2}, {:.2}) -> ({:.2}, {:.2}) {:.2}°",
            self.depth,
            self.start.x,
            self.start.y,
            self.end.x,
            self.end.y,
            self.angle.to_degrees()
        )
    }
}
