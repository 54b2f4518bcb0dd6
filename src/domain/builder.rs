//! Fluent construction of fractal trees.

use glam::DVec2;

use crate::domain::entities::TreeParams;
use crate::domain::error::DomainResult;
use crate::domain::node::TreeNode;

/// Collects tree parameters step by step, starting from [`TreeParams::default`].
///
/// ```
/// use fractree::domain::TreeBuilder;
///
/// let tree = TreeBuilder::new()
///     .num_children(2)
///     .angle_degrees(0.0)
///     .delta_angle_degrees(30.0)
///     .max_depth(3)
///     .build()
///     .unwrap();
/// assert_eq!(tree.node_count(), 15);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    params: TreeParams,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: TreeParams) -> Self {
        Self { params }
    }

    pub fn start(mut self, x: f64, y: f64) -> Self {
        self.params.start = DVec2::new(x, y);
        self
    }

    pub fn length(mut self, length: f64) -> Self {
        self.params.length = length;
        self
    }

    pub fn angle(mut self, radians: f64) -> Self {
        self.params.angle = radians;
        self
    }

    pub fn angle_degrees(self, degrees: f64) -> Self {
        self.angle(degrees.to_radians())
    }

    pub fn num_children(mut self, num_children: i32) -> Self {
        self.params.num_children = num_children;
        self
    }

    pub fn length_scale(mut self, length_scale: f64) -> Self {
        self.params.length_scale = length_scale;
        self
    }

    pub fn delta_angle(mut self, radians: f64) -> Self {
        self.params.delta_angle = radians;
        self
    }

    pub fn delta_angle_degrees(self, degrees: f64) -> Self {
        self.delta_angle(degrees.to_radians())
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.params.depth = depth;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.params.max_depth = max_depth;
        self
    }

    pub fn params(&self) -> TreeParams {
        self.params
    }

    pub fn build(&self) -> DomainResult<TreeNode> {
        TreeNode::new(&self.params)
    }

    pub fn build_parallel(&self) -> DomainResult<TreeNode> {
        TreeNode::new_parallel(&self.params)
    }
}
