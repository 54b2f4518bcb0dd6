//! Breadth-first and depth-first traversal over tree-shaped nodes.
//!
//! Both traversals are iterative (queue resp. stack), visit every reachable
//! node exactly once and never mutate the tree. The visitor is an arbitrary
//! caller-supplied procedure; the first error it returns aborts the traversal
//! and is handed back to the caller unchanged.

use std::collections::VecDeque;

use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;

/// Anything that exposes its direct children as an ordered slice.
///
/// Implementations whose children container is structurally broken report
/// `DomainError::MalformedChildren` instead of pretending to be a leaf.
pub trait Branching: Sized {
    fn branches(&self) -> DomainResult<&[Self]>;
}

impl Branching for TreeNode {
    fn branches(&self) -> DomainResult<&[Self]> {
        Ok(self.children())
    }
}

/// Visitation order of a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Level order: all nodes of depth d before any node of depth d+1
    #[default]
    BreadthFirst,
    /// Pre-order: a node before its descendants, subtrees never interleave
    DepthFirst,
}

/// Visit every node reachable from `root` in level order.
///
/// Siblings are visited in their stored order. `None` visits nothing.
/// Time O(n), auxiliary space O(w) with w the widest level.
///
/// # Errors
/// - the first error returned by `visit`
/// - `DomainError::MalformedChildren` (converted into `E`) when a node's
///   children cannot be enumerated; that node itself has already been visited
#[instrument(level = "trace", skip_all)]
pub fn traverse_breadth_first<N, E, F>(root: Option<&N>, mut visit: F) -> Result<(), E>
where
    N: Branching,
    E: From<DomainError>,
    F: FnMut(&N) -> Result<(), E>,
{
    let Some(root) = root else {
        trace!("empty tree, nothing to visit");
        return Ok(());
    };

    let mut queue = VecDeque::from([root]);
    let mut visited = 0usize;
    while let Some(node) = queue.pop_front() {
        visit(node)?;
        visited += 1;
        queue.extend(node.branches()?);
    }
    trace!(visited, "breadth-first traversal complete");
    Ok(())
}

/// Visit every node reachable from `root` in pre-order.
///
/// Children are pushed in reverse so the first stored child is popped first,
/// which matches a recursive pre-order walk without its recursion depth.
/// Time O(n), auxiliary space O(h·b).
///
/// # Errors
/// Same as [`traverse_breadth_first`].
#[instrument(level = "trace", skip_all)]
pub fn traverse_depth_first<N, E, F>(root: Option<&N>, mut visit: F) -> Result<(), E>
where
    N: Branching,
    E: From<DomainError>,
    F: FnMut(&N) -> Result<(), E>,
{
    let Some(root) = root else {
        trace!("empty tree, nothing to visit");
        return Ok(());
    };

    let mut stack = vec![root];
    let mut visited = 0usize;
    while let Some(node) = stack.pop() {
        visit(node)?;
        visited += 1;
        stack.extend(node.branches()?.iter().rev());
    }
    trace!(visited, "depth-first traversal complete");
    Ok(())
}

/// Dispatch to the traversal selected by `order`.
pub fn traverse<N, E, F>(order: TraversalOrder, root: Option<&N>, visit: F) -> Result<(), E>
where
    N: Branching,
    E: From<DomainError>,
    F: FnMut(&N) -> Result<(), E>,
{
    match order {
        TraversalOrder::BreadthFirst => traverse_breadth_first(root, visit),
        TraversalOrder::DepthFirst => traverse_depth_first(root, visit),
    }
}

/// Level-order iterator over a [`TreeNode`] subtree.
pub struct BreadthFirstIter<'a> {
    queue: VecDeque<&'a TreeNode>,
}

impl<'a> BreadthFirstIter<'a> {
    pub(crate) fn new(root: &'a TreeNode) -> Self {
        Self {
            queue: VecDeque::from([root]),
        }
    }
}

impl<'a> Iterator for BreadthFirstIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}

/// Pre-order iterator over a [`TreeNode`] subtree.
pub struct DepthFirstIter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> DepthFirstIter<'a> {
    pub(crate) fn new(root: &'a TreeNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for DepthFirstIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
