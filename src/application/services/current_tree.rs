//! Current tree service
//!
//! Holds the most recently built tree for callers that want a single handle
//! (e.g. a renderer reacting to slider changes). Parameter changes never
//! mutate a tree: a new tree is built and swapped in, so a traversal still
//! running against the previous root finishes on a consistent tree.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ParamOverrides, TreeNode, TreeParams};

/// Caller-owned slot for the active tree with atomic replacement.
#[derive(Debug, Default)]
pub struct CurrentTree {
    slot: RwLock<Option<Arc<TreeNode>>>,
    parallel: bool,
}

impl CurrentTree {
    /// Create an empty slot; trees are built sequentially.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty slot whose rebuilds construct siblings on the rayon pool.
    pub fn with_parallel_construction() -> Self {
        Self {
            slot: RwLock::default(),
            parallel: true,
        }
    }

    /// The active tree, if any.
    pub fn current(&self) -> Option<Arc<TreeNode>> {
        // a poisoned lock still guards a valid Option<Arc>: writers only store a pointer
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in `tree` and return the previous root.
    #[instrument(level = "debug", skip_all)]
    pub fn replace(&self, tree: TreeNode) -> Option<Arc<TreeNode>> {
        self.swap(Some(Arc::new(tree)))
    }

    /// Drop the active tree and return it.
    pub fn clear(&self) -> Option<Arc<TreeNode>> {
        self.swap(None)
    }

    /// Build a tree from `params` and make it the active one.
    ///
    /// On a construction error the slot is left untouched.
    #[instrument(level = "debug", skip_all)]
    pub fn install(&self, params: &TreeParams) -> ApplicationResult<Arc<TreeNode>> {
        let tree = Arc::new(self.build(params)?);
        self.swap(Some(Arc::clone(&tree)));
        Ok(tree)
    }

    /// Rebuild the active tree with some parameters changed.
    ///
    /// All parameters not named in `overrides` are taken from the current root.
    /// Empty overrides return the active tree without rebuilding it.
    ///
    /// # Errors
    /// - `ApplicationError::NoCurrentTree` if nothing was installed yet
    /// - `ApplicationError::Domain` if the merged parameters are invalid
    #[instrument(level = "debug", skip_all)]
    pub fn update(&self, overrides: &ParamOverrides) -> ApplicationResult<Arc<TreeNode>> {
        let base = self.current().ok_or(ApplicationError::NoCurrentTree)?;
        if overrides.is_empty() {
            return Ok(base);
        }
        let params = base.params().merge(overrides);
        debug!(?overrides, "rebuilding current tree");
        self.install(&params)
    }

    fn build(&self, params: &TreeParams) -> ApplicationResult<TreeNode> {
        let tree = if self.parallel {
            TreeNode::new_parallel(params)?
        } else {
            TreeNode::new(params)?
        };
        Ok(tree)
    }

    fn swap(&self, next: Option<Arc<TreeNode>>) -> Option<Arc<TreeNode>> {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
