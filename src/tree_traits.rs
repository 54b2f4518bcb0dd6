//! Outline rendering of fractal trees via `termtree`.

use termtree::Tree;
use tracing::instrument;

use crate::domain::TreeNode;

/// Deepest level rendered in an outline; deeper subtrees are summarised.
pub const MAX_OUTLINE_DEPTH: usize = 64;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeNode {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        outline(self, MAX_OUTLINE_DEPTH)
    }
}

fn outline(node: &TreeNode, levels: usize) -> Tree<String> {
    // The label of every outline entry is the branch segment
    let tree = Tree::new(node.to_string());
    if node.is_leaf() {
        return tree;
    }
    if levels == 0 {
        let hidden = node.node_count() - 1;
        return tree.with_leaves([format!("... {} more nodes", hidden)]);
    }
    let leaves: Vec<_> = node
        .children()
        .iter()
        .map(|child| outline(child, levels - 1))
        .collect();
    tree.with_leaves(leaves)
}
