//! Domain layer: fractal tree construction and traversal
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod node;
pub mod spectrum;
pub mod traversal;

pub use builder::TreeBuilder;
pub use entities::{expected_node_count, ParamOverrides, TreeParams};
pub use error::{DomainError, DomainResult};
pub use node::TreeNode;
pub use spectrum::angle_spectrum;
pub use traversal::{
    traverse, traverse_breadth_first, traverse_depth_first, BreadthFirstIter, Branching,
    DepthFirstIter, TraversalOrder,
};
