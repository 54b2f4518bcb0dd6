//! fractree: parametric fractal trees
//!
//! A [`domain::TreeNode`] is one branch segment that eagerly owns its whole
//! subtree. Children fan out according to the angle spectrum of their parent,
//! and the tree is processed with [`domain::traverse_breadth_first`] or
//! [`domain::traverse_depth_first`] and a per-node visitor.
//!
//! Architecture (inner to outer):
//! - `domain`: construction, angle spectrum, traversal (no I/O)
//! - `application`: the replaceable "current tree" slot
//! - `config`: layered settings
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{
    angle_spectrum, traverse_breadth_first, traverse_depth_first, DomainError, TreeBuilder,
    TreeNode, TreeParams,
};
