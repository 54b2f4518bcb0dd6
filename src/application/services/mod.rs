//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod current_tree;

pub use current_tree::CurrentTree;
