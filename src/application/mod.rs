//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic for callers that keep trees around
//! between parameter changes.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::CurrentTree;
