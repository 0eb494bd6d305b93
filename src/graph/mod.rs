pub mod analysis;
pub mod builder;
pub mod order;

pub use builder::{BuildError, BuildIssue, DependencyGraph, DependencyNode, build};
