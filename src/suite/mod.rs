pub mod definition;
pub mod registry;

pub use definition::{Priority, TestBody, TestDefinition};
pub use registry::TestRegistry;
