use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runner::result::TestError;

/// Severity tier of a test, used as the scheduling tie-break and as the
/// aggregation bucket for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Scheduling rank: lower runs earlier among simultaneously eligible
    /// tests.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Highest => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// All priorities, highest first.
    pub fn all() -> [Priority; 4] {
        [Self::Highest, Self::High, Self::Medium, Self::Low]
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => write!(f, "highest"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Executable logic of one test. Receives the execution context (the
/// session handle supplied by the browser runtime) and reports the outcome
/// as a closed result rather than via unwinding.
pub type TestBody<C> = Box<dyn FnMut(&mut C) -> Result<(), TestError>>;

/// A declared test: identity, dependency edges, metadata, and the body.
///
/// Definitions are created at suite-declaration time and immutable once
/// registered. Metadata lives inline on the definition; nothing is looked
/// up by name at report time.
pub struct TestDefinition<C> {
    pub name: String,
    pub dependencies: Vec<String>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub body: TestBody<C>,
}

impl<C> TestDefinition<C> {
    /// Declare a test with default metadata (medium priority, no
    /// dependencies, no tags).
    pub fn new(
        name: impl Into<String>,
        body: impl FnMut(&mut C) -> Result<(), TestError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            priority: Priority::default(),
            tags: Vec::new(),
            body: Box::new(body),
        }
    }

    /// Require the named tests to have passed before this one runs.
    pub fn depends_on(mut self, dependencies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Set the priority tier.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a free-form label.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl<C> fmt::Debug for TestDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("priority", &self.priority)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
