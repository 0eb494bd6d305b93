use std::collections::HashMap;

use crate::suite::definition::{TestBody, TestDefinition};

/// The declared tests for one suite, in registration order.
///
/// A registry is an explicit, per-suite object: it is constructed by the
/// suite author, handed by reference to the graph builder, and consumed by
/// the runner. There is no process-wide registration.
pub struct TestRegistry<C> {
    suite: String,
    tests: Vec<TestDefinition<C>>,
}

impl<C> TestRegistry<C> {
    /// Create an empty registry for the named suite.
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            tests: Vec::new(),
        }
    }

    /// The suite name.
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Add a test. Name collisions are not rejected here; the graph
    /// builder reports every duplicate in one validation pass.
    pub fn register(&mut self, definition: TestDefinition<C>) -> &mut Self {
        self.tests.push(definition);
        self
    }

    /// Declared tests in registration order.
    pub fn tests(&self) -> &[TestDefinition<C>] {
        &self.tests
    }

    /// Number of declared tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether no tests have been declared.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Whether a test with the given name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name == name)
    }

    /// Split the registry into its executable bodies, keyed by test name.
    /// Metadata stays behind on the graph built beforehand.
    pub(crate) fn into_bodies(self) -> HashMap<String, TestBody<C>> {
        self.tests.into_iter().map(|t| (t.name, t.body)).collect()
    }
}
