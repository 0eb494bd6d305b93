//! depflow — a test dependency orchestrator for browser-driven suites.
//!
//! A suite declares named tests with dependencies, priorities and tags in
//! a [`suite::TestRegistry`]. The [`graph`] module turns the registry into
//! a validated dependency graph (unresolved names and duplicates are fatal,
//! cycles are detected and reported in full) and computes a topological
//! execution order with priority as the tie-break. The
//! [`runner::SuiteRunner`] walks that order sequentially against a single
//! shared browser session (or a fresh one per test), skipping every
//! transitive dependent of a failure, and the [`report`] module exposes the
//! serializable snapshot external reporters consume.

pub mod graph;
pub mod report;
pub mod runner;
pub mod suite;

pub use graph::{BuildError, BuildIssue, DependencyGraph, DependencyNode};
pub use report::{SuiteSnapshot, to_snapshot};
pub use runner::{
    ContextMode, ExecutionResult, LogLevel, PriorityExecutionStats, RunError, RunErrorKind,
    SessionError, SessionProvider, SuiteConfig, SuiteRunResult, SuiteRunner, TestError,
    TestErrorKind, TestStatus,
};
pub use suite::{Priority, TestDefinition, TestRegistry};
