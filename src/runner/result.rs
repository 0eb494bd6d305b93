use std::any::Any;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::suite::Priority;

/// Reason prefix recorded on a result skipped because an upstream
/// dependency did not pass. The aggregator matches on this prefix, so it
/// must stay stable.
pub const DEPENDENCY_SKIP_REASON_PREFIX: &str = "Dependency failed: ";

/// Lifecycle status of a test within one suite run.
///
/// Statuses move strictly forward: `pending → running → {passed | failed |
/// skipped}`. `Pending` is also the terminal state of tests left behind by
/// a suite abort, which is distinct from `Skipped` (dependency unmet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    /// Whether this status is a final outcome (no further transition).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Final record for a single test in a suite run.
///
/// Invariants, enforced by the constructors: a skipped result always has a
/// non-empty `reason`; a failed result always has an `error`; never both.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub name: String,
    pub status: TestStatus,
    pub duration: Duration,
    pub priority: Priority,
    pub dependencies: Vec<String>,
    pub reason: Option<String>,
    pub error: Option<TestError>,
}

impl ExecutionResult {
    /// Create a passing result.
    pub fn passed(
        name: &str,
        duration: Duration,
        priority: Priority,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            status: TestStatus::Passed,
            duration,
            priority,
            dependencies,
            reason: None,
            error: None,
        }
    }

    /// Create a failing result.
    pub fn failed(
        name: &str,
        duration: Duration,
        priority: Priority,
        dependencies: Vec<String>,
        error: TestError,
    ) -> Self {
        Self {
            name: name.to_owned(),
            status: TestStatus::Failed,
            duration,
            priority,
            dependencies,
            reason: None,
            error: Some(error),
        }
    }

    /// Create a skipped result with zero duration.
    pub fn skipped(
        name: &str,
        priority: Priority,
        dependencies: Vec<String>,
        reason: String,
    ) -> Self {
        Self {
            name: name.to_owned(),
            status: TestStatus::Skipped,
            duration: Duration::ZERO,
            priority,
            dependencies,
            reason: Some(reason),
            error: None,
        }
    }

    /// Create the skip result for a test whose dependency did not pass.
    pub fn dependency_skipped(
        name: &str,
        priority: Priority,
        dependencies: Vec<String>,
        blocker: &str,
    ) -> Self {
        Self::skipped(
            name,
            priority,
            dependencies,
            format!("{DEPENDENCY_SKIP_REASON_PREFIX}{blocker}"),
        )
    }

    /// Whether this result was skipped because of an upstream dependency.
    pub fn is_dependency_skip(&self) -> bool {
        self.reason
            .as_deref()
            .is_some_and(|r| r.starts_with(DEPENDENCY_SKIP_REASON_PREFIX))
    }
}

/// Error detail for a failed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError {
    pub kind: TestErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl TestError {
    /// Create an error with no extra detail.
    pub fn new(kind: TestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach supporting detail (response body, stack fragment, ...).
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Convert a caught panic payload into a failure.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "test body panicked".to_owned()
        };
        Self::new(TestErrorKind::Panic, message)
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Classification of test failures, as surfaced by the underlying
/// browser-automation runtime or the scheduler's panic boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestErrorKind {
    /// An assertion against the page did not hold.
    AssertionFailed,
    /// A page action (click, fill, navigation) failed to execute.
    ActionFailed,
    /// The underlying runtime reported a per-test timeout.
    Timeout,
    /// The test body panicked.
    Panic,
    /// Any other runtime-reported failure.
    RuntimeError,
}

impl fmt::Display for TestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssertionFailed => write!(f, "assertion failed"),
            Self::ActionFailed => write!(f, "action failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Panic => write!(f, "panic"),
            Self::RuntimeError => write!(f, "runtime error"),
        }
    }
}
