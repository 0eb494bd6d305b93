use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::graph::{BuildError, DependencyGraph, build};
use crate::runner::context::{ContextManager, ContextMode, SessionError, SessionProvider};
use crate::runner::display;
use crate::runner::result::{ExecutionResult, TestError, TestStatus};
use crate::runner::stats::{PriorityExecutionStats, aggregate};
use crate::suite::{TestBody, TestRegistry};

/// How much progress output the runner writes to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Normal,
    Verbose,
}

/// Configuration for one suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Reuse one session across every test, or allocate per test.
    pub shared_session: bool,
    /// Keep walking the execution order past a failure. When disabled,
    /// the first failure aborts the suite and the remaining tests stay
    /// `pending`.
    pub continue_on_failure: bool,
    pub log_level: LogLevel,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            shared_session: true,
            continue_on_failure: true,
            log_level: LogLevel::Normal,
        }
    }
}

/// Drives one suite: builds the graph, walks the execution order
/// sequentially, and collects results.
///
/// A test body runs only when every one of its dependencies has passed;
/// otherwise it is skipped with a reason naming the first blocker. The
/// walk is strictly sequential — the shared session is a single mutable
/// resource, and a dependency's final status must be known before its
/// dependents are evaluated.
pub struct SuiteRunner<P: SessionProvider> {
    config: SuiteConfig,
    context: ContextManager<P>,
}

impl<P: SessionProvider> SuiteRunner<P> {
    pub fn new(config: SuiteConfig, provider: P) -> Self {
        let mode = if config.shared_session {
            ContextMode::Shared
        } else {
            ContextMode::Isolated
        };
        Self {
            config,
            context: ContextManager::new(provider, mode),
        }
    }

    /// Execute a full suite. This is the primary entry point.
    ///
    /// 1. Build and validate the dependency graph (fail fast on
    ///    configuration errors and cycles — no body runs)
    /// 2. Walk the execution order, gating each test on its dependencies
    /// 3. Release the shared session
    /// 4. Aggregate priority stats and return the run result
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for configuration problems, cyclic
    /// dependencies, or a session the runtime could not provide.
    pub fn run(mut self, registry: TestRegistry<P::Session>) -> Result<SuiteRunResult, RunError> {
        let start = Instant::now();
        let suite = registry.suite().to_owned();

        let mut graph = build(&registry).map_err(RunError::from_build)?;
        if graph.has_cycles {
            return Err(RunError::cyclic(&graph.cycles));
        }

        if self.config.log_level >= LogLevel::Normal {
            println!("{}", display::format_run_header(&suite, self.context.mode()));
        }

        let mut bodies = registry.into_bodies();
        let results = self.execute(&mut graph, &mut bodies)?;
        self.context.shutdown();

        let stats = aggregate(&results, &graph);
        let run = SuiteRunResult {
            suite,
            total_duration: start.elapsed(),
            graph,
            results,
            stats,
        };

        if self.config.log_level >= LogLevel::Normal {
            println!("{}", display::format_summary(&run));
        }

        Ok(run)
    }

    fn execute(
        &mut self,
        graph: &mut DependencyGraph,
        bodies: &mut HashMap<String, TestBody<P::Session>>,
    ) -> Result<Vec<ExecutionResult>, RunError> {
        let order = graph.execution_order.clone();
        let total = order.len();
        let mut results = Vec::with_capacity(total);

        for (position, name) in order.iter().enumerate() {
            let Some(node) = graph.node(name) else {
                continue;
            };
            let priority = node.priority;
            let dependencies = node.dependencies.clone();

            // The order is topological, so every dependency already has a
            // final status here. A non-passed one blocks this test.
            let blocker = dependencies
                .iter()
                .find(|dep| graph.node(dep).is_none_or(|n| n.status != TestStatus::Passed))
                .cloned();
            if let Some(blocker) = blocker {
                graph.set_status(name, TestStatus::Skipped);
                let result =
                    ExecutionResult::dependency_skipped(name, priority, dependencies, &blocker);
                self.log_result(&result);
                results.push(result);
                continue;
            }

            let Some(body) = bodies.get_mut(name.as_str()) else {
                continue;
            };

            if self.config.log_level >= LogLevel::Verbose {
                println!("{}", display::format_test_start(name, position + 1, total));
            }

            graph.set_status(name, TestStatus::Running);
            let started = Instant::now();
            let outcome = self
                .context
                .with_session(|session| catch_unwind(AssertUnwindSafe(|| body(session))))
                .map_err(RunError::from_session)?;
            let duration = started.elapsed();

            let result = match outcome {
                Ok(Ok(())) => {
                    graph.set_status(name, TestStatus::Passed);
                    ExecutionResult::passed(name, duration, priority, dependencies)
                }
                Ok(Err(error)) => {
                    graph.set_status(name, TestStatus::Failed);
                    ExecutionResult::failed(name, duration, priority, dependencies, error)
                }
                Err(payload) => {
                    graph.set_status(name, TestStatus::Failed);
                    ExecutionResult::failed(
                        name,
                        duration,
                        priority,
                        dependencies,
                        TestError::from_panic(payload),
                    )
                }
            };

            let failed = result.status == TestStatus::Failed;
            self.log_result(&result);
            results.push(result);

            if failed && !self.config.continue_on_failure {
                // Suite aborted: everything after this stays pending.
                break;
            }
        }

        Ok(results)
    }

    fn log_result(&self, result: &ExecutionResult) {
        if self.config.log_level >= LogLevel::Normal {
            println!("{}", display::format_test_result(result));
        }
    }
}

/// The complete outcome of one suite run: the (now status-bearing) graph,
/// every concluded result, and the derived priority stats.
#[derive(Debug)]
pub struct SuiteRunResult {
    pub suite: String,
    pub total_duration: Duration,
    pub graph: DependencyGraph,
    pub results: Vec<ExecutionResult>,
    pub stats: PriorityExecutionStats,
}

impl SuiteRunResult {
    /// Whether the run concluded with no failed test.
    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.status != TestStatus::Failed)
    }

    /// Fraction of concluded results that passed. An empty suite counts
    /// as fully passing.
    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 1.0;
        }
        let passed = self
            .results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count();
        passed as f64 / self.results.len() as f64
    }
}

/// Error from the suite orchestration layer.
#[derive(Debug, Clone)]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl RunError {
    fn from_build(error: BuildError) -> Self {
        Self {
            kind: RunErrorKind::InvalidConfiguration,
            message: format!("{} configuration problem(s)", error.issues.len()),
            detail: Some(error.to_string()),
        }
    }

    fn cyclic(cycles: &[Vec<String>]) -> Self {
        let rendered: Vec<String> = cycles.iter().map(|c| c.join(" -> ")).collect();
        Self {
            kind: RunErrorKind::CyclicDependencies,
            message: format!("{} dependency cycle(s) detected", cycles.len()),
            detail: Some(rendered.join("; ")),
        }
    }

    fn from_session(error: SessionError) -> Self {
        Self {
            kind: RunErrorKind::SessionUnavailable,
            message: error.message,
            detail: error.detail,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}

/// Classification of suite-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    /// Duplicate test names or dependencies on unregistered tests.
    InvalidConfiguration,
    /// The dependency graph contains at least one cycle.
    CyclicDependencies,
    /// The session provider could not produce a session.
    SessionUnavailable,
}

impl fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration => write!(f, "invalid configuration"),
            Self::CyclicDependencies => write!(f, "cyclic dependencies"),
            Self::SessionUnavailable => write!(f, "session unavailable"),
        }
    }
}
