use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;
use crate::runner::result::{ExecutionResult, TestStatus};
use crate::suite::Priority;

/// Tallies for one priority tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBucket {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Per-priority tallies plus the suite-wide dependency counters consumed by
/// downstream reporters.
///
/// Always derived, never authoritative: recomputed from the result set at
/// snapshot time, and valid for a partially-run suite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityExecutionStats {
    pub highest: PriorityBucket,
    pub high: PriorityBucket,
    pub medium: PriorityBucket,
    pub low: PriorityBucket,
    /// Results skipped because an upstream dependency did not pass.
    pub total_dependency_skips: usize,
    /// Nodes declaring at least one dependency.
    pub dependency_chains: usize,
}

impl PriorityExecutionStats {
    pub fn bucket(&self, priority: Priority) -> &PriorityBucket {
        match priority {
            Priority::Highest => &self.highest,
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut PriorityBucket {
        match priority {
            Priority::Highest => &mut self.highest,
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }

    /// Results counted across all buckets.
    pub fn total(&self) -> usize {
        Priority::all().iter().map(|&p| self.bucket(p).total).sum()
    }

    pub fn total_passed(&self) -> usize {
        Priority::all().iter().map(|&p| self.bucket(p).passed).sum()
    }

    pub fn total_failed(&self) -> usize {
        Priority::all().iter().map(|&p| self.bucket(p).failed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        Priority::all().iter().map(|&p| self.bucket(p).skipped).sum()
    }
}

/// Bucket the execution results by priority and count the dependency
/// figures. Pure over its inputs; call it mid-run or at suite end.
pub fn aggregate(results: &[ExecutionResult], graph: &DependencyGraph) -> PriorityExecutionStats {
    let mut stats = PriorityExecutionStats {
        dependency_chains: graph.nodes().filter(|n| !n.dependencies.is_empty()).count(),
        ..PriorityExecutionStats::default()
    };

    for result in results {
        let bucket = stats.bucket_mut(result.priority);
        bucket.total += 1;
        match result.status {
            TestStatus::Passed => bucket.passed += 1,
            TestStatus::Failed => bucket.failed += 1,
            TestStatus::Skipped => bucket.skipped += 1,
            TestStatus::Pending | TestStatus::Running => {}
        }
        if result.is_dependency_skip() {
            stats.total_dependency_skips += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::graph::build;
    use crate::runner::result::{TestError, TestErrorKind};
    use crate::suite::{TestDefinition, TestRegistry};

    fn graph(tests: &[(&str, &[&str], Priority)]) -> DependencyGraph {
        let mut reg: TestRegistry<()> = TestRegistry::new("Suite");
        for (name, deps, priority) in tests {
            reg.register(
                TestDefinition::new(*name, |_| Ok(()))
                    .depends_on(deps.iter().copied())
                    .priority(*priority),
            );
        }
        build(&reg).unwrap()
    }

    fn passed(name: &str, priority: Priority) -> ExecutionResult {
        ExecutionResult::passed(name, Duration::from_millis(10), priority, vec![])
    }

    fn failed(name: &str, priority: Priority) -> ExecutionResult {
        ExecutionResult::failed(
            name,
            Duration::from_millis(10),
            priority,
            vec![],
            TestError::new(TestErrorKind::AssertionFailed, "boom"),
        )
    }

    #[test]
    fn one_passing_test_per_bucket() {
        let dg = graph(&[
            ("A", &[], Priority::Highest),
            ("B", &[], Priority::High),
            ("C", &[], Priority::Medium),
            ("D", &[], Priority::Low),
        ]);
        let results = vec![
            passed("A", Priority::Highest),
            passed("B", Priority::High),
            passed("C", Priority::Medium),
            passed("D", Priority::Low),
        ];
        let stats = aggregate(&results, &dg);
        for priority in Priority::all() {
            assert_eq!(stats.bucket(priority).total, 1);
            assert_eq!(stats.bucket(priority).passed, 1);
            assert_eq!(stats.bucket(priority).failed, 0);
            assert_eq!(stats.bucket(priority).skipped, 0);
        }
        assert_eq!(stats.total_dependency_skips, 0);
        assert_eq!(stats.dependency_chains, 0);
    }

    #[test]
    fn counts_dependency_skips_by_reason_prefix() {
        let dg = graph(&[
            ("A", &[], Priority::High),
            ("B", &["A"], Priority::High),
            ("C", &["B"], Priority::High),
        ]);
        let results = vec![
            failed("A", Priority::High),
            ExecutionResult::dependency_skipped("B", Priority::High, vec!["A".into()], "A"),
            ExecutionResult::dependency_skipped("C", Priority::High, vec!["B".into()], "B"),
        ];
        let stats = aggregate(&results, &dg);
        assert_eq!(stats.high.total, 3);
        assert_eq!(stats.high.failed, 1);
        assert_eq!(stats.high.skipped, 2);
        assert_eq!(stats.total_dependency_skips, 2);
    }

    #[test]
    fn manual_skip_does_not_count_as_dependency_skip() {
        let dg = graph(&[("A", &[], Priority::Low)]);
        let results = vec![ExecutionResult::skipped(
            "A",
            Priority::Low,
            vec![],
            "feature flag disabled".into(),
        )];
        let stats = aggregate(&results, &dg);
        assert_eq!(stats.low.skipped, 1);
        assert_eq!(stats.total_dependency_skips, 0);
    }

    #[test]
    fn dependency_chains_counts_nodes_with_dependencies() {
        let dg = graph(&[
            ("A", &[], Priority::Medium),
            ("B", &["A"], Priority::Medium),
            ("C", &["A", "B"], Priority::Medium),
            ("D", &[], Priority::Medium),
        ]);
        let stats = aggregate(&[], &dg);
        assert_eq!(stats.dependency_chains, 2);
    }

    #[test]
    fn tolerates_partial_run() {
        let dg = graph(&[
            ("A", &[], Priority::Highest),
            ("B", &["A"], Priority::Low),
        ]);
        // Only A has concluded so far.
        let results = vec![passed("A", Priority::Highest)];
        let stats = aggregate(&results, &dg);
        assert_eq!(stats.total(), 1);
        assert_eq!(stats.highest.passed, 1);
        assert_eq!(stats.low.total, 0);
    }

    #[test]
    fn grand_total_equals_sum_of_buckets() {
        let dg = graph(&[
            ("A", &[], Priority::Highest),
            ("B", &[], Priority::High),
            ("C", &[], Priority::Medium),
        ]);
        let results = vec![
            passed("A", Priority::Highest),
            failed("B", Priority::High),
            ExecutionResult::skipped("C", Priority::Medium, vec![], "flagged off".into()),
        ];
        let stats = aggregate(&results, &dg);
        assert_eq!(stats.total(), results.len());
        assert_eq!(
            stats.total(),
            stats.total_passed() + stats.total_failed() + stats.total_skipped()
        );
    }

    #[test]
    fn stats_serialize_with_camel_case_counters() {
        let stats = PriorityExecutionStats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalDependencySkips\""));
        assert!(json.contains("\"dependencyChains\""));
        assert!(json.contains("\"highest\""));
    }
}
