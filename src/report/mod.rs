//! Reporter adapter: read-only, serializable views of a concluded suite
//! run.
//!
//! External reporters (HTML pages, chat notifications, persistence) format
//! and transmit this data entirely outside the orchestrator. The field
//! names below are the coupling surface to those consumers and must stay
//! stable.

pub mod json;
pub mod yaml;

use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;
use crate::runner::result::{ExecutionResult, TestStatus};
use crate::runner::scheduler::SuiteRunResult;
use crate::runner::stats::PriorityExecutionStats;
use crate::suite::Priority;

/// The full snapshot handed to reporters at suite end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSnapshot {
    pub suite: String,
    pub duration_ms: u64,
    pub execution_order: Vec<String>,
    pub has_cycles: bool,
    pub cycles: Vec<Vec<String>>,
    pub nodes: Vec<NodeSnapshot>,
    pub execution_results: Vec<ResultSnapshot>,
    pub priority_stats: PriorityExecutionStats,
}

/// One dependency-graph node, with its final status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub test_name: String,
    pub priority: Priority,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
    pub status: TestStatus,
}

/// One concluded test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSnapshot {
    pub test_name: String,
    pub status: TestStatus,
    /// Elapsed body time in milliseconds; zero for skipped tests.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub priority: Priority,
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSnapshot>,
}

/// Error detail for a failed test in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Build the reporter snapshot from a concluded run.
pub fn to_snapshot(run: &SuiteRunResult) -> SuiteSnapshot {
    SuiteSnapshot {
        suite: run.suite.clone(),
        duration_ms: run.total_duration.as_millis() as u64,
        execution_order: run.graph.execution_order.clone(),
        has_cycles: run.graph.has_cycles,
        cycles: run.graph.cycles.clone(),
        nodes: graph_nodes(&run.graph),
        execution_results: run.results.iter().map(result_snapshot).collect(),
        priority_stats: run.stats.clone(),
    }
}

fn graph_nodes(graph: &DependencyGraph) -> Vec<NodeSnapshot> {
    graph
        .nodes()
        .map(|node| NodeSnapshot {
            test_name: node.name.clone(),
            priority: node.priority,
            dependencies: node.dependencies.clone(),
            dependents: node.dependents.clone(),
            status: node.status,
        })
        .collect()
}

fn result_snapshot(result: &ExecutionResult) -> ResultSnapshot {
    ResultSnapshot {
        test_name: result.name.clone(),
        status: result.status,
        duration_ms: result.duration.as_millis() as u64,
        priority: result.priority,
        dependencies: result.dependencies.clone(),
        reason: result.reason.clone(),
        error: result.error.as_ref().map(|e| ErrorSnapshot {
            kind: e.kind.to_string(),
            message: e.message.clone(),
            detail: e.detail.clone(),
        }),
    }
}
