use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{analysis, order};
use crate::runner::result::TestStatus;
use crate::suite::{Priority, TestRegistry};

/// One test as seen by the graph: inline metadata, both edge directions,
/// and the mutable execution status.
///
/// `dependents` (the reverse edges) are computed once the full graph is
/// known; they are the traversal path for skip propagation.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub name: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
    pub status: TestStatus,
    /// Position in the registry, the deterministic second tie-break for
    /// scheduling.
    pub declaration_index: usize,
}

/// The dependency graph for one suite run, backed by petgraph.
///
/// Built once per run. After a successful build the structure is fixed;
/// only node statuses mutate, driven by the scheduler.
#[derive(Debug)]
pub struct DependencyGraph {
    pub suite: String,
    /// Edges point dependency → dependent.
    pub graph: DiGraph<DependencyNode, ()>,
    /// Node indices in registration order.
    pub node_indices: Vec<NodeIndex>,
    /// Topological order with priority tie-break; empty when `has_cycles`.
    pub execution_order: Vec<String>,
    pub has_cycles: bool,
    pub cycles: Vec<Vec<String>>,
    by_name: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Look up a node by test name.
    pub fn node(&self, name: &str) -> Option<&DependencyNode> {
        self.by_name.get(name).map(|&idx| &self.graph[idx])
    }

    /// Look up a node mutably by test name.
    pub fn node_mut(&mut self, name: &str) -> Option<&mut DependencyNode> {
        self.by_name.get(name).map(|&idx| &mut self.graph[idx])
    }

    /// Record a status transition. Unknown names are ignored.
    pub fn set_status(&mut self, name: &str, status: TestStatus) {
        if let Some(node) = self.node_mut(name) {
            node.status = status;
        }
    }

    /// Nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.node_indices.iter().map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Build a [`DependencyGraph`] from a suite's registry.
///
/// Name problems (duplicate tests, dependencies on unregistered tests) are
/// configuration errors: every one found is collected and returned
/// together, and nothing runs. A structurally valid but cyclic graph
/// builds `Ok` with `has_cycles` set and an empty execution order, so the
/// cycle report stays visible to the reporter snapshot; the runner refuses
/// to execute it.
///
/// # Errors
///
/// Returns a [`BuildError`] listing every duplicate name and unresolved
/// dependency in the registry.
pub fn build<C>(registry: &TestRegistry<C>) -> Result<DependencyGraph, BuildError> {
    let mut issues = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    for test in registry.tests() {
        if !seen.insert(test.name.as_str()) {
            issues.push(BuildIssue::DuplicateTest {
                name: test.name.clone(),
            });
        }
    }

    for test in registry.tests() {
        for dep in &test.dependencies {
            if !seen.contains(dep.as_str()) {
                issues.push(BuildIssue::UnknownDependency {
                    test: test.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    if !issues.is_empty() {
        return Err(BuildError { issues });
    }

    // Invert the dependency edges before constructing nodes, so each node
    // carries its dependents from the start.
    let mut dependents: HashMap<&str, Vec<String>> = HashMap::new();
    for test in registry.tests() {
        for dep in &test.dependencies {
            dependents
                .entry(dep.as_str())
                .or_default()
                .push(test.name.clone());
        }
    }

    let mut graph = DiGraph::new();
    let mut node_indices = Vec::with_capacity(registry.len());
    let mut by_name = HashMap::with_capacity(registry.len());

    for (declaration_index, test) in registry.tests().iter().enumerate() {
        let idx = graph.add_node(DependencyNode {
            name: test.name.clone(),
            priority: test.priority,
            tags: test.tags.clone(),
            dependencies: test.dependencies.clone(),
            dependents: dependents.remove(test.name.as_str()).unwrap_or_default(),
            status: TestStatus::Pending,
            declaration_index,
        });
        node_indices.push(idx);
        by_name.insert(test.name.clone(), idx);
    }

    for test in registry.tests() {
        for dep in &test.dependencies {
            graph.add_edge(by_name[dep.as_str()], by_name[test.name.as_str()], ());
        }
    }

    let cycles = analysis::find_cycles(&graph, &node_indices);
    let has_cycles = !cycles.is_empty();
    let execution_order = if has_cycles {
        Vec::new()
    } else {
        order::priority_order(&graph, &node_indices)
    };

    Ok(DependencyGraph {
        suite: registry.suite().to_owned(),
        graph,
        node_indices,
        execution_order,
        has_cycles,
        cycles,
        by_name,
    })
}

/// Configuration failure reported by the builder. Carries every problem
/// found, so a broken suite is diagnosable in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub issues: Vec<BuildIssue>,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid suite configuration:")?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildError {}

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildIssue {
    DuplicateTest { name: String },
    UnknownDependency { test: String, dependency: String },
}

impl fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTest { name } => write!(f, "duplicate test name '{name}'"),
            Self::UnknownDependency { test, dependency } => write!(
                f,
                "test '{test}' depends on unregistered test '{dependency}'"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::TestDefinition;

    fn test(name: &str, deps: &[&str]) -> TestDefinition<()> {
        TestDefinition::new(name, |_| Ok(())).depends_on(deps.iter().copied())
    }

    fn registry(tests: Vec<TestDefinition<()>>) -> TestRegistry<()> {
        let mut reg = TestRegistry::new("Suite");
        for t in tests {
            reg.register(t);
        }
        reg
    }

    #[test]
    fn builds_empty_graph() {
        let dg = build(&registry(vec![])).unwrap();
        assert_eq!(dg.node_count(), 0);
        assert_eq!(dg.edge_count(), 0);
        assert!(dg.execution_order.is_empty());
        assert!(!dg.has_cycles);
    }

    #[test]
    fn builds_single_node() {
        let dg = build(&registry(vec![test("LoginUser", &[])])).unwrap();
        assert_eq!(dg.node_count(), 1);
        assert_eq!(dg.execution_order, vec!["LoginUser"]);
        let node = dg.node("LoginUser").unwrap();
        assert_eq!(node.status, TestStatus::Pending);
        assert_eq!(node.declaration_index, 0);
    }

    #[test]
    fn builds_edges_dependency_to_dependent() {
        let dg = build(&registry(vec![
            test("A", &[]),
            test("B", &["A"]),
        ]))
        .unwrap();
        assert_eq!(dg.edge_count(), 1);
        assert_eq!(dg.execution_order, vec!["A", "B"]);
    }

    #[test]
    fn populates_dependents_by_inverting_edges() {
        let dg = build(&registry(vec![
            test("A", &[]),
            test("B", &["A"]),
            test("C", &["A"]),
        ]))
        .unwrap();
        let a = dg.node("A").unwrap();
        assert_eq!(a.dependents, vec!["B", "C"]);
        assert!(a.dependencies.is_empty());
        let b = dg.node("B").unwrap();
        assert_eq!(b.dependencies, vec!["A"]);
        assert!(b.dependents.is_empty());
    }

    #[test]
    fn unknown_dependency_is_fatal() {
        let err = build(&registry(vec![test("A", &["Ghost"])])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(
            err.issues[0],
            BuildIssue::UnknownDependency {
                test: "A".into(),
                dependency: "Ghost".into(),
            }
        );
    }

    #[test]
    fn all_configuration_problems_reported_together() {
        let err = build(&registry(vec![
            test("A", &["Ghost"]),
            test("A", &[]),
            test("B", &["Phantom"]),
        ]))
        .unwrap_err();
        assert_eq!(err.issues.len(), 3);
        let rendered = err.to_string();
        assert!(rendered.contains("duplicate test name 'A'"));
        assert!(rendered.contains("'Ghost'"));
        assert!(rendered.contains("'Phantom'"));
    }

    #[test]
    fn duplicate_name_is_fatal() {
        let err = build(&registry(vec![test("A", &[]), test("A", &[])])).unwrap_err();
        assert!(matches!(
            err.issues[0],
            BuildIssue::DuplicateTest { ref name } if name == "A"
        ));
    }

    #[test]
    fn cyclic_graph_builds_with_cycles_recorded_and_no_order() {
        let dg = build(&registry(vec![
            test("A", &["B"]),
            test("B", &["A"]),
        ]))
        .unwrap();
        assert!(dg.has_cycles);
        assert_eq!(dg.cycles.len(), 1);
        assert!(dg.execution_order.is_empty());
        let cycle = &dg.cycles[0];
        assert!(cycle.contains(&"A".to_owned()));
        assert!(cycle.contains(&"B".to_owned()));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let dg = build(&registry(vec![test("A", &["A"])])).unwrap();
        assert!(dg.has_cycles);
        assert_eq!(dg.cycles, vec![vec!["A".to_owned()]]);
    }

    #[test]
    fn execution_order_is_topological() {
        let dg = build(&registry(vec![
            test("D", &["B", "C"]),
            test("B", &["A"]),
            test("C", &["A"]),
            test("A", &[]),
        ]))
        .unwrap();
        let pos =
            |name: &str| dg.execution_order.iter().position(|n| n == name).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("A") < pos("C"));
        assert!(pos("B") < pos("D"));
        assert!(pos("C") < pos("D"));
    }

    #[test]
    fn rebuild_is_deterministic() {
        let make = || {
            registry(vec![
                test("D", &["B", "C"]),
                test("B", &["A"]),
                test("C", &["A"]),
                test("A", &[]),
            ])
        };
        let first = build(&make()).unwrap();
        let second = build(&make()).unwrap();
        assert_eq!(first.execution_order, second.execution_order);
        assert_eq!(first.cycles, second.cycles);
    }

    #[test]
    fn set_status_mutates_node() {
        let mut dg = build(&registry(vec![test("A", &[])])).unwrap();
        dg.set_status("A", TestStatus::Running);
        assert_eq!(dg.node("A").unwrap().status, TestStatus::Running);
        dg.set_status("A", TestStatus::Passed);
        assert_eq!(dg.node("A").unwrap().status, TestStatus::Passed);
    }

    #[test]
    fn set_status_unknown_name_is_ignored() {
        let mut dg = build(&registry(vec![test("A", &[])])).unwrap();
        dg.set_status("Ghost", TestStatus::Failed);
        assert_eq!(dg.node("A").unwrap().status, TestStatus::Pending);
    }

    #[test]
    fn nodes_iterates_in_registration_order() {
        let dg = build(&registry(vec![
            test("C", &[]),
            test("A", &[]),
            test("B", &[]),
        ]))
        .unwrap();
        let names: Vec<&str> = dg.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
