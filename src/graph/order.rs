use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::builder::DependencyNode;

/// An eligible node in the Kahn frontier. Ordered so the heap pops the
/// highest-priority node first, then the earliest-declared — keeping the
/// order deterministic across rebuilds.
struct Ready {
    rank: u8,
    declaration_index: usize,
    idx: NodeIndex,
}

impl PartialEq for Ready {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ready {}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ready {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we pop the lowest rank.
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.declaration_index.cmp(&self.declaration_index))
    }
}

/// Kahn's topological sort with priority as the tie-break among
/// simultaneously eligible nodes, so high-value tests run earliest in a
/// failing suite.
///
/// The caller must have ruled out cycles; on a cyclic graph the returned
/// order is truncated to the acyclic prefix.
pub(crate) fn priority_order(
    graph: &DiGraph<DependencyNode, ()>,
    node_indices: &[NodeIndex],
) -> Vec<String> {
    let mut unresolved = vec![0_usize; graph.node_count()];
    let mut frontier = BinaryHeap::new();

    for &idx in node_indices {
        let incoming = graph.neighbors_directed(idx, Direction::Incoming).count();
        unresolved[idx.index()] = incoming;
        if incoming == 0 {
            frontier.push(ready(graph, idx));
        }
    }

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(next) = frontier.pop() {
        order.push(graph[next.idx].name.clone());
        for dependent in graph.neighbors_directed(next.idx, Direction::Outgoing) {
            unresolved[dependent.index()] -= 1;
            if unresolved[dependent.index()] == 0 {
                frontier.push(ready(graph, dependent));
            }
        }
    }

    order
}

fn ready(graph: &DiGraph<DependencyNode, ()>, idx: NodeIndex) -> Ready {
    let node = &graph[idx];
    Ready {
        rank: node.priority.rank(),
        declaration_index: node.declaration_index,
        idx,
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::builder::build;
    use crate::suite::{Priority, TestDefinition, TestRegistry};

    fn registry(tests: Vec<TestDefinition<()>>) -> TestRegistry<()> {
        let mut reg = TestRegistry::new("Suite");
        for t in tests {
            reg.register(t);
        }
        reg
    }

    fn test(name: &str, deps: &[&str], priority: Priority) -> TestDefinition<()> {
        TestDefinition::new(name, |_| Ok(()))
            .depends_on(deps.iter().copied())
            .priority(priority)
    }

    #[test]
    fn linear_chain_keeps_dependency_order() {
        let dg = build(&registry(vec![
            test("A", &[], Priority::Low),
            test("B", &["A"], Priority::Highest),
            test("C", &["B"], Priority::Highest),
        ]))
        .unwrap();
        // B outranks A but cannot run before its dependency.
        assert_eq!(dg.execution_order, vec!["A", "B", "C"]);
    }

    #[test]
    fn ties_break_by_priority_highest_first() {
        let dg = build(&registry(vec![
            test("LowFirst", &[], Priority::Low),
            test("MediumSecond", &[], Priority::Medium),
            test("HighThird", &[], Priority::High),
            test("HighestLast", &[], Priority::Highest),
        ]))
        .unwrap();
        assert_eq!(
            dg.execution_order,
            vec!["HighestLast", "HighThird", "MediumSecond", "LowFirst"]
        );
    }

    #[test]
    fn equal_priority_ties_break_by_declaration_order() {
        let dg = build(&registry(vec![
            test("First", &[], Priority::Medium),
            test("Second", &[], Priority::Medium),
            test("Third", &[], Priority::Medium),
        ]))
        .unwrap();
        assert_eq!(dg.execution_order, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn diamond_orders_middle_layer_by_priority() {
        let dg = build(&registry(vec![
            test("Root", &[], Priority::Medium),
            test("SlowPath", &["Root"], Priority::Low),
            test("FastPath", &["Root"], Priority::Highest),
            test("Join", &["SlowPath", "FastPath"], Priority::Medium),
        ]))
        .unwrap();
        assert_eq!(
            dg.execution_order,
            vec!["Root", "FastPath", "SlowPath", "Join"]
        );
    }

    #[test]
    fn priority_does_not_override_topology() {
        let dg = build(&registry(vec![
            test("Setup", &[], Priority::Low),
            test("Critical", &["Setup"], Priority::Highest),
            test("Independent", &[], Priority::Medium),
        ]))
        .unwrap();
        // Independent is eligible immediately; Critical only after Setup.
        assert_eq!(dg.execution_order, vec!["Independent", "Setup", "Critical"]);
    }

    #[test]
    fn order_covers_every_node_exactly_once() {
        let dg = build(&registry(vec![
            test("A", &[], Priority::Medium),
            test("B", &["A"], Priority::Medium),
            test("C", &["A"], Priority::Medium),
            test("D", &["B", "C"], Priority::Medium),
            test("E", &[], Priority::Medium),
        ]))
        .unwrap();
        assert_eq!(dg.execution_order.len(), 5);
        let mut sorted = dg.execution_order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }
}
