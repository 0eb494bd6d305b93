use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::builder::{DependencyGraph, DependencyNode};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find every cycle reachable in one depth-first pass, using three-color
/// marking. Each back edge to an in-progress (gray) node closes a cycle;
/// the recorded path is the stack slice from that node down to the edge
/// source. The traversal keeps going after recording a cycle, so a broken
/// suite is diagnosable in one pass rather than one cycle at a time.
pub fn find_cycles(
    graph: &DiGraph<DependencyNode, ()>,
    node_indices: &[NodeIndex],
) -> Vec<Vec<String>> {
    let mut color = vec![Color::White; graph.node_count()];
    let mut stack = Vec::new();
    let mut cycles = Vec::new();

    for &start in node_indices {
        if color[start.index()] == Color::White {
            visit(graph, start, &mut color, &mut stack, &mut cycles);
        }
    }

    cycles
}

fn visit(
    graph: &DiGraph<DependencyNode, ()>,
    node: NodeIndex,
    color: &mut [Color],
    stack: &mut Vec<NodeIndex>,
    cycles: &mut Vec<Vec<String>>,
) {
    color[node.index()] = Color::Gray;
    stack.push(node);

    for neighbor in graph.neighbors_directed(node, Direction::Outgoing) {
        match color[neighbor.index()] {
            Color::White => visit(graph, neighbor, color, stack, cycles),
            Color::Gray => {
                // Back edge — the cycle is the stack from `neighbor` down.
                if let Some(start) = stack.iter().position(|&n| n == neighbor) {
                    cycles.push(
                        stack[start..]
                            .iter()
                            .map(|&idx| graph[idx].name.clone())
                            .collect(),
                    );
                }
            }
            Color::Black => {}
        }
    }

    stack.pop();
    color[node.index()] = Color::Black;
}

/// Nodes with no dependencies (entry points of the suite).
pub fn roots(dg: &DependencyGraph) -> Vec<&DependencyNode> {
    dg.nodes().filter(|n| n.dependencies.is_empty()).collect()
}

/// Nodes no other test depends on.
pub fn leaves(dg: &DependencyGraph) -> Vec<&DependencyNode> {
    dg.nodes().filter(|n| n.dependents.is_empty()).collect()
}
