//! Topology validation and the deterministic compute order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::graph::DiGraph;
use petgraph::Direction;

use crate::error::{GraphError, GraphResult};
use crate::spec::GraphSpec;

/// Validate the spec's topology and produce the execution order.
///
/// A single-node spec trivially orders itself. A multi-node spec with no
/// edges at all is legal but has no order (and no terminal node). When
/// edges exist the graph must be acyclic, weakly connected across every
/// declared node (isolated nodes count as disconnection), and have
/// exactly one sink.
///
/// Tie-break: Kahn's algorithm with ready nodes scheduled in
/// lexicographic name order. The result is deterministic and independent
/// of declaration order; the unique sink is always last.
pub(crate) fn generate_order(spec: &GraphSpec) -> GraphResult<Vec<String>> {
    spec.validate_references()?;

    if spec.len() == 1 {
        return Ok(spec.iter().map(|(name, _)| name.to_string()).collect());
    }
    let edges = spec.edges();
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let mut graph = DiGraph::<&str, ()>::new();
    let mut indices = BTreeMap::new();
    for (name, _) in spec.iter() {
        indices.insert(name, graph.add_node(name));
    }
    for &(parent, child) in &edges {
        if let (Some(&parent), Some(&child)) = (indices.get(parent), indices.get(child)) {
            graph.add_edge(parent, child, ());
        }
    }

    if is_cyclic_directed(&graph) {
        return Err(GraphError::Cycle);
    }
    if connected_components(&graph) != 1 {
        return Err(GraphError::Disconnected);
    }
    if graph.externals(Direction::Outgoing).count() != 1 {
        return Err(GraphError::MultipleFinalComponents);
    }

    let mut indegree: BTreeMap<&str, usize> = spec.iter().map(|(name, _)| (name, 0)).collect();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &(parent, child) in &edges {
        if let Some(count) = indegree.get_mut(child) {
            *count += 1;
        }
        children.entry(parent).or_default().push(child);
    }

    let mut ready: BinaryHeap<Reverse<&str>> = indegree
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| Reverse(*name))
        .collect();
    let mut order = Vec::with_capacity(spec.len());
    while let Some(Reverse(name)) = ready.pop() {
        order.push(name.to_string());
        for &child in children.get(name).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(child) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse(child));
                }
            }
        }
    }
    // Acyclicity was checked above, so every node is scheduled.
    debug_assert_eq!(order.len(), spec.len());
    Ok(order)
}
