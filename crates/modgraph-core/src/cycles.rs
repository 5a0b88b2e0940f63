//! Cycle detection over the resolved-edge graph.
//!
//! Classic depth-first search: an append-only visited set keeps any unit
//! from being explored twice across traversal roots, and the current path
//! doubles as an ordered list and an O(1)-membership recursion-stack set.
//! Meeting an on-stack neighbor slices the path from that neighbor to the
//! current frame; that slice, rotation-normalized, is one cycle. Runs in
//! time proportional to nodes + edges and is independent of any rule
//! configuration.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::graph::ModuleGraph;

/// Traversal state threaded through the search. Value-level, never shared:
/// each call to [`find_cycles`] owns a fresh instance.
struct Search<'g> {
    visited: HashSet<&'g str>,
    path: Vec<&'g str>,
    on_path: HashSet<&'g str>,
    found: BTreeSet<Vec<String>>,
}

/// Returns every distinct elementary cycle reachable through resolved
/// edges, rotation-normalized and sorted.
///
/// Self-edges are excluded: a unit referencing itself is not a reportable
/// architectural cycle. A cycle reachable from several unrelated entry
/// units is still reported once.
#[must_use]
pub fn find_cycles(graph: &ModuleGraph) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut search = Search {
        visited: HashSet::new(),
        path: Vec::new(),
        on_path: HashSet::new(),
        found: BTreeSet::new(),
    };

    // Sorted roots keep the traversal order independent of discovery order.
    for unit in graph.units() {
        if !search.visited.contains(unit) {
            visit(unit, &adjacency, &mut search);
        }
    }

    debug!("cycle search finished: {} distinct cycles", search.found.len());
    search.found.into_iter().collect()
}

fn visit<'g>(unit: &'g str, adjacency: &BTreeMap<&'g str, Vec<&'g str>>, search: &mut Search<'g>) {
    search.visited.insert(unit);
    search.path.push(unit);
    search.on_path.insert(unit);

    for &next in adjacency.get(unit).map_or(&[][..], Vec::as_slice) {
        if next == unit {
            // Self-edge: legal in the graph, never a cycle finding.
            continue;
        }
        if search.on_path.contains(next) {
            // Slice from the neighbor's frame to here and close the loop.
            if let Some(start) = search.path.iter().position(|&p| p == next) {
                let mut raw: Vec<String> =
                    search.path[start..].iter().map(|&p| p.to_owned()).collect();
                raw.push(next.to_owned());
                search.found.insert(normalize(raw));
            }
        } else if !search.visited.contains(next) {
            visit(next, adjacency, search);
        }
    }

    search.path.pop();
    search.on_path.remove(unit);
}

/// Drops the duplicated closing node and rotates the sequence to begin at
/// its lexicographically smallest element. Rotation-equivalent raw cycles
/// collapse to one; a reverse-direction traversal stays distinct unless a
/// rotation makes the sequences equal.
fn normalize(mut raw: Vec<String>) -> Vec<String> {
    raw.pop();
    let smallest = raw
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(i, _)| i);
    raw.rotate_left(smallest);
    raw
}
