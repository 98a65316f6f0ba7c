use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::Result;
use crate::model::{EdgeKey, PathResult};
use crate::topology::Topology;

/// Frontier entry. Ordered as a min-heap on priority, then insertion sequence,
/// so equal priorities pop first-in first-out.
#[derive(Debug)]
struct Entry {
    priority: f64,
    seq: u64,
    node: u32,
    cost: f64,
    parent: Option<u32>,
    via: u32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* over the directed multigraph with the straight-line distance to the
/// target as heuristic. Every parallel edge is relaxed on its own.
pub(crate) fn shortest_path_impl(t: &Topology, source: u32, target: u32) -> Result<PathResult> {
    t.node(source)?;
    let goal = t.node(target)?;
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    heap.push(Entry { priority: 0.0, seq, node: source, cost: 0.0, parent: None, via: 0 });
    // best known (cost, heuristic) per node
    let mut enqueued: HashMap<u32, (f64, f64)> = HashMap::new();
    // finalized (parent, parallel index) per node
    let mut explored: HashMap<u32, (Option<u32>, u32)> = HashMap::new();

    while let Some(Entry { node, cost, parent, via, .. }) = heap.pop() {
        if node == target {
            return Ok(reconstruct(t, node, parent, via, &explored));
        }
        if explored.contains_key(&node) {
            continue;
        }
        explored.insert(node, (parent, via));
        for (key, edge) in t.out_edges(node) {
            let nbr = key.v;
            if explored.contains_key(&nbr) {
                continue;
            }
            let ncost = cost + edge.length;
            let h = match enqueued.get(&nbr) {
                Some(&(qcost, _)) if qcost <= ncost => continue,
                Some(&(_, h)) => h,
                None => t.node(nbr)?.dist(goal),
            };
            enqueued.insert(nbr, (ncost, h));
            seq += 1;
            heap.push(Entry { priority: ncost + h, seq, node: nbr, cost: ncost, parent: Some(node), via: key.index });
        }
    }
    Ok(PathResult::unreachable())
}

fn reconstruct(
    t: &Topology,
    mut node: u32,
    mut parent: Option<u32>,
    mut via: u32,
    explored: &HashMap<u32, (Option<u32>, u32)>,
) -> PathResult {
    let mut edges = Vec::new();
    let mut distances = Vec::new();
    while let Some(p) = parent {
        let key = EdgeKey::new(p, node, via);
        distances.push(t.edge(key).map_or(0.0, |e| e.length));
        edges.push(key);
        node = p;
        (parent, via) = explored.get(&node).copied().unwrap_or((None, 0));
    }
    edges.reverse();
    distances.reverse();
    PathResult { edges, distances }
}
