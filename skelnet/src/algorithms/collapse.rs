use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use crate::geometry::edge_iter::edges;
use crate::mesh::Mesh;

pub(crate) fn collapse_impl(mesh: &mut Mesh) -> usize {
    let candidates = polygons_to_merge(mesh);
    let clusters = clusters(mesh, &candidates);
    let mut removed = 0usize;
    for cluster in clusters.iter().filter(|c| c.len() > 1) {
        removed += cluster.len() - 1;
        merge_cluster(mesh, cluster);
    }
    debug!(
        "collapse: {} candidates in {} clusters, {} polygons absorbed",
        candidates.len(),
        clusters.len(),
        removed
    );
    removed
}

/// Polygons sharing every edge, or touching a vertex inside the shape.
fn polygons_to_merge(mesh: &Mesh) -> BTreeSet<u32> {
    mesh.polygons()
        .filter(|&(id, vs)| mesh.degree(id) == vs.len() || vs.iter().any(|&v| mesh.is_internal(v)))
        .map(|(id, _)| id)
        .collect()
}

/// Connected components of the subgraph induced by `members`, each sorted.
fn clusters(mesh: &Mesh, members: &BTreeSet<u32>) -> Vec<Vec<u32>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for &start in members {
        if !seen.insert(start) {
            continue;
        }
        let mut comp = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            for n in mesh.neighbours(p) {
                if members.contains(&n) && seen.insert(n) {
                    comp.push(n);
                    queue.push_back(n);
                }
            }
        }
        comp.sort_unstable();
        out.push(comp);
    }
    out
}

/// Folds `cluster` into its first member. External links are re-pointed at the
/// base and the base loop becomes the cluster's outer boundary.
pub(crate) fn merge_cluster(mesh: &mut Mesh, cluster: &[u32]) {
    let Some(&base) = cluster.first() else { return };
    let members: BTreeSet<u32> = cluster.iter().copied().collect();
    let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for &poly in cluster {
        let external: Vec<(u32, (usize, usize))> = match mesh.poly(poly) {
            Some(p) => p
                .links
                .iter()
                .filter(|(n, _)| !members.contains(n))
                .map(|(&n, e)| (n, e.common))
                .collect(),
            None => continue,
        };
        for (n, common) in external {
            mesh.link(base, n, common);
        }
        if let Some(vs) = mesh.polygon(poly) {
            for e in edges(vs) {
                *counts.entry(e).or_default() += 1;
            }
        }
        if poly != base {
            mesh.remove_polygon(poly);
        }
    }
    let outline = trace_outline(&counts);
    if outline.len() >= 3 {
        mesh.set_vertices(base, outline);
    }
}

/// Walks the edges that belong to exactly one member until the loop closes.
fn trace_outline(counts: &BTreeMap<(usize, usize), usize>) -> Vec<usize> {
    let mut adj: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (&(a, b), &c) in counts {
        if c == 1 {
            adj.entry(a).or_default().push(b);
            adj.entry(b).or_default().push(a);
        }
    }
    let Some(&start) = adj.keys().next() else { return Vec::new() };
    let mut outline = vec![start];
    let mut seen = BTreeSet::from([start]);
    let mut cur = start;
    while let Some(next) = take_edge(&mut adj, cur, &seen) {
        if next == start {
            break;
        }
        if seen.insert(next) {
            outline.push(next);
        }
        cur = next;
    }
    outline
}

/// Removes and returns one edge incident to `cur`, preferring unvisited ends.
fn take_edge(adj: &mut BTreeMap<usize, Vec<usize>>, cur: usize, seen: &BTreeSet<usize>) -> Option<usize> {
    let nbrs = adj.get_mut(&cur)?;
    let pos = nbrs.iter().position(|n| !seen.contains(n)).or(if nbrs.is_empty() { None } else { Some(0) })?;
    let next = nbrs.remove(pos);
    if let Some(back) = adj.get_mut(&next) {
        if let Some(i) = back.iter().position(|&n| n == cur) {
            back.remove(i);
        }
    }
    Some(next)
}
