/// Consecutive vertex pairs of a closed loop, wrapping from the last vertex
/// back to the first. Sorted pairs are undirected keys for matching shared
/// edges; unsorted pairs keep the traversal orientation.
pub struct EdgeIter<'a> {
    nodes: &'a [usize],
    i: usize,
    sorted: bool,
}

pub fn edges(nodes: &[usize]) -> EdgeIter<'_> {
    EdgeIter { nodes, i: 0, sorted: true }
}

pub fn oriented_edges(nodes: &[usize]) -> EdgeIter<'_> {
    EdgeIter { nodes, i: 0, sorted: false }
}

impl Iterator for EdgeIter<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let n = self.nodes.len();
        if self.i >= n {
            return None;
        }
        let a = self.nodes[self.i];
        let b = self.nodes[(self.i + 1) % n];
        self.i += 1;
        Some(if self.sorted && b < a { (b, a) } else { (a, b) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.nodes.len() - self.i;
        (left, Some(left))
    }
}

impl ExactSizeIterator for EdgeIter<'_> {}
