//! Region growing inside a vertex contour and outline extraction.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::{EdgeId, Mesh, TriangleId, VertexId};

impl Mesh {
    /// Collects the triangles reachable from `seed` without crossing the contour.
    ///
    /// The contour is closed implicitly: the edges joining consecutive
    /// contour vertices, plus the edge from the last back to the first, act
    /// as walls. Pairs of consecutive vertices that are not adjacent on the
    /// mesh contribute no wall. Chord edges joining two non-consecutive
    /// contour vertices are not walls and are crossed, so a contour that
    /// touches itself does not cut the region apart. Returns the triangles sorted by id, or an
    /// empty list if `seed` is not a triangle of this mesh.
    pub fn region_grow(&self, contour: &[VertexId], seed: TriangleId) -> Vec<TriangleId> {
        if seed >= self.num_triangles() {
            return Vec::new();
        }

        let walls: HashSet<EdgeId> = contour
            .iter()
            .zip(contour.iter().cycle().skip(1))
            .filter(|(a, b)| a != b)
            .filter_map(|(&a, &b)| self.common_edge(a, b))
            .collect();

        let mut visited = BTreeSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        while let Some(t) = queue.pop_front() {
            let tri = self.triangles[t];
            for i in 0..3 {
                let Some(e) = self.common_edge(tri[i], tri[(i + 1) % 3]) else {
                    continue;
                };
                if walls.contains(&e) {
                    continue;
                }
                for &next in self.edge_triangles(e) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited.into_iter().collect()
    }

    /// Returns the edges bordering exactly one triangle of the set.
    ///
    /// Edges are listed in ascending id order. Unknown triangle ids are skipped.
    pub fn boundary_edges(&self, triangles: &[TriangleId]) -> Vec<EdgeId> {
        let mut counts: HashMap<EdgeId, usize> = HashMap::new();
        let unique: BTreeSet<TriangleId> = triangles
            .iter()
            .copied()
            .filter(|&t| t < self.num_triangles())
            .collect();
        for t in unique {
            let tri = self.triangles[t];
            for i in 0..3 {
                if let Some(e) = self.common_edge(tri[i], tri[(i + 1) % 3]) {
                    *counts.entry(e).or_default() += 1;
                }
            }
        }
        let mut edges: Vec<EdgeId> = counts
            .into_iter()
            .filter_map(|(e, c)| (c == 1).then_some(e))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Chains the boundary edges of a triangle set into closed vertex loops.
    ///
    /// Each loop lists its vertices once; the closing edge from the last
    /// vertex back to the first is implied. At vertices where more than two
    /// boundary edges meet the walk continues along the lowest unused edge.
    pub fn outlines(&self, triangles: &[TriangleId]) -> Vec<Vec<VertexId>> {
        let boundary = self.boundary_edges(triangles);
        let mut incident: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
        for &e in &boundary {
            let [a, b] = self.edges[e];
            incident.entry(a).or_default().push(e);
            incident.entry(b).or_default().push(e);
        }

        let mut used: HashSet<EdgeId> = HashSet::new();
        let mut loops = Vec::new();
        for &start_edge in &boundary {
            if used.contains(&start_edge) {
                continue;
            }
            used.insert(start_edge);
            let [start, mut current] = self.edges[start_edge];
            let mut polyline = vec![start];
            while current != start {
                polyline.push(current);
                let next = incident
                    .get(&current)
                    .and_then(|edges| edges.iter().copied().find(|e| !used.contains(e)));
                let Some(e) = next else {
                    break;
                };
                used.insert(e);
                let [a, b] = self.edges[e];
                current = if a == current { b } else { a };
            }
            loops.push(polyline);
        }
        loops
    }
}
