//! Shortest paths along mesh edges.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::{Mesh, VertexId};

/// Cost model for walking along a mesh edge.
pub trait DistanceMetric {
    /// Returns the non-negative cost of the edge between two adjacent vertices.
    fn edge_cost(&self, mesh: &Mesh, from: VertexId, to: VertexId) -> f64;
}

/// Plain edge length.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceMetric for EuclideanDistance {
    fn edge_cost(&self, mesh: &Mesh, from: VertexId, to: VertexId) -> f64 {
        mesh.positions[from].distance(mesh.positions[to])
    }
}

/// Edge length penalized on flat regions, so paths snap to creases.
///
/// The cost is `length * (1 + crease_weight * flatness)` where flatness is
/// `(1 + n1 . n2) / 2` over the normals of the two incident triangles. Border
/// edges count as flat.
#[derive(Debug, Clone, Copy)]
pub struct CombinedDistance {
    pub crease_weight: f64,
}

impl Default for CombinedDistance {
    fn default() -> Self {
        Self { crease_weight: 1.0 }
    }
}

impl DistanceMetric for CombinedDistance {
    fn edge_cost(&self, mesh: &Mesh, from: VertexId, to: VertexId) -> f64 {
        let length = mesh.positions[from].distance(mesh.positions[to]);
        let flatness = match mesh.common_edge(from, to).map(|e| mesh.edge_triangles(e)) {
            Some(&[t1, t2, ..]) => (1.0 + mesh.face_normals[t1].dot(mesh.face_normals[t2])) * 0.5,
            _ => 1.0,
        };
        length * (1.0 + self.crease_weight.max(0.0) * flatness)
    }
}

/// Serializable choice of distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricKind {
    /// See [`EuclideanDistance`].
    #[default]
    Euclidean,
    /// See [`CombinedDistance`].
    Combined { crease_weight: f64 },
}

impl DistanceMetric for MetricKind {
    fn edge_cost(&self, mesh: &Mesh, from: VertexId, to: VertexId) -> f64 {
        match *self {
            Self::Euclidean => EuclideanDistance.edge_cost(mesh, from, to),
            Self::Combined { crease_weight } => {
                CombinedDistance { crease_weight }.edge_cost(mesh, from, to)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    vertex: VertexId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so the max-heap pops the cheapest vertex first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl Mesh {
    /// Computes the cheapest edge path from `from` to `to`.
    ///
    /// The returned sequence includes both endpoints, consecutive entries
    /// share an edge, and a path from a vertex to itself is `[from]`. Returns
    /// `None` if either vertex is missing or `to` is unreachable.
    pub fn shortest_path(
        &self,
        from: VertexId,
        to: VertexId,
        metric: &dyn DistanceMetric,
    ) -> Option<Vec<VertexId>> {
        let n = self.num_vertices();
        if from >= n || to >= n {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<VertexId>> = vec![None; n];
        let mut heap = BinaryHeap::new();
        dist[from] = 0.0;
        heap.push(Frontier { cost: 0.0, vertex: from });

        while let Some(Frontier { cost, vertex }) = heap.pop() {
            if vertex == to {
                break;
            }
            if cost > dist[vertex] {
                continue;
            }
            for next in self.vertex_neighbors(vertex) {
                let candidate = cost + metric.edge_cost(self, vertex, next);
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(vertex);
                    heap.push(Frontier { cost: candidate, vertex: next });
                }
            }
        }

        prev[to]?;
        let mut path = vec![to];
        let mut current = to;
        while let Some(p) = prev[current] {
            path.push(p);
            current = p;
        }
        path.reverse();
        Some(path)
    }

    /// Returns the summed Euclidean length of a vertex path.
    pub fn path_length(&self, path: &[VertexId]) -> f64 {
        path.windows(2)
            .map(|w| self.positions[w[0]].distance(self.positions[w[1]]))
            .sum()
    }
}
