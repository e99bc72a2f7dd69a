//! Derived data for meshes: edges, incidence lists, normals and bounds.

use glam::DVec3;

use super::{Mesh, VertexId};

impl Mesh {
    /// Recomputes all derived data from positions and triangles.
    pub(super) fn recompute(&mut self) {
        self.compute_edges();
        self.compute_incidence();
        self.compute_face_normals();
        self.compute_vertex_normals();
        self.compute_bounding_box();
    }

    /// Extracts unique edges as sorted vertex pairs, in first-seen order.
    fn compute_edges(&mut self) {
        self.edges.clear();
        self.edge_lookup.clear();

        for tri in &self.triangles {
            for i in 0..3 {
                let key = sorted(tri[i], tri[(i + 1) % 3]);
                if !self.edge_lookup.contains_key(&key) {
                    self.edge_lookup.insert(key, self.edges.len());
                    self.edges.push([key.0, key.1]);
                }
            }
        }
    }

    /// Builds vertex->edges, vertex->triangles and edge->triangles lists.
    fn compute_incidence(&mut self) {
        let n = self.positions.len();
        self.vertex_edges = vec![Vec::new(); n];
        self.vertex_triangles = vec![Vec::new(); n];
        self.edge_triangles = vec![Vec::new(); self.edges.len()];

        for (e, &[a, b]) in self.edges.iter().enumerate() {
            self.vertex_edges[a].push(e);
            self.vertex_edges[b].push(e);
        }

        for (t, tri) in self.triangles.iter().enumerate() {
            for i in 0..3 {
                self.vertex_triangles[tri[i]].push(t);
                let key = sorted(tri[i], tri[(i + 1) % 3]);
                if let Some(&e) = self.edge_lookup.get(&key) {
                    self.edge_triangles[e].push(t);
                }
            }
        }
    }

    /// Computes face normals from the cross product of the first two edges.
    fn compute_face_normals(&mut self) {
        self.face_normals = self
            .triangles
            .iter()
            .map(|&[a, b, c]| {
                let e1 = self.positions[b] - self.positions[a];
                let e2 = self.positions[c] - self.positions[a];
                e1.cross(e2).normalize_or_zero()
            })
            .collect();
    }

    /// Computes vertex normals as area-weighted average of incident face normals.
    fn compute_vertex_normals(&mut self) {
        let mut normals = vec![DVec3::ZERO; self.positions.len()];
        for (t, &[a, b, c]) in self.triangles.iter().enumerate() {
            let area = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a])
                .length()
                * 0.5;
            let weighted = self.face_normals[t] * area;
            for v in [a, b, c] {
                normals[v] += weighted;
            }
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.vertex_normals = normals;
    }

    fn compute_bounding_box(&mut self) {
        let mut iter = self.positions.iter();
        let Some(&first) = iter.next() else {
            self.bounding_box = (DVec3::ZERO, DVec3::ZERO);
            return;
        };
        self.bounding_box = iter.fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    }
}

/// Orders an edge's endpoints the way the edge lookup keys them.
pub(super) fn sorted(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
