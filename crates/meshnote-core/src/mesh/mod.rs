//! Triangle mesh with adjacency, selection queries and annotation storage.
//!
//! The topology is fixed once the mesh is built: element ids are dense indices
//! that stay valid for the lifetime of the mesh. Only display colors, the
//! annotation registry and the relationship store change afterwards.

mod geometry;
mod paths;
mod region;
mod slice;

pub use paths::{CombinedDistance, DistanceMetric, EuclideanDistance, MetricKind};
pub use slice::CuttingPlane;

use std::collections::HashMap;

use glam::DVec3;

use crate::error::{MeshnoteError, Result};
use crate::geometry::{Point, Rgb};
use crate::registry::AnnotationRegistry;
use crate::relationship::RelationshipStore;

/// Index of a vertex in a [`Mesh`].
pub type VertexId = usize;
/// Index of an edge in a [`Mesh`].
pub type EdgeId = usize;
/// Index of a triangle in a [`Mesh`].
pub type TriangleId = usize;

/// A triangulated surface mesh.
pub struct Mesh {
    // Core data
    positions: Vec<Point>,
    triangles: Vec<[VertexId; 3]>,

    // Computed data
    edges: Vec<[VertexId; 2]>,
    edge_lookup: HashMap<(VertexId, VertexId), EdgeId>,
    vertex_edges: Vec<Vec<EdgeId>>,
    vertex_triangles: Vec<Vec<TriangleId>>,
    edge_triangles: Vec<Vec<TriangleId>>,
    face_normals: Vec<DVec3>,
    vertex_normals: Vec<DVec3>,
    bounding_box: (Point, Point),

    // Display state
    base_color: Rgb,
    triangle_colors: Vec<Rgb>,

    // Semantic layer
    annotations: AnnotationRegistry,
    relationships: RelationshipStore,
}

impl Mesh {
    /// Creates a mesh from vertex positions and triangles.
    ///
    /// # Errors
    ///
    /// Returns [`MeshnoteError::VertexOutOfRange`] if a triangle references a
    /// missing vertex and [`MeshnoteError::InvalidTriangle`] if a triangle
    /// repeats a vertex.
    pub fn new(positions: Vec<Point>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let count = positions.len();
        let mut tris = Vec::with_capacity(triangles.len());
        for (i, t) in triangles.iter().enumerate() {
            let t = t.map(|v| v as usize);
            if let Some(&index) = t.iter().find(|&&v| v >= count) {
                return Err(MeshnoteError::VertexOutOfRange { index, count });
            }
            if t[0] == t[1] || t[1] == t[2] || t[0] == t[2] {
                return Err(MeshnoteError::InvalidTriangle(i));
            }
            tris.push(t);
        }

        let base_color = Rgb::GREY;
        let mut mesh = Self {
            triangle_colors: vec![base_color; tris.len()],
            positions,
            triangles: tris,
            edges: Vec::new(),
            edge_lookup: HashMap::new(),
            vertex_edges: Vec::new(),
            vertex_triangles: Vec::new(),
            edge_triangles: Vec::new(),
            face_normals: Vec::new(),
            vertex_normals: Vec::new(),
            bounding_box: (Point::ZERO, Point::ZERO),
            base_color,
            annotations: AnnotationRegistry::new(),
            relationships: RelationshipStore::new(),
        };
        mesh.recompute();
        log::debug!(
            "mesh built: {} vertices, {} edges, {} triangles",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of unique edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the vertex positions.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Returns the triangles.
    pub fn triangles(&self) -> &[[VertexId; 3]] {
        &self.triangles
    }

    /// Returns the unique edges as sorted pairs.
    pub fn edges(&self) -> &[[VertexId; 2]] {
        &self.edges
    }

    /// Returns the position of a vertex.
    pub fn vertex(&self, id: VertexId) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Returns the corners of a triangle, in winding order.
    pub fn triangle(&self, id: TriangleId) -> Option<[VertexId; 3]> {
        self.triangles.get(id).copied()
    }

    /// Returns the endpoints of an edge.
    pub fn edge(&self, id: EdgeId) -> Option<[VertexId; 2]> {
        self.edges.get(id).copied()
    }

    /// Returns whether `id` names a triangle of this mesh.
    ///
    /// Pick backends report raw cell ids, which may be negative or stale.
    pub fn is_valid_cell(&self, id: i64) -> bool {
        usize::try_from(id).is_ok_and(|id| id < self.triangles.len())
    }

    /// Returns the edge shared by two vertices, if they are adjacent.
    pub fn common_edge(&self, v1: VertexId, v2: VertexId) -> Option<EdgeId> {
        self.edge_lookup.get(&geometry::sorted(v1, v2)).copied()
    }

    /// Returns the vertex following `v` in the winding order of `triangle`.
    pub fn next_vertex(&self, triangle: TriangleId, v: VertexId) -> Option<VertexId> {
        let t = self.triangles.get(triangle)?;
        let i = t.iter().position(|&x| x == v)?;
        Some(t[(i + 1) % 3])
    }

    /// Returns the edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        self.vertex_edges.get(v).map_or(&[], Vec::as_slice)
    }

    /// Returns the triangles incident to a vertex.
    pub fn vertex_triangles(&self, v: VertexId) -> &[TriangleId] {
        self.vertex_triangles.get(v).map_or(&[], Vec::as_slice)
    }

    /// Returns the triangles incident to an edge.
    pub fn edge_triangles(&self, e: EdgeId) -> &[TriangleId] {
        self.edge_triangles.get(e).map_or(&[], Vec::as_slice)
    }

    /// Returns the vertices connected to `v` by an edge.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_edges(v).iter().map(move |&e| {
            let [a, b] = self.edges[e];
            if a == v {
                b
            } else {
                a
            }
        })
    }

    /// Returns the unit normal of a triangle.
    pub fn face_normal(&self, triangle: TriangleId) -> Option<DVec3> {
        self.face_normals.get(triangle).copied()
    }

    /// Returns the area-weighted unit normal of a vertex.
    pub fn vertex_normal(&self, v: VertexId) -> Option<DVec3> {
        self.vertex_normals.get(v).copied()
    }

    /// Returns the axis-aligned bounding box.
    pub fn bounding_box(&self) -> (Point, Point) {
        self.bounding_box
    }

    /// Returns the length of the bounding box diagonal.
    pub fn bounding_box_diagonal(&self) -> f64 {
        (self.bounding_box.1 - self.bounding_box.0).length()
    }

    /// Returns the length of the shortest edge, or 0 for an empty mesh.
    pub fn min_edge_length(&self) -> f64 {
        self.edges
            .iter()
            .map(|&[a, b]| self.positions[a].distance(self.positions[b]))
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    // === Nearest-point queries ===

    /// Returns the vertex closest to `point`.
    pub fn closest_vertex(&self, point: Point) -> Option<VertexId> {
        self.positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
            .map(|(i, _)| i)
    }

    /// Returns up to `k` vertices within `max_distance` of `point`, nearest first.
    pub fn nearest_vertices(&self, point: Point, k: usize, max_distance: f64) -> Vec<VertexId> {
        let mut candidates: Vec<(VertexId, f64)> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(point)))
            .filter(|&(_, d)| d <= max_distance)
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.into_iter().take(k).map(|(i, _)| i).collect()
    }

    /// Returns the corner of `triangle` closest to `point`.
    pub fn closest_triangle_vertex(&self, triangle: TriangleId, point: Point) -> Option<VertexId> {
        let t = self.triangles.get(triangle)?;
        t.iter().copied().min_by(|&a, &b| {
            self.positions[a]
                .distance_squared(point)
                .total_cmp(&self.positions[b].distance_squared(point))
        })
    }

    // === Display colors ===

    /// Returns the color the mesh is drawn with when nothing is highlighted.
    pub fn base_color(&self) -> Rgb {
        self.base_color
    }

    /// Sets the base color and resets every triangle to it.
    pub fn set_base_color(&mut self, color: Rgb) {
        self.base_color = color;
        self.triangle_colors.fill(color);
    }

    /// Returns the display color of a triangle.
    pub fn triangle_color(&self, triangle: TriangleId) -> Option<Rgb> {
        self.triangle_colors.get(triangle).copied()
    }

    /// Sets the display color of a triangle.
    pub fn set_triangle_color(&mut self, triangle: TriangleId, color: Rgb) {
        if let Some(c) = self.triangle_colors.get_mut(triangle) {
            *c = color;
        }
    }

    /// Restores the base color of a triangle.
    pub fn reset_triangle_color(&mut self, triangle: TriangleId) {
        let base = self.base_color;
        self.set_triangle_color(triangle, base);
    }

    // === Semantic layer ===

    /// Returns the annotations stored on this mesh.
    pub fn annotations(&self) -> &AnnotationRegistry {
        &self.annotations
    }

    /// Returns the annotations stored on this mesh for modification.
    pub fn annotations_mut(&mut self) -> &mut AnnotationRegistry {
        &mut self.annotations
    }

    /// Returns the relationships between annotations.
    pub fn relationships(&self) -> &RelationshipStore {
        &self.relationships
    }

    /// Returns the relationships between annotations for modification.
    pub fn relationships_mut(&mut self) -> &mut RelationshipStore {
        &mut self.relationships
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.positions.len())
            .field("edges", &self.edges.len())
            .field("triangles", &self.triangles.len())
            .field("annotations", &self.annotations.len())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::test_meshes::{grid, unit_square};
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_square();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.bounding_box(), (DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_rejects_bad_indices() {
        let positions = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        assert!(matches!(
            Mesh::new(positions.clone(), vec![[0, 1, 3]]),
            Err(MeshnoteError::VertexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(
            Mesh::new(positions, vec![[0, 1, 1]]),
            Err(MeshnoteError::InvalidTriangle(0))
        ));
    }

    #[test]
    fn test_adjacency() {
        let mesh = unit_square();
        let diagonal = mesh.common_edge(2, 0).unwrap();
        assert_eq!(mesh.edge(diagonal), Some([0, 2]));
        assert_eq!(mesh.edge_triangles(diagonal).len(), 2);
        assert!(mesh.common_edge(1, 3).is_none());
        assert_eq!(mesh.vertex_triangles(0), &[0, 1]);
        let mut neighbors: Vec<_> = mesh.vertex_neighbors(1).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 2]);
    }

    #[test]
    fn test_next_vertex_follows_winding() {
        let mesh = unit_square();
        assert_eq!(mesh.next_vertex(0, 0), Some(1));
        assert_eq!(mesh.next_vertex(0, 2), Some(0));
        assert_eq!(mesh.next_vertex(0, 3), None);
    }

    #[test]
    fn test_valid_cell() {
        let mesh = unit_square();
        assert!(mesh.is_valid_cell(0));
        assert!(mesh.is_valid_cell(1));
        assert!(!mesh.is_valid_cell(2));
        assert!(!mesh.is_valid_cell(-1));
    }

    #[test]
    fn test_nearest_queries() {
        let mesh = grid(2);
        assert_eq!(mesh.closest_vertex(DVec3::new(0.9, 1.2, 0.3)), Some(4));
        assert_eq!(mesh.nearest_vertices(DVec3::new(0.1, 0.0, 0.0), 2, 10.0), vec![0, 1]);
        assert!(mesh.nearest_vertices(DVec3::new(10.0, 0.0, 0.0), 1, 1.0).is_empty());
        assert_eq!(mesh.closest_triangle_vertex(0, DVec3::new(0.9, 0.1, 0.0)), Some(1));
        assert!((mesh.min_edge_length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_colors() {
        let mut mesh = unit_square();
        mesh.set_triangle_color(1, Rgb::RED);
        assert_eq!(mesh.triangle_color(1), Some(Rgb::RED));
        mesh.reset_triangle_color(1);
        assert_eq!(mesh.triangle_color(1), Some(mesh.base_color()));
        mesh.set_triangle_color(7, Rgb::RED);
        assert_eq!(mesh.triangle_color(7), None);
    }
}
