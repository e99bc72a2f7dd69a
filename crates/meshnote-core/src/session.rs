//! Per-tool selection state.

use std::collections::BTreeSet;

use crate::mesh::{EdgeId, TriangleId, VertexId};

/// The elements selected by one interaction tool.
///
/// Each tool owns its session, so switching tools cannot leak selections
/// across modes. `clear` is the reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSession {
    vertices: BTreeSet<VertexId>,
    edges: BTreeSet<EdgeId>,
    triangles: BTreeSet<TriangleId>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertices(&self) -> &BTreeSet<VertexId> {
        &self.vertices
    }

    #[must_use]
    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    #[must_use]
    pub fn triangles(&self) -> &BTreeSet<TriangleId> {
        &self.triangles
    }

    /// Marks a vertex; returns `true` if it was not marked before.
    pub fn select_vertex(&mut self, v: VertexId) -> bool {
        self.vertices.insert(v)
    }

    pub fn deselect_vertex(&mut self, v: VertexId) -> bool {
        self.vertices.remove(&v)
    }

    /// Flips a vertex and returns whether it is now selected.
    pub fn toggle_vertex(&mut self, v: VertexId) -> bool {
        if self.vertices.remove(&v) {
            false
        } else {
            self.vertices.insert(v);
            true
        }
    }

    pub fn select_edge(&mut self, e: EdgeId) -> bool {
        self.edges.insert(e)
    }

    pub fn select_triangle(&mut self, t: TriangleId) -> bool {
        self.triangles.insert(t)
    }

    pub fn deselect_triangle(&mut self, t: TriangleId) -> bool {
        self.triangles.remove(&t)
    }

    /// Returns whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.triangles.is_empty()
    }

    /// Unmarks every element.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.triangles.clear();
    }
}
