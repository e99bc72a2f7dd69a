//! Attributes attached to annotations: measurements and free-text properties.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationId;
use crate::error::{MeshnoteError, Result};
use crate::geometry::Point;
use crate::mesh::{Mesh, VertexId};

/// How a geometric attribute was measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometricKind {
    /// Straight-line distance between two points.
    Euclidean,
    /// Length of a path over the surface.
    Geodesic,
    /// Extent along a direction, anchored at `origin`.
    Bounding { origin: Point, direction: DVec3 },
}

/// A numeric measurement over mesh vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricAttribute {
    #[serde(flatten)]
    kind: GeometricKind,
    measure: f64,
    point_ids: Vec<VertexId>,
    draw_value: bool,
    draw_geometry: bool,
}

impl GeometricAttribute {
    /// Creates a measurement; both draw hints start enabled.
    pub fn new(kind: GeometricKind, measure: f64, point_ids: Vec<VertexId>) -> Self {
        Self {
            kind,
            measure,
            point_ids,
            draw_value: true,
            draw_geometry: true,
        }
    }

    /// Measures the straight distance between two vertices.
    ///
    /// Returns `None` if either vertex is missing.
    pub fn euclidean(mesh: &Mesh, a: VertexId, b: VertexId) -> Option<Self> {
        let measure = mesh.vertex(a)?.distance(mesh.vertex(b)?);
        Some(Self::new(GeometricKind::Euclidean, measure, vec![a, b]))
    }

    /// Measures the summed segment lengths of a vertex path.
    ///
    /// Returns `None` if the path references a missing vertex.
    pub fn geodesic(mesh: &Mesh, path: Vec<VertexId>) -> Option<Self> {
        if path.iter().any(|&v| v >= mesh.num_vertices()) {
            return None;
        }
        let measure = mesh.path_length(&path);
        Some(Self::new(GeometricKind::Geodesic, measure, path))
    }

    #[must_use]
    pub fn kind(&self) -> &GeometricKind {
        &self.kind
    }

    #[must_use]
    pub fn measure(&self) -> f64 {
        self.measure
    }

    #[must_use]
    pub fn point_ids(&self) -> &[VertexId] {
        &self.point_ids
    }

    #[must_use]
    pub fn draw_value(&self) -> bool {
        self.draw_value
    }

    pub fn set_draw_value(&mut self, draw: bool) {
        self.draw_value = draw;
    }

    #[must_use]
    pub fn draw_geometry(&self) -> bool {
        self.draw_geometry
    }

    pub fn set_draw_geometry(&mut self, draw: bool) {
        self.draw_geometry = draw;
    }
}

/// The payload of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Semantic(String),
    Geometric(GeometricAttribute),
}

/// A keyed value attached to an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    id: u32,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<AnnotationId>,
    value: AttributeValue,
}

impl Attribute {
    /// Creates a free-text attribute.
    pub fn semantic(id: u32, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            owner: None,
            value: AttributeValue::Semantic(value.into()),
        }
    }

    /// Creates a measurement attribute.
    pub fn geometric(id: u32, key: impl Into<String>, value: GeometricAttribute) -> Self {
        Self {
            id,
            key: key.into(),
            owner: None,
            value: AttributeValue::Geometric(value),
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the annotation this attribute is attached to.
    #[must_use]
    pub fn owner(&self) -> Option<AnnotationId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: AnnotationId) {
        self.owner = Some(owner);
    }

    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Returns the text of a semantic attribute.
    #[must_use]
    pub fn semantic_value(&self) -> Option<&str> {
        match &self.value {
            AttributeValue::Semantic(text) => Some(text),
            AttributeValue::Geometric(_) => None,
        }
    }

    /// Replaces the text of a semantic attribute.
    ///
    /// Returns `false` and leaves the attribute untouched if it is geometric.
    pub fn set_semantic_value(&mut self, value: impl Into<String>) -> bool {
        match &mut self.value {
            AttributeValue::Semantic(text) => {
                *text = value.into();
                true
            }
            AttributeValue::Geometric(_) => false,
        }
    }

    #[must_use]
    pub fn as_geometric(&self) -> Option<&GeometricAttribute> {
        match &self.value {
            AttributeValue::Geometric(g) => Some(g),
            AttributeValue::Semantic(_) => None,
        }
    }

    pub fn geometric_mut(&mut self) -> Option<&mut GeometricAttribute> {
        match &mut self.value {
            AttributeValue::Geometric(g) => Some(g),
            AttributeValue::Semantic(_) => None,
        }
    }

    /// Checks that every measured point exists in `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshnoteError::InvalidAttribute`] naming the first missing vertex.
    pub fn validate(&self, mesh: &Mesh) -> Result<()> {
        let Some(geometric) = self.as_geometric() else {
            return Ok(());
        };
        match geometric.point_ids.iter().find(|&&v| v >= mesh.num_vertices()) {
            Some(&vertex) => Err(MeshnoteError::InvalidAttribute {
                id: self.id,
                key: self.key.clone(),
                vertex,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::unit_square;

    #[test]
    fn test_euclidean_and_geodesic() {
        let mesh = unit_square();
        let ruler = GeometricAttribute::euclidean(&mesh, 0, 2).unwrap();
        assert!((ruler.measure() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(ruler.point_ids(), &[0, 2]);

        let tape = GeometricAttribute::geodesic(&mesh, vec![0, 1, 2, 3]).unwrap();
        assert!((tape.measure() - 3.0).abs() < 1e-12);
        assert!(GeometricAttribute::geodesic(&mesh, vec![0, 7]).is_none());
        assert!(GeometricAttribute::euclidean(&mesh, 0, 7).is_none());
    }

    #[test]
    fn test_semantic_value_edits() {
        let mut attr = Attribute::semantic(0, "material", "stone");
        assert_eq!(attr.semantic_value(), Some("stone"));
        assert!(attr.set_semantic_value("marble"));
        assert_eq!(attr.semantic_value(), Some("marble"));
        assert!(attr.as_geometric().is_none());

        let mesh = unit_square();
        let mut measure =
            Attribute::geometric(1, "width", GeometricAttribute::euclidean(&mesh, 0, 1).unwrap());
        assert!(!measure.set_semantic_value("wide"));
        measure.geometric_mut().unwrap().set_draw_value(false);
        assert!(!measure.as_geometric().unwrap().draw_value());
        assert!(measure.validate(&mesh).is_ok());
    }

    #[test]
    fn test_bounding_serde() {
        let attr = Attribute::geometric(
            2,
            "extent",
            GeometricAttribute::new(
                GeometricKind::Bounding {
                    origin: DVec3::new(0.5, 0.5, 0.0),
                    direction: DVec3::X,
                },
                1.0,
                vec![0, 1],
            ),
        );
        let json = serde_json::to_string(&attr).unwrap();
        let back: Attribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }
}
