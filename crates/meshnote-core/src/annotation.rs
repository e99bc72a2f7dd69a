//! Annotations: tagged, colored selections of mesh elements.

use std::collections::BTreeSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::error::{MeshnoteError, Result};
use crate::geometry::Rgb;
use crate::mesh::{Mesh, TriangleId, VertexId};

/// Identifier of an annotation, unique within a mesh session.
///
/// Displayed and persisted as its decimal string ("0", "1", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AnnotationId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AnnotationId {
    type Error = ParseIntError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// The stored geometry of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// A set of individual vertices.
    Point { vertices: Vec<VertexId> },
    /// One or more open or closed vertex polylines.
    Line { polylines: Vec<Vec<VertexId>> },
    /// A set of triangles plus the outline loops of the region.
    Surface {
        triangles: Vec<TriangleId>,
        outlines: Vec<Vec<VertexId>>,
    },
}

impl AnnotationKind {
    /// Returns the lower-case name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Line { .. } => "line",
            Self::Surface { .. } => "surface",
        }
    }

    /// Returns whether the kind selects no element at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point { vertices } => vertices.is_empty(),
            Self::Line { polylines } => polylines.iter().all(Vec::is_empty),
            Self::Surface { triangles, .. } => triangles.is_empty(),
        }
    }
}

/// A finalized annotation stored on a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    tag: String,
    color: Rgb,
    #[serde(flatten)]
    kind: AnnotationKind,
    #[serde(default)]
    attributes: Vec<Attribute>,
    /// Display highlight, not persisted.
    #[serde(skip)]
    selected: bool,
}

impl Annotation {
    /// Creates an annotation with no attributes.
    pub fn new(id: AnnotationId, tag: impl Into<String>, color: Rgb, kind: AnnotationKind) -> Self {
        Self {
            id,
            tag: tag.into(),
            color,
            kind,
            attributes: Vec::new(),
            selected: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    #[must_use]
    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    /// Returns whether the annotation is highlighted.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Returns whether vertex `v` belongs to this annotation.
    ///
    /// For surfaces a vertex belongs if it is a corner of a selected triangle.
    #[must_use]
    pub fn contains_vertex(&self, mesh: &Mesh, v: VertexId) -> bool {
        match &self.kind {
            AnnotationKind::Point { vertices } => vertices.contains(&v),
            AnnotationKind::Line { polylines } => polylines.iter().any(|p| p.contains(&v)),
            AnnotationKind::Surface { triangles, .. } => mesh
                .vertex_triangles(v)
                .iter()
                .any(|t| triangles.contains(t)),
        }
    }

    /// Returns every vertex the annotation covers, derived from its geometry.
    #[must_use]
    pub fn involved_vertices(&self, mesh: &Mesh) -> BTreeSet<VertexId> {
        match &self.kind {
            AnnotationKind::Point { vertices } => vertices.iter().copied().collect(),
            AnnotationKind::Line { polylines } => polylines.iter().flatten().copied().collect(),
            AnnotationKind::Surface { triangles, .. } => triangles
                .iter()
                .filter_map(|&t| mesh.triangle(t))
                .flatten()
                .collect(),
        }
    }

    /// Checks that every referenced element exists in `mesh`.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range vertex or triangle, or the first
    /// attribute that references a missing vertex.
    pub fn validate(&self, mesh: &Mesh) -> Result<()> {
        let check_vertex = |index: VertexId| {
            if index < mesh.num_vertices() {
                Ok(())
            } else {
                Err(MeshnoteError::VertexOutOfRange {
                    index,
                    count: mesh.num_vertices(),
                })
            }
        };
        match &self.kind {
            AnnotationKind::Point { vertices } => {
                vertices.iter().try_for_each(|&v| check_vertex(v))?;
            }
            AnnotationKind::Line { polylines } => {
                polylines.iter().flatten().try_for_each(|&v| check_vertex(v))?;
            }
            AnnotationKind::Surface {
                triangles,
                outlines,
            } => {
                if let Some(&index) = triangles.iter().find(|&&t| t >= mesh.num_triangles()) {
                    return Err(MeshnoteError::TriangleOutOfRange {
                        index,
                        count: mesh.num_triangles(),
                    });
                }
                outlines.iter().flatten().try_for_each(|&v| check_vertex(v))?;
            }
        }
        self.attributes.iter().try_for_each(|a| a.validate(mesh))
    }

    // === Attributes ===

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by id.
    #[must_use]
    pub fn attribute(&self, id: u32) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id() == id)
    }

    /// Looks up an attribute by id for modification.
    pub fn attribute_mut(&mut self, id: u32) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.id() == id)
    }

    /// Returns the id the next attached attribute should take.
    ///
    /// One past the highest existing id; ids below it stay retired after removals.
    #[must_use]
    pub fn next_attribute_id(&self) -> u32 {
        self.attributes.iter().map(|a| a.id() + 1).max().unwrap_or(0)
    }

    /// Appends an attribute and records this annotation as its owner.
    pub fn add_attribute(&mut self, mut attribute: Attribute) {
        attribute.set_owner(self.id);
        self.attributes.push(attribute);
    }

    /// Removes the attribute with the given id, keeping the others in order.
    pub fn remove_attribute(&mut self, id: u32) -> Option<Attribute> {
        let index = self.attributes.iter().position(|a| a.id() == id)?;
        Some(self.attributes.remove(index))
    }
}
