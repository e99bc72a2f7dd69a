//! Core types for meshnote.
//!
//! This crate provides the data side of mesh annotation:
//! - [`Mesh`] with adjacency, shortest paths, region growing, outlines and plane cuts
//! - [`Annotation`], [`Attribute`] and [`Relationship`] with their registries
//! - [`PickBackend`], the seam between interaction tools and a renderer
//! - [`SelectionSession`] and [`Options`] used by the tools

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod annotation;
pub mod attribute;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod options;
pub mod pick;
pub mod registry;
pub mod relationship;
pub mod session;

pub use annotation::{Annotation, AnnotationId, AnnotationKind};
pub use attribute::{Attribute, AttributeValue, GeometricAttribute, GeometricKind};
pub use error::{MeshnoteError, Result};
pub use geometry::{Point, Rgb};
pub use mesh::{
    CombinedDistance, CuttingPlane, DistanceMetric, EdgeId, EuclideanDistance, Mesh, MetricKind,
    TriangleId, VertexId,
};
pub use options::{Options, SelectionMode, TriangleSelectionStyle};
pub use pick::{CellHit, PickBackend, ScreenRect, ScriptedPicker};
pub use registry::AnnotationRegistry;
pub use relationship::{Relationship, RelationshipLink, RelationshipStore};
pub use session::SelectionSession;

// Re-export glam types for convenience
pub use glam::{DVec2, DVec3};
