//! meshnote: interactive annotation of triangulated surface meshes.
//!
//! A UI shell loads a [`Mesh`], wraps it in an [`Annotator`] together with a
//! [`PickBackend`], and forwards pointer events. The active tool turns the
//! events into a selection, and the selection is finalized into an
//! [`Annotation`] carrying a tag, a color, measurements and free-text
//! attributes. Annotations can be related to each other.
//!
//! # Quick Start
//!
//! ```no_run
//! use meshnote::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mesh = Mesh::new(
//!         vec![
//!             DVec3::new(0.0, 0.0, 0.0),
//!             DVec3::new(1.0, 0.0, 0.0),
//!             DVec3::new(1.0, 1.0, 0.0),
//!             DVec3::new(0.0, 1.0, 0.0),
//!         ],
//!         vec![[0, 1, 2], [0, 2, 3]],
//!     )?;
//!     let picker = ScriptedPicker::new().with_hit(DVec2::new(7.0, 3.0), 0, DVec3::new(0.7, 0.3, 0.0));
//!
//!     let mut annotator = Annotator::new(mesh, picker, Options::default());
//!     annotator.set_mode(InteractionMode::TriangleSelection)?;
//!     annotator.handle_event(&PointerEvent::press(MouseButton::Right, 7.0, 3.0));
//!     let id = annotator.finalize_annotation("floor", Rgb::new(255, 0, 0));
//!     assert!(id.is_some());
//!
//!     annotator.save_annotations("floor.json");
//!     Ok(())
//! }
//! ```
//!
//! # Modes
//!
//! - [`InteractionMode::VertexSelection`] - point annotations
//! - [`InteractionMode::LineSelection`] - polyline annotations
//! - [`InteractionMode::TriangleSelection`] - surface annotations
//! - [`InteractionMode::AnnotationSelection`] - highlighting stored annotations
//! - [`InteractionMode::Measure`] - measurements on the highlighted annotation

pub mod accessibility;
mod annotator;
mod init;
pub mod persistence;

pub use annotator::{Annotator, InteractionMode};
pub use init::init_logging;

// Re-export core types
pub use meshnote_core::{
    error::{MeshnoteError, Result},
    Annotation, AnnotationId, AnnotationKind, AnnotationRegistry, Attribute, AttributeValue,
    CellHit, CombinedDistance, CuttingPlane, DVec2, DVec3, DistanceMetric, EdgeId,
    EuclideanDistance, GeometricAttribute, GeometricKind, Mesh, MetricKind, Options, PickBackend,
    Point, Relationship, RelationshipLink, RelationshipStore, Rgb, ScreenRect, ScriptedPicker,
    SelectionMode, SelectionSession, TriangleId, TriangleSelectionStyle, VertexId,
};

// Re-export the tools
pub use meshnote_tools::{
    AnnotationSelectionTool, EventResponse, LineSelectionTool, LineState, MeasureState,
    MeasureTool, MeasureType, Modifiers, MouseButton, PickOutcome, PointerEvent, SelectionTool,
    Tool, ToolContext, TriangleSelectionTool, TriangleState, VertexSelectionTool, VertexState,
};
