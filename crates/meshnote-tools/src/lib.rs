//! Interaction tools for meshnote.
//!
//! Each tool is an explicit state machine driven by [`PointerEvent`]s:
//! - [`VertexSelectionTool`]: rectangle and single-vertex picking
//! - [`LineSelectionTool`]: click-to-click shortest-path polylines
//! - [`TriangleSelectionTool`]: rectangle picking or lasso plus region growing
//! - [`AnnotationSelectionTool`]: toggling the highlight of stored annotations
//! - [`MeasureTool`]: ruler, tape, caliper and bounding measurements
//!
//! Tools read the mesh through a [`ToolContext`] and never talk to a renderer
//! except through the [`PickBackend`] it carries.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod annotation_selection;
pub mod input;
pub mod line_selection;
pub mod measure;
pub mod triangle_selection;
pub mod vertex_selection;

pub use annotation_selection::{AnnotationSelectionTool, PickOutcome};
pub use input::{EventResponse, Modifiers, MouseButton, PointerEvent};
pub use line_selection::{LineSelectionTool, LineState};
pub use measure::{MeasureState, MeasureTool, MeasureType};
pub use triangle_selection::{TriangleSelectionTool, TriangleState};
pub use vertex_selection::{VertexSelectionTool, VertexState};

use meshnote_core::{
    Annotation, AnnotationId, AnnotationKind, Mesh, Options, PickBackend, Rgb, VertexId,
};

/// What a tool may touch while handling an event.
pub struct ToolContext<'a> {
    pub mesh: &'a mut Mesh,
    pub picker: &'a dyn PickBackend,
    pub options: &'a Options,
}

impl ToolContext<'_> {
    /// Picks the triangle under the cursor and returns its corner nearest the hit.
    ///
    /// Misses and out-of-range cell ids give `None`.
    pub fn pick_triangle_vertex(&self, screen: glam::DVec2) -> Option<VertexId> {
        let hit = self.picker.pick_cell(screen)?;
        if !self.mesh.is_valid_cell(hit.cell) {
            log::debug!("ignoring pick on invalid cell {}", hit.cell);
            return None;
        }
        let triangle = usize::try_from(hit.cell).ok()?;
        self.mesh.closest_triangle_vertex(triangle, hit.position)
    }
}

/// An event-driven interaction mode.
pub trait Tool {
    /// Feeds one pointer event to the state machine.
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse;

    /// Drops any in-progress gesture and clears the selection.
    fn reset_selection(&mut self, mesh: &mut Mesh);
}

/// A tool whose selection becomes an annotation.
pub trait SelectionTool: Tool {
    /// Takes the current selection as annotation geometry and resets the tool.
    ///
    /// Returns `None`, leaving the tool as it is, when nothing is selected.
    fn take_selection(&mut self, mesh: &mut Mesh) -> Option<AnnotationKind>;

    /// Loads stored annotation geometry back as the current selection.
    ///
    /// Returns `false` if the geometry belongs to another tool.
    fn seed(&mut self, mesh: &mut Mesh, kind: &AnnotationKind) -> bool;

    /// Turns the selection into an annotation stored on the mesh.
    ///
    /// Uses `id` when given (re-finalizing an edited annotation), otherwise
    /// reserves a fresh id. An empty selection is a no-op that consumes no id.
    fn finalize_annotation(
        &mut self,
        mesh: &mut Mesh,
        tag: &str,
        color: Rgb,
        id: Option<AnnotationId>,
    ) -> Option<AnnotationId> {
        let kind = self.take_selection(mesh)?;
        let id = id.unwrap_or_else(|| mesh.annotations_mut().reserve_id());
        match mesh
            .annotations_mut()
            .add(Annotation::new(id, tag, color, kind))
        {
            Ok(()) => Some(id),
            Err(err) => {
                log::warn!("annotation not stored: {err}");
                None
            }
        }
    }
}
