//! Picking stored annotations to highlight them.

use meshnote_core::{AnnotationId, Mesh};

use crate::input::{EventResponse, MouseButton, PointerEvent};
use crate::{Tool, ToolContext};

/// Result of the last annotation pick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PickOutcome {
    #[default]
    Missed,
    /// The annotation's highlight was flipped to the given value.
    Toggled(AnnotationId, bool),
    /// Several annotations contain the picked vertex; see [`AnnotationSelectionTool::choose`].
    Ambiguous(Vec<AnnotationId>),
}

/// Toggles the highlight of annotations under the cursor.
#[derive(Debug, Default)]
pub struct AnnotationSelectionTool {
    pending: Vec<AnnotationId>,
    last_outcome: PickOutcome,
}

impl AnnotationSelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates left unresolved by an ambiguous pick.
    pub fn pending_candidates(&self) -> &[AnnotationId] {
        &self.pending
    }

    pub fn last_outcome(&self) -> &PickOutcome {
        &self.last_outcome
    }

    /// Forgets an unresolved pick without touching any highlight.
    pub fn cancel_pick(&mut self) {
        self.pending.clear();
        self.last_outcome = PickOutcome::Missed;
    }

    /// Resolves an ambiguous pick by toggling one of its candidates.
    ///
    /// Returns `false` if `id` was not among the pending candidates.
    pub fn choose(&mut self, mesh: &mut Mesh, id: AnnotationId) -> bool {
        if !self.pending.contains(&id) {
            return false;
        }
        self.pending.clear();
        match mesh.annotations_mut().toggle_selected(id) {
            Some(selected) => {
                self.last_outcome = PickOutcome::Toggled(id, selected);
                true
            }
            None => false,
        }
    }
}

impl Tool for AnnotationSelectionTool {
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse {
        let PointerEvent::Pressed {
            button: MouseButton::Left,
            position,
            modifiers,
        } = *event
        else {
            return EventResponse::Ignored;
        };
        if !modifiers.ctrl {
            return EventResponse::Ignored;
        }

        self.pending.clear();
        let Some(v) = ctx.pick_triangle_vertex(position) else {
            self.last_outcome = PickOutcome::Missed;
            return EventResponse::Consumed;
        };
        let mesh: &Mesh = ctx.mesh;
        let candidates: Vec<AnnotationId> = mesh
            .annotations()
            .iter()
            .filter(|a| a.contains_vertex(mesh, v))
            .map(|a| a.id())
            .collect();

        match candidates.as_slice() {
            [] => {
                self.last_outcome = PickOutcome::Missed;
                EventResponse::Consumed
            }
            [id] => {
                let id = *id;
                let selected = ctx.mesh.annotations_mut().toggle_selected(id).unwrap_or(false);
                log::debug!("annotation {id} highlight set to {selected}");
                self.last_outcome = PickOutcome::Toggled(id, selected);
                EventResponse::Changed
            }
            _ => {
                log::debug!("vertex {v} belongs to {} annotations", candidates.len());
                self.pending.clone_from(&candidates);
                self.last_outcome = PickOutcome::Ambiguous(candidates);
                EventResponse::Consumed
            }
        }
    }

    fn reset_selection(&mut self, mesh: &mut Mesh) {
        self.cancel_pick();
        mesh.annotations_mut().clear_selection();
    }
}
