//! Vertex selection: rectangle drags and single-vertex toggles.

use glam::DVec2;
use meshnote_core::{AnnotationKind, Mesh, ScreenRect, SelectionMode, SelectionSession};

use crate::input::{EventResponse, MouseButton, PointerEvent};
use crate::{SelectionTool, Tool, ToolContext};

/// Gesture state of the vertex tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VertexState {
    #[default]
    Idle,
    /// A rectangle is being dragged from `start` to `current`.
    RectangleDragging { start: DVec2, current: DVec2 },
}

/// Selects vertices for point annotations.
#[derive(Debug, Default)]
pub struct VertexSelectionTool {
    state: VertexState,
    session: SelectionSession,
}

impl VertexSelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VertexState {
        self.state
    }

    /// Returns the current selection.
    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    fn finish_rectangle(&mut self, ctx: &ToolContext<'_>, start: DVec2, end: DVec2) {
        let rect = ScreenRect::from_corners(start, end);
        let picked = ctx.picker.pick_frustum(rect, ctx.options.visible_only);
        for v in picked.into_iter().filter(|&v| v < ctx.mesh.num_vertices()) {
            match ctx.options.selection_mode {
                SelectionMode::Add => self.session.select_vertex(v),
                SelectionMode::Remove => self.session.deselect_vertex(v),
            };
        }
        log::debug!(
            "rectangle pick: {} vertices selected",
            self.session.vertices().len()
        );
    }
}

impl Tool for VertexSelectionTool {
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse {
        match (*event, self.state) {
            (
                PointerEvent::Pressed {
                    button: MouseButton::Left,
                    position,
                    modifiers,
                },
                VertexState::Idle,
            ) if modifiers.ctrl => {
                self.state = VertexState::RectangleDragging {
                    start: position,
                    current: position,
                };
                EventResponse::Consumed
            }
            (PointerEvent::Moved { position, .. }, VertexState::RectangleDragging { start, .. }) => {
                self.state = VertexState::RectangleDragging {
                    start,
                    current: position,
                };
                EventResponse::Changed
            }
            (
                PointerEvent::Released {
                    button: MouseButton::Left,
                    position,
                    ..
                },
                VertexState::RectangleDragging { start, .. },
            ) => {
                self.state = VertexState::Idle;
                self.finish_rectangle(ctx, start, position);
                EventResponse::Changed
            }
            (
                PointerEvent::Pressed {
                    button: MouseButton::Right,
                    position,
                    ..
                },
                VertexState::Idle,
            ) => {
                let Some(v) = ctx
                    .picker
                    .pick_world_point(position)
                    .and_then(|p| ctx.mesh.closest_vertex(p))
                else {
                    return EventResponse::Ignored;
                };
                let selected = self.session.toggle_vertex(v);
                log::debug!("vertex {v} toggled to {selected}");
                EventResponse::Changed
            }
            _ => EventResponse::Ignored,
        }
    }

    fn reset_selection(&mut self, _mesh: &mut Mesh) {
        self.state = VertexState::Idle;
        self.session.clear();
    }
}

impl SelectionTool for VertexSelectionTool {
    fn take_selection(&mut self, _mesh: &mut Mesh) -> Option<AnnotationKind> {
        if self.session.vertices().is_empty() {
            return None;
        }
        let vertices = self.session.vertices().iter().copied().collect();
        self.session.clear();
        self.state = VertexState::Idle;
        Some(AnnotationKind::Point { vertices })
    }

    fn seed(&mut self, mesh: &mut Mesh, kind: &AnnotationKind) -> bool {
        let AnnotationKind::Point { vertices } = kind else {
            return false;
        };
        self.reset_selection(mesh);
        for &v in vertices.iter().filter(|&&v| v < mesh.num_vertices()) {
            self.session.select_vertex(v);
        }
        true
    }
}
