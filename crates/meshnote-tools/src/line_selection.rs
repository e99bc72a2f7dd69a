//! Line selection: polylines traced click by click along shortest paths.

use meshnote_core::{AnnotationKind, Mesh, SelectionSession, VertexId};

use crate::input::{EventResponse, MouseButton, PointerEvent};
use crate::{SelectionTool, Tool, ToolContext};

/// Gesture state of the line tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineState {
    #[default]
    Idle,
    /// A polyline is being traced; its last vertex is the current anchor.
    Tracing { polyline: Vec<VertexId> },
}

/// Selects mesh edges along traced polylines for line annotations.
#[derive(Debug, Default)]
pub struct LineSelectionTool {
    state: LineState,
    session: SelectionSession,
    polylines: Vec<Vec<VertexId>>,
}

impl LineSelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LineState {
        &self.state
    }

    /// Returns the selected edges.
    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    /// Returns the polylines completed so far.
    pub fn polylines(&self) -> &[Vec<VertexId>] {
        &self.polylines
    }

    fn mark_edges(&mut self, mesh: &Mesh, path: &[VertexId]) {
        for pair in path.windows(2) {
            if let Some(e) = mesh.common_edge(pair[0], pair[1]) {
                self.session.select_edge(e);
            }
        }
    }

    fn extend_trace(&mut self, ctx: &ToolContext<'_>, v: VertexId) -> EventResponse {
        let LineState::Tracing { polyline } = &self.state else {
            return EventResponse::Ignored;
        };
        let Some(&last) = polyline.last() else {
            return EventResponse::Ignored;
        };
        if last == v {
            return EventResponse::Consumed;
        }
        let Some(path) = ctx.mesh.shortest_path(last, v, &ctx.options.line_metric) else {
            log::warn!("no path from vertex {last} to {v}");
            return EventResponse::Consumed;
        };
        self.mark_edges(ctx.mesh, &path);
        if let LineState::Tracing { polyline } = &mut self.state {
            polyline.extend_from_slice(&path[1..]);
        }
        EventResponse::Changed
    }

    /// Ends the current trace; single-vertex traces are dropped.
    fn commit_trace(&mut self) {
        if let LineState::Tracing { polyline } = std::mem::take(&mut self.state) {
            if polyline.len() > 1 {
                log::debug!("polyline of {} vertices completed", polyline.len());
                self.polylines.push(polyline);
            }
        }
    }
}

impl Tool for LineSelectionTool {
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse {
        match *event {
            PointerEvent::Pressed {
                button: MouseButton::Left,
                position,
                modifiers,
            } if modifiers.ctrl => {
                let Some(v) = ctx.pick_triangle_vertex(position) else {
                    return EventResponse::Consumed;
                };
                if self.state == LineState::Idle {
                    self.state = LineState::Tracing { polyline: vec![v] };
                    log::debug!("line trace started at vertex {v}");
                    EventResponse::Changed
                } else {
                    self.extend_trace(ctx, v)
                }
            }
            PointerEvent::Pressed {
                button: MouseButton::Right,
                ..
            } if self.state != LineState::Idle => {
                self.commit_trace();
                EventResponse::Changed
            }
            _ => EventResponse::Ignored,
        }
    }

    fn reset_selection(&mut self, _mesh: &mut Mesh) {
        self.state = LineState::Idle;
        self.session.clear();
        self.polylines.clear();
    }
}

impl SelectionTool for LineSelectionTool {
    /// Includes a trace still in progress.
    fn take_selection(&mut self, _mesh: &mut Mesh) -> Option<AnnotationKind> {
        self.commit_trace();
        if self.polylines.is_empty() {
            return None;
        }
        let polylines = std::mem::take(&mut self.polylines);
        self.session.clear();
        Some(AnnotationKind::Line { polylines })
    }

    fn seed(&mut self, mesh: &mut Mesh, kind: &AnnotationKind) -> bool {
        let AnnotationKind::Line { polylines } = kind else {
            return false;
        };
        self.reset_selection(mesh);
        for polyline in polylines {
            self.mark_edges(mesh, polyline);
            self.polylines.push(polyline.clone());
        }
        true
    }
}
