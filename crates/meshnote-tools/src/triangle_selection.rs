//! Triangle selection: rectangle drags, or a lasso contour filled by region growing.
//!
//! Selected triangles are painted with the highlight color while the session
//! lasts; removing them from the selection restores the base color.

use std::collections::BTreeSet;

use glam::DVec2;
use meshnote_core::{
    AnnotationKind, Mesh, Rgb, ScreenRect, SelectionMode, SelectionSession, TriangleId,
    TriangleSelectionStyle, VertexId,
};

use crate::input::{EventResponse, MouseButton, PointerEvent};
use crate::{SelectionTool, Tool, ToolContext};

/// Gesture state of the triangle tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TriangleState {
    #[default]
    Idle,
    /// A rectangle is being dragged from `start` to `current`.
    RectangleDragging { start: DVec2, current: DVec2 },
    /// A lasso contour is being traced; its last vertex is the current anchor.
    Tracing { contour: Vec<VertexId> },
}

/// Selects triangles for surface annotations.
#[derive(Debug)]
pub struct TriangleSelectionTool {
    state: TriangleState,
    session: SelectionSession,
    highlight_color: Rgb,
}

impl Default for TriangleSelectionTool {
    fn default() -> Self {
        Self {
            state: TriangleState::Idle,
            session: SelectionSession::new(),
            highlight_color: Rgb::RED,
        }
    }
}

impl TriangleSelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TriangleState {
        &self.state
    }

    /// Returns the selected triangles.
    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn set_highlight_color(&mut self, color: Rgb) {
        self.highlight_color = color;
    }

    /// Adds or removes triangles and repaints them.
    fn define_selection(
        &mut self,
        mesh: &mut Mesh,
        triangles: impl IntoIterator<Item = TriangleId>,
        mode: SelectionMode,
    ) {
        for t in triangles {
            match mode {
                SelectionMode::Add => {
                    self.session.select_triangle(t);
                    mesh.set_triangle_color(t, self.highlight_color);
                }
                SelectionMode::Remove => {
                    self.session.deselect_triangle(t);
                    mesh.reset_triangle_color(t);
                }
            }
        }
    }

    fn finish_rectangle(&mut self, ctx: &mut ToolContext<'_>, start: DVec2, end: DVec2) {
        let rect = ScreenRect::from_corners(start, end);
        let vertices = ctx.picker.pick_frustum(rect, ctx.options.visible_only);
        let triangles: BTreeSet<TriangleId> = vertices
            .into_iter()
            .flat_map(|v| ctx.mesh.vertex_triangles(v).iter().copied())
            .collect();
        log::debug!("rectangle pick touched {} triangles", triangles.len());
        self.define_selection(ctx.mesh, triangles, ctx.options.selection_mode);
    }

    fn extend_contour(&mut self, ctx: &ToolContext<'_>, v: VertexId) -> EventResponse {
        let TriangleState::Tracing { contour } = &self.state else {
            return EventResponse::Ignored;
        };
        let Some(&last) = contour.last() else {
            return EventResponse::Ignored;
        };
        if last == v {
            return EventResponse::Consumed;
        }
        let Some(path) = ctx.mesh.shortest_path(last, v, &ctx.options.lasso_metric) else {
            log::warn!("no path from vertex {last} to {v}");
            return EventResponse::Consumed;
        };
        if let TriangleState::Tracing { contour } = &mut self.state {
            contour.extend_from_slice(&path[1..]);
        }
        EventResponse::Changed
    }

    /// Closes the contour and grows the region around the triangle under the cursor.
    fn close_contour(&mut self, ctx: &mut ToolContext<'_>, position: DVec2) -> EventResponse {
        let Some(seed) = ctx
            .picker
            .pick_cell(position)
            .filter(|hit| ctx.mesh.is_valid_cell(hit.cell))
            .and_then(|hit| usize::try_from(hit.cell).ok())
        else {
            log::debug!("lasso seed missed the mesh");
            return EventResponse::Consumed;
        };
        let TriangleState::Tracing { mut contour } = std::mem::take(&mut self.state) else {
            return EventResponse::Ignored;
        };

        if let (Some(&first), Some(&last)) = (contour.first(), contour.last()) {
            if first != last {
                if let Some(closing) = ctx.mesh.shortest_path(last, first, &ctx.options.lasso_metric) {
                    contour.extend_from_slice(&closing[1..closing.len() - 1]);
                }
            }
        }
        let distinct: BTreeSet<VertexId> = contour.iter().copied().collect();
        if distinct.len() < 3 {
            log::debug!("lasso contour too short, discarded");
            return EventResponse::Changed;
        }

        let region = ctx.mesh.region_grow(&contour, seed);
        log::debug!(
            "region grown from triangle {seed}: {} triangles inside a {}-vertex contour",
            region.len(),
            contour.len()
        );
        self.define_selection(ctx.mesh, region, ctx.options.selection_mode);
        EventResponse::Changed
    }

    fn pick_single(&mut self, ctx: &mut ToolContext<'_>, position: DVec2) -> EventResponse {
        let Some(t) = ctx
            .picker
            .pick_cell(position)
            .filter(|hit| ctx.mesh.is_valid_cell(hit.cell))
            .and_then(|hit| usize::try_from(hit.cell).ok())
        else {
            return EventResponse::Ignored;
        };
        self.define_selection(ctx.mesh, [t], ctx.options.selection_mode);
        EventResponse::Changed
    }
}

impl Tool for TriangleSelectionTool {
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse {
        self.highlight_color = ctx.options.highlight_color;
        let style = ctx.options.triangle_selection;
        match (*event, &self.state) {
            (
                PointerEvent::Pressed {
                    button: MouseButton::Left,
                    position,
                    modifiers,
                },
                state,
            ) if modifiers.ctrl => match (style, state) {
                (TriangleSelectionStyle::Rectangle, TriangleState::Idle) => {
                    self.state = TriangleState::RectangleDragging {
                        start: position,
                        current: position,
                    };
                    EventResponse::Consumed
                }
                (TriangleSelectionStyle::Lasso, TriangleState::Idle) => {
                    let Some(v) = ctx.pick_triangle_vertex(position) else {
                        return EventResponse::Consumed;
                    };
                    self.state = TriangleState::Tracing { contour: vec![v] };
                    log::debug!("lasso started at vertex {v}");
                    EventResponse::Changed
                }
                (TriangleSelectionStyle::Lasso, TriangleState::Tracing { .. }) => {
                    match ctx.pick_triangle_vertex(position) {
                        Some(v) => self.extend_contour(ctx, v),
                        None => EventResponse::Consumed,
                    }
                }
                _ => EventResponse::Consumed,
            },
            (PointerEvent::Moved { position, .. }, &TriangleState::RectangleDragging { start, .. }) => {
                self.state = TriangleState::RectangleDragging {
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
                &TriangleState::RectangleDragging { start, .. },
            ) => {
                self.state = TriangleState::Idle;
                self.finish_rectangle(ctx, start, position);
                EventResponse::Changed
            }
            (
                PointerEvent::Pressed {
                    button: MouseButton::Right,
                    position,
                    ..
                },
                TriangleState::Tracing { .. },
            ) => self.close_contour(ctx, position),
            (
                PointerEvent::Pressed {
                    button: MouseButton::Right,
                    position,
                    ..
                },
                TriangleState::Idle,
            ) => self.pick_single(ctx, position),
            _ => EventResponse::Ignored,
        }
    }

    fn reset_selection(&mut self, mesh: &mut Mesh) {
        for &t in self.session.triangles() {
            mesh.reset_triangle_color(t);
        }
        self.session.clear();
        self.state = TriangleState::Idle;
    }
}

impl SelectionTool for TriangleSelectionTool {
    fn take_selection(&mut self, mesh: &mut Mesh) -> Option<AnnotationKind> {
        if self.session.triangles().is_empty() {
            return None;
        }
        let triangles: Vec<TriangleId> = self.session.triangles().iter().copied().collect();
        let outlines = mesh.outlines(&triangles);
        self.reset_selection(mesh);
        Some(AnnotationKind::Surface {
            triangles,
            outlines,
        })
    }

    fn seed(&mut self, mesh: &mut Mesh, kind: &AnnotationKind) -> bool {
        let AnnotationKind::Surface { triangles, .. } = kind else {
            return false;
        };
        self.reset_selection(mesh);
        let valid: Vec<TriangleId> = triangles
            .iter()
            .copied()
            .filter(|&t| t < mesh.num_triangles())
            .collect();
        self.define_selection(mesh, valid, SelectionMode::Add);
        true
    }
}
