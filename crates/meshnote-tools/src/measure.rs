//! Measurements over selected annotations.
//!
//! The tool measures one quantity at a time, chosen with
//! [`MeasureTool::set_measure_type`]:
//!
//! - **Ruler**: straight distance between two clicked vertices. A new second
//!   click replaces the previous end point.
//! - **Tape**: summed shortest-path length through every clicked vertex.
//! - **Caliper**: extent of the mesh cut along a dragged direction.
//! - **Bounding**: extent of the selected annotations along a dragged direction.
//! - **Height**: records an anchor only and never produces a value.
//!
//! Clicked vertices must belong to a highlighted annotation. All gestures
//! need the modifier: left click measures, right click undoes, middle click
//! starts over.

use std::collections::BTreeSet;

use glam::{DVec2, DVec3};
use meshnote_core::geometry::{centroid, find_extreme_points};
use meshnote_core::{
    Attribute, CuttingPlane, EuclideanDistance, GeometricAttribute, GeometricKind, Mesh, Point,
    VertexId,
};

use crate::input::{EventResponse, MouseButton, PointerEvent};
use crate::{Tool, ToolContext};

/// The quantity being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureType {
    #[default]
    Ruler,
    Tape,
    Caliper,
    Bounding,
    Height,
}

impl MeasureType {
    fn drag_kind(self) -> Option<DragKind> {
        match self {
            Self::Caliper => Some(DragKind::Caliper),
            Self::Bounding => Some(DragKind::Bounding),
            Self::Ruler | Self::Tape | Self::Height => None,
        }
    }
}

/// The drag-driven measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Caliper,
    Bounding,
}

/// Gesture state of the measurement tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeasureState {
    #[default]
    Idle,
    /// One or two clicked vertices.
    Ruler { points: Vec<VertexId> },
    /// The first clicked vertex and one shortest path per later click.
    Tape {
        anchor: VertexId,
        segments: Vec<Vec<VertexId>>,
    },
    /// A direction being dragged in world space.
    Dragging {
        kind: DragKind,
        begin: Point,
        end: Point,
    },
    /// Height anchor; no value is derived from it.
    Height { anchor: VertexId, up: DVec3 },
}

/// Interactive measurement tool.
#[derive(Debug, Default)]
pub struct MeasureTool {
    measure: MeasureType,
    state: MeasureState,
    result: Option<GeometricAttribute>,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_type(&self) -> MeasureType {
        self.measure
    }

    /// Switches the measured quantity and drops any measurement in progress.
    pub fn set_measure_type(&mut self, measure: MeasureType) {
        log::debug!("measure type set to {measure:?}");
        self.measure = measure;
        self.clear();
    }

    pub fn state(&self) -> &MeasureState {
        &self.state
    }

    /// Returns the current measurement, if one has been taken.
    pub fn result(&self) -> Option<&GeometricAttribute> {
        self.result.as_ref()
    }

    pub fn measured_value(&self) -> Option<f64> {
        self.result.as_ref().map(GeometricAttribute::measure)
    }

    /// Stamps the current measurement into an attribute and starts over.
    ///
    /// Returns `None`, leaving the tool untouched, if nothing was measured.
    pub fn finalize_attribute(&mut self, id: u32, key: &str) -> Option<Attribute> {
        let value = self.result.take()?;
        self.state = MeasureState::Idle;
        log::info!("measure '{key}' finalized: {}", value.measure());
        Some(Attribute::geometric(id, key, value))
    }

    fn clear(&mut self) {
        self.state = MeasureState::Idle;
        self.result = None;
    }

    /// Picks the vertex under the cursor if it lies in a highlighted annotation.
    fn pick_vertex(ctx: &ToolContext<'_>, position: DVec2) -> Option<VertexId> {
        let point = ctx.picker.pick_world_point(position)?;
        let v = ctx.mesh.closest_vertex(point)?;
        let mesh: &Mesh = ctx.mesh;
        let inside = mesh
            .annotations()
            .iter()
            .filter(|a| a.is_selected())
            .any(|a| a.contains_vertex(mesh, v));
        if inside {
            Some(v)
        } else {
            log::debug!("vertex {v} is outside the highlighted annotations");
            None
        }
    }

    fn click(&mut self, ctx: &ToolContext<'_>, v: VertexId) -> EventResponse {
        match (&mut self.state, self.measure) {
            (MeasureState::Idle, MeasureType::Ruler) => {
                self.state = MeasureState::Ruler { points: vec![v] };
                EventResponse::Changed
            }
            (MeasureState::Ruler { points }, _) => {
                let start = points[0];
                let Some(value) = GeometricAttribute::euclidean(ctx.mesh, start, v) else {
                    return EventResponse::Consumed;
                };
                if start == v || value.measure() < ctx.options.measure_epsilon {
                    return EventResponse::Consumed;
                }
                points.truncate(1);
                points.push(v);
                self.result = Some(value);
                EventResponse::Changed
            }
            (MeasureState::Idle, MeasureType::Tape) => {
                self.state = MeasureState::Tape {
                    anchor: v,
                    segments: Vec::new(),
                };
                EventResponse::Changed
            }
            (MeasureState::Tape { anchor, segments }, _) => {
                let last = segments.last().and_then(|s| s.last()).copied().unwrap_or(*anchor);
                if last == v {
                    return EventResponse::Consumed;
                }
                let Some(path) = ctx.mesh.shortest_path(last, v, &EuclideanDistance) else {
                    log::warn!("no path from vertex {last} to {v}");
                    return EventResponse::Consumed;
                };
                segments.push(path);
                self.result = tape_attribute(ctx.mesh, *anchor, segments);
                EventResponse::Changed
            }
            (MeasureState::Idle | MeasureState::Height { .. }, MeasureType::Height) => {
                self.state = MeasureState::Height {
                    anchor: v,
                    up: DVec3::Z,
                };
                EventResponse::Changed
            }
            _ => EventResponse::Consumed,
        }
    }

    fn undo(&mut self, ctx: &ToolContext<'_>) -> EventResponse {
        match &mut self.state {
            MeasureState::Ruler { points } => {
                points.pop();
                self.result = None;
                if points.is_empty() {
                    self.state = MeasureState::Idle;
                }
                EventResponse::Changed
            }
            MeasureState::Tape { anchor, segments } => {
                if segments.pop().is_none() {
                    self.clear();
                } else {
                    self.result = tape_attribute(ctx.mesh, *anchor, segments);
                }
                EventResponse::Changed
            }
            MeasureState::Height { .. } => {
                self.clear();
                EventResponse::Changed
            }
            MeasureState::Idle | MeasureState::Dragging { .. } => EventResponse::Consumed,
        }
    }

    /// Recomputes the dragged measurement; degenerate drags keep the last value.
    fn update_drag(&mut self, ctx: &ToolContext<'_>, kind: DragKind, begin: Point, end: Point) {
        let value = match kind {
            DragKind::Caliper => caliper(ctx, begin, end),
            DragKind::Bounding => bounding(ctx, begin, end),
        };
        if let Some(value) = value {
            log::debug!("{kind:?} measure: {}", value.measure());
            self.result = Some(value);
        }
    }
}

impl Tool for MeasureTool {
    fn handle_event(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> EventResponse {
        match (*event, &self.state) {
            (
                PointerEvent::Moved { position, .. },
                &MeasureState::Dragging { kind, begin, .. },
            ) => {
                let end = ctx.picker.display_to_world(position);
                self.state = MeasureState::Dragging { kind, begin, end };
                self.update_drag(ctx, kind, begin, end);
                EventResponse::Changed
            }
            (
                PointerEvent::Released {
                    button: MouseButton::Left,
                    position,
                    ..
                },
                &MeasureState::Dragging { kind, begin, .. },
            ) => {
                let end = ctx.picker.display_to_world(position);
                self.state = MeasureState::Idle;
                self.update_drag(ctx, kind, begin, end);
                EventResponse::Changed
            }
            (
                PointerEvent::Pressed {
                    button,
                    position,
                    modifiers,
                },
                _,
            ) if modifiers.ctrl => match button {
                MouseButton::Left => {
                    if let Some(kind) = self.measure.drag_kind() {
                        let begin = ctx.picker.display_to_world(position);
                        self.state = MeasureState::Dragging {
                            kind,
                            begin,
                            end: begin,
                        };
                        return EventResponse::Consumed;
                    }
                    match Self::pick_vertex(ctx, position) {
                        Some(v) => self.click(ctx, v),
                        None => EventResponse::Consumed,
                    }
                }
                MouseButton::Right => self.undo(ctx),
                MouseButton::Middle => {
                    self.clear();
                    EventResponse::Changed
                }
            },
            _ => EventResponse::Ignored,
        }
    }

    fn reset_selection(&mut self, _mesh: &mut Mesh) {
        self.clear();
    }
}

fn tape_attribute(
    mesh: &Mesh,
    anchor: VertexId,
    segments: &[Vec<VertexId>],
) -> Option<GeometricAttribute> {
    if segments.is_empty() {
        return None;
    }
    let mut path = vec![anchor];
    for segment in segments {
        path.extend_from_slice(&segment[1..]);
    }
    GeometricAttribute::geodesic(mesh, path)
}

/// Cuts the mesh with the plane spanned by the view and drag directions and
/// measures between the nearest vertices of the extreme cut points.
fn caliper(ctx: &ToolContext<'_>, begin: Point, end: Point) -> Option<GeometricAttribute> {
    let eps = ctx.options.measure_epsilon;
    let direction = (end - begin).try_normalize()?;
    let view = ctx.picker.view_direction().try_normalize()?;
    let plane = CuttingPlane::new(begin, view.cross(direction))?;

    let (low, high) = (begin.dot(direction), end.dot(direction));
    let candidates: Vec<Point> = ctx
        .mesh
        .slice(&plane)
        .into_iter()
        .filter(|p| {
            let t = p.dot(direction);
            t >= low - eps && t <= high + eps
        })
        .collect();
    let (min, max) = find_extreme_points(&candidates, direction)?;
    let a = ctx.mesh.closest_vertex(candidates[min])?;
    let b = ctx.mesh.closest_vertex(candidates[max])?;
    GeometricAttribute::euclidean(ctx.mesh, a, b).filter(|value| value.measure() >= eps)
}

/// Measures the extent of every highlighted annotation's vertices along the drag.
fn bounding(ctx: &ToolContext<'_>, begin: Point, end: Point) -> Option<GeometricAttribute> {
    let direction = (end - begin).try_normalize()?;
    let mesh: &Mesh = ctx.mesh;
    let ids: Vec<VertexId> = mesh
        .annotations()
        .iter()
        .filter(|a| a.is_selected())
        .flat_map(|a| a.involved_vertices(mesh))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let points: Vec<Point> = ids.iter().filter_map(|&v| mesh.vertex(v)).collect();

    let (min, max) = find_extreme_points(&points, direction)?;
    let extent = points[max].dot(direction) - points[min].dot(direction);
    if extent < ctx.options.measure_epsilon {
        return None;
    }
    let origin = centroid(&points)?;
    Some(GeometricAttribute::new(
        GeometricKind::Bounding { origin, direction },
        extent,
        vec![ids[min], ids[max]],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{grid, picker_for, vertex_screen};
    use meshnote_core::{Annotation, AnnotationId, AnnotationKind, Options, Rgb, ScriptedPicker};
    use proptest::prelude::*;

    const TOLERANCE: f64 = 1e-7;

    fn highlight(mesh: &mut Mesh, kind: AnnotationKind) {
        let id = mesh.annotations_mut().reserve_id();
        mesh.annotations_mut()
            .add(Annotation::new(id, "target", Rgb::RED, kind))
            .unwrap();
        mesh.annotations_mut().set_selected(id, true);
    }

    fn highlighted_grid(n: u32) -> Mesh {
        let mut mesh = grid(n);
        let triangles = (0..mesh.num_triangles()).collect();
        highlight(
            &mut mesh,
            AnnotationKind::Surface {
                triangles,
                outlines: Vec::new(),
            },
        );
        mesh
    }

    fn click(tool: &mut MeasureTool, ctx: &mut ToolContext<'_>, v: VertexId) -> EventResponse {
        let at = vertex_screen(ctx.mesh, v);
        tool.handle_event(ctx, &PointerEvent::ctrl_press(MouseButton::Left, at.x, at.y))
    }

    fn drag(tool: &mut MeasureTool, ctx: &mut ToolContext<'_>, from: DVec2, to: DVec2) {
        tool.handle_event(ctx, &PointerEvent::ctrl_press(MouseButton::Left, from.x, from.y));
        tool.handle_event(ctx, &PointerEvent::ctrl_move(to.x, to.y));
        tool.handle_event(ctx, &PointerEvent::ctrl_release(MouseButton::Left, to.x, to.y));
    }

    fn tool_for(measure: MeasureType) -> MeasureTool {
        let mut tool = MeasureTool::new();
        tool.set_measure_type(measure);
        tool
    }

    #[test]
    fn test_ruler_replaces_end_point() {
        let mut mesh = highlighted_grid(3);
        let picker = picker_for(&mesh);
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Ruler);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };

        click(&mut tool, &mut ctx, 0);
        assert!(tool.measured_value().is_none());
        assert_eq!(click(&mut tool, &mut ctx, 0), EventResponse::Consumed);
        click(&mut tool, &mut ctx, 5);
        assert!((tool.measured_value().unwrap() - 2f64.sqrt()).abs() < TOLERANCE);
        click(&mut tool, &mut ctx, 3);
        assert!((tool.measured_value().unwrap() - 3.0).abs() < TOLERANCE);
        assert_eq!(tool.state(), &MeasureState::Ruler { points: vec![0, 3] });

        tool.handle_event(&mut ctx, &PointerEvent::ctrl_press(MouseButton::Right, 0.0, 0.0));
        assert_eq!(tool.state(), &MeasureState::Ruler { points: vec![0] });
        assert!(tool.measured_value().is_none());
    }

    #[test]
    fn test_tape_accumulates_and_undoes() {
        let mut mesh = highlighted_grid(3);
        let picker = picker_for(&mesh);
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Tape);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };

        for v in [0, 3, 15] {
            click(&mut tool, &mut ctx, v);
        }
        assert!((tool.measured_value().unwrap() - 6.0).abs() < TOLERANCE);

        let undo = PointerEvent::ctrl_press(MouseButton::Right, 0.0, 0.0);
        tool.handle_event(&mut ctx, &undo);
        assert!((tool.measured_value().unwrap() - 3.0).abs() < TOLERANCE);
        tool.handle_event(&mut ctx, &undo);
        assert!(tool.measured_value().is_none());
        assert!(matches!(tool.state(), MeasureState::Tape { anchor: 0, .. }));
        tool.handle_event(&mut ctx, &undo);
        assert_eq!(tool.state(), &MeasureState::Idle);
    }

    #[test]
    fn test_clicks_outside_highlight_are_ignored() {
        let mut mesh = grid(2);
        highlight(&mut mesh, AnnotationKind::Point { vertices: vec![0] });
        let picker = picker_for(&mesh);
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Ruler);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };
        assert_eq!(click(&mut tool, &mut ctx, 4), EventResponse::Consumed);
        assert_eq!(tool.state(), &MeasureState::Idle);
        assert_eq!(click(&mut tool, &mut ctx, 0), EventResponse::Changed);
    }

    #[test]
    fn test_caliper_measures_cut_extent() {
        let mut mesh = highlighted_grid(2);
        let picker = ScriptedPicker::new();
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Caliper);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };

        drag(&mut tool, &mut ctx, DVec2::new(0.0, 1.0), DVec2::new(2.0, 1.0));
        let result = tool.result().unwrap();
        assert!((result.measure() - 2.0).abs() < TOLERANCE);
        assert_eq!(result.point_ids(), &[3, 5]);
        assert_eq!(tool.state(), &MeasureState::Idle);

        // A zero-length drag keeps the previous value.
        drag(&mut tool, &mut ctx, DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0));
        assert!((tool.measured_value().unwrap() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_bounding_extent_and_origin() {
        let mut mesh = grid(2);
        highlight(&mut mesh, AnnotationKind::Point { vertices: vec![0, 4, 8] });
        let picker = ScriptedPicker::new();
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Bounding);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };

        drag(&mut tool, &mut ctx, DVec2::ZERO, DVec2::new(1.0, 0.0));
        let result = tool.result().unwrap();
        assert!((result.measure() - 2.0).abs() < TOLERANCE);
        assert_eq!(result.point_ids(), &[0, 8]);
        let GeometricKind::Bounding { origin, direction } = *result.kind() else {
            panic!("expected a bounding measure");
        };
        assert!(origin.distance(DVec3::new(1.0, 1.0, 0.0)) < TOLERANCE);
        assert!(direction.distance(DVec3::X) < TOLERANCE);
    }

    #[test]
    fn test_bounding_without_highlight_is_noop() {
        let mut mesh = grid(2);
        let picker = ScriptedPicker::new();
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Bounding);
        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };
        drag(&mut tool, &mut ctx, DVec2::ZERO, DVec2::new(1.0, 0.0));
        assert!(tool.result().is_none());
    }

    #[test]
    fn test_height_never_measures() {
        let mut mesh = highlighted_grid(2);
        let picker = picker_for(&mesh);
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Height);
        {
            let mut ctx = ToolContext {
                mesh: &mut mesh,
                picker: &picker,
                options: &options,
            };
            click(&mut tool, &mut ctx, 4);
        }
        assert_eq!(
            tool.state(),
            &MeasureState::Height {
                anchor: 4,
                up: DVec3::Z
            }
        );
        assert!(tool.finalize_attribute(0, "height").is_none());
    }

    #[test]
    fn test_finalize_and_reset() {
        let mut mesh = highlighted_grid(3);
        let picker = picker_for(&mesh);
        let options = Options::default();
        let mut tool = tool_for(MeasureType::Ruler);
        {
            let mut ctx = ToolContext {
                mesh: &mut mesh,
                picker: &picker,
                options: &options,
            };
            click(&mut tool, &mut ctx, 0);
            click(&mut tool, &mut ctx, 3);
        }
        let attribute = tool.finalize_attribute(2, "width").unwrap();
        assert_eq!(attribute.id(), 2);
        assert_eq!(attribute.key(), "width");
        assert_eq!(attribute.as_geometric().unwrap().point_ids(), &[0, 3]);
        assert_eq!(tool.state(), &MeasureState::Idle);
        assert!(tool.finalize_attribute(3, "again").is_none());

        let mut ctx = ToolContext {
            mesh: &mut mesh,
            picker: &picker,
            options: &options,
        };
        click(&mut tool, &mut ctx, 0);
        let response =
            tool.handle_event(&mut ctx, &PointerEvent::ctrl_press(MouseButton::Middle, 0.0, 0.0));
        assert_eq!(response, EventResponse::Changed);
        assert_eq!(tool.state(), &MeasureState::Idle);
        assert!(ctx.mesh.annotations().contains(AnnotationId(0)));
    }

    proptest! {
        #[test]
        fn prop_caliper_is_symmetric(
            ax in 0.1f64..2.9, ay in 0.1f64..2.9,
            bx in 0.1f64..2.9, by in 0.1f64..2.9,
        ) {
            let a = DVec2::new(ax, ay);
            let b = DVec2::new(bx, by);
            prop_assume!(a.distance(b) > 0.1);

            let mut mesh = highlighted_grid(3);
            let picker = ScriptedPicker::new();
            let options = Options::default();
            let mut forward = tool_for(MeasureType::Caliper);
            let mut backward = tool_for(MeasureType::Caliper);
            let mut ctx = ToolContext { mesh: &mut mesh, picker: &picker, options: &options };
            drag(&mut forward, &mut ctx, a, b);
            drag(&mut backward, &mut ctx, b, a);

            match (forward.measured_value(), backward.measured_value()) {
                (Some(f), Some(r)) => prop_assert!((f - r).abs() < TOLERANCE),
                (f, r) => prop_assert_eq!(f, r),
            }
        }
    }
}
