//! End-to-end tests driving the annotator with scripted picks.
//!
//! Screens are orthographic along -Z with ten pixels per world unit, so
//! vertex `(x, y, 0)` sits at screen `(10x, 10y)`.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use meshnote::*;
use proptest::prelude::*;

fn screen(p: DVec3) -> DVec2 {
    p.truncate() * 10.0
}

fn picker_for(mesh: &Mesh) -> ScriptedPicker {
    let mut picker = ScriptedPicker::new();
    for v in 0..mesh.num_vertices() {
        let p = mesh.vertex(v).unwrap();
        let cell = mesh.vertex_triangles(v)[0] as i64;
        picker = picker.with_hit(screen(p), cell, p).with_vertex(v, screen(p), true);
    }
    for t in 0..mesh.num_triangles() {
        let [a, b, c] = mesh.triangle(t).unwrap();
        let centroid = (mesh.vertex(a).unwrap() + mesh.vertex(b).unwrap() + mesh.vertex(c).unwrap()) / 3.0;
        picker = picker.with_hit(screen(centroid), t as i64, centroid);
    }
    picker
}

fn unit_square() -> Mesh {
    Mesh::new(
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap()
}

fn grid(n: u32) -> Mesh {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            positions.push(DVec3::new(f64::from(i), f64::from(j), 0.0));
        }
    }
    let id = |i: u32, j: u32| j * (n + 1) + i;
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
            triangles.push([id(i, j), id(i + 1, j), id(i + 1, j + 1)]);
            triangles.push([id(i, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    Mesh::new(positions, triangles).unwrap()
}

fn annotator_for(mesh: Mesh) -> Annotator {
    let picker = picker_for(&mesh);
    Annotator::new(mesh, picker, Options::default())
}

fn drag(annotator: &mut Annotator, from: DVec2, to: DVec2) {
    annotator.handle_event(&PointerEvent::ctrl_press(MouseButton::Left, from.x, from.y));
    annotator.handle_event(&PointerEvent::ctrl_move(to.x, to.y));
    annotator.handle_event(&PointerEvent::ctrl_release(MouseButton::Left, to.x, to.y));
}

fn ctrl_click_vertex(annotator: &mut Annotator, v: VertexId) -> EventResponse {
    let at = screen(annotator.mesh().vertex(v).unwrap());
    annotator.handle_event(&PointerEvent::ctrl_press(MouseButton::Left, at.x, at.y))
}

/// A mesh carrying one highlighted surface annotation over every triangle.
fn highlighted(mut mesh: Mesh) -> Annotator {
    let triangles = (0..mesh.num_triangles()).collect();
    mesh.annotations_mut()
        .add(Annotation::new(
            AnnotationId(0),
            "all",
            Rgb::RED,
            AnnotationKind::Surface {
                triangles,
                outlines: Vec::new(),
            },
        ))
        .unwrap();
    let mut annotator = annotator_for(mesh);
    assert!(annotator.set_annotation_selected(AnnotationId(0), true));
    annotator
}

#[test]
fn test_unit_square_floor() {
    let mut annotator = annotator_for(unit_square());
    annotator.set_mode(InteractionMode::TriangleSelection).unwrap();
    drag(&mut annotator, DVec2::new(-1.0, -1.0), DVec2::new(11.0, 11.0));
    assert_eq!(annotator.triangle_tool().session().triangles().len(), 2);

    let id = annotator.finalize_annotation("floor", Rgb::new(255, 0, 0)).unwrap();
    assert_eq!(id.to_string(), "0");

    let mesh = annotator.mesh();
    let floor = mesh.annotations().get(id).unwrap();
    assert_eq!(floor.tag(), "floor");
    assert_eq!(floor.color(), Rgb::new(255, 0, 0));
    assert_eq!(floor.involved_vertices(mesh), BTreeSet::from([0, 1, 2, 3]));
    let AnnotationKind::Surface { triangles, outlines } = floor.kind() else {
        panic!("expected a surface annotation");
    };
    assert_eq!(mesh.boundary_edges(triangles).len(), 4);
    assert_eq!(outlines.len(), 1);
    assert_eq!(outlines[0].len(), 4);
    assert!(annotator.triangle_tool().session().is_empty());
}

#[test]
fn test_empty_finalize_consumes_no_id() {
    let mut annotator = annotator_for(unit_square());
    annotator.set_mode(InteractionMode::VertexSelection).unwrap();
    assert!(annotator.finalize_annotation("nothing", Rgb::RED).is_none());
    assert!(annotator.mesh().annotations().is_empty());
    assert_eq!(annotator.mesh().annotations().peek_next_id(), AnnotationId(0));

    annotator.set_mode(InteractionMode::Navigation).unwrap();
    assert!(annotator.finalize_annotation("nothing", Rgb::RED).is_none());
}

#[test]
fn test_mode_switch_resets_outgoing_tool() {
    let mut annotator = annotator_for(unit_square());
    annotator.set_mode(InteractionMode::TriangleSelection).unwrap();
    drag(&mut annotator, DVec2::new(-1.0, -1.0), DVec2::new(11.0, 11.0));
    assert_eq!(annotator.mesh().triangle_color(0), Some(Rgb::RED));

    annotator.set_mode(InteractionMode::LineSelection).unwrap();
    assert!(annotator.triangle_tool().session().is_empty());
    let base = annotator.mesh().base_color();
    assert_eq!(annotator.mesh().triangle_color(0), Some(base));
    assert_eq!(annotator.mesh().triangle_color(1), Some(base));
}

#[test]
fn test_measure_mode_needs_a_highlight() {
    let mut annotator = annotator_for(unit_square());
    let err = annotator
        .set_mode(InteractionMode::Measure(MeasureType::Ruler))
        .unwrap_err();
    assert!(matches!(err, MeshnoteError::NoSelection));
    assert_eq!(annotator.mode(), InteractionMode::Navigation);
    assert!(matches!(
        annotator.add_measure("length"),
        Err(MeshnoteError::WrongMode(_))
    ));
}

#[test]
fn test_bounding_over_two_highlighted_annotations() {
    let mut mesh = grid(3);
    // Two point annotations at opposite corners of the grid.
    for (id, vertices) in [(0, vec![0, 1]), (1, vec![14, 15])] {
        mesh.annotations_mut()
            .add(Annotation::new(
                AnnotationId(id),
                "corner",
                Rgb::RED,
                AnnotationKind::Point { vertices },
            ))
            .unwrap();
    }
    let mut annotator = annotator_for(mesh);
    annotator.set_annotation_selected(AnnotationId(0), true);
    annotator.set_annotation_selected(AnnotationId(1), true);

    annotator
        .set_mode(InteractionMode::Measure(MeasureType::Bounding))
        .unwrap();
    // Drag along +Y; display points map one to one onto the z = 0 plane.
    drag(&mut annotator, DVec2::new(0.0, 0.0), DVec2::new(0.0, 2.0));
    let result = annotator.measure_tool().result().unwrap();
    assert!((result.measure() - 3.0).abs() < 1e-7);
    let ids: BTreeSet<VertexId> = result.point_ids().iter().copied().collect();
    assert!(ids.iter().any(|v| [0, 1].contains(v)));
    assert!(ids.iter().any(|v| [14, 15].contains(v)));

    // Attaching still needs a single target.
    assert!(matches!(
        annotator.add_measure("span"),
        Err(MeshnoteError::SelectionCount {
            expected: 1,
            found: 2
        })
    ));
    annotator.set_annotation_selected(AnnotationId(1), false);
    let attribute = annotator.add_measure("span").unwrap().unwrap();
    let stored = annotator
        .mesh()
        .annotations()
        .get(AnnotationId(0))
        .and_then(|a| a.attribute(attribute))
        .and_then(Attribute::as_geometric)
        .unwrap();
    assert!(matches!(stored.kind(), GeometricKind::Bounding { .. }));
}

#[test]
fn test_tape_measure_is_attached() {
    let mut annotator = highlighted(grid(3));
    annotator
        .set_mode(InteractionMode::Measure(MeasureType::Tape))
        .unwrap();
    for v in [0, 3, 15] {
        assert_eq!(ctrl_click_vertex(&mut annotator, v), EventResponse::Changed);
    }
    assert!((annotator.measure_tool().measured_value().unwrap() - 6.0).abs() < 1e-7);

    let attribute_id = annotator.add_measure("perimeter").unwrap().unwrap();
    let annotation = annotator.mesh().annotations().get(AnnotationId(0)).unwrap();
    let measure = annotation
        .attribute(attribute_id)
        .and_then(Attribute::as_geometric)
        .unwrap();
    assert_eq!(measure.kind(), &GeometricKind::Geodesic);
    assert_eq!(measure.point_ids(), &[0, 1, 2, 3, 7, 11, 15]);
    assert!((measure.measure() - 6.0).abs() < 1e-7);

    // The tool starts over after attaching.
    assert_eq!(annotator.add_measure("again").unwrap(), None);
}

#[test]
fn test_caliper_through_annotator() {
    let mut annotator = highlighted(grid(3));
    annotator
        .set_mode(InteractionMode::Measure(MeasureType::Caliper))
        .unwrap();
    // Display points map one to one onto the z = 0 plane.
    drag(&mut annotator, DVec2::new(0.0, 1.0), DVec2::new(3.0, 1.0));
    let forward = annotator.measure_tool().measured_value().unwrap();
    assert!((forward - 3.0).abs() < 1e-7);

    annotator
        .set_mode(InteractionMode::Measure(MeasureType::Caliper))
        .unwrap();
    drag(&mut annotator, DVec2::new(3.0, 1.0), DVec2::new(0.0, 1.0));
    let backward = annotator.measure_tool().measured_value().unwrap();
    assert!((forward - backward).abs() < 1e-7);
}

#[test]
fn test_relationship_pairs() {
    for n in 1..6u64 {
        let mut mesh = unit_square();
        for i in 0..n {
            mesh.annotations_mut()
                .add(Annotation::new(
                    AnnotationId(i),
                    "p",
                    Rgb::RED,
                    AnnotationKind::Point { vertices: vec![0] },
                ))
                .unwrap();
        }
        let mut annotator = annotator_for(mesh);
        for i in 0..n {
            annotator.set_annotation_selected(AnnotationId(i), true);
        }
        let id = annotator
            .add_relationship("adjacent", 1.0, 0.0, 1.0, false)
            .unwrap();
        assert_eq!(id, 0);
        let expected = if n == 1 { 1 } else { n * (n - 1) / 2 };
        assert_eq!(annotator.mesh().relationships().links().len() as u64, expected);
    }

    let mut annotator = annotator_for(unit_square());
    assert!(matches!(
        annotator.add_relationship("none", 1.0, 0.0, 1.0, false),
        Err(MeshnoteError::EmptyRelationship)
    ));
}

#[test]
fn test_edit_keeps_id_and_attributes() {
    let mut mesh = unit_square();
    mesh.annotations_mut()
        .add(Annotation::new(
            AnnotationId(0),
            "corner",
            Rgb::RED,
            AnnotationKind::Point {
                vertices: vec![0, 1],
            },
        ))
        .unwrap();
    let mut annotator = annotator_for(mesh);
    let material = annotator
        .add_semantic_attribute(AnnotationId(0), "material", "wood")
        .unwrap();
    assert!(annotator
        .set_semantic_value(AnnotationId(0), material, "oak")
        .unwrap());

    assert!(annotator.edit_selected_annotation().is_err());
    annotator.set_annotation_selected(AnnotationId(0), true);
    let mode = annotator.edit_selected_annotation().unwrap();
    assert_eq!(mode, InteractionMode::VertexSelection);
    assert_eq!(annotator.editing(), Some(AnnotationId(0)));
    assert!(annotator.mesh().annotations().is_empty());
    assert_eq!(
        annotator.vertex_tool().session().vertices(),
        &BTreeSet::from([0, 1])
    );

    let at = screen(annotator.mesh().vertex(2).unwrap());
    annotator.handle_event(&PointerEvent::press(MouseButton::Right, at.x, at.y));
    let id = annotator
        .finalize_annotation("corners", Rgb::new(0, 255, 0))
        .unwrap();
    assert_eq!(id, AnnotationId(0));
    assert_eq!(annotator.editing(), None);

    let edited = annotator.mesh().annotations().get(id).unwrap();
    assert_eq!(edited.tag(), "corners");
    assert_eq!(
        edited.kind(),
        &AnnotationKind::Point {
            vertices: vec![0, 1, 2]
        }
    );
    assert_eq!(
        edited.attribute(material).and_then(Attribute::semantic_value),
        Some("oak")
    );
    assert_eq!(annotator.mesh().annotations().peek_next_id(), AnnotationId(1));
}

#[test]
fn test_abandoned_edit_restores_annotation() {
    let mut mesh = unit_square();
    mesh.annotations_mut()
        .add(Annotation::new(
            AnnotationId(3),
            "seam",
            Rgb::RED,
            AnnotationKind::Line {
                polylines: vec![vec![0, 1, 2]],
            },
        ))
        .unwrap();
    let mut annotator = annotator_for(mesh);
    annotator.set_annotation_selected(AnnotationId(3), true);
    assert_eq!(
        annotator.edit_selected_annotation().unwrap(),
        InteractionMode::LineSelection
    );
    assert_eq!(annotator.line_tool().session().edges().len(), 2);

    annotator.set_mode(InteractionMode::Navigation).unwrap();
    assert_eq!(annotator.editing(), None);
    assert!(annotator.line_tool().session().is_empty());
    let restored = annotator.mesh().annotations().get(AnnotationId(3)).unwrap();
    assert_eq!(restored.tag(), "seam");
}

#[test]
fn test_annotation_picking_and_redraw() {
    let mut mesh = unit_square();
    mesh.annotations_mut()
        .add(Annotation::new(
            AnnotationId(0),
            "corner",
            Rgb::RED,
            AnnotationKind::Point { vertices: vec![2] },
        ))
        .unwrap();
    let mut annotator = annotator_for(mesh);
    let redraws = Rc::new(Cell::new(0));
    let counter = Rc::clone(&redraws);
    annotator.set_redraw_callback(move || counter.set(counter.get() + 1));

    annotator.set_mode(InteractionMode::AnnotationSelection).unwrap();
    let after_switch = redraws.get();
    assert_eq!(ctrl_click_vertex(&mut annotator, 2), EventResponse::Changed);
    assert_eq!(redraws.get(), after_switch + 1);
    assert_eq!(annotator.mesh().annotations().selected(), vec![AnnotationId(0)]);

    // A miss changes nothing visible.
    annotator.handle_event(&PointerEvent::ctrl_press(MouseButton::Left, 500.0, 500.0));
    assert_eq!(redraws.get(), after_switch + 1);

    // Highlights survive a switch into measuring.
    annotator
        .set_mode(InteractionMode::Measure(MeasureType::Ruler))
        .unwrap();
    assert_eq!(annotator.mesh().annotations().selected(), vec![AnnotationId(0)]);

    annotator.set_mode(InteractionMode::AnnotationSelection).unwrap();
    annotator.reset_selection();
    assert!(annotator.mesh().annotations().selected().is_empty());
}

#[test]
fn test_region_growing_stays_inside_contour() {
    let mesh = grid(4);
    let contour = [6, 7, 8, 13, 18, 17, 16, 11];
    let region = mesh.region_grow(&contour, 10);
    assert_eq!(region.len(), 8);

    let boundary: BTreeSet<EdgeId> = mesh.boundary_edges(&region).into_iter().collect();
    let walls: BTreeSet<EdgeId> = (0..contour.len())
        .map(|i| {
            mesh.common_edge(contour[i], contour[(i + 1) % contour.len()])
                .unwrap()
        })
        .collect();
    assert_eq!(boundary, walls);
}

#[test]
fn test_lasso_through_annotator() {
    let options = Options {
        triangle_selection: TriangleSelectionStyle::Lasso,
        ..Options::default()
    };
    let mesh = grid(4);
    let picker = picker_for(&mesh);
    let mut annotator = Annotator::new(mesh, picker, options);
    annotator.set_mode(InteractionMode::TriangleSelection).unwrap();
    for v in [6, 8, 18, 16] {
        ctrl_click_vertex(&mut annotator, v);
    }
    let [a, b, c] = annotator.mesh().triangle(10).unwrap();
    let mesh = annotator.mesh();
    let seed = screen((mesh.vertex(a).unwrap() + mesh.vertex(b).unwrap() + mesh.vertex(c).unwrap()) / 3.0);
    annotator.handle_event(&PointerEvent::press(MouseButton::Right, seed.x, seed.y));

    let id = annotator.finalize_annotation("patch", Rgb::RED).unwrap();
    let mesh = annotator.mesh();
    let patch = mesh.annotations().get(id).unwrap();
    assert_eq!(patch.involved_vertices(mesh).len(), 9);
}

proptest! {
    #[test]
    fn prop_reset_clears_every_selection(
        drags in prop::collection::vec((-5.0f64..35.0, -5.0f64..35.0, -5.0f64..35.0, -5.0f64..35.0), 0..6),
        clicks in prop::collection::vec((0usize..16, any::<bool>()), 0..8),
        mode_index in 0usize..4,
    ) {
        let mut annotator = highlighted(grid(3));
        let mode = [
            InteractionMode::VertexSelection,
            InteractionMode::TriangleSelection,
            InteractionMode::LineSelection,
            InteractionMode::Measure(MeasureType::Tape),
        ][mode_index];
        annotator.set_mode(mode).unwrap();
        if mode.is_measure() {
            for (v, _) in &clicks {
                ctrl_click_vertex(&mut annotator, *v);
            }
        } else {
            for (x0, y0, x1, y1) in drags {
                drag(&mut annotator, DVec2::new(x0, y0), DVec2::new(x1, y1));
            }
            for (v, commit) in &clicks {
                ctrl_click_vertex(&mut annotator, *v);
                if *commit {
                    annotator.handle_event(&PointerEvent::press(MouseButton::Right, -50.0, -50.0));
                }
            }
        }
        annotator.reset_selection();

        prop_assert!(annotator.vertex_tool().session().is_empty());
        prop_assert!(annotator.triangle_tool().session().is_empty());
        prop_assert!(annotator.line_tool().session().is_empty());
        prop_assert!(annotator.line_tool().polylines().is_empty());
        prop_assert_eq!(annotator.line_tool().state(), &LineState::Idle);
        prop_assert_eq!(annotator.measure_tool().state(), &MeasureState::Idle);
        prop_assert!(annotator.measure_tool().result().is_none());
        let base = annotator.mesh().base_color();
        for t in 0..annotator.mesh().num_triangles() {
            prop_assert_eq!(annotator.mesh().triangle_color(t), Some(base));
        }
        prop_assert!(annotator.finalize_annotation("empty", Rgb::RED).is_none());
        prop_assert_eq!(annotator.mesh().annotations().len(), 1);
    }
}
