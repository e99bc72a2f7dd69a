//! Demo application showing basic meshnote usage without a renderer.
//!
//! A scripted pick backend stands in for the viewer: every vertex of a flat
//! 4x4 grid sits at screen position `(10x, 10y)`.

use meshnote::*;

fn grid(n: u32) -> Result<Mesh> {
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
    Mesh::new(positions, triangles)
}

fn picker_for(mesh: &Mesh) -> ScriptedPicker {
    let mut picker = ScriptedPicker::new();
    for (v, &p) in mesh.positions().iter().enumerate() {
        let screen = p.truncate() * 10.0;
        let cell = mesh.vertex_triangles(v).first().copied().unwrap_or(0) as i64;
        picker = picker.with_hit(screen, cell, p).with_vertex(v, screen, true);
    }
    picker
}

fn main() -> Result<()> {
    init_logging();

    let mesh = grid(4)?;
    let picker = picker_for(&mesh);
    let mut annotator = Annotator::new(mesh, picker, Options::default());
    annotator.set_redraw_callback(|| log::debug!("redraw requested"));

    // Select the lower half of the grid with a rectangle drag.
    annotator.set_mode(InteractionMode::TriangleSelection)?;
    annotator.handle_event(&PointerEvent::ctrl_press(MouseButton::Left, -1.0, -1.0));
    annotator.handle_event(&PointerEvent::ctrl_release(MouseButton::Left, 41.0, 21.0));
    let floor = annotator
        .finalize_annotation("floor", Rgb::new(255, 0, 0))
        .ok_or_else(|| MeshnoteError::WrongMode("nothing selected".into()))?;
    println!("created annotation {floor}");

    // Measure along its bottom edge with the tape.
    annotator.set_annotation_selected(floor, true);
    annotator.set_mode(InteractionMode::Measure(MeasureType::Tape))?;
    for x in [0.0, 20.0, 40.0] {
        annotator.handle_event(&PointerEvent::ctrl_press(MouseButton::Left, x, 0.0));
    }
    if let Some(attribute) = annotator.add_measure("bottom edge")? {
        println!("attached measure {attribute}");
    }
    annotator.add_semantic_attribute(floor, "material", "concrete")?;
    annotator.add_relationship("ground", 1.0, 0.0, 1.0, false)?;

    let annotations = annotator.mesh().annotations();
    for annotation in annotations.iter() {
        println!(
            "{} '{}': {} vertices, {} attribute(s)",
            annotation.id(),
            annotation.tag(),
            annotation.involved_vertices(annotator.mesh()).len(),
            annotation.attributes().len()
        );
    }

    let out = std::env::temp_dir().join("meshnote-demo");
    std::fs::create_dir_all(&out)?;
    if annotator.save_annotations(out.join("annotations.json"))
        && annotator.save_relationships(out.join("relationships.json"))
    {
        println!("saved to {}", out.display());
    }

    Ok(())
}
