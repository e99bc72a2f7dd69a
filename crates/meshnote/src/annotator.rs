//! The controller a UI shell drives: one mesh, one active interaction mode.

use std::fmt;
use std::path::Path;
use std::process::ExitStatus;

use meshnote_core::{
    Annotation, AnnotationId, AnnotationKind, Attribute, Mesh, MeshnoteError, Options,
    PickBackend, Relationship, Result, Rgb,
};
use meshnote_tools::{
    AnnotationSelectionTool, EventResponse, LineSelectionTool, MeasureTool, MeasureType,
    PointerEvent, SelectionTool, Tool, ToolContext, TriangleSelectionTool, VertexSelectionTool,
};

use crate::{accessibility, persistence};

/// Which tool receives pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// No tool is active; events are left to the camera.
    #[default]
    Navigation,
    VertexSelection,
    LineSelection,
    TriangleSelection,
    AnnotationSelection,
    Measure(MeasureType),
}

impl InteractionMode {
    pub fn is_measure(self) -> bool {
        matches!(self, Self::Measure(_))
    }

    /// The selection mode that produces annotations of this kind.
    pub fn for_kind(kind: &AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Point { .. } => Self::VertexSelection,
            AnnotationKind::Line { .. } => Self::LineSelection,
            AnnotationKind::Surface { .. } => Self::TriangleSelection,
        }
    }
}

/// Drives the interaction tools over one mesh.
///
/// Exactly one mode is active at a time. Switching modes resets the
/// in-progress gesture and selection of every other tool; annotation
/// highlights are kept, since measurements depend on them.
pub struct Annotator {
    mesh: Mesh,
    picker: Box<dyn PickBackend>,
    options: Options,
    mode: InteractionMode,
    vertex_tool: VertexSelectionTool,
    line_tool: LineSelectionTool,
    triangle_tool: TriangleSelectionTool,
    annotation_tool: AnnotationSelectionTool,
    measure_tool: MeasureTool,
    /// The annotation taken out of the registry while it is re-edited.
    editing: Option<Annotation>,
    redraw: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("mesh", &self.mesh)
            .field("mode", &self.mode)
            .field("editing", &self.editing.as_ref().map(Annotation::id))
            .field("has_redraw_callback", &self.redraw.is_some())
            .finish_non_exhaustive()
    }
}

impl Annotator {
    /// Creates an annotator in navigation mode.
    pub fn new(mut mesh: Mesh, picker: impl PickBackend + 'static, options: Options) -> Self {
        mesh.set_base_color(options.base_color);
        let mut triangle_tool = TriangleSelectionTool::new();
        triangle_tool.set_highlight_color(options.highlight_color);
        Self {
            mesh,
            picker: Box::new(picker),
            options,
            mode: InteractionMode::Navigation,
            vertex_tool: VertexSelectionTool::new(),
            line_tool: LineSelectionTool::new(),
            triangle_tool,
            annotation_tool: AnnotationSelectionTool::new(),
            measure_tool: MeasureTool::new(),
            editing: None,
            redraw: None,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(mut self) -> Mesh {
        self.cancel_edit();
        self.mesh
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces the options. A new base color clears the triangle selection.
    pub fn set_options(&mut self, options: Options) {
        if options.base_color != self.options.base_color {
            self.triangle_tool.reset_selection(&mut self.mesh);
            self.mesh.set_base_color(options.base_color);
        }
        self.triangle_tool.set_highlight_color(options.highlight_color);
        self.options = options;
        self.request_redraw();
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Sets the callback invoked whenever the visible state changes.
    pub fn set_redraw_callback(&mut self, callback: impl FnMut() + 'static) {
        self.redraw = Some(Box::new(callback));
    }

    fn request_redraw(&mut self) {
        if let Some(redraw) = self.redraw.as_mut() {
            redraw();
        }
    }

    pub fn vertex_tool(&self) -> &VertexSelectionTool {
        &self.vertex_tool
    }

    pub fn line_tool(&self) -> &LineSelectionTool {
        &self.line_tool
    }

    pub fn triangle_tool(&self) -> &TriangleSelectionTool {
        &self.triangle_tool
    }

    pub fn annotation_tool(&self) -> &AnnotationSelectionTool {
        &self.annotation_tool
    }

    pub fn measure_tool(&self) -> &MeasureTool {
        &self.measure_tool
    }

    /// Id of the annotation being re-edited, if any.
    pub fn editing(&self) -> Option<AnnotationId> {
        self.editing.as_ref().map(Annotation::id)
    }

    // === Modes and events ===

    /// Activates a mode, resetting every other tool first.
    ///
    /// Measurement modes require at least one highlighted annotation; attaching
    /// a measure later needs exactly one. An edit in progress is abandoned and
    /// the original annotation restored.
    pub fn set_mode(&mut self, mode: InteractionMode) -> Result<()> {
        if mode.is_measure() && self.mesh.annotations().selected().is_empty() {
            log::warn!("no annotation highlighted for {mode:?}");
            return Err(MeshnoteError::NoSelection);
        }
        self.cancel_edit();
        self.reset_other_tools(mode);
        if let InteractionMode::Measure(measure) = mode {
            self.measure_tool.set_measure_type(measure);
        }
        log::debug!("mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        self.request_redraw();
        Ok(())
    }

    fn reset_other_tools(&mut self, target: InteractionMode) {
        if target != InteractionMode::VertexSelection {
            self.vertex_tool.reset_selection(&mut self.mesh);
        }
        if target != InteractionMode::LineSelection {
            self.line_tool.reset_selection(&mut self.mesh);
        }
        if target != InteractionMode::TriangleSelection {
            self.triangle_tool.reset_selection(&mut self.mesh);
        }
        if target != InteractionMode::AnnotationSelection {
            self.annotation_tool.cancel_pick();
        }
        if !target.is_measure() {
            self.measure_tool.reset_selection(&mut self.mesh);
        }
    }

    /// Feeds a pointer event to the active tool.
    pub fn handle_event(&mut self, event: &PointerEvent) -> EventResponse {
        let mut ctx = ToolContext {
            mesh: &mut self.mesh,
            picker: self.picker.as_ref(),
            options: &self.options,
        };
        let response = match self.mode {
            InteractionMode::Navigation => EventResponse::Ignored,
            InteractionMode::VertexSelection => self.vertex_tool.handle_event(&mut ctx, event),
            InteractionMode::LineSelection => self.line_tool.handle_event(&mut ctx, event),
            InteractionMode::TriangleSelection => self.triangle_tool.handle_event(&mut ctx, event),
            InteractionMode::AnnotationSelection => {
                self.annotation_tool.handle_event(&mut ctx, event)
            }
            InteractionMode::Measure(_) => self.measure_tool.handle_event(&mut ctx, event),
        };
        if response.needs_redraw() {
            self.request_redraw();
        }
        response
    }

    /// Clears the active tool's selection. In annotation mode this removes
    /// every highlight.
    pub fn reset_selection(&mut self) {
        match self.mode {
            InteractionMode::Navigation => return,
            InteractionMode::VertexSelection => self.vertex_tool.reset_selection(&mut self.mesh),
            InteractionMode::LineSelection => self.line_tool.reset_selection(&mut self.mesh),
            InteractionMode::TriangleSelection => {
                self.triangle_tool.reset_selection(&mut self.mesh);
            }
            InteractionMode::AnnotationSelection => {
                self.annotation_tool.reset_selection(&mut self.mesh);
            }
            InteractionMode::Measure(_) => self.measure_tool.reset_selection(&mut self.mesh),
        }
        self.request_redraw();
    }

    // === Annotations ===

    /// Turns the active selection into an annotation.
    ///
    /// Re-edited annotations keep their id and attributes. An empty selection
    /// creates nothing; an edit emptied this way restores the original.
    pub fn finalize_annotation(&mut self, tag: &str, color: Rgb) -> Option<AnnotationId> {
        let edit_id = self.editing();
        let created = match self.mode {
            InteractionMode::VertexSelection => {
                self.vertex_tool
                    .finalize_annotation(&mut self.mesh, tag, color, edit_id)
            }
            InteractionMode::LineSelection => {
                self.line_tool
                    .finalize_annotation(&mut self.mesh, tag, color, edit_id)
            }
            InteractionMode::TriangleSelection => {
                self.triangle_tool
                    .finalize_annotation(&mut self.mesh, tag, color, edit_id)
            }
            mode => {
                log::warn!("cannot finalize an annotation in mode {mode:?}");
                return None;
            }
        };

        match (created, self.editing.take()) {
            (Some(id), Some(original)) => {
                if let Some(annotation) = self.mesh.annotations_mut().get_mut(id) {
                    for attribute in original.attributes() {
                        annotation.add_attribute(attribute.clone());
                    }
                }
            }
            (None, Some(original)) => self.restore(original),
            _ => {}
        }
        if let Some(id) = created {
            log::info!("annotation {id} '{tag}' finalized");
            self.request_redraw();
        }
        created
    }

    /// Starts re-editing the single highlighted annotation.
    ///
    /// The annotation leaves the registry, its geometry becomes the selection
    /// of the matching tool and that tool's mode is activated. Returns the
    /// new mode.
    pub fn edit_selected_annotation(&mut self) -> Result<InteractionMode> {
        let id = self.single_selected()?;
        let mode = self
            .mesh
            .annotations()
            .get(id)
            .map(|a| InteractionMode::for_kind(a.kind()))
            .ok_or(MeshnoteError::AnnotationNotFound(id))?;
        self.set_mode(mode)?;

        let annotation = self
            .mesh
            .annotations_mut()
            .remove(id)
            .ok_or(MeshnoteError::AnnotationNotFound(id))?;
        let kind = annotation.kind();
        match mode {
            InteractionMode::VertexSelection => self.vertex_tool.seed(&mut self.mesh, kind),
            InteractionMode::LineSelection => self.line_tool.seed(&mut self.mesh, kind),
            _ => self.triangle_tool.seed(&mut self.mesh, kind),
        };
        log::debug!("editing annotation {id} in mode {mode:?}");
        self.editing = Some(annotation);
        self.request_redraw();
        Ok(mode)
    }

    fn cancel_edit(&mut self) {
        let Some(original) = self.editing.take() else {
            return;
        };
        match self.mode {
            InteractionMode::VertexSelection => self.vertex_tool.reset_selection(&mut self.mesh),
            InteractionMode::LineSelection => self.line_tool.reset_selection(&mut self.mesh),
            InteractionMode::TriangleSelection => {
                self.triangle_tool.reset_selection(&mut self.mesh);
            }
            _ => {}
        }
        log::debug!("edit of annotation {} abandoned", original.id());
        self.restore(original);
    }

    fn restore(&mut self, original: Annotation) {
        if let Err(err) = self.mesh.annotations_mut().add(original) {
            log::warn!("could not restore edited annotation: {err}");
        }
    }

    /// Removes an annotation and takes it out of its relationships; unknown
    /// ids are ignored.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Option<Annotation> {
        let removed = self.mesh.annotations_mut().remove(id);
        if removed.is_some() {
            self.mesh.relationships_mut().remove_annotation(id);
            self.request_redraw();
        }
        removed
    }

    /// Removes every annotation and relationship.
    pub fn clear_annotations(&mut self) {
        self.cancel_edit();
        self.mesh.annotations_mut().clear();
        self.mesh.relationships_mut().clear();
        self.request_redraw();
    }

    pub fn set_annotation_selected(&mut self, id: AnnotationId, selected: bool) -> bool {
        let found = self.mesh.annotations_mut().set_selected(id, selected);
        if found {
            self.request_redraw();
        }
        found
    }

    /// Resolves an ambiguous annotation pick.
    pub fn choose_annotation(&mut self, id: AnnotationId) -> bool {
        let chosen = self.annotation_tool.choose(&mut self.mesh, id);
        if chosen {
            self.request_redraw();
        }
        chosen
    }

    fn single_selected(&self) -> Result<AnnotationId> {
        match self.mesh.annotations().selected().as_slice() {
            [id] => Ok(*id),
            selected => {
                log::warn!("{} annotations highlighted, one required", selected.len());
                Err(MeshnoteError::SelectionCount {
                    expected: 1,
                    found: selected.len(),
                })
            }
        }
    }

    // === Attributes ===

    /// Attaches the current measurement to the highlighted annotation.
    ///
    /// Returns the new attribute id, or `None` if nothing has been measured.
    pub fn add_measure(&mut self, key: &str) -> Result<Option<u32>> {
        if !self.mode.is_measure() {
            return Err(MeshnoteError::WrongMode(format!("{:?}", self.mode)));
        }
        let id = self.single_selected()?;
        let annotation = self
            .mesh
            .annotations_mut()
            .get_mut(id)
            .ok_or(MeshnoteError::AnnotationNotFound(id))?;
        let attribute_id = annotation.next_attribute_id();
        let Some(attribute) = self.measure_tool.finalize_attribute(attribute_id, key) else {
            return Ok(None);
        };
        annotation.add_attribute(attribute);
        log::info!("measure {attribute_id} '{key}' attached to annotation {id}");
        self.request_redraw();
        Ok(Some(attribute_id))
    }

    /// Attaches a free-text property to an annotation and returns its id.
    pub fn add_semantic_attribute(
        &mut self,
        annotation: AnnotationId,
        key: &str,
        value: &str,
    ) -> Result<u32> {
        let target = self
            .mesh
            .annotations_mut()
            .get_mut(annotation)
            .ok_or(MeshnoteError::AnnotationNotFound(annotation))?;
        let id = target.next_attribute_id();
        target.add_attribute(Attribute::semantic(id, key, value));
        log::info!("semantic attribute {id} '{key}' attached to annotation {annotation}");
        Ok(id)
    }

    /// Changes the text of a semantic attribute.
    ///
    /// Returns `false` if the attribute is missing or not semantic.
    pub fn set_semantic_value(
        &mut self,
        annotation: AnnotationId,
        attribute: u32,
        value: &str,
    ) -> Result<bool> {
        let target = self
            .mesh
            .annotations_mut()
            .get_mut(annotation)
            .ok_or(MeshnoteError::AnnotationNotFound(annotation))?;
        Ok(target
            .attribute_mut(attribute)
            .is_some_and(|a| a.set_semantic_value(value)))
    }

    /// Toggles how a measurement is drawn. Returns `false` if it does not exist.
    pub fn set_measure_display(
        &mut self,
        annotation: AnnotationId,
        attribute: u32,
        draw_value: bool,
        draw_geometry: bool,
    ) -> bool {
        let Some(geometric) = self
            .mesh
            .annotations_mut()
            .get_mut(annotation)
            .and_then(|a| a.attribute_mut(attribute))
            .and_then(Attribute::geometric_mut)
        else {
            return false;
        };
        geometric.set_draw_value(draw_value);
        geometric.set_draw_geometry(draw_geometry);
        self.request_redraw();
        true
    }

    pub fn remove_attribute(&mut self, annotation: AnnotationId, attribute: u32) -> Option<Attribute> {
        let removed = self
            .mesh
            .annotations_mut()
            .get_mut(annotation)?
            .remove_attribute(attribute);
        if removed.is_some() {
            self.request_redraw();
        }
        removed
    }

    // === Relationships ===

    /// Relates the highlighted annotations and returns the relationship id.
    pub fn add_relationship(
        &mut self,
        kind: &str,
        weight: f64,
        min_value: f64,
        max_value: f64,
        directed: bool,
    ) -> Result<u32> {
        let selected = self.mesh.annotations().selected();
        self.mesh.relationships_mut().add(Relationship::new(
            selected, kind, weight, min_value, max_value, directed,
        ))
    }

    // === Persistence ===

    pub fn save_annotations(&self, path: impl AsRef<Path>) -> bool {
        persistence::save_annotations(path, &self.mesh)
            .map_err(|err| log::error!("saving annotations failed: {err}"))
            .is_ok()
    }

    /// Replaces the annotations with a saved set. Any edit is abandoned first.
    pub fn load_annotations(&mut self, path: impl AsRef<Path>) -> bool {
        self.cancel_edit();
        let loaded = persistence::load_annotations(path, &mut self.mesh)
            .map_err(|err| log::error!("loading annotations failed: {err}"))
            .is_ok();
        if loaded {
            self.request_redraw();
        }
        loaded
    }

    pub fn save_relationships(&self, path: impl AsRef<Path>) -> bool {
        persistence::save_relationships(path, self.mesh.relationships())
            .map_err(|err| log::error!("saving relationships failed: {err}"))
            .is_ok()
    }

    pub fn load_relationships(&mut self, path: impl AsRef<Path>) -> bool {
        persistence::load_relationships(path, &mut self.mesh)
            .map_err(|err| log::error!("loading relationships failed: {err}"))
            .is_ok()
    }

    /// See [`accessibility::run_accessibility_script`].
    pub fn run_accessibility_script(
        &self,
        dir: impl AsRef<Path>,
        executable: impl AsRef<Path>,
    ) -> Result<ExitStatus> {
        accessibility::run_accessibility_script(&self.mesh, dir, executable)
    }
}
