//! Annotation registry owned by a mesh.

use crate::annotation::{Annotation, AnnotationId};
use crate::error::{MeshnoteError, Result};

/// Registry of the annotations of one mesh.
///
/// Annotations are kept in insertion order. Ids come from a monotone counter
/// that only advances when an id is reserved or a larger id is stored, so ids
/// are never handed out twice in a session.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    annotations: Vec<Annotation>,
    next_id: u64,
}

impl AnnotationRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id the next call to [`Self::reserve_id`] hands out.
    #[must_use]
    pub fn peek_next_id(&self) -> AnnotationId {
        AnnotationId(self.next_id)
    }

    /// Consumes and returns a fresh annotation id.
    pub fn reserve_id(&mut self) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Stores an annotation.
    ///
    /// Returns an error if an annotation with the same id already exists, or
    /// if the id is too large for the counter to move past it.
    pub fn add(&mut self, annotation: Annotation) -> Result<()> {
        let id = annotation.id();
        if self.contains(id) {
            return Err(MeshnoteError::AnnotationExists(id));
        }
        let after = id.0.checked_add(1).ok_or(MeshnoteError::IdOverflow(id.0))?;
        self.next_id = self.next_id.max(after);
        log::info!(
            "annotation {id} '{}' added ({})",
            annotation.tag(),
            annotation.kind().name()
        );
        self.annotations.push(annotation);
        Ok(())
    }

    /// Removes an annotation; unknown ids are ignored.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id() == id)?;
        log::debug!("annotation {id} removed");
        Some(self.annotations.remove(index))
    }

    /// Gets an annotation by id.
    #[must_use]
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Gets a mutable reference to an annotation by id.
    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id() == id)
    }

    /// Checks if an annotation with the given id exists.
    #[must_use]
    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    /// Returns all annotations in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns an iterator over all annotations.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Removes all annotations. The id counter keeps its value.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    /// Returns the number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    // === Highlight state ===

    /// Returns the ids of the highlighted annotations, in insertion order.
    #[must_use]
    pub fn selected(&self) -> Vec<AnnotationId> {
        self.annotations
            .iter()
            .filter(|a| a.is_selected())
            .map(Annotation::id)
            .collect()
    }

    /// Sets the highlight of one annotation. Returns `false` for unknown ids.
    pub fn set_selected(&mut self, id: AnnotationId, selected: bool) -> bool {
        match self.get_mut(id) {
            Some(a) => {
                a.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// Flips the highlight of one annotation and returns the new state.
    pub fn toggle_selected(&mut self, id: AnnotationId) -> Option<bool> {
        let a = self.get_mut(id)?;
        let selected = !a.is_selected();
        a.set_selected(selected);
        Some(selected)
    }

    /// Clears the highlight of every annotation.
    pub fn clear_selection(&mut self) {
        for a in &mut self.annotations {
            a.set_selected(false);
        }
    }

    /// Replaces the contents with loaded annotations.
    ///
    /// The id counter moves past the highest loaded id. On error the registry
    /// is left unchanged.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = annotations.iter().map(Annotation::id).find(|&id| !seen.insert(id)) {
            return Err(MeshnoteError::AnnotationExists(dup));
        }
        let after = match annotations.iter().map(|a| a.id().0).max() {
            Some(max) => max.checked_add(1).ok_or(MeshnoteError::IdOverflow(max))?,
            None => 0,
        };
        self.next_id = self.next_id.max(after);
        self.annotations = annotations;
        Ok(())
    }
}
