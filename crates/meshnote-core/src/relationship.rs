//! Typed, weighted relationships between annotations.

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationId;
use crate::error::{MeshnoteError, Result};

/// A relationship over a set of annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    id: u32,
    annotations: Vec<AnnotationId>,
    #[serde(rename = "type")]
    kind: String,
    weight: f64,
    min_value: f64,
    max_value: f64,
    directed: bool,
}

impl Relationship {
    /// Creates a relationship; the id is assigned when it is stored.
    pub fn new(
        annotations: Vec<AnnotationId>,
        kind: impl Into<String>,
        weight: f64,
        min_value: f64,
        max_value: f64,
        directed: bool,
    ) -> Self {
        Self {
            id: 0,
            annotations,
            kind: kind.into(),
            weight,
            min_value,
            max_value,
            directed,
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the participants in selection order.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationId] {
        &self.annotations
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the `[min, max]` value range.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.min_value, self.max_value)
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Enumerates the participant pairs `(i, j)` with `i <= j`.
    ///
    /// Self pairs are skipped unless there is exactly one participant, in
    /// which case the single self pair is the whole relationship. For directed
    /// relationships the pair order follows the participant order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(AnnotationId, AnnotationId)> {
        let n = self.annotations.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in i..n {
                if i == j && n != 1 {
                    continue;
                }
                pairs.push((self.annotations[i], self.annotations[j]));
            }
        }
        pairs
    }
}

/// One participant pair of a stored relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipLink {
    pub relationship: u32,
    pub from: AnnotationId,
    pub to: AnnotationId,
    #[serde(rename = "type")]
    pub kind: String,
    pub directed: bool,
}

/// Relationships of one mesh and the pairwise links they expand to.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    relationships: Vec<Relationship>,
    links: Vec<RelationshipLink>,
}

impl RelationshipStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a relationship under the next free id and records its links.
    ///
    /// # Errors
    ///
    /// Returns [`MeshnoteError::EmptyRelationship`] if it has no participants.
    pub fn add(&mut self, mut relationship: Relationship) -> Result<u32> {
        if relationship.annotations.is_empty() {
            return Err(MeshnoteError::EmptyRelationship);
        }
        relationship.id = self.next_id();
        self.push_links(&relationship);
        let id = relationship.id;
        log::info!(
            "relationship {id} '{}' over {} annotation(s)",
            relationship.kind,
            relationship.annotations.len()
        );
        self.relationships.push(relationship);
        Ok(id)
    }

    /// Returns the id the next stored relationship receives.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.relationships
            .iter()
            .map(|r| r.id.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    fn push_links(&mut self, relationship: &Relationship) {
        self.links
            .extend(relationship.pairs().into_iter().map(|(from, to)| RelationshipLink {
                relationship: relationship.id,
                from,
                to,
                kind: relationship.kind.clone(),
                directed: relationship.directed,
            }));
    }

    /// Looks up a relationship by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    #[must_use]
    pub fn links(&self) -> &[RelationshipLink] {
        &self.links
    }

    /// Returns the links an annotation takes part in.
    pub fn links_of(&self, id: AnnotationId) -> impl Iterator<Item = &RelationshipLink> + '_ {
        self.links.iter().filter(move |l| l.from == id || l.to == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn clear(&mut self) {
        self.relationships.clear();
        self.links.clear();
    }

    /// Takes a removed annotation out of every relationship.
    ///
    /// The annotation is pruned from the participants. A relationship left
    /// with a single participant out of several is dropped, since it would
    /// otherwise read as a unary property; one left with none is dropped too.
    /// Links are rebuilt. Returns the number of dropped relationships.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> usize {
        let before = self.relationships.len();
        self.relationships.retain_mut(|r| {
            let count = r.annotations.len();
            r.annotations.retain(|&a| a != id);
            match r.annotations.len() {
                0 => false,
                1 => count == 1,
                _ => true,
            }
        });
        self.links.clear();
        for relationship in std::mem::take(&mut self.relationships) {
            self.push_links(&relationship);
            self.relationships.push(relationship);
        }
        let dropped = before - self.relationships.len();
        if dropped > 0 {
            log::info!("{dropped} relationship(s) dropped with annotation {id}");
        }
        dropped
    }

    /// Replaces the contents with loaded relationships, keeping their ids.
    ///
    /// # Errors
    ///
    /// Returns [`MeshnoteError::EmptyRelationship`] if any relationship has no
    /// participants and [`MeshnoteError::IdOverflow`] if an id leaves no room
    /// for new ones; the store is left unchanged in both cases.
    pub fn replace_all(&mut self, relationships: Vec<Relationship>) -> Result<()> {
        if relationships.iter().any(|r| r.annotations.is_empty()) {
            return Err(MeshnoteError::EmptyRelationship);
        }
        if let Some(r) = relationships.iter().find(|r| r.id == u32::MAX) {
            return Err(MeshnoteError::IdOverflow(u64::from(r.id)));
        }
        self.clear();
        for relationship in &relationships {
            self.push_links(relationship);
        }
        self.relationships = relationships;
        Ok(())
    }
}
