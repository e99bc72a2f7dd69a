//! JSON persistence of annotations and relationships.
//!
//! Each file holds one versioned document. A document is serialized in full
//! before the target file is touched, so a serialization failure never leaves
//! a truncated file behind.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use meshnote_core::{
    Annotation, Mesh, MeshnoteError, Relationship, RelationshipLink, RelationshipStore, Result,
};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk form of a mesh's annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsDocument {
    pub version: u32,
    pub annotations: Vec<Annotation>,
}

/// On-disk form of a mesh's relationships.
///
/// `links` is written for external consumers; loading rebuilds it from
/// `relationships`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipsDocument {
    pub version: u32,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub links: Vec<RelationshipLink>,
}

fn check_version(found: u32) -> Result<()> {
    if found > FORMAT_VERSION {
        return Err(MeshnoteError::UnsupportedVersion {
            found,
            supported: FORMAT_VERSION,
        });
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes every annotation of `mesh` to `path`.
pub fn save_annotations(path: impl AsRef<Path>, mesh: &Mesh) -> Result<()> {
    let path = path.as_ref();
    let document = AnnotationsDocument {
        version: FORMAT_VERSION,
        annotations: mesh.annotations().list().to_vec(),
    };
    write_json(path, &document)?;
    log::info!(
        "saved {} annotation(s) to {}",
        document.annotations.len(),
        path.display()
    );
    Ok(())
}

/// Replaces the annotations of `mesh` with those stored at `path`.
///
/// Every annotation is validated against the mesh first; on any error the
/// mesh keeps its current annotations. Returns the number loaded.
pub fn load_annotations(path: impl AsRef<Path>, mesh: &mut Mesh) -> Result<usize> {
    let path = path.as_ref();
    let document: AnnotationsDocument = serde_json::from_str(&fs::read_to_string(path)?)?;
    check_version(document.version)?;
    for annotation in &document.annotations {
        annotation.validate(mesh)?;
    }
    let count = document.annotations.len();
    mesh.annotations_mut().replace_all(document.annotations)?;
    log::info!("loaded {count} annotation(s) from {}", path.display());
    Ok(count)
}

/// Writes the relationships and their expanded links to `path`.
pub fn save_relationships(path: impl AsRef<Path>, store: &RelationshipStore) -> Result<()> {
    let path = path.as_ref();
    let document = RelationshipsDocument {
        version: FORMAT_VERSION,
        relationships: store.relationships().to_vec(),
        links: store.links().to_vec(),
    };
    write_json(path, &document)?;
    log::info!(
        "saved {} relationship(s) to {}",
        document.relationships.len(),
        path.display()
    );
    Ok(())
}

/// Replaces the relationships of `mesh` with those stored at `path`.
///
/// Relationships must only reference annotations present on the mesh.
pub fn load_relationships(path: impl AsRef<Path>, mesh: &mut Mesh) -> Result<usize> {
    let path = path.as_ref();
    let document: RelationshipsDocument = serde_json::from_str(&fs::read_to_string(path)?)?;
    check_version(document.version)?;
    let missing = document
        .relationships
        .iter()
        .flat_map(Relationship::annotations)
        .find(|&&id| !mesh.annotations().contains(id));
    if let Some(&id) = missing {
        return Err(MeshnoteError::AnnotationNotFound(id));
    }
    let count = document.relationships.len();
    mesh.relationships_mut().replace_all(document.relationships)?;
    log::info!("loaded {count} relationship(s) from {}", path.display());
    Ok(count)
}
