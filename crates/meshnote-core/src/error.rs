//! Error types for meshnote.

use thiserror::Error;

use crate::annotation::AnnotationId;

/// The main error type for meshnote operations.
#[derive(Error, Debug)]
pub enum MeshnoteError {
    /// A triangle references a vertex index outside the vertex array.
    #[error("vertex index {index} out of range (mesh has {count} vertices)")]
    VertexOutOfRange { index: usize, count: usize },

    /// A triangle index outside the triangle array.
    #[error("triangle index {index} out of range (mesh has {count} triangles)")]
    TriangleOutOfRange { index: usize, count: usize },

    /// A triangle repeats one of its vertices.
    #[error("triangle {0} is degenerate (repeated vertex)")]
    InvalidTriangle(usize),

    /// An annotation with the given id already exists.
    #[error("annotation '{0}' already exists")]
    AnnotationExists(AnnotationId),

    /// An annotation with the given id was not found.
    #[error("annotation '{0}' not found")]
    AnnotationNotFound(AnnotationId),

    /// An attribute references mesh points that do not exist.
    #[error("attribute {id} ('{key}') references missing vertex {vertex}")]
    InvalidAttribute { id: u32, key: String, vertex: usize },

    /// A stored id is the largest representable one, so no id can follow it.
    #[error("id {0} is too large")]
    IdOverflow(u64),

    /// A relationship needs at least one participant.
    #[error("relationship has no participating annotations")]
    EmptyRelationship,

    /// The operation requires a specific number of selected annotations.
    #[error("operation requires exactly {expected} selected annotation(s), found {found}")]
    SelectionCount { expected: usize, found: usize },

    /// The operation requires at least one selected annotation.
    #[error("operation requires at least one selected annotation")]
    NoSelection,

    /// The active interaction mode cannot perform the requested operation.
    #[error("operation not available in mode {0}")]
    WrongMode(String),

    /// A persisted document was written by a newer format version.
    #[error("unsupported document version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// An external script exited unsuccessfully.
    #[error("script '{program}' failed: {status}")]
    ScriptFailed { program: String, status: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for meshnote operations.
pub type Result<T> = std::result::Result<T, MeshnoteError>;
