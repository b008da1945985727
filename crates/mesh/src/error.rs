use std::path::PathBuf;

/// Errors from reading a GLB scene or writing STL output.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The binary container is not a well-formed GLB file.
    #[error("invalid GLB container: {0}")]
    InvalidContainer(String),

    /// The JSON chunk could not be decoded.
    #[error("invalid glTF JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON decoded but references something that does not exist.
    #[error("malformed glTF document: {0}")]
    Malformed(String),

    /// The document uses a feature this converter does not handle.
    #[error("unsupported glTF feature: {0}")]
    Unsupported(String),

    /// An accessor reads past the end of its buffer view or buffer.
    #[error("accessor {accessor} reads past the end of its data")]
    OutOfBounds { accessor: usize },

    /// The scene has no triangle geometry to export.
    #[error("scene contains no triangles")]
    NoGeometry,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
