//! Binary glTF (`.glb`) to binary STL conversion.
//!
//! The mesh service delivers textured scenes as GLB. Many slicers and CAD
//! tools only accept plain triangle soups, so [`convert_glb_to_stl`]
//! flattens the default scene -- applying every node transform -- into a
//! binary STL. Materials, textures, normals and animation are dropped.

pub mod error;
pub mod glb;
pub mod scene;
pub mod stl;

use std::path::{Path, PathBuf};

use toon3d_core::naming::stl_path_for;

pub use error::MeshError;
pub use scene::Triangle;

/// Convert GLB bytes into binary STL bytes.
pub fn convert_glb_to_stl(glb_bytes: &[u8]) -> Result<Vec<u8>, MeshError> {
    let glb = glb::Glb::parse(glb_bytes)?;
    let triangles = scene::collect_triangles(&glb)?;
    if triangles.is_empty() {
        return Err(MeshError::NoGeometry);
    }
    Ok(stl::encode_binary(&triangles))
}

/// Convert a `.glb` file and write the result next to it with an `.stl`
/// extension. Returns the written path.
///
/// Blocking; async callers should run it on a blocking thread.
pub fn convert_file(glb_path: &Path) -> Result<PathBuf, MeshError> {
    let bytes = std::fs::read(glb_path).map_err(|source| MeshError::Io {
        path: glb_path.to_path_buf(),
        source,
    })?;
    let stl = convert_glb_to_stl(&bytes)?;

    let stl_path = stl_path_for(glb_path);
    std::fs::write(&stl_path, &stl).map_err(|source| MeshError::Io {
        path: stl_path.clone(),
        source,
    })?;

    tracing::info!(
        source = %glb_path.display(),
        output = %stl_path.display(),
        triangles = (stl.len() - stl::HEADER_LEN - 4) / stl::FACET_LEN,
        "Converted GLB to STL",
    );
    Ok(stl_path)
}
