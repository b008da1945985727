//! GLB container parsing and the subset of the glTF 2.0 document needed
//! to extract triangle geometry.
//!
//! Layout: a 12-byte header (`glTF`, version, total length) followed by
//! length-prefixed chunks. The first chunk is always JSON; an optional
//! second chunk holds the binary buffer. All integers are little-endian.

use std::collections::HashMap;

use base64::Engine;
use serde::Deserialize;

use crate::error::MeshError;

const MAGIC: &[u8; 4] = b"glTF";
const SUPPORTED_VERSION: u32 = 2;
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Accessor component type for 32-bit floats.
pub const COMPONENT_FLOAT: u32 = 5126;
/// Accessor component type for unsigned bytes.
pub const COMPONENT_UNSIGNED_BYTE: u32 = 5121;
/// Accessor component type for unsigned shorts.
pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
/// Accessor component type for unsigned ints.
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;

/// Primitive topology for independent triangles (the glTF default).
pub const MODE_TRIANGLES: u32 = 4;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub scene: Option<usize>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    /// Column-major 4x4 local transform.
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    /// Unit quaternion `[x, y, z, w]`.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Primitive {
    #[serde(default)]
    pub attributes: HashMap<String, usize>,
    pub indices: Option<usize>,
    pub mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub sparse: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,
    pub uri: Option<String>,
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// A parsed GLB file: its JSON document and resolved buffer contents.
#[derive(Debug)]
pub struct Glb {
    pub document: Document,
    /// Contents of `document.buffers`, index for index.
    pub buffers: Vec<Vec<u8>>,
}

impl Glb {
    /// Parse a GLB byte stream and resolve every buffer it declares.
    pub fn parse(bytes: &[u8]) -> Result<Self, MeshError> {
        if bytes.len() < HEADER_LEN {
            return Err(MeshError::InvalidContainer(format!(
                "{} bytes is shorter than the GLB header",
                bytes.len()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(MeshError::InvalidContainer("missing glTF magic".into()));
        }
        let version = read_u32(bytes, 4);
        if version != SUPPORTED_VERSION {
            return Err(MeshError::Unsupported(format!("GLB version {version}")));
        }
        let declared = read_u32(bytes, 8) as usize;
        if declared > bytes.len() {
            return Err(MeshError::InvalidContainer(format!(
                "header declares {declared} bytes but only {} are present",
                bytes.len()
            )));
        }

        let mut json: Option<&[u8]> = None;
        let mut bin: Option<&[u8]> = None;
        let mut offset = HEADER_LEN;

        while offset + CHUNK_HEADER_LEN <= declared {
            let chunk_len = read_u32(bytes, offset) as usize;
            let chunk_type = read_u32(bytes, offset + 4);
            let start = offset + CHUNK_HEADER_LEN;
            let end = start
                .checked_add(chunk_len)
                .filter(|end| *end <= declared)
                .ok_or_else(|| MeshError::InvalidContainer("chunk overruns file".into()))?;

            match chunk_type {
                CHUNK_JSON if json.is_none() => json = Some(&bytes[start..end]),
                CHUNK_BIN if bin.is_none() && json.is_some() => bin = Some(&bytes[start..end]),
                CHUNK_JSON | CHUNK_BIN => {
                    return Err(MeshError::InvalidContainer(
                        "unexpected chunk order".into(),
                    ))
                }
                other => tracing::debug!(chunk_type = other, "Skipping unknown GLB chunk"),
            }
            offset = end;
        }

        let json =
            json.ok_or_else(|| MeshError::InvalidContainer("missing JSON chunk".into()))?;
        let document: Document = serde_json::from_slice(json)?;
        let buffers = resolve_buffers(&document, bin)?;

        Ok(Self { document, buffers })
    }

    /// Read a `VEC3` float accessor.
    pub fn read_vec3(&self, accessor_index: usize) -> Result<Vec<[f32; 3]>, MeshError> {
        let accessor = self.accessor(accessor_index)?;
        if accessor.component_type != COMPONENT_FLOAT || accessor.kind != "VEC3" {
            return Err(MeshError::Unsupported(format!(
                "position accessor {accessor_index} is {} of component type {}",
                accessor.kind, accessor.component_type
            )));
        }
        self.read_elements(accessor_index, 12, |b| {
            [
                f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
                f32::from_le_bytes([b[4], b[5], b[6], b[7]]),
                f32::from_le_bytes([b[8], b[9], b[10], b[11]]),
            ]
        })
    }

    /// Read a `SCALAR` index accessor of any unsigned integer width.
    pub fn read_indices(&self, accessor_index: usize) -> Result<Vec<u32>, MeshError> {
        let accessor = self.accessor(accessor_index)?;
        if accessor.kind != "SCALAR" {
            return Err(MeshError::Unsupported(format!(
                "index accessor {accessor_index} has type {}",
                accessor.kind
            )));
        }
        match accessor.component_type {
            COMPONENT_UNSIGNED_BYTE => self.read_elements(accessor_index, 1, |b| u32::from(b[0])),
            COMPONENT_UNSIGNED_SHORT => self.read_elements(accessor_index, 2, |b| {
                u32::from(u16::from_le_bytes([b[0], b[1]]))
            }),
            COMPONENT_UNSIGNED_INT => self.read_elements(accessor_index, 4, |b| {
                u32::from_le_bytes([b[0], b[1], b[2], b[3]])
            }),
            other => Err(MeshError::Unsupported(format!(
                "index component type {other}"
            ))),
        }
    }

    fn accessor(&self, index: usize) -> Result<&Accessor, MeshError> {
        let accessor = self
            .document
            .accessors
            .get(index)
            .ok_or_else(|| MeshError::Malformed(format!("accessor {index} does not exist")))?;
        if accessor.sparse.is_some() {
            return Err(MeshError::Unsupported(format!(
                "sparse accessor {index}"
            )));
        }
        Ok(accessor)
    }

    /// Decode `count` elements of `elem_size` bytes, honouring the view's
    /// stride and bounds.
    fn read_elements<T>(
        &self,
        accessor_index: usize,
        elem_size: usize,
        decode: impl Fn(&[u8]) -> T,
    ) -> Result<Vec<T>, MeshError> {
        let accessor = self.accessor(accessor_index)?;
        let view_index = accessor.buffer_view.ok_or_else(|| {
            MeshError::Unsupported(format!(
                "accessor {accessor_index} has no buffer view (compressed geometry?)"
            ))
        })?;
        let view = self
            .document
            .buffer_views
            .get(view_index)
            .ok_or_else(|| {
                MeshError::Malformed(format!("buffer view {view_index} does not exist"))
            })?;
        let buffer = self
            .buffers
            .get(view.buffer)
            .ok_or_else(|| MeshError::Malformed(format!("buffer {} does not exist", view.buffer)))?;

        let out_of_bounds = || MeshError::OutOfBounds {
            accessor: accessor_index,
        };
        let view_end = view
            .byte_offset
            .checked_add(view.byte_length)
            .filter(|end| *end <= buffer.len())
            .ok_or_else(out_of_bounds)?;
        let stride = view.byte_stride.unwrap_or(elem_size);
        let start = view
            .byte_offset
            .checked_add(accessor.byte_offset)
            .filter(|start| *start <= view_end)
            .ok_or_else(out_of_bounds)?;
        if accessor.count == 0 {
            return Ok(Vec::new());
        }

        // The whole run must fit in the view before anything is allocated.
        let span = (accessor.count - 1)
            .checked_mul(stride)
            .and_then(|last| last.checked_add(elem_size))
            .ok_or_else(out_of_bounds)?;
        if span > view_end - start {
            return Err(out_of_bounds());
        }

        let mut out = Vec::with_capacity(accessor.count);
        for i in 0..accessor.count {
            let from = start + i * stride;
            out.push(decode(&buffer[from..from + elem_size]));
        }
        Ok(out)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Map each declared buffer to bytes: the BIN chunk for buffers without a
/// URI, decoded contents for base64 `data:` URIs.
fn resolve_buffers(document: &Document, bin: Option<&[u8]>) -> Result<Vec<Vec<u8>>, MeshError> {
    document
        .buffers
        .iter()
        .enumerate()
        .map(|(index, buffer)| {
            let data = match buffer.uri.as_deref() {
                None => bin
                    .ok_or_else(|| {
                        MeshError::InvalidContainer(format!(
                            "buffer {index} refers to a missing BIN chunk"
                        ))
                    })?
                    .to_vec(),
                Some(uri) => decode_data_uri(uri).ok_or_else(|| {
                    MeshError::Unsupported(format!("external buffer uri for buffer {index}"))
                })?,
            };
            if data.len() < buffer.byte_length {
                return Err(MeshError::InvalidContainer(format!(
                    "buffer {index} declares {} bytes but holds {}",
                    buffer.byte_length,
                    data.len()
                )));
            }
            Ok(data)
        })
        .collect()
}

fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}
