//! Binary STL encoding.
//!
//! ```text
//! UINT8[80]    header
//! UINT32       triangle count
//! per triangle:
//!   REAL32[3]  normal
//!   REAL32[3]  vertex 1..3
//!   UINT16     attribute byte count (0)
//! ```

use crate::scene::Triangle;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 80;

/// Size of one encoded facet.
pub const FACET_LEN: usize = 50;

/// Header text. Must not start with `solid`, which readers take as the
/// ASCII variant.
const HEADER_TEXT: &[u8] = b"binary STL exported by toon3d";

/// Encode triangles as binary STL with computed facet normals.
pub fn encode_binary(triangles: &[Triangle]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + triangles.len() * FACET_LEN);

    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());

    for triangle in triangles {
        for value in facet_normal(triangle)
            .iter()
            .chain(triangle.iter().flatten())
        {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

/// Unit normal by the right-hand rule; zero for degenerate triangles.
pub fn facet_normal([a, b, c]: &Triangle) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len <= f32::EPSILON {
        return [0.0; 3];
    }
    [n[0] / len, n[1] / len, n[2] / len]
}
