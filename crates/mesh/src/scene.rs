//! Scene traversal: flattens node hierarchies into world-space triangles.

use crate::error::MeshError;
use crate::glb::{Glb, Node, MODE_TRIANGLES};

/// Three world-space vertices in counter-clockwise order.
pub type Triangle = [[f32; 3]; 3];

/// Column-major 4x4 matrix, laid out as in glTF (`m[col * 4 + row]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [f32; 16]);

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// `T * R * S`, the composition glTF prescribes for node TRS values.
    pub fn from_trs(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Mat4 {
        let [x, y, z, w] = rotation;
        let [sx, sy, sz] = scale;
        let [tx, ty, tz] = translation;

        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);

        Mat4([
            (1.0 - 2.0 * (yy + zz)) * sx,
            2.0 * (xy + wz) * sx,
            2.0 * (xz - wy) * sx,
            0.0,
            2.0 * (xy - wz) * sy,
            (1.0 - 2.0 * (xx + zz)) * sy,
            2.0 * (yz + wx) * sy,
            0.0,
            2.0 * (xz + wy) * sz,
            2.0 * (yz - wx) * sz,
            (1.0 - 2.0 * (xx + yy)) * sz,
            0.0,
            tx,
            ty,
            tz,
            1.0,
        ])
    }

    /// Local transform of a node: its `matrix` if present, otherwise its
    /// TRS components with glTF defaults.
    pub fn local(node: &Node) -> Mat4 {
        match node.matrix {
            Some(m) => Mat4(m),
            None => Mat4::from_trs(
                node.translation.unwrap_or([0.0; 3]),
                node.rotation.unwrap_or([0.0, 0.0, 0.0, 1.0]),
                node.scale.unwrap_or([1.0; 3]),
            ),
        }
    }

    /// `self * rhs`
    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Mat4(out)
    }

    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        [
            m[0] * p[0] + m[4] * p[1] + m[8] * p[2] + m[12],
            m[1] * p[0] + m[5] * p[1] + m[9] * p[2] + m[13],
            m[2] * p[0] + m[6] * p[1] + m[10] * p[2] + m[14],
        ]
    }
}

/// Collect every triangle reachable from the active scene, in world space.
///
/// The active scene is `scene` if set, else the first scene; a document
/// without scenes uses every node that is nobody's child as a root.
/// Non-triangle primitives are skipped.
pub fn collect_triangles(glb: &Glb) -> Result<Vec<Triangle>, MeshError> {
    let doc = &glb.document;
    let roots = root_nodes(glb)?;

    let mut triangles = Vec::new();
    let mut stack: Vec<(usize, Mat4, usize)> =
        roots.into_iter().rev().map(|n| (n, Mat4::IDENTITY, 0)).collect();

    while let Some((node_index, parent, depth)) = stack.pop() {
        if depth > doc.nodes.len() {
            return Err(MeshError::Malformed("node hierarchy contains a cycle".into()));
        }
        let node = doc
            .nodes
            .get(node_index)
            .ok_or_else(|| MeshError::Malformed(format!("node {node_index} does not exist")))?;
        let world = parent.mul(&Mat4::local(node));

        if let Some(mesh_index) = node.mesh {
            append_mesh(glb, mesh_index, &world, &mut triangles)?;
        }
        for &child in node.children.iter().rev() {
            stack.push((child, world, depth + 1));
        }
    }

    Ok(triangles)
}

fn root_nodes(glb: &Glb) -> Result<Vec<usize>, MeshError> {
    let doc = &glb.document;
    if doc.scenes.is_empty() {
        let mut is_child = vec![false; doc.nodes.len()];
        for node in &doc.nodes {
            for &child in &node.children {
                if let Some(flag) = is_child.get_mut(child) {
                    *flag = true;
                }
            }
        }
        return Ok((0..doc.nodes.len()).filter(|i| !is_child[*i]).collect());
    }

    let scene_index = doc.scene.unwrap_or(0);
    doc.scenes
        .get(scene_index)
        .map(|scene| scene.nodes.clone())
        .ok_or_else(|| MeshError::Malformed(format!("scene {scene_index} does not exist")))
}

fn append_mesh(
    glb: &Glb,
    mesh_index: usize,
    world: &Mat4,
    out: &mut Vec<Triangle>,
) -> Result<(), MeshError> {
    let mesh = glb
        .document
        .meshes
        .get(mesh_index)
        .ok_or_else(|| MeshError::Malformed(format!("mesh {mesh_index} does not exist")))?;

    for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
        let mode = primitive.mode.unwrap_or(MODE_TRIANGLES);
        if mode != MODE_TRIANGLES {
            tracing::warn!(mesh_index, primitive_index, mode, "Skipping non-triangle primitive");
            continue;
        }
        let Some(&position_accessor) = primitive.attributes.get("POSITION") else {
            tracing::warn!(mesh_index, primitive_index, "Skipping primitive without POSITION");
            continue;
        };

        let positions: Vec<[f32; 3]> = glb
            .read_vec3(position_accessor)?
            .into_iter()
            .map(|p| world.transform_point(p))
            .collect();

        let vertex = |i: u32| {
            positions
                .get(i as usize)
                .copied()
                .ok_or_else(|| MeshError::Malformed(format!(
                    "index {i} exceeds {} vertices in mesh {mesh_index}",
                    positions.len()
                )))
        };

        match primitive.indices {
            Some(indices_accessor) => {
                for tri in glb.read_indices(indices_accessor)?.chunks_exact(3) {
                    out.push([vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?]);
                }
            }
            None => {
                for tri in positions.chunks_exact(3) {
                    out.push([tri[0], tri[1], tri[2]]);
                }
            }
        }
    }
    Ok(())
}
