use crate::{AssetError, AssetId, CellMesh, ModelAsset};
use glam::Mat4;
use gltf::Gltf;
use gltf::mesh::Mode;
use std::path::Path;

/// Load a glTF or GLB cell model and flatten it into one mesh.
///
/// Every mesh node of the default scene (or the first scene) is visited,
/// its world transform baked into the vertices, and all triangle primitives
/// merged. Primitives in other modes are skipped with a warning.
pub fn load_cell_model(path: impl AsRef<Path>) -> Result<ModelAsset, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let id = AssetId::from_bytes(&bytes);
    let gltf = Gltf::from_slice(&bytes)?;
    let buffers = load_buffers(&gltf, path)?;

    let mut mesh = CellMesh::new();
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
        }
    }

    if mesh.is_empty() {
        return Err(AssetError::Empty(path.display().to_string()));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cell")
        .to_string();

    tracing::info!(
        "loaded cell model {name} ({id}): {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(ModelAsset { id, name, mesh })
}

fn load_buffers(gltf: &Gltf, path: &Path) -> Result<Vec<Vec<u8>>, AssetError> {
    let base = path.parent().unwrap_or(Path::new("."));
    let mut data = Vec::new();

    for buffer in gltf.buffers() {
        let bytes = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or(AssetError::MissingBlob(buffer.index()))?,
            gltf::buffer::Source::Uri(uri) => {
                if uri.contains(':') {
                    return Err(AssetError::UnsupportedUri(uri.to_string()));
                }
                std::fs::read(base.join(uri))?
            }
        };
        if bytes.len() < buffer.length() {
            return Err(AssetError::ShortBuffer {
                index: buffer.index(),
                expected: buffer.length(),
                actual: bytes.len(),
            });
        }
        data.push(bytes);
    }

    Ok(data)
}

fn collect_node(node: &gltf::Node, parent: Mat4, buffers: &[Vec<u8>], out: &mut CellMesh) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(gltf_mesh) = node.mesh() {
        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                tracing::warn!(
                    "skipping {:?} primitive in mesh {}",
                    primitive.mode(),
                    gltf_mesh.name().unwrap_or("unnamed")
                );
                continue;
            }
            if let Some(part) = read_primitive(&primitive, buffers) {
                out.append_transformed(&part, world);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Option<CellMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let Some(positions) = reader.read_positions() else {
        tracing::warn!("skipping primitive without positions");
        return None;
    };
    let positions: Vec<[f32; 3]> = positions.collect();

    let uvs = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

    let indices = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect::<Vec<_>>());

    let mut part = CellMesh {
        normals: Vec::new(),
        uvs,
        indices,
        positions,
    };
    part.indices.truncate(part.indices.len() / 3 * 3);

    let count = part.positions.len();
    if part.uvs.len() != count || part.indices.iter().any(|&i| i as usize >= count) {
        tracing::warn!("skipping primitive with inconsistent attribute counts");
        return None;
    }

    part.normals = reader
        .read_normals()
        .map(|normals| normals.collect())
        .unwrap_or_default();
    if part.normals.len() != count {
        part.recompute_normals();
    }

    Some(part)
}
