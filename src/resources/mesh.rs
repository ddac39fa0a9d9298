use crate::data_structures::{
    geometry::Geometry,
    model::{self, ModelVertex},
};

/// Converts parsed OBJ meshes into GPU meshes.
///
/// OBJ files don't come with tangents and bitangents so they are derived from
/// the UVs here for normal maps to work. Files without `vn` lines get smooth
/// normals from their faces. Meshes pointing at a material that
/// does not exist fall back to material 0.
pub fn load_meshes(
    models: &[tobj::Model],
    file_name: &str,
    material_count: usize,
    device: &wgpu::Device,
) -> Vec<model::Mesh> {
    models
        .iter()
        .filter_map(|m| {
            let geometry = to_geometry(&m.mesh);
            if geometry.indices.is_empty() {
                log::warn!("{file_name}: mesh {} has no faces", m.name);
                return None;
            }
            let material = m
                .mesh
                .material_id
                .filter(|id| *id < material_count)
                .unwrap_or(0);
            Some(geometry.to_mesh(device, &format!("{file_name}:{}", m.name), material))
        })
        .collect()
}

pub fn to_geometry(mesh: &tobj::Mesh) -> Geometry {
    let vertices = (0..mesh.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        })
        .collect::<Vec<_>>();

    let vertex_count = vertices.len() as u32;
    let indices = mesh
        .indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|i| *i < vertex_count))
        .flatten()
        .copied()
        .collect();

    let mut geometry = Geometry { vertices, indices };
    if mesh.normals.is_empty() {
        geometry.compute_vertex_normals();
    }
    geometry.compute_tangents();
    geometry
}
