use anyhow::Context;

use crate::{
    data_structures::{
        color::Color,
        model::{Material, PhongMaterial},
        texture::{Sampling, Texture},
    },
    resources::{AssetSource, resolve_relative},
};

pub async fn load_texture(
    source: &AssetSource,
    file_name: &str,
    sampling: Sampling,
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = source.load_binary(file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name, is_normal_map, sampling)
}

/// Loads six images in +x, -x, +y, -y, +z, -z order into one cube map.
pub async fn load_cube_texture(
    source: &AssetSource,
    faces: &[&str],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let mut images = Vec::with_capacity(faces.len());
    for face in faces {
        let data = source.load_binary(face).await?;
        let image = image::load_from_memory(&data).with_context(|| format!("decoding {face}"))?;
        images.push(image);
    }
    let label = faces.first().copied().unwrap_or("skybox");
    Texture::from_cube_faces(device, queue, &images, label)
}

/// Turns MTL entries into Phong materials. Maps are resolved next to `obj_file`.
///
/// A map that fails to load is replaced by a placeholder and logged.
pub async fn load_materials(
    source: &AssetSource,
    obj_file: &str,
    obj_materials: &[tobj::Material],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    placeholder_normal: &Texture,
) -> Vec<Material> {
    let mut materials = Vec::with_capacity(obj_materials.len());
    for m in obj_materials {
        let color = m
            .diffuse
            .map(|[r, g, b]| Color::rgb(r, g, b))
            .unwrap_or(Color::WHITE);
        let shininess = m.shininess.filter(|s| *s > 0.0).unwrap_or(30.0);

        let diffuse_texture = match &m.diffuse_texture {
            Some(map) => {
                let path = resolve_relative(obj_file, map);
                match load_texture(source, &path, Sampling::default(), false, device, queue).await {
                    Ok(texture) => texture,
                    Err(e) => {
                        log::warn!("{}: diffuse map {path} unavailable: {e:#}", m.name);
                        Texture::create_white(device, queue)
                    }
                }
            }
            None => Texture::create_white(device, queue),
        };
        let normal_texture = match &m.normal_texture {
            Some(map) => {
                let path = resolve_relative(obj_file, map);
                load_texture(source, &path, Sampling::default(), true, device, queue)
                    .await
                    .inspect_err(|e| log::warn!("{}: normal map {path} unavailable: {e:#}", m.name))
                    .ok()
            }
            None => None,
        };

        materials.push(Material::new(
            device,
            &m.name,
            PhongMaterial {
                color,
                shininess,
                ..Default::default()
            },
            diffuse_texture,
            normal_texture,
            placeholder_normal,
            layout,
        ));
    }
    materials
}
