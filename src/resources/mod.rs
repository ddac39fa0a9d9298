/**
 * This module contains all logic for loading meshes and textures from external files.
 *
 * Natively every path is resolved under the configured asset root. In the
 * browser the same relative paths are fetched from `<origin>/<asset root>/`.
 */
pub mod loading;
pub mod mesh;
pub mod texture;

use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::data_structures::{
    model::{self, Material, PhongMaterial},
    texture::Texture,
};

/// Where asset files are read from.
#[derive(Clone, Debug)]
pub struct AssetSource {
    root: PathBuf,
}

impl AssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    #[cfg(target_arch = "wasm32")]
    fn url(&self, file_name: &str) -> anyhow::Result<reqwest::Url> {
        let window = web_sys::window().context("no browser window")?;
        let origin = window
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("page origin unavailable: {e:?}"))?;
        let root = self.root.to_string_lossy();
        let base = reqwest::Url::parse(&format!("{origin}/{}/", root.trim_matches('/')))?;
        Ok(base.join(file_name)?)
    }

    pub async fn load_string(&self, file_name: &str) -> anyhow::Result<String> {
        #[cfg(target_arch = "wasm32")]
        let txt = {
            let url = self.url(file_name)?;
            reqwest::get(url).await?.error_for_status()?.text().await?
        };
        #[cfg(not(target_arch = "wasm32"))]
        let txt = {
            let path = self.path(file_name);
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?
        };

        Ok(txt)
    }

    pub async fn load_binary(&self, file_name: &str) -> anyhow::Result<Vec<u8>> {
        #[cfg(target_arch = "wasm32")]
        let data = {
            let url = self.url(file_name)?;
            reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
        };
        #[cfg(not(target_arch = "wasm32"))]
        let data = {
            let path = self.path(file_name);
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?
        };

        Ok(data)
    }
}

/// Resolves `name` against the directory of `base`, the way OBJ files refer
/// to their material libraries and MTL files to their maps.
pub fn resolve_relative(base: &str, name: &str) -> String {
    let name = name.trim().replace('\\', "/");
    if name.starts_with('/') {
        return name.trim_start_matches('/').to_string();
    }
    match base.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!("{dir}/{name}"),
        _ => name,
    }
}

/// Loads an OBJ model and, when it names one, its MTL library and maps.
///
/// A missing or broken material library is not fatal: the model then gets a
/// single white material.
pub async fn load_model_obj(
    source: &AssetSource,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<model::Model> {
    let obj_text = source.load_string(file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    let mtl_source = source.clone();
    let obj_file = file_name.to_string();
    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        move |p| {
            let source = mtl_source.clone();
            let mtl_file = resolve_relative(&obj_file, &p);
            async move {
                match source.load_string(&mtl_file).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(e) => {
                        log::warn!("material library {mtl_file} unavailable: {e:#}");
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await
    .with_context(|| format!("parsing {file_name}"))?;

    let obj_materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{file_name}: materials ignored ({e})");
        Vec::new()
    });

    let placeholder_normal = Texture::create_default_normal_map(device, queue);
    let mut materials =
        texture::load_materials(source, file_name, &obj_materials, device, queue, layout, &placeholder_normal)
            .await;
    if materials.is_empty() {
        materials.push(Material::new(
            device,
            file_name,
            PhongMaterial::default(),
            Texture::create_white(device, queue),
            None,
            &placeholder_normal,
            layout,
        ));
    }

    let meshes = mesh::load_meshes(&models, file_name, materials.len(), device);
    log::info!(
        "loaded {file_name}: {} meshes, {} materials",
        meshes.len(),
        materials.len()
    );
    Ok(model::Model { meshes, materials })
}
