//! Render composition and pipeline batching.
//!
//! Scene nodes describe what they want drawn as a [`Render`]. Before a pass the
//! tree is flattened into a list of [`Instanced`] batches, which are then drawn
//! with the Phong pipelines (color passes) or the depth-only pipeline (shadow
//! pass).
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)

use wgpu::RenderPass;

use crate::{
    data_structures::model::{DrawModel, Model, Side},
    pipelines::basic::PhongPipelines,
};

/// Data for instanced object rendering: a model and its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub cast_shadow: bool,
}

/// Specifies how scene objects should be rendered.
///
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub fn flatten(self, out: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Defaults(mut vec) => out.append(&mut vec),
            Render::Composed(renders) => renders.into_iter().for_each(|r| r.flatten(out)),
        }
    }

    pub fn into_batches(self) -> Vec<Instanced<'a>> {
        let mut batches = Vec::new();
        self.flatten(&mut batches);
        batches
            .into_iter()
            .filter(|instanced| instanced.amount > 0)
            .collect()
    }
}

/// Draws every batch with the Phong pipeline matching each material's side.
pub fn draw_opaque<'a>(
    render_pass: &mut RenderPass<'a>,
    pipelines: &'a PhongPipelines,
    batches: &[Instanced<'a>],
    camera_bind_group: &'a wgpu::BindGroup,
    scene_bind_group: &'a wgpu::BindGroup,
) {
    let mut current: Option<Side> = None;
    for instanced in batches {
        let model: &'a Model = instanced.model;
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        for mesh in &model.meshes {
            let Some(material) = model.material_for(mesh) else {
                log::warn!("mesh {} references a missing material", mesh.name);
                continue;
            };
            if current != Some(material.params.side) {
                render_pass.set_pipeline(pipelines.for_side(material.params.side));
                current = Some(material.params.side);
            }
            render_pass.draw_mesh_instanced(
                mesh,
                material,
                0..instanced.amount as u32,
                camera_bind_group,
                scene_bind_group,
            );
        }
    }
}

/// Draws the shadow casters among `batches` into the currently bound depth target.
pub fn draw_depth<'a>(
    render_pass: &mut RenderPass<'a>,
    pipeline: &'a wgpu::RenderPipeline,
    batches: &[Instanced<'a>],
    camera_bind_group: &'a wgpu::BindGroup,
) {
    render_pass.set_pipeline(pipeline);
    for instanced in batches.iter().filter(|i| i.cast_shadow) {
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        render_pass.draw_model_depth_instanced(instanced.model, 0..instanced.amount as u32, camera_bind_group);
    }
}
