use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
    },
    pipelines::{Layouts, basic::mk_render_pipeline},
};

/// Depth-only pipeline rendering shadow casters from the spot light.
///
/// Front faces are culled so the stored depth belongs to the back of each
/// caster, which keeps lit surfaces from shadowing themselves.
pub fn mk_shadow_pipeline(device: &wgpu::Device, layouts: &Layouts) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: &[&layouts.camera],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    };
    let mut depth = super::basic::depth_state(true, wgpu::CompareFunction::LessEqual);
    depth.bias = wgpu::DepthBiasState {
        constant: 2,
        slope_scale: 2.0,
        clamp: 0.0,
    };
    mk_render_pipeline(
        device,
        &layout,
        "Shadow Pipeline",
        None,
        None,
        Some(depth),
        Some(wgpu::Face::Front),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
