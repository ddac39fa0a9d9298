use crate::pipelines::{
    Layouts,
    basic::{depth_state, mk_render_pipeline},
};

/// Fullscreen triangle sampling the skybox cube map at the far plane.
///
/// Drawn first in the main pass. It never writes depth, so the scene covers it.
pub fn mk_sky_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[&layouts.camera, &layouts.sky],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sky Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Sky Pipeline",
        Some(color_format),
        Some(wgpu::BlendState::REPLACE),
        Some(depth_state(false, wgpu::CompareFunction::LessEqual)),
        None,
        &[],
        shader,
    )
}
