//! Render pipelines and the bind group layouts they share.
//!
//! Group conventions for the Phong pipelines:
//! - group 0: material (color map, normal map, material uniform)
//! - group 1: camera
//! - group 2: lights, fog and the spot light's shadow map
//!
//! The depth-only shadow pipeline binds the light's camera at group 0 and the
//! sky pipeline binds the camera at group 0 and the cube map at group 1. The
//! egui painter in [`ui`] owns its pipeline and binds the screen size at group 0
//! and the egui texture at group 1.

pub mod basic;
pub mod overlay;
pub mod shadow;
pub mod sky;
pub mod ui;

use crate::pipelines::{basic::PhongPipelines, overlay::mk_overlay_pipeline, shadow::mk_shadow_pipeline, sky::mk_sky_pipeline};

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[derive(Debug, Clone)]
pub struct Layouts {
    pub material: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub scene: wgpu::BindGroupLayout,
    pub sky: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                sampler_entry(1),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                sampler_entry(3),
                uniform_entry(4),
            ],
            label: Some("material_bind_group_layout"),
        });
        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: Some("camera_bind_group_layout"),
        });
        let scene = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        });
        let sky = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[texture_entry(0, wgpu::TextureViewDimension::Cube), sampler_entry(1)],
            label: Some("sky_bind_group_layout"),
        });
        Self {
            material,
            camera,
            scene,
            sky,
        }
    }
}

/// Every pipeline drawing into the window surface.
#[derive(Debug)]
pub struct Pipelines {
    pub phong: PhongPipelines,
    pub shadow: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
    pub overlay: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, color_format: wgpu::TextureFormat) -> Self {
        Self {
            phong: PhongPipelines::new(device, layouts, color_format),
            shadow: mk_shadow_pipeline(device, layouts),
            sky: mk_sky_pipeline(device, layouts, color_format),
            overlay: mk_overlay_pipeline(device, color_format),
        }
    }
}
