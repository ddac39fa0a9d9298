use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, Side, Vertex},
        texture::Texture,
    },
    pipelines::Layouts,
};

/// Phong pipelines for one color format, one per material side.
#[derive(Debug)]
pub struct PhongPipelines {
    pub front: wgpu::RenderPipeline,
    pub double: wgpu::RenderPipeline,
}

impl PhongPipelines {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, color_format: wgpu::TextureFormat) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Phong Pipeline Layout"),
            bind_group_layouts: &[&layouts.material, &layouts.camera, &layouts.scene],
            immediate_size: 0,
        });
        let mk = |cull_mode: Option<wgpu::Face>, label: &'static str| {
            let shader = wgpu::ShaderModuleDescriptor {
                label: Some("Phong Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("phong.wgsl").into()),
            };
            mk_render_pipeline(
                device,
                &layout,
                label,
                Some(color_format),
                Some(wgpu::BlendState::REPLACE),
                Some(depth_state(true, wgpu::CompareFunction::Less)),
                cull_mode,
                &[model::ModelVertex::desc(), InstanceRaw::desc()],
                shader,
            )
        };
        Self {
            front: mk(Some(wgpu::Face::Back), "Phong Front Pipeline"),
            double: mk(None, "Phong Double Sided Pipeline"),
        }
    }

    pub fn for_side(&self, side: Side) -> &wgpu::RenderPipeline {
        match side {
            Side::Front => &self.front,
            Side::Double => &self.double,
        }
    }
}

pub fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: Texture::DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Shared pipeline builder. A `None` color format builds a depth-only pipeline.
#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    color_format: Option<wgpu::TextureFormat>,
    blend: Option<wgpu::BlendState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
    cull_mode: Option<wgpu::Face>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);
    let targets = [color_format.map(|format| wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: color_format.map(|_| wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
