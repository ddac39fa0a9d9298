//! Flat colored quads in normalized device coordinates, drawn over the scene.
//!
//! Natively there is no DOM, so the loading progress bar is drawn with this.

use wgpu::util::DeviceExt;

use crate::{
    pipelines::basic::{depth_state, mk_render_pipeline},
    resources::loading::ProgressBar,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl OverlayVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<OverlayVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

const TRACK_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.6];
const FILL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BAR_LEFT: f32 = -0.5;
const BAR_WIDTH: f32 = 1.0;
const BAR_HALF_HEIGHT: f32 = 0.02;

/// Two triangles spanning `[x0, x1] x [y0, y1]`.
fn quad(x0: f32, y0: f32, x1: f32, y1: f32, color: [f32; 4]) -> [OverlayVertex; 6] {
    let v = |x, y| OverlayVertex {
        position: [x, y],
        color,
    };
    [v(x0, y0), v(x1, y0), v(x1, y1), v(x0, y0), v(x1, y1), v(x0, y1)]
}

/// Track and fill of the progress bar. Empty once loading is done.
pub fn progress_quads(bar: &ProgressBar) -> Vec<OverlayVertex> {
    if !bar.visible() {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity(12);
    vertices.extend(quad(
        BAR_LEFT,
        -BAR_HALF_HEIGHT,
        BAR_LEFT + BAR_WIDTH,
        BAR_HALF_HEIGHT,
        TRACK_COLOR,
    ));
    if bar.scale_x() > 0.0 {
        vertices.extend(quad(
            BAR_LEFT,
            -BAR_HALF_HEIGHT,
            BAR_LEFT + BAR_WIDTH * bar.scale_x(),
            BAR_HALF_HEIGHT,
            FILL_COLOR,
        ));
    }
    vertices
}

/// GPU side of the overlay: a vertex buffer large enough for the progress bar.
#[derive(Debug)]
pub struct Overlay {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl Overlay {
    const CAPACITY: usize = 12;

    pub fn new(device: &wgpu::Device) -> Self {
        let empty = [OverlayVertex {
            position: [0.0; 2],
            color: [0.0; 4],
        }; Self::CAPACITY];
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(&empty),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            vertex_count: 0,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, bar: &ProgressBar) {
        let vertices = progress_quads(bar);
        let count = vertices.len().min(Self::CAPACITY);
        if count > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&vertices[..count]));
        }
        self.vertex_count = count as u32;
    }

    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>, pipeline: &'a wgpu::RenderPipeline) {
        if self.vertex_count == 0 {
            return;
        }
        render_pass.set_pipeline(pipeline);
        render_pass.set_vertex_buffer(0, self.buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

pub fn mk_overlay_pipeline(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Pipeline Layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("overlay.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Overlay Pipeline",
        Some(color_format),
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(depth_state(false, wgpu::CompareFunction::Always)),
        None,
        &[OverlayVertex::desc()],
        shader,
    )
}
