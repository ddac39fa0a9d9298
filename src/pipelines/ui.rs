//! Paints egui output into the main pass.
//!
//! [`UiBatch::collect`] turns egui's tessellated primitives into vertex and
//! index lists with a pixel scissor rect each. [`UiPainter`] keeps egui's
//! textures (the font atlas and anything else egui allocates), uploads the
//! batches every frame and draws them over the scene without depth testing.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::pipelines::basic::{depth_state, mk_render_pipeline};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Premultiplied sRGB.
    pub color: [u8; 4],
}

impl UiVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<UiVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
            ],
        }
    }
}

impl From<&egui::epaint::Vertex> for UiVertex {
    fn from(v: &egui::epaint::Vertex) -> Self {
        Self {
            position: [v.pos.x, v.pos.y],
            uv: [v.uv.x, v.uv.y],
            color: v.color.to_array(),
        }
    }
}

/// Size of the surface egui paints into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UiScreen {
    pub size_in_pixels: [u32; 2],
    pub pixels_per_point: f32,
}

impl UiScreen {
    pub fn size_in_points(&self) -> [f32; 2] {
        [
            self.size_in_pixels[0] as f32 / self.pixels_per_point,
            self.size_in_pixels[1] as f32 / self.pixels_per_point,
        ]
    }

    /// `clip` in pixels as `[x, y, width, height]`, cut to the screen. `None` when nothing is left.
    pub fn scissor(&self, clip: egui::Rect) -> Option<[u32; 4]> {
        let [width, height] = self.size_in_pixels;
        let to_px = |v: f32, max: u32| ((v * self.pixels_per_point).round().max(0.0) as u32).min(max);
        let (x0, y0) = (to_px(clip.min.x, width), to_px(clip.min.y, height));
        let (x1, y1) = (to_px(clip.max.x, width), to_px(clip.max.y, height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some([x0, y0, x1 - x0, y1 - y0])
    }
}

/// One mesh of the frame, ready for upload.
#[derive(Clone, Debug)]
pub struct UiBatch {
    pub vertices: Vec<UiVertex>,
    pub indices: Vec<u32>,
    pub texture: egui::TextureId,
    pub scissor: [u32; 4],
}

impl UiBatch {
    /// Meshes that are empty or clipped away entirely are skipped, as are paint callbacks.
    pub fn collect(primitives: &[egui::ClippedPrimitive], screen: &UiScreen) -> Vec<UiBatch> {
        primitives
            .iter()
            .filter_map(|clipped| {
                let egui::epaint::Primitive::Mesh(mesh) = &clipped.primitive else {
                    log::warn!("egui paint callbacks are not supported");
                    return None;
                };
                if mesh.indices.is_empty() {
                    return None;
                }
                let scissor = screen.scissor(clipped.clip_rect)?;
                Some(UiBatch {
                    vertices: mesh.vertices.iter().map(UiVertex::from).collect(),
                    indices: mesh.indices.clone(),
                    texture: mesh.texture_id,
                    scissor,
                })
            })
            .collect()
    }
}

#[derive(Debug)]
struct UiTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
struct UiDraw {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
    texture: egui::TextureId,
    scissor: [u32; 4],
}

#[derive(Debug)]
pub struct UiPainter {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
    textures: HashMap<egui::TextureId, UiTexture>,
    draws: Vec<UiDraw>,
}

impl UiPainter {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let screen_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("ui_screen_bind_group_layout"),
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("ui_texture_bind_group_layout"),
        });

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("UI Screen Buffer"),
            contents: bytemuck::cast_slice(&[1.0f32, 1.0, 0.0, 0.0]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &screen_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
            label: Some("ui_screen_bind_group"),
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("UI Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Pipeline Layout"),
            bind_group_layouts: &[&screen_layout, &texture_layout],
            immediate_size: 0,
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("ui.wgsl").into()),
        };
        // egui colors are premultiplied
        let blend = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::OneMinusDstAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };
        let pipeline = mk_render_pipeline(
            device,
            &layout,
            "UI Pipeline",
            Some(color_format),
            Some(blend),
            Some(depth_state(false, wgpu::CompareFunction::Always)),
            None,
            &[UiVertex::desc()],
            shader,
        );

        Self {
            pipeline,
            texture_layout,
            sampler,
            screen_buffer,
            screen_bind_group,
            textures: HashMap::new(),
            draws: Vec::new(),
        }
    }

    /// Applies the texture uploads of a frame. Frees happen in [`free_textures`](Self::free_textures)
    /// after the frame was submitted.
    pub fn update_textures(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, delta: &egui::TexturesDelta) {
        for (id, image_delta) in &delta.set {
            #[allow(irrefutable_let_patterns)]
            let egui::ImageData::Color(image) = &image_delta.image else {
                log::warn!("unsupported egui image for {id:?}");
                continue;
            };
            let [width, height] = image.size;
            let size = [width as u32, height as u32];
            let pixels: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
            let origin = match image_delta.pos {
                Some([x, y]) => {
                    if !self.textures.contains_key(id) {
                        log::warn!("partial update of unknown egui texture {id:?}");
                        continue;
                    }
                    [x as u32, y as u32]
                }
                None => {
                    let texture = self.create_texture(device, size);
                    self.textures.insert(*id, texture);
                    [0, 0]
                }
            };
            let Some(target) = self.textures.get(id) else {
                continue;
            };
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &target.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: origin[0],
                        y: origin[1],
                        z: 0,
                    },
                },
                &pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size[0]),
                    rows_per_image: Some(size[1]),
                },
                wgpu::Extent3d {
                    width: size[0],
                    height: size[1],
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    fn create_texture(&self, device: &wgpu::Device, [width, height]: [u32; 2]) -> UiTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("UI Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some("ui_texture_bind_group"),
        });
        UiTexture { texture, bind_group }
    }

    pub fn free_textures(&mut self, freed: &[egui::TextureId]) {
        for id in freed {
            if let Some(texture) = self.textures.remove(id) {
                texture.texture.destroy();
            }
        }
    }

    /// Uploads this frame's meshes. Must run before the pass that calls [`draw`](Self::draw).
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        primitives: &[egui::ClippedPrimitive],
        screen: &UiScreen,
    ) {
        let [width, height] = screen.size_in_points();
        queue.write_buffer(&self.screen_buffer, 0, bytemuck::cast_slice(&[width, height, 0.0, 0.0]));
        self.draws = UiBatch::collect(primitives, screen)
            .into_iter()
            .map(|batch| UiDraw {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Vertex Buffer"),
                    contents: bytemuck::cast_slice(&batch.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Index Buffer"),
                    contents: bytemuck::cast_slice(&batch.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                num_elements: batch.indices.len() as u32,
                texture: batch.texture,
                scissor: batch.scissor,
            })
            .collect();
    }

    /// Draws the prepared meshes. Leaves the scissor rect covering the last mesh.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.draws.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
        for draw in &self.draws {
            let Some(texture) = self.textures.get(&draw.texture) else {
                log::warn!("egui mesh references unknown texture {:?}", draw.texture);
                continue;
            };
            let [x, y, w, h] = draw.scissor;
            render_pass.set_scissor_rect(x, y, w, h);
            render_pass.set_bind_group(1, &texture.bind_group, &[]);
            render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.num_elements, 0, 0..1);
        }
    }
}
