//! Meshes, Phong materials and the draw helpers for instanced models.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::{color::Color, texture::Texture};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Which faces of a mesh are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Parameters of a Phong material before it is uploaded.
#[derive(Clone, Debug)]
pub struct PhongMaterial {
    pub color: Color,
    pub side: Side,
    pub uv_repeat: [f32; 2],
    pub shininess: f32,
    pub receive_shadow: bool,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            side: Side::Front,
            uv_repeat: [1.0, 1.0],
            shininess: 30.0,
            receive_shadow: false,
        }
    }
}

impl PhongMaterial {
    pub fn colored(hex: u32) -> Self {
        Self {
            color: Color::from_hex(hex),
            ..Default::default()
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 4],
    uv_repeat: [f32; 2],
    shininess: f32,
    flags: u32,
}

impl MaterialUniform {
    pub const NORMAL_MAP: u32 = 1;
    pub const RECEIVE_SHADOW: u32 = 2;

    pub fn new(params: &PhongMaterial, has_normal_map: bool) -> Self {
        let mut flags = 0;
        if has_normal_map {
            flags |= Self::NORMAL_MAP;
        }
        if params.receive_shadow {
            flags |= Self::RECEIVE_SHADOW;
        }
        Self {
            color: params.color.to_linear_with(1.0),
            uv_repeat: params.uv_repeat,
            shininess: params.shininess,
            flags,
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub params: PhongMaterial,
    pub diffuse_texture: Texture,
    pub normal_texture: Texture,
    has_normal_map: bool,
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        params: PhongMaterial,
        diffuse_texture: Texture,
        normal_texture: Option<Texture>,
        placeholder_normal: &Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let has_normal_map = normal_texture.is_some();
        let normal_texture = normal_texture.unwrap_or_else(|| placeholder_normal.clone());
        let uniform = MaterialUniform::new(&params, has_normal_map);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Material Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(device, name, layout, &diffuse_texture, &normal_texture, &buffer);
        Self {
            name: name.to_string(),
            params,
            diffuse_texture,
            normal_texture,
            has_normal_map,
            buffer,
            layout: layout.clone(),
            bind_group,
        }
    }

    pub fn has_normal_map(&self) -> bool {
        self.has_normal_map
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform::new(&self.params, self.has_normal_map)
    }

    fn rebind(&mut self, device: &wgpu::Device) {
        self.bind_group = mk_bind_group(
            device,
            &self.name,
            &self.layout,
            &self.diffuse_texture,
            &self.normal_texture,
            &self.buffer,
        );
    }

    fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform()]));
    }

    /// Replaces the color map. The material color keeps tinting it.
    pub fn set_map(&mut self, device: &wgpu::Device, texture: Texture) {
        self.diffuse_texture = texture;
        self.rebind(device);
    }

    pub fn set_normal_map(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, texture: Texture) {
        self.normal_texture = texture;
        self.has_normal_map = true;
        self.rebind(device);
        self.upload(queue);
    }

    /// A copy with its own uniform buffer, so the tint does not leak into `self`.
    pub fn with_color(&self, device: &wgpu::Device, color: Color) -> Self {
        let params = PhongMaterial {
            color,
            ..self.params.clone()
        };
        let uniform = MaterialUniform::new(&params, self.has_normal_map);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Buffer", self.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(
            device,
            &self.name,
            &self.layout,
            &self.diffuse_texture,
            &self.normal_texture,
            &buffer,
        );
        Self {
            name: self.name.clone(),
            params,
            diffuse_texture: self.diffuse_texture.clone(),
            normal_texture: self.normal_texture.clone(),
            has_normal_map: self.has_normal_map,
            buffer,
            layout: self.layout.clone(),
            bind_group,
        }
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    name: &str,
    layout: &wgpu::BindGroupLayout,
    diffuse: &Texture,
    normal: &Texture,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&normal.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: buffer.as_entire_binding(),
            },
        ],
        label: Some(name),
    })
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
}

#[derive(Clone, Debug)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    /// Shares the vertex data and gives every material `color`.
    pub fn tinted(&self, device: &wgpu::Device, color: Color) -> Model {
        Model {
            meshes: self.meshes.clone(),
            materials: self
                .materials
                .iter()
                .map(|m| m.with_color(device, color))
                .collect(),
        }
    }

    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        self.materials.get(mesh.material)
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        material: &'a Material,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        scene_bind_group: &'a wgpu::BindGroup,
    );

    fn draw_model_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        scene_bind_group: &'a wgpu::BindGroup,
    );

    /// Geometry only, for depth passes with the camera at group 0.
    fn draw_model_depth_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        material: &'b Material,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        scene_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, scene_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_model_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        scene_bind_group: &'b wgpu::BindGroup,
    ) {
        for mesh in &model.meshes {
            let Some(material) = model.material_for(mesh) else {
                log::warn!("mesh {} references a missing material", mesh.name);
                continue;
            };
            self.draw_mesh_instanced(
                mesh,
                material,
                instances.clone(),
                camera_bind_group,
                scene_bind_group,
            );
        }
    }

    fn draw_model_depth_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_bind_group(0, camera_bind_group, &[]);
        for mesh in &model.meshes {
            self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            self.draw_indexed(0..mesh.num_elements, 0, instances.clone());
        }
    }
}
