//! Scene-wide state that is not a node: fog and what is drawn behind everything.

use crate::data_structures::{color::Color, texture::Texture};

/// Linear distance fog between `near` and `far`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn new(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// How much of the fog color replaces a fragment `distance` units in front of
    /// the eye, measured along the view axis.
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        let t = ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// A loaded cube map bound for the sky pipeline.
#[derive(Debug)]
pub struct Skybox {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Skybox {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, texture: Texture) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("skybox_bind_group"),
        });
        Self {
            texture,
            bind_group,
        }
    }
}

#[derive(Debug)]
pub enum Background {
    Color(Color),
    Skybox(Skybox),
}

impl Background {
    /// The color the target is cleared to. Skyboxes cover it completely.
    pub fn clear_color(&self) -> wgpu::Color {
        match self {
            Background::Color(color) => (*color).into(),
            Background::Skybox(_) => wgpu::Color::BLACK,
        }
    }

    pub fn skybox(&self) -> Option<&Skybox> {
        match self {
            Background::Skybox(skybox) => Some(skybox),
            Background::Color(_) => None,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Color::rgb(0.0, 0.0, 0.0))
    }
}
