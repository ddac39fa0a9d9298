//! The render-to-texture scene: five spinning hearts on a blue background.
//!
//! It is drawn into a 512x512 color target every frame before the main pass,
//! and the pagoda orbs sample that target as their color map.

use cgmath::Deg;

use crate::{
    camera::{Camera, CameraResources, Projection},
    config::ShadowConfig,
    data_structures::{
        color::Color,
        environment::Background,
        geometry::Geometry,
        instance::Instance,
        model::{Material, Model, PhongMaterial},
        scene_graph::{ModelNode, NodeHandle, Scene, SceneNode},
        shape::{ExtrudeSettings, Shape, extrude},
        texture::{Placeholders, Texture},
    },
    frame::{FramePose, HEART_COUNT},
    lights::{LightRig, LightingResources},
    pipelines::{Layouts, basic::PhongPipelines},
    render::draw_opaque,
};

pub const TARGET_SIZE: u32 = 512;
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const HEART_COLOR: u32 = 0xEFA8B8;
pub const HEART_SCALE: f32 = 0.05;
/// Resting x position of each heart before the first frame moves them.
pub const HEART_X: [f32; HEART_COUNT] = [-4.0, -2.0, 0.0, 2.0, 4.0];

/// The heart outline, offset so its notch sits near the origin.
pub fn heart_shape() -> Shape {
    let (x, y) = (-2.5, -5.0);
    let mut shape = Shape::new();
    shape
        .move_to(x + 2.5, y + 2.5)
        .bezier_curve_to(x + 2.5, y + 2.5, x + 2.0, y, x, y)
        .bezier_curve_to(x - 3.0, y, x - 3.0, y + 3.5, x - 3.0, y + 3.5)
        .bezier_curve_to(x - 3.0, y + 5.5, x - 1.5, y + 7.7, x + 2.5, y + 9.5)
        .bezier_curve_to(x + 6.0, y + 7.7, x + 8.0, y + 4.5, x + 8.0, y + 3.5)
        .bezier_curve_to(x + 8.0, y + 3.5, x + 8.0, y, x + 5.0, y)
        .bezier_curve_to(x + 3.5, y, x + 2.5, y + 2.5, x + 2.5, y + 2.5);
    shape
}

pub fn heart_extrusion() -> ExtrudeSettings {
    ExtrudeSettings {
        curve_segments: 12,
        steps: 2,
        depth: 2.0,
        bevel_enabled: true,
        bevel_thickness: 1.0,
        bevel_size: 1.0,
        bevel_segments: 2,
    }
}

pub fn heart_geometry() -> Geometry {
    extrude(&heart_shape(), &heart_extrusion())
}

/// Local transform of heart `index` for a frame.
pub fn heart_instance(pose: &FramePose, index: usize) -> Instance {
    let heart = &pose.hearts[index];
    let p = heart.position;
    Instance::at(p.x, p.y, p.z)
        .with_rotation(Instance::euler_xyz(heart.rotation.x, heart.rotation.y, heart.rotation.z))
        .with_uniform_scale(HEART_SCALE)
}

pub struct OffscreenScene {
    target: Texture,
    depth: Texture,
    scene: Scene,
    hearts: NodeHandle,
    camera: CameraResources,
    lighting: LightingResources,
    pipelines: PhongPipelines,
}

impl OffscreenScene {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, placeholders: &Placeholders) -> Self {
        let size = [TARGET_SIZE, TARGET_SIZE];
        let target = Texture::create_render_target(device, size, TARGET_FORMAT, "heart_target");
        let depth = Texture::create_depth_texture(device, size, "heart_depth");

        let camera = CameraResources::new(
            device,
            &layouts.camera,
            Camera::new((0.0, 0.0, 3.0), (0.0, 0.0, 0.0)),
            Projection::new(TARGET_SIZE, TARGET_SIZE, Deg(75.0), 0.01, 50.0),
            "heart",
        );

        // the heart lights are static, so the uniform is written once
        let no_shadows = ShadowConfig {
            enabled: false,
            ..Default::default()
        };
        let lighting = LightingResources::new(device, layouts, &LightRig::offscreen(), None, &no_shadows, "heart");

        let material = Material::new(
            device,
            "heart",
            PhongMaterial::colored(HEART_COLOR),
            placeholders.white.clone(),
            None,
            &placeholders.flat_normal,
            &layouts.material,
        );
        let model = Model {
            meshes: vec![heart_geometry().to_mesh(device, "heart", 0)],
            materials: vec![material],
        };
        let mut node = ModelNode::from_model(HEART_COUNT, device, model);
        for (i, x) in HEART_X.iter().enumerate() {
            node.set_local_transform(i, Instance::at(*x, 0.0, 0.0).with_uniform_scale(HEART_SCALE));
        }

        let mut scene = Scene::new(Background::Color(Color::BLUE), None);
        let hearts = scene.add(Box::new(node));

        Self {
            target,
            depth,
            scene,
            hearts,
            camera,
            lighting,
            pipelines: PhongPipelines::new(device, layouts, TARGET_FORMAT),
        }
    }

    /// The color target the hearts are drawn into.
    pub fn texture(&self) -> &Texture {
        &self.target
    }

    pub fn animate(&mut self, pose: &FramePose) {
        if let Some(node) = self.scene.node_mut(self.hearts) {
            for i in 0..HEART_COUNT {
                node.set_local_transform(i, heart_instance(pose, i));
            }
        }
    }

    /// Uploads this frame's transforms and records the pass into `encoder`.
    pub fn render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) {
        self.scene.update_world_transforms();
        self.scene.write_to_buffers(queue, device);
        self.camera.update(queue);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Heart Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.scene.background.clear_color()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        let batches = self.scene.get_render().into_batches();
        draw_opaque(
            &mut render_pass,
            &self.pipelines,
            &batches,
            &self.camera.bind_group,
            &self.lighting.bind_group,
        );
    }
}
