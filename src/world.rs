//! The garden: ground, centerpiece, pagodas, balloons and the fruit tree.
//!
//! Layout constants are public so the placement can be checked without a GPU.
//! [`World::build`] creates everything that needs no downloaded asset. Maps and
//! models are attached later through [`World::apply_texture`],
//! [`World::add_balloons`] and [`World::add_tree`] as their loads finish.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Quaternion, Rad, Rotation3, Vector3};

use crate::{
    data_structures::{
        color::Color,
        environment::{Background, Fog},
        geometry::Geometry,
        instance::Instance,
        model::{Material, Model, PhongMaterial, Side},
        scene_graph::{ContainerNode, ModelNode, NodeHandle, Scene, SceneNode},
        texture::{Placeholders, Sampling, Texture},
    },
    frame::FramePose,
};

pub const GROUND_SIZE: f32 = 200.0;
/// World units covered by one repeat of the grass texture.
pub const GROUND_TILE: f32 = 20.0;
pub const CENTERPIECE_HEIGHT: f32 = 0.51;

pub const PAGODA_SPACING: f32 = 30.0;
pub const PAGODAS_PER_DIRECTION: u32 = 3;

/// Unit steps along the principal axes and the diagonals, in the xz plane.
pub const DIRECTIONS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
];

/// Ground positions of all pagodas.
pub fn pagoda_sites() -> Vec<Vector3<f32>> {
    DIRECTIONS
        .iter()
        .flat_map(|&(dx, dz)| {
            (1..=PAGODAS_PER_DIRECTION).map(move |i| {
                let step = i as f32 * PAGODA_SPACING;
                Vector3::new(dx * step, 0.0, dz * step)
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PartShape {
    Cone { radius: f32, height: f32, segments: u32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, segments: u32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl PartShape {
    pub fn geometry(&self) -> Geometry {
        match *self {
            PartShape::Cone { radius, height, segments } => Geometry::cone(radius, height, segments),
            PartShape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Geometry::sphere(radius, width_segments, height_segments),
            PartShape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => Geometry::cylinder(radius_top, radius_bottom, height, segments),
            PartShape::Box { width, height, depth } => Geometry::cuboid(width, height, depth),
        }
    }
}

/// What a pagoda part is textured with besides its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartSurface {
    Plain,
    /// The offscreen heart scene.
    RenderTarget,
    NormalMap(TextureSlot),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagodaPart {
    pub name: &'static str,
    pub shape: PartShape,
    pub color: u32,
    /// Height above the pagoda's ground position.
    pub offset_y: f32,
    pub surface: PartSurface,
}

pub const PAGODA_PARTS: [PagodaPart; 4] = [
    PagodaPart {
        name: "roof",
        shape: PartShape::Cone {
            radius: 3.0,
            height: 4.0,
            segments: 16,
        },
        color: 0xEEDA03,
        offset_y: 15.0,
        surface: PartSurface::Plain,
    },
    PagodaPart {
        name: "orb",
        shape: PartShape::Sphere {
            radius: 4.0,
            width_segments: 12,
            height_segments: 12,
        },
        color: 0xC4A287,
        offset_y: 11.0,
        surface: PartSurface::RenderTarget,
    },
    PagodaPart {
        name: "tower",
        shape: PartShape::Cylinder {
            radius_top: 4.0,
            radius_bottom: 6.0,
            height: 9.0,
            segments: 15,
        },
        color: 0xD45113,
        offset_y: 4.0,
        surface: PartSurface::NormalMap(TextureSlot::BaseNormal),
    },
    PagodaPart {
        name: "base",
        shape: PartShape::Box {
            width: 15.0,
            height: 3.0,
            depth: 15.0,
        },
        color: 0x813405,
        offset_y: 1.0,
        surface: PartSurface::NormalMap(TextureSlot::MidNormal),
    },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Balloon {
    pub position: [f32; 3],
    pub color: u32,
}

pub const BALLOON_SCALE: f32 = 0.2;

pub const BALLOONS: [Balloon; 8] = [
    Balloon {
        position: [10.0, -80.0, 5.0],
        color: 0x6E3FD5,
    },
    Balloon {
        position: [62.0, -80.0, -5.0],
        color: 0x465362,
    },
    Balloon {
        position: [110.0, -80.0, -26.0],
        color: 0xA5D8FF,
    },
    Balloon {
        position: [94.0, -80.0, -82.0],
        color: 0x70F8BA,
    },
    Balloon {
        position: [53.0, -80.0, -117.0],
        color: 0xCAFE48,
    },
    Balloon {
        position: [6.0, -80.0, -102.0],
        color: 0xFC7753,
    },
    Balloon {
        position: [-39.0, -80.0, -87.0],
        color: 0x4281A4,
    },
    Balloon {
        position: [-21.0, -80.0, -19.0],
        color: 0xE4959E,
    },
];

pub const TREE_SCALE: f32 = 0.0019;
pub const TREE_POSITION: [f32; 3] = [-40.0, 0.0, -70.0];

/// Six cube faces in +x, -x, +y, -y, +z, -z order.
pub const SKYBOX_FACES: [&str; 6] = [
    "textures/miramar_ft.jpg",
    "textures/miramar_bk.jpg",
    "textures/miramar_up.jpg",
    "textures/miramar_dn.jpg",
    "textures/miramar_rt.jpg",
    "textures/miramar_lf.jpg",
];

/// The textures whose loads are tracked by the progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Grass,
    Center,
    BaseNormal,
    MidNormal,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Grass,
        TextureSlot::Center,
        TextureSlot::BaseNormal,
        TextureSlot::MidNormal,
    ];

    pub fn url(&self) -> &'static str {
        match self {
            TextureSlot::Grass => "textures/grass.jpg",
            TextureSlot::Center => "textures/center.jpg",
            TextureSlot::BaseNormal => "textures/NormalMap3.png",
            TextureSlot::MidNormal => "textures/NormalMap2.png",
        }
    }

    pub fn is_normal_map(&self) -> bool {
        matches!(self, TextureSlot::BaseNormal | TextureSlot::MidNormal)
    }

    pub fn sampling(&self) -> Sampling {
        match self {
            TextureSlot::Grass => Sampling::repeat_nearest(),
            _ => Sampling::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Balloon,
    Tree,
}

impl ModelKind {
    pub fn url(&self) -> &'static str {
        match self {
            ModelKind::Balloon => "models/hotballoon.obj",
            ModelKind::Tree => "models/fruit-tree.obj",
        }
    }
}

fn single_mesh_model(device: &wgpu::Device, name: &str, geometry: &Geometry, material: Material) -> Model {
    Model {
        meshes: vec![geometry.to_mesh(device, name, 0)],
        materials: vec![material],
    }
}

pub struct World {
    pub scene: Scene,
    ground: NodeHandle,
    centerpiece: NodeHandle,
    pagodas: NodeHandle,
    balloons: Option<NodeHandle>,
    tree: Option<NodeHandle>,
}

impl World {
    pub fn build(
        device: &wgpu::Device,
        layouts: &crate::pipelines::Layouts,
        placeholders: &Placeholders,
        render_target: &Texture,
        fog: Option<Fog>,
    ) -> Self {
        let mut scene = Scene::new(Background::default(), fog);
        let material = |name: &str, params: PhongMaterial, diffuse: &Texture| {
            Material::new(
                device,
                name,
                params,
                diffuse.clone(),
                None,
                &placeholders.flat_normal,
                &layouts.material,
            )
        };

        let repeats = GROUND_SIZE / GROUND_TILE;
        let ground_material = material(
            "ground",
            PhongMaterial {
                side: Side::Double,
                uv_repeat: [repeats, repeats],
                receive_shadow: true,
                ..Default::default()
            },
            &placeholders.white,
        );
        let mut ground = ModelNode::from_model(
            1,
            device,
            single_mesh_model(device, "ground", &Geometry::plane(GROUND_SIZE, GROUND_SIZE), ground_material),
        );
        ground.set_local_transform(0, Instance::new().with_rotation(Quaternion::from_angle_x(Rad(-FRAC_PI_2))));
        let ground = scene.add(Box::new(ground));

        let center_material = material(
            "centerpiece",
            PhongMaterial {
                side: Side::Double,
                ..Default::default()
            },
            &placeholders.white,
        );
        let mut centerpiece = ModelNode::from_model(
            1,
            device,
            single_mesh_model(device, "centerpiece", &Geometry::cylinder(4.0, 5.0, 1.0, 6), center_material),
        )
        .casting_shadow();
        centerpiece.set_local_transform(0, Instance::at(0.0, CENTERPIECE_HEIGHT, 0.0));
        let centerpiece = scene.add(Box::new(centerpiece));

        let mut pagodas = ContainerNode::new(0);
        for part in &PAGODA_PARTS {
            let diffuse = match part.surface {
                PartSurface::RenderTarget => render_target,
                _ => &placeholders.white,
            };
            let part_material = material(part.name, PhongMaterial::colored(part.color), diffuse);
            let model = single_mesh_model(device, part.name, &part.shape.geometry(), part_material);
            pagodas.add_child(Box::new(ModelNode::from_model(0, device, model).casting_shadow()));
        }
        pagodas.add_instances(
            pagoda_sites()
                .into_iter()
                .map(|site| Instance::at(site.x, site.y, site.z))
                .collect(),
        );
        for (child, part) in pagodas.children.iter_mut().zip(PAGODA_PARTS.iter()) {
            child.set_local_transform_all(&mut |local| *local = Instance::at(0.0, part.offset_y, 0.0));
        }
        let pagodas = scene.add(Box::new(pagodas));

        Self {
            scene,
            ground,
            centerpiece,
            pagodas,
            balloons: None,
            tree: None,
        }
    }

    fn model_of(&mut self, handle: NodeHandle) -> Option<&mut Model> {
        self.scene.node_mut(handle)?.model_mut()
    }

    fn pagoda_part(&mut self, index: usize) -> Option<&mut Model> {
        self.scene
            .node_mut(self.pagodas)?
            .get_children_mut()
            .get_mut(index)?
            .model_mut()
    }

    /// Attaches a finished texture load to every material waiting for it.
    pub fn apply_texture(&mut self, slot: TextureSlot, texture: Texture, device: &wgpu::Device, queue: &wgpu::Queue) {
        let model = match slot {
            TextureSlot::Grass => self.model_of(self.ground),
            TextureSlot::Center => self.model_of(self.centerpiece),
            TextureSlot::BaseNormal | TextureSlot::MidNormal => {
                let index = PAGODA_PARTS
                    .iter()
                    .position(|part| part.surface == PartSurface::NormalMap(slot));
                match index {
                    Some(index) => self.pagoda_part(index),
                    None => None,
                }
            }
        };
        let Some(model) = model else {
            log::warn!("no material waits for {}", slot.url());
            return;
        };
        for material in model.materials.iter_mut() {
            if slot.is_normal_map() {
                material.set_normal_map(device, queue, texture.clone());
            } else {
                material.set_map(device, texture.clone());
            }
        }
        log::info!("applied {}", slot.url());
    }

    /// Places a tinted copy of `model` at every balloon position.
    pub fn add_balloons(&mut self, device: &wgpu::Device, model: &Model) {
        let mut balloons = ContainerNode::new(1);
        for balloon in &BALLOONS {
            let [x, y, z] = balloon.position;
            let mut node = ModelNode::from_model(1, device, model.tinted(device, Color::from_hex(balloon.color)));
            node.set_local_transform(0, Instance::at(x, y, z).with_uniform_scale(BALLOON_SCALE));
            balloons.add_child(Box::new(node));
        }
        self.balloons = Some(self.scene.add(Box::new(balloons)));
    }

    pub fn add_tree(&mut self, device: &wgpu::Device, model: Model) {
        let [x, y, z] = TREE_POSITION;
        let mut tree = ModelNode::from_model(1, device, model);
        tree.set_local_transform(0, Instance::at(x, y, z).with_uniform_scale(TREE_SCALE));
        self.tree = Some(self.scene.add(Box::new(tree)));
    }

    pub fn set_background(&mut self, background: Background) {
        self.scene.background = background;
    }

    pub fn has_balloons(&self) -> bool {
        self.balloons.is_some()
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn animate(&mut self, pose: &FramePose) {
        if let Some(node) = self.scene.node_mut(self.centerpiece) {
            node.set_local_transform(
                0,
                Instance::at(0.0, CENTERPIECE_HEIGHT, 0.0).with_rotation(Quaternion::from_angle_y(Rad(pose.centerpiece_yaw))),
            );
        }
    }

    /// Propagates transforms and uploads every instance buffer.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.scene.update_world_transforms();
        self.scene.write_to_buffers(queue, device);
    }

    pub fn pagoda_count(&self) -> usize {
        self.scene
            .node(self.pagodas)
            .map_or(0, |node| node.instance_count())
    }
}
