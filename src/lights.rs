//! The lighting rig: a hemisphere, a directional and a spot light.
//!
//! Lights live on the CPU as plain structs so the debug panel can edit them.
//! [`LightingResources::update`] packs them, together with fog and shadow
//! settings, into the scene uniform read by the Phong shader at group 2.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

use crate::{
    camera::{CameraUniform, OPENGL_TO_WGPU_MATRIX, up_for},
    config::ShadowConfig,
    data_structures::{color::Color, environment::Fog, texture::Texture},
    frame::FramePose,
    gui::{LightParam, ParamValue, Tweakable},
    pipelines::Layouts,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl DirectionalLight {
    /// Unit vector from the target towards the light.
    pub fn direction(&self) -> Vector3<f32> {
        towards(self.target, self.position)
    }
}

/// Shadow camera and map parameters of a spot light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotShadow {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub focus: f32,
    pub bias: f32,
}

impl Default for SpotShadow {
    fn default() -> Self {
        Self {
            map_size: 512,
            near: 0.5,
            far: 500.0,
            focus: 1.0,
            bias: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    /// Range of the light. Zero means unlimited.
    pub distance: f32,
    /// Half angle of the cone, in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub cast_shadow: bool,
    pub shadow: SpotShadow,
}

impl SpotLight {
    pub fn direction(&self) -> Vector3<f32> {
        towards(self.target, self.position)
    }

    /// Vertical field of view of the shadow camera.
    pub fn shadow_fov(&self) -> Rad<f32> {
        Rad(2.0 * self.angle * self.shadow.focus)
    }

    pub fn shadow_view(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let target = Point3::from_vec(self.target);
        let dir = if (target - eye).magnitude2() > 0.0 {
            target - eye
        } else {
            -Vector3::unit_y()
        };
        Matrix4::look_at_rh(eye, eye + dir, up_for(dir))
    }

    pub fn shadow_projection(&self) -> Matrix4<f32> {
        let fov = Rad(self.shadow_fov().0.clamp(0.001, std::f32::consts::PI - 0.001));
        OPENGL_TO_WGPU_MATRIX * perspective(fov, 1.0, self.shadow.near, self.shadow.far)
    }

    pub fn shadow_camera(&self) -> CameraUniform {
        CameraUniform::from_matrices(
            Point3::from_vec(self.position),
            self.shadow_view(),
            self.shadow_projection(),
        )
    }
}

fn towards(from: Vector3<f32>, to: Vector3<f32>) -> Vector3<f32> {
    let d = to - from;
    if d.magnitude2() > 0.0 {
        d.normalize()
    } else {
        Vector3::unit_y()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightRig {
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub spot: SpotLight,
}

impl LightRig {
    /// Lights of the garden.
    pub fn garden() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky_color: Color::from_hex(0xB1E1FF),
                ground_color: Color::from_hex(0xB97A20),
                intensity: 0.75,
            },
            directional: DirectionalLight {
                color: Color::from_hex(0xFFFFFF),
                intensity: 0.88,
                position: Vector3::new(0.0, 100.0, 0.0),
                target: Vector3::new(0.0, 0.0, 0.0),
            },
            spot: SpotLight {
                color: Color::from_hex(0xFFFFFF),
                intensity: 0.93,
                distance: 0.0,
                angle: std::f32::consts::FRAC_PI_4,
                penumbra: 0.03,
                decay: 2.0,
                position: Vector3::new(47.0, 22.0, -27.0),
                target: Vector3::new(-31.0, -36.0, 3.0),
                cast_shadow: true,
                shadow: SpotShadow::default(),
            },
        }
    }

    /// A single white directional light, as used by the heart scene.
    pub fn offscreen() -> Self {
        let garden = Self::garden();
        Self {
            hemisphere: HemisphereLight {
                intensity: 0.0,
                ..garden.hemisphere
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vector3::new(-1.0, 2.0, 4.0),
                target: Vector3::new(0.0, 0.0, 0.0),
            },
            spot: SpotLight {
                intensity: 0.0,
                cast_shadow: false,
                ..garden.spot
            },
        }
    }

    pub fn animate(&mut self, pose: &FramePose) {
        self.spot.position.x = pose.spot_x;
    }
}

impl Tweakable for LightRig {
    fn get(&self, param: LightParam) -> ParamValue {
        use LightParam::*;
        match param {
            HemisphereSkyColor => ParamValue::Color(self.hemisphere.sky_color),
            HemisphereGroundColor => ParamValue::Color(self.hemisphere.ground_color),
            HemisphereIntensity => ParamValue::Number(self.hemisphere.intensity),
            DirectionalColor => ParamValue::Color(self.directional.color),
            DirectionalIntensity => ParamValue::Number(self.directional.intensity),
            DirectionalPosition(axis) => ParamValue::Number(axis.get(&self.directional.position)),
            DirectionalTarget(axis) => ParamValue::Number(axis.get(&self.directional.target)),
            SpotColor => ParamValue::Color(self.spot.color),
            SpotIntensity => ParamValue::Number(self.spot.intensity),
            SpotAngle => ParamValue::Number(self.spot.angle),
            SpotPenumbra => ParamValue::Number(self.spot.penumbra),
            SpotPosition(axis) => ParamValue::Number(axis.get(&self.spot.position)),
            SpotTarget(axis) => ParamValue::Number(axis.get(&self.spot.target)),
        }
    }

    fn set(&mut self, param: LightParam, value: ParamValue) {
        use LightParam::*;
        match (param, value) {
            (HemisphereSkyColor, ParamValue::Color(c)) => self.hemisphere.sky_color = c,
            (HemisphereGroundColor, ParamValue::Color(c)) => self.hemisphere.ground_color = c,
            (HemisphereIntensity, ParamValue::Number(n)) => self.hemisphere.intensity = n,
            (DirectionalColor, ParamValue::Color(c)) => self.directional.color = c,
            (DirectionalIntensity, ParamValue::Number(n)) => self.directional.intensity = n,
            (DirectionalPosition(axis), ParamValue::Number(n)) => axis.set(&mut self.directional.position, n),
            (DirectionalTarget(axis), ParamValue::Number(n)) => axis.set(&mut self.directional.target, n),
            (SpotColor, ParamValue::Color(c)) => self.spot.color = c,
            (SpotIntensity, ParamValue::Number(n)) => self.spot.intensity = n,
            (SpotAngle, ParamValue::Number(n)) => self.spot.angle = n,
            (SpotPenumbra, ParamValue::Number(n)) => self.spot.penumbra = n,
            (SpotPosition(axis), ParamValue::Number(n)) => axis.set(&mut self.spot.position, n),
            (SpotTarget(axis), ParamValue::Number(n)) => axis.set(&mut self.spot.target, n),
            (param, value) => log::warn!("{param:?} cannot hold {value:?}"),
        }
    }
}

/// Lights, fog and shadow parameters as laid out in `phong.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub dir_color: [f32; 4],
    pub dir_direction: [f32; 4],
    pub spot_color: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_cone: [f32; 4],
    pub spot_view_proj: [[f32; 4]; 4],
    pub fog_color: [f32; 4],
    pub fog_range: [f32; 4],
}

impl SceneUniform {
    pub fn new(rig: &LightRig, fog: Option<&Fog>, shadows: &ShadowConfig) -> Self {
        let spot = &rig.spot;
        let shadows_on = shadows.enabled && spot.cast_shadow;
        let fog_color = fog.map_or([0.0; 4], |f| f.color.to_linear_with(1.0));
        let (fog_near, fog_far) = fog.map_or((0.0, 0.0), |f| (f.near, f.far));
        let spot_direction = spot.direction();
        Self {
            hemi_sky: rig.hemisphere.sky_color.to_linear_with(rig.hemisphere.intensity),
            hemi_ground: rig.hemisphere.ground_color.to_linear_with(0.0),
            dir_color: rig.directional.color.to_linear_with(rig.directional.intensity),
            dir_direction: rig.directional.direction().extend(0.0).into(),
            spot_color: spot.color.to_linear_with(spot.intensity),
            spot_position: spot.position.extend(spot.distance).into(),
            spot_direction: spot_direction.extend(spot.decay).into(),
            spot_cone: [
                spot.angle.cos(),
                (spot.angle * (1.0 - spot.penumbra)).cos(),
                if shadows_on { 1.0 } else { 0.0 },
                spot.shadow.bias,
            ],
            spot_view_proj: (spot.shadow_projection() * spot.shadow_view()).into(),
            fog_color,
            fog_range: [
                fog_near,
                fog_far,
                shadows.kind.pcf_radius(),
                1.0 / spot.shadow.map_size.max(1) as f32,
            ],
        }
    }
}

/// GPU side of a [`LightRig`]: the scene uniform, the spot light's shadow map
/// and the camera the shadow pass renders with.
#[derive(Debug)]
pub struct LightingResources {
    pub uniform: SceneUniform,
    pub buffer: wgpu::Buffer,
    pub shadow_map: Texture,
    pub bind_group: wgpu::BindGroup,
    pub shadow_camera: CameraUniform,
    pub shadow_camera_buffer: wgpu::Buffer,
    pub shadow_camera_bind_group: wgpu::BindGroup,
}

impl LightingResources {
    pub fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        rig: &LightRig,
        fog: Option<&Fog>,
        shadows: &ShadowConfig,
        label: &str,
    ) -> Self {
        let uniform = SceneUniform::new(rig, fog, shadows);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Scene Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let map_size = if shadows.enabled && rig.spot.cast_shadow {
            rig.spot.shadow.map_size
        } else {
            1
        };
        let shadow_map = Texture::create_shadow_map(device, map_size);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.scene,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
            label: Some(&format!("{label} scene_bind_group")),
        });

        let shadow_camera = rig.spot.shadow_camera();
        let shadow_camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Shadow Camera Buffer")),
            contents: bytemuck::cast_slice(&[shadow_camera]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_camera_buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} shadow_camera_bind_group")),
        });

        Self {
            uniform,
            buffer,
            shadow_map,
            bind_group,
            shadow_camera,
            shadow_camera_buffer,
            shadow_camera_bind_group,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, rig: &LightRig, fog: Option<&Fog>, shadows: &ShadowConfig) {
        self.uniform = SceneUniform::new(rig, fog, shadows);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        self.shadow_camera = rig.spot.shadow_camera();
        queue.write_buffer(
            &self.shadow_camera_buffer,
            0,
            bytemuck::cast_slice(&[self.shadow_camera]),
        );
    }

    /// Whether the shadow pass has anything to render into.
    pub fn casts_shadows(&self) -> bool {
        self.uniform.spot_cone[2] > 0.5
    }
}
