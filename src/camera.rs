//! Perspective cameras, the orbit controller and the camera uniform.
//!
//! The camera itself is just an eye and a point it looks at. The
//! [`OrbitController`] collects mouse input between frames and moves the eye
//! on a sphere around the target when [`OrbitController::update`] runs.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 0.000_001;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, up_for(self.target - self.position))
    }

    pub fn forward(&self) -> Vector3<f32> {
        let dir = self.target - self.position;
        if dir.magnitude2() > 0.0 {
            dir.normalize()
        } else {
            -Vector3::unit_z()
        }
    }

    /// Camera space x and y axes in world space.
    pub fn right_and_up(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward.cross(up_for(forward)).normalize();
        let up = right.cross(forward);
        (right, up)
    }
}

/// World up, unless the view direction is parallel to it.
pub(crate) fn up_for(direction: Vector3<f32>) -> Vector3<f32> {
    let dir = direction.normalize();
    if dir.x.abs() < EPS && dir.z.abs() < EPS {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// Clip space back to a world direction, ignoring the eye position.
    pub sky_inv: [[f32; 4]; 4],
    /// World to camera space, for view depth.
    pub view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
            sky_inv: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }

    pub fn from_matrices(position: Point3<f32>, view: Matrix4<f32>, proj: Matrix4<f32>) -> Self {
        let mut rotation_only = view;
        rotation_only.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        let sky_inv = (proj * rotation_only).invert().unwrap_or_else(Matrix4::identity);
        Self {
            view_position: position.to_homogeneous().into(),
            view_proj: (proj * view).into(),
            sky_inv: sky_inv.into(),
            view: view.into(),
        }
    }

    /// Distance of `point` in front of the eye along the view axis, as the fog uses it.
    pub fn view_depth(&self, point: Point3<f32>) -> f32 {
        -(Matrix4::from(self.view) * point.to_homogeneous()).z
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        *self = Self::from_matrices(camera.position, camera.calc_matrix(), projection.calc_matrix());
    }
}

/// Orbits, pans and dollies a [`Camera`] around its target with the mouse.
///
/// Left drag rotates, right drag pans, the wheel zooms. Deltas accumulate
/// until the next [`update`](Self::update) and are applied without damping.
#[derive(Clone, Debug)]
pub struct OrbitController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    cursor: Option<(f64, f64)>,
    rotating: bool,
    panning: bool,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            cursor: None,
            rotating: false,
            panning: false,
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Rotates by a cursor movement of `dx`, `dy` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.theta_delta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.phi_delta -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Positive steps move the camera closer to the target.
    pub fn zoom(&mut self, steps: f32) {
        if steps > 0.0 {
            self.scale *= self.zoom_scale().powf(steps);
        } else if steps < 0.0 {
            self.scale /= self.zoom_scale().powf(-steps);
        }
    }

    /// Slides eye and target so the scene follows the cursor.
    pub fn pan(&mut self, camera: &Camera, projection: &Projection, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        let offset = camera.position - camera.target;
        let target_distance = offset.magnitude() * (projection.fovy.0 / 2.0).tan();
        let (right, up) = camera.right_and_up();
        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let upward = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += right * -left + up * upward;
    }

    /// Applies and clears everything accumulated since the last call.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let mut radius = offset.magnitude();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };

        theta += self.theta_delta;
        phi = (phi + self.phi_delta).clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset;
        let sin_phi_radius = phi.sin() * radius;
        let new_offset = Vector3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );
        camera.position = camera.target + new_offset;

        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
    }

    /// Feeds a window event in. Returns whether the controller used it.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        height: f32,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.cursor.replace(current);
                if let Some((x, y)) = previous {
                    let (dx, dy) = ((current.0 - x) as f32, (current.1 - y) as f32);
                    if self.rotating {
                        self.rotate(dx, dy, height);
                    } else if self.panning {
                        self.pan(camera, projection, dx, dy, height);
                    }
                }
                self.rotating || self.panning
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.rotating = false;
                self.panning = false;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 50.0) as f32,
                };
                self.zoom(steps);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub projection: Projection,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: Camera,
        projection: Projection,
        label: &str,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Camera Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} camera_bind_group")),
        });
        Self {
            camera,
            projection,
            controller: OrbitController::new(),
            uniform,
            buffer,
            bind_group,
        }
    }

    /// The main view camera as configured, for a surface of `width` x `height`.
    pub fn from_config(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        config: &CameraConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let camera = Camera::new(config.position, config.target);
        let projection = Projection::new(
            width,
            height,
            cgmath::Deg(config.fov_degrees),
            config.near,
            config.far,
        );
        Self::new(device, layout, camera, projection, "main")
    }

    /// Applies pending orbit input and uploads the uniform.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        self.controller.update(&mut self.camera);
        self.uniform.update_view_proj(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
