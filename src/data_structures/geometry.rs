//! CPU-side primitive meshes.
//!
//! The generators follow the vertex order, winding and UV layout of the usual
//! scene-graph primitives (plane, box, cylinder/cone, UV sphere), so textures and
//! normal maps authored for those land the same way. UVs are stored with `v`
//! flipped because wgpu samples with the origin in the top-left corner.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector2, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model::{self, ModelVertex};

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        self.vertices.push(ModelVertex {
            position,
            tex_coords: [uv[0], 1.0 - uv[1]],
            normal,
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        });
        (self.vertices.len() - 1) as u32
    }

    /// Flat plane in the XY plane facing +z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Self::default();
        let (half_w, half_h) = (width / 2.0, height / 2.0);
        for iy in 0..=1u32 {
            let y = iy as f32 * height - half_h;
            for ix in 0..=1u32 {
                let x = ix as f32 * width - half_w;
                geometry.push_vertex([x, -y, 0.0], [0.0, 0.0, 1.0], [ix as f32, 1.0 - iy as f32]);
            }
        }
        let (a, b, c, d) = (0, 2, 3, 1);
        geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        geometry.compute_tangents();
        geometry
    }

    /// Axis aligned box centered at the origin, one quad per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let mut geometry = Self::default();
        // (u, v, w) axis indices, u/v directions and face extents
        geometry.box_face([2, 1, 0], -1.0, -1.0, depth, height, width);
        geometry.box_face([2, 1, 0], 1.0, -1.0, depth, height, -width);
        geometry.box_face([0, 2, 1], 1.0, 1.0, width, depth, height);
        geometry.box_face([0, 2, 1], 1.0, -1.0, width, depth, -height);
        geometry.box_face([0, 1, 2], 1.0, -1.0, width, height, depth);
        geometry.box_face([0, 1, 2], -1.0, -1.0, width, height, -depth);
        geometry.compute_tangents();
        geometry
    }

    fn box_face(
        &mut self,
        [u, v, w]: [usize; 3],
        u_dir: f32,
        v_dir: f32,
        width: f32,
        height: f32,
        depth: f32,
    ) {
        let start = self.vertices.len() as u32;
        let (half_w, half_h, half_d) = (width / 2.0, height / 2.0, depth / 2.0);
        for iy in 0..=1u32 {
            let y = iy as f32 * height - half_h;
            for ix in 0..=1u32 {
                let x = ix as f32 * width - half_w;
                let mut position = [0.0; 3];
                position[u] = x * u_dir;
                position[v] = y * v_dir;
                position[w] = half_d;
                let mut normal = [0.0; 3];
                normal[w] = if depth > 0.0 { 1.0 } else { -1.0 };
                self.push_vertex(position, normal, [ix as f32, 1.0 - iy as f32]);
            }
        }
        let (a, b, c, d) = (start, start + 2, start + 3, start + 1);
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    /// Cylinder along the y axis. A zero radius drops that cap, which is how cones are built.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let mut geometry = Self::default();
        let segments = radial_segments.max(3);
        let half_height = height / 2.0;
        let slope = (radius_bottom - radius_top) / height;

        let mut rows: Vec<Vec<u32>> = Vec::with_capacity(2);
        for y in 0..=1u32 {
            let v = y as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            let row = (0..=segments)
                .map(|x| {
                    let u = x as f32 / segments as f32;
                    let theta = u * 2.0 * PI;
                    let (sin, cos) = theta.sin_cos();
                    let normal = Vector3::new(sin, slope, cos).normalize();
                    geometry.push_vertex(
                        [radius * sin, -v * height + half_height, radius * cos],
                        normal.into(),
                        [u, 1.0 - v],
                    )
                })
                .collect();
            rows.push(row);
        }
        for x in 0..segments as usize {
            let (a, b) = (rows[0][x], rows[1][x]);
            let (c, d) = (rows[1][x + 1], rows[0][x + 1]);
            // degenerate triangles at a pointed tip are skipped
            if radius_top > 0.0 {
                geometry.indices.extend_from_slice(&[a, b, d]);
            }
            if radius_bottom > 0.0 {
                geometry.indices.extend_from_slice(&[b, c, d]);
            }
        }

        if radius_top > 0.0 {
            geometry.cap(radius_top, half_height, segments, true);
        }
        if radius_bottom > 0.0 {
            geometry.cap(radius_bottom, half_height, segments, false);
        }
        geometry.compute_tangents();
        geometry
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, radial_segments)
    }

    fn cap(&mut self, radius: f32, half_height: f32, segments: u32, top: bool) {
        let sign = if top { 1.0 } else { -1.0 };
        let center_start = self.vertices.len() as u32;
        for _ in 0..segments {
            self.push_vertex([0.0, half_height * sign, 0.0], [0.0, sign, 0.0], [0.5, 0.5]);
        }
        let rim_start = self.vertices.len() as u32;
        for x in 0..=segments {
            let theta = x as f32 / segments as f32 * 2.0 * PI;
            let (sin, cos) = theta.sin_cos();
            self.push_vertex(
                [radius * sin, half_height * sign, radius * cos],
                [0.0, sign, 0.0],
                [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
            );
        }
        for x in 0..segments {
            let center = center_start + x;
            let rim = rim_start + x;
            if top {
                self.indices.extend_from_slice(&[rim, rim + 1, center]);
            } else {
                self.indices.extend_from_slice(&[rim + 1, rim, center]);
            }
        }
    }

    /// UV sphere with poles on the y axis.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut geometry = Self::default();
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);

        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            // pole vertices sample the middle of their segment
            let u_offset = if iy == 0 {
                0.5 / ws as f32
            } else if iy == hs {
                -0.5 / ws as f32
            } else {
                0.0
            };
            let row = (0..=ws)
                .map(|ix| {
                    let u = ix as f32 / ws as f32;
                    let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
                    let (sin_theta, cos_theta) = (v * PI).sin_cos();
                    let position =
                        Vector3::new(-radius * cos_phi * sin_theta, radius * cos_theta, radius * sin_phi * sin_theta);
                    let normal = position.normalize();
                    geometry.push_vertex(position.into(), normal.into(), [u + u_offset, 1.0 - v])
                })
                .collect();
            grid.push(row);
        }

        for iy in 0..hs as usize {
            for ix in 0..ws as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs as usize - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        geometry.compute_tangents();
        geometry
    }

    /// Per-vertex tangents and bitangents averaged over all adjacent triangles.
    pub fn compute_tangents(&mut self) {
        let mut triangles_included = vec![0u32; self.vertices.len()];
        for v in self.vertices.iter_mut() {
            v.tangent = [0.0; 3];
            v.bitangent = [0.0; 3];
        }

        for c in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);

            let delta_pos1 = Vector3::from(v1.position) - Vector3::from(v0.position);
            let delta_pos2 = Vector3::from(v2.position) - Vector3::from(v0.position);
            let delta_uv1 = Vector2::from(v1.tex_coords) - Vector2::from(v0.tex_coords);
            let delta_uv2 = Vector2::from(v2.tex_coords) - Vector2::from(v0.tex_coords);

            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                // cap centers and poles share UVs, nothing to derive from them
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            // flipped for right-handed normal maps in wgpu's texture space
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

            for &i in &[i0, i1, i2] {
                let v = &mut self.vertices[i];
                v.tangent = (Vector3::from(v.tangent) + tangent).into();
                v.bitangent = (Vector3::from(v.bitangent) + bitangent).into();
                triangles_included[i] += 1;
            }
        }

        for (v, n) in self.vertices.iter_mut().zip(triangles_included) {
            if n == 0 {
                continue;
            }
            let denom = 1.0 / n as f32;
            v.tangent = (Vector3::from(v.tangent) * denom).into();
            v.bitangent = (Vector3::from(v.bitangent) * denom).into();
        }
    }

    /// Smooth normals: every vertex gets the normalized sum of its adjacent face normals.
    /// Face normals are weighted by triangle area since the cross product is not normalized.
    pub fn compute_vertex_normals(&mut self) {
        let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];
        for c in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
            let p0 = Vector3::from(self.vertices[i0].position);
            let face = (Vector3::from(self.vertices[i1].position) - p0)
                .cross(Vector3::from(self.vertices[i2].position) - p0);
            for i in [i0, i1, i2] {
                sums[i] += face;
            }
        }
        for (v, sum) in self.vertices.iter_mut().zip(sums) {
            if sum.magnitude2() > 0.0 {
                v.normal = sum.normalize().into();
            }
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn to_mesh(&self, device: &wgpu::Device, name: &str, material: usize) -> model::Mesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        model::Mesh {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material,
        }
    }
}
