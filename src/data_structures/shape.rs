//! 2D outlines built from cubic Bézier segments, triangulated and extruded into
//! solid meshes with beveled edges.

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::data_structures::{geometry::Geometry, model::ModelVertex};

#[derive(Clone, Copy, Debug, PartialEq)]
struct CubicBezier {
    start: Vector2<f32>,
    control1: Vector2<f32>,
    control2: Vector2<f32>,
    end: Vector2<f32>,
}

impl CubicBezier {
    fn point_at(&self, t: f32) -> Vector2<f32> {
        let k = 1.0 - t;
        self.start * (k * k * k)
            + self.control1 * (3.0 * k * k * t)
            + self.control2 * (3.0 * k * t * t)
            + self.end * (t * t * t)
    }
}

/// A closed outline made of consecutive Bézier segments.
#[derive(Clone, Debug)]
pub struct Shape {
    current: Vector2<f32>,
    curves: Vec<CubicBezier>,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            current: Vector2::new(0.0, 0.0),
            curves: Vec::new(),
        }
    }
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.current = Vector2::new(x, y);
        self
    }

    pub fn bezier_curve_to(
        &mut self,
        cp1x: f32,
        cp1y: f32,
        cp2x: f32,
        cp2y: f32,
        x: f32,
        y: f32,
    ) -> &mut Self {
        let end = Vector2::new(x, y);
        self.curves.push(CubicBezier {
            start: self.current,
            control1: Vector2::new(cp1x, cp1y),
            control2: Vector2::new(cp2x, cp2y),
            end,
        });
        self.current = end;
        self
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Samples every segment at `divisions` steps. Consecutive duplicates are dropped.
    pub fn points(&self, divisions: u32) -> Vec<Vector2<f32>> {
        let divisions = divisions.max(1);
        let mut points: Vec<Vector2<f32>> = Vec::new();
        for curve in &self.curves {
            for d in 0..=divisions {
                let point = curve.point_at(d as f32 / divisions as f32);
                if points.last() == Some(&point) {
                    continue;
                }
                points.push(point);
            }
        }
        points
    }
}

/// Signed area, positive for counter-clockwise outlines.
pub fn area(contour: &[Vector2<f32>]) -> f32 {
    let n = contour.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut p = n - 1;
    for q in 0..n {
        sum += contour[p].x * contour[q].y - contour[q].x * contour[p].y;
        p = q;
    }
    sum * 0.5
}

pub fn is_clockwise(contour: &[Vector2<f32>]) -> bool {
    area(contour) < 0.0
}

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn in_triangle(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear-clipping triangulation of a simple polygon.
///
/// A closing point equal to the first one is ignored. Triangles are returned as
/// indices into `contour`, always counter-clockwise, independent of the
/// orientation of the input.
pub fn triangulate(contour: &[Vector2<f32>]) -> Vec<[usize; 3]> {
    let mut n = contour.len();
    if n > 1 && contour[0] == contour[n - 1] {
        n -= 1;
    }
    if n < 3 {
        return Vec::new();
    }
    let mut remaining: Vec<usize> = (0..n).collect();
    if area(&contour[..n]) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);
    let mut i = 0;
    let mut misses = 0;
    while remaining.len() > 3 {
        let len = remaining.len();
        let (prev, cur, next) = (
            remaining[(i + len - 1) % len],
            remaining[i % len],
            remaining[(i + 1) % len],
        );
        let (a, b, c) = (contour[prev], contour[cur], contour[next]);
        let convex = cross(a, b, c) > 0.0;
        let is_ear = convex
            && remaining
                .iter()
                .filter(|&&idx| idx != prev && idx != cur && idx != next)
                .all(|&idx| !in_triangle(contour[idx], a, b, c));

        // a full lap without an ear only happens on degenerate input, clip anyway
        if is_ear || misses >= len {
            triangles.push([prev, cur, next]);
            remaining.remove(i % len);
            misses = 0;
            if i >= remaining.len() {
                i = 0;
            }
        } else {
            i = (i + 1) % len;
            misses += 1;
        }
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

#[derive(Clone, Copy, Debug)]
pub struct ExtrudeSettings {
    pub curve_segments: u32,
    pub steps: u32,
    pub depth: f32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            curve_segments: 12,
            steps: 1,
            depth: 1.0,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_segments: 3,
        }
    }
}

/// Direction a contour point moves when the outline grows by one unit.
fn bevel_vec(pt: Vector2<f32>, prev: Vector2<f32>, next: Vector2<f32>) -> Vector2<f32> {
    let v_prev = pt - prev;
    let v_next = next - pt;
    let v_prev_lensq = v_prev.magnitude2();
    let collinear = v_prev.x * v_next.y - v_prev.y * v_next.x;

    let (trans, shrink_by) = if collinear.abs() > f32::EPSILON {
        let v_prev_len = v_prev_lensq.sqrt();
        let v_next_len = v_next.magnitude();
        let prev_shift = Vector2::new(prev.x - v_prev.y / v_prev_len, prev.y + v_prev.x / v_prev_len);
        let next_shift = Vector2::new(next.x - v_next.y / v_next_len, next.y + v_next.x / v_next_len);
        let sf = ((next_shift.x - prev_shift.x) * v_next.y - (next_shift.y - prev_shift.y) * v_next.x)
            / collinear;
        let trans = prev_shift + v_prev * sf - pt;
        let lensq = trans.magnitude2();
        if lensq <= 2.0 {
            return trans;
        }
        (trans, (lensq / 2.0).sqrt())
    } else {
        let same_direction = if v_prev.x > f32::EPSILON {
            v_next.x > f32::EPSILON
        } else if v_prev.x < -f32::EPSILON {
            v_next.x < -f32::EPSILON
        } else {
            v_prev.y.signum() == v_next.y.signum()
        };
        if same_direction {
            (Vector2::new(-v_prev.y, v_prev.x), v_prev_lensq.sqrt())
        } else {
            (v_prev, (v_prev_lensq / 2.0).sqrt())
        }
    };
    trans / shrink_by
}

/// Extrudes `shape` along +z into a flat-shaded, non-indexed mesh.
///
/// Layers run from the bottom bevel (`z = -bevel_thickness`) through the body
/// (`0..=depth`) to the top bevel (`z = depth + bevel_thickness`).
pub fn extrude(shape: &Shape, settings: &ExtrudeSettings) -> Geometry {
    let mut contour = shape.points(settings.curve_segments);
    if contour.len() > 1 && contour[0] == contour[contour.len() - 1] {
        contour.pop();
    }
    if !is_clockwise(&contour) {
        contour.reverse();
    }
    let faces = triangulate(&contour);
    let vlen = contour.len();

    let (bevel_segments, bevel_thickness, bevel_size) = if settings.bevel_enabled {
        (settings.bevel_segments, settings.bevel_thickness, settings.bevel_size)
    } else {
        (0, 0.0, 0.0)
    };
    let steps = settings.steps.max(1);

    let movements: Vec<Vector2<f32>> = (0..vlen)
        .map(|i| {
            let prev = contour[(i + vlen - 1) % vlen];
            let next = contour[(i + 1) % vlen];
            bevel_vec(contour[i], prev, next)
        })
        .collect();

    let mut layers: Vec<Vector3<f32>> = Vec::new();
    let mut push_layer = |offset: f32, z: f32| {
        for (pt, mv) in contour.iter().zip(movements.iter()) {
            let p = *pt + *mv * offset;
            layers.push(Vector3::new(p.x, p.y, z));
        }
    };
    let bevel_at = |b: u32| {
        let t = b as f32 / bevel_segments.max(1) as f32;
        let z = bevel_thickness * (t * std::f32::consts::FRAC_PI_2).cos();
        let size = bevel_size * (t * std::f32::consts::FRAC_PI_2).sin();
        (z, size)
    };
    for b in 0..bevel_segments {
        let (z, size) = bevel_at(b);
        push_layer(size, -z);
    }
    for s in 0..=steps {
        push_layer(bevel_size, settings.depth / steps as f32 * s as f32);
    }
    for b in (0..bevel_segments).rev() {
        let (z, size) = bevel_at(b);
        push_layer(size, settings.depth + z);
    }

    let mut triangles: Vec<[usize; 3]> = Vec::new();
    let top = vlen * (steps + bevel_segments * 2) as usize;
    for face in &faces {
        triangles.push([face[2], face[1], face[0]]);
    }
    for face in &faces {
        triangles.push([face[0] + top, face[1] + top, face[2] + top]);
    }
    let lid_count = triangles.len();
    for i in (0..vlen).rev() {
        let j = i;
        let k = if i == 0 { vlen - 1 } else { i - 1 };
        for s in 0..(steps + bevel_segments * 2) as usize {
            let (slen1, slen2) = (vlen * s, vlen * (s + 1));
            let (a, b, c, d) = (j + slen1, k + slen1, k + slen2, j + slen2);
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }

    let mut geometry = Geometry::default();
    for (t, tri) in triangles.iter().enumerate() {
        let p = tri.map(|i| layers[i]);
        let normal = (p[1] - p[0]).cross(p[2] - p[0]);
        let normal = if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            Vector3::unit_z()
        };
        let uvs = if t < lid_count {
            p.map(|v| [v.x, v.y])
        } else {
            side_wall_uv(p)
        };
        for (v, uv) in p.iter().zip(uvs) {
            geometry.indices.push(geometry.vertices.len() as u32);
            geometry.vertices.push(ModelVertex {
                position: (*v).into(),
                tex_coords: [uv[0], 1.0 - uv[1]],
                normal: normal.into(),
                tangent: [0.0; 3],
                bitangent: [0.0; 3],
            });
        }
    }
    geometry.compute_tangents();
    geometry
}

fn side_wall_uv(p: [Vector3<f32>; 3]) -> [[f32; 2]; 3] {
    if (p[0].y - p[1].y).abs() < (p[0].x - p[1].x).abs() {
        p.map(|v| [v.x, 1.0 - v.z])
    } else {
        p.map(|v| [v.y, 1.0 - v.z])
    }
}
