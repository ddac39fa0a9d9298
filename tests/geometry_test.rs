use cgmath::Vector2;
use pagoda_garden::{
    data_structures::{
        geometry::Geometry,
        shape::{area, extrude, is_clockwise, triangulate, ExtrudeSettings, Shape},
    },
    offscreen::{heart_extrusion, heart_geometry, heart_shape},
    resources::mesh::to_geometry,
};

fn square() -> Vec<Vector2<f32>> {
    vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(0.0, 1.0),
    ]
}

#[test]
fn should_build_primitives_with_expected_topology() {
    let cases = [
        ("plane", Geometry::plane(200.0, 200.0), 4, 6),
        ("box", Geometry::cuboid(8.0, 2.0, 8.0), 24, 36),
        ("cylinder", Geometry::cylinder(4.0, 5.0, 1.0, 6), 40, 72),
        ("cone", Geometry::cone(3.0, 4.0, 16), 67, 96),
        ("sphere", Geometry::sphere(4.0, 12, 12), 169, 792),
    ];
    for (name, geometry, vertices, indices) in cases {
        assert_eq!(geometry.vertices.len(), vertices, "{name} vertices");
        assert_eq!(geometry.indices.len(), indices, "{name} indices");
        assert!(
            geometry.indices.iter().all(|i| (*i as usize) < geometry.vertices.len()),
            "{name} indices out of range"
        );
    }
}

#[test]
fn should_point_plane_tangents_along_u() {
    let plane = Geometry::plane(2.0, 2.0);
    for v in &plane.vertices {
        assert!(v.tangent[0] > 0.0, "{:?}", v.tangent);
        assert!(v.tangent[1].abs() < 1e-5 && v.tangent[2].abs() < 1e-5, "{:?}", v.tangent);
    }
}

#[test]
fn should_measure_signed_area() {
    let ccw = square();
    assert!((area(&ccw) - 1.0).abs() < 1e-6);
    assert!(!is_clockwise(&ccw));

    let mut cw = ccw.clone();
    cw.reverse();
    assert!((area(&cw) + 1.0).abs() < 1e-6);
    assert!(is_clockwise(&cw));
}

#[test]
fn should_triangulate_concave_outlines() {
    let arrow = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 1.0),
        Vector2::new(4.0, 0.0),
        Vector2::new(2.0, 3.0),
    ];
    let triangles = triangulate(&arrow);
    assert_eq!(triangles.len(), 2);
    let covered: f32 = triangles
        .iter()
        .map(|t| area(&[arrow[t[0]], arrow[t[1]], arrow[t[2]]]))
        .sum();
    assert!((covered - area(&arrow)).abs() < 1e-5);
    for t in &triangles {
        assert!(area(&[arrow[t[0]], arrow[t[1]], arrow[t[2]]]) > 0.0);
    }
}

#[test]
fn should_ignore_a_closing_duplicate_when_triangulating() {
    let mut closed = square();
    closed.push(closed[0]);
    assert_eq!(triangulate(&closed).len(), 2);
    assert!(triangulate(&closed[..2]).is_empty());
}

#[test]
fn should_outline_the_heart_with_six_curves() {
    let shape = heart_shape();
    assert_eq!(shape.curve_count(), 6);
    let points = shape.points(12);
    assert_eq!(points.first(), points.last());
    assert_eq!(points.len(), 73);
    assert!(area(&points[..72]).abs() > 1.0);
}

#[test]
fn should_extrude_the_heart_with_beveled_caps() {
    let geometry = heart_geometry();
    // two 70 triangle caps plus six wall layers around 72 contour points
    assert_eq!(geometry.triangle_count(), 2 * 70 + 72 * 6 * 2);
    assert_eq!(geometry.vertices.len(), geometry.indices.len());

    let settings = heart_extrusion();
    let (min_z, max_z) = geometry
        .vertices
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.position[2]), hi.max(v.position[2])));
    assert!((min_z + settings.bevel_thickness).abs() < 1e-5);
    assert!((max_z - (settings.depth + settings.bevel_thickness)).abs() < 1e-5);
}

#[test]
fn should_extrude_without_bevel_between_zero_and_depth() {
    let mut shape = Shape::new();
    shape
        .move_to(0.0, 0.0)
        .bezier_curve_to(0.0, 0.0, 1.0, 0.0, 1.0, 0.0)
        .bezier_curve_to(1.0, 0.0, 1.0, 1.0, 1.0, 1.0)
        .bezier_curve_to(1.0, 1.0, 0.0, 1.0, 0.0, 1.0)
        .bezier_curve_to(0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
    let settings = ExtrudeSettings {
        curve_segments: 1,
        steps: 1,
        depth: 2.0,
        bevel_enabled: false,
        ..Default::default()
    };
    let geometry = extrude(&shape, &settings);
    // 2 triangles per cap, 2 per side
    assert_eq!(geometry.triangle_count(), 2 * 2 + 4 * 2);
    for v in &geometry.vertices {
        assert!(v.position[2] == 0.0 || v.position[2] == 2.0);
    }
}

#[test]
fn should_convert_obj_meshes_and_drop_broken_faces() {
    let mesh = tobj::Mesh {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        texcoords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        indices: vec![0, 1, 2, 0, 2, 7],
        ..Default::default()
    };
    let geometry = to_geometry(&mesh);
    assert_eq!(geometry.vertices.len(), 3);
    assert_eq!(geometry.indices, vec![0, 1, 2]);
    assert_eq!(geometry.vertices[2].tex_coords, [0.0, 0.0]);
    assert_eq!(geometry.vertices[0].normal, [0.0, 0.0, 1.0]);
}

#[test]
fn should_derive_normals_for_obj_meshes_without_them() {
    let mesh = tobj::Mesh {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        indices: vec![0, 1, 2],
        ..Default::default()
    };
    let geometry = to_geometry(&mesh);
    for v in &geometry.vertices {
        assert!((v.normal[0]).abs() < 1e-6, "{:?}", v.normal);
        assert!((v.normal[1]).abs() < 1e-6, "{:?}", v.normal);
        assert!((v.normal[2] - 1.0).abs() < 1e-6, "{:?}", v.normal);
    }
}

#[test]
fn should_average_face_normals_on_shared_vertices() {
    // two triangles folded along the x axis, one facing +z and one facing +y
    let mut geometry = Geometry::default();
    for position in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]] {
        geometry.vertices.push(pagoda_garden::data_structures::model::ModelVertex {
            position,
            ..Default::default()
        });
    }
    geometry.indices = vec![0, 1, 2, 0, 3, 1];
    geometry.compute_vertex_normals();

    let shared = geometry.vertices[0].normal;
    let expected = std::f32::consts::FRAC_1_SQRT_2;
    assert!(shared[0].abs() < 1e-6, "{shared:?}");
    assert!((shared[1] - expected).abs() < 1e-5, "{shared:?}");
    assert!((shared[2] - expected).abs() < 1e-5, "{shared:?}");
    assert_eq!(geometry.vertices[2].normal, [0.0, 0.0, 1.0]);
    assert_eq!(geometry.vertices[3].normal, [0.0, 1.0, 0.0]);
}

#[test]
fn should_start_an_empty_shape_at_the_origin() {
    let shape = Shape::default();
    assert_eq!(shape.curve_count(), 0);
    assert!(shape.points(12).is_empty());
    assert!(extrude(&shape, &ExtrudeSettings::default()).indices.is_empty());
}
