use cgmath::{Deg, InnerSpace, MetricSpace, Point3};
use pagoda_garden::camera::{Camera, CameraUniform, OrbitController, Projection};

fn garden_camera() -> Camera {
    Camera::new((0.0, 10.0, 20.0), (0.0, 5.0, 0.0))
}

fn assert_close(a: Point3<f32>, b: Point3<f32>) {
    assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
}

#[test]
fn should_keep_the_eye_still_without_input() {
    let mut camera = garden_camera();
    let mut controller = OrbitController::new();
    controller.update(&mut camera);
    assert_close(camera.position, Point3::new(0.0, 10.0, 20.0));
    assert_close(camera.target, Point3::new(0.0, 5.0, 0.0));
}

#[test]
fn should_dolly_towards_the_target_on_zoom() {
    let mut camera = garden_camera();
    let before = camera.position.distance(camera.target);
    let mut controller = OrbitController::new();
    controller.zoom(2.0);
    controller.update(&mut camera);
    let after = camera.position.distance(camera.target);
    assert!((after - before * 0.95f32.powi(2)).abs() < 1e-3);

    controller.zoom(-2.0);
    controller.update(&mut camera);
    assert!((camera.position.distance(camera.target) - before).abs() < 1e-3);
}

#[test]
fn should_respect_distance_limits() {
    let mut camera = garden_camera();
    let mut controller = OrbitController::new();
    controller.min_distance = 15.0;
    controller.zoom(100.0);
    controller.update(&mut camera);
    assert!((camera.position.distance(camera.target) - 15.0).abs() < 1e-3);
}

#[test]
fn should_orbit_around_the_target_at_constant_distance() {
    let mut camera = garden_camera();
    let before = camera.position.distance(camera.target);
    let mut controller = OrbitController::new();
    controller.rotate(150.0, 0.0, 600.0);
    controller.update(&mut camera);
    assert!((camera.position.distance(camera.target) - before).abs() < 1e-3);
    assert!(camera.position.x < 0.0);
    assert!((camera.position.y - 10.0).abs() < 1e-3);
}

#[test]
fn should_not_flip_over_the_poles() {
    let mut camera = garden_camera();
    let mut controller = OrbitController::new();
    controller.rotate(0.0, 10_000.0, 100.0);
    controller.update(&mut camera);
    let offset = camera.position - camera.target;
    assert!(offset.y > 0.0);
    let (right, up) = camera.right_and_up();
    assert!(right.x.is_finite() && up.y.is_finite());
}

#[test]
fn should_move_eye_and_target_together_when_panning() {
    let mut camera = garden_camera();
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 300.0);
    let offset_before = camera.position - camera.target;
    let mut controller = OrbitController::new();
    controller.pan(&camera, &projection, 40.0, 0.0, 600.0);
    controller.update(&mut camera);
    let offset_after = camera.position - camera.target;
    assert!((offset_after - offset_before).magnitude() < 1e-3);
    assert!(camera.target.x < 0.0);
}

#[test]
fn should_track_aspect_on_resize() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 300.0);
    assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
    projection.resize(1024, 512);
    assert_eq!(projection.aspect, 2.0);
    projection.resize(1024, 0);
    assert_eq!(projection.aspect, 1024.0);
}

#[test]
fn should_build_an_orthonormal_view_basis_when_looking_straight_down() {
    let camera = Camera::new((0.0, 10.0, 0.0), (0.0, 0.0, 0.0));
    let (right, up) = camera.right_and_up();
    assert!((right.magnitude() - 1.0).abs() < 1e-5);
    assert!((up.magnitude() - 1.0).abs() < 1e-5);
    assert!(right.dot(up).abs() < 1e-5);
    assert!(right.dot(camera.forward()).abs() < 1e-5);
}

#[test]
fn should_measure_fog_depth_along_the_view_axis() {
    let camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);

    let ahead = Point3::new(0.0, 0.0, 0.0);
    let off_axis = Point3::new(5.0, 0.0, 0.0);
    assert!((uniform.view_depth(ahead) - 10.0).abs() < 1e-4);
    // same plane, further from the eye
    assert!((uniform.view_depth(off_axis) - 10.0).abs() < 1e-4);
    assert!(camera.position.distance(off_axis) > 11.0);
    assert!(uniform.view_depth(Point3::new(0.0, 0.0, 20.0)) < 0.0);
}
