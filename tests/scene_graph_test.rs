use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Rotation, Vector3};
use pagoda_garden::data_structures::{
    instance::Instance,
    scene_graph::{ContainerNode, SceneNode},
};

fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>) {
    assert!((a - b).magnitude() < 1e-4, "{a:?} != {b:?}");
}

fn site_with_part(sites: &[(f32, f32)], part_y: f32) -> ContainerNode {
    let mut site = ContainerNode::new(0);
    site.add_child(Box::new(ContainerNode::new(0)));
    site.add_instances(sites.iter().map(|(x, z)| Instance::at(*x, 0.0, *z)).collect());
    site.get_children_mut()[0].set_local_transform_all(&mut |local| local.position.y = part_y);
    site
}

#[test]
fn should_hand_parent_instances_down_index_by_index() {
    let mut site = site_with_part(&[(30.0, 0.0), (0.0, -60.0)], 15.0);
    site.update_world_transform_all();

    let part = &site.get_children()[0];
    let world = part.get_world_transforms();
    assert_eq!(world.len(), 2);
    assert_vec_close(world[0].position, Vector3::new(30.0, 15.0, 0.0));
    assert_vec_close(world[1].position, Vector3::new(0.0, 15.0, -60.0));
}

#[test]
fn should_grow_children_together_with_their_parent() {
    let mut site = site_with_part(&[(30.0, 0.0)], 4.0);
    let part_count = site.get_children()[0].instance_count();
    let total = site.add_instances(vec![Instance::at(60.0, 0.0, 0.0)]);
    assert_eq!(total, 2);
    assert_eq!(site.get_children()[0].instance_count(), part_count + 1);
}

#[test]
fn should_apply_parent_rotation_and_scale_to_child_offsets() {
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, Instance::at(1.0, 0.0, 0.0));
    let mut parent = ContainerNode::new(1);
    parent.add_child(Box::new(child));
    parent.set_local_transform(
        0,
        Instance::at(0.0, 5.0, 0.0)
            .with_rotation(Instance::euler_xyz(0.0, FRAC_PI_2, 0.0))
            .with_uniform_scale(2.0),
    );
    parent.update_world_transform_all();

    let world = &parent.get_children()[0].get_world_transforms()[0];
    assert_vec_close(world.position, Vector3::new(0.0, 5.0, -2.0));
    assert_vec_close(world.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn should_ignore_out_of_range_updates() {
    let mut node = ContainerNode::new(2);
    node.set_local_transform(5, Instance::at(1.0, 1.0, 1.0));
    node.update_world_transforms(1..4, &[]);
    assert_eq!(node.get_local_transform(0), Some(Instance::default()));
    assert_eq!(node.get_local_transform(5), None);
}

#[test]
fn should_compose_euler_angles_in_xyz_order() {
    let q = Instance::euler_xyz(FRAC_PI_2, 0.0, FRAC_PI_2);
    // z first, then x: +x -> +y -> +z
    assert_vec_close(q.rotate_vector(Vector3::unit_x()), Vector3::unit_z());
}

#[test]
fn should_compose_instances_like_matrices() {
    let a = Instance::at(1.0, 2.0, 3.0).with_rotation(Instance::euler_xyz(0.3, 0.2, 0.1));
    let b = Instance::at(-4.0, 0.5, 2.0).with_uniform_scale(3.0);
    let composed = (&a * &b).to_matrix();
    let expected = a.to_matrix() * b.to_matrix();
    for c in 0..4 {
        assert!((composed[c] - expected[c]).magnitude() < 1e-4);
    }
}
