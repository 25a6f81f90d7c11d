//! End-to-end scenarios exercising the full tick pipeline: plane/sphere rest, convex SAT
//! manifolds, a constrained chain, and raycasting.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};

use physics_core::prelude::*;

fn plane_at_origin() -> RigidBody {
    let shape: ShapeInstance<Body> = ShapeInstance::plane(Transform3d::at_origin());
    RigidBody::from_shapes(0, vec![shape], 0).unwrap()
}

fn dynamic_sphere(center: Vector3<f64>, radius: f64, mass: f64) -> RigidBody {
    let shape: ShapeInstance<Body> = ShapeInstance::sphere(radius, Transform3d::at_origin()).unwrap();
    let mut body = RigidBody::from_shapes(0, vec![shape], 0).unwrap();
    body.update_mass_properties(mass).unwrap();
    body.world_transform = Transform3d::at_point(center);
    body
}

fn block_body(half_extent: f64, center: Vector3<f64>, orientation: UnitQuaternion<f64>) -> RigidBody {
    let convex = Convex::from_block(half_extent, half_extent, half_extent);
    let shape: ShapeInstance<Body> = ShapeInstance::convex(convex, Transform3d::at_origin()).unwrap();
    let mut body = RigidBody::from_shapes(0, vec![shape], 0).unwrap();
    body.update_mass_properties(1.0).unwrap();
    body.world_transform = Transform3d::new(center, orientation);
    body
}

#[test]
fn s1_sphere_settles_to_rest_on_plane() {
    let mut world = World::with_gravity(Vector3::new(0.0, 0.0, -10.0));
    world.add_body(plane_at_origin());
    let sphere_id = world.add_body(dynamic_sphere(Vector3::new(0.0, 0.0, 5.0), 1.0, 1.0));

    for _ in 0..120 {
        world.simulate(1.0 / 60.0);
    }

    let sphere = world.bodies().iter().find(|b| b.id == sphere_id).unwrap();
    assert!((sphere.world_transform.origin.z - 1.0).abs() <= 0.01);
    assert!(sphere.linear_velocity.z.abs() <= 0.05);
}

#[test]
fn s2_two_axis_aligned_cubes_produce_four_contacts() {
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
    let a = block_body(1.0, Vector3::new(0.0, 0.0, 2.1), rotation);
    let b = block_body(1.0, Vector3::new(0.0, 0.0, 4.0), rotation);

    let manifold = physics_core::collision::collide_bodies(&a, &b, &CollisionConfig::default());
    assert_eq!(manifold.contacts.len(), 4);
}

#[test]
fn s3_two_rotated_cubes_produce_two_contacts() {
    let half_extent_a = 0.6;
    let half_extent_b = 0.5;
    let a = block_body(
        half_extent_a,
        Vector3::new(-0.5, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
    );
    let b = block_body(
        half_extent_b,
        Vector3::new(0.5, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
    );

    let manifold = physics_core::collision::collide_bodies(&a, &b, &CollisionConfig::default());
    assert_eq!(manifold.contacts.len(), 2);
}

#[test]
fn s4_point_to_point_chain_keeps_spheres_level() {
    let mut world = World::with_gravity(Vector3::new(0.0, 0.0, -10.0));
    let first = world.add_body(dynamic_sphere(Vector3::new(0.0, 0.0, 0.0), 0.5, 1.0));
    let second = world.add_body(dynamic_sphere(Vector3::new(1.0, 0.0, 0.0), 0.5, 1.0));
    let third = world.add_body(dynamic_sphere(Vector3::new(2.0, 0.0, 0.0), 0.5, 1.0));

    world
        .add_constraint(
            first,
            second,
            Constraint::PointToPoint {
                pivot1: Vector3::new(0.5, 0.0, 0.0),
                pivot2: Vector3::new(-0.5, 0.0, 0.0),
            },
        )
        .unwrap();
    world
        .add_constraint(
            second,
            third,
            Constraint::PointToPoint {
                pivot1: Vector3::new(0.5, 0.0, 0.0),
                pivot2: Vector3::new(-0.5, 0.0, 0.0),
            },
        )
        .unwrap();

    let dt = 1.0 / 60.0;
    let steps = (2.0 / dt) as usize;
    for _ in 0..steps {
        world.simulate(dt);
    }

    let z_of = |id: i64| world.bodies().iter().find(|b| b.id == id).unwrap().world_transform.origin.z;
    let (z1, z2, z3) = (z_of(first), z_of(second), z_of(third));
    assert!((z1 - z2).abs() <= 0.05);
    assert!((z2 - z3).abs() <= 0.05);
}

#[test]
fn s5_raycast_hits_block_and_misses_when_offset() {
    let body = block_body(0.5, Vector3::zeros(), UnitQuaternion::identity());

    let hit_ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
    let hit = physics_core::raycast::raycast_body(&hit_ray, &body).expect("should hit top face");
    assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-9);
    assert_relative_eq!(hit.point, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
    assert_relative_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);

    let miss_ray = Ray::new(Vector3::new(5.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
    assert!(physics_core::raycast::raycast_body(&miss_ray, &body).is_none());
}

#[test]
fn s6_separating_axis_depth_matches_closed_form_for_face_to_face_blocks() {
    let a = block_body(0.5, Vector3::new(-0.2, 0.0, 0.0), UnitQuaternion::identity());
    let b = block_body(0.5, Vector3::new(0.2, 0.0, 0.0), UnitQuaternion::identity());

    let manifold = physics_core::collision::collide_bodies(&a, &b, &CollisionConfig::default());
    assert!(!manifold.contacts.is_empty());
    for contact in &manifold.contacts {
        let depth = (contact.point_i - contact.point_j).dot(&contact.normal).abs();
        assert_relative_eq!(depth, 0.6, epsilon = 1e-6);
    }
}

#[test]
fn s6_rotating_second_block_still_produces_a_manifold() {
    let a = block_body(0.5, Vector3::new(-0.2, 0.0, 0.0), UnitQuaternion::identity());
    let b = block_body(
        0.5,
        Vector3::new(0.2, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
    );

    let manifold = physics_core::collision::collide_bodies(&a, &b, &CollisionConfig::default());
    assert!(!manifold.contacts.is_empty());
    for contact in &manifold.contacts {
        let depth = (contact.point_i - contact.point_j).dot(&contact.normal).abs();
        assert!(depth > 0.0 && depth <= 0.6 + 1e-6);
    }
}
