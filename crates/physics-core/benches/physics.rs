//! Benchmarks for the rigid-body physics core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;

use physics_core::prelude::*;

fn ground_and_sphere(z: f64) -> World {
    let mut world = World::with_gravity(Vector3::new(0.0, 0.0, -9.81));

    let ground: ShapeInstance<Body> = ShapeInstance::plane(Transform3d::at_origin());
    world.add_body(RigidBody::from_shapes(0, vec![ground], 0).unwrap());

    let ball: ShapeInstance<Body> = ShapeInstance::sphere(0.5, Transform3d::at_origin()).unwrap();
    let mut falling = RigidBody::from_shapes(0, vec![ball], 0).unwrap();
    falling.update_mass_properties(1.0).unwrap();
    falling.world_transform = Transform3d::at_point(Vector3::new(0.0, 0.0, z));
    world.add_body(falling);

    world
}

fn pile_of_spheres(count: usize) -> World {
    let mut world = World::with_gravity(Vector3::new(0.0, 0.0, -9.81));
    let ground: ShapeInstance<Body> = ShapeInstance::plane(Transform3d::at_origin());
    world.add_body(RigidBody::from_shapes(0, vec![ground], 0).unwrap());

    for i in 0..count {
        let shape: ShapeInstance<Body> = ShapeInstance::sphere(0.5, Transform3d::at_origin()).unwrap();
        let mut body = RigidBody::from_shapes(0, vec![shape], 0).unwrap();
        body.update_mass_properties(1.0).unwrap();
        body.world_transform = Transform3d::at_point(Vector3::new((i as f64) * 1.1, 0.0, 2.0 + (i as f64) * 1.1));
        world.add_body(body);
    }
    world
}

fn tick_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");

    group.bench_function("resting_contact", |b| {
        let mut world = ground_and_sphere(0.5);
        b.iter(|| {
            world.simulate(black_box(1.0 / 60.0));
        });
    });

    group.bench_function("free_fall", |b| {
        let mut world = ground_and_sphere(50.0);
        b.iter(|| {
            world.simulate(black_box(1.0 / 60.0));
        });
    });

    for count in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("sphere_pile", count), &count, |b, &count| {
            let mut world = pile_of_spheres(count);
            b.iter(|| {
                world.simulate(black_box(1.0 / 60.0));
            });
        });
    }

    group.finish();
}

fn narrow_phase_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("narrow_phase");

    group.bench_function("convex_convex_overlap", |b| {
        let shape_a: ShapeInstance<Body> = ShapeInstance::convex(Convex::from_block(1.0, 1.0, 1.0), Transform3d::at_origin()).unwrap();
        let mut body_a = RigidBody::from_shapes(0, vec![shape_a], 0).unwrap();
        body_a.update_mass_properties(1.0).unwrap();

        let shape_b: ShapeInstance<Body> = ShapeInstance::convex(Convex::from_block(1.0, 1.0, 1.0), Transform3d::at_origin()).unwrap();
        let mut body_b = RigidBody::from_shapes(1, vec![shape_b], 0).unwrap();
        body_b.update_mass_properties(1.0).unwrap();
        body_b.world_transform = Transform3d::at_point(Vector3::new(0.0, 0.0, 1.5));

        let config = CollisionConfig::default();
        b.iter(|| physics_core::collision::collide_bodies(black_box(&body_a), black_box(&body_b), &config));
    });

    group.bench_function("raycast_convex", |b| {
        let convex = Convex::from_block(1.0, 1.0, 1.0);
        let shape: ShapeInstance<Body> = ShapeInstance::convex(convex, Transform3d::at_origin()).unwrap();
        let body = RigidBody::from_shapes(0, vec![shape], 0).unwrap();
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        b.iter(|| physics_core::raycast::raycast_body(black_box(&ray), black_box(&body)));
    });

    group.finish();
}

criterion_group!(benches, tick_benchmarks, narrow_phase_benchmarks);
criterion_main!(benches);
