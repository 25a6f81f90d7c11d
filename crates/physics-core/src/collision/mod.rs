//! Narrow-phase collision detection: pair-specific contact generators.
//!
//! Dispatch is a double match on `(kind1, kind2)`; the cross-product of shape kinds is small
//! and closed, so a table of kernels (rather than a virtual-dispatch trait hierarchy) keeps
//! each pair's geometry explicit and easy to test in isolation.

mod convex_convex;
mod particle;
mod sphere_convex;
mod sphere_plane;
mod sphere_sphere;

use nalgebra::Vector3;

use crate::config::CollisionConfig;
use crate::convex::Convex;
use crate::shape::{ShapeInstance, ShapeKind};
use crate::transform::{CenterOfMass, Shape as ShapeFrame, Transform3d, World};

/// A single contact point between two bodies.
///
/// `normal` points out of body1. `point_i` is the contact location on body1, `point_j` the
/// (possibly distinct, for a penetrating pair) contact location on body2, both in world
/// space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact normal, pointing out of body1.
    pub normal: Vector3<f64>,
    /// Contact point on body1, world space.
    pub point_i: Vector3<f64>,
    /// Contact point on body2, world space.
    pub point_j: Vector3<f64>,
}

impl Contact {
    /// Flips this contact as though body1 and body2 were swapped: negates the normal and
    /// swaps the two contact points.
    pub fn flipped(&self) -> Contact {
        Contact {
            normal: -self.normal,
            point_i: self.point_j,
            point_j: self.point_i,
        }
    }
}

fn sphere_world(transform: &Transform3d<ShapeFrame, World>, radius: f64) -> (Vector3<f64>, f64) {
    (transform.origin, radius)
}

fn plane_world(transform: &Transform3d<ShapeFrame, World>) -> (Vector3<f64>, Vector3<f64>) {
    (transform.origin, transform.direction_place_in(&Vector3::z()))
}

fn convex_world(shape: &ShapeInstance<CenterOfMass>, transform: &Transform3d<ShapeFrame, World>) -> Convex {
    match &shape.kind {
        ShapeKind::Convex(c) => c.place_in(transform),
        _ => unreachable!("convex_world called on a non-convex shape"),
    }
}

/// All contacts generated between one pair of bodies during a single narrow-phase pass.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub body1: i64,
    pub body2: i64,
    pub contacts: Vec<Contact>,
}

/// Runs every shape-pair combination between two bodies through [`collide`] and collects the
/// results into one manifold (empty if nothing touches).
pub fn collide_bodies(
    body1: &crate::body::RigidBody,
    body2: &crate::body::RigidBody,
    config: &CollisionConfig,
) -> ContactManifold {
    let mut contacts = Vec::new();
    for shape1 in &body1.shapes {
        let transform1 = crate::transform::place_in(&body1.world_transform, &shape1.local_transform);
        for shape2 in &body2.shapes {
            let transform2 = crate::transform::place_in(&body2.world_transform, &shape2.local_transform);
            collide(shape1, &transform1, shape2, &transform2, config, &mut contacts);
        }
    }
    ContactManifold {
        body1: body1.id,
        body2: body2.id,
        contacts,
    }
}

/// Dispatches to the appropriate pair-specific kernel for `(shape1, shape2)` and appends any
/// resulting contacts to `out`. Two-plane and two-particle pairs always produce zero
/// contacts.
pub fn collide(
    shape1: &ShapeInstance<CenterOfMass>,
    transform1: &Transform3d<ShapeFrame, World>,
    shape2: &ShapeInstance<CenterOfMass>,
    transform2: &Transform3d<ShapeFrame, World>,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) {
    use ShapeKind::*;
    match (&shape1.kind, &shape2.kind) {
        (Plane, Plane) | (Particle, Particle) => {}

        (Sphere(r1), Sphere(r2)) => {
            let (c1, _) = sphere_world(transform1, *r1);
            let (c2, _) = sphere_world(transform2, *r2);
            sphere_sphere::sphere_sphere(c1, *r1, c2, *r2, out);
        }

        (Sphere(r), Plane) => {
            let (c, _) = sphere_world(transform1, *r);
            let (p0, n) = plane_world(transform2);
            sphere_plane::sphere_plane(c, *r, p0, n, out);
        }
        (Plane, Sphere(r)) => {
            let (p0, n) = plane_world(transform1);
            let (c, _) = sphere_world(transform2, *r);
            let mut tmp = Vec::new();
            sphere_plane::sphere_plane(c, *r, p0, n, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }

        (Convex(_), Plane) => {
            let convex = convex_world(shape1, transform1);
            let (p0, n) = plane_world(transform2);
            let mut tmp = Vec::new();
            particle::plane_convex(p0, n, &convex, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }
        (Plane, Convex(_)) => {
            let (p0, n) = plane_world(transform1);
            let convex = convex_world(shape2, transform2);
            particle::plane_convex(p0, n, &convex, out);
        }

        (Sphere(r), Convex(_)) => {
            let (c, _) = sphere_world(transform1, *r);
            let convex = convex_world(shape2, transform2);
            sphere_convex::sphere_convex(c, *r, &convex, out);
        }
        (Convex(_), Sphere(r)) => {
            let convex = convex_world(shape1, transform1);
            let (c, _) = sphere_world(transform2, *r);
            let mut tmp = Vec::new();
            sphere_convex::sphere_convex(c, *r, &convex, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }

        (Convex(_), Convex(_)) => {
            let a = convex_world(shape1, transform1);
            let b = convex_world(shape2, transform2);
            convex_convex::convex_convex(&a, &b, config.max_clip_depth, out);
        }

        (Sphere(r), Particle) => {
            let (c, _) = sphere_world(transform1, *r);
            sphere_sphere::sphere_sphere(c, *r, transform2.origin, 0.0, out);
        }
        (Particle, Sphere(r)) => {
            let (c, _) = sphere_world(transform2, *r);
            let mut tmp = Vec::new();
            sphere_sphere::sphere_sphere(transform1.origin, 0.0, c, *r, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }

        (Plane, Particle) => {
            let (p0, n) = plane_world(transform1);
            sphere_plane::sphere_plane(transform2.origin, 0.0, p0, n, out);
        }
        (Particle, Plane) => {
            let (p0, n) = plane_world(transform2);
            let mut tmp = Vec::new();
            sphere_plane::sphere_plane(transform1.origin, 0.0, p0, n, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }

        (Convex(_), Particle) => {
            let convex = convex_world(shape1, transform1);
            particle::particle_convex(transform2.origin, &convex, out);
        }
        (Particle, Convex(_)) => {
            let convex = convex_world(shape2, transform2);
            let mut tmp = Vec::new();
            particle::particle_convex(transform1.origin, &convex, &mut tmp);
            out.extend(tmp.into_iter().map(|c| c.flipped()));
        }
    }
}
