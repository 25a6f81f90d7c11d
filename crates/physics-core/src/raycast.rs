//! World/body/shape raycasting.

use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::error::{PhysicsError, PhysicsResult};
use crate::shape::ShapeKind;

/// A ray: an origin and a unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Builds a ray, rejecting a zero-length direction with [`PhysicsError::InvalidDirection`].
    pub fn new(origin: Vector3<f64>, direction: Vector3<f64>) -> PhysicsResult<Self> {
        if crate::math::almost_zero(&direction) {
            return Err(PhysicsError::InvalidDirection(
                "ray direction must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            origin,
            direction: direction.normalize(),
        })
    }
}

/// The closest hit along a ray.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub body_id: i64,
    pub distance: f64,
    pub point: Vector3<f64>,
    pub normal: Vector3<f64>,
}

fn sphere_raycast(ray: &Ray, center: Vector3<f64>, radius: f64) -> Option<(f64, Vector3<f64>, Vector3<f64>)> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&oc);
    let c = oc.dot(&oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t0 = (-b - sqrt_d) / (2.0 * a);
    let t1 = (-b + sqrt_d) / (2.0 * a);
    let t = if t0 >= 0.0 {
        t0
    } else if t1 >= 0.0 {
        t1
    } else {
        return None;
    };
    let point = ray.origin + ray.direction * t;
    let normal = (point - center) / radius;
    Some((t, point, normal))
}

/// Raycasts a single shape, given the ray already expressed in the shape's local frame.
fn shape_raycast_local(ray: &Ray, kind: &ShapeKind) -> Option<(f64, Vector3<f64>, Vector3<f64>)> {
    match kind {
        ShapeKind::Sphere(r) => sphere_raycast(ray, Vector3::zeros(), *r),
        ShapeKind::Convex(convex) => convex.raycast(&ray.origin, &ray.direction),
        ShapeKind::Plane | ShapeKind::Particle => None,
    }
}

/// Raycasts against every shape on `body`, returning the closest hit in world space (ties
/// resolved by encounter order: the body's `shapes` list order).
pub fn raycast_body(ray: &Ray, body: &RigidBody) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for shape in &body.shapes {
        let world_transform = crate::transform::place_in(&body.world_transform, &shape.local_transform);
        let local_origin = world_transform.point_relative_to(&ray.origin);
        let local_direction = world_transform.direction_relative_to(&ray.direction);
        let local_ray = Ray {
            origin: local_origin,
            direction: local_direction,
        };
        if let Some((t, point, normal)) = shape_raycast_local(&local_ray, &shape.kind) {
            let world_point = world_transform.point_place_in(&point);
            let world_normal = world_transform.direction_place_in(&normal);
            let distance = (world_point - ray.origin).norm();
            if best.as_ref().map_or(true, |h| distance < h.distance) {
                best = Some(Hit {
                    body_id: body.id,
                    distance,
                    point: world_point,
                    normal: world_normal,
                });
            }
        }
    }
    best
}

/// Raycasts against every body in `bodies`, returning the single closest hit across all of
/// them (ties resolved by encounter order).
pub fn raycast_world(ray: &Ray, bodies: &[RigidBody]) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for body in bodies {
        if let Some(hit) = raycast_body(ray, body) {
            if best.as_ref().map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
    }
    best
}
