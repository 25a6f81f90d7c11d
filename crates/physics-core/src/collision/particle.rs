//! Contact kernels involving zero-size particles and infinite planes against a convex hull.

use nalgebra::Vector3;

use crate::convex::Convex;
use crate::math::EPSILON;

use super::Contact;

/// Plane-vs-convex: generates one contact per hull vertex that penetrates the plane's
/// half-space, each sharing the plane's normal (a flat contact manifold rather than a single
/// deepest point, so the solver sees the true support polygon when a face rests flush on the
/// plane).
pub fn plane_convex(plane_point: Vector3<f64>, plane_normal: Vector3<f64>, convex: &Convex, out: &mut Vec<Contact>) {
    for v in &convex.vertices {
        let signed_distance = (v - plane_point).dot(&plane_normal);
        if signed_distance < 0.0 {
            out.push(Contact {
                normal: plane_normal,
                point_i: v - plane_normal * signed_distance,
                point_j: *v,
            });
        }
    }
}

/// Particle-vs-convex: a contact exists only while the particle lies strictly inside the
/// hull (all face half-spaces satisfied); the contact normal is that of the least-penetrated
/// (closest) face, matching the "push the particle back out the nearest wall" intuition.
pub fn particle_convex(point: Vector3<f64>, convex: &Convex, out: &mut Vec<Contact>) {
    let mut best: Option<(f64, Vector3<f64>)> = None;

    for face in &convex.faces {
        let p = convex.vertices[face.indices[0]];
        let signed_distance = (point - p).dot(&face.normal);
        if signed_distance >= 0.0 {
            return; // outside this face's half-space: outside the hull entirely
        }
        match best {
            Some((bd, _)) if signed_distance <= bd => {}
            _ => best = Some((signed_distance, face.normal)),
        }
    }

    if let Some((signed_distance, normal)) = best {
        let normal = if normal.norm() > EPSILON { normal } else { Vector3::z() };
        out.push(Contact {
            normal,
            point_i: point - normal * signed_distance,
            point_j: point,
        });
    }
}
