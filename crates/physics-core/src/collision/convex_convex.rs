//! Convex-vs-convex contact generation: Separating Axis Theorem to find the minimum
//! penetration axis, then Sutherland-Hodgman clipping of the incident face against the
//! reference face's side planes to build a full contact manifold.

use nalgebra::Vector3;

use crate::convex::{Convex, Face};
use crate::math::EPSILON;

use super::Contact;

struct Axis {
    direction: Vector3<f64>,
    depth: f64,
}

fn project(convex: &Convex, axis: &Vector3<f64>) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = -f64::MAX;
    for v in &convex.vertices {
        let d = v.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Tests one candidate separating axis; returns `None` if it actually separates the hulls,
/// otherwise the (normalized) axis and the overlap depth along it.
fn test_axis(a: &Convex, b: &Convex, axis: Vector3<f64>) -> Option<Axis> {
    if axis.norm() < EPSILON {
        return None;
    }
    let axis = axis.normalize();
    let (min_a, max_a) = project(a, &axis);
    let (min_b, max_b) = project(b, &axis);
    let overlap = (max_a.min(max_b)) - (min_a.max(min_b));
    if overlap <= 0.0 {
        return None;
    }
    // Orient the axis to point from A towards B.
    let center_delta = b.center - a.center;
    let direction = if center_delta.dot(&axis) < 0.0 { -axis } else { axis };
    Some(Axis { direction, depth: overlap })
}

fn find_minimum_penetration(a: &Convex, b: &Convex) -> Option<Axis> {
    let mut best: Option<Axis> = None;
    let mut consider = |candidate: Option<Axis>| {
        if let Some(c) = candidate {
            if best.as_ref().map_or(true, |b| c.depth < b.depth) {
                best = Some(c);
            }
        }
    };

    for n in &a.unique_normals {
        consider(test_axis(a, b, *n));
    }
    for n in &b.unique_normals {
        consider(test_axis(a, b, *n));
    }
    for ea in &a.unique_edges {
        for eb in &b.unique_edges {
            consider(test_axis(a, b, ea.cross(eb)));
        }
    }
    best
}

fn reference_face<'a>(convex: &'a Convex, normal: Vector3<f64>) -> &'a Face {
    convex
        .faces
        .iter()
        .max_by(|f1, f2| {
            f1.normal
                .dot(&normal)
                .partial_cmp(&f2.normal.dot(&normal))
                .unwrap()
        })
        .expect("convex hull always has at least one face")
}

fn incident_face<'a>(convex: &'a Convex, reference_normal: Vector3<f64>) -> &'a Face {
    convex
        .faces
        .iter()
        .min_by(|f1, f2| {
            f1.normal
                .dot(&reference_normal)
                .partial_cmp(&f2.normal.dot(&reference_normal))
                .unwrap()
        })
        .expect("convex hull always has at least one face")
}

/// One edge of a polygon being clipped, carrying both endpoints' original (pre-clip) depth
/// along the reference normal so clipped-in intersection points can interpolate it.
#[derive(Clone, Copy)]
struct ClipVertex {
    position: Vector3<f64>,
}

/// Clips `polygon` against the half-space `{p : (p - plane_point) . plane_normal <= 0}`.
fn clip_against_plane(polygon: &[ClipVertex], plane_point: Vector3<f64>, plane_normal: Vector3<f64>) -> Vec<ClipVertex> {
    if polygon.is_empty() {
        return Vec::new();
    }
    let mut output = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let current = polygon[i];
        let next = polygon[(i + 1) % polygon.len()];
        let d_current = (current.position - plane_point).dot(&plane_normal);
        let d_next = (next.position - plane_point).dot(&plane_normal);

        if d_current <= 0.0 {
            output.push(current);
        }
        if (d_current <= 0.0) != (d_next <= 0.0) {
            let t = d_current / (d_current - d_next);
            let position = current.position + (next.position - current.position) * t;
            output.push(ClipVertex { position });
        }
    }
    output
}

/// Generates a contact manifold for two convex hulls via SAT (to find the minimum
/// penetration axis) followed by face clipping. `max_clip_depth` bounds how far a clipped
/// point may lie behind the reference face before it is discarded as noise.
pub fn convex_convex(a: &Convex, b: &Convex, max_clip_depth: f64, out: &mut Vec<Contact>) {
    let Some(axis) = find_minimum_penetration(a, b) else {
        return;
    };

    // Decide which hull contributes the reference face: whichever has a face more nearly
    // parallel to the separating axis.
    let a_face = reference_face(a, axis.direction);
    let b_face = reference_face(b, -axis.direction);
    let (reference, reference_owner, incident) = if a_face.normal.dot(&axis.direction) >= b_face.normal.dot(&-axis.direction) {
        (a_face, a, incident_face(b, a_face.normal))
    } else {
        (b_face, b, incident_face(a, b_face.normal))
    };

    let reference_normal = reference.normal;
    let reference_point = reference_owner.vertices[reference.indices[0]];

    let reference_is_a = std::ptr::eq(reference_owner, a);

    let mut polygon: Vec<ClipVertex> = incident
        .indices
        .iter()
        .map(|&i| ClipVertex {
            position: if reference_is_a { b.vertices[i] } else { a.vertices[i] },
        })
        .collect();

    for i in 0..reference.indices.len() {
        let v0 = reference_owner.vertices[reference.indices[i]];
        let v1 = reference_owner.vertices[reference.indices[(i + 1) % reference.indices.len()]];
        let edge = v1 - v0;
        let side_normal = edge.cross(&reference_normal).normalize();
        polygon = clip_against_plane(&polygon, v0, side_normal);
        if polygon.is_empty() {
            return;
        }
    }

    for vertex in &polygon {
        let depth = (reference_point - vertex.position).dot(&reference_normal);
        if depth < 0.0 || depth > max_clip_depth {
            continue;
        }
        let (point_i, point_j, normal) = if reference_is_a {
            (vertex.position + reference_normal * depth, vertex.position, reference_normal)
        } else {
            (vertex.position, vertex.position + reference_normal * depth, -reference_normal)
        };
        out.push(Contact {
            normal,
            point_i,
            point_j,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Transform3d, World};

    #[test]
    fn overlapping_blocks_produce_a_manifold() {
        let a = Convex::from_block(1.0, 1.0, 1.0);
        let b = Convex::from_block(1.0, 1.0, 1.0)
            .place_in(&Transform3d::<World, World>::at_point(Vector3::new(0.0, 0.0, 1.5)));
        let mut out = Vec::new();
        convex_convex(&a, &b, 100.0, &mut out);
        assert!(!out.is_empty());
        for c in &out {
            assert!(c.normal.z.abs() > 0.9);
        }
    }

    #[test]
    fn separated_blocks_produce_no_contacts() {
        let a = Convex::from_block(1.0, 1.0, 1.0);
        let b = Convex::from_block(1.0, 1.0, 1.0)
            .place_in(&Transform3d::<World, World>::at_point(Vector3::new(0.0, 0.0, 10.0)));
        let mut out = Vec::new();
        convex_convex(&a, &b, 100.0, &mut out);
        assert!(out.is_empty());
    }
}
