//! Sphere-vs-sphere contact generation (also used, with one radius zeroed, for
//! sphere-vs-particle pairs).

use nalgebra::Vector3;

use super::Contact;

/// Generates a single contact if the spheres overlap (`‖c1 - c2‖ <= r1 + r2`); the contact
/// points sit on each sphere's surface along the center line, so for a penetrating pair they
/// do not coincide.
pub fn sphere_sphere(c1: Vector3<f64>, r1: f64, c2: Vector3<f64>, r2: f64, out: &mut Vec<Contact>) {
    let delta = c2 - c1;
    let dist = delta.norm();
    if dist > r1 + r2 {
        return;
    }
    let normal = if dist > crate::math::EPSILON {
        delta / dist
    } else {
        Vector3::x()
    };
    out.push(Contact {
        normal,
        point_i: c1 + normal * r1,
        point_j: c2 - normal * r2,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn overlapping_spheres_produce_one_contact() {
        let mut out = Vec::new();
        sphere_sphere(Vector3::zeros(), 1.0, Vector3::new(1.5, 0.0, 0.0), 1.0, &mut out);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].normal, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn separated_spheres_produce_no_contact() {
        let mut out = Vec::new();
        sphere_sphere(Vector3::zeros(), 1.0, Vector3::new(5.0, 0.0, 0.0), 1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn coincident_centers_fall_back_to_x_normal() {
        let mut out = Vec::new();
        sphere_sphere(Vector3::zeros(), 1.0, Vector3::zeros(), 1.0, &mut out);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].normal, Vector3::x(), epsilon = 1e-9);
    }

    #[test]
    fn exact_tangency_produces_contact() {
        let mut out = Vec::new();
        sphere_sphere(Vector3::zeros(), 1.0, Vector3::new(2.0, 0.0, 0.0), 1.0, &mut out);
        assert_eq!(out.len(), 1);
    }
}
