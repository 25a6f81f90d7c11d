//! Sphere-vs-plane contact generation (also used, with radius zero, for plane-vs-particle
//! pairs).

use nalgebra::Vector3;

use super::Contact;

/// Generates a single contact if the sphere penetrates the plane (signed distance from the
/// plane, along its outward normal, is less than the radius).
pub fn sphere_plane(center: Vector3<f64>, radius: f64, plane_point: Vector3<f64>, plane_normal: Vector3<f64>, out: &mut Vec<Contact>) {
    let signed_distance = (center - plane_point).dot(&plane_normal);
    if signed_distance >= radius {
        return;
    }
    out.push(Contact {
        normal: plane_normal,
        point_i: center - plane_normal * signed_distance,
        point_j: center - plane_normal * radius,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_resting_below_plane_produces_contact() {
        let mut out = Vec::new();
        sphere_plane(
            Vector3::new(0.0, 0.0, 0.5),
            1.0,
            Vector3::zeros(),
            Vector3::z(),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].point_i, Vector3::zeros(), epsilon = 1e-9);
        assert_relative_eq!(out[0].point_j, Vector3::new(0.0, 0.0, -0.5), epsilon = 1e-9);
    }

    #[test]
    fn sphere_above_plane_produces_no_contact() {
        let mut out = Vec::new();
        sphere_plane(
            Vector3::new(0.0, 0.0, 5.0),
            1.0,
            Vector3::zeros(),
            Vector3::z(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
