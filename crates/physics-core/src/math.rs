//! Vector, quaternion and matrix helpers layered on top of `nalgebra`.
//!
//! The core stores vectors as `nalgebra::Vector3<f64>`, orientations as
//! `nalgebra::UnitQuaternion<f64>`, and inertia tensors as `nalgebra::Matrix3<f64>`. This
//! module adds the handful of named operations the simulation pipeline needs that are not
//! already methods on those types (tangent-basis construction, the Euler rotation update,
//! near-zero tests, and an inverse that degrades to a zero matrix instead of `None`).

use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Absolute-value threshold below which a component is treated as zero.
pub const EPSILON: f64 = 1e-6;

/// Returns true if every component of `v` has absolute value at most [`EPSILON`].
pub fn almost_zero(v: &Vector3<f64>) -> bool {
    v.x.abs() <= EPSILON && v.y.abs() <= EPSILON && v.z.abs() <= EPSILON
}

/// Returns the unit vector `a - b`, normalized.
///
/// Undefined (produces a NaN vector) if `a == b`; callers are expected to ensure the points
/// differ, matching the reference pipeline's "caller ensures non-zero" contract.
pub fn direction(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    (a - b).normalize()
}

/// Linear interpolation between `a` and `b` at parameter `t`.
pub fn lerp(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    a + (b - a) * t
}

/// Builds an orthonormal basis `(t1, t2)` such that `{n, t1, t2}` is right-handed, given a
/// unit vector `n`.
///
/// Picks `x̂` or `ŷ` as the auxiliary axis depending on how closely `n` aligns with `x̂`, to
/// avoid a near-degenerate cross product.
pub fn tangents(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let aux = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let t1 = n.cross(&aux).normalize();
    let t2 = n.cross(&t1);
    (t1, t2)
}

/// Moment of inertia of a point mass `m` at `r` (relative to the origin about which inertia
/// is being accumulated).
pub fn point_inertia(m: f64, r: &Vector3<f64>) -> Matrix3<f64> {
    let (x, y, z) = (r.x, r.y, r.z);
    Matrix3::new(
        m * (y * y + z * z),
        -m * x * y,
        -m * x * z,
        -m * x * y,
        m * (x * x + z * z),
        -m * y * z,
        -m * x * z,
        -m * y * z,
        m * (x * x + y * y),
    )
}

/// Inverse of a 3x3 matrix, falling back to the zero matrix when the matrix is singular.
///
/// Mirrors `nalgebra::Matrix3::try_inverse`, but returns a total value: callers that rely on
/// an all-zero inverse inertia tensor for infinite-mass axes depend on this fallback rather
/// than an `Option`.
pub fn inverse_or_zero(m: &Matrix3<f64>) -> Matrix3<f64> {
    m.try_inverse().unwrap_or_else(Matrix3::zeros)
}

/// Applies the Euler-step update `q' = q + (1/2) * omega_quat * q` to a unit quaternion and
/// renormalizes the result.
///
/// This is the rotation ODE's explicit Euler step, used by the integrator to advance
/// orientation by one step's worth of angular velocity. It is not itself norm-preserving,
/// which is why the result is renormalized before being wrapped back into a `UnitQuaternion`.
pub fn rotate_by(omega: &Vector3<f64>, q: &UnitQuaternion<f64>, dt: f64) -> UnitQuaternion<f64> {
    let omega_quat = Quaternion::new(0.0, omega.x, omega.y, omega.z);
    let raw = q.into_inner();
    let derivative = omega_quat * raw * 0.5;
    let updated = raw + derivative * dt;
    UnitQuaternion::from_quaternion(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn almost_zero_detects_small_vectors() {
        assert!(almost_zero(&Vector3::new(1e-7, -1e-7, 0.0)));
        assert!(!almost_zero(&Vector3::new(1e-3, 0.0, 0.0)));
    }

    #[test]
    fn direction_points_from_b_to_a() {
        let a = Vector3::new(3.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 0.0, 0.0);
        assert_relative_eq!(direction(&a, &b), Vector3::x(), epsilon = 1e-10);
    }

    #[test]
    fn tangents_form_orthonormal_basis() {
        let n = Vector3::new(0.0, 0.0, 1.0).normalize();
        let (t1, t2) = tangents(&n);
        assert_relative_eq!(t1.dot(&n), 0.0, epsilon = 1e-10);
        assert_relative_eq!(t2.dot(&n), 0.0, epsilon = 1e-10);
        assert_relative_eq!(t1.dot(&t2), 0.0, epsilon = 1e-10);
        assert_relative_eq!(t1.norm(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(t2.norm(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn tangents_switches_aux_axis_near_x() {
        let n = Vector3::new(1.0, 0.0, 0.0);
        let (t1, t2) = tangents(&n);
        assert_relative_eq!(t1.dot(&n), 0.0, epsilon = 1e-10);
        assert_relative_eq!(t2.dot(&n), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn inverse_or_zero_falls_back_on_singular() {
        let singular = Matrix3::zeros();
        let inv = inverse_or_zero(&singular);
        assert_eq!(inv, Matrix3::zeros());
    }

    #[test]
    fn inverse_or_zero_round_trips_nonsingular() {
        let m = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
        let inv = inverse_or_zero(&m);
        let round_trip = inverse_or_zero(&inv);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(round_trip[(i, j)], m[(i, j)], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn rotate_by_preserves_unit_norm() {
        let q = UnitQuaternion::identity();
        let omega = Vector3::new(0.1, 0.2, 0.3);
        let q2 = rotate_by(&omega, &q, 1.0 / 60.0);
        assert_relative_eq!(q2.into_inner().norm(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn point_inertia_matches_known_formula() {
        let r = Vector3::new(1.0, 0.0, 0.0);
        let i = point_inertia(2.0, &r);
        assert_relative_eq!(i[(0, 0)], 0.0, epsilon = 1e-10);
        assert_relative_eq!(i[(1, 1)], 2.0, epsilon = 1e-10);
        assert_relative_eq!(i[(2, 2)], 2.0, epsilon = 1e-10);
    }
}
