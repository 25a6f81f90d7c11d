//! Rigid transforms, phantom-tagged by coordinate frame.
//!
//! A [`Transform3d<From, To>`] carries an origin and orientation that map points expressed in
//! `From` coordinates into `To` coordinates. The tags are zero-sized marker types, so mixing
//! up frames (e.g. placing a shape-local point directly into world space without going
//! through the body transform) is a compile error rather than a runtime bug.

use std::marker::PhantomData;

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::math;

/// Marker type for world-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct World;

/// Marker type for a body's own local coordinates (before center-of-mass reframing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body;

/// Marker type for a body's center-of-mass coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterOfMass;

/// Marker type for a shape's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape;

/// A rigid transform mapping points/directions expressed in `From` into `To`.
///
/// `From` and `To` are phantom type parameters: no value of either type is ever constructed,
/// they exist purely so the compiler can reject transforms and points whose frames don't
/// line up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform3d<From, To> {
    /// Origin of `From`'s frame, expressed in `To` coordinates.
    pub origin: Vector3<f64>,
    /// Orientation mapping `From`'s axes onto `To`'s axes.
    pub orientation: UnitQuaternion<f64>,
    #[serde(skip)]
    _frames: PhantomData<(From, To)>,
}

impl<From, To> Transform3d<From, To> {
    /// The identity transform: origin at zero, no rotation.
    pub fn at_origin() -> Self {
        Self {
            origin: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            _frames: PhantomData,
        }
    }

    /// A pure translation to `p`, with no rotation.
    pub fn at_point(p: Vector3<f64>) -> Self {
        Self {
            origin: p,
            orientation: UnitQuaternion::identity(),
            _frames: PhantomData,
        }
    }

    /// A transform with an explicit origin and orientation.
    pub fn new(origin: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            origin,
            orientation,
            _frames: PhantomData,
        }
    }

    /// Builds a transform from an origin and a right-handed orthonormal basis, extracting the
    /// quaternion via nalgebra's trace-based rotation-matrix decomposition.
    pub fn from_origin_and_basis(
        origin: Vector3<f64>,
        x: Vector3<f64>,
        y: Vector3<f64>,
        z: Vector3<f64>,
    ) -> Self {
        let rotation_matrix = Matrix3::from_columns(&[x, y, z]);
        let rotation = nalgebra::Rotation3::from_matrix_unchecked(rotation_matrix);
        Self {
            origin,
            orientation: UnitQuaternion::from_rotation_matrix(&rotation),
            _frames: PhantomData,
        }
    }

    /// Maps a point expressed in `From` coordinates into `To` coordinates.
    pub fn point_place_in(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.origin + self.orientation * p
    }

    /// Maps a point expressed in `To` coordinates back into `From` coordinates.
    pub fn point_relative_to(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * (p - self.origin)
    }

    /// Maps a direction (ignores translation) from `From` into `To`.
    pub fn direction_place_in(&self, d: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * d
    }

    /// Maps a direction (ignores translation) from `To` back into `From`.
    pub fn direction_relative_to(&self, d: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * d
    }

    /// The inverse transform, mapping `To` back into `From`.
    pub fn inverse(&self) -> Transform3d<To, From> {
        let inv_orientation = self.orientation.inverse();
        Transform3d {
            origin: inv_orientation * (-self.origin),
            orientation: inv_orientation,
            _frames: PhantomData,
        }
    }

    /// Replaces the origin, keeping orientation.
    pub fn move_to(&self, origin: Vector3<f64>) -> Self {
        Self {
            origin,
            orientation: self.orientation,
            _frames: PhantomData,
        }
    }

    /// Translates the origin by `delta`.
    pub fn translate_by(&self, delta: &Vector3<f64>) -> Self {
        Self {
            origin: self.origin + delta,
            orientation: self.orientation,
            _frames: PhantomData,
        }
    }

    /// Rotates in place around the transform's own origin by `angle` about `axis`.
    pub fn rotate_around_own(&self, axis: &Vector3<f64>, angle: f64) -> Self {
        let delta = UnitQuaternion::from_axis_angle(&nalgebra::Unit::new_normalize(*axis), angle);
        Self {
            origin: self.origin,
            orientation: delta * self.orientation,
            _frames: PhantomData,
        }
    }

    /// Applies the quaternion Euler update for angular velocity `omega` over `dt`, then
    /// renormalizes.
    pub fn rotate_by(&self, omega: &Vector3<f64>, dt: f64) -> Self {
        Self {
            origin: self.origin,
            orientation: math::rotate_by(omega, &self.orientation, dt),
            _frames: PhantomData,
        }
    }

    /// Renormalizes the orientation quaternion (a no-op for `UnitQuaternion`, kept for
    /// parity with the spec's explicit normalize step after manual quaternion arithmetic).
    pub fn normalize(&self) -> Self {
        Self {
            origin: self.origin,
            orientation: UnitQuaternion::from_quaternion(self.orientation.into_inner()),
            _frames: PhantomData,
        }
    }

    /// The orientation as a 3x3 rotation matrix.
    pub fn orientation_matrix(&self) -> Matrix3<f64> {
        *self.orientation.to_rotation_matrix().matrix()
    }

    /// Rotates an inertia tensor given in `From` coordinates into `To` coordinates and
    /// translates it by the parallel-axis theorem to be about this transform's origin.
    pub fn inertia_place_in(&self, inertia: &Matrix3<f64>, mass: f64) -> Matrix3<f64> {
        let r = self.orientation_matrix();
        let rotated = r * inertia * r.transpose();
        rotated + math::point_inertia(mass, &self.origin)
    }

    /// `R * I_inv * R^T`: rotates an inverse inertia tensor into this transform's frame.
    pub fn inverted_inertia_rotate_in(&self, inv_inertia: &Matrix3<f64>) -> Matrix3<f64> {
        let r = self.orientation_matrix();
        r * inv_inertia * r.transpose()
    }
}

/// Composes transforms: `outer.place_in(inner)` expresses `inner`'s frame (itself relative to
/// some frame `B`) in terms of the frame `outer` maps into.
pub fn place_in<A, B, C>(outer: &Transform3d<B, C>, inner: &Transform3d<A, B>) -> Transform3d<A, C> {
    Transform3d::new(
        outer.point_place_in(&inner.origin),
        outer.orientation * inner.orientation,
    )
}

/// `relative_to(outer, t) = inverse(outer) ∘ t`: expresses `t` (mapping `A` into `C`) in
/// terms of `outer`'s frame instead.
pub fn relative_to<A, B, C>(outer: &Transform3d<B, C>, t: &Transform3d<A, C>) -> Transform3d<A, B> {
    place_in(&outer.inverse(), t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn place_in_and_relative_to_round_trip() {
        let outer: Transform3d<Body, World> = Transform3d::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let inner: Transform3d<Shape, Body> =
            Transform3d::at_point(Vector3::new(0.5, 0.0, 0.0));

        let composed = place_in(&outer, &inner);
        let recovered = relative_to(&outer, &composed);

        assert_relative_eq!(recovered.origin, inner.origin, epsilon = 1e-10);
    }

    #[test]
    fn point_place_in_and_relative_to_are_inverses() {
        let t: Transform3d<Body, World> = Transform3d::new(
            Vector3::new(1.0, -2.0, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.7),
        );
        let p = Vector3::new(3.0, 4.0, -1.0);
        let world = t.point_place_in(&p);
        let back = t.point_relative_to(&world);
        assert_relative_eq!(back, p, epsilon = 1e-9);
    }

    #[test]
    fn from_origin_and_basis_reproduces_axes() {
        let x = Vector3::new(0.0, 1.0, 0.0);
        let y = Vector3::new(-1.0, 0.0, 0.0);
        let z = Vector3::new(0.0, 0.0, 1.0);
        let t: Transform3d<Body, World> =
            Transform3d::from_origin_and_basis(Vector3::zeros(), x, y, z);
        assert_relative_eq!(t.direction_place_in(&Vector3::x()), x, epsilon = 1e-9);
        assert_relative_eq!(t.direction_place_in(&Vector3::y()), y, epsilon = 1e-9);
        assert_relative_eq!(t.direction_place_in(&Vector3::z()), z, epsilon = 1e-9);
    }

    #[test]
    fn inverse_is_involutive() {
        let t: Transform3d<Body, World> = Transform3d::new(
            Vector3::new(2.0, 0.0, -3.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 1.1),
        );
        let round_trip = t.inverse().inverse();
        assert_relative_eq!(round_trip.origin, t.origin, epsilon = 1e-9);
    }
}
