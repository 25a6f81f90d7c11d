//! Shapes (the per-body collision geometry variants) and their AABBs.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::convex::Convex;
use crate::error::{PhysicsError, PhysicsResult};
use crate::transform::{Shape as ShapeFrame, Transform3d};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Componentwise minimum corner.
    pub lower_bound: Vector3<f64>,
    /// Componentwise maximum corner.
    pub upper_bound: Vector3<f64>,
}

impl Aabb {
    /// The sentinel AABB such that extending it with any other AABB yields that other AABB.
    pub fn impossible() -> Self {
        Self {
            lower_bound: Vector3::new(f64::MAX, f64::MAX, f64::MAX),
            upper_bound: Vector3::new(-f64::MAX, -f64::MAX, -f64::MAX),
        }
    }

    /// The full `±MAX` box, used as a conservative fallback for non-axis-aligned planes.
    pub fn full() -> Self {
        Self {
            lower_bound: Vector3::new(-f64::MAX, -f64::MAX, -f64::MAX),
            upper_bound: Vector3::new(f64::MAX, f64::MAX, f64::MAX),
        }
    }

    /// Componentwise envelope of `a` and `b`.
    pub fn extend(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb {
            lower_bound: Vector3::new(
                a.lower_bound.x.min(b.lower_bound.x),
                a.lower_bound.y.min(b.lower_bound.y),
                a.lower_bound.z.min(b.lower_bound.z),
            ),
            upper_bound: Vector3::new(
                a.upper_bound.x.max(b.upper_bound.x),
                a.upper_bound.y.max(b.upper_bound.y),
                a.upper_bound.z.max(b.upper_bound.z),
            ),
        }
    }

    /// Componentwise extents (`upper_bound - lower_bound`).
    pub fn extents(&self) -> Vector3<f64> {
        self.upper_bound - self.lower_bound
    }
}

/// The kind-specific geometry of a [`ShapeInstance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeKind {
    /// An immutable convex polyhedron.
    Convex(Convex),
    /// An infinite plane; by convention its local +z axis is the outward normal.
    Plane,
    /// A sphere of the given radius (> 0).
    Sphere(f64),
    /// A zero-size point.
    Particle,
}

/// A shape attached to a body: its kind plus the shape-local transform.
///
/// `Frame` is the frame the shape is attached to — `Body` before a [`crate::body::Body`] has
/// reframed its shapes to center-of-mass coordinates at construction, `CenterOfMass`
/// afterwards. Keeping this a type parameter (rather than hard-coding one frame) lets the
/// same shape type describe both the "as authored" and "as simulated" attachment without a
/// runtime tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeInstance<Frame> {
    /// The shape's kind-specific geometry.
    pub kind: ShapeKind,
    /// Shape-local transform (shape-local coordinates placed into `Frame`).
    pub local_transform: Transform3d<ShapeFrame, Frame>,
}

impl<Frame> ShapeInstance<Frame> {
    /// A convex shape at the given local transform. Rejects degenerate meshes (fewer than 4
    /// vertices, or zero volume) with [`PhysicsError::InvalidShape`].
    pub fn convex(convex: Convex, local_transform: Transform3d<ShapeFrame, Frame>) -> PhysicsResult<Self> {
        if convex.vertices.len() < 4 {
            return Err(PhysicsError::InvalidShape(format!(
                "convex shape needs at least 4 vertices, got {}",
                convex.vertices.len()
            )));
        }
        if convex.volume <= 0.0 {
            return Err(PhysicsError::InvalidShape(
                "convex shape has zero or negative volume".to_string(),
            ));
        }
        Ok(Self {
            kind: ShapeKind::Convex(convex),
            local_transform,
        })
    }

    /// An infinite plane shape, with outward normal along the local transform's +z axis.
    pub fn plane(local_transform: Transform3d<ShapeFrame, Frame>) -> Self {
        Self {
            kind: ShapeKind::Plane,
            local_transform,
        }
    }

    /// A sphere shape. Rejects `radius <= 0` with [`PhysicsError::InvalidShape`].
    pub fn sphere(radius: f64, local_transform: Transform3d<ShapeFrame, Frame>) -> PhysicsResult<Self> {
        if radius <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "sphere radius must be > 0, got {radius}"
            )));
        }
        Ok(Self {
            kind: ShapeKind::Sphere(radius),
            local_transform,
        })
    }

    /// A zero-size particle shape.
    pub fn particle(local_transform: Transform3d<ShapeFrame, Frame>) -> Self {
        Self {
            kind: ShapeKind::Particle,
            local_transform,
        }
    }

    /// Volume of the shape: 0 for Plane/Particle, `(4/3)πr³` for Sphere, the convex's cached
    /// volume for Convex.
    pub fn volume(&self) -> f64 {
        match &self.kind {
            ShapeKind::Convex(c) => c.volume,
            ShapeKind::Plane | ShapeKind::Particle => 0.0,
            ShapeKind::Sphere(r) => (4.0 / 3.0) * PI * r.powi(3),
        }
    }

    /// Re-expresses this shape relative to a different frame, given the transform from the
    /// new frame into the old one composed the other way: `reframe_into(t)` where `t: Frame
    /// -> NewFrame` yields a shape whose `local_transform` maps `Shape -> NewFrame`.
    pub fn reframe_into<NewFrame>(&self, t: &Transform3d<Frame, NewFrame>) -> ShapeInstance<NewFrame> {
        ShapeInstance {
            kind: self.kind.clone(),
            local_transform: crate::transform::place_in(t, &self.local_transform),
        }
    }

    /// AABB of this shape at the given local-to-`F` transform (works for any target frame,
    /// e.g. `CenterOfMass` while computing body-relative mass properties, or `World` during
    /// the narrow phase).
    pub fn aabb<F>(&self, world_transform: &Transform3d<ShapeFrame, F>) -> Aabb {
        match &self.kind {
            ShapeKind::Sphere(r) => {
                let c = world_transform.origin;
                let rv = Vector3::new(*r, *r, *r);
                Aabb {
                    lower_bound: c - rv,
                    upper_bound: c + rv,
                }
            }
            ShapeKind::Particle => Aabb {
                lower_bound: world_transform.origin,
                upper_bound: world_transform.origin,
            },
            ShapeKind::Convex(convex) => {
                let mut aabb = Aabb::impossible();
                for v in &convex.vertices {
                    let world_v = world_transform.point_place_in(v);
                    let point_aabb = Aabb {
                        lower_bound: world_v,
                        upper_bound: world_v,
                    };
                    aabb = Aabb::extend(&aabb, &point_aabb);
                }
                aabb
            }
            ShapeKind::Plane => {
                let n = world_transform.direction_place_in(&Vector3::z());
                let p0 = world_transform.origin;
                let axis = [Vector3::x(), Vector3::y(), Vector3::z()]
                    .into_iter()
                    .enumerate()
                    .find(|(_, axis)| (n.dot(axis)).abs() > 1.0 - 1e-6);

                match axis {
                    Some((i, axis)) => {
                        let sign = n.dot(&axis).signum();
                        let d = p0.dot(&axis);
                        let mut lower = Vector3::new(-f64::MAX, -f64::MAX, -f64::MAX);
                        let mut upper = Vector3::new(f64::MAX, f64::MAX, f64::MAX);
                        if sign > 0.0 {
                            upper[i] = d;
                        } else {
                            lower[i] = d;
                        }
                        Aabb {
                            lower_bound: lower,
                            upper_bound: upper,
                        }
                    }
                    None => Aabb::full(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Transform3d, World};
    use approx::assert_relative_eq;

    #[test]
    fn sphere_volume_matches_formula() {
        let shape: ShapeInstance<World> = ShapeInstance::sphere(2.0, Transform3d::at_origin()).unwrap();
        assert_relative_eq!(shape.volume(), (4.0 / 3.0) * PI * 8.0, epsilon = 1e-9);
    }

    #[test]
    fn plane_and_particle_have_zero_volume() {
        let plane: ShapeInstance<World> = ShapeInstance::plane(Transform3d::at_origin());
        let particle: ShapeInstance<World> = ShapeInstance::particle(Transform3d::at_origin());
        assert_eq!(plane.volume(), 0.0);
        assert_eq!(particle.volume(), 0.0);
    }

    #[test]
    fn sphere_rejects_nonpositive_radius() {
        assert!(ShapeInstance::<World>::sphere(0.0, Transform3d::at_origin()).is_err());
        assert!(ShapeInstance::<World>::sphere(-1.0, Transform3d::at_origin()).is_err());
    }

    #[test]
    fn convex_rejects_degenerate_mesh() {
        let degenerate = Convex::init(vec![vec![0, 1, 2]], vec![Vector3::zeros(); 3]);
        assert!(ShapeInstance::<World>::convex(degenerate, Transform3d::at_origin()).is_err());
    }

    #[test]
    fn axis_aligned_plane_aabb_is_half_infinite() {
        let plane: ShapeInstance<World> = ShapeInstance::plane(Transform3d::at_origin());
        let world_transform: Transform3d<crate::transform::Shape, World> =
            Transform3d::at_point(Vector3::new(0.0, 0.0, 3.0));
        let aabb = plane.aabb(&world_transform);
        assert_relative_eq!(aabb.upper_bound.z, 3.0, epsilon = 1e-9);
        assert_eq!(aabb.lower_bound.z, -f64::MAX);
    }
}
