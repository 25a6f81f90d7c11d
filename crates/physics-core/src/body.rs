//! Rigid bodies.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::DefaultsConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math;
use crate::shape::ShapeInstance;
use crate::transform::{Body as BodyFrame, CenterOfMass, Transform3d, World};

/// Sentinel id for padding/filler bodies in the solver's flat array; never a real body.
pub const SENTINEL_ID: i64 = -1;

/// Surface material properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Coefficient of restitution (bounciness), clamped to `[0, 1]`.
    pub bounciness: f64,
    /// Coefficient of friction, clamped to `[0, 1]`.
    pub friction: f64,
}

impl Material {
    /// A new material, clamping both coefficients into `[0, 1]`.
    pub fn new(bounciness: f64, friction: f64) -> Self {
        Self {
            bounciness: bounciness.clamp(0.0, 1.0),
            friction: friction.clamp(0.0, 1.0),
        }
    }

    /// The bounded average of two coefficients, as used when combining contacting materials.
    pub fn combine(a: f64, b: f64) -> f64 {
        ((a + b) * 0.5).clamp(0.0, 1.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.0, 0.3)
    }
}

/// Mass properties: mass, local inertia diagonal, and their inverses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    /// Mass (kg). Zero means static.
    pub mass: f64,
    /// `1/mass`, or `0` when static.
    pub inverse_mass: f64,
    /// Diagonal of the local inertia tensor (principal axes assumed aligned with body axes).
    pub local_inertia_diagonal: Vector3<f64>,
    /// Componentwise inverse of `local_inertia_diagonal`, `0` where the diagonal entry is `0`.
    pub inverse_local_inertia: Vector3<f64>,
}

impl MassProperties {
    /// Static (infinite-mass) properties: zero mass, zero inertia, all inverses zero.
    pub fn static_body() -> Self {
        Self {
            mass: 0.0,
            inverse_mass: 0.0,
            local_inertia_diagonal: Vector3::zeros(),
            inverse_local_inertia: Vector3::zeros(),
        }
    }

    /// Derives mass properties for `mass` treating the body as a uniform block with the given
    /// AABB extents (the reference pipeline's deliberate approximation: inertia is derived
    /// from the axis-aligned bounding box, not the actual shape geometry).
    pub fn from_box_approximation(mass: f64, extents: Vector3<f64>) -> Self {
        if mass <= 0.0 {
            return Self::static_body();
        }
        let (ex, ey, ez) = (extents.x, extents.y, extents.z);
        let ixx = mass * (ey * ey + ez * ez) / 12.0;
        let iyy = mass * (ex * ex + ez * ez) / 12.0;
        let izz = mass * (ey * ey + ex * ex) / 12.0;
        let diagonal = Vector3::new(ixx, iyy, izz);
        let inverse = Vector3::new(
            if ixx > 0.0 { 1.0 / ixx } else { 0.0 },
            if iyy > 0.0 { 1.0 / iyy } else { 0.0 },
            if izz > 0.0 { 1.0 / izz } else { 0.0 },
        );
        Self {
            mass,
            inverse_mass: 1.0 / mass,
            local_inertia_diagonal: diagonal,
            inverse_local_inertia: inverse,
        }
    }

    /// `true` when all three inverse-inertia components are equal, in which case the
    /// inverse world inertia tensor is just that scalar times identity and does not need to
    /// be recomputed on every orientation change.
    pub fn is_isotropic(&self) -> bool {
        let v = self.inverse_local_inertia;
        (v.x - v.y).abs() < 1e-12 && (v.y - v.z).abs() < 1e-12
    }
}

/// A dynamic (or static, when `mass == 0`) rigid body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    /// Unique non-negative id. [`SENTINEL_ID`] is reserved for solver padding.
    pub id: i64,
    /// Opaque handle to caller-owned user data.
    pub user_data: u64,
    /// Surface material.
    pub material: Material,
    /// World transform of the body's center-of-mass frame.
    pub world_transform: Transform3d<CenterOfMass, World>,
    /// Fixed body-frame-to-center-of-mass transform, computed once at construction.
    pub body_to_com: Transform3d<BodyFrame, CenterOfMass>,
    /// Linear velocity (m/s), world frame.
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity (rad/s), world frame.
    pub angular_velocity: Vector3<f64>,
    /// Mass properties.
    pub mass_properties: MassProperties,
    /// Cached inverse world inertia tensor, updated on orientation change.
    pub inverse_world_inertia: Matrix3<f64>,
    /// Linear damping, in `[0, 1]`.
    pub linear_damping: f64,
    /// Angular damping, in `[0, 1]`.
    pub angular_damping: f64,
    /// Accumulated force (N), cleared at the end of each integration step.
    pub force: Vector3<f64>,
    /// Accumulated torque (N*m), cleared at the end of each integration step.
    pub torque: Vector3<f64>,
    /// Shapes, reframed into center-of-mass coordinates at construction.
    pub shapes: Vec<ShapeInstance<CenterOfMass>>,
    /// Bounding-sphere radius about the center of mass; covers every shape's farthest point.
    pub bounding_sphere_radius: f64,
}

fn volume_weighted_center_of_mass(shapes: &[ShapeInstance<BodyFrame>]) -> Vector3<f64> {
    let total_volume: f64 = shapes.iter().map(|s| s.volume()).sum();
    if total_volume <= 0.0 {
        return Vector3::zeros();
    }
    let weighted: Vector3<f64> = shapes
        .iter()
        .map(|s| s.local_transform.origin * s.volume())
        .sum();
    weighted / total_volume
}

fn body_aabb_extents(shapes: &[ShapeInstance<CenterOfMass>]) -> Vector3<f64> {
    use crate::shape::Aabb;
    let mut aabb = Aabb::impossible();
    for shape in shapes {
        aabb = Aabb::extend(&aabb, &shape.aabb(&shape.local_transform));
    }
    if aabb.lower_bound.x > aabb.upper_bound.x {
        return Vector3::zeros(); // no shapes: degenerate AABB, zero extents.
    }
    aabb.extents()
}

fn bounding_sphere_radius_of(shapes: &[ShapeInstance<CenterOfMass>]) -> f64 {
    use crate::shape::ShapeKind;
    let mut radius = 0.0_f64;
    for shape in shapes {
        let offset = shape.local_transform.origin.norm();
        radius = match &shape.kind {
            ShapeKind::Sphere(r) => radius.max(offset + r),
            ShapeKind::Particle => radius.max(offset),
            ShapeKind::Plane => radius, // infinite; does not bound the sphere.
            ShapeKind::Convex(convex) => {
                let placed = convex.place_in(&shape.local_transform);
                radius.max(placed.expand_bounding_sphere_radius(0.0))
            }
        };
    }
    radius
}

impl RigidBody {
    /// Builds a body from a list of shapes authored in body-local coordinates and an opaque
    /// user data handle, using the engine's built-in default material and damping values.
    /// Computes the volume-weighted center of mass, reframes shapes into center-of-mass
    /// coordinates, and derives a zero-mass (static) body's mass properties; call
    /// [`RigidBody::update_mass_properties`] to make it dynamic.
    ///
    /// Equivalent to [`RigidBody::from_shapes_with_defaults`] with [`DefaultsConfig::default`].
    pub fn from_shapes(
        id: i64,
        shapes: Vec<ShapeInstance<BodyFrame>>,
        user_data: u64,
    ) -> PhysicsResult<Self> {
        Self::from_shapes_with_defaults(id, shapes, user_data, &DefaultsConfig::default())
    }

    /// Builds a body the same way as [`RigidBody::from_shapes`], but takes its material and
    /// damping values from `defaults` rather than the engine's built-in constants — this is
    /// the hook a caller tuning [`PhysicsConfig::defaults`](crate::config::PhysicsConfig)
    /// for unusual scales or materials should use instead of `from_shapes`.
    pub fn from_shapes_with_defaults(
        id: i64,
        shapes: Vec<ShapeInstance<BodyFrame>>,
        user_data: u64,
        defaults: &DefaultsConfig,
    ) -> PhysicsResult<Self> {
        let center_of_mass = volume_weighted_center_of_mass(&shapes);
        let body_to_com: Transform3d<BodyFrame, CenterOfMass> =
            Transform3d::at_point(-center_of_mass);

        let reframed: Vec<ShapeInstance<CenterOfMass>> =
            shapes.iter().map(|s| s.reframe_into(&body_to_com)).collect();

        let bounding_sphere_radius = bounding_sphere_radius_of(&reframed);

        let mut body = Self {
            id,
            user_data,
            material: Material::new(defaults.restitution, defaults.friction),
            world_transform: Transform3d::at_origin(),
            body_to_com,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass_properties: MassProperties::static_body(),
            inverse_world_inertia: Matrix3::zeros(),
            linear_damping: defaults.linear_damping,
            angular_damping: defaults.angular_damping,
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
            shapes: reframed,
            bounding_sphere_radius,
        };
        body.update_mass_properties(0.0)?;
        Ok(body)
    }

    /// `true` when this body is static (zero mass) and therefore never moved by the
    /// simulation.
    pub fn is_static(&self) -> bool {
        self.mass_properties.mass == 0.0
    }

    /// Recomputes mass properties for the given `mass` from the body's current AABB (treated
    /// as a uniform block — see [`MassProperties::from_box_approximation`]). `mass == 0.0`
    /// makes the body static. Rejects negative mass with [`PhysicsError::InvalidMass`].
    pub fn update_mass_properties(&mut self, mass: f64) -> PhysicsResult<()> {
        if mass < 0.0 {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let extents = body_aabb_extents(&self.shapes);
        self.mass_properties = if mass == 0.0 {
            MassProperties::static_body()
        } else {
            MassProperties::from_box_approximation(mass, extents)
        };
        self.recompute_world_inertia();
        Ok(())
    }

    /// Recomputes [`RigidBody::inverse_world_inertia`] from the current orientation, unless
    /// the local inverse inertia is isotropic (in which case the world tensor is always a
    /// scalar multiple of identity and does not need recomputation).
    pub fn recompute_world_inertia(&mut self) {
        if self.is_static() {
            self.inverse_world_inertia = Matrix3::zeros();
            return;
        }
        if self.mass_properties.is_isotropic() {
            let k = self.mass_properties.inverse_local_inertia.x;
            self.inverse_world_inertia = Matrix3::identity() * k;
            return;
        }
        let local_inv = Matrix3::from_diagonal(&self.mass_properties.inverse_local_inertia);
        self.inverse_world_inertia = self.world_transform.inverted_inertia_rotate_in(&local_inv);
    }

    /// The body-origin position in world space (as opposed to the center-of-mass position
    /// tracked internally by `world_transform`).
    pub fn position(&self) -> Vector3<f64> {
        crate::transform::place_in(&self.world_transform, &self.body_to_com).origin
    }

    /// Adds `mass * g` to the accumulated force. No-op on static bodies.
    pub fn add_gravity(&mut self, g: &Vector3<f64>) {
        if !self.is_static() {
            self.force += self.mass_properties.mass * g;
        }
    }

    /// Overwrites the accumulated force and torque for this step:
    /// `force = amount * direction`, `torque = (point - origin) x force`.
    ///
    /// This overwrites rather than accumulates, matching the reference pipeline; calling it
    /// twice in the same step loses the first call's contribution. No-op on static bodies.
    /// Rejects a non-unit-length-checked zero direction with [`PhysicsError::InvalidDirection`].
    pub fn apply_force(
        &mut self,
        amount: f64,
        direction: &Vector3<f64>,
        point_in_world: &Vector3<f64>,
    ) -> PhysicsResult<()> {
        if math::almost_zero(direction) {
            return Err(PhysicsError::InvalidDirection(
                "force direction must be non-zero".to_string(),
            ));
        }
        if self.is_static() {
            return Ok(());
        }
        let force = direction.normalize() * amount;
        self.force = force;
        let r = point_in_world - self.world_transform.origin;
        self.torque = r.cross(&force);
        Ok(())
    }

    /// Applies an instantaneous impulse at a world-space point, changing velocity directly
    /// (bypasses the integrator). No-op on static bodies.
    pub fn apply_impulse(
        &mut self,
        amount: f64,
        direction: &Vector3<f64>,
        point_in_world: &Vector3<f64>,
    ) -> PhysicsResult<()> {
        if math::almost_zero(direction) {
            return Err(PhysicsError::InvalidDirection(
                "impulse direction must be non-zero".to_string(),
            ));
        }
        if self.is_static() {
            return Ok(());
        }
        let impulse = direction.normalize() * amount;
        self.linear_velocity += impulse * self.mass_properties.inverse_mass;
        let r = point_in_world - self.world_transform.origin;
        self.angular_velocity += self.inverse_world_inertia * r.cross(&impulse);
        Ok(())
    }

    /// Clears accumulated force and torque (called by the integrator at the end of a step).
    pub fn clear_accumulators(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
}
