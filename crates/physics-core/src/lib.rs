//! A deterministic, single-threaded 3D rigid-body physics core.
//!
//! # Pipeline
//!
//! One [`world::World::simulate`] tick runs, in order:
//!
//! ```text
//! gravity -> broad-phase -> narrow-phase -> equation assembly -> PGS solve -> integration
//! ```
//!
//! Broad-phase ([`broad_phase`]) is an all-pairs AABB sweep; narrow-phase ([`collision`])
//! dispatches on shape kind, using the Separating Axis Theorem and Sutherland-Hodgman clipping
//! for convex-convex pairs. Equation assembly ([`equation`], [`constraint`]) builds
//! SPOOK-parameterized velocity constraints from contacts and user constraints; the solver
//! ([`solver`]) is Projected Gauss-Seidel. [`integrator`] applies the solved deltas with
//! semi-implicit Euler and an anti-tunnelling velocity cap.
//!
//! Coordinate frames are tracked at the type level: [`transform::Transform3d<From, To>`] makes
//! mixing up body-local, center-of-mass, and world coordinates a compile error rather than a
//! runtime bug.
//!
//! # Example
//!
//! ```
//! use physics_core::prelude::*;
//!
//! let mut world = World::with_gravity(Vector3::new(0.0, 0.0, -9.81));
//!
//! let ground: ShapeInstance<Body> = ShapeInstance::plane(Transform3d::at_origin());
//! world.add_body(RigidBody::from_shapes(0, vec![ground], 0).unwrap());
//!
//! let ball: ShapeInstance<Body> = ShapeInstance::sphere(0.5, Transform3d::at_origin()).unwrap();
//! let mut falling = RigidBody::from_shapes(0, vec![ball], 0).unwrap();
//! falling.update_mass_properties(1.0).unwrap();
//! falling.world_transform = Transform3d::at_point(Vector3::new(0.0, 0.0, 5.0));
//! world.add_body(falling);
//!
//! for _ in 0..60 {
//!     world.simulate(1.0 / 60.0);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod body;
pub mod broad_phase;
pub mod collision;
pub mod config;
pub mod constraint;
pub mod convex;
pub mod equation;
pub mod error;
pub mod integrator;
pub mod math;
pub mod raycast;
pub mod shape;
pub mod solver;
pub mod transform;
pub mod world;

/// Convenient glob import of the crate's commonly used types.
pub mod prelude {
    pub use crate::body::{Material, MassProperties, RigidBody};
    pub use crate::collision::{Contact, ContactManifold};
    pub use crate::config::{CollisionConfig, DefaultsConfig, PhysicsConfig, SolverConfig};
    pub use crate::constraint::{Constraint, ConstraintEntry};
    pub use crate::convex::Convex;
    pub use crate::error::{PhysicsError, PhysicsResult};
    pub use crate::raycast::{Hit, Ray};
    pub use crate::shape::{Aabb, ShapeInstance, ShapeKind};
    pub use crate::transform::{Body, CenterOfMass, Shape, Transform3d, World as WorldFrame};
    pub use crate::world::World;

    pub use nalgebra::{Matrix3, UnitQuaternion, Vector3};
}
