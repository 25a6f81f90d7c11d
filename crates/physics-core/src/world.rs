//! The world: owns bodies and constraints, and orchestrates one simulation tick.

use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::collision::{self, ContactManifold};
use crate::config::PhysicsConfig;
use crate::constraint::{self, Constraint, ConstraintEntry};
use crate::equation;
use crate::error::{PhysicsError, PhysicsResult};
use crate::integrator;
use crate::raycast::{self, Hit, Ray};
use crate::solver;
use crate::broad_phase;

/// A physics world: bodies, constraints, gravity, and tuning configuration.
///
/// `World::simulate` is the tick orchestrator: gravity application, broad-phase, narrow-phase,
/// equation assembly, PGS solve, and integration, run in that order every call. It is plain
/// synchronous Rust — there is nothing to `.await` and nothing spawned onto another thread.
#[derive(Debug, Clone)]
pub struct World {
    bodies: Vec<RigidBody>,
    free_ids: Vec<i64>,
    next_id: i64,
    gravity: Vector3<f64>,
    constraints: Vec<ConstraintEntry>,
    last_contacts: Vec<ContactManifold>,
    config: PhysicsConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// An empty world with zero gravity and the default configuration.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            free_ids: Vec::new(),
            next_id: 0,
            gravity: Vector3::zeros(),
            constraints: Vec::new(),
            last_contacts: Vec::new(),
            config: PhysicsConfig::default(),
        }
    }

    /// An empty world with the given gravity vector.
    pub fn with_gravity(gravity: Vector3<f64>) -> Self {
        Self {
            gravity,
            ..Self::new()
        }
    }

    /// Replaces this world's configuration.
    pub fn with_config(mut self, config: PhysicsConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a body, assigning it an id from the free-id pool (or minting a new one), and
    /// returns the assigned id.
    pub fn add_body(&mut self, mut body: RigidBody) -> i64 {
        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        body.id = id;
        self.bodies.push(body);
        id
    }

    /// Builds a body from `shapes` using this world's configured
    /// [`PhysicsConfig::defaults`] for material and damping, and adds it. A convenience over
    /// `RigidBody::from_shapes_with_defaults` + `add_body` for callers who want the world's
    /// tuning rather than the engine's built-in constants.
    pub fn spawn_body(
        &mut self,
        shapes: Vec<crate::shape::ShapeInstance<crate::transform::Body>>,
        user_data: u64,
    ) -> PhysicsResult<i64> {
        let body = RigidBody::from_shapes_with_defaults(0, shapes, user_data, &self.config.defaults)?;
        Ok(self.add_body(body))
    }

    /// Removes the body with the given id, returning it to the free-id pool. Returns the
    /// removed body, or `None` if no body with that id exists.
    pub fn remove_body(&mut self, id: i64) -> Option<RigidBody> {
        let index = self.bodies.iter().position(|b| b.id == id)?;
        let body = self.bodies.remove(index);
        self.free_ids.push(id);
        Some(body)
    }

    fn body_exists(&self, id: i64) -> bool {
        self.bodies.iter().any(|b| b.id == id)
    }

    /// Adds a constraint between two bodies already present in the world. Rejects either id
    /// not being present with [`PhysicsError::UnknownBody`].
    pub fn add_constraint(&mut self, body1: i64, body2: i64, constraint: Constraint) -> PhysicsResult<()> {
        if !self.body_exists(body1) {
            return Err(PhysicsError::UnknownBody(body1));
        }
        if !self.body_exists(body2) {
            return Err(PhysicsError::UnknownBody(body2));
        }
        self.constraints.push(ConstraintEntry {
            body1,
            body2,
            constraint,
        });
        Ok(())
    }

    /// All bodies currently in the world.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Mutable access to bodies, for callers that need to set initial position/velocity/force
    /// directly rather than through `apply_force`/`apply_impulse`.
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    /// The contact manifolds produced by the most recent [`World::simulate`] call.
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.last_contacts
    }

    /// Casts a ray against every body in the world, returning the closest hit.
    pub fn raycast(&self, ray: &Ray) -> Option<Hit> {
        raycast::raycast_world(ray, &self.bodies)
    }

    /// Advances the world by one step of `dt` seconds: gravity, broad-phase, narrow-phase,
    /// equation assembly, PGS solve, integration.
    pub fn simulate(&mut self, dt: f64) {
        let span = tracing::info_span!("world_tick", bodies = self.bodies.len());
        let _enter = span.enter();

        for body in &mut self.bodies {
            body.add_gravity(&self.gravity);
        }

        let pairs = broad_phase::get_pairs(&self.bodies);
        tracing::debug!(pair_count = pairs.len(), "broad-phase complete");

        let mut manifolds = Vec::new();
        let mut groups: Vec<equation::ContactGroup> = Vec::new();
        for pair in &pairs {
            let body1 = &self.bodies[pair.first];
            let body2 = &self.bodies[pair.second];
            if body1.is_static() && body2.is_static() {
                continue;
            }
            let manifold = collision::collide_bodies(body1, body2, &self.config.collision);
            if manifold.contacts.is_empty() {
                continue;
            }
            groups.push(equation::build_contact_group(
                body1,
                body2,
                &manifold.contacts,
                dt,
                &self.gravity,
                &self.config.solver,
            ));
            manifolds.push(manifold);
        }
        tracing::debug!(
            contact_count = manifolds.iter().map(|m| m.contacts.len()).sum::<usize>(),
            "narrow-phase complete"
        );

        for entry in &self.constraints {
            let i1 = self.bodies.iter().position(|b| b.id == entry.body1);
            let i2 = self.bodies.iter().position(|b| b.id == entry.body2);
            if let (Some(i1), Some(i2)) = (i1, i2) {
                groups.push(constraint::build_constraint_group(
                    &self.bodies[i1],
                    &self.bodies[i2],
                    entry,
                    dt,
                    &self.config.solver,
                ));
            }
        }

        let deltas = solver::solve(&self.bodies, &mut groups, &self.config.solver);
        integrator::integrate_all(&mut self.bodies, &deltas, dt);

        self.last_contacts = manifolds;
    }
}

/// Checks a world-owned precondition the integrator relies on: no body's orientation should
/// ever drift from unit norm. Exposed for tests and callers that snapshot a world after
/// deserializing it from an untrusted source.
pub fn check_unit_quaternions(world: &World) -> bool {
    world
        .bodies()
        .iter()
        .all(|b| (b.world_transform.orientation.into_inner().norm() - 1.0).abs() < 1e-5)
}
