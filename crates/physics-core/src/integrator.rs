//! Semi-implicit Euler integration: applies solver deltas, damping, the anti-tunnelling
//! velocity cap, and advances each dynamic body's transform.

use crate::body::RigidBody;
use crate::solver::SolverBody;

/// Advances one dynamic body by `dt`, given its solver-computed velocity delta. `body.force`
/// and `body.torque` are expected to already hold every external contribution for this tick,
/// gravity included — callers apply gravity to the accumulator before assembling equations, so
/// the solver's `solver_b` term sees it too, and the integrator must not add it a second time.
/// Static bodies are left untouched by the caller (this function assumes `body.is_static()` is
/// already `false`).
pub fn integrate_body(body: &mut RigidBody, delta: &SolverBody, dt: f64) {
    let linear_damping_factor = (1.0 - body.linear_damping).powf(dt);
    let angular_damping_factor = (1.0 - body.angular_damping).powf(dt);

    let mut linear_velocity = body.force * body.mass_properties.inverse_mass * dt
        + body.linear_velocity * linear_damping_factor
        + delta.delta_linear_velocity;

    let travel = linear_velocity.norm() * dt;
    if travel > body.bounding_sphere_radius && travel > 0.0 {
        linear_velocity *= body.bounding_sphere_radius / travel;
    }

    let angular_velocity = body.inverse_world_inertia * body.torque * dt
        + body.angular_velocity * angular_damping_factor
        + delta.delta_angular_velocity;

    body.linear_velocity = linear_velocity;
    body.angular_velocity = angular_velocity;

    body.world_transform = body
        .world_transform
        .rotate_by(&angular_velocity, dt)
        .translate_by(&(linear_velocity * dt))
        .normalize();

    body.recompute_world_inertia();
    body.clear_accumulators();
}

/// Integrates every non-static body in `bodies`, looking up each one's solver delta by its
/// position in `deltas` (the same indexing `solver::solve` returns).
pub fn integrate_all(bodies: &mut [RigidBody], deltas: &[SolverBody], dt: f64) {
    for (body, delta) in bodies.iter_mut().zip(deltas.iter()) {
        if body.is_static() {
            continue;
        }
        integrate_body(body, delta, dt);
    }
}
