//! Projected Gauss-Seidel constraint solver.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::body::{RigidBody, SENTINEL_ID};
use crate::config::SolverConfig;
use crate::equation::{ContactGroup, Equation};

/// Per-body velocity deltas accumulated by the solver over one tick's iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverBody {
    pub delta_linear_velocity: Vector3<f64>,
    pub delta_angular_velocity: Vector3<f64>,
}

struct BodyView {
    index: usize,
    inverse_mass: f64,
    inverse_world_inertia: nalgebra::Matrix3<f64>,
}

fn solve_one_equation(equation: &mut Equation, a: &BodyView, b: &BodyView, deltas: &mut [SolverBody]) -> f64 {
    let da = deltas[a.index];
    let db = deltas[b.index];

    let g_w_lambda = equation.jacobian.v1.dot(&da.delta_linear_velocity)
        + equation.jacobian.w1.dot(&da.delta_angular_velocity)
        + equation.jacobian.v2.dot(&db.delta_linear_velocity)
        + equation.jacobian.w2.dot(&db.delta_angular_velocity);

    let delta_lambda_raw =
        equation.solver_inv_c * (equation.solver_b - g_w_lambda - equation.spook_eps * equation.accumulated_impulse);
    let lambda_new = (equation.accumulated_impulse + delta_lambda_raw).clamp(equation.min_force, equation.max_force);
    let delta_lambda = lambda_new - equation.accumulated_impulse;
    equation.accumulated_impulse = lambda_new;

    deltas[a.index].delta_linear_velocity -= equation.jacobian.v1 * (delta_lambda * a.inverse_mass);
    deltas[a.index].delta_angular_velocity += a.inverse_world_inertia * equation.jacobian.w1 * delta_lambda;
    deltas[b.index].delta_linear_velocity += equation.jacobian.v2 * (delta_lambda * b.inverse_mass);
    deltas[b.index].delta_angular_velocity += b.inverse_world_inertia * equation.jacobian.w2 * delta_lambda;

    delta_lambda.abs()
}

/// Runs the projected Gauss-Seidel solve over `groups` (contact and/or constraint equation
/// groups) for up to `config.max_iterations` sweeps, exiting early once the sum of `|delta
/// lambda|` across one full sweep drops below `config.tolerance`.
///
/// Returns per-body velocity deltas indexed the same way as `bodies`; entries for bodies not
/// referenced by any equation stay zero. The sentinel id [`SENTINEL_ID`] is never looked up
/// and is skipped wherever it appears in an equation's body ids.
pub fn solve(bodies: &[RigidBody], groups: &mut [ContactGroup], config: &SolverConfig) -> Vec<SolverBody> {
    let index_by_id: HashMap<i64, usize> = bodies.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
    let mut deltas = vec![SolverBody::default(); bodies.len()];

    let view_of = |id: i64| -> Option<BodyView> {
        if id == SENTINEL_ID {
            return None;
        }
        let index = *index_by_id.get(&id)?;
        let body = &bodies[index];
        Some(BodyView {
            index,
            inverse_mass: body.mass_properties.inverse_mass,
            inverse_world_inertia: body.inverse_world_inertia,
        })
    };

    let mut iterations_run = 0;
    for _ in 0..config.max_iterations {
        iterations_run += 1;
        let mut delta_lambda_total = 0.0;

        for group in groups.iter_mut() {
            let (Some(a), Some(b)) = (view_of(group.body1), view_of(group.body2)) else {
                continue;
            };
            for equation in &mut group.equations {
                delta_lambda_total += solve_one_equation(equation, &a, &b, &mut deltas);
            }
        }

        if delta_lambda_total < config.tolerance {
            tracing::debug!(iterations = iterations_run, delta_lambda_total, "solver converged");
            return deltas;
        }
    }

    tracing::debug!(
        iterations = iterations_run,
        "solver reached max_iterations without converging"
    );
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Contact;
    use crate::equation::build_contact_group;
    use crate::shape::ShapeInstance;
    use crate::transform::{Body as BodyFrame, Transform3d};

    fn sphere_body(id: i64, z: f64, mass: f64) -> RigidBody {
        let shape: ShapeInstance<BodyFrame> =
            ShapeInstance::sphere(1.0, Transform3d::at_origin()).unwrap();
        let mut body = RigidBody::from_shapes(id, vec![shape], 0).unwrap();
        body.update_mass_properties(mass).unwrap();
        body.world_transform = Transform3d::at_point(Vector3::new(0.0, 0.0, z));
        body
    }

    #[test]
    fn resolving_penetration_pushes_bodies_apart_in_normal_direction() {
        let mut falling = sphere_body(0, 2.0, 1.0);
        falling.linear_velocity = Vector3::new(0.0, 0.0, -5.0);
        let ground = sphere_body(1, 0.0, 0.0); // static

        let contact = Contact {
            normal: Vector3::z(),
            point_i: Vector3::new(0.0, 0.0, 1.0),
            point_j: Vector3::new(0.0, 0.0, 1.1),
        };
        let config = SolverConfig::default();
        let mut group = build_contact_group(&ground, &falling, &[contact], 1.0 / 60.0, &Vector3::new(0.0, 0.0, -10.0), &config);

        let bodies = vec![ground, falling];
        let deltas = solve(&bodies, std::slice::from_mut(&mut group), &config);

        // body index 1 is the falling sphere; solving the penetrating contact should reduce
        // its downward velocity (push it back along +z relative to its free-fall delta).
        assert!(deltas[1].delta_linear_velocity.z > 0.0);
    }

    #[test]
    fn sentinel_body_ids_are_skipped_without_panic() {
        let body = sphere_body(0, 0.0, 1.0);
        let mut group = ContactGroup {
            body1: SENTINEL_ID,
            body2: body.id,
            equations: vec![],
        };
        let config = SolverConfig::default();
        let bodies = vec![body];
        let deltas = solve(&bodies, std::slice::from_mut(&mut group), &config);
        assert_eq!(deltas.len(), 1);
    }
}
