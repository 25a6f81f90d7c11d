//! User-declared constraints (point-to-point, hinge, lock, distance) and their equation
//! assembly.

use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::config::SolverConfig;
use crate::equation::{build_equation, ContactGroup, Equation, Jacobian};

/// A bilateral constraint between two bodies, referencing them by id.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Pins a point on each body together: `pivot1`/`pivot2` in each body's local frame.
    PointToPoint {
        pivot1: Vector3<f64>,
        pivot2: Vector3<f64>,
    },
    /// Point-to-point plus two rotational equations keeping `axis1` and `axis2` orthogonal,
    /// leaving one rotational degree of freedom free (about the shared axis).
    Hinge {
        pivot1: Vector3<f64>,
        axis1: Vector3<f64>,
        pivot2: Vector3<f64>,
        axis2: Vector3<f64>,
    },
    /// Point-to-point plus three rotational equations locking the bodies' relative
    /// orientation.
    Lock {
        pivot1: Vector3<f64>,
        pivot2: Vector3<f64>,
    },
    /// Holds the two bodies' centers a fixed distance `d` apart.
    Distance(f64),
}

/// A constraint paired with the two bodies' ids it references, the unit usually stored in a
/// `World`'s constraint list.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEntry {
    pub body1: i64,
    pub body2: i64,
    pub constraint: Constraint,
}

const BILATERAL_BOUND: f64 = 1.0e6;

fn point_to_point_equations(
    body1: &RigidBody,
    body2: &RigidBody,
    pivot1: Vector3<f64>,
    pivot2: Vector3<f64>,
    dt: f64,
    config: &SolverConfig,
) -> Vec<Equation> {
    let r_i = body1.world_transform.orientation * pivot1;
    let r_j = body2.world_transform.orientation * pivot2;
    let anchor1 = body1.world_transform.origin + r_i;
    let anchor2 = body2.world_transform.origin + r_j;

    [Vector3::x(), Vector3::y(), Vector3::z()]
        .into_iter()
        .map(|axis| {
            let g = (anchor1 - anchor2).dot(&axis);
            let relative_velocity = body1.linear_velocity + body1.angular_velocity.cross(&r_i)
                - body2.linear_velocity
                - body2.angular_velocity.cross(&r_j);
            let g_w = relative_velocity.dot(&axis);
            build_equation(
                body1,
                body2,
                Jacobian {
                    v1: axis,
                    w1: r_i.cross(&axis),
                    v2: -axis,
                    w2: -r_j.cross(&axis),
                },
                g,
                g_w,
                -BILATERAL_BOUND,
                BILATERAL_BOUND,
                dt,
                config,
            )
        })
        .collect()
}

/// A rotational (orthogonality-enforcing) equation driving `n_i . n_j` towards zero, with
/// tangent direction `t` used to build the Jacobian's angular-velocity rows.
#[allow(clippy::too_many_arguments)]
fn rotational_equation(
    body1: &RigidBody,
    body2: &RigidBody,
    n_i: Vector3<f64>,
    n_j: Vector3<f64>,
    t: Vector3<f64>,
    dt: f64,
    config: &SolverConfig,
) -> Equation {
    let g = -n_i.dot(&n_j);
    let jacobian = Jacobian {
        v1: Vector3::zeros(),
        w1: -t.cross(&n_j),
        v2: Vector3::zeros(),
        w2: t.cross(&n_j),
    };
    let g_w = body1.angular_velocity.dot(&jacobian.w1) + body2.angular_velocity.dot(&jacobian.w2);
    build_equation(body1, body2, jacobian, g, g_w, -BILATERAL_BOUND, BILATERAL_BOUND, dt, config)
}

/// Builds the equation set for one `ConstraintEntry`, per §4.8.
pub fn build_constraint_equations(
    body1: &RigidBody,
    body2: &RigidBody,
    constraint: &Constraint,
    dt: f64,
    config: &SolverConfig,
) -> Vec<Equation> {
    match *constraint {
        Constraint::PointToPoint { pivot1, pivot2 } => {
            point_to_point_equations(body1, body2, pivot1, pivot2, dt, config)
        }

        Constraint::Hinge {
            pivot1,
            axis1,
            pivot2,
            axis2,
        } => {
            let mut equations = point_to_point_equations(body1, body2, pivot1, pivot2, dt, config);
            let world_axis1 = (body1.world_transform.orientation * axis1).normalize();
            let world_axis2 = (body2.world_transform.orientation * axis2).normalize();
            let (t1, t2) = crate::math::tangents(&world_axis2);
            equations.push(rotational_equation(body1, body2, world_axis1, world_axis2, t1, dt, config));
            equations.push(rotational_equation(body1, body2, world_axis1, world_axis2, t2, dt, config));
            equations
        }

        Constraint::Lock { pivot1, pivot2 } => {
            let mut equations = point_to_point_equations(body1, body2, pivot1, pivot2, dt, config);
            let r1 = body1.world_transform.orientation;
            let r2 = body2.world_transform.orientation;
            let (x1, y1, z1) = (r1 * Vector3::x(), r1 * Vector3::y(), r1 * Vector3::z());
            let (x2, y2, z2) = (r2 * Vector3::x(), r2 * Vector3::y(), r2 * Vector3::z());
            equations.push(rotational_equation(body1, body2, x1, y2, z1, dt, config));
            equations.push(rotational_equation(body1, body2, y1, z2, x1, dt, config));
            equations.push(rotational_equation(body1, body2, z1, x2, y1, dt, config));
            equations
        }

        Constraint::Distance(d) => {
            let delta = body2.world_transform.origin - body1.world_transform.origin;
            let dist = delta.norm();
            let axis = if dist > crate::math::EPSILON {
                delta / dist
            } else {
                Vector3::z()
            };
            let anchor1 = body1.world_transform.origin + axis * (d * 0.5);
            let anchor2 = body2.world_transform.origin - axis * (d * 0.5);
            let g = (anchor1 - anchor2).dot(&axis);
            let relative_velocity = body1.linear_velocity - body2.linear_velocity;
            let g_w = relative_velocity.dot(&axis);
            vec![build_equation(
                body1,
                body2,
                Jacobian {
                    v1: axis,
                    w1: Vector3::zeros(),
                    v2: -axis,
                    w2: Vector3::zeros(),
                },
                g,
                g_w,
                -BILATERAL_BOUND,
                BILATERAL_BOUND,
                dt,
                config,
            )]
        }
    }
}

/// Builds a [`ContactGroup`]-shaped equation group for one constraint entry (reusing the same
/// grouped-equations shape the solver consumes for contacts).
pub fn build_constraint_group(
    body1: &RigidBody,
    body2: &RigidBody,
    entry: &ConstraintEntry,
    dt: f64,
    config: &SolverConfig,
) -> ContactGroup {
    ContactGroup {
        body1: body1.id,
        body2: body2.id,
        equations: build_constraint_equations(body1, body2, &entry.constraint, dt, config),
    }
}
