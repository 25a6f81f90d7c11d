//! SPOOK-parameterized velocity constraint equations, assembled from contacts.
//!
//! Each [`Equation`] is one scalar row of a generalized velocity constraint: a Jacobian over
//! `(v1, w1, v2, w2)`, a pair of Lagrange-multiplier bounds, and the precomputed SPOOK terms
//! the solver needs each iteration (`solver_b`, `solver_inv_c`). Building these once per tick,
//! rather than recomputing per solver iteration, is the whole point of "equation assembly" as
//! a pipeline stage distinct from the solve itself.

use nalgebra::Vector3;

use crate::body::RigidBody;
use crate::collision::Contact;
use crate::config::SolverConfig;
use crate::math::tangents;

/// The Jacobian row of a single equation: the linear map from `(v1, w1, v2, w2)` to the
/// scalar constraint velocity.
#[derive(Debug, Clone, Copy)]
pub struct Jacobian {
    pub v1: Vector3<f64>,
    pub w1: Vector3<f64>,
    pub v2: Vector3<f64>,
    pub w2: Vector3<f64>,
}

/// One SPOOK-parameterized velocity equation between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct Equation {
    /// Id of body1; `-1` (the sentinel) is never valid here since equations always reference
    /// real bodies.
    pub body1: i64,
    pub body2: i64,
    pub jacobian: Jacobian,
    pub min_force: f64,
    pub max_force: f64,
    pub spook_a: f64,
    pub spook_b: f64,
    pub spook_eps: f64,
    pub solver_b: f64,
    pub solver_inv_c: f64,
    /// Accumulated Lagrange multiplier (λ), carried across solver iterations within a tick.
    pub accumulated_impulse: f64,
}

fn spook_params(dt: f64, relaxation: f64, stiffness: f64) -> (f64, f64, f64) {
    let denom = 1.0 + 4.0 * relaxation;
    let spook_a = 4.0 / (dt * denom);
    let spook_b = 4.0 * relaxation / denom;
    let spook_eps = 4.0 / (dt * dt * stiffness * denom);
    (spook_a, spook_b, spook_eps)
}

/// Builds one equation given its Jacobian, penetration `g`, relative constraint velocity
/// `g_w`, and force bounds, precomputing the SPOOK terms from the two bodies' current forces
/// and mass properties.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_equation(
    body1: &RigidBody,
    body2: &RigidBody,
    jacobian: Jacobian,
    g: f64,
    g_w: f64,
    min_force: f64,
    max_force: f64,
    dt: f64,
    config: &SolverConfig,
) -> Equation {
    let (spook_a, spook_b, spook_eps) = spook_params(dt, config.relaxation, config.stiffness);

    let gm_inv_f = jacobian.v1.dot(&(body1.force * body1.mass_properties.inverse_mass))
        + jacobian.w1.dot(&(body1.inverse_world_inertia * body1.torque))
        + jacobian.v2.dot(&(body2.force * body2.mass_properties.inverse_mass))
        + jacobian.w2.dot(&(body2.inverse_world_inertia * body2.torque));

    let gm_inv_gt = jacobian.v1.dot(&jacobian.v1) * body1.mass_properties.inverse_mass
        + jacobian
            .w1
            .dot(&(body1.inverse_world_inertia * jacobian.w1))
        + jacobian.v2.dot(&jacobian.v2) * body2.mass_properties.inverse_mass
        + jacobian
            .w2
            .dot(&(body2.inverse_world_inertia * jacobian.w2));

    let solver_b = -g * spook_a - g_w * spook_b - dt * gm_inv_f;
    let solver_inv_c = 1.0 / (gm_inv_gt + spook_eps);

    Equation {
        body1: body1.id,
        body2: body2.id,
        jacobian,
        min_force,
        max_force,
        spook_a,
        spook_b,
        spook_eps,
        solver_b,
        solver_inv_c,
        accumulated_impulse: 0.0,
    }
}

/// A body-pair's worth of equations for one tick: the normal plus two friction equations per
/// contact.
#[derive(Debug, Clone)]
pub struct ContactGroup {
    pub body1: i64,
    pub body2: i64,
    pub equations: Vec<Equation>,
}

/// Builds the equation set for one body pair's contacts: one normal and two friction
/// equations per contact, per §4.8.
pub fn build_contact_group(
    body1: &RigidBody,
    body2: &RigidBody,
    contacts: &[Contact],
    dt: f64,
    gravity: &Vector3<f64>,
    config: &SolverConfig,
) -> ContactGroup {
    let inv_mass_sum = body1.mass_properties.inverse_mass + body2.mass_properties.inverse_mass;
    let max_friction_force = if inv_mass_sum > 0.0 {
        crate::body::Material::combine(body1.material.friction, body2.material.friction) * gravity.norm() / inv_mass_sum
    } else {
        0.0
    };
    let bounciness = crate::body::Material::combine(body1.material.bounciness, body2.material.bounciness);

    let origin1 = body1.world_transform.origin;
    let origin2 = body2.world_transform.origin;

    let mut equations = Vec::with_capacity(contacts.len() * 3);

    for contact in contacts {
        let n = contact.normal;
        let r_i = contact.point_i - origin1;
        let r_j = contact.point_j - origin2;

        let g = (contact.point_j - contact.point_i).dot(&n);
        let relative_velocity = body2.linear_velocity - body1.linear_velocity;
        let g_w = (1.0 + bounciness) * relative_velocity.dot(&n)
            + body2.angular_velocity.dot(&r_j.cross(&n))
            + body1.angular_velocity.dot(&(-r_i).cross(&n));

        equations.push(build_equation(
            body1,
            body2,
            Jacobian {
                v1: -n,
                w1: -r_i.cross(&n),
                v2: n,
                w2: r_j.cross(&n),
            },
            g,
            g_w,
            0.0,
            1.0e6,
            dt,
            config,
        ));

        let (t1, t2) = tangents(&n);
        for t in [t1, t2] {
            let g_w_t = relative_velocity.dot(&t)
                + body2.angular_velocity.dot(&r_j.cross(&t))
                + body1.angular_velocity.dot(&(-r_i).cross(&t));
            equations.push(build_equation(
                body1,
                body2,
                Jacobian {
                    v1: -t,
                    w1: -r_i.cross(&t),
                    v2: t,
                    w2: r_j.cross(&t),
                },
                0.0,
                g_w_t,
                -max_friction_force,
                max_friction_force,
                dt,
                config,
            ));
        }
    }

    ContactGroup {
        body1: body1.id,
        body2: body2.id,
        equations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;
    use crate::shape::ShapeInstance;
    use crate::transform::{Body as BodyFrame, Transform3d};

    fn falling_sphere(id: i64, z: f64) -> RigidBody {
        let shape: ShapeInstance<BodyFrame> =
            ShapeInstance::sphere(1.0, Transform3d::at_origin()).unwrap();
        let mut body = RigidBody::from_shapes(id, vec![shape], 0).unwrap();
        body.update_mass_properties(1.0).unwrap();
        body.world_transform = Transform3d::at_point(Vector3::new(0.0, 0.0, z));
        body
    }

    #[test]
    fn contact_group_has_three_equations_per_contact() {
        let b1 = falling_sphere(0, 0.0);
        let b2 = falling_sphere(1, 1.9);
        let contact = Contact {
            normal: Vector3::z(),
            point_i: Vector3::new(0.0, 0.0, 1.0),
            point_j: Vector3::new(0.0, 0.0, 0.9),
        };
        let config = SolverConfig::default();
        let group = build_contact_group(&b1, &b2, &[contact], 1.0 / 60.0, &Vector3::new(0.0, 0.0, -10.0), &config);
        assert_eq!(group.equations.len(), 3);
        assert_eq!(group.body1, 0);
        assert_eq!(group.body2, 1);
    }

    #[test]
    fn normal_equation_is_bounded_nonnegative() {
        let b1 = falling_sphere(0, 0.0);
        let b2 = falling_sphere(1, 1.9);
        let contact = Contact {
            normal: Vector3::z(),
            point_i: Vector3::new(0.0, 0.0, 1.0),
            point_j: Vector3::new(0.0, 0.0, 0.9),
        };
        let config = SolverConfig::default();
        let group = build_contact_group(&b1, &b2, &[contact], 1.0 / 60.0, &Vector3::new(0.0, 0.0, -10.0), &config);
        assert_eq!(group.equations[0].min_force, 0.0);
        assert_eq!(group.equations[0].max_force, 1.0e6);
    }
}
