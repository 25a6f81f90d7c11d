//! Configuration structures for the physics core.
//!
//! Everything that was a hard-coded constant in the reference pipeline (solver iteration
//! cap, SPOOK relaxation/stiffness, clipping depth, broad-phase margin) is exposed here with
//! the original value kept as the default, so a caller can tune the engine for unusual scales
//! without touching solver code.

use serde::{Deserialize, Serialize};

/// Global physics core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Solver configuration.
    pub solver: SolverConfig,
    /// Collision detection configuration.
    pub collision: CollisionConfig,
    /// Default material / damping configuration.
    pub defaults: DefaultsConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            collision: CollisionConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

/// Projected Gauss-Seidel solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of PGS sweeps per tick.
    pub max_iterations: usize,
    /// Sum-of-|delta lambda| convergence tolerance below which the solver exits early.
    pub tolerance: f64,
    /// SPOOK relaxation parameter.
    pub relaxation: f64,
    /// SPOOK stiffness parameter.
    pub stiffness: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            tolerance: 1e-6,
            relaxation: 3.0,
            stiffness: 1.0e7,
        }
    }
}

/// Collision detection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Maximum penetration depth kept when clipping convex-convex contacts (`max_depth` in
    /// the reference pipeline).
    pub max_clip_depth: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_clip_depth: 100.0,
        }
    }
}

/// Default material and damping values applied where a body does not specify its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default coefficient of restitution (bounciness), in [0, 1].
    pub restitution: f64,
    /// Default coefficient of friction, in [0, 1].
    pub friction: f64,
    /// Default linear damping, in [0, 1].
    pub linear_damping: f64,
    /// Default angular damping, in [0, 1].
    pub angular_damping: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.3,
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = PhysicsConfig::default();
        assert!(config.solver.max_iterations > 0);
        assert!(config.solver.tolerance > 0.0);
        assert!(config.collision.max_clip_depth > 0.0);
    }
}
