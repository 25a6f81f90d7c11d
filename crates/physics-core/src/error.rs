//! Error types for the physics core.
//!
//! The stepping pipeline itself (`World::simulate`) is infallible: numerical edge cases are
//! handled by neutral-value fallbacks rather than by propagating an error. These error kinds
//! only surface at construction time, where invalid user input can be rejected before it ever
//! reaches the solver.

use thiserror::Error;

/// Result type alias for physics core operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Errors surfaced by the physics core's constructors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A convex shape description was degenerate: too few vertices, a non-planar face, or
    /// zero volume where a dynamic body was intended.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A negative mass was supplied. Zero is legal (it means static).
    #[error("invalid mass: {0}, must be >= 0")]
    InvalidMass(f64),

    /// A zero-length direction was passed to a ray or an impulse.
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// A constraint referenced a body id that is not present in the world.
    #[error("unknown body id: {0}")]
    UnknownBody(i64),

    /// A 3x3 matrix that should have been invertible was singular.
    #[error("singular matrix in {operation}")]
    SingularMatrix {
        /// Name of the operation that produced the singular matrix.
        operation: String,
    },
}
