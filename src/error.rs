//! Error types for the physics core.

use thiserror::Error;

use crate::utils::allocator::BodyId;

/// Precondition violations surfaced by the physics API.
///
/// Missed collisions are not errors: the narrow phase reports them as an
/// empty manifold list.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// The handle does not name a live body in this world.
    #[error("rigid body not found: {0:?}")]
    BodyNotFound(BodyId),

    /// The collider index is out of range for the body.
    #[error("body {body:?} has no collider at index {index}")]
    ColliderNotFound { body: BodyId, index: usize },

    /// The world configuration cannot be simulated.
    #[error("invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
