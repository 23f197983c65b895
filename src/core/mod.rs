//! Core types describing rigid bodies, their colliders, and shared data.

pub mod collider;
pub mod rigidbody;
pub mod types;

pub use collider::{Collider, ColliderBuilder, ColliderShape, DebugShape};
pub use rigidbody::RigidBody;
pub use types::{Transform, Velocity};
