//! Collision detection modules: broad-phase, narrow-phase, manifolds and ray queries.

pub mod box_box;
pub mod broadphase;
pub mod manifold;
pub mod narrowphase;
pub mod queries;

pub use box_box::OrientedBox;
pub use broadphase::{BroadPhase, SpatialGrid};
pub use manifold::CollisionManifold;
pub use narrowphase::{NarrowPhase, WorldShape};
pub use queries::{Raycast, RaycastHit, RaycastQuery};
