//! impulse2d – 2D rigid-body physics core for Rust.
//!
//! Box and circle colliders, narrow-phase manifold generation, a force
//! registry, and a fixed-step world that resolves contacts with sequential
//! impulses and Baumgarte positional correction.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    broadphase::BroadPhase,
    manifold::CollisionManifold,
    narrowphase::{NarrowPhase, WorldShape},
    queries::{Raycast, RaycastHit, RaycastQuery},
};
pub use config::PhysicsConfig;
pub use crate::core::{
    collider::{Collider, ColliderBuilder, ColliderShape, DebugShape},
    rigidbody::RigidBody,
    types::{Transform, Velocity},
};
pub use dynamics::{
    forces::{DragForce, ForceGenerator, ForceRegistry, GeneratorId, GravityForce},
    solver::{ImpulseModel, ImpulseSolver},
};
pub use error::{PhysicsError, Result};
pub use utils::allocator::{Arena, BodyId};
pub use world::{CollisionEvent, PhysicsWorld};

/// High-level convenience wrapper that owns a [`PhysicsWorld`].
pub struct PhysicsEngine {
    world: PhysicsWorld,
}

impl PhysicsEngine {
    /// Creates a new physics engine with the provided fixed timestep.
    pub fn new(timestep: f32) -> Self {
        Self {
            world: PhysicsWorld::new(timestep),
        }
    }

    /// Creates an engine from a validated configuration.
    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        Ok(Self {
            world: PhysicsWorld::with_config(config)?,
        })
    }

    /// Adds a rigid body to the world and returns its generated [`BodyId`].
    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.world.add(body)
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        self.world.remove(id)
    }

    /// Advances the simulation by the provided delta time, returning the
    /// number of fixed steps taken.
    pub fn step(&mut self, dt: f32) -> usize {
        self.world.update(dt)
    }

    /// Immutable access to a rigid body by id.
    pub fn get_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.world.body(id)
    }

    /// Mutable access to a rigid body by id.
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.world.body_mut(id)
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }
}
