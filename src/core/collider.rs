use super::types::Transform;
use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

/// Closed set of supported collider geometries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Rectangle, axis-aligned in its local frame. `size` is the full extent.
    Box { size: Vec2 },
    Circle { radius: f32 },
}

impl ColliderShape {
    pub fn bounding_radius(&self) -> f32 {
        match self {
            ColliderShape::Box { size } => (*size * 0.5).length(),
            ColliderShape::Circle { radius } => *radius,
        }
    }

    /// Moment of inertia about the shape's own center for the given mass.
    pub fn moment_for_mass(&self, mass: f32) -> f32 {
        match self {
            ColliderShape::Box { size } => mass * (size.x * size.x + size.y * size.y) / 12.0,
            ColliderShape::Circle { radius } => 0.5 * mass * radius * radius,
        }
    }
}

/// Wireframe description of a collider in world space, for debug drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugShape {
    Box {
        center: Vec2,
        size: Vec2,
        rotation: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        rotation: f32,
    },
}

/// A shape attached to a rigid body.
///
/// `offset` is expressed in world-aligned axes relative to the owning
/// entity's position; the integrator co-rotates it when the body spins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub offset: Vec2,
    pub rotation_offset: f32,
    mass: f32,
}

impl Default for Collider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Collider {
    pub fn new(shape: ColliderShape, mass: f32) -> Self {
        Self::builder().shape(shape).mass(mass).build()
    }

    pub fn circle(radius: f32, mass: f32) -> Self {
        Self::new(ColliderShape::Circle { radius }, mass)
    }

    pub fn cuboid(size: Vec2, mass: f32) -> Self {
        Self::new(ColliderShape::Box { size }, mass)
    }

    pub fn builder() -> ColliderBuilder {
        ColliderBuilder::new()
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Stores the new mass. Negative masses are accepted with a warning.
    ///
    /// On a collider already owned by a body use
    /// [`RigidBody::set_collider_mass`](super::rigidbody::RigidBody::set_collider_mass)
    /// so the body's cached mass properties are invalidated.
    pub fn set_mass(&mut self, mass: f32) {
        if mass < 0.0 {
            warn!("collider mass set to negative value {mass}; treating the body as static");
        }
        self.mass = mass;
    }

    /// World position: entity position plus the offset.
    pub fn position(&self, transform: &Transform) -> Vec2 {
        transform.position + self.offset
    }

    /// World rotation: entity rotation plus the rotation offset.
    pub fn rotation(&self, transform: &Transform) -> f32 {
        transform.rotation + self.rotation_offset
    }

    /// Own moment of inertia. Non-positive mass reports `f32::MAX` so that
    /// its reciprocal is effectively zero.
    pub fn moment_of_inertia(&self) -> f32 {
        if self.mass <= 0.0 {
            return f32::MAX;
        }
        self.shape.moment_for_mass(self.mass)
    }

    pub fn bounding_radius(&self) -> f32 {
        self.shape.bounding_radius()
    }

    pub fn size(&self) -> Option<Vec2> {
        match self.shape {
            ColliderShape::Box { size } => Some(size),
            ColliderShape::Circle { .. } => None,
        }
    }

    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            ColliderShape::Circle { radius } => Some(radius),
            ColliderShape::Box { .. } => None,
        }
    }

    pub fn debug_shape(&self, transform: &Transform) -> DebugShape {
        let center = self.position(transform);
        let rotation = self.rotation(transform);
        match self.shape {
            ColliderShape::Box { size } => DebugShape::Box {
                center,
                size,
                rotation,
            },
            ColliderShape::Circle { radius } => DebugShape::Circle {
                center,
                radius,
                rotation,
            },
        }
    }
}

pub struct ColliderBuilder {
    shape: ColliderShape,
    offset: Vec2,
    rotation_offset: f32,
    mass: f32,
}

impl Default for ColliderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColliderBuilder {
    pub fn new() -> Self {
        Self {
            shape: ColliderShape::Circle { radius: 0.5 },
            offset: Vec2::ZERO,
            rotation_offset: 0.0,
            mass: 1.0,
        }
    }

    pub fn shape(mut self, shape: ColliderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn circle(mut self, radius: f32) -> Self {
        self.shape = ColliderShape::Circle { radius };
        self
    }

    pub fn box_shape(mut self, size: Vec2) -> Self {
        self.shape = ColliderShape::Box { size };
        self
    }

    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn rotation_offset(mut self, rotation_offset: f32) -> Self {
        self.rotation_offset = rotation_offset;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn build(self) -> Collider {
        let mut collider = Collider {
            shape: self.shape,
            offset: self.offset,
            rotation_offset: self.rotation_offset,
            mass: 0.0,
        };
        collider.set_mass(self.mass);
        collider
    }
}
