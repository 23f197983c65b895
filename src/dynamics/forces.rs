use glam::Vec2;

use crate::{
    core::rigidbody::RigidBody,
    utils::allocator::{Arena, BodyId},
};

/// Trait describing an external force generator applied to rigid bodies.
pub trait ForceGenerator: Send + Sync {
    fn update_force(&self, body: &mut RigidBody, dt: f32);
}

/// Constant gravity force scaled by body mass.
#[derive(Debug, Clone, Copy)]
pub struct GravityForce {
    pub gravity: Vec2,
}

impl GravityForce {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for GravityForce {
    fn update_force(&self, body: &mut RigidBody, _dt: f32) {
        if body.has_infinite_mass() {
            return;
        }
        let force = self.gravity * body.mass();
        body.add_force(force);
    }
}

/// Linear drag resisting the direction of motion.
#[derive(Debug, Clone, Copy)]
pub struct DragForce {
    pub drag_coefficient: f32,
}

impl DragForce {
    pub fn new(drag_coefficient: f32) -> Self {
        Self { drag_coefficient }
    }
}

impl ForceGenerator for DragForce {
    fn update_force(&self, body: &mut RigidBody, _dt: f32) {
        if body.has_infinite_mass() {
            return;
        }
        let drag = -body.velocity.linear * self.drag_coefficient;
        body.add_force(drag);
    }
}

/// Handle to a generator owned by a [`ForceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorId(usize);

impl GeneratorId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns force generators and the `(generator, body)` pairs they drive.
#[derive(Default)]
pub struct ForceRegistry {
    generators: Vec<Box<dyn ForceGenerator>>,
    registrations: Vec<(GeneratorId, BodyId)>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_generator<F: ForceGenerator + 'static>(&mut self, generator: F) -> GeneratorId {
        self.generators.push(Box::new(generator));
        GeneratorId(self.generators.len() - 1)
    }

    /// Replaces the generator behind `id`, keeping its registrations.
    pub fn replace_generator<F: ForceGenerator + 'static>(
        &mut self,
        id: GeneratorId,
        generator: F,
    ) -> bool {
        match self.generators.get_mut(id.0) {
            Some(slot) => {
                *slot = Box::new(generator);
                true
            }
            None => false,
        }
    }

    /// Registers `body` with `generator`. Duplicate pairs are ignored.
    pub fn add(&mut self, generator: GeneratorId, body: BodyId) {
        if generator.0 >= self.generators.len() {
            log::warn!("ignoring registration for unknown force generator {:?}", generator);
            return;
        }
        if !self.registrations.contains(&(generator, body)) {
            self.registrations.push((generator, body));
        }
    }

    pub fn remove(&mut self, generator: GeneratorId, body: BodyId) -> bool {
        let before = self.registrations.len();
        self.registrations
            .retain(|&(g, b)| !(g == generator && b == body));
        self.registrations.len() != before
    }

    /// Drops every registration that targets `body`.
    pub fn remove_body(&mut self, body: BodyId) {
        self.registrations.retain(|&(_, b)| b != body);
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Calls every registration once. Registrations whose body is gone are skipped.
    pub fn update_forces(&self, bodies: &mut Arena<RigidBody>, dt: f32) {
        for &(generator, body_id) in &self.registrations {
            if let Some(body) = bodies.get_mut(body_id) {
                self.generators[generator.0].update_force(body, dt);
            }
        }
    }

    pub fn zero_forces(&self, bodies: &mut Arena<RigidBody>) {
        for (_, body) in bodies.iter_mut() {
            body.zero_forces();
        }
    }
}
