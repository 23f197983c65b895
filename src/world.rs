use std::time::Duration;

use glam::Vec2;
use log::{debug, trace, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{
        manifold::CollisionManifold,
        narrowphase::{NarrowPhase, WorldShape},
        queries::{Raycast, RaycastHit, RaycastQuery},
    },
    config::{PhysicsConfig, DEFAULT_TIME_STEP},
    core::{collider::DebugShape, rigidbody::RigidBody},
    dynamics::{
        forces::{ForceGenerator, ForceRegistry, GeneratorId, GravityForce},
        solver::{ContactPair, ImpulseSolver},
    },
    error::{PhysicsError, Result},
    utils::{
        allocator::{Arena, BodyId},
        logging::{warn_if_step_budget_exceeded, ScopedTimer},
    },
};

/// Emitted once per fixed step for every pair of bodies that touched.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub a: BodyId,
    pub b: BodyId,
    /// Normals point from `a` toward `b`.
    pub manifolds: Vec<CollisionManifold>,
}

/// Central simulation container: owns the bodies, the force registry and the
/// per-step contact scratch.
pub struct PhysicsWorld {
    bodies: Arena<RigidBody>,
    force_registry: ForceRegistry,
    gravity_generator: GeneratorId,
    solver: ImpulseSolver,
    config: PhysicsConfig,
    time_accumulated: f32,
    contacts: Vec<ContactPair>,
    events: Vec<CollisionEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl PhysicsWorld {
    /// Creates a world with default settings. A non-positive `time_step`
    /// falls back to [`DEFAULT_TIME_STEP`].
    pub fn new(time_step: f32) -> Self {
        let ts = if time_step > 0.0 && time_step.is_finite() {
            time_step
        } else {
            DEFAULT_TIME_STEP
        };
        Self::build(PhysicsConfig::default().with_time_step(ts))
    }

    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            warn!("rejecting physics configuration: {err}");
            return Err(err);
        }
        Ok(Self::build(config))
    }

    fn build(config: PhysicsConfig) -> Self {
        let mut force_registry = ForceRegistry::new();
        let gravity_generator = force_registry.add_generator(GravityForce::new(config.gravity));
        Self {
            bodies: Arena::new(),
            force_registry,
            gravity_generator,
            solver: ImpulseSolver::from_config(&config),
            config,
            time_accumulated: 0.0,
            contacts: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn time_step(&self) -> f32 {
        self.config.time_step
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Changes gravity for every registered body, existing ones included.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
        self.force_registry
            .replace_generator(self.gravity_generator, GravityForce::new(gravity));
    }

    /// Registers the body and subscribes it to gravity.
    pub fn add(&mut self, body: RigidBody) -> BodyId {
        let id = self.bodies.insert(body);
        self.force_registry.add(self.gravity_generator, id);
        debug!("registered rigid body {:?}", id);
        id
    }

    /// Deregisters the body from every force generator and hands it back.
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        let body = self.bodies.remove(id)?;
        self.force_registry.remove_body(id);
        self.contacts
            .retain(|pair| pair.body_a != id && pair.body_b != id);
        debug!("removed rigid body {:?}", id);
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &Arena<RigidBody> {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Adds a custom generator; pair it with bodies through [`Self::register_force`].
    pub fn add_force_generator<F: ForceGenerator + 'static>(&mut self, generator: F) -> GeneratorId {
        self.force_registry.add_generator(generator)
    }

    pub fn register_force(&mut self, generator: GeneratorId, body: BodyId) -> Result<()> {
        if !self.bodies.contains(body) {
            return Err(PhysicsError::BodyNotFound(body));
        }
        self.force_registry.add(generator, body);
        Ok(())
    }

    pub fn unregister_force(&mut self, generator: GeneratorId, body: BodyId) -> bool {
        self.force_registry.remove(generator, body)
    }

    pub fn gravity_generator(&self) -> GeneratorId {
        self.gravity_generator
    }

    /// World position of one of a body's colliders.
    pub fn collider_position(&self, body: BodyId, index: usize) -> Result<Vec2> {
        let rigidbody = self.bodies.get(body).ok_or(PhysicsError::BodyNotFound(body))?;
        rigidbody
            .collider_position(index)
            .ok_or(PhysicsError::ColliderNotFound { body, index })
    }

    pub fn debug_shapes(&self) -> impl Iterator<Item = (BodyId, DebugShape)> + '_ {
        self.bodies
            .iter()
            .flat_map(|(id, body)| body.debug_shapes().map(move |shape| (id, shape)))
    }

    pub fn raycast(&self, query: &RaycastQuery) -> Vec<RaycastHit> {
        Raycast::cast(query, &self.bodies)
    }

    pub fn raycast_with_filter<F>(&self, query: &RaycastQuery, filter: F) -> Vec<RaycastHit>
    where
        F: FnMut(BodyId, &RigidBody) -> bool,
    {
        Raycast::cast_with_filter(query, &self.bodies, filter)
    }

    /// Colliding pairs recorded by the most recent fixed step.
    pub fn contacts(&self) -> &[ContactPair] {
        &self.contacts
    }

    /// Takes the collision events gathered by the last `update` or
    /// `fixed_update` call.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the simulation by `real_dt` seconds and returns how many fixed
    /// steps ran.
    ///
    /// The accumulator loops while it is non-negative, so it always runs one
    /// step more than a `time >= time_step` loop would at the boundary: the
    /// very first `update(time_step)` runs two steps, later ones run one.
    pub fn update(&mut self, real_dt: f32) -> usize {
        if !real_dt.is_finite() {
            warn!("ignoring non-finite physics delta {real_dt}");
            return 0;
        }

        self.events.clear();
        self.time_accumulated += real_dt;

        let mut steps = 0;
        while self.time_accumulated >= 0.0 {
            self.step_once();
            self.time_accumulated -= self.config.time_step;
            steps += 1;
        }

        warn_if_step_budget_exceeded(
            steps,
            self.config.step_warning_threshold,
            Duration::from_secs_f32(real_dt.max(0.0)),
        );
        steps
    }

    /// One fixed step: integrate, detect, accumulate forces, resolve.
    /// Events left over from earlier calls are discarded.
    pub fn fixed_update(&mut self) {
        self.events.clear();
        self.step_once();
    }

    fn step_once(&mut self) {
        let dt = self.config.time_step;

        {
            let _timer = ScopedTimer::new("integrate");
            for (_, body) in self.bodies.iter_mut() {
                body.physics_update(dt);
            }
        }

        self.contacts.clear();
        {
            let _timer = ScopedTimer::new("collisions::detect");
            self.detect_collisions();
        }

        self.force_registry.update_forces(&mut self.bodies, dt);

        let _timer = ScopedTimer::new("solver::impulses");
        let metrics = self.solver.solve(&mut self.bodies, &self.contacts);
        trace!(
            "solved {} pairs / {} manifolds (normal impulse {:.4}, tangent {:.4})",
            metrics.pairs_solved,
            metrics.manifolds_solved,
            metrics.normal_impulse_sum,
            metrics.tangent_impulse_sum
        );
    }

    fn detect_collisions(&mut self) {
        let pairs = self.config.broad_phase.candidate_pairs(&self.bodies);
        let bodies = &self.bodies;

        #[cfg(feature = "parallel")]
        self.contacts.par_extend(
            pairs
                .par_iter()
                .filter_map(|&(a, b)| Self::collide_pair(bodies, a, b)),
        );
        #[cfg(not(feature = "parallel"))]
        self.contacts.extend(
            pairs
                .iter()
                .filter_map(|&(a, b)| Self::collide_pair(bodies, a, b)),
        );

        self.events
            .extend(self.contacts.iter().map(|pair| CollisionEvent {
                a: pair.body_a,
                b: pair.body_b,
                manifolds: pair.manifolds.clone(),
            }));
    }

    /// Runs the narrow phase over every collider combination of two bodies.
    ///
    /// When any manifold is axis-aligned, only axis-aligned ones survive.
    fn collide_pair(bodies: &Arena<RigidBody>, a: BodyId, b: BodyId) -> Option<ContactPair> {
        let body_a = bodies.get(a)?;
        let body_b = bodies.get(b)?;
        if body_a.has_infinite_mass() && body_b.has_infinite_mass() {
            return None;
        }
        if body_a.colliders().is_empty() || body_b.colliders().is_empty() {
            return None;
        }

        let mut manifolds = Vec::new();
        for collider_a in body_a.colliders() {
            let shape_a = WorldShape::new(collider_a, &body_a.transform);
            for collider_b in body_b.colliders() {
                let shape_b = WorldShape::new(collider_b, &body_b.transform);
                manifolds.extend(NarrowPhase::find_collision_features(&shape_a, &shape_b));
            }
        }

        if manifolds.iter().any(CollisionManifold::is_cardinal) {
            manifolds.retain(CollisionManifold::is_cardinal);
        }
        if manifolds.is_empty() {
            return None;
        }

        Some(ContactPair {
            body_a: a,
            body_b: b,
            manifolds,
        })
    }
}
