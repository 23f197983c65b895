use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{
    collider::{Collider, DebugShape},
    types::{Transform, Velocity},
};
use crate::utils::math::rotate;

/// Lazily computed mass properties. `None` marks an entry dirty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MassCache {
    mass: Option<f32>,
    moment: Option<f32>,
    centroid: Option<Vec2>,
}

impl MassCache {
    fn invalidate(&mut self) {
        *self = Self::default();
    }
}

/// Rigid body composed of one or more colliders.
///
/// Mass, moment of inertia and centroid are derived from the colliders and
/// cached. Every collider mutation goes through the body so the cache is
/// invalidated; `&self` accessors never return a stale value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub transform: Transform,
    pub velocity: Velocity,
    pub force: Vec2,
    pub torque: f32,
    /// Coefficient of restitution in `[0, 1]`.
    pub restitution: f32,
    pub friction: f32,
    /// Sensors report collisions but are never pushed apart.
    pub is_sensor: bool,
    /// Suppresses all rotational response.
    pub fixed_orientation: bool,
    colliders: Vec<Collider>,
    #[serde(skip)]
    cache: MassCache,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            velocity: Velocity::default(),
            force: Vec2::ZERO,
            torque: 0.0,
            restitution: 0.0,
            friction: 0.5,
            is_sensor: false,
            fixed_orientation: false,
            colliders: Vec::new(),
            cache: MassCache::default(),
        }
    }
}

impl RigidBody {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.add_collider(collider);
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_velocity(mut self, linear: Vec2) -> Self {
        self.velocity.linear = linear;
        self
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider(&self, index: usize) -> Option<&Collider> {
        self.colliders.get(index)
    }

    pub fn add_collider(&mut self, collider: Collider) {
        self.colliders.push(collider);
        self.cache.invalidate();
    }

    pub fn remove_collider(&mut self, index: usize) -> Option<Collider> {
        if index >= self.colliders.len() {
            return None;
        }
        let removed = self.colliders.remove(index);
        self.cache.invalidate();
        Some(removed)
    }

    /// Sets a collider's mass. Returns `false` if the index is out of range.
    pub fn set_collider_mass(&mut self, index: usize, mass: f32) -> bool {
        let Some(collider) = self.colliders.get_mut(index) else {
            return false;
        };
        collider.set_mass(mass);
        self.cache.invalidate();
        true
    }

    pub fn set_collider_offset(&mut self, index: usize, offset: Vec2) -> bool {
        let Some(collider) = self.colliders.get_mut(index) else {
            return false;
        };
        collider.offset = offset;
        self.cache.invalidate();
        true
    }

    pub fn set_collider_rotation_offset(&mut self, index: usize, rotation_offset: f32) -> bool {
        let Some(collider) = self.colliders.get_mut(index) else {
            return false;
        };
        collider.rotation_offset = rotation_offset;
        true
    }

    /// World position of the collider at `index`.
    pub fn collider_position(&self, index: usize) -> Option<Vec2> {
        self.colliders
            .get(index)
            .map(|collider| collider.position(&self.transform))
    }

    pub fn debug_shapes(&self) -> impl Iterator<Item = DebugShape> + '_ {
        self.colliders
            .iter()
            .map(|collider| collider.debug_shape(&self.transform))
    }

    /// Recomputes and stores every dirty cache entry.
    pub fn refresh_mass_properties(&mut self) {
        let mass = self.cache.mass.unwrap_or_else(|| self.compute_mass());
        self.cache.mass = Some(mass);
        let centroid = self.cache.centroid.unwrap_or_else(|| self.compute_centroid());
        self.cache.centroid = Some(centroid);
        let moment = self.cache.moment.unwrap_or_else(|| self.compute_moment());
        self.cache.moment = Some(moment);
    }

    /// Total mass; zero when any collider has non-positive mass.
    pub fn mass(&self) -> f32 {
        self.cache.mass.unwrap_or_else(|| self.compute_mass())
    }

    pub fn inverse_mass(&self) -> f32 {
        let mass = self.mass();
        if mass <= 0.0 {
            0.0
        } else {
            1.0 / mass
        }
    }

    pub fn has_infinite_mass(&self) -> bool {
        self.mass() <= 0.0
    }

    /// Centroid relative to the entity position.
    pub fn centroid(&self) -> Vec2 {
        self.cache.centroid.unwrap_or_else(|| self.compute_centroid())
    }

    pub fn world_centroid(&self) -> Vec2 {
        self.transform.position + self.centroid()
    }

    pub fn moment_of_inertia(&self) -> f32 {
        self.cache.moment.unwrap_or_else(|| self.compute_moment())
    }

    pub fn inverse_moment_of_inertia(&self) -> f32 {
        if self.fixed_orientation || self.has_infinite_mass() {
            return 0.0;
        }
        let moment = self.moment_of_inertia();
        if moment <= 0.0 || !moment.is_finite() {
            0.0
        } else {
            1.0 / moment
        }
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    pub fn zero_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    pub fn set_velocity(&mut self, linear: Vec2, angular: f32) {
        self.velocity.linear = linear;
        self.velocity.angular = angular;
    }

    /// Semi-implicit Euler step driven by the accumulated force and torque.
    pub fn physics_update(&mut self, dt: f32) {
        self.refresh_mass_properties();
        if self.has_infinite_mass() {
            return;
        }
        let mass = self.mass();

        self.velocity.linear += self.force * dt / mass;
        self.transform.add_position(self.velocity.linear * dt);

        if !self.fixed_orientation {
            // Torque is scaled by mass, not by the moment of inertia.
            self.velocity.angular += self.torque * dt / mass;
            let delta = self.velocity.angular * dt;
            if delta != 0.0 {
                let pivot = self.world_centroid();
                self.transform.add_rotation_around(delta, pivot);
                for collider in &mut self.colliders {
                    collider.offset = rotate(collider.offset, delta);
                }
                if let Some(centroid) = self.cache.centroid.as_mut() {
                    *centroid = rotate(*centroid, delta);
                }
            }
        }

        self.zero_forces();
    }

    fn has_static_collider(&self) -> bool {
        self.colliders.iter().any(|collider| collider.mass() <= 0.0)
    }

    fn compute_mass(&self) -> f32 {
        if self.has_static_collider() {
            return 0.0;
        }
        self.colliders.iter().map(Collider::mass).sum()
    }

    fn compute_centroid(&self) -> Vec2 {
        if self.colliders.is_empty() {
            return Vec2::ZERO;
        }
        if self.has_static_collider() {
            let sum: Vec2 = self.colliders.iter().map(|collider| collider.offset).sum();
            return sum / self.colliders.len() as f32;
        }
        let total = self.compute_mass();
        let weighted: Vec2 = self
            .colliders
            .iter()
            .map(|collider| collider.offset * collider.mass())
            .sum();
        weighted / total
    }

    fn compute_moment(&self) -> f32 {
        if self.colliders.is_empty() || self.has_static_collider() {
            return f32::MAX;
        }
        let total = self.compute_mass();
        let centroid = self.cache.centroid.unwrap_or_else(|| self.compute_centroid());
        self.colliders
            .iter()
            .map(|collider| {
                collider.moment_of_inertia()
                    + total * (collider.offset - centroid).length_squared()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dynamic_circle(mass: f32) -> RigidBody {
        RigidBody::default().with_collider(Collider::circle(1.0, mass))
    }

    #[test]
    fn mass_sums_colliders() {
        let mut body = dynamic_circle(2.0);
        body.add_collider(Collider::cuboid(Vec2::ONE, 3.0));
        assert_relative_eq!(body.mass(), 5.0);
        assert_relative_eq!(body.inverse_mass(), 0.2);
        assert!(!body.has_infinite_mass());
    }

    #[test]
    fn one_static_collider_anchors_the_body() {
        let mut body = dynamic_circle(2.0);
        body.add_collider(Collider::circle(1.0, 0.0));
        assert_eq!(body.mass(), 0.0);
        assert!(body.has_infinite_mass());
        assert_eq!(body.inverse_moment_of_inertia(), 0.0);
    }

    #[test]
    fn empty_body_is_static() {
        let body = RigidBody::default();
        assert!(body.has_infinite_mass());
        assert_eq!(body.centroid(), Vec2::ZERO);
    }

    #[test]
    fn centroid_is_mass_weighted() {
        let mut body = RigidBody::default();
        body.add_collider(Collider::builder().circle(0.5).mass(1.0).build());
        body.add_collider(
            Collider::builder()
                .circle(0.5)
                .mass(3.0)
                .offset(Vec2::new(4.0, 0.0))
                .build(),
        );
        assert_relative_eq!(body.centroid().x, 3.0);
    }

    #[test]
    fn static_centroid_is_count_weighted() {
        let mut body = RigidBody::default();
        body.add_collider(Collider::builder().circle(0.5).mass(0.0).build());
        body.add_collider(
            Collider::builder()
                .circle(0.5)
                .mass(3.0)
                .offset(Vec2::new(4.0, 0.0))
                .build(),
        );
        assert_relative_eq!(body.centroid().x, 2.0);
    }

    #[test]
    fn moment_uses_parallel_axis_with_total_mass() {
        let mut body = RigidBody::default();
        body.add_collider(
            Collider::builder()
                .circle(1.0)
                .mass(1.0)
                .offset(Vec2::new(-1.0, 0.0))
                .build(),
        );
        body.add_collider(
            Collider::builder()
                .circle(1.0)
                .mass(1.0)
                .offset(Vec2::new(1.0, 0.0))
                .build(),
        );
        // Each circle: 0.5 own moment + 2.0 * 1.0 arm term.
        assert_relative_eq!(body.moment_of_inertia(), 5.0);
    }

    #[test]
    fn mutating_collider_mass_invalidates_cache() {
        let mut body = dynamic_circle(2.0);
        body.refresh_mass_properties();
        assert_relative_eq!(body.mass(), 2.0);

        assert!(body.set_collider_mass(0, 4.0));
        assert_relative_eq!(body.mass(), 4.0);
        assert_relative_eq!(body.moment_of_inertia(), 2.0);

        assert!(!body.set_collider_mass(3, 1.0));
    }

    #[test]
    fn add_then_remove_restores_cached_values() {
        let mut body = dynamic_circle(2.0);
        body.refresh_mass_properties();
        let (mass, moment) = (body.mass(), body.moment_of_inertia());

        body.add_collider(
            Collider::builder()
                .box_shape(Vec2::splat(2.0))
                .mass(5.0)
                .offset(Vec2::new(3.0, 1.0))
                .build(),
        );
        body.refresh_mass_properties();
        assert!(body.mass() > mass);

        body.remove_collider(1).expect("collider exists");
        body.refresh_mass_properties();
        assert_relative_eq!(body.mass(), mass);
        assert_relative_eq!(body.moment_of_inertia(), moment);
    }

    #[test]
    fn static_body_ignores_forces() {
        let mut body = RigidBody::new(Transform::from_position(Vec2::new(1.0, 2.0)))
            .with_collider(Collider::cuboid(Vec2::ONE, 0.0));
        body.add_force(Vec2::new(100.0, -50.0));
        body.add_torque(10.0);
        body.physics_update(1.0 / 60.0);

        assert_eq!(body.velocity, Velocity::default());
        assert_eq!(body.transform.position, Vec2::new(1.0, 2.0));
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn integration_applies_force_and_clears_accumulators() {
        let mut body = dynamic_circle(2.0);
        body.add_force(Vec2::new(4.0, 0.0));
        body.physics_update(0.5);

        assert_relative_eq!(body.velocity.linear.x, 1.0);
        assert_relative_eq!(body.transform.position.x, 0.5);
        assert_eq!(body.force, Vec2::ZERO);
    }

    #[test]
    fn spinning_body_rotates_offsets_about_centroid() {
        let mut body = RigidBody::default();
        body.add_collider(
            Collider::builder()
                .circle(0.5)
                .offset(Vec2::new(1.0, 0.0))
                .build(),
        );
        body.add_collider(
            Collider::builder()
                .circle(0.5)
                .offset(Vec2::new(3.0, 0.0))
                .build(),
        );
        body.velocity.angular = std::f32::consts::PI;
        body.physics_update(1.0);

        // Rotated half a turn about the centroid at (2, 0).
        let first = body.collider_position(0).expect("collider exists");
        let second = body.collider_position(1).expect("collider exists");
        assert_relative_eq!(first.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(second.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(body.world_centroid().x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn fixed_orientation_blocks_rotation() {
        let mut body = dynamic_circle(1.0);
        body.fixed_orientation = true;
        body.add_torque(5.0);
        body.physics_update(1.0);
        assert_eq!(body.transform.rotation, 0.0);
        assert_eq!(body.inverse_moment_of_inertia(), 0.0);
    }
}
