use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::manifold::CollisionManifold,
    config::{PhysicsConfig, MAX_BLOCK_CONDITION, RESTITUTION_VELOCITY_THRESHOLD},
    core::rigidbody::RigidBody,
    utils::{
        allocator::{Arena, BodyId},
        math::{cross, cross_scalar},
    },
};

/// Selects the numerics used to turn a manifold into an impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImpulseModel {
    /// Reproduces the legacy resolver bit for bit: the velocity change is
    /// scaled by mass, angular terms use `a.x*b.y + a.y*b.x`, and friction
    /// is ignored.
    Reference,
    /// Inverse-mass sequential impulses with rotational effective mass and
    /// Coulomb friction. Impulses accumulate per manifold over the passes
    /// of a step and two-point edge contacts are solved as a block.
    #[default]
    Standard,
}

/// A pair of bodies that produced at least one manifold this step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPair {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub manifolds: Vec<CollisionManifold>,
}

/// Running impulse totals for one manifold across the passes of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactImpulse {
    /// Total normal impulse, never negative.
    pub normal: f32,
    /// Total friction impulse along `normal.perp()`.
    pub tangent: f32,
    /// Separating speed the normal impulse targets.
    pub bounce: f32,
}

impl ContactImpulse {
    pub fn with_bounce(bounce: f32) -> Self {
        Self {
            bounce,
            ..Self::default()
        }
    }

    /// Adds `impulse` to the normal total, clamped at zero, and returns the
    /// change that must actually be applied.
    fn accumulate_normal(&mut self, impulse: f32) -> f32 {
        let previous = self.normal;
        self.normal = (previous + impulse).max(0.0);
        self.normal - previous
    }
}

#[derive(Debug, Default, Clone)]
pub struct SolverStepMetrics {
    pub pairs_solved: usize,
    pub manifolds_solved: usize,
    pub normal_impulse_sum: f32,
    pub tangent_impulse_sum: f32,
}

impl SolverStepMetrics {
    pub fn merge(&mut self, other: &Self) {
        self.pairs_solved += other.pairs_solved;
        self.manifolds_solved += other.manifolds_solved;
        self.normal_impulse_sum += other.normal_impulse_sum;
        self.tangent_impulse_sum += other.tangent_impulse_sum;
    }

    fn record(&mut self, (normal, tangent): (f32, f32)) {
        self.normal_impulse_sum += normal.abs();
        self.tangent_impulse_sum += tangent.abs();
    }
}

/// Sequential impulse resolver with inline positional correction.
#[derive(Debug, Clone)]
pub struct ImpulseSolver {
    pub iterations: u32,
    pub slop: f32,
    pub correction_percent: f32,
    pub model: ImpulseModel,
}

impl Default for ImpulseSolver {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

impl ImpulseSolver {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            iterations: config.impulse_iterations,
            slop: config.slop,
            correction_percent: config.correction_percent,
            model: config.impulse_model,
        }
    }

    /// Runs `iterations` full passes over `pairs`. Pairs involving a sensor
    /// or a body that no longer exists are left untouched.
    pub fn solve(&self, bodies: &mut Arena<RigidBody>, pairs: &[ContactPair]) -> SolverStepMetrics {
        let mut impulses: Vec<Vec<ContactImpulse>> = pairs
            .iter()
            .map(|pair| {
                let (Some(body_a), Some(body_b)) = (bodies.get(pair.body_a), bodies.get(pair.body_b))
                else {
                    return vec![ContactImpulse::default(); pair.manifolds.len()];
                };
                pair.manifolds
                    .iter()
                    .map(|manifold| ContactImpulse::with_bounce(bounce_speed(body_a, body_b, manifold)))
                    .collect()
            })
            .collect();

        let mut metrics = SolverStepMetrics::default();
        for _ in 0..self.iterations {
            for (pair, pair_impulses) in pairs.iter().zip(impulses.iter_mut()) {
                let Some((body_a, body_b)) = bodies.get2_mut(pair.body_a, pair.body_b) else {
                    continue;
                };
                if body_a.is_sensor || body_b.is_sensor {
                    continue;
                }
                metrics.merge(&self.solve_pair(body_a, body_b, &pair.manifolds, pair_impulses));
            }
        }

        metrics
    }

    fn solve_pair(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifolds: &[CollisionManifold],
        impulses: &mut [ContactImpulse],
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics {
            pairs_solved: 1,
            manifolds_solved: manifolds.len(),
            ..SolverStepMetrics::default()
        };

        if self.model == ImpulseModel::Standard {
            if let ([first, second], [first_impulse, second_impulse]) = (manifolds, &mut *impulses) {
                if let Some(applied) =
                    self.resolve_edge(body_a, body_b, [first, second], [first_impulse, second_impulse])
                {
                    metrics.record(applied);
                    return metrics;
                }
            }
        }

        for (manifold, impulse) in manifolds.iter().zip(impulses.iter_mut()) {
            metrics.record(self.resolve_accumulated(body_a, body_b, manifold, impulse));
        }
        metrics
    }

    /// Applies one impulse (and positional correction) for `manifold`, whose
    /// normal points from `body_a` toward `body_b`. Returns the normal and
    /// tangent impulse magnitudes that were applied.
    pub fn resolve_manifold(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifold: &CollisionManifold,
    ) -> (f32, f32) {
        let mut impulse = ContactImpulse::with_bounce(bounce_speed(body_a, body_b, manifold));
        self.resolve_accumulated(body_a, body_b, manifold, &mut impulse)
    }

    /// Like [`Self::resolve_manifold`], continuing from the totals already
    /// applied to this manifold during the current step.
    pub fn resolve_accumulated(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifold: &CollisionManifold,
        impulse: &mut ContactImpulse,
    ) -> (f32, f32) {
        if !has_dynamic_side(body_a, body_b) {
            return (0.0, 0.0);
        }

        let applied = match self.model {
            ImpulseModel::Reference => Self::reference_impulse(body_a, body_b, manifold),
            ImpulseModel::Standard => Self::standard_impulse(body_a, body_b, manifold, impulse),
        };
        let Some(applied) = applied else {
            return (0.0, 0.0);
        };

        self.correct_positions(body_a, body_b, manifold);
        applied
    }

    /// Solves the normal impulses of a two-point contact sharing one normal
    /// as a 2x2 complementarity problem, then friction and correction per
    /// point. Returns `None` when the block is ill-conditioned.
    fn resolve_edge(
        &self,
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifolds: [&CollisionManifold; 2],
        impulses: [&mut ContactImpulse; 2],
    ) -> Option<(f32, f32)> {
        let normal = manifolds[0].normal;
        if manifolds[1].normal != normal {
            return None;
        }
        if !has_dynamic_side(body_a, body_b) {
            return Some((0.0, 0.0));
        }

        let centroid_a = body_a.world_centroid();
        let centroid_b = body_b.world_centroid();
        let arms = manifolds.map(|manifold| (manifold.point - centroid_a, manifold.point - centroid_b));

        let inv_mass_sum = body_a.inverse_mass() + body_b.inverse_mass();
        let inv_moment_a = body_a.inverse_moment_of_inertia();
        let inv_moment_b = body_b.inverse_moment_of_inertia();
        let [(ra1, rb1), (ra2, rb2)] = arms.map(|(r_a, r_b)| (cross(r_a, normal), cross(r_b, normal)));

        let k11 = inv_mass_sum + inv_moment_a * ra1 * ra1 + inv_moment_b * rb1 * rb1;
        let k22 = inv_mass_sum + inv_moment_a * ra2 * ra2 + inv_moment_b * rb2 * rb2;
        let k12 = inv_mass_sum + inv_moment_a * ra1 * ra2 + inv_moment_b * rb1 * rb2;
        let det = k11 * k22 - k12 * k12;
        if k11 * k11 >= MAX_BLOCK_CONDITION * det {
            return None;
        }

        let speeds = arms.map(|(r_a, r_b)| {
            (point_velocity(body_b, r_b) - point_velocity(body_a, r_a)).dot(normal)
        });
        let engaged = [0, 1].map(|i| speeds[i] <= 0.0 || impulses[i].normal > 0.0);

        let previous = Vec2::new(impulses[0].normal, impulses[1].normal);
        let residual = Vec2::new(
            speeds[0] - impulses[0].bounce - (k11 * previous.x + k12 * previous.y),
            speeds[1] - impulses[1].bounce - (k12 * previous.x + k22 * previous.y),
        );
        let total = solve_block(k11, k12, k22, det, residual).unwrap_or(previous);
        let delta = total - previous;

        let [first, second] = impulses;
        first.normal = total.x;
        second.normal = total.y;
        apply_impulse(body_a, body_b, arms[0].0, arms[0].1, normal * delta.x);
        apply_impulse(body_a, body_b, arms[1].0, arms[1].1, normal * delta.y);

        let mut tangent = 0.0;
        for ((manifold, impulse), active) in manifolds.into_iter().zip([first, second]).zip(engaged) {
            if active {
                tangent += apply_friction(body_a, body_b, manifold, impulse).abs();
                self.correct_positions(body_a, body_b, manifold);
            }
        }

        Some((delta.x.abs() + delta.y.abs(), tangent))
    }

    fn correct_positions(&self, body_a: &mut RigidBody, body_b: &mut RigidBody, manifold: &CollisionManifold) {
        let inv_mass_a = body_a.inverse_mass();
        let inv_mass_b = body_b.inverse_mass();
        let correction = (manifold.depth - self.slop).max(0.0) / (inv_mass_a + inv_mass_b)
            * self.correction_percent
            * manifold.normal;
        body_a.transform.add_position(-correction * inv_mass_a);
        body_b.transform.add_position(correction * inv_mass_b);
    }

    fn reference_impulse(
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifold: &CollisionManifold,
    ) -> Option<(f32, f32)> {
        let normal = manifold.normal;
        let r1 = manifold.point - body_a.transform.position;
        let r2 = manifold.point - body_b.transform.position;

        let relative_velocity = body_b.velocity.linear - body_a.velocity.linear;
        let velocity_along_normal = relative_velocity.dot(normal);
        if velocity_along_normal > 0.0 {
            return None;
        }

        let restitution = body_a.restitution.min(body_b.restitution);
        let inv_mass_sum = body_a.inverse_mass() + body_b.inverse_mass();
        let impulse = -(1.0 + restitution) * (velocity_along_normal * normal) / inv_mass_sum;

        body_a.velocity.linear -= impulse * body_a.mass();
        body_b.velocity.linear += impulse * body_b.mass();
        body_a.velocity.angular -= body_a.inverse_moment_of_inertia() * reference_cross(r1, impulse);
        body_b.velocity.angular += body_b.inverse_moment_of_inertia() * reference_cross(r2, impulse);

        Some((impulse.length(), 0.0))
    }

    fn standard_impulse(
        body_a: &mut RigidBody,
        body_b: &mut RigidBody,
        manifold: &CollisionManifold,
        impulse: &mut ContactImpulse,
    ) -> Option<(f32, f32)> {
        let normal = manifold.normal;
        let (r_a, r_b) = contact_arms(body_a, body_b, manifold);

        let velocity_along_normal =
            (point_velocity(body_b, r_b) - point_velocity(body_a, r_a)).dot(normal);
        if velocity_along_normal > 0.0 && impulse.normal == 0.0 {
            return None;
        }

        let normal_mass = effective_mass(body_a, body_b, r_a, r_b, normal);
        if normal_mass <= 0.0 {
            return None;
        }
        let normal_impulse =
            impulse.accumulate_normal(-(velocity_along_normal - impulse.bounce) / normal_mass);
        apply_impulse(body_a, body_b, r_a, r_b, normal * normal_impulse);

        let tangent_impulse = apply_friction(body_a, body_b, manifold, impulse);
        Some((normal_impulse, tangent_impulse))
    }
}

/// The legacy resolver's angular term; note the `+`.
fn reference_cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y + a.y * b.x
}

fn has_dynamic_side(body_a: &RigidBody, body_b: &RigidBody) -> bool {
    !(body_a.has_infinite_mass() && body_b.has_infinite_mass())
        && body_a.inverse_mass() + body_b.inverse_mass() != 0.0
}

fn contact_arms(body_a: &RigidBody, body_b: &RigidBody, manifold: &CollisionManifold) -> (Vec2, Vec2) {
    (
        manifold.point - body_a.world_centroid(),
        manifold.point - body_b.world_centroid(),
    )
}

/// Separating speed restitution asks for, measured before any impulse of
/// the step. Slow contacts do not bounce.
fn bounce_speed(body_a: &RigidBody, body_b: &RigidBody, manifold: &CollisionManifold) -> f32 {
    let (r_a, r_b) = contact_arms(body_a, body_b, manifold);
    let velocity_along_normal =
        (point_velocity(body_b, r_b) - point_velocity(body_a, r_a)).dot(manifold.normal);
    if velocity_along_normal < -RESTITUTION_VELOCITY_THRESHOLD {
        -body_a.restitution.min(body_b.restitution) * velocity_along_normal
    } else {
        0.0
    }
}

/// Total impulses `x >= 0` with `K x + residual >= 0`, complementary per
/// point. Cases are tried in order: both active, first only, second only,
/// neither.
fn solve_block(k11: f32, k12: f32, k22: f32, det: f32, residual: Vec2) -> Option<Vec2> {
    let both = Vec2::new(
        k22 * residual.x - k12 * residual.y,
        k11 * residual.y - k12 * residual.x,
    ) / -det;
    if both.x >= 0.0 && both.y >= 0.0 {
        return Some(both);
    }

    let first = -residual.x / k11;
    if first >= 0.0 && k12 * first + residual.y >= 0.0 {
        return Some(Vec2::new(first, 0.0));
    }

    let second = -residual.y / k22;
    if second >= 0.0 && k12 * second + residual.x >= 0.0 {
        return Some(Vec2::new(0.0, second));
    }

    (residual.x >= 0.0 && residual.y >= 0.0).then_some(Vec2::ZERO)
}

/// Coulomb friction along `normal.perp()`, with the running total clamped
/// by `μ` times the running normal impulse. Returns the applied change.
fn apply_friction(
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    manifold: &CollisionManifold,
    impulse: &mut ContactImpulse,
) -> f32 {
    let tangent = manifold.normal.perp();
    let (r_a, r_b) = contact_arms(body_a, body_b, manifold);
    let tangent_mass = effective_mass(body_a, body_b, r_a, r_b, tangent);
    if tangent_mass <= 0.0 {
        return 0.0;
    }

    let sliding = (point_velocity(body_b, r_b) - point_velocity(body_a, r_a)).dot(tangent);
    let mu = (body_a.friction * body_b.friction).sqrt();
    let max_friction = (mu * impulse.normal).max(0.0);

    let previous = impulse.tangent;
    impulse.tangent = (previous - sliding / tangent_mass).clamp(-max_friction, max_friction);
    let applied = impulse.tangent - previous;
    apply_impulse(body_a, body_b, r_a, r_b, tangent * applied);
    applied
}

fn point_velocity(body: &RigidBody, arm: Vec2) -> Vec2 {
    body.velocity.linear + cross_scalar(body.velocity.angular, arm)
}

fn effective_mass(body_a: &RigidBody, body_b: &RigidBody, r_a: Vec2, r_b: Vec2, axis: Vec2) -> f32 {
    let ra_cross = cross(r_a, axis);
    let rb_cross = cross(r_b, axis);
    body_a.inverse_mass()
        + body_b.inverse_mass()
        + ra_cross * ra_cross * body_a.inverse_moment_of_inertia()
        + rb_cross * rb_cross * body_b.inverse_moment_of_inertia()
}

fn apply_impulse(body_a: &mut RigidBody, body_b: &mut RigidBody, r_a: Vec2, r_b: Vec2, impulse: Vec2) {
    body_a.velocity.linear -= impulse * body_a.inverse_mass();
    body_a.velocity.angular -= body_a.inverse_moment_of_inertia() * cross(r_a, impulse);
    body_b.velocity.linear += impulse * body_b.inverse_mass();
    body_b.velocity.angular += body_b.inverse_moment_of_inertia() * cross(r_b, impulse);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{collider::Collider, types::Transform};
    use approx::assert_relative_eq;

    fn ball(x: f32, vx: f32) -> RigidBody {
        RigidBody::new(Transform::from_position(Vec2::new(x, 0.0)))
            .with_collider(Collider::circle(1.0, 1.0))
            .with_restitution(1.0)
            .with_velocity(Vec2::new(vx, 0.0))
    }

    fn head_on_manifold() -> CollisionManifold {
        CollisionManifold::new(Vec2::X, Vec2::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn elastic_head_on_swaps_velocities_in_both_models() {
        for model in [ImpulseModel::Reference, ImpulseModel::Standard] {
            let solver = ImpulseSolver {
                model,
                ..ImpulseSolver::default()
            };
            let mut a = ball(-1.0, 1.0);
            let mut b = ball(1.0, -1.0);
            solver.resolve_manifold(&mut a, &mut b, &head_on_manifold());

            assert_relative_eq!(a.velocity.linear.x, -1.0, epsilon = 1e-5);
            assert_relative_eq!(b.velocity.linear.x, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn separating_bodies_are_left_alone() {
        let solver = ImpulseSolver::default();
        let mut a = ball(-1.0, -1.0);
        let mut b = ball(1.0, 1.0);
        let deep = CollisionManifold::new(Vec2::X, Vec2::ZERO, 0.5);
        let applied = solver.resolve_manifold(&mut a, &mut b, &deep);

        assert_eq!(applied, (0.0, 0.0));
        assert_eq!(a.transform.position.x, -1.0);
        assert_eq!(b.velocity.linear.x, 1.0);
    }

    #[test]
    fn two_static_bodies_are_skipped() {
        let solver = ImpulseSolver::default();
        let mut a = RigidBody::default().with_collider(Collider::circle(1.0, 0.0));
        let mut b = RigidBody::default()
            .with_collider(Collider::circle(1.0, 0.0))
            .with_velocity(Vec2::new(-3.0, 0.0));
        solver.resolve_manifold(&mut a, &mut b, &head_on_manifold());
        assert_eq!(b.velocity.linear.x, -3.0);
    }

    #[test]
    fn restitution_uses_the_smaller_coefficient() {
        let solver = ImpulseSolver::default();
        let mut a = ball(-1.0, 1.0).with_restitution(0.0);
        let mut b = ball(1.0, -1.0);
        solver.resolve_manifold(&mut a, &mut b, &head_on_manifold());
        // Perfectly inelastic: both end up moving together.
        assert_relative_eq!(a.velocity.linear.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(b.velocity.linear.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn positional_correction_splits_by_inverse_mass() {
        let solver = ImpulseSolver::default();
        let mut floor = RigidBody::default().with_collider(Collider::cuboid(Vec2::new(10.0, 1.0), 0.0));
        let mut crate_body = RigidBody::new(Transform::from_position(Vec2::new(0.0, 0.9)))
            .with_collider(Collider::cuboid(Vec2::ONE, 1.0));
        let manifold = CollisionManifold::new(Vec2::Y, Vec2::new(0.0, 0.5), 0.11);
        solver.resolve_manifold(&mut floor, &mut crate_body, &manifold);

        assert_eq!(floor.transform.position, Vec2::ZERO);
        assert_relative_eq!(crate_body.transform.position.y, 0.9 + 0.1 * 0.2, epsilon = 1e-6);
    }

    #[test]
    fn reference_model_scales_by_mass() {
        let solver = ImpulseSolver {
            model: ImpulseModel::Reference,
            ..ImpulseSolver::default()
        };
        let mut wall = RigidBody::default().with_collider(Collider::circle(1.0, 0.0));
        let mut heavy = RigidBody::new(Transform::from_position(Vec2::new(1.5, 0.0)))
            .with_collider(Collider::circle(1.0, 2.0))
            .with_velocity(Vec2::new(-1.0, 0.0));
        solver.resolve_manifold(&mut wall, &mut heavy, &head_on_manifold());

        // j = -(1 + 0) * -1 / 0.5 = 2, then scaled by mass 2.
        assert_relative_eq!(heavy.velocity.linear.x, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn friction_slows_sliding_contact() {
        let solver = ImpulseSolver::default();
        let mut floor = RigidBody::default().with_collider(Collider::cuboid(Vec2::new(10.0, 1.0), 0.0));
        let mut slider = RigidBody::new(Transform::from_position(Vec2::new(0.0, 1.0)))
            .with_collider(Collider::cuboid(Vec2::ONE, 1.0))
            .with_velocity(Vec2::new(2.0, -1.0));
        slider.fixed_orientation = true;
        let manifold = CollisionManifold::new(Vec2::Y, Vec2::new(0.0, 0.5), 0.0);

        let (normal, tangent) = solver.resolve_manifold(&mut floor, &mut slider, &manifold);
        assert_relative_eq!(normal, 1.0, epsilon = 1e-5);
        // mu = sqrt(0.5 * 0.5) caps the tangent impulse at 0.5, along Y.perp() = -X.
        assert_relative_eq!(tangent, 0.5, epsilon = 1e-5);
        assert_relative_eq!(slider.velocity.linear.x, 1.5, epsilon = 1e-5);
        assert_relative_eq!(slider.velocity.linear.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn slow_contacts_do_not_bounce() {
        let solver = ImpulseSolver::default();
        let wall_contact = CollisionManifold::new(Vec2::X, Vec2::new(0.5, 0.0), 0.0);

        let mut wall = RigidBody::default().with_collider(Collider::circle(0.5, 0.0));
        let mut slow = ball(1.5, -0.5);
        solver.resolve_manifold(&mut wall, &mut slow, &wall_contact);
        assert_relative_eq!(slow.velocity.linear.x, 0.0, epsilon = 1e-6);

        let mut fast = ball(1.5, -2.0);
        solver.resolve_manifold(&mut wall, &mut fast, &wall_contact);
        assert_relative_eq!(fast.velocity.linear.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn accumulated_normal_impulse_only_pulls_back_what_was_pushed() {
        let solver = ImpulseSolver::default();
        let mut wall = RigidBody::default().with_collider(Collider::circle(0.5, 0.0));
        let mut body = ball(1.5, -1.0).with_restitution(0.0);
        let contact = CollisionManifold::new(Vec2::X, Vec2::new(0.5, 0.0), 0.0);
        let mut impulse = ContactImpulse::default();

        let (pushed, _) = solver.resolve_accumulated(&mut wall, &mut body, &contact, &mut impulse);
        assert_relative_eq!(pushed, 1.0, epsilon = 1e-6);
        assert_relative_eq!(impulse.normal, 1.0, epsilon = 1e-6);

        body.velocity.linear = Vec2::new(3.0, 0.0);
        let (pulled, _) = solver.resolve_accumulated(&mut wall, &mut body, &contact, &mut impulse);
        assert_relative_eq!(pulled, -1.0, epsilon = 1e-6);
        assert_eq!(impulse.normal, 0.0);
        assert_relative_eq!(body.velocity.linear.x, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn edge_contact_stops_a_box_without_spinning_it() {
        let mut bodies = Arena::new();
        let floor = bodies.insert(
            RigidBody::default().with_collider(Collider::cuboid(Vec2::new(20.0, 1.0), 0.0)),
        );
        let crate_id = bodies.insert(
            RigidBody::new(Transform::from_position(Vec2::new(0.0, 1.0)))
                .with_collider(Collider::cuboid(Vec2::ONE, 1.0))
                .with_velocity(Vec2::new(0.0, -1.0)),
        );
        let pairs = vec![ContactPair {
            body_a: floor,
            body_b: crate_id,
            manifolds: vec![
                CollisionManifold::new(Vec2::Y, Vec2::new(-0.5, 0.5), 0.0),
                CollisionManifold::new(Vec2::Y, Vec2::new(0.5, 0.5), 0.0),
            ],
        }];

        let metrics = ImpulseSolver::default().solve(&mut bodies, &pairs);
        assert_eq!(metrics.pairs_solved, 6);
        assert_eq!(metrics.manifolds_solved, 12);
        // Both corners carry half of the unit impulse.
        assert_relative_eq!(metrics.normal_impulse_sum, 1.0, epsilon = 1e-5);

        let body = bodies.get(crate_id).unwrap();
        assert_relative_eq!(body.velocity.linear.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(body.velocity.linear.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(body.velocity.angular, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn ill_conditioned_edge_falls_back_to_sequential_contacts() {
        let mut bodies = Arena::new();
        let floor = bodies.insert(
            RigidBody::default().with_collider(Collider::cuboid(Vec2::new(20.0, 1.0), 0.0)),
        );
        let mut locked = RigidBody::new(Transform::from_position(Vec2::new(0.0, 1.0)))
            .with_collider(Collider::cuboid(Vec2::ONE, 1.0))
            .with_velocity(Vec2::new(0.0, -1.0));
        locked.fixed_orientation = true;
        let crate_id = bodies.insert(locked);
        let pairs = vec![ContactPair {
            body_a: floor,
            body_b: crate_id,
            manifolds: vec![
                CollisionManifold::new(Vec2::Y, Vec2::new(-0.5, 0.5), 0.0),
                CollisionManifold::new(Vec2::Y, Vec2::new(0.5, 0.5), 0.0),
            ],
        }];

        ImpulseSolver::default().solve(&mut bodies, &pairs);
        let body = bodies.get(crate_id).unwrap();
        assert_relative_eq!(body.velocity.linear.y, 0.0, epsilon = 1e-6);
        assert_eq!(body.velocity.angular, 0.0);
    }

    #[test]
    fn block_solve_releases_the_separating_point() {
        // Only the first point is approaching; the second is already moving apart.
        let impulses = solve_block(2.5, -0.5, 2.5, 6.0, Vec2::new(-1.0, 1.0)).unwrap();
        assert_relative_eq!(impulses.x, 0.4, epsilon = 1e-6);
        assert_eq!(impulses.y, 0.0);
    }

    #[test]
    fn fixed_orientation_blocks_spin() {
        let solver = ImpulseSolver::default();
        let mut floor = RigidBody::default().with_collider(Collider::cuboid(Vec2::new(10.0, 1.0), 0.0));
        let mut body = RigidBody::new(Transform::from_position(Vec2::new(0.0, 1.0)))
            .with_collider(Collider::cuboid(Vec2::ONE, 1.0))
            .with_velocity(Vec2::new(0.0, -1.0));
        body.fixed_orientation = true;
        let off_center = CollisionManifold::new(Vec2::Y, Vec2::new(0.5, 0.5), 0.0);
        solver.resolve_manifold(&mut floor, &mut body, &off_center);
        assert_eq!(body.velocity.angular, 0.0);
    }

    #[test]
    fn solve_skips_sensor_pairs() {
        let mut bodies = Arena::new();
        let a = bodies.insert(ball(-1.0, 1.0));
        let mut sensor = ball(1.0, -1.0);
        sensor.is_sensor = true;
        let b = bodies.insert(sensor);
        let pairs = vec![ContactPair {
            body_a: a,
            body_b: b,
            manifolds: vec![head_on_manifold()],
        }];

        let metrics = ImpulseSolver::default().solve(&mut bodies, &pairs);
        assert_eq!(metrics.pairs_solved, 0);
        assert_eq!(bodies.get(a).unwrap().velocity.linear.x, 1.0);
    }

    #[test]
    fn solve_runs_every_iteration() {
        let mut bodies = Arena::new();
        let a = bodies.insert(ball(-1.0, 1.0));
        let b = bodies.insert(ball(1.0, -1.0));
        let pairs = vec![ContactPair {
            body_a: a,
            body_b: b,
            manifolds: vec![head_on_manifold()],
        }];

        let metrics = ImpulseSolver::new(6).solve(&mut bodies, &pairs);
        assert_eq!(metrics.pairs_solved, 6);
        assert_eq!(metrics.manifolds_solved, 6);
        assert_relative_eq!(bodies.get(a).unwrap().velocity.linear.x, -1.0, epsilon = 1e-5);
    }
}
