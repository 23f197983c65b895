//! Global configuration constants and the world configuration record.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    collision::broadphase::BroadPhase,
    dynamics::solver::ImpulseModel,
    error::{PhysicsError, Result},
};

/// Default gravity vector applied in the physics world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, -10.0];

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Number of full impulse passes over the colliding pairs per step.
pub const IMPULSE_ITERATIONS: u32 = 6;

/// Penetration tolerated before positional correction kicks in.
pub const DEFAULT_SLOP: f32 = 0.01;

/// Fraction of the remaining penetration removed per correction.
pub const DEFAULT_CORRECTION_PERCENT: f32 = 0.2;

/// Closing speed below which contacts do not bounce.
pub const RESTITUTION_VELOCITY_THRESHOLD: f32 = 1.0;

/// Edge contacts whose block matrix exceeds this condition number are
/// solved one contact at a time.
pub const MAX_BLOCK_CONDITION: f32 = 1000.0;

/// Default cell size for the broad-phase uniform grid.
pub const DEFAULT_BROADPHASE_CELL_SIZE: f32 = 4.0;

/// Fixed steps per `update` call above which a warning is logged.
pub const DEFAULT_STEP_WARNING_THRESHOLD: usize = 8;

/// Tunables for a [`PhysicsWorld`](crate::world::PhysicsWorld).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub time_step: f32,
    pub impulse_iterations: u32,
    pub slop: f32,
    pub correction_percent: f32,
    pub impulse_model: ImpulseModel,
    pub broad_phase: BroadPhase,
    pub step_warning_threshold: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::from_array(DEFAULT_GRAVITY),
            time_step: DEFAULT_TIME_STEP,
            impulse_iterations: IMPULSE_ITERATIONS,
            slop: DEFAULT_SLOP,
            correction_percent: DEFAULT_CORRECTION_PERCENT,
            impulse_model: ImpulseModel::default(),
            broad_phase: BroadPhase::default(),
            step_warning_threshold: DEFAULT_STEP_WARNING_THRESHOLD,
        }
    }
}

impl PhysicsConfig {
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_impulse_model(mut self, model: ImpulseModel) -> Self {
        self.impulse_model = model;
        self
    }

    pub fn with_broad_phase(mut self, broad_phase: BroadPhase) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    /// Rejects values the fixed-step loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if self.slop < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "slop must not be negative, got {}",
                self.slop
            )));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(PhysicsError::InvalidConfig(format!(
                "correction percent must lie in [0, 1], got {}",
                self.correction_percent
            )));
        }
        if let BroadPhase::SpatialGrid { cell_size } = self.broad_phase {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "grid cell size must be positive, got {cell_size}"
                )));
            }
        }
        Ok(())
    }
}
