use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::utils::math::rotate_about;

/// Position and orientation of the entity that owns a rigid body.
///
/// The entity layer lives outside this crate; a body carries the slice of
/// entity state the simulation reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn from_position_rotation(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn add_position(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn add_rotation(&mut self, delta: f32) {
        self.rotation += delta;
    }

    /// Rotates the entity by `delta` about a world-space pivot.
    pub fn add_rotation_around(&mut self, delta: f32, pivot: Vec2) {
        self.position = rotate_about(self.position, delta, pivot);
        self.rotation += delta;
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    /// Radians per second, counter-clockwise.
    pub angular: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn rotation_around_pivot_moves_position() {
        let mut transform = Transform::from_position(Vec2::new(1.0, 0.0));
        transform.add_rotation_around(PI, Vec2::ZERO);
        assert_relative_eq!(transform.position.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(transform.position.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(transform.rotation, PI);
    }
}
