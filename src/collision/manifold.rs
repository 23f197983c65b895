use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A single contact between two shapes.
///
/// `normal` is a unit vector pointing from the first shape toward the
/// second; `depth` is the (non-negative) penetration along it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionManifold {
    pub normal: Vec2,
    pub point: Vec2,
    pub depth: f32,
}

impl CollisionManifold {
    pub fn new(normal: Vec2, point: Vec2, depth: f32) -> Self {
        Self {
            normal,
            point,
            depth,
        }
    }

    /// Same contact seen from the other shape. Only the normal changes.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// True when the normal is exactly one of `±X` / `±Y`.
    pub fn is_cardinal(&self) -> bool {
        let Vec2 { x, y } = self.normal;
        (x == 0.0 && y.abs() == 1.0) || (y == 0.0 && x.abs() == 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flipping_negates_only_the_normal() {
        let manifold = CollisionManifold::new(Vec2::new(0.6, 0.8), Vec2::new(1.0, 2.0), 0.3);
        let flipped = manifold.flipped();
        assert_eq!(flipped.normal, Vec2::new(-0.6, -0.8));
        assert_eq!(flipped.point, manifold.point);
        assert_eq!(flipped.depth, manifold.depth);
    }

    #[test]
    fn cardinal_requires_exact_axis() {
        assert!(CollisionManifold::new(Vec2::NEG_Y, Vec2::ZERO, 0.1).is_cardinal());
        assert!(CollisionManifold::new(Vec2::X, Vec2::ZERO, 0.1).is_cardinal());
        assert!(!CollisionManifold::new(Vec2::new(1e-6, 1.0), Vec2::ZERO, 0.1).is_cardinal());
    }
}
