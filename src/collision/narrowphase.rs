use glam::Vec2;

use super::{box_box::OrientedBox, manifold::CollisionManifold};
use crate::{
    core::{
        collider::{Collider, ColliderShape},
        types::Transform,
    },
    utils::math::rotate,
};

/// A collider resolved against its owning body's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldShape {
    pub shape: ColliderShape,
    pub center: Vec2,
    pub rotation: f32,
}

impl WorldShape {
    pub fn new(collider: &Collider, transform: &Transform) -> Self {
        Self {
            shape: collider.shape,
            center: collider.position(transform),
            rotation: collider.rotation(transform),
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { radius },
            center,
            rotation: 0.0,
        }
    }

    pub fn cuboid(center: Vec2, size: Vec2, rotation: f32) -> Self {
        Self {
            shape: ColliderShape::Box { size },
            center,
            rotation,
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        self.shape.bounding_radius()
    }
}

/// Pairwise shape-vs-shape manifold generation.
pub struct NarrowPhase;

impl NarrowPhase {
    /// Returns zero, one or two manifolds whose normals point from `a` to `b`.
    pub fn find_collision_features(a: &WorldShape, b: &WorldShape) -> Vec<CollisionManifold> {
        match (a.shape, b.shape) {
            (ColliderShape::Circle { radius: ra }, ColliderShape::Circle { radius: rb }) => {
                Self::circle_circle(a.center, ra, b.center, rb)
                    .into_iter()
                    .collect()
            }
            (ColliderShape::Circle { radius }, ColliderShape::Box { size }) => Self::circle_box(
                a.center,
                radius,
                &OrientedBox::new(b.center, size, b.rotation),
                false,
            )
            .into_iter()
            .collect(),
            (ColliderShape::Box { size }, ColliderShape::Circle { radius }) => Self::circle_box(
                b.center,
                radius,
                &OrientedBox::new(a.center, size, a.rotation),
                true,
            )
            .into_iter()
            .collect(),
            (ColliderShape::Box { size: sa }, ColliderShape::Box { size: sb }) => {
                OrientedBox::new(a.center, sa, a.rotation)
                    .collide(&OrientedBox::new(b.center, sb, b.rotation))
            }
        }
    }

    /// Circles overlap when the squared center distance is within the squared
    /// radius sum. Depth is half the overlap so each body is corrected by half.
    pub fn circle_circle(
        center_a: Vec2,
        radius_a: f32,
        center_b: Vec2,
        radius_b: f32,
    ) -> Option<CollisionManifold> {
        let sum_radii = radius_a + radius_b;
        let distance = center_b - center_a;
        if distance.length_squared() > sum_radii * sum_radii {
            return None;
        }

        let length = distance.length();
        let depth = (length - sum_radii).abs() * 0.5;
        let normal = if length > f32::EPSILON {
            distance / length
        } else {
            Vec2::Y
        };
        let point = center_a + normal * (radius_a - depth);

        Some(CollisionManifold::new(normal, point, depth))
    }

    /// Circle against a (possibly rotated) box, solved in the box's local frame.
    ///
    /// The normal points from the circle to the box; with `flip` set the
    /// caller passed the box first and the normal is negated.
    pub fn circle_box(
        circle_center: Vec2,
        radius: f32,
        boxed: &OrientedBox,
        flip: bool,
    ) -> Option<CollisionManifold> {
        let half = boxed.half;
        let d = boxed.to_local(circle_center);
        let sx = d.x.signum();
        let sy = d.y.signum();

        let (local_normal, local_point, depth) =
            if d.x.abs() <= half.x && d.y.abs() <= half.y {
                // Center inside the box: push out through the nearest face.
                let pen_x = half.x - d.x.abs();
                let pen_y = half.y - d.y.abs();
                if pen_x < pen_y {
                    (Vec2::new(-sx, 0.0), Vec2::new(sx * half.x, d.y), pen_x + radius)
                } else {
                    (Vec2::new(0.0, -sy), Vec2::new(d.x, sy * half.y), pen_y + radius)
                }
            } else if d.y.abs() <= half.y {
                if d.x.abs() > half.x + radius {
                    return None;
                }
                (
                    Vec2::new(-sx, 0.0),
                    Vec2::new(sx * half.x, d.y),
                    half.x + radius - d.x.abs(),
                )
            } else if d.x.abs() <= half.x {
                if d.y.abs() > half.y + radius {
                    return None;
                }
                (
                    Vec2::new(0.0, -sy),
                    Vec2::new(d.x, sy * half.y),
                    half.y + radius - d.y.abs(),
                )
            } else {
                let corner = Vec2::new(sx * half.x, sy * half.y);
                let to_corner = corner - d;
                let distance_sq = to_corner.length_squared();
                if distance_sq >= radius * radius {
                    return None;
                }
                let distance = distance_sq.sqrt();
                (to_corner / distance, corner, radius - distance)
            };

        let manifold = CollisionManifold::new(
            rotate(local_normal, boxed.rotation),
            boxed.to_world(local_point),
            depth,
        );
        Some(if flip { manifold.flipped() } else { manifold })
    }
}
