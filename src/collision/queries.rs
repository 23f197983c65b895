use glam::Vec2;

use super::{box_box::OrientedBox, narrowphase::WorldShape};
use crate::{
    core::{collider::ColliderShape, rigidbody::RigidBody},
    utils::{
        allocator::{Arena, BodyId},
        math::rotate,
    },
};

/// Result of a ray cast against colliders.
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastHit {
    pub body: BodyId,
    pub collider_index: usize,
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastQuery {
    pub origin: Vec2,
    pub direction: Vec2,
    pub max_distance: f32,
    pub closest_only: bool,
    pub include_sensors: bool,
}

impl RaycastQuery {
    pub fn new(origin: Vec2, direction: Vec2, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
            closest_only: true,
            include_sensors: true,
        }
    }
}

pub struct Raycast;

impl Raycast {
    /// Casts against every collider of every body; hits are sorted by distance.
    pub fn cast(query: &RaycastQuery, bodies: &Arena<RigidBody>) -> Vec<RaycastHit> {
        Self::cast_with_filter(query, bodies, |_, _| true)
    }

    pub fn cast_with_filter<F>(
        query: &RaycastQuery,
        bodies: &Arena<RigidBody>,
        mut filter: F,
    ) -> Vec<RaycastHit>
    where
        F: FnMut(BodyId, &RigidBody) -> bool,
    {
        if query.direction == Vec2::ZERO {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (body_id, body) in bodies.iter() {
            if (body.is_sensor && !query.include_sensors) || !filter(body_id, body) {
                continue;
            }
            for (index, collider) in body.colliders().iter().enumerate() {
                let shape = WorldShape::new(collider, &body.transform);
                if let Some((point, normal, distance)) = Self::ray_shape_test(query, &shape) {
                    hits.push(RaycastHit {
                        body: body_id,
                        collider_index: index,
                        point,
                        normal,
                        distance,
                    });
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if query.closest_only {
            hits.truncate(1);
        }
        hits
    }

    /// Ray against a single resolved shape: `(point, normal, distance)`.
    pub fn ray_shape_test(query: &RaycastQuery, shape: &WorldShape) -> Option<(Vec2, Vec2, f32)> {
        match shape.shape {
            ColliderShape::Circle { radius } => {
                let (point, distance) = Self::ray_circle(query, shape.center, radius)?;
                let normal = if distance == 0.0 {
                    -query.direction
                } else {
                    (point - shape.center).normalize_or_zero()
                };
                Some((point, normal, distance))
            }
            ColliderShape::Box { size } => {
                Self::ray_box(query, &OrientedBox::new(shape.center, size, shape.rotation))
            }
        }
    }

    fn ray_circle(query: &RaycastQuery, center: Vec2, radius: f32) -> Option<(Vec2, f32)> {
        let oc = query.origin - center;
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some((query.origin, 0.0));
        }

        let b = oc.dot(query.direction);
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = -b - discriminant.sqrt();
        if t < 0.0 || t > query.max_distance {
            return None;
        }
        Some((query.origin + query.direction * t, t))
    }

    /// Slab test in the box's local frame.
    fn ray_box(query: &RaycastQuery, boxed: &OrientedBox) -> Option<(Vec2, Vec2, f32)> {
        let origin = boxed.to_local(query.origin);
        let dir = rotate(query.direction, -boxed.rotation);
        let half = boxed.half;

        let mut t_min = 0.0_f32;
        let mut t_max = query.max_distance;
        let mut normal = -dir;

        for i in 0..2 {
            let origin_component = origin[i];
            let dir_component = dir[i];
            let min = -half[i];
            let max = half[i];

            if dir_component.abs() < 1e-6 {
                if origin_component < min || origin_component > max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / dir_component;
            let mut t1 = (min - origin_component) * inv_dir;
            let mut t2 = (max - origin_component) * inv_dir;
            let mut axis_normal = Vec2::ZERO;
            axis_normal[i] = -dir_component.signum();

            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_min {
                t_min = t1;
                normal = axis_normal;
            }

            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        let point = query.origin + query.direction * t_min;
        Some((point, rotate(normal, boxed.rotation), t_min))
    }
}
