//! Rotated box vs rotated box contact generation.
//!
//! Contacts are classified by how many corners of each box lie strictly
//! inside the other. Configurations outside the handled buckets fall back to
//! a separating-axis test.

use glam::Vec2;

use super::manifold::CollisionManifold;
use crate::utils::math::{rotate, segments_intersect};

/// Outward face normals in box-local space.
const FACE_AXES: [Vec2; 4] = [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y];

/// A box in world space: center, half extents and rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec2,
    pub half: Vec2,
    pub rotation: f32,
}

impl OrientedBox {
    pub fn new(center: Vec2, size: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half: size * 0.5,
            rotation,
        }
    }

    pub fn to_local(&self, point: Vec2) -> Vec2 {
        rotate(point - self.center, -self.rotation)
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + rotate(local, self.rotation)
    }

    /// Corners in counter-clockwise order starting bottom-left.
    pub fn vertices(&self) -> [Vec2; 4] {
        let h = self.half;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|local| self.to_world(local))
    }

    pub fn axes(&self) -> [Vec2; 2] {
        [rotate(Vec2::X, self.rotation), rotate(Vec2::Y, self.rotation)]
    }

    fn contains_local(&self, local: Vec2) -> bool {
        local.x.abs() < self.half.x && local.y.abs() < self.half.y
    }

    /// Distance a local point must travel along `axis` to leave through
    /// that face.
    fn penetration(&self, local: Vec2, axis: Vec2) -> f32 {
        self.half.dot(axis.abs()) - local.dot(axis)
    }

    /// Local endpoints of the face whose outward normal is `axis`.
    fn face(&self, axis: Vec2) -> (Vec2, Vec2) {
        let h = self.half;
        let tangent = axis.perp();
        let mid = axis * h.dot(axis.abs());
        let extent = h.dot(tangent.abs());
        (mid - tangent * extent, mid + tangent * extent)
    }

    /// Indices of this box's corners that lie strictly inside `other`.
    fn vertices_inside(&self, other: &OrientedBox) -> Vec<usize> {
        self.vertices()
            .iter()
            .enumerate()
            .filter(|(_, vertex)| other.contains_local(other.to_local(**vertex)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Manifolds with normals pointing from `self` toward `other`.
    pub fn collide(&self, other: &OrientedBox) -> Vec<CollisionManifold> {
        let self_in_other = self.vertices_inside(other);
        let other_in_self = other.vertices_inside(self);

        match (self_in_other.len(), other_in_self.len()) {
            (1, 1) => crossed_corners(self, other, self_in_other[0], other_in_self[0]),
            (0, 1) => vec![single_corner(self, other.vertices()[other_in_self[0]])],
            (1, 0) => vec![single_corner(other, self.vertices()[self_in_other[0]]).flipped()],
            (0, 2) => edge_contact(self, other, &other_in_self),
            (2, 0) => edge_contact(other, self, &self_in_other)
                .into_iter()
                .map(CollisionManifold::flipped)
                .collect(),
            _ => separating_axis(self, other).into_iter().collect(),
        }
    }
}

/// One corner of the incident box inside `reference`: push it out through
/// the face with the least penetration.
fn single_corner(reference: &OrientedBox, vertex: Vec2) -> CollisionManifold {
    let local = reference.to_local(vertex);
    let (axis, depth) = shallowest_face(reference, local, FACE_AXES.iter().copied())
        .unwrap_or((Vec2::X, 0.0));
    CollisionManifold::new(rotate(axis, reference.rotation), vertex, depth)
}

/// Two corners (an edge) of `incident` inside `reference`. Both contacts share
/// the face normal minimising the summed penetration and carry half depth.
fn edge_contact(
    reference: &OrientedBox,
    incident: &OrientedBox,
    inside: &[usize],
) -> Vec<CollisionManifold> {
    let vertices = incident.vertices();
    let locals: Vec<Vec2> = inside
        .iter()
        .map(|index| reference.to_local(vertices[*index]))
        .collect();

    let mut best_axis = Vec2::X;
    let mut best_total = f32::MAX;
    for axis in FACE_AXES {
        let total: f32 = locals
            .iter()
            .map(|local| reference.penetration(*local, axis))
            .sum();
        if total < best_total {
            best_total = total;
            best_axis = axis;
        }
    }

    let normal = rotate(best_axis, reference.rotation);
    inside
        .iter()
        .zip(&locals)
        .map(|(index, local)| {
            CollisionManifold::new(
                normal,
                vertices[*index],
                reference.penetration(*local, best_axis) * 0.5,
            )
        })
        .collect()
}

/// Each box has exactly one corner inside the other. Every corner is pushed
/// out through the face of the opposite box that its own edges cross.
fn crossed_corners(
    a: &OrientedBox,
    b: &OrientedBox,
    a_index: usize,
    b_index: usize,
) -> Vec<CollisionManifold> {
    let from_a = corner_against_crossed_face(a, b, b_index);
    let from_b = corner_against_crossed_face(b, a, a_index).flipped();
    vec![from_a, from_b]
}

/// Normal points from `reference` toward `incident`.
fn corner_against_crossed_face(
    reference: &OrientedBox,
    incident: &OrientedBox,
    corner: usize,
) -> CollisionManifold {
    let vertices = incident.vertices();
    let vertex = vertices[corner];
    let local = reference.to_local(vertex);
    let neighbours = [
        reference.to_local(vertices[(corner + 3) % 4]),
        reference.to_local(vertices[(corner + 1) % 4]),
    ];

    let crossed = FACE_AXES.iter().copied().filter(|axis| {
        let (start, end) = reference.face(*axis);
        neighbours
            .iter()
            .any(|neighbour| segments_intersect(local, *neighbour, start, end))
    });

    let (axis, depth) = shallowest_face(reference, local, crossed)
        .or_else(|| shallowest_face(reference, local, FACE_AXES.iter().copied()))
        .unwrap_or((Vec2::X, 0.0));

    CollisionManifold::new(rotate(axis, reference.rotation), vertex, depth * 0.5)
}

/// First face axis with the least penetration for `local`.
fn shallowest_face(
    reference: &OrientedBox,
    local: Vec2,
    axes: impl Iterator<Item = Vec2>,
) -> Option<(Vec2, f32)> {
    axes.map(|axis| (axis, reference.penetration(local, axis)))
        .fold(None, |best, candidate| match best {
            Some(best) if best.1 <= candidate.1 => Some(best),
            _ => Some(candidate),
        })
}

/// Separating-axis test over the four box axes. The contact point is the
/// corner of `b` deepest along the normal.
fn separating_axis(a: &OrientedBox, b: &OrientedBox) -> Option<CollisionManifold> {
    let relative = b.center - a.center;
    let axes_a = a.axes();
    let axes_b = b.axes();

    let mut min_overlap = f32::MAX;
    let mut min_axis = Vec2::ZERO;

    for axis in axes_a.iter().chain(axes_b.iter()).copied() {
        let extent_a =
            axes_a[0].dot(axis).abs() * a.half.x + axes_a[1].dot(axis).abs() * a.half.y;
        let extent_b =
            axes_b[0].dot(axis).abs() * b.half.x + axes_b[1].dot(axis).abs() * b.half.y;

        let projection = relative.dot(axis);
        let overlap = extent_a + extent_b - projection.abs();
        if overlap <= 0.0 {
            return None;
        }

        if overlap < min_overlap {
            min_overlap = overlap;
            min_axis = if projection < 0.0 { -axis } else { axis };
        }
    }

    let point = b
        .vertices()
        .into_iter()
        .fold((Vec2::ZERO, f32::MAX), |best, vertex| {
            let along = vertex.dot(min_axis);
            if along < best.1 {
                (vertex, along)
            } else {
                best
            }
        })
        .0;

    Some(CollisionManifold::new(min_axis, point, min_overlap))
}
