use approx::assert_relative_eq;
use impulse2d::{
    collision::{box_box::OrientedBox, narrowphase::NarrowPhase},
    Vec2, WorldShape,
};
use std::f32::consts::FRAC_PI_4;

#[test]
fn distant_circles_never_collide() {
    for &(radius_a, radius_b) in &[(0.5, 0.5), (1.0, 2.0), (3.0, 0.25)] {
        for step in 1..20 {
            let gap = step as f32 * 0.05;
            let a = WorldShape::circle(Vec2::ZERO, radius_a);
            let direction = Vec2::from_angle(step as f32 * 0.7);
            let b = WorldShape::circle(direction * (radius_a + radius_b + gap), radius_b);
            assert!(
                NarrowPhase::find_collision_features(&a, &b).is_empty(),
                "radii {radius_a}/{radius_b} gap {gap}"
            );
        }
    }
}

#[test]
fn unit_circles_overlap_by_half() {
    let a = WorldShape::circle(Vec2::ZERO, 1.0);
    let b = WorldShape::circle(Vec2::new(1.5, 0.0), 1.0);
    let manifolds = NarrowPhase::find_collision_features(&a, &b);

    assert_eq!(manifolds.len(), 1);
    assert_relative_eq!(manifolds[0].normal.x, 1.0);
    assert_relative_eq!(manifolds[0].depth, 0.25);
    assert_relative_eq!(manifolds[0].point.x, 0.75);
}

#[test]
fn circle_touching_box_face_has_zero_depth() {
    let boxed = WorldShape::cuboid(Vec2::ZERO, Vec2::splat(2.0), 0.0);
    let circle = WorldShape::circle(Vec2::new(2.0, 0.0), 1.0);
    let manifolds = NarrowPhase::find_collision_features(&circle, &boxed);

    assert_eq!(manifolds.len(), 1);
    assert_relative_eq!(manifolds[0].normal.x, -1.0);
    assert_relative_eq!(manifolds[0].normal.y, 0.0);
    assert_relative_eq!(manifolds[0].depth, 0.0);
}

#[test]
fn swapping_shapes_flips_normals() {
    let pairs = [
        (
            WorldShape::circle(Vec2::ZERO, 1.0),
            WorldShape::cuboid(Vec2::new(1.2, 0.3), Vec2::ONE, 0.4),
        ),
        (
            WorldShape::cuboid(Vec2::ZERO, Vec2::new(4.0, 1.0), 0.0),
            WorldShape::cuboid(Vec2::new(0.0, 0.95), Vec2::ONE, 0.0),
        ),
    ];

    for (a, b) in pairs {
        let forward = NarrowPhase::find_collision_features(&a, &b);
        let backward = NarrowPhase::find_collision_features(&b, &a);
        assert!(!forward.is_empty());
        assert_eq!(forward.len(), backward.len());
        for (f, r) in forward.iter().zip(&backward) {
            assert_relative_eq!(f.normal.x, -r.normal.x, epsilon = 1e-5);
            assert_relative_eq!(f.normal.y, -r.normal.y, epsilon = 1e-5);
        }
    }
}

#[test]
fn box_stack_reports_edge_contacts() {
    let floor = WorldShape::cuboid(Vec2::ZERO, Vec2::new(10.0, 1.0), 0.0);
    let crate_shape = WorldShape::cuboid(Vec2::new(2.0, 0.9), Vec2::ONE, 0.0);
    let manifolds = NarrowPhase::find_collision_features(&floor, &crate_shape);

    assert_eq!(manifolds.len(), 2);
    for m in &manifolds {
        assert_eq!(m.normal, Vec2::Y);
        assert_relative_eq!(m.depth, 0.05, epsilon = 1e-5);
    }
}

#[test]
fn tilted_box_corner_dips_into_floor() {
    let floor = OrientedBox::new(Vec2::ZERO, Vec2::new(10.0, 1.0), 0.0);
    let half_diagonal = 0.5_f32.sqrt();
    let tilted = OrientedBox::new(Vec2::new(0.0, 0.5 + half_diagonal - 0.05), Vec2::ONE, FRAC_PI_4);

    let manifolds = floor.collide(&tilted);
    assert_eq!(manifolds.len(), 1);
    assert_eq!(manifolds[0].normal, Vec2::Y);
    assert_relative_eq!(manifolds[0].depth, 0.05, epsilon = 1e-4);
}

#[test]
fn rotated_boxes_without_corner_overlap_use_separating_axis() {
    // A thin bar crossing a square: no corners inside either shape.
    let square = OrientedBox::new(Vec2::ZERO, Vec2::splat(2.0), 0.0);
    let bar = OrientedBox::new(Vec2::ZERO, Vec2::new(4.0, 0.5), 0.0);

    let manifolds = square.collide(&bar);
    assert_eq!(manifolds.len(), 1);
    assert!(manifolds[0].depth > 0.0);
    assert!(manifolds[0].is_cardinal());
}
