use impulse2d::*;

fn main() {
    let mut world = PhysicsWorld::new(1.0 / 60.0);
    world.add(
        RigidBody::new(Transform::from_position(Vec2::new(5.0, 0.0)))
            .with_collider(Collider::circle(1.0, 0.0)),
    );
    world.add(
        RigidBody::new(Transform::from_position_rotation(Vec2::new(10.0, 0.0), 0.5))
            .with_collider(Collider::cuboid(Vec2::splat(2.0), 0.0)),
    );

    let mut query = RaycastQuery::new(Vec2::ZERO, Vec2::X, 20.0);
    query.closest_only = false;

    let hits = world.raycast(&query);
    println!("Ray hits: {}", hits.len());
    for hit in hits {
        println!(
            "  {:?} at {:?}, distance {:.3}, normal {:?}",
            hit.body, hit.point, hit.distance, hit.normal
        );
    }
}
