use impulse2d::*;

fn main() {
    let mut world = PhysicsWorld::new(1.0 / 60.0);

    world.add(
        RigidBody::new(Transform::from_position(Vec2::ZERO))
            .with_collider(Collider::cuboid(Vec2::new(20.0, 1.0), 0.0)),
    );

    let mut ids = Vec::new();
    for i in 0..5 {
        let body = RigidBody::new(Transform::from_position(Vec2::new(0.0, i as f32 + 1.0)))
            .with_collider(Collider::cuboid(Vec2::ONE, 1.0));
        ids.push(world.add(body));
    }

    for _ in 0..120 {
        world.update(1.0 / 60.0);
    }

    println!("Simulated stack of boxes for 2 seconds");
    for id in ids {
        if let Some(body) = world.body(id) {
            println!("  {:?} at y = {:.3}", id, body.transform.position.y);
        }
    }
}
