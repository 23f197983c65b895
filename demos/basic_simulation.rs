use impulse2d::*;

fn main() {
    let mut engine = PhysicsEngine::new(1.0 / 60.0);

    let ground = RigidBody::new(Transform::from_position(Vec2::ZERO))
        .with_collider(Collider::cuboid(Vec2::new(10.0, 1.0), 0.0));
    engine.add_body(ground);

    let ball = RigidBody::new(Transform::from_position(Vec2::new(0.0, 3.0)))
        .with_collider(Collider::circle(0.5, 1.0))
        .with_restitution(0.5);
    let ball_id = engine.add_body(ball);

    for frame in 0..120 {
        engine.step(1.0 / 60.0);
        for event in engine.world_mut().drain_collision_events() {
            println!("frame {frame}: {:?} hit {:?}", event.a, event.b);
        }
    }

    if let Some(body) = engine.get_body(ball_id) {
        println!("Ball position after two seconds: {:?}", body.transform.position);
    }
}
