use std::sync::Arc;

use glam::Vec2;
use p2d::*;

fn main() -> Result<(), PhysicsError> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let mut world = PhysicsWorld::new(WorldConfig::with_gravity(Vec2::new(0.0, 98.0)));

    let ball = world.create_body(&BodyDef::new(BodyType::Dynamic, Vec2::new(700.0, 300.0)));
    let floor = world.create_body(&BodyDef::new(BodyType::Static, Vec2::new(700.0, 500.0)));
    world
        .create_collider(ball, ColliderDef::new(Arc::new(Shape::circle(50.0))))?;
    world
        .create_collider(floor, ColliderDef::new(Arc::new(Shape::rect(Vec2::splat(50.0)))))?;

    let dt = 1.0 / 60.0;
    for frame in 0..240 {
        world.step(dt);
        for ev in world.drain_events() {
            println!(
                "frame {frame}: {:?} n=({:.2},{:.2}) mtv=({:.2},{:.2})",
                ev.kind, ev.contact.normal.x, ev.contact.normal.y, ev.contact.mtv.x, ev.contact.mtv.y
            );
        }
        if frame % 30 == 0 {
            let b = world.body(ball).ok_or(PhysicsError::UnknownBody(ball))?;
            println!(
                "frame {frame}: pos=({:.1},{:.1}) vel=({:.1},{:.1})",
                b.position().x,
                b.position().y,
                b.linear_velocity().x,
                b.linear_velocity().y
            );
        }
    }
    Ok(())
}
