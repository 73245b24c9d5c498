use std::sync::Arc;

use glam::Vec2;
use p2d::*;

fn main() -> Result<(), PhysicsError> {
    tracing_subscriber::fmt::init();

    let mut world = PhysicsWorld::new(WorldConfig::default());
    let ball = Arc::new(Shape::circle(0.5));

    // A ring of debris around the origin
    let mut handles = Vec::new();
    for i in 0..12 {
        let p = Vec2::new(3.0, 0.0).rotated_deg(i as f32 * 30.0);
        let h = world.create_body(&BodyDef::new(BodyType::Dynamic, p));
        world
            .create_collider(h, ColliderDef::new(Arc::clone(&ball)))?;
        handles.push(h);
    }

    world.apply_explosion(Vec2::new(1.0, 0.0), 50.0);
    for _ in 0..30 {
        world.step(1.0 / 30.0);
    }

    for h in handles {
        let b = world.body(h).ok_or(PhysicsError::UnknownBody(h))?;
        println!(
            "{:?}: pos=({:.2},{:.2}) speed={:.2}",
            h,
            b.position().x,
            b.position().y,
            b.linear_velocity().length()
        );
    }
    Ok(())
}
