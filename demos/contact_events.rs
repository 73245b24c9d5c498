use std::sync::Arc;

use glam::Vec2;
use p2d::*;

struct Printer;

impl ContactListener for Printer {
    fn on_contact_added(&mut self, c: &Contact) {
        println!("added:   {:?} vs {:?} n=({:.2},{:.2})", c.collider_a, c.collider_b, c.normal.x, c.normal.y);
    }

    fn on_contact_removed(&mut self, c: &Contact) {
        println!("removed: {:?} vs {:?}", c.collider_a, c.collider_b);
    }
}

fn main() -> Result<(), PhysicsError> {
    tracing_subscriber::fmt::init();

    let mut world = PhysicsWorld::new(WorldConfig::default());
    world.set_contact_listener(Box::new(Printer));

    // A sensor box sweeping across a row of static pegs
    let sweeper = world.create_body(&BodyDef {
        position: Vec2::new(-6.0, 0.0),
        linear_velocity: Vec2::new(4.0, 0.0),
        ..Default::default()
    });
    let mut sensor = ColliderDef::new(Arc::new(Shape::rect(Vec2::new(0.5, 1.0))));
    sensor.is_sensor = true;
    sensor.user_data = Some(1);
    world.create_collider(sweeper, sensor)?;

    let peg = Arc::new(Shape::circle(0.4));
    for i in 0..4 {
        let h = world.create_body(&BodyDef::new(BodyType::Static, Vec2::new(i as f32 * 3.0 - 4.0, 0.5)));
        let mut def = ColliderDef::new(Arc::clone(&peg));
        def.user_data = Some(100 + i);
        world.create_collider(h, def)?;
    }

    for _ in 0..60 {
        world.step(1.0 / 20.0);
        let events = world.drain_events();
        if !events.is_empty() {
            let stats = world.debug_stats();
            println!(
                "  {} event(s), {} live contact(s), {} candidate pair(s)",
                events.len(),
                stats.contacts,
                stats.candidate_pairs
            );
        }
    }
    Ok(())
}
