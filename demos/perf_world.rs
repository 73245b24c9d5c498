use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use p2d::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn main() -> Result<(), PhysicsError> {
    let mut world = PhysicsWorld::new(WorldConfig {
        gravity: Vec2::new(0.0, -9.8),
        max_tree_depth: 6,
        max_node_objects: 8,
        body_block_size: 1024,
        root_margin: 1.0,
    });

    let n = 2_000usize; // number of bodies
    let mut seed = 1u32;
    let circle = Arc::new(Shape::circle(0.5));
    let square = Arc::new(Shape::rect(Vec2::splat(0.5)));

    let floor = world.create_body(&BodyDef::new(BodyType::Static, Vec2::new(0.0, -110.0)));
    world
        .create_collider(floor, ColliderDef::new(Arc::new(Shape::rect(Vec2::new(120.0, 5.0)))))?;

    for i in 0..n {
        let rx = unit(&mut seed) * 200.0 - 100.0;
        let ry = unit(&mut seed) * 200.0 - 100.0;
        let vx = unit(&mut seed) * 4.0 - 2.0;
        let vy = unit(&mut seed) * 4.0 - 2.0;
        let h = world.create_body(&BodyDef {
            position: Vec2::new(rx, ry),
            linear_velocity: Vec2::new(vx, vy),
            ..Default::default()
        });
        let shape = if i % 2 == 0 { Arc::clone(&square) } else { Arc::clone(&circle) };
        world.create_collider(h, ColliderDef::new(shape))?;
    }

    let steps = 120;
    let mut events = 0usize;
    let t0 = Instant::now();
    for _ in 0..steps {
        world.step(1.0 / 60.0);
        events += world.drain_events().len();
    }
    let elapsed = t0.elapsed();
    let stats = world.debug_stats();
    println!(
        "N={} steps={} total={:?} per_step={:.3}ms events={} contacts={} pairs={} nodes={} depth={}",
        n,
        steps,
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / steps as f64,
        events,
        stats.contacts,
        stats.candidate_pairs,
        stats.tree_nodes,
        stats.tree_depth
    );
    Ok(())
}
