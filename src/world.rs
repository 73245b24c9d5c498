use glam::Vec2;

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::api::{ContactListener, PhysicsWorldApi};
use crate::body::Body;
use crate::contact::ContactManager;
use crate::error::{PhysicsError, Result};
use crate::quadtree::QuadTree;
use crate::types::*;
use crate::vector::{NORMALIZE_EPSILON, Vec2Ext};

/// Fixed-step world: body pool, quadtree broad phase and contact tracking.
#[derive(Debug)]
pub struct PhysicsWorld {
    pub cfg: WorldConfig,

    bodies: Vec<Body>,
    tree: QuadTree,
    // Box each body was indexed with this step, by body index
    tree_boxes: Vec<Aabb>,
    contacts: ContactManager,

    last_stats: WorldStats,
}

impl PhysicsWorldApi for PhysicsWorld {
    fn new(cfg: WorldConfig) -> Self {
        let tree = QuadTree::with_config(Aabb::default(), &cfg);
        Self {
            bodies: Vec::with_capacity(cfg.body_block_size),
            tree,
            tree_boxes: Vec::new(),
            contacts: ContactManager::new(),
            last_stats: WorldStats::default(),
            cfg,
        }
    }

    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        if self.bodies.len() == self.bodies.capacity() {
            self.bodies.reserve_exact(self.cfg.body_block_size.max(1));
            debug!(capacity = self.bodies.capacity(), "body pool grown");
        }
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::new(handle, def));
        debug!(?handle, body_type = ?def.body_type, "body created");
        handle
    }

    fn create_collider(&mut self, body: BodyHandle, def: ColliderDef) -> Result<ColliderHandle> {
        self.body_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?
            .create_collider(def)
    }

    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.contacts.set_listener(listener);
    }

    fn step(&mut self, dt: f32) {
        self.contacts.clear_events();

        self.rebuild_tree();
        self.integrate(dt);

        let pairs = self.candidate_pairs();
        for &(ia, ib) in &pairs {
            let (a, b) = pair_mut(&mut self.bodies, ia, ib);
            self.contacts.test_pair(a, b);
        }
        self.contacts.end_step();

        self.last_stats = WorldStats {
            bodies: self.bodies.len(),
            live_bodies: self.bodies.iter().filter(|b| b.body_type().is_live()).count(),
            contacts: self.contacts.contacts().len(),
            tree_nodes: self.tree.node_count(),
            tree_depth: self.tree.depth(),
            candidate_pairs: pairs.len(),
        };
        trace!(dt, stats = ?self.last_stats, "step");
    }

    fn apply_explosion(&mut self, origin: Vec2, strength: f32) {
        for body in self.bodies.iter_mut().filter(|b| b.body_type().is_dynamic()) {
            let dir = body.position() - origin;
            let dist = dir.magnitude();
            if dist <= NORMALIZE_EPSILON {
                continue;
            }
            body.apply_force_to_center(dir.normalized() / dist * strength);
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.index())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.index())
    }

    fn contacts(&self) -> &[Contact] {
        self.contacts.contacts()
    }

    fn drain_events(&mut self) -> Vec<ContactEvent> {
        self.contacts.drain_events()
    }
}

impl PhysicsWorld {
    /// Refit the root to the live bodies and index them in handle order.
    /// Tree limits are taken from `cfg` on every rebuild.
    fn rebuild_tree(&mut self) {
        let mut bounds: Option<Aabb> = None;
        for body in self.bodies.iter().filter(|b| b.body_type().is_live()) {
            bounds = Some(match bounds {
                Some(u) => u.union(body.aabb()),
                None => *body.aabb(),
            });
        }
        let bounds = bounds.unwrap_or_default();
        let margin = Vec2::splat(self.cfg.root_margin.max(0.0));
        let root = Aabb::from_corners(bounds.bottom_left - margin, bounds.top_right + margin);
        self.tree = QuadTree::with_config(root, &self.cfg);

        self.tree_boxes.clear();
        for body in &self.bodies {
            let aabb = *body.aabb();
            if body.body_type().is_live() {
                self.tree.insert(body.handle(), &aabb);
            }
            self.tree_boxes.push(aabb);
        }
    }

    /// Move dynamic bodies by their velocity, then accelerate them by gravity.
    fn integrate(&mut self, dt: f32) {
        let gravity = self.cfg.gravity;
        for body in &mut self.bodies {
            if body.body_type().is_dynamic() {
                body.offset(body.linear_velocity() * dt);
                body.apply_force_to_center(gravity * body.gravity_scale() * dt);
            }
        }
        for body in self.bodies.iter_mut().filter(|b| b.body_type().is_live()) {
            body.rebuild_aabb();
        }
    }

    /// Unique body pairs sharing a leaf, lower index first, in discovery order.
    fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut pairs = Vec::new();
        for body in self.bodies.iter().filter(|b| b.body_type().is_live()) {
            let i = body.handle().index();
            // Cover both the indexed box and where the body moved to
            let query = self.tree_boxes[i].union(body.aabb());
            for other in self.tree.retrieve(body.handle(), &query) {
                let j = other.index();
                let key = if i < j { (i, j) } else { (j, i) };
                if seen.insert(key) {
                    pairs.push(key);
                }
            }
        }
        pairs
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn gravity(&self) -> Vec2 {
        self.cfg.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.cfg.gravity = gravity;
    }

    /// Broad-phase index as built at the start of the last step.
    pub fn quadtree(&self) -> &QuadTree {
        &self.tree
    }

    /// Return debug stats for the last completed step.
    pub fn debug_stats(&self) -> WorldStats {
        self.last_stats
    }
}

/// Two distinct bodies borrowed mutably; `i < j`.
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::shape::Shape;

    fn cfg() -> WorldConfig {
        WorldConfig {
            gravity: Vec2::new(0.0, 10.0),
            max_tree_depth: 5,
            max_node_objects: 2,
            body_block_size: 4,
            root_margin: 1.0,
        }
    }

    fn circle_body(w: &mut PhysicsWorld, body_type: BodyType, position: Vec2, r: f32) -> BodyHandle {
        let h = w.create_body(&BodyDef::new(body_type, position));
        w.create_collider(h, ColliderDef::new(Arc::new(Shape::circle(r)))).unwrap();
        h
    }

    #[test]
    fn test_pool_grows_in_blocks() {
        let mut w = PhysicsWorld::new(cfg());
        let handles: Vec<_> = (0..10)
            .map(|i| w.create_body(&BodyDef::new(BodyType::Static, Vec2::new(i as f32, 0.0))))
            .collect();
        assert_eq!(w.body_count(), 10);
        for (i, h) in handles.iter().enumerate() {
            assert_eq!(h.index(), i);
            assert_eq!(w.body(*h).unwrap().position(), Vec2::new(i as f32, 0.0));
        }
    }

    #[test]
    fn test_create_collider_unknown_body() {
        let mut w = PhysicsWorld::new(cfg());
        let err = w
            .create_collider(BodyHandle(3), ColliderDef::new(Arc::new(Shape::circle(1.0))))
            .unwrap_err();
        assert_eq!(err, PhysicsError::UnknownBody(BodyHandle(3)));
    }

    #[test]
    fn test_integration_moves_then_accelerates() {
        let mut w = PhysicsWorld::new(cfg());
        let h = circle_body(&mut w, BodyType::Dynamic, Vec2::ZERO, 1.0);
        let s = circle_body(&mut w, BodyType::Static, Vec2::new(50.0, 0.0), 1.0);

        w.step(0.5);
        assert_eq!(w.body(h).unwrap().position(), Vec2::ZERO);
        assert_eq!(w.body(h).unwrap().linear_velocity(), Vec2::new(0.0, 5.0));
        w.step(0.5);
        assert_eq!(w.body(h).unwrap().position(), Vec2::new(0.0, 2.5));
        assert_eq!(w.body(h).unwrap().linear_velocity(), Vec2::new(0.0, 10.0));
        assert_eq!(w.body(h).unwrap().colliders()[0].position(), Vec2::new(0.0, 2.5));

        assert_eq!(w.body(s).unwrap().position(), Vec2::new(50.0, 0.0));
        assert_eq!(w.body(s).unwrap().linear_velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_root_bounds_fit_live_bodies() {
        let mut w = PhysicsWorld::new(cfg());
        circle_body(&mut w, BodyType::Static, Vec2::ZERO, 1.0);
        circle_body(&mut w, BodyType::Static, Vec2::new(10.0, 0.0), 1.0);
        // Unused slots are not indexed
        circle_body(&mut w, BodyType::None, Vec2::new(500.0, 0.0), 1.0);
        w.step(0.1);

        let bounds = w.quadtree().bounds();
        assert_eq!(bounds.bottom_left, Vec2::new(-2.0, -2.0));
        assert_eq!(bounds.top_right, Vec2::new(12.0, 2.0));
        assert_eq!(w.quadtree().len(), 2);
        assert_eq!(w.debug_stats().live_bodies, 2);
    }

    #[test]
    fn test_tree_limits_follow_live_config() {
        let mut w = PhysicsWorld::new(WorldConfig::default());
        w.cfg.max_node_objects = 1;
        for i in 0..8 {
            circle_body(&mut w, BodyType::Static, Vec2::new(i as f32 * 10.0, (i % 3) as f32 * 10.0), 1.0);
        }
        w.step(0.1);
        assert!(w.debug_stats().tree_nodes > 1);
        assert!(!w.quadtree().is_leaf());

        // Lowering the depth limit afterwards also takes effect
        w.cfg.max_tree_depth = 0;
        w.step(0.1);
        assert_eq!(w.debug_stats().tree_depth, 1);
        assert_eq!(w.quadtree().len(), 8);
    }

    #[test]
    fn test_overlapping_statics_never_pair() {
        let mut w = PhysicsWorld::new(cfg());
        circle_body(&mut w, BodyType::Static, Vec2::ZERO, 1.0);
        circle_body(&mut w, BodyType::Kinematic, Vec2::new(0.5, 0.0), 1.0);
        w.step(0.1);
        assert!(w.contacts().is_empty());
        assert!(w.drain_events().is_empty());
        assert_eq!(w.debug_stats().candidate_pairs, 1);
    }

    #[test]
    fn test_explosion_pushes_dynamic_away() {
        let mut w = PhysicsWorld::new(WorldConfig::default());
        let near = circle_body(&mut w, BodyType::Dynamic, Vec2::new(2.0, 0.0), 0.5);
        let far = circle_body(&mut w, BodyType::Dynamic, Vec2::new(0.0, -4.0), 0.5);
        let centered = circle_body(&mut w, BodyType::Dynamic, Vec2::ZERO, 0.5);
        let wall = circle_body(&mut w, BodyType::Static, Vec2::new(-2.0, 0.0), 0.5);

        w.apply_explosion(Vec2::ZERO, 8.0);
        assert_eq!(w.body(near).unwrap().linear_velocity(), Vec2::new(4.0, 0.0));
        assert_eq!(w.body(far).unwrap().linear_velocity(), Vec2::new(0.0, -2.0));
        assert_eq!(w.body(centered).unwrap().linear_velocity(), Vec2::ZERO);
        assert_eq!(w.body(wall).unwrap().linear_velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_pair_mut_borrows_both() {
        let mut bodies: Vec<Body> = (0..3)
            .map(|i| Body::new(BodyHandle(i), &BodyDef::default()))
            .collect();
        let (a, b) = pair_mut(&mut bodies, 0, 2);
        assert_eq!((a.handle(), b.handle()), (BodyHandle(0), BodyHandle(2)));
    }
}
