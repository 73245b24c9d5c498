use glam::Vec2;

use crate::body::Body;
use crate::collider::Collider;
use crate::error::Result;
use crate::types::*;

/// Receives contact lifecycle callbacks synchronously during `step`.
pub trait ContactListener {
    fn on_contact_added(&mut self, contact: &Contact);
    fn on_contact_removed(&mut self, contact: &Contact);
}

/// Public API contract for the simulation world.
pub trait PhysicsWorldApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Construction ------------------------------------------------------

    /// Add a body to the pool. The pool grows as needed; this never fails.
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    /// Convenience: attach a collider to an existing body.
    fn create_collider(&mut self, body: BodyHandle, def: ColliderDef) -> Result<ColliderHandle>;

    /// Register the listener invoked for every contact added or removed.
    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>);

    // --- Simulation --------------------------------------------------------

    /// Advance by `dt`: broad phase, integration, narrow phase, contact aging.
    fn step(&mut self, dt: f32);

    /// Push every dynamic body away from `origin`, falling off with distance.
    fn apply_explosion(&mut self, origin: Vec2, strength: f32);

    // --- Access ------------------------------------------------------------

    fn body(&self, handle: BodyHandle) -> Option<&Body>;

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body>;

    /// Contacts currently tracked, in creation order.
    fn contacts(&self) -> &[Contact];

    /// Drain and return the contact events buffered during the last step.
    fn drain_events(&mut self) -> Vec<ContactEvent>;
}

/// Pairwise overlap tests. Every result is oriented from the first shape to
/// the second: the normal points from A toward B and A separates by `-mtv`.
pub trait NarrowphaseApi {
    /// Dispatch on the shape pair of two rebuilt colliders.
    fn colliders(a: &Collider, b: &Collider) -> Option<Overlap>;

    fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Overlap>;

    /// Oriented boxes; the push-out comes from the axis-aligned Minkowski
    /// difference of their enclosing corners.
    fn rect_rect(a: &Aabb, b: &Aabb) -> Option<Overlap>;

    fn circle_rect(center: Vec2, radius: f32, rect: &Aabb) -> Option<Overlap>;

    /// Convex point sets (at least three points each).
    fn convex_convex(a: &[Vec2], b: &[Vec2]) -> Option<Overlap>;

    fn circle_convex(center: Vec2, radius: f32, points: &[Vec2]) -> Option<Overlap>;
}
