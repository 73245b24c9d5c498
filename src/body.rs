use glam::Vec2;

use crate::collider::Collider;
use crate::error::{PhysicsError, Result};
use crate::types::*;

/// Rigid body: position, rotation (degrees), linear velocity and a bounded,
/// append-only set of colliders.
#[derive(Clone, Debug)]
pub struct Body {
    handle: BodyHandle,
    body_type: BodyType,
    position: Vec2,
    rotation: f32,
    linear_velocity: Vec2,
    gravity_scale: f32,
    mass: f32,
    max_collider_count: usize,
    colliders: Vec<Collider>,
    aabb: Aabb,
}

impl Body {
    pub fn new(handle: BodyHandle, def: &BodyDef) -> Self {
        let mass = if def.mass.is_finite() && def.mass > 0.0 { def.mass } else { 1.0 };
        let mut body = Self {
            handle,
            body_type: def.body_type,
            position: def.position,
            rotation: def.rotation,
            linear_velocity: def.linear_velocity,
            gravity_scale: def.gravity_scale,
            mass,
            max_collider_count: def.max_collider_count,
            colliders: Vec::with_capacity(def.max_collider_count),
            aabb: Aabb::default(),
        };
        body.rebuild_aabb();
        body
    }

    /// Attach a collider in the next free slot. Colliders are never removed, so
    /// the capacity given in the `BodyDef` is final.
    pub fn create_collider(&mut self, def: ColliderDef) -> Result<ColliderHandle> {
        let index = self.colliders.len();
        let capacity_error = PhysicsError::ColliderCapacity {
            body: self.handle,
            capacity: self.max_collider_count,
        };
        if index >= self.max_collider_count {
            return Err(capacity_error);
        }
        let index = u16::try_from(index).map_err(|_| capacity_error)?;

        let mut collider = Collider::new(def);
        collider.rebuild_aabb(self.position, self.rotation);
        self.colliders.push(collider);
        self.rebuild_aabb();
        Ok(ColliderHandle { body: self.handle, index })
    }

    /// Rebuild every collider box and merge them into the body box.
    pub fn rebuild_aabb(&mut self) {
        let mut min = self.position;
        let mut max = self.position;
        for (i, collider) in self.colliders.iter_mut().enumerate() {
            collider.rebuild_aabb(self.position, self.rotation);
            let b = collider.aabb();
            if i == 0 {
                min = b.bottom_left;
                max = b.top_right;
            } else {
                min = min.min(b.bottom_left);
                max = max.max(b.top_right);
            }
        }
        self.aabb = Aabb::from_corners(min, max);
    }

    /// Velocity change of `force / mass`. Only dynamic bodies respond.
    pub fn apply_force_to_center(&mut self, force: Vec2) {
        if !self.body_type.is_dynamic() {
            return;
        }
        self.linear_velocity += force / self.mass;
    }

    /// Translate the body together with every collider's cached world state.
    pub fn offset(&mut self, delta: Vec2) {
        self.position += delta;
        for collider in &mut self.colliders {
            collider.translate(delta);
        }
        self.aabb.translate(delta);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.rebuild_aabb();
    }

    /// Degrees. Rotation is only ever set, never integrated.
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.rebuild_aabb();
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        self.linear_velocity = velocity;
    }

    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
    }

    #[inline]
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    #[inline]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    #[inline]
    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    #[inline]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider(&self, index: u16) -> Option<&Collider> {
        self.colliders.get(index as usize)
    }

    pub fn collider_mut(&mut self, index: u16) -> Option<&mut Collider> {
        self.colliders.get_mut(index as usize)
    }

    #[inline]
    pub fn max_collider_count(&self) -> usize {
        self.max_collider_count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::shape::Shape;

    fn body(body_type: BodyType, position: Vec2) -> Body {
        Body::new(BodyHandle(0), &BodyDef::new(body_type, position))
    }

    #[test]
    fn test_zero_mass_defaults_to_one() {
        let mut def = BodyDef::default();
        def.mass = 0.0;
        assert_eq!(Body::new(BodyHandle(3), &def).mass(), 1.0);
        def.mass = f32::NAN;
        assert_eq!(Body::new(BodyHandle(3), &def).mass(), 1.0);
        def.mass = 4.0;
        assert_eq!(Body::new(BodyHandle(3), &def).mass(), 4.0);
    }

    #[test]
    fn test_collider_capacity_is_enforced() {
        let mut def = BodyDef::default();
        def.max_collider_count = 2;
        let mut b = Body::new(BodyHandle(7), &def);
        let shape = Arc::new(Shape::circle(1.0));
        let c0 = b.create_collider(ColliderDef::new(Arc::clone(&shape))).unwrap();
        let c1 = b.create_collider(ColliderDef::new(Arc::clone(&shape))).unwrap();
        assert_eq!((c0.index, c1.index), (0, 1));
        assert_eq!(c1.body, BodyHandle(7));

        let err = b.create_collider(ColliderDef::new(shape)).unwrap_err();
        assert_eq!(err, PhysicsError::ColliderCapacity { body: BodyHandle(7), capacity: 2 });
        assert_eq!(b.colliders().len(), 2);
    }

    #[test]
    fn test_merged_aabb_is_union_of_colliders() {
        let mut b = body(BodyType::Dynamic, Vec2::new(10.0, 0.0));
        let mut left = ColliderDef::new(Arc::new(Shape::circle(1.0)));
        left.offset = Vec2::new(-3.0, 0.0);
        let mut right = ColliderDef::new(Arc::new(Shape::rect(Vec2::new(1.0, 2.0))));
        right.offset = Vec2::new(3.0, 0.0);
        b.create_collider(left).unwrap();
        b.create_collider(right).unwrap();

        assert_eq!(b.aabb().bottom_left, Vec2::new(6.0, -2.0));
        assert_eq!(b.aabb().top_right, Vec2::new(14.0, 2.0));
    }

    #[test]
    fn test_offset_moves_colliders() {
        let mut b = body(BodyType::Dynamic, Vec2::ZERO);
        b.create_collider(ColliderDef::new(Arc::new(Shape::circle(1.0)))).unwrap();
        b.offset(Vec2::new(2.0, 3.0));
        assert_eq!(b.position(), Vec2::new(2.0, 3.0));
        assert_eq!(b.colliders()[0].position(), Vec2::new(2.0, 3.0));
        assert_eq!(b.aabb().center(), Vec2::new(2.0, 3.0));

        // Translating matches a full rebuild at the new position
        let translated = *b.aabb();
        b.rebuild_aabb();
        assert_eq!(translated, *b.aabb());
    }

    #[test]
    fn test_force_only_moves_dynamic() {
        let mut d = body(BodyType::Dynamic, Vec2::ZERO);
        d.apply_force_to_center(Vec2::new(0.0, 2.0));
        assert_eq!(d.linear_velocity(), Vec2::new(0.0, 2.0));

        for t in [BodyType::Static, BodyType::Kinematic] {
            let mut s = body(t, Vec2::ZERO);
            s.apply_force_to_center(Vec2::new(0.0, 2.0));
            assert_eq!(s.linear_velocity(), Vec2::ZERO);
        }
    }

    #[test]
    fn test_set_rotation_rebuilds() {
        let mut b = body(BodyType::Kinematic, Vec2::ZERO);
        b.create_collider(ColliderDef::new(Arc::new(Shape::rect(Vec2::new(4.0, 1.0)))))
            .unwrap();
        b.set_rotation(90.0);
        let h = b.aabb().half_extents();
        assert!((h.x - 1.0).abs() < 1e-4 && (h.y - 4.0).abs() < 1e-4);
    }
}
