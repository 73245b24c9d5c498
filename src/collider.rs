use std::sync::Arc;

use glam::Vec2;
use tracing::debug;

use crate::shape::Shape;
use crate::types::*;
use crate::vector::Vec2Ext;

/// A shape bound to a body, with material and a world-space box rebuilt from
/// the owning body's transform.
#[derive(Clone, Debug)]
pub struct Collider {
    shape: Arc<Shape>,
    offset: Vec2,
    is_sensor: bool,
    material: Material,
    user_data: Option<UserData>,
    half_extents: Vec2,
    // World-space state, valid after `rebuild_aabb`
    position: Vec2,
    aabb: Aabb,
    world_points: Vec<Vec2>,
}

impl Collider {
    pub fn new(def: ColliderDef) -> Self {
        let half_extents = def.shape.half_extents();
        if half_extents == Vec2::ZERO {
            debug!(shape = def.shape.name(), "collider has zero extent and will never collide");
        }
        let world_points = match &*def.shape {
            Shape::Polygon { points } => Vec::with_capacity(points.len()),
            _ => Vec::new(),
        };
        Self {
            shape: def.shape,
            offset: def.offset,
            is_sensor: def.is_sensor,
            material: def.material,
            user_data: def.user_data,
            half_extents,
            position: def.offset,
            aabb: Aabb::from_center(def.offset, half_extents),
            world_points,
        }
    }

    /// Recompute the world center, box and (for polygons) points from the body
    /// transform. `body_rot` is in degrees.
    pub fn rebuild_aabb(&mut self, body_pos: Vec2, body_rot: f32) {
        let h = self.half_extents;
        let offset = self.offset;
        let corner = |local: Vec2| body_pos + (offset + local).rotated_deg(body_rot);

        self.position = body_pos + offset.rotated_deg(body_rot);
        self.aabb = match &*self.shape {
            // No orientation: the box stays axis-aligned around the center
            Shape::Circle { .. } => Aabb::from_center(self.position, h),
            Shape::Rect { .. } | Shape::Polygon { .. } => Aabb::from_vertices([
                corner(h),
                corner(Vec2::new(h.x, -h.y)),
                corner(-h),
                corner(Vec2::new(-h.x, h.y)),
            ]),
        };

        if let Shape::Polygon { points } = &*self.shape {
            self.world_points.clear();
            self.world_points.extend(points.iter().map(|p| corner(*p)));
        }
    }

    /// Shift all world-space state without recomputing the rotation.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.aabb.translate(delta);
        for p in &mut self.world_points {
            *p += delta;
        }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shared handle to the shape, for attaching it elsewhere.
    pub fn shape_arc(&self) -> Arc<Shape> {
        Arc::clone(&self.shape)
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    #[inline]
    pub fn material(&self) -> Material {
        self.material
    }

    #[inline]
    pub fn user_data(&self) -> Option<UserData> {
        self.user_data
    }

    pub fn set_user_data(&mut self, user_data: Option<UserData>) {
        self.user_data = user_data;
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// World-space center of the shape.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// World-space polygon points; empty for other shapes.
    #[inline]
    pub fn world_points(&self) -> &[Vec2] {
        &self.world_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_collider(h: Vec2, offset: Vec2) -> Collider {
        let mut def = ColliderDef::new(Arc::new(Shape::rect(h)));
        def.offset = offset;
        Collider::new(def)
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_circle_aabb_follows_body() {
        let mut c = Collider::new(ColliderDef::new(Arc::new(Shape::circle(2.0))));
        c.rebuild_aabb(Vec2::new(5.0, 5.0), 45.0);
        assert_eq!(c.position(), Vec2::new(5.0, 5.0));
        assert_eq!(c.aabb().bottom_left, Vec2::new(3.0, 3.0));
        assert_eq!(c.aabb().top_right, Vec2::new(7.0, 7.0));
    }

    #[test]
    fn test_rect_rotated_90_swaps_extents() {
        let mut c = rect_collider(Vec2::new(3.0, 1.0), Vec2::ZERO);
        c.rebuild_aabb(Vec2::new(10.0, -4.0), 90.0);
        assert!(approx(c.aabb().half_extents(), Vec2::new(1.0, 3.0)));
        assert!(approx(c.aabb().center(), Vec2::new(10.0, -4.0)));
    }

    #[test]
    fn test_offset_rotates_with_body() {
        let mut c = rect_collider(Vec2::ONE, Vec2::new(2.0, 0.0));
        c.rebuild_aabb(Vec2::ZERO, 90.0);
        assert!(approx(c.position(), Vec2::new(0.0, 2.0)));
        assert!(approx(c.aabb().center(), Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut c = rect_collider(Vec2::new(1.5, 0.5), Vec2::new(0.3, -0.7));
        c.rebuild_aabb(Vec2::new(1.0, 2.0), 33.0);
        let first = *c.aabb();
        c.rebuild_aabb(Vec2::new(1.0, 2.0), 33.0);
        assert_eq!(first, *c.aabb());
    }

    #[test]
    fn test_polygon_world_points_and_translate() {
        let shape = Arc::new(Shape::polygon(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(0.0, 2.0),
        ]));
        let mut c = Collider::new(ColliderDef::new(shape));
        c.rebuild_aabb(Vec2::new(3.0, 0.0), 0.0);
        assert_eq!(c.world_points()[2], Vec2::new(3.0, 2.0));
        assert_eq!(c.half_extents(), Vec2::new(1.0, 2.0));

        c.translate(Vec2::new(0.0, 1.0));
        assert_eq!(c.world_points()[2], Vec2::new(3.0, 3.0));
        assert_eq!(c.aabb().top_right, Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_shared_shape() {
        let shape = Arc::new(Shape::circle(1.0));
        let a = Collider::new(ColliderDef::new(Arc::clone(&shape)));
        let b = Collider::new(ColliderDef::new(a.shape_arc()));
        assert!(Arc::ptr_eq(&a.shape, &b.shape));
    }
}
