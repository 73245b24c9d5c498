use std::sync::Arc;

use glam::Vec2;

use crate::shape::Shape;

/// User-defined opaque key carried on colliders (e.g., pack your entity id).
pub type UserData = u64;

/// Index of a body in the world's pool. Bodies live as long as the world, so
/// the index stays valid across pool growth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A collider slot on a body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle {
    pub body: BodyHandle,
    pub index: u16,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyType {
    /// Unused slot; skipped by the simulation entirely.
    #[default]
    None,
    Static,
    Kinematic,
    Dynamic,
}

impl BodyType {
    #[inline]
    pub fn is_dynamic(self) -> bool {
        matches!(self, BodyType::Dynamic)
    }

    #[inline]
    pub fn is_live(self) -> bool {
        !matches!(self, BodyType::None)
    }
}

/// Surface response coefficients, read from the *other* collider when a body
/// is corrected.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Share of the other body's velocity handed over on impact, in [0,1].
    pub restitution: f32,
    /// Scale applied to the reflected normal component.
    pub bounce: f32,
    /// Scale applied to the tangential component.
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            bounce: 1.0,
            friction: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    /// Degrees.
    pub rotation: f32,
    pub linear_velocity: Vec2,
    pub gravity_scale: f32,
    /// Zero, negative or non-finite masses are replaced by 1.
    pub mass: f32,
    pub max_collider_count: usize,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            mass: 1.0,
            max_collider_count: 4,
        }
    }
}

impl BodyDef {
    pub fn new(body_type: BodyType, position: Vec2) -> Self {
        Self {
            body_type,
            position,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColliderDef {
    pub shape: Arc<Shape>,
    /// Body-relative position of the shape center.
    pub offset: Vec2,
    pub is_sensor: bool,
    pub material: Material,
    pub user_data: Option<UserData>,
}

impl ColliderDef {
    pub fn new(shape: Arc<Shape>) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            is_sensor: false,
            material: Material::default(),
            user_data: None,
        }
    }
}

/// Bounding box with its four corner vertices and edge vectors.
///
/// `vertices` run top-right, bottom-right, bottom-left, top-left in the owner's
/// own frame and `edges[i] = vertices[i + 1] - vertices[i]`. For rotated
/// rectangles the vertices are the oriented corners while `top_right` /
/// `bottom_left` always enclose them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub vertices: [Vec2; 4],
    pub edges: [Vec2; 4],
}

impl Aabb {
    /// Axis-aligned box from its corners.
    pub fn from_corners(bottom_left: Vec2, top_right: Vec2) -> Self {
        Self::from_vertices([
            top_right,
            Vec2::new(top_right.x, bottom_left.y),
            bottom_left,
            Vec2::new(bottom_left.x, top_right.y),
        ])
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::from_corners(center - half_extents, center + half_extents)
    }

    /// Box over (possibly rotated) corner vertices; corners are their bounds.
    pub fn from_vertices(vertices: [Vec2; 4]) -> Self {
        let mut min = vertices[0];
        let mut max = vertices[0];
        for v in &vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }
        let edges = [
            vertices[1] - vertices[0],
            vertices[2] - vertices[1],
            vertices[3] - vertices[2],
            vertices[0] - vertices[3],
        ];
        Self {
            top_right: max,
            bottom_left: min,
            vertices,
            edges,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.top_right + self.bottom_left) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.top_right - self.bottom_left
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Closed overlap test on the enclosing corners.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.bottom_left.x <= other.top_right.x
            && other.bottom_left.x <= self.top_right.x
            && self.bottom_left.y <= other.top_right.y
            && other.bottom_left.y <= self.top_right.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.bottom_left.x
            && p.x <= self.top_right.x
            && p.y >= self.bottom_left.y
            && p.y <= self.top_right.y
    }

    /// Axis-aligned union of both boxes' corners.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::from_corners(
            self.bottom_left.min(other.bottom_left),
            self.top_right.max(other.top_right),
        )
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.top_right += delta;
        self.bottom_left += delta;
        for v in &mut self.vertices {
            *v += delta;
        }
    }
}

/// Narrowphase result for a colliding pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Overlap {
    /// Unit normal pointing from A toward B (zero when undefined).
    pub normal: Vec2,
    /// Translation separating the pair: A moves by `-mtv`, B by `+mtv`.
    pub mtv: Vec2,
}

impl Overlap {
    /// Same overlap seen from the other collider.
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            mtv: -self.mtv,
        }
    }
}

/// Tracked collision between two colliders.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    pub normal: Vec2,
    pub mtv: Vec2,
    /// Set when the pair was tested this step; aged by the world afterwards.
    pub touched: bool,
}

impl Contact {
    pub fn new(collider_a: ColliderHandle, collider_b: ColliderHandle, overlap: Overlap) -> Self {
        Self {
            collider_a,
            collider_b,
            normal: overlap.normal,
            mtv: overlap.mtv,
            touched: true,
        }
    }

    /// Match ignoring order.
    pub fn involves_pair(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        (self.collider_a == a && self.collider_b == b) || (self.collider_a == b && self.collider_b == a)
    }

    pub fn involves_body(&self, body: BodyHandle) -> bool {
        self.collider_a.body == body || self.collider_b.body == body
    }
}

/// Event discriminator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactEventKind {
    Added,
    Removed,
}

/// Contact lifecycle event buffered during a step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    pub contact: Contact,
}

/// World-level configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Acceleration applied to dynamic bodies each step (scaled per body).
    pub gravity: Vec2,
    /// Quadtree nodes deeper than this no longer split.
    pub max_tree_depth: u32,
    /// A quadtree leaf splits once it holds more entries than this.
    pub max_node_objects: usize,
    /// Body pool grows by this many slots when full.
    pub body_block_size: usize,
    /// Padding added around the fitted quadtree root bounds.
    pub root_margin: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            max_tree_depth: 5,
            max_node_objects: 10,
            body_block_size: 64,
            root_margin: 1.0,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }
}

/// Debug statistics for the last completed step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub bodies: usize,
    pub live_bodies: usize,
    pub contacts: usize,
    pub tree_nodes: usize,
    pub tree_depth: u32,
    /// Unique body pairs handed to the contact manager.
    pub candidate_pairs: usize,
}
