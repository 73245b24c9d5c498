//! p2d: 2D rigid-body collision core (quadtree broad phase, SAT narrow phase,
//! persistent contacts with position and velocity correction)

pub mod api;
pub mod body;
pub mod collider;
pub mod contact;
pub mod error;
pub mod narrowphase;
pub mod quadtree;
pub mod shape;
pub mod types;
pub mod vector;
pub mod world;

pub use glam::Vec2;

pub use crate::api::*;
pub use crate::body::Body;
pub use crate::collider::Collider;
pub use crate::contact::ContactManager;
pub use crate::error::PhysicsError;
pub use crate::narrowphase::Narrowphase;
pub use crate::quadtree::QuadTree;
pub use crate::shape::Shape;
pub use crate::types::*;
pub use crate::vector::Vec2Ext;
pub use crate::world::PhysicsWorld;
