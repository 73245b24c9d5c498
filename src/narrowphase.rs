use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::collider::Collider;
use crate::shape::Shape;
use crate::types::*;
use crate::vector::{NORMALIZE_EPSILON, Vec2Ext, intervals_overlap};

/// Separating-axis tests per shape pair.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn colliders(a: &Collider, b: &Collider) -> Option<Overlap> {
        // Zero-extent colliders are inert
        if a.half_extents() == Vec2::ZERO || b.half_extents() == Vec2::ZERO {
            return None;
        }
        match (a.shape(), b.shape()) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                Self::circle_circle(a.position(), *ra, b.position(), *rb)
            }
            (Shape::Rect { .. }, Shape::Rect { .. }) => Self::rect_rect(a.aabb(), b.aabb()),
            (Shape::Circle { radius }, Shape::Rect { .. }) => {
                Self::circle_rect(a.position(), *radius, b.aabb())
            }
            (Shape::Rect { .. }, Shape::Circle { radius }) => {
                Self::circle_rect(b.position(), *radius, a.aabb()).map(Overlap::flipped)
            }
            (Shape::Polygon { .. }, Shape::Polygon { .. }) => {
                Self::convex_convex(a.world_points(), b.world_points())
            }
            (Shape::Polygon { .. }, Shape::Rect { .. }) => {
                Self::convex_convex(a.world_points(), &b.aabb().vertices)
            }
            (Shape::Rect { .. }, Shape::Polygon { .. }) => {
                Self::convex_convex(&a.aabb().vertices, b.world_points())
            }
            (Shape::Circle { radius }, Shape::Polygon { .. }) => {
                Self::circle_convex(a.position(), *radius, b.world_points())
            }
            (Shape::Polygon { .. }, Shape::Circle { radius }) => {
                Self::circle_convex(b.position(), *radius, a.world_points()).map(Overlap::flipped)
            }
        }
    }

    fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Overlap> {
        let delta = cb - ca;
        let dist = delta.length();
        let rsum = ra + rb;
        if dist > rsum {
            return None;
        }
        // Coincident centers: pick a fixed direction so the pair still separates
        let normal = if dist > NORMALIZE_EPSILON { delta / dist } else { Vec2::X };
        Some(Overlap {
            normal,
            mtv: normal * (rsum - dist),
        })
    }

    fn rect_rect(a: &Aabb, b: &Aabb) -> Option<Overlap> {
        // Opposite edges are parallel, so two edges per box cover every axis
        let axes = [a.edges[0], a.edges[1], b.edges[0], b.edges[1]];
        for edge in axes {
            let axis = edge.perpendicular().normalized();
            if axis == Vec2::ZERO {
                continue;
            }
            let (a_min, a_max) = project(&a.vertices, axis);
            let (b_min, b_max) = project(&b.vertices, axis);
            if !intervals_overlap(a_min, a_max, b_min, b_max) {
                return None;
            }
        }

        let top_right = a.top_right - b.bottom_left;
        let bottom_left = a.bottom_left - b.top_right;
        let candidates = [
            Vec2::new(bottom_left.x, 0.0),
            Vec2::new(top_right.x, 0.0),
            Vec2::new(0.0, top_right.y),
            Vec2::new(0.0, bottom_left.y),
        ];
        let mut mtv = candidates[0];
        let mut min = f32::INFINITY;
        for c in candidates {
            let magnitude = c.x.abs() + c.y.abs();
            if magnitude < min {
                min = magnitude;
                mtv = c;
            }
        }

        Some(Overlap {
            normal: mtv.normalized(),
            mtv,
        })
    }

    fn circle_rect(center: Vec2, radius: f32, rect: &Aabb) -> Option<Overlap> {
        let v = &rect.vertices;
        // Between a pair of opposite edges means the center faces a side
        let in_zone = (0..2).any(|i| {
            let s1 = center.line_side(v[i], v[i + 1]);
            let s2 = center.line_side(v[i + 2], v[(i + 3) % 4]);
            s1 * s2 >= 0
        });

        if in_zone {
            return circle_rect_face(center, radius, rect);
        }
        circle_rect_corner(center, radius, rect)
    }

    fn convex_convex(a: &[Vec2], b: &[Vec2]) -> Option<Overlap> {
        if a.len() < 3 || b.len() < 3 {
            return None;
        }
        let (depth_a, axis_a) = min_penetration(a, b)?;
        let (depth_b, axis_b) = min_penetration(b, a)?;
        let (depth, axis) = if depth_b < depth_a { (depth_b, axis_b) } else { (depth_a, axis_a) };

        let normal = orient(axis, centroid(b) - centroid(a));
        Some(Overlap {
            normal,
            mtv: normal * depth,
        })
    }

    fn circle_convex(center: Vec2, radius: f32, points: &[Vec2]) -> Option<Overlap> {
        if points.len() < 3 {
            return None;
        }

        let mut best: Option<(f32, Vec2)> = None;
        let mut consider = |axis: Vec2| -> bool {
            if axis == Vec2::ZERO {
                return true;
            }
            let c = center.dot(axis);
            let (p_min, p_max) = project(points, axis);
            let (c_min, c_max) = (c - radius, c + radius);
            if !intervals_overlap(c_min, c_max, p_min, p_max) {
                return false;
            }
            let depth = (c_max - p_min).min(p_max - c_min);
            if best.is_none_or(|(d, _)| depth < d) {
                best = Some((depth, axis));
            }
            true
        };

        for (i, p) in points.iter().enumerate() {
            let next = points[(i + 1) % points.len()];
            if !consider((next - *p).perpendicular().normalized()) {
                return None;
            }
        }

        // Axis toward the closest vertex catches the corner regions
        let closest = points
            .iter()
            .copied()
            .fold((f32::INFINITY, Vec2::ZERO), |(best_d, best_p), p| {
                let d = p.distance_squared(center);
                if d < best_d { (d, p) } else { (best_d, best_p) }
            })
            .1;
        if !consider((closest - center).normalized()) {
            return None;
        }

        let (depth, axis) = best?;
        let normal = orient(axis, centroid(points) - center);
        Some(Overlap {
            normal,
            mtv: normal * depth,
        })
    }
}

/// Circle center faces a side: SAT along the rectangle's own axes, pushing
/// out along the one with least overlap.
fn circle_rect_face(center: Vec2, radius: f32, rect: &Aabb) -> Option<Overlap> {
    let mut best: Option<(f32, Vec2)> = None;
    for edge in [rect.edges[0], rect.edges[1]] {
        let axis = edge.normalized();
        if axis == Vec2::ZERO {
            continue;
        }
        let c = center.dot(axis);
        let (c_min, c_max) = (c - radius, c + radius);
        let (r_min, r_max) = project(&rect.vertices, axis);
        if !intervals_overlap(c_min, c_max, r_min, r_max) {
            return None;
        }
        let overlap = (c_max - r_min).min(r_max - c_min);
        if best.is_none_or(|(d, _)| overlap < d) {
            best = Some((overlap, axis));
        }
    }

    let (depth, axis) = best?;
    let rect_center = (rect.vertices[0] + rect.vertices[2]) * 0.5;
    let normal = orient(axis, rect_center - center);
    Some(Overlap {
        normal,
        mtv: normal * depth,
    })
}

/// Circle center sits in a corner region: distance to the nearest vertex.
fn circle_rect_corner(center: Vec2, radius: f32, rect: &Aabb) -> Option<Overlap> {
    let mut nearest = rect.vertices[0];
    let mut dist = f32::INFINITY;
    for vertex in rect.vertices {
        let d = center.distance_to(vertex);
        if d < dist {
            dist = d;
            nearest = vertex;
        }
    }
    if dist >= radius {
        return None;
    }

    let to_vertex = nearest - center;
    let normal = to_vertex.normalized();
    Some(Overlap {
        normal,
        mtv: normal * radius - to_vertex,
    })
}

fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Smallest overlap over the edge normals of `reference`, or `None` when one
/// of them separates the sets.
fn min_penetration(reference: &[Vec2], other: &[Vec2]) -> Option<(f32, Vec2)> {
    let mut best = (f32::INFINITY, Vec2::ZERO);
    for (i, p) in reference.iter().enumerate() {
        let next = reference[(i + 1) % reference.len()];
        let axis = (next - *p).perpendicular().normalized();
        if axis == Vec2::ZERO {
            continue;
        }
        let (r_min, r_max) = project(reference, axis);
        let (o_min, o_max) = project(other, axis);
        if !intervals_overlap(r_min, r_max, o_min, o_max) {
            return None;
        }
        let depth = (r_max - o_min).min(o_max - r_min);
        if depth < best.0 {
            best = (depth, axis);
        }
    }
    Some(best)
}

fn centroid(points: &[Vec2]) -> Vec2 {
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Flip `axis` so it points along `toward`.
#[inline]
fn orient(axis: Vec2, toward: Vec2) -> Vec2 {
    if axis.dot(toward) < 0.0 { -axis } else { axis }
}
