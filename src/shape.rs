use glam::Vec2;

/// Geometry attached to colliders. Shared between colliders through `Arc`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Centered circle.
    Circle { radius: f32 },
    /// Centered rectangle (half extents along the body's local X/Y).
    Rect { half_extents: Vec2 },
    /// Convex polygon, points relative to the collider center.
    Polygon { points: Vec<Vec2> },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn rect(half_extents: Vec2) -> Self {
        Shape::Rect { half_extents }
    }

    pub fn polygon(points: Vec<Vec2>) -> Self {
        Shape::Polygon { points }
    }

    /// Local half extent used for bounding boxes. Polygons use the largest
    /// `|x|` and `|y|` among their points, not a tight hull.
    pub fn half_extents(&self) -> Vec2 {
        match self {
            Shape::Circle { radius } => Vec2::splat(*radius),
            Shape::Rect { half_extents } => *half_extents,
            Shape::Polygon { points } => points
                .iter()
                .fold(Vec2::ZERO, |acc, p| acc.max(p.abs())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Rect { .. } => "rect",
            Shape::Polygon { .. } => "polygon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_extents_per_kind() {
        assert_eq!(Shape::circle(2.5).half_extents(), Vec2::splat(2.5));
        assert_eq!(Shape::rect(Vec2::new(3.0, 1.0)).half_extents(), Vec2::new(3.0, 1.0));
        let tri = Shape::polygon(vec![
            Vec2::new(-2.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(0.0, 3.0),
        ]);
        assert_eq!(tri.half_extents(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_empty_polygon_is_inert() {
        assert_eq!(Shape::polygon(Vec::new()).half_extents(), Vec2::ZERO);
    }
}
