use glam::Vec2;

/// Lengths below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1e-12;

/// Geometry helpers layered over `glam::Vec2`.
///
/// Everything the narrowphase needs is expressed through these so the rotation
/// convention (counter-clockwise, degrees) and the zero-length policy live in
/// one place.
pub trait Vec2Ext {
    fn cross(self, other: Vec2) -> f32;
    fn magnitude(self) -> f32;
    fn distance_to(self, other: Vec2) -> f32;
    /// Unit vector, or `Vec2::ZERO` when the input has no usable length.
    fn normalized(self) -> Vec2;
    /// Rotate counter-clockwise by `angle` degrees.
    fn rotated_deg(self, angle: f32) -> Vec2;
    /// `v - 2 (v·n̂) n̂`. A zero normal leaves the vector untouched.
    fn reflection(self, normal: Vec2) -> Vec2;
    fn projection_on(self, axis: Vec2) -> Vec2;
    /// Clockwise perpendicular `(y, -x)`.
    fn perpendicular(self) -> Vec2;
    /// `1` when the point is left of `a -> b`, `-1` when right, `0` when collinear.
    fn line_side(self, a: Vec2, b: Vec2) -> i32;
    /// Point lies inside the bounding box of segment `a..b` (collinearity assumed).
    fn on_segment(self, a: Vec2, b: Vec2) -> bool;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn magnitude(self) -> f32 {
        self.length()
    }

    #[inline]
    fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    fn normalized(self) -> Vec2 {
        let len = self.length();
        if !len.is_finite() || len <= NORMALIZE_EPSILON {
            return Vec2::ZERO;
        }
        self / len
    }

    fn rotated_deg(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.to_radians().sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn reflection(self, normal: Vec2) -> Vec2 {
        let n = normal.normalized();
        self - n * (2.0 * self.dot(n))
    }

    fn projection_on(self, axis: Vec2) -> Vec2 {
        let len2 = axis.length_squared();
        if len2 <= NORMALIZE_EPSILON {
            return Vec2::ZERO;
        }
        axis * (self.dot(axis) / len2)
    }

    #[inline]
    fn perpendicular(self) -> Vec2 {
        Vec2::new(self.y, -self.x)
    }

    fn line_side(self, a: Vec2, b: Vec2) -> i32 {
        let c = (b - a).cross(self - a);
        if c > 0.0 {
            1
        } else if c < 0.0 {
            -1
        } else {
            0
        }
    }

    fn on_segment(self, a: Vec2, b: Vec2) -> bool {
        self.x <= a.x.max(b.x)
            && self.x >= a.x.min(b.x)
            && self.y <= a.y.max(b.y)
            && self.y >= a.y.min(b.y)
    }
}

/// Vector pointing from `from` to `to`.
#[inline]
pub fn vector_from(from: Vec2, to: Vec2) -> Vec2 {
    to - from
}

#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Unsigned angle in radians; 0 when either vector is zero.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let denom = a.length() * b.length();
    if denom <= NORMALIZE_EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Closed 1D interval overlap.
#[inline]
pub fn intervals_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    !(a_max < b_min || b_max < a_min)
}

/// Segment `p1..p2` against `q1..q2`, touching endpoints included.
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = p1.line_side(q1, q2);
    let d2 = p2.line_side(q1, q2);
    let d3 = q1.line_side(p1, p2);
    let d4 = q2.line_side(p1, p2);

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && p1.on_segment(q1, q2))
        || (d2 == 0 && p2.on_segment(q1, q2))
        || (d3 == 0 && q1.on_segment(p1, p2))
        || (d4 == 0 && q2.on_segment(p1, p2))
}
