//! Mathematical types shared between the core and gameplay crates.
//!
//! These are the canonical 2D representations the host maps its own
//! vector and bounds types onto.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Lengths below this are treated as zero when normalizing.
const NORMALIZE_EPSILON: f32 = 1e-5;

/// 2D Vector - position, velocity, direction
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0);

    /// Unit vector at `angle` radians from +X, counter-clockwise.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or [`Vec2::ZERO`] for a
    /// (near-)zero input.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= NORMALIZE_EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Counter-clockwise perpendicular: `(-y, x)`.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Whether both components are (near) zero.
    #[must_use]
    pub fn is_near_zero(self) -> bool {
        self.length_squared() <= NORMALIZE_EPSILON * NORMALIZE_EPSILON
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned visible play field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    /// Bottom-left corner
    pub min: Vec2,
    /// Top-right corner
    pub max: Vec2,
}

impl PlayField {
    /// Creates a field from its corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Field centered on the origin with the given half extents.
    #[must_use]
    pub const fn centered(half_width: f32, half_height: f32) -> Self {
        Self::new(
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, half_height),
        )
    }

    /// Width
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// Whether the field has a positive area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Maps viewport coordinates (0..1 across the field) to a world point.
    /// Values outside 0..1 land outside the field.
    #[must_use]
    pub fn viewport_to_world(&self, u: f32, v: f32) -> Vec2 {
        Vec2::new(self.min.x + u * self.width(), self.min.y + v * self.height())
    }
}

impl Default for PlayField {
    fn default() -> Self {
        // 16:9 view with an orthographic half-height of 5 units.
        Self::centered(8.9, 5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 5.0);

        let sum = a + b;
        assert_eq!(sum, Vec2::new(5.0, 7.0));
        assert_eq!(a.dot(b), 14.0);
        assert_eq!((b - a) * 2.0, Vec2::new(6.0, 6.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
    }

    #[test]
    fn test_normalize_and_perpendicular() {
        let v = Vec2::new(3.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);

        let p = Vec2::X.perpendicular();
        assert_eq!(p, Vec2::new(-0.0, 1.0));
        assert_eq!(Vec2::X.dot(p), 0.0);
    }

    #[test]
    fn test_from_angle_is_unit() {
        for i in 0..16 {
            let v = Vec2::from_angle(i as f32 * 0.4);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_play_field_geometry() {
        let field = PlayField::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 4.0));
        assert_eq!(field.center(), Vec2::new(5.0, 2.0));
        assert!(field.contains(Vec2::new(10.0, 4.0)));
        assert!(!field.contains(Vec2::new(10.1, 4.0)));
        assert_eq!(field.viewport_to_world(1.5, 0.5), Vec2::new(15.0, 2.0));
        assert!(field.is_valid());
        assert!(!PlayField::centered(0.0, 1.0).is_valid());
    }

    #[test]
    fn test_vec2_bytemuck() {
        let v = Vec2::new(1.0, 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 8);
    }

    #[test]
    fn test_play_field_from_toml() {
        let field: PlayField = toml::from_str(
            "min = { x = -4.0, y = -3.0 }\nmax = { x = 4.0, y = 3.0 }",
        )
        .unwrap();
        assert_eq!(field, PlayField::centered(4.0, 3.0));
    }
}
