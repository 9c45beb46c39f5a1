//! Three-dimensional points and vectors.

use serde::{Deserialize, Serialize};

/// A point or displacement in world coordinates (metres).
///
/// Serialized as a `[x, y, z]` sequence so scenario files can write
/// `position: [0.1, 0.2, 0.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }

    /// Component-wise sum.
    #[must_use]
    pub fn offset(self, by: Self) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.z + by.z)
    }

    /// Component-wise scaling by a scalar.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Whether every component is finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl core::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec3::new(1.0, 2.0, 2.0);
        assert!((a.distance(Vec3::ZERO) - 3.0).abs() < 1e-12);
        assert!((Vec3::ZERO.distance(a) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn deserializes_from_sequence() {
        let v: Vec3 = serde_json::from_str("[0.5, -1.0, 0.25]").unwrap_or_default();
        assert!((v.x - 0.5).abs() < 1e-12);
        assert!((v.y + 1.0).abs() < 1e-12);
        assert!((v.z - 0.25).abs() < 1e-12);
    }

    #[test]
    fn offset_and_scale() {
        let v = Vec3::new(1.0, 0.0, 0.0).scaled(0.5).offset(Vec3::new(0.0, 1.0, 0.0));
        assert!((v.x - 0.5).abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn display_is_comma_separated() {
        assert_eq!(Vec3::new(1.0, 2.5, 0.0).to_string(), "1,2.5,0");
    }
}
