#![warn(missing_docs)]

//! Math types for the glomet solid kernel.
//!
//! Thin aliases over nalgebra, plus the [`Tolerance`] used for every
//! geometric comparison.
//!
//! Half-section profiles live in 2D: `x` is the radial distance from the
//! revolution axis and `y` is the height along it. Every axis in the kernel
//! is parallel to world Z.

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit direction in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the (r, z) half-plane of a profile.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the (r, z) half-plane of a profile.
pub type Vec2 = Vector2<f64>;

/// Tolerances for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// 1e-6 mm linear, 1e-9 rad angular.
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Custom linear tolerance, default angular.
    pub fn with_linear(linear: f64) -> Self {
        Self {
            linear,
            ..Self::DEFAULT
        }
    }

    /// Whether two profile points coincide.
    pub fn points2_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Whether a length is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 2D cross product (z component of the 3D cross product).
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Distance between two points projected onto the XY plane, i.e. between
/// the vertical lines through them.
pub fn horizontal_distance(a: &Point3, b: &Point3) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points2_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        assert!(tol.points2_equal(&a, &Point2::new(1.0 + 1e-7, 2.0)));
        assert!(!tol.points2_equal(&a, &Point2::new(1.001, 2.0)));
    }

    #[test]
    fn test_with_linear() {
        let tol = Tolerance::with_linear(1e-3);
        assert!(tol.is_zero(5e-4));
        assert!(!tol.is_zero(2e-3));
        assert_eq!(tol.angular, Tolerance::DEFAULT.angular);
    }

    #[test]
    fn test_cross2_sign() {
        assert!(cross2(&Vec2::x(), &Vec2::y()) > 0.0);
        assert!(cross2(&Vec2::y(), &Vec2::x()) < 0.0);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 100.0);
        assert!((horizontal_distance(&a, &b) - 5.0).abs() < 1e-12);
    }
}
