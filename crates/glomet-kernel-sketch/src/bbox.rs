//! Axis-aligned bounding boxes.

use glomet_kernel_math::Point3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs share a region thicker than `tol` on every axis.
    ///
    /// Boxes that merely touch, or overlap by less than `tol`, do not
    /// interpenetrate.
    pub fn interpenetrates(&self, other: &Aabb3, tol: f64) -> bool {
        self.min.x < other.max.x - tol
            && self.max.x > other.min.x + tol
            && self.min.y < other.max.y - tol
            && self.max.y > other.min.y + tol
            && self.min.z < other.max.z - tol
            && self.max.z > other.min.z + tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(x: f64) -> Aabb3 {
        Aabb3::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_touching_boxes() {
        let a = unit_at(0.0);
        let b = unit_at(1.0);
        assert!(!a.interpenetrates(&b, 1e-6));
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = unit_at(0.0);
        let b = unit_at(0.5);
        assert!(a.interpenetrates(&b, 1e-6));
    }

    #[test]
    fn test_include_box() {
        let mut a = Aabb3::empty();
        assert!(a.is_empty());
        a.include_box(&unit_at(0.0));
        a.include_box(&unit_at(5.0));
        assert!((a.max.x - 6.0).abs() < 1e-12);
        assert!(!a.is_empty());
    }
}
