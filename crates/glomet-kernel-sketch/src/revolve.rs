//! Solids of revolution built from half-section profiles.

use glomet_kernel_math::{horizontal_distance, Point2, Point3, Tolerance, Vec3};

use crate::edges::{nearest_edge, BodyEdge, EdgeKind};
use crate::fillet::fillet_corner;
use crate::{Aabb3, SectionProfile, SketchError};

/// A profile revolved a full turn about the vertical axis through `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct RevolvedBody {
    /// A point on the revolution axis; profile heights are measured from it.
    pub origin: Point3,
    /// The half-section in (r, z).
    pub profile: SectionProfile,
}

impl RevolvedBody {
    /// Create a body revolving `profile` about the vertical axis through `origin`.
    pub fn new(origin: Point3, profile: SectionProfile) -> Self {
        Self { origin, profile }
    }

    /// World position of profile point `p` at revolution angle `angle`.
    pub fn point_at(&self, p: &Point2, angle: f64) -> Point3 {
        let (s, c) = angle.sin_cos();
        Point3::new(
            self.origin.x + p.x * c,
            self.origin.y + p.x * s,
            self.origin.z + p.y,
        )
    }

    /// The same body moved by `(dx, dy, dz)`.
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            origin: self.origin + Vec3::new(dx, dy, dz),
            profile: self.profile.clone(),
        }
    }

    /// All edges in enumeration order: vertex circles, then seams.
    pub fn edges(&self, tol: &Tolerance) -> Vec<BodyEdge> {
        let segments = self.profile.segments();
        let circles = segments.iter().enumerate().map(|(i, seg)| {
            let v = seg.start();
            BodyEdge {
                kind: EdgeKind::Circle { vertex: i },
                center: Point3::new(self.origin.x, self.origin.y, self.origin.z + v.y),
                radius: v.x,
            }
        });
        let seams = segments
            .iter()
            .enumerate()
            .filter(|(_, seg)| !seg.is_horizontal(tol))
            .map(|(i, seg)| {
                let mid = seg.midpoint();
                BodyEdge {
                    kind: EdgeKind::Seam { segment: i },
                    center: self.point_at(&mid, 0.0),
                    radius: mid.x,
                }
            });
        circles.chain(seams).collect()
    }

    /// The edge nearest to `target`, see [`nearest_edge`].
    pub fn nearest_edge(&self, target: &Point3, tol: &Tolerance) -> Option<BodyEdge> {
        let edges = self.edges(tol);
        nearest_edge(&edges, target, tol).map(|i| edges[i].clone())
    }

    /// Round the given edge with `radius`.
    ///
    /// Only vertex circles can be filleted; seams are not real edges of
    /// the surface.
    pub fn fillet_edge(
        &self,
        edge: EdgeKind,
        radius: f64,
        tol: &Tolerance,
    ) -> Result<Self, SketchError> {
        match edge {
            EdgeKind::Circle { vertex } => Ok(Self {
                origin: self.origin,
                profile: fillet_corner(&self.profile, vertex, radius, tol)?,
            }),
            EdgeKind::Seam { segment } => Err(SketchError::SeamFillet(segment)),
        }
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        self.profile.revolved_volume()
    }

    /// Exact bounding box.
    pub fn bounding_box(&self) -> Aabb3 {
        let ext = self.profile.extent();
        Aabb3::new(
            Point3::new(
                self.origin.x - ext.r_max,
                self.origin.y - ext.r_max,
                self.origin.z + ext.z_min,
            ),
            Point3::new(
                self.origin.x + ext.r_max,
                self.origin.y + ext.r_max,
                self.origin.z + ext.z_max,
            ),
        )
    }

    /// Largest distance of any point from the axis.
    pub fn max_radius(&self) -> f64 {
        self.profile.extent().r_max
    }

    /// Horizontal distance between this body's axis and another's.
    pub fn axis_distance(&self, other: &RevolvedBody) -> f64 {
        horizontal_distance(&self.origin, &other.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{annulus, extrude_on_top};
    use approx::assert_relative_eq;

    fn flanged_tube() -> RevolvedBody {
        let tol = Tolerance::DEFAULT;
        let base = annulus(100.0, 40.0, 10.0, 0.0, &tol).unwrap();
        let body = extrude_on_top(&base, 60.0, 40.0, 50.0, &tol).unwrap();
        let top = extrude_on_top(&body, 100.0, 40.0, 10.0, &tol).unwrap();
        RevolvedBody::new(Point3::origin(), top)
    }

    #[test]
    fn test_edge_order() {
        let body = flanged_tube();
        let edges = body.edges(&Tolerance::DEFAULT);
        // 8 vertex circles, 4 non-horizontal segments.
        assert_eq!(edges.len(), 12);
        assert_eq!(edges[0].kind, EdgeKind::Circle { vertex: 0 });
        assert_eq!(edges[8].kind, EdgeKind::Seam { segment: 1 });
    }

    #[test]
    fn test_nearest_edge_top_and_bottom_rims() {
        let tol = Tolerance::DEFAULT;
        let body = flanged_tube();
        let top = body.nearest_edge(&Point3::new(0.0, 0.0, 70.0), &tol).unwrap();
        assert_eq!(top.kind, EdgeKind::Circle { vertex: 6 });
        assert_relative_eq!(top.radius, 50.0);
        let bottom = body.nearest_edge(&Point3::origin(), &tol).unwrap();
        assert_eq!(bottom.kind, EdgeKind::Circle { vertex: 1 });
    }

    #[test]
    fn test_translated_bounding_box() {
        let body = flanged_tube().translated(100.0, 0.0, 0.0);
        let bb = body.bounding_box();
        assert_relative_eq!(bb.min.x, 50.0);
        assert_relative_eq!(bb.max.x, 150.0);
        assert_relative_eq!(bb.max.z, 70.0);
    }

    #[test]
    fn test_seam_fillet_rejected() {
        let body = flanged_tube();
        assert!(matches!(
            body.fillet_edge(EdgeKind::Seam { segment: 1 }, 1.0, &Tolerance::DEFAULT),
            Err(SketchError::SeamFillet(1))
        ));
    }

    #[test]
    fn test_point_at_quarter_turn() {
        let body = flanged_tube().translated(5.0, -3.0, 0.0);
        let p = body.point_at(&Point2::new(50.0, 70.0), std::f64::consts::FRAC_PI_2);
        assert!((p - Point3::new(5.0, 47.0, 70.0)).norm() < 1e-9);
    }
}
