//! STEP file reader: recovers revolved bodies from AP214 B-rep solids.
//!
//! A face of a body of revolution is bounded by the circles its profile
//! segment sweeps at either end. Those rings give the segment's endpoints
//! in (r, z); the face's surface type says whether it is a line or an arc.

use std::path::Path;

use glomet_kernel_math::{cross2, Point2, Point3, Tolerance};
use glomet_kernel_sketch::{ProfileSegment, RevolvedBody, SectionProfile};
use tracing::debug;

use crate::entities::{
    parse_advanced_face, parse_curve, parse_manifold_solid_brep, parse_surface, StepCurve,
    StepFace, StepSurface,
};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};

/// A solid read from a STEP file, with the name it carried.
#[derive(Debug, Clone)]
pub struct ImportedBody {
    /// Name of the MANIFOLD_SOLID_BREP.
    pub label: String,
    /// The recovered body.
    pub body: RevolvedBody,
}

/// Read STEP file from a path.
///
/// # Returns
///
/// The solids found in the file, in entity order.
pub fn read_step(path: impl AsRef<Path>, tol: &Tolerance) -> Result<Vec<ImportedBody>, StepError> {
    let data = std::fs::read(path)?;
    read_step_from_buffer(&data, tol)
}

/// Read STEP file from a byte buffer.
pub fn read_step_from_buffer(
    data: &[u8],
    tol: &Tolerance,
) -> Result<Vec<ImportedBody>, StepError> {
    let step_file = Parser::parse(data)?;
    let reader = StepReader {
        file: &step_file,
        tol: *tol,
    };
    reader.read_all_solids()
}

struct StepReader<'a> {
    file: &'a StepFile,
    tol: Tolerance,
}

impl StepReader<'_> {
    fn read_all_solids(&self) -> Result<Vec<ImportedBody>, StepError> {
        let solid_entities = self.file.entities_of_type("MANIFOLD_SOLID_BREP");
        if solid_entities.is_empty() {
            return Err(StepError::NoSolids);
        }
        solid_entities
            .iter()
            .map(|entity| self.read_solid(entity.id))
            .collect()
    }

    fn read_solid(&self, solid_id: u64) -> Result<ImportedBody, StepError> {
        let solid = parse_manifold_solid_brep(self.file, solid_id)?;

        let mut axis: Option<(f64, f64)> = None;
        let mut segments = Vec::with_capacity(solid.face_ids.len());
        for &face_id in &solid.face_ids {
            let face = parse_advanced_face(self.file, face_id)?;
            let rings = self.face_rings(&face, solid_id, &mut axis)?;
            let &[a, b] = rings.as_slice() else {
                return Err(StepError::InvalidTopology(format!(
                    "face #{face_id} is bounded by {} circles, expected 2",
                    rings.len()
                )));
            };
            let surface = parse_surface(self.file, face.surface_id)?;
            segments.push(self.face_segment(solid_id, face_id, &surface, a, b, axis)?);
        }

        let (ox, oy) = axis.ok_or_else(|| {
            StepError::InvalidTopology(format!("solid #{solid_id} has no circular edges"))
        })?;
        let profile = SectionProfile::new(self.chain(segments, solid_id)?, &self.tol)?;
        debug!(
            solid = solid_id,
            label = %solid.name,
            segments = profile.segments().len(),
            "read revolved body"
        );
        Ok(ImportedBody {
            label: solid.name,
            body: RevolvedBody::new(Point3::new(ox, oy, 0.0), profile),
        })
    }

    /// Distinct horizontal circles bounding a face, as (r, z) points.
    ///
    /// Every such circle must be centred on the common axis, which is
    /// fixed by the first one seen.
    fn face_rings(
        &self,
        face: &StepFace,
        solid_id: u64,
        axis: &mut Option<(f64, f64)>,
    ) -> Result<Vec<Point2>, StepError> {
        let mut rings: Vec<Point2> = Vec::with_capacity(2);
        for edge in face.bounds.iter().flat_map(|b| &b.edges) {
            let StepCurve::Circle { placement, radius } = parse_curve(self.file, edge.curve_id)?
            else {
                continue;
            };
            if !placement.is_vertical(&self.tol) {
                // Arc seam in the XZ plane.
                continue;
            }
            let center = (placement.location.x, placement.location.y);
            match *axis {
                None => *axis = Some(center),
                Some(c) => self.check_on_axis(solid_id, c, center)?,
            }
            let ring = Point2::new(radius, placement.location.z);
            if !rings.iter().any(|r| self.tol.points2_equal(r, &ring)) {
                rings.push(ring);
            }
        }
        Ok(rings)
    }

    fn check_on_axis(
        &self,
        solid_id: u64,
        axis: (f64, f64),
        point: (f64, f64),
    ) -> Result<(), StepError> {
        let offset = (point.0 - axis.0).hypot(point.1 - axis.1);
        if offset > self.tol.linear {
            return Err(StepError::not_axisymmetric(
                solid_id,
                format!("feature centred {offset} away from the axis"),
            ));
        }
        Ok(())
    }

    fn face_segment(
        &self,
        solid_id: u64,
        face_id: u64,
        surface: &StepSurface,
        a: Point2,
        b: Point2,
        axis: Option<(f64, f64)>,
    ) -> Result<ProfileSegment, StepError> {
        let placement = surface.placement();
        if !placement.is_vertical(&self.tol) {
            return Err(StepError::not_axisymmetric(
                solid_id,
                format!("surface of face #{face_id} is tilted"),
            ));
        }
        // A plane's location may lie anywhere on it.
        if let (Some(c), false) = (axis, matches!(surface, StepSurface::Plane { .. })) {
            self.check_on_axis(solid_id, c, (placement.location.x, placement.location.y))?;
        }

        match surface {
            StepSurface::Plane { .. } if (a.y - b.y).abs() > self.tol.linear => {
                Err(StepError::InvalidTopology(format!(
                    "planar face #{face_id} spans z {} to {}",
                    a.y, b.y
                )))
            }
            StepSurface::Plane { .. } | StepSurface::Cylinder { .. } | StepSurface::Cone { .. } => {
                Ok(ProfileSegment::Line { start: a, end: b })
            }
            StepSurface::Torus {
                placement,
                major_radius,
                ..
            } => {
                let center = Point2::new(*major_radius, placement.location.z);
                let ccw = cross2(&(a - center), &(b - center)) > 0.0;
                Ok(ProfileSegment::Arc {
                    start: a,
                    end: b,
                    center,
                    ccw,
                })
            }
        }
    }

    /// Join face segments end to end and orient the loop counter-clockwise.
    fn chain(
        &self,
        mut pending: Vec<ProfileSegment>,
        solid_id: u64,
    ) -> Result<Vec<ProfileSegment>, StepError> {
        if pending.is_empty() {
            return Err(StepError::InvalidTopology(format!(
                "solid #{solid_id} has no faces"
            )));
        }
        let mut chain = vec![pending.remove(0)];
        while !pending.is_empty() {
            let tail = chain[chain.len() - 1].end();
            let Some(k) = pending.iter().position(|s| {
                self.tol.points2_equal(&s.start(), &tail) || self.tol.points2_equal(&s.end(), &tail)
            }) else {
                return Err(StepError::InvalidTopology(format!(
                    "faces of solid #{solid_id} do not form a closed section"
                )));
            };
            let seg = pending.remove(k);
            if self.tol.points2_equal(&seg.start(), &tail) {
                chain.push(seg);
            } else {
                chain.push(seg.reversed());
            }
        }

        let area: f64 = chain.iter().map(ProfileSegment::area_term).sum();
        if area < 0.0 {
            chain = chain.iter().rev().map(ProfileSegment::reversed).collect();
        }
        Ok(chain)
    }
}
