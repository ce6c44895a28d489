#![warn(missing_docs)]

//! High-level solid facade for glomet.
//!
//! Provides the [`Solid`] type: a compound of bodies of revolution about
//! vertical axes, built by stacking annuli, rounded at chosen edges, moved,
//! combined and exchanged through STEP files.
//!
//! # Example
//!
//! ```
//! use glomet_kernel::{Point3, Solid, Tolerance};
//!
//! let tol = Tolerance::DEFAULT;
//! let tube = Solid::annulus(100.0, 40.0, 10.0, &tol)
//!     .and_then(|s| s.extrude_on_top(60.0, 40.0, 50.0))
//!     .and_then(|s| s.fillet_nearest(&Point3::new(0.0, 0.0, 60.0), 5.0))
//!     .unwrap();
//! assert_eq!(tube.body_count(), 1);
//! assert!((tube.bounding_box().max.z - 60.0).abs() < 1e-9);
//! ```

use std::path::Path;

pub use glomet_kernel_math;
pub use glomet_kernel_sketch;
pub use glomet_kernel_step;

pub use glomet_kernel_math::{Point3, Tolerance};
pub use glomet_kernel_sketch::Aabb3;
pub use glomet_kernel_step::WriteOptions;

use glomet_kernel_sketch::{annulus, extrude_on_top, union_profiles, RevolvedBody, SketchError};
use glomet_kernel_step::{read_step, write_step, StepError};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from solid operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Profile construction or editing failed.
    #[error(transparent)]
    Sketch(#[from] SketchError),

    /// STEP import or export failed.
    #[error(transparent)]
    Step(#[from] StepError),

    /// The operation needs exactly one body.
    #[error("operation needs a single body, solid has {0}")]
    NotSingleBody(usize),

    /// No edge lies near the query point.
    #[error("solid has no edges")]
    NoEdges,
}

/// How two bodies meet.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Contact {
    Apart,
    /// Overlapping on a shared axis.
    Coaxial,
    /// Overlapping on axes this far apart.
    Crossing(f64),
}

/// Outcome of uniting two coaxial profiles.
enum Fusion {
    Fused(RevolvedBody),
    /// The profiles do not meet.
    Separate,
    Failed(SketchError),
}

fn joined_label(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}+{b}")),
        (a, b) => a.or(b),
    }
}

/// One body of a solid, with the name it carries.
#[derive(Debug, Clone)]
struct Part {
    label: Option<String>,
    body: RevolvedBody,
}

/// A 3D solid: an ordered compound of bodies of revolution.
///
/// Operations return new solids; a solid is never modified in place.
#[derive(Debug, Clone)]
pub struct Solid {
    parts: Vec<Part>,
    tol: Tolerance,
}

impl Solid {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a single body from a revolved profile.
    pub fn from_body(body: RevolvedBody, tol: &Tolerance) -> Self {
        Self {
            parts: vec![Part { label: None, body }],
            tol: *tol,
        }
    }

    /// Ring between diameters `d_a` and `d_b` (either order), `height`
    /// tall, standing on the XY plane about the Z axis.
    pub fn annulus(d_a: f64, d_b: f64, height: f64, tol: &Tolerance) -> Result<Self, KernelError> {
        let profile = annulus(d_a, d_b, height, 0.0, tol)?;
        Ok(Self::from_body(
            RevolvedBody::new(Point3::origin(), profile),
            tol,
        ))
    }

    // =========================================================================
    // Features
    // =========================================================================

    /// Sketch a ring on the top face and extrude it upward by `height`.
    pub fn extrude_on_top(&self, d_a: f64, d_b: f64, height: f64) -> Result<Self, KernelError> {
        let part = self.single_part()?;
        let profile = extrude_on_top(&part.body.profile, d_a, d_b, height, &self.tol)?;
        Ok(self.with_parts(vec![Part {
            label: part.label.clone(),
            body: RevolvedBody::new(part.body.origin, profile),
        }]))
    }

    /// Round the edge nearest `point` with `radius`.
    ///
    /// Candidates are ranked as in
    /// [`nearest_edge`](glomet_kernel_sketch::nearest_edge) across every
    /// body; earlier bodies win exact ties.
    pub fn fillet_nearest(&self, point: &Point3, radius: f64) -> Result<Self, KernelError> {
        let mut owners = Vec::new();
        let mut edges = Vec::new();
        for (i, part) in self.parts.iter().enumerate() {
            for edge in part.body.edges(&self.tol) {
                owners.push(i);
                edges.push(edge);
            }
        }
        let k = glomet_kernel_sketch::nearest_edge(&edges, point, &self.tol)
            .ok_or(KernelError::NoEdges)?;
        let (owner, edge) = (owners[k], &edges[k]);
        debug!(
            body = owner,
            edge = ?edge.kind,
            radius,
            "filleting nearest edge"
        );

        let mut parts = self.parts.clone();
        parts[owner].body = parts[owner].body.fillet_edge(edge.kind, radius, &self.tol)?;
        Ok(self.with_parts(parts))
    }

    // =========================================================================
    // CSG boolean operations
    // =========================================================================

    /// Boolean union (self ∪ other).
    ///
    /// Bodies sharing an axis are fused into one by uniting their profiles;
    /// the fused body takes the place of the first body it absorbed and
    /// carries both names joined by `+`. Bodies on different axes cannot
    /// be fused into a body of revolution, so where they interpenetrate
    /// both are kept and a warning is logged.
    pub fn union(&self, other: &Solid) -> Solid {
        let mut parts = self.parts.clone();
        for incoming in &other.parts {
            self.absorb(&mut parts, incoming.clone());
        }
        debug!(bodies = parts.len(), "union");
        self.with_parts(parts)
    }

    fn absorb(&self, parts: &mut Vec<Part>, incoming: Part) {
        let mut fused = incoming;
        let mut slot: Option<usize> = None;
        // Fusing grows the body, so rescan until nothing more joins.
        loop {
            let found = parts.iter().enumerate().find_map(|(k, p)| {
                if self.contact(&p.body, &fused.body) != Contact::Coaxial {
                    return None;
                }
                match self.fuse_coaxial(&p.body, &fused.body) {
                    Fusion::Fused(body) => Some((k, body)),
                    _ => None,
                }
            });
            let Some((k, body)) = found else { break };
            let existing = parts.remove(k);
            fused = Part {
                label: joined_label(existing.label, fused.label),
                body,
            };
            slot = Some(slot.map_or(k, |s| s.min(k)));
        }

        for part in parts.iter() {
            match self.contact(&part.body, &fused.body) {
                Contact::Apart => {}
                Contact::Coaxial => {
                    if let Fusion::Failed(err) = self.fuse_coaxial(&part.body, &fused.body) {
                        warn!(
                            first = part.label.as_deref().unwrap_or_default(),
                            second = fused.label.as_deref().unwrap_or_default(),
                            error = %err,
                            "coaxial bodies overlap but cannot be fused, keeping both"
                        );
                    }
                }
                Contact::Crossing(distance) => warn!(
                    first = part.label.as_deref().unwrap_or_default(),
                    second = fused.label.as_deref().unwrap_or_default(),
                    axis_distance = distance,
                    "bodies on different axes interpenetrate, keeping both"
                ),
            }
        }

        match slot {
            Some(s) => parts.insert(s, fused),
            None => parts.push(fused),
        }
    }

    fn contact(&self, a: &RevolvedBody, b: &RevolvedBody) -> Contact {
        let tol = self.tol.linear;
        if !a.bounding_box().interpenetrates(&b.bounding_box(), tol) {
            return Contact::Apart;
        }
        let axis_distance = a.axis_distance(b);
        if axis_distance >= a.max_radius() + b.max_radius() - tol {
            Contact::Apart
        } else if axis_distance <= tol {
            Contact::Coaxial
        } else {
            Contact::Crossing(axis_distance)
        }
    }

    /// Unite the profiles of two coaxial bodies, placed at `a`'s origin.
    fn fuse_coaxial(&self, a: &RevolvedBody, b: &RevolvedBody) -> Fusion {
        let lifted = b.profile.shifted(b.origin.z - a.origin.z);
        match union_profiles(&a.profile, &lifted, &self.tol) {
            Ok(mut loops) if loops.len() == 1 => match loops.pop() {
                Some(profile) => Fusion::Fused(RevolvedBody::new(a.origin, profile)),
                None => Fusion::Separate,
            },
            Ok(_) => Fusion::Separate,
            Err(err) => Fusion::Failed(err),
        }
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Translate the solid by `(x, y, z)`.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Solid {
        let parts = self
            .parts
            .iter()
            .map(|p| Part {
                label: p.label.clone(),
                body: p.body.translated(x, y, z),
            })
            .collect();
        self.with_parts(parts)
    }

    /// Name every body `label`.
    pub fn with_label(&self, label: &str) -> Solid {
        let parts = self
            .parts
            .iter()
            .map(|p| Part {
                label: Some(label.to_string()),
                body: p.body.clone(),
            })
            .collect();
        self.with_parts(parts)
    }

    // =========================================================================
    // STEP interchange
    // =========================================================================

    /// Import every solid in a STEP file as one compound.
    pub fn from_step(path: impl AsRef<Path>, tol: &Tolerance) -> Result<Self, KernelError> {
        Ok(Self::from_imported(read_step(path, tol)?, tol))
    }

    fn from_imported(
        imported: Vec<glomet_kernel_step::ImportedBody>,
        tol: &Tolerance,
    ) -> Self {
        let parts = imported
            .into_iter()
            .map(|b| Part {
                label: (!b.label.is_empty()).then_some(b.label),
                body: b.body,
            })
            .collect();
        Self { parts, tol: *tol }
    }

    /// Export to a STEP file. Bodies get generated names.
    pub fn to_step(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<(), KernelError> {
        let bodies: Vec<RevolvedBody> = self.parts.iter().map(|p| p.body.clone()).collect();
        write_step(&bodies, path, options)?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of bodies in the compound.
    pub fn body_count(&self) -> usize {
        self.parts.len()
    }

    /// The bodies, in order.
    pub fn bodies(&self) -> impl Iterator<Item = &RevolvedBody> {
        self.parts.iter().map(|p| &p.body)
    }

    /// Name of each body, `None` for unnamed bodies built here.
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.parts.iter().map(|p| p.label.as_deref()).collect()
    }

    /// Tolerance used by this solid's operations.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// Total enclosed volume.
    pub fn volume(&self) -> f64 {
        self.parts.iter().map(|p| p.body.volume()).sum()
    }

    /// Axis-aligned bounding box of all bodies.
    pub fn bounding_box(&self) -> Aabb3 {
        let mut bbox = Aabb3::empty();
        for part in &self.parts {
            bbox.include_box(&part.body.bounding_box());
        }
        bbox
    }

    /// Largest radius of the outer silhouette at world height `z`, over
    /// all bodies reaching that height.
    pub fn outer_radius_at(&self, z: f64) -> Option<f64> {
        self.parts
            .iter()
            .filter_map(|p| p.body.profile.outer_radius_at(z - p.body.origin.z))
            .reduce(f64::max)
    }

    fn single_part(&self) -> Result<&Part, KernelError> {
        match self.parts.as_slice() {
            [part] => Ok(part),
            parts => Err(KernelError::NotSingleBody(parts.len())),
        }
    }

    fn with_parts(&self, parts: Vec<Part>) -> Self {
        Self {
            parts,
            tol: self.tol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    /// H1=10, H2=50, H3=10, D1=100, D2=100, D3=60, D4=40.
    fn flanged_tube() -> Solid {
        Solid::annulus(100.0, 40.0, 10.0, &tol())
            .and_then(|s| s.extrude_on_top(60.0, 40.0, 50.0))
            .and_then(|s| s.extrude_on_top(100.0, 40.0, 10.0))
            .unwrap()
    }

    fn ring_volume(d_out: f64, d_in: f64, h: f64) -> f64 {
        PI * (d_out * d_out - d_in * d_in) / 4.0 * h
    }

    #[test]
    fn test_annulus() {
        let ring = Solid::annulus(40.0, 100.0, 10.0, &tol()).unwrap();
        assert_eq!(ring.body_count(), 1);
        assert_relative_eq!(ring.volume(), ring_volume(100.0, 40.0, 10.0), max_relative = 1e-12);
    }

    #[test]
    fn test_degenerate_annulus() {
        assert!(matches!(
            Solid::annulus(40.0, 40.0, 10.0, &tol()),
            Err(KernelError::Sketch(_))
        ));
    }

    #[test]
    fn test_stacked_volume_and_silhouette() {
        let tube = flanged_tube();
        let expected = ring_volume(100.0, 40.0, 10.0) * 2.0 + ring_volume(60.0, 40.0, 50.0);
        assert_relative_eq!(tube.volume(), expected, max_relative = 1e-12);
        assert_relative_eq!(tube.outer_radius_at(5.0).unwrap(), 50.0);
        assert_relative_eq!(tube.outer_radius_at(35.0).unwrap(), 30.0);
        assert_relative_eq!(tube.outer_radius_at(65.0).unwrap(), 50.0);
        let bbox = tube.bounding_box();
        assert!((bbox.max.z - 70.0).abs() < 1e-12);
        assert!((bbox.min.z).abs() < 1e-12);
    }

    #[test]
    fn test_fillet_nearest_rounds_outer_rims() {
        let tube = flanged_tube();
        let rounded = tube
            .fillet_nearest(&Point3::new(0.0, 0.0, 70.0), 5.0)
            .and_then(|s| s.fillet_nearest(&Point3::origin(), 5.0))
            .unwrap();
        assert!(rounded.volume() < tube.volume());
        // Inner bore untouched, outer rims rounded.
        assert_relative_eq!(rounded.outer_radius_at(70.0).unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(rounded.outer_radius_at(0.0).unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(rounded.outer_radius_at(35.0).unwrap(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_needs_single_body() {
        let a = flanged_tube();
        let pair = a.union(&a.translate(200.0, 0.0, 0.0));
        assert!(matches!(
            pair.extrude_on_top(60.0, 40.0, 5.0),
            Err(KernelError::NotSingleBody(2))
        ));
    }

    #[test]
    fn test_translate() {
        let moved = flanged_tube().translate(100.0, 0.0, 0.0);
        let bbox = moved.bounding_box();
        assert!((bbox.min.x - 50.0).abs() < 1e-12);
        assert!((bbox.max.x - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_union_disjoint() {
        let a = flanged_tube();
        let b = a.translate(100.0, 0.0, 0.0);
        // Flanges touch at x = 50 without interpenetrating.
        let merged = a.union(&b);
        assert_eq!(merged.body_count(), 2);
        assert_relative_eq!(merged.volume(), 2.0 * a.volume(), max_relative = 1e-12);
    }

    #[test]
    fn test_union_fuses_coaxial_overlap() {
        let a = flanged_tube().with_label("C");
        let b = flanged_tube().with_label("D");
        let merged = a.union(&b);
        assert_eq!(merged.body_count(), 1);
        assert_eq!(merged.labels(), vec![Some("C+D")]);
        assert_relative_eq!(merged.volume(), a.volume(), max_relative = 1e-9);

        // Second tube stacked 65 mm up: the flanges share 5 mm.
        let stacked = a.union(&b.translate(0.0, 0.0, 65.0));
        assert_eq!(stacked.body_count(), 1);
        assert_relative_eq!(
            stacked.volume(),
            2.0 * a.volume() - ring_volume(100.0, 40.0, 5.0),
            max_relative = 1e-9
        );
        assert!((stacked.bounding_box().max.z - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_keeps_crossing_bodies() {
        let a = flanged_tube().with_label("A");
        let b = flanged_tube().translate(80.0, 0.0, 0.0).with_label("B");
        let merged = a.union(&b);
        assert_eq!(merged.body_count(), 2);
        assert_eq!(merged.labels(), vec![Some("A"), Some("B")]);
        assert_relative_eq!(merged.volume(), 2.0 * a.volume(), max_relative = 1e-12);
    }

    #[test]
    fn test_union_fused_body_keeps_first_slot() {
        let a = flanged_tube().with_label("A");
        let b = flanged_tube().translate(200.0, 0.0, 0.0).with_label("B");
        let c = flanged_tube().with_label("C");
        let merged = a.union(&b).union(&c);
        assert_eq!(merged.labels(), vec![Some("A+C"), Some("B")]);
    }

    #[test]
    fn test_union_coaxial_nested_stays_apart() {
        // A slim ring standing in the bore of a wide one.
        let wide = Solid::annulus(100.0, 40.0, 10.0, &tol()).unwrap();
        let slim = Solid::annulus(30.0, 10.0, 10.0, &tol()).unwrap();
        let merged = wide.union(&slim);
        assert_eq!(merged.body_count(), 2);
    }

    #[test]
    fn test_step_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tube.step");
        let tube = flanged_tube()
            .fillet_nearest(&Point3::new(0.0, 0.0, 70.0), 5.0)
            .unwrap()
            .translate(25.0, 0.0, 0.0);
        tube.to_step(&path, &WriteOptions::default()).unwrap();

        let back = Solid::from_step(&path, &tol()).unwrap();
        assert_eq!(back.body_count(), 1);
        assert_eq!(
            back.labels(),
            vec![Some("Open CASCADE STEP translator 7.7 2.1")]
        );
        assert_relative_eq!(back.volume(), tube.volume(), max_relative = 1e-9);
        assert!((back.bounding_box().min.x + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_step_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Solid::from_step(dir.path().join("absent.step"), &tol()),
            Err(KernelError::Step(StepError::Io(_)))
        ));
    }
}
