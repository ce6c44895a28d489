//! Half-section profile types.
//!
//! A profile is a closed loop in the (r, z) half-plane, with `x` as the
//! radial distance and `y` as the height. Revolving it a full turn about
//! the z axis produces a solid.

use std::f64::consts::{FRAC_PI_2, TAU};

use glomet_kernel_math::{cross2, Point2, Tolerance, Vec2};

use crate::SketchError;

/// A segment of a half-section profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSegment {
    /// A line segment from start to end.
    Line {
        /// Start point in (r, z).
        start: Point2,
        /// End point in (r, z).
        end: Point2,
    },
    /// A circular arc from start to end around a center.
    Arc {
        /// Start point in (r, z).
        start: Point2,
        /// End point in (r, z).
        end: Point2,
        /// Center of the arc in (r, z).
        center: Point2,
        /// If true, arc goes counter-clockwise from start to end.
        ccw: bool,
    },
}

impl ProfileSegment {
    /// Get the start point of this segment.
    pub fn start(&self) -> Point2 {
        match self {
            ProfileSegment::Line { start, .. } => *start,
            ProfileSegment::Arc { start, .. } => *start,
        }
    }

    /// Get the end point of this segment.
    pub fn end(&self) -> Point2 {
        match self {
            ProfileSegment::Line { end, .. } => *end,
            ProfileSegment::Arc { end, .. } => *end,
        }
    }

    /// Whether this is a line segment.
    pub fn is_line(&self) -> bool {
        matches!(self, ProfileSegment::Line { .. })
    }

    /// Check if this segment is degenerate (zero length).
    pub fn is_degenerate(&self, tol: &Tolerance) -> bool {
        match self {
            ProfileSegment::Line { start, end } => (end - start).norm() < tol.linear,
            ProfileSegment::Arc {
                start, end, center, ..
            } => {
                let r1 = (start - center).norm();
                let r2 = (end - center).norm();
                r1 < tol.linear || r2 < tol.linear || (end - start).norm() < tol.linear
            }
        }
    }

    /// A line that lies at constant height. Revolves to a planar ring.
    pub fn is_horizontal(&self, tol: &Tolerance) -> bool {
        match self {
            ProfileSegment::Line { start, end } => tol.is_zero(end.y - start.y),
            ProfileSegment::Arc { .. } => false,
        }
    }

    /// A line at constant radius. Revolves to a cylinder.
    pub fn is_vertical(&self, tol: &Tolerance) -> bool {
        match self {
            ProfileSegment::Line { start, end } => tol.is_zero(end.x - start.x),
            ProfileSegment::Arc { .. } => false,
        }
    }

    /// Arc radius, or `None` for lines.
    pub fn radius(&self) -> Option<f64> {
        match self {
            ProfileSegment::Line { .. } => None,
            ProfileSegment::Arc { start, center, .. } => Some((start - center).norm()),
        }
    }

    /// Start angle and signed sweep of an arc, measured about its center.
    ///
    /// The sweep is positive for counter-clockwise arcs and lies in
    /// `(0, 2π]` in magnitude. Returns `None` for lines.
    pub fn arc_angles(&self) -> Option<(f64, f64)> {
        match self {
            ProfileSegment::Line { .. } => None,
            ProfileSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => {
                let d_start = start - center;
                let d_end = end - center;
                let a0 = d_start.y.atan2(d_start.x);
                let a1 = d_end.y.atan2(d_end.x);
                let mut sweep = a1 - a0;
                if *ccw {
                    if sweep <= 0.0 {
                        sweep += TAU;
                    }
                } else if sweep >= 0.0 {
                    sweep -= TAU;
                }
                Some((a0, sweep))
            }
        }
    }

    /// Get the length of this segment.
    pub fn length(&self) -> f64 {
        match self {
            ProfileSegment::Line { start, end } => (end - start).norm(),
            ProfileSegment::Arc { .. } => {
                let radius = self.radius().unwrap_or(0.0);
                let sweep = self.arc_angles().map(|(_, s)| s).unwrap_or(0.0);
                radius * sweep.abs()
            }
        }
    }

    /// Point halfway along the segment.
    pub fn midpoint(&self) -> Point2 {
        match self {
            ProfileSegment::Line { start, end } => Point2::from((start.coords + end.coords) * 0.5),
            ProfileSegment::Arc { center, .. } => {
                let radius = self.radius().unwrap_or(0.0);
                let (a0, sweep) = self.arc_angles().unwrap_or((0.0, 0.0));
                let a = a0 + sweep * 0.5;
                Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            }
        }
    }

    /// Unit tangent direction of a line segment.
    pub fn line_direction(&self) -> Option<Vec2> {
        match self {
            ProfileSegment::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                (n > 0.0).then(|| d / n)
            }
            ProfileSegment::Arc { .. } => None,
        }
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            ProfileSegment::Line { start, end } => ProfileSegment::Line {
                start: *end,
                end: *start,
            },
            ProfileSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => ProfileSegment::Arc {
                start: *end,
                end: *start,
                center: *center,
                ccw: !ccw,
            },
        }
    }

    /// The same segment moved `dz` along the axis.
    pub fn shifted(&self, dz: f64) -> Self {
        let up = Vec2::new(0.0, dz);
        match self {
            ProfileSegment::Line { start, end } => ProfileSegment::Line {
                start: start + up,
                end: end + up,
            },
            ProfileSegment::Arc {
                start,
                end,
                center,
                ccw,
            } => ProfileSegment::Arc {
                start: start + up,
                end: end + up,
                center: center + up,
                ccw: *ccw,
            },
        }
    }

    /// Contribution of this segment to the signed enclosed area
    /// (`½ ∮ x dy - y dx`).
    pub fn area_term(&self) -> f64 {
        let s = self.start();
        let e = self.end();
        let chord = 0.5 * (s.x * e.y - e.x * s.y);
        match self.arc_angles() {
            None => chord,
            Some((_, sweep)) => {
                let r = self.radius().unwrap_or(0.0);
                chord + 0.5 * r * r * (sweep - sweep.sin())
            }
        }
    }

    /// Contribution of this segment to `∮ r²/2 dz`. Multiplied by 2π this
    /// is the volume swept by the enclosed region (Pappus).
    pub fn volume_term(&self) -> f64 {
        match self {
            ProfileSegment::Line { start, end } => {
                let (r0, r1) = (start.x, end.x);
                (end.y - start.y) * 0.5 * (r0 * r0 + r0 * r1 + r1 * r1) / 3.0
            }
            ProfileSegment::Arc { center, .. } => {
                let r = self.radius().unwrap_or(0.0);
                let (a0, sweep) = self.arc_angles().unwrap_or((0.0, 0.0));
                let cr = center.x;
                let f = |a: f64| {
                    let s = a.sin();
                    0.5 * r
                        * (cr * cr * s
                            + 2.0 * cr * r * (0.5 * a + 0.25 * (2.0 * a).sin())
                            + r * r * (s - s * s * s / 3.0))
                };
                f(a0 + sweep) - f(a0)
            }
        }
    }

    /// Radial and axial extent of the segment, arc bulges included.
    pub fn extent(&self) -> Extent {
        let mut ext = Extent::empty();
        ext.include(&self.start());
        ext.include(&self.end());
        if let ProfileSegment::Arc { center, .. } = self {
            let r = self.radius().unwrap_or(0.0);
            let (a0, sweep) = self.arc_angles().unwrap_or((0.0, 0.0));
            let (lo, hi) = if sweep >= 0.0 {
                (a0, a0 + sweep)
            } else {
                (a0 + sweep, a0)
            };
            // Quadrant angles inside the swept range are extremes.
            let mut k = (lo / FRAC_PI_2).ceil();
            while k * FRAC_PI_2 <= hi {
                let a = k * FRAC_PI_2;
                ext.include(&Point2::new(center.x + r * a.cos(), center.y + r * a.sin()));
                k += 1.0;
            }
        }
        ext
    }
}

/// Axis-aligned extent of a profile in the (r, z) half-plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Smallest radius.
    pub r_min: f64,
    /// Largest radius.
    pub r_max: f64,
    /// Lowest height.
    pub z_min: f64,
    /// Highest height.
    pub z_max: f64,
}

impl Extent {
    fn empty() -> Self {
        Self {
            r_min: f64::INFINITY,
            r_max: f64::NEG_INFINITY,
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, p: &Point2) {
        self.r_min = self.r_min.min(p.x);
        self.r_max = self.r_max.max(p.x);
        self.z_min = self.z_min.min(p.y);
        self.z_max = self.z_max.max(p.y);
    }

    fn merge(&mut self, other: &Extent) {
        self.r_min = self.r_min.min(other.r_min);
        self.r_max = self.r_max.max(other.r_max);
        self.z_min = self.z_min.min(other.z_min);
        self.z_max = self.z_max.max(other.z_max);
    }
}

/// A closed half-section profile.
///
/// Segments are ordered counter-clockwise (interior on the left) and every
/// point stays strictly off the revolution axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProfile {
    segments: Vec<ProfileSegment>,
}

impl SectionProfile {
    /// Create a new profile.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The profile has no segments
    /// - Any segment is degenerate
    /// - Consecutive segments do not join, or the loop is not closed
    /// - Any point touches or crosses the revolution axis
    /// - The loop is clockwise
    pub fn new(segments: Vec<ProfileSegment>, tol: &Tolerance) -> Result<Self, SketchError> {
        if segments.is_empty() {
            return Err(SketchError::EmptyProfile);
        }

        for (i, seg) in segments.iter().enumerate() {
            if seg.is_degenerate(tol) {
                return Err(SketchError::DegenerateSegment(i));
            }
        }

        let n = segments.len();
        for i in 0..n {
            let this_end = segments[i].end();
            let next_start = segments[(i + 1) % n].start();
            let gap = (next_start - this_end).norm();
            if gap > tol.linear {
                return Err(SketchError::NotClosed(gap));
            }
        }

        let profile = Self { segments };
        if profile.extent().r_min <= tol.linear {
            return Err(SketchError::AxisIntersection);
        }
        if profile.signed_area() <= 0.0 {
            return Err(SketchError::Clockwise);
        }
        Ok(profile)
    }

    /// The segments forming the loop.
    pub fn segments(&self) -> &[ProfileSegment] {
        &self.segments
    }

    /// The profile moved `dz` along the axis.
    pub fn shifted(&self, dz: f64) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.shifted(dz)).collect(),
        }
    }

    /// Corner points; vertex `i` is the start of segment `i`.
    pub fn vertices(&self) -> Vec<Point2> {
        self.segments.iter().map(|s| s.start()).collect()
    }

    /// Signed enclosed area. Positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        self.segments.iter().map(|s| s.area_term()).sum()
    }

    /// Volume of the solid obtained by revolving this profile a full turn.
    pub fn revolved_volume(&self) -> f64 {
        TAU * self.segments.iter().map(|s| s.volume_term()).sum::<f64>()
    }

    /// Radial and axial extent of the loop.
    pub fn extent(&self) -> Extent {
        let mut ext = Extent::empty();
        for seg in &self.segments {
            ext.merge(&seg.extent());
        }
        ext
    }

    /// Total height of the profile.
    pub fn height(&self) -> f64 {
        let ext = self.extent();
        ext.z_max - ext.z_min
    }

    /// Outermost radius of the profile at height `z`.
    ///
    /// Samples every line crossing `z`, so the value is exact for
    /// straight walls. Returns `None` if the profile does not reach `z`.
    pub fn outer_radius_at(&self, z: f64) -> Option<f64> {
        let mut best: Option<f64> = None;
        for seg in &self.segments {
            let (s, e) = (seg.start(), seg.end());
            let (lo, hi) = if s.y <= e.y { (s, e) } else { (e, s) };
            if z < lo.y || z > hi.y {
                continue;
            }
            let r = if (hi.y - lo.y).abs() < f64::EPSILON {
                lo.x.max(hi.x)
            } else {
                match seg {
                    ProfileSegment::Line { .. } => lo.x + (hi.x - lo.x) * (z - lo.y) / (hi.y - lo.y),
                    ProfileSegment::Arc { center, .. } => {
                        let r = seg.radius().unwrap_or(0.0);
                        let dz = z - center.y;
                        let dr = (r * r - dz * dz).max(0.0).sqrt();
                        // The bulge side is the one farther from the chord.
                        let mid = seg.midpoint();
                        if mid.x >= center.x {
                            center.x + dr
                        } else {
                            center.x - dr
                        }
                    }
                }
            };
            best = Some(best.map_or(r, |b: f64| b.max(r)));
        }
        best
    }

    /// Index of the topmost upward-facing planar segment (the `>Z` face).
    ///
    /// For a counter-clockwise loop such a segment runs towards the axis.
    /// Ties resolve to the first segment in loop order.
    pub fn top_face(&self, tol: &Tolerance) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.is_horizontal(tol) || seg.end().x >= seg.start().x {
                continue;
            }
            let z = seg.start().y;
            match best {
                Some((_, bz)) if z <= bz + tol.linear => {}
                _ => best = Some((i, z)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Interior turn at vertex `i`: positive for convex corners,
    /// negative for concave ones, zero when the neighbours are collinear.
    pub fn corner_turn(&self, i: usize) -> Option<f64> {
        let n = self.segments.len();
        let incoming = self.segments.get((i + n - 1) % n)?.line_direction()?;
        let outgoing = self.segments.get(i)?.line_direction()?;
        Some(cross2(&incoming, &outgoing))
    }
}
