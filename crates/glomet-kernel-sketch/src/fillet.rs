//! Corner fillets on half-section profiles.
//!
//! Rounding the circular edge swept by a profile vertex is the same as
//! replacing that corner of the profile with a tangent arc. Both segments
//! meeting at the corner must be lines.

use glomet_kernel_math::Tolerance;

use crate::{ProfileSegment, SectionProfile, SketchError};

/// Replace the corner at `vertex` with a tangent arc of `radius`.
///
/// Convex corners get a counter-clockwise arc, concave corners a clockwise
/// one. A neighbouring line that is used up exactly by the fillet is
/// removed.
pub fn fillet_corner(
    profile: &SectionProfile,
    vertex: usize,
    radius: f64,
    tol: &Tolerance,
) -> Result<SectionProfile, SketchError> {
    let segments = profile.segments();
    let n = segments.len();
    if vertex >= n {
        return Err(SketchError::VertexOutOfRange(vertex));
    }
    if !radius.is_finite() || radius <= tol.linear {
        return Err(SketchError::InvalidRadius(radius));
    }

    let in_idx = (vertex + n - 1) % n;
    let incoming = &segments[in_idx];
    let outgoing = &segments[vertex];
    let (d_in, d_out) = match (incoming.line_direction(), outgoing.line_direction()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(SketchError::CurvedCorner(vertex)),
    };

    let turn = profile.corner_turn(vertex).unwrap_or(0.0);
    if turn.abs() <= tol.angular.max(1e-12) {
        return Err(SketchError::StraightCorner(vertex));
    }

    // Interior angle between the two legs, measured at the corner.
    let phi = (-d_in).dot(&d_out).clamp(-1.0, 1.0).acos();
    let half = 0.5 * phi;
    let setback = radius / half.tan();

    let len_in = incoming.length();
    let len_out = outgoing.length();
    let shortest = len_in.min(len_out);
    if setback > shortest + tol.linear {
        return Err(SketchError::FilletTooLarge {
            radius,
            max_radius: shortest * half.tan(),
        });
    }

    let corner = outgoing.start();
    let t1 = if setback >= len_in - tol.linear {
        incoming.start()
    } else {
        corner - d_in * setback
    };
    let t2 = if setback >= len_out - tol.linear {
        outgoing.end()
    } else {
        corner + d_out * setback
    };
    let bisector = (d_out - d_in).normalize();
    let center = corner + bisector * (radius / half.sin());

    let arc = ProfileSegment::Arc {
        start: t1,
        end: t2,
        center,
        ccw: turn > 0.0,
    };
    let trimmed_in = ProfileSegment::Line {
        start: incoming.start(),
        end: t1,
    };
    let trimmed_out = ProfileSegment::Line {
        start: t2,
        end: outgoing.end(),
    };

    let mut out = Vec::with_capacity(n + 1);
    for (i, seg) in segments.iter().enumerate() {
        if i == in_idx {
            if !trimmed_in.is_degenerate(tol) {
                out.push(trimmed_in.clone());
            }
            out.push(arc.clone());
        } else if i == vertex {
            if !trimmed_out.is_degenerate(tol) {
                out.push(trimmed_out.clone());
            }
        } else {
            out.push(seg.clone());
        }
    }

    SectionProfile::new(out, tol)
}
