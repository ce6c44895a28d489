//! Union of half-section profiles.
//!
//! Two bodies on the same axis fuse by uniting their profiles in the
//! (r, z) plane. Both loops are split wherever they meet, every piece is
//! classified against the other loop, and the kept pieces are chained back
//! into closed loops.

use std::f64::consts::TAU;

use glomet_kernel_math::{cross2, Point2, Tolerance, Vec2};

use crate::extrude::simplify;
use crate::{ProfileSegment, SectionProfile, SketchError};

/// Position of a piece of one loop relative to the other loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Outside,
    Inside,
    /// On the other boundary, running the same way.
    OnSame,
    /// On the other boundary, running the opposite way (a shared face).
    OnOpposite,
}

/// Union of two profiles about the same axis.
///
/// Returns one profile when the regions overlap or touch along a face,
/// and the disjoint loops otherwise. A union enclosing a void is an error,
/// since a body has a single boundary loop.
pub fn union_profiles(
    a: &SectionProfile,
    b: &SectionProfile,
    tol: &Tolerance,
) -> Result<Vec<SectionProfile>, SketchError> {
    let (splits_a, splits_b) = split_points(a.segments(), b.segments(), tol);
    let pieces_a = split_all(a.segments(), splits_a, tol);
    let pieces_b = split_all(b.segments(), splits_b, tol);

    // Shared faces running the same way are kept once, from `a`.
    let mut kept: Vec<ProfileSegment> = pieces_a
        .into_iter()
        .filter(|p| matches!(classify(p, b.segments(), tol), Side::Outside | Side::OnSame))
        .collect();
    kept.extend(
        pieces_b
            .into_iter()
            .filter(|p| classify(p, a.segments(), tol) == Side::Outside),
    );

    chain_loops(kept, tol)?
        .into_iter()
        .map(|segments| {
            let area: f64 = segments.iter().map(ProfileSegment::area_term).sum();
            if area <= 0.0 {
                return Err(SketchError::EnclosedVoid);
            }
            SectionProfile::new(simplify(segments, tol), tol)
        })
        .collect()
}

/// Points where each segment of `a` (resp. `b`) must be split.
fn split_points(
    a: &[ProfileSegment],
    b: &[ProfileSegment],
    tol: &Tolerance,
) -> (Vec<Vec<Point2>>, Vec<Vec<Point2>>) {
    let mut sa = vec![Vec::new(); a.len()];
    let mut sb = vec![Vec::new(); b.len()];
    for (i, s) in a.iter().enumerate() {
        for (j, t) in b.iter().enumerate() {
            for p in crossings(s, t, tol) {
                sa[i].push(p);
                sb[j].push(p);
            }
        }
    }
    // Vertices resting on the other loop split it too. This covers
    // overlapping collinear lines and concentric arcs.
    for (i, s) in a.iter().enumerate() {
        sa[i].extend(b.iter().map(ProfileSegment::start).filter(|v| on_segment(s, v, tol)));
    }
    for (j, t) in b.iter().enumerate() {
        sb[j].extend(a.iter().map(ProfileSegment::start).filter(|v| on_segment(t, v, tol)));
    }
    (sa, sb)
}

/// Intersection points of two segments, snapped onto nearby endpoints.
fn crossings(s: &ProfileSegment, t: &ProfileSegment, tol: &Tolerance) -> Vec<Point2> {
    let candidates = match (s, t) {
        (ProfileSegment::Line { .. }, ProfileSegment::Line { .. }) => {
            line_line(s.start(), s.end(), t.start(), t.end())
                .into_iter()
                .collect()
        }
        (ProfileSegment::Line { .. }, ProfileSegment::Arc { center, .. }) => {
            line_circle(s.start(), s.end(), *center, t.radius().unwrap_or(0.0), tol)
        }
        (ProfileSegment::Arc { center, .. }, ProfileSegment::Line { .. }) => {
            line_circle(t.start(), t.end(), *center, s.radius().unwrap_or(0.0), tol)
        }
        (ProfileSegment::Arc { center: c1, .. }, ProfileSegment::Arc { center: c2, .. }) => {
            circle_circle(
                *c1,
                s.radius().unwrap_or(0.0),
                *c2,
                t.radius().unwrap_or(0.0),
                tol,
            )
        }
    };
    let ends = [s.start(), s.end(), t.start(), t.end()];
    candidates
        .into_iter()
        .filter(|p| on_segment(s, p, tol) && on_segment(t, p, tol))
        .map(|p| {
            ends.iter()
                .copied()
                .find(|q| (q - p).norm() < tol.linear)
                .unwrap_or(p)
        })
        .collect()
}

fn line_line(p0: Point2, p1: Point2, q0: Point2, q1: Point2) -> Option<Point2> {
    let d = p1 - p0;
    let e = q1 - q0;
    let denom = cross2(&d, &e);
    if denom.abs() <= f64::EPSILON * d.norm() * e.norm() {
        // Parallel: overlaps are found through the vertex rule.
        return None;
    }
    let t = cross2(&(q0 - p0), &e) / denom;
    Some(p0 + d * t)
}

fn line_circle(p0: Point2, p1: Point2, center: Point2, r: f64, tol: &Tolerance) -> Vec<Point2> {
    let d = p1 - p0;
    let f = p0 - center;
    let a = d.dot(&d);
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - r * r;
    let disc = b * b - 4.0 * a * c;
    // Allow for rounding on tangent contacts.
    if disc < -4.0 * a * tol.linear * tol.linear {
        return Vec::new();
    }
    let root = disc.max(0.0).sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);
    if root == 0.0 {
        vec![p0 + d * t0]
    } else {
        vec![p0 + d * t0, p0 + d * t1]
    }
}

fn circle_circle(c1: Point2, r1: f64, c2: Point2, r2: f64, tol: &Tolerance) -> Vec<Point2> {
    let delta = c2 - c1;
    let dist = delta.norm();
    if dist <= tol.linear {
        // Concentric: overlaps are found through the vertex rule.
        return Vec::new();
    }
    if dist > r1 + r2 + tol.linear || dist < (r1 - r2).abs() - tol.linear {
        return Vec::new();
    }
    let along = (dist * dist + r1 * r1 - r2 * r2) / (2.0 * dist);
    let h = (r1 * r1 - along * along).max(0.0).sqrt();
    let u = delta / dist;
    let base = c1 + u * along;
    let normal = Vec2::new(-u.y, u.x);
    if h <= tol.linear {
        vec![base]
    } else {
        vec![base + normal * h, base - normal * h]
    }
}

/// Fraction of the way along `seg` at which `p` lies. Unclamped for
/// lines; in `[0, 1)` turns for arcs.
fn param_of(seg: &ProfileSegment, p: &Point2) -> f64 {
    match seg {
        ProfileSegment::Line { start, end } => {
            let d = end - start;
            (p - start).dot(&d) / d.dot(&d)
        }
        ProfileSegment::Arc { center, .. } => {
            let (a0, sweep) = seg.arc_angles().unwrap_or((0.0, TAU));
            let v = p - center;
            let mut delta = v.y.atan2(v.x) - a0;
            if sweep > 0.0 {
                delta = delta.rem_euclid(TAU);
            } else {
                delta = -(-delta).rem_euclid(TAU);
            }
            delta / sweep
        }
    }
}

fn on_segment(seg: &ProfileSegment, p: &Point2, tol: &Tolerance) -> bool {
    if (p - seg.start()).norm() < tol.linear || (p - seg.end()).norm() < tol.linear {
        return true;
    }
    match seg {
        ProfileSegment::Line { start, end } => {
            let t = param_of(seg, p).clamp(0.0, 1.0);
            let foot = start + (end - start) * t;
            (p - foot).norm() < tol.linear
        }
        ProfileSegment::Arc { center, .. } => {
            let r = seg.radius().unwrap_or(0.0);
            ((p - center).norm() - r).abs() < tol.linear && param_of(seg, p) <= 1.0
        }
    }
}

/// Cut every segment at its split points, in order along the segment.
fn split_all(
    segments: &[ProfileSegment],
    splits: Vec<Vec<Point2>>,
    tol: &Tolerance,
) -> Vec<ProfileSegment> {
    let mut pieces = Vec::with_capacity(segments.len());
    for (seg, mut points) in segments.iter().zip(splits) {
        points.retain(|p| {
            (p - seg.start()).norm() >= tol.linear && (p - seg.end()).norm() >= tol.linear
        });
        points.sort_by(|p, q| param_of(seg, p).total_cmp(&param_of(seg, q)));
        points.dedup_by(|p, q| (*p - *q).norm() < tol.linear);

        let mut from = seg.start();
        for to in points.into_iter().chain(std::iter::once(seg.end())) {
            pieces.push(with_ends(seg, from, to));
            from = to;
        }
    }
    pieces
}

fn with_ends(seg: &ProfileSegment, start: Point2, end: Point2) -> ProfileSegment {
    match seg {
        ProfileSegment::Line { .. } => ProfileSegment::Line { start, end },
        ProfileSegment::Arc { center, ccw, .. } => ProfileSegment::Arc {
            start,
            end,
            center: *center,
            ccw: *ccw,
        },
    }
}

fn tangent_at(seg: &ProfileSegment, p: &Point2) -> Vec2 {
    match seg {
        ProfileSegment::Line { start, end } => end - start,
        ProfileSegment::Arc { center, ccw, .. } => {
            let v = p - center;
            if *ccw {
                Vec2::new(-v.y, v.x)
            } else {
                Vec2::new(v.y, -v.x)
            }
        }
    }
}

fn classify(piece: &ProfileSegment, other: &[ProfileSegment], tol: &Tolerance) -> Side {
    let m = piece.midpoint();
    if let Some(seg) = other.iter().find(|s| on_segment(s, &m, tol)) {
        return if tangent_at(piece, &m).dot(&tangent_at(seg, &m)) > 0.0 {
            Side::OnSame
        } else {
            Side::OnOpposite
        };
    }
    if contains(other, &m) {
        Side::Inside
    } else {
        Side::Outside
    }
}

/// Even-odd point containment for a loop of lines and arcs.
///
/// The chord polygon is tested by ray casting; each arc then toggles the
/// circular segment between its chord and itself.
fn contains(segments: &[ProfileSegment], p: &Point2) -> bool {
    let mut inside = false;
    for seg in segments {
        let (s, e) = (seg.start(), seg.end());
        if (s.y > p.y) != (e.y > p.y) {
            let x = s.x + (p.y - s.y) * (e.x - s.x) / (e.y - s.y);
            if p.x < x {
                inside = !inside;
            }
        }
        if let ProfileSegment::Arc { center, .. } = seg {
            let r = seg.radius().unwrap_or(0.0);
            let chord = e - s;
            let bulge = seg.midpoint() - s;
            if (p - center).norm() < r && cross2(&chord, &(p - s)) * cross2(&chord, &bulge) > 0.0 {
                inside = !inside;
            }
        }
    }
    inside
}

/// Join pieces end to start into closed loops.
fn chain_loops(
    mut pending: Vec<ProfileSegment>,
    tol: &Tolerance,
) -> Result<Vec<Vec<ProfileSegment>>, SketchError> {
    let mut loops = Vec::new();
    while !pending.is_empty() {
        let first = pending.remove(0);
        let head = first.start();
        let mut chain = vec![first];
        loop {
            let tail = chain[chain.len() - 1].end();
            if (tail - head).norm() < tol.linear {
                break;
            }
            let Some(k) = pending
                .iter()
                .position(|s| (s.start() - tail).norm() < tol.linear)
            else {
                let gap = pending
                    .iter()
                    .map(|s| (s.start() - tail).norm())
                    .fold((head - tail).norm(), f64::min);
                return Err(SketchError::NotClosed(gap));
            };
            chain.push(pending.remove(k));
        }
        loops.push(chain);
    }
    Ok(loops)
}
