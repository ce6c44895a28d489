//! Annular extrusions in the half-section plane.
//!
//! Extruding an annulus `height` along +z sweeps a rectangle in (r, z).
//! Stacking a second annulus on the top face splices that rectangle into
//! the existing profile, so the result stays a single closed loop.

use glomet_kernel_math::{cross2, Point2, Tolerance};

use crate::{ProfileSegment, SectionProfile, SketchError};

/// Inner and outer radius of an annulus given two diameters in either order.
fn ring_radii(d_a: f64, d_b: f64, tol: &Tolerance) -> Result<(f64, f64), SketchError> {
    let inner = d_a.min(d_b) / 2.0;
    let outer = d_a.max(d_b) / 2.0;
    if !inner.is_finite() || !outer.is_finite() || inner <= tol.linear {
        return Err(SketchError::InvalidDimension {
            what: "inner diameter",
            value: 2.0 * inner,
        });
    }
    if outer - inner <= tol.linear {
        return Err(SketchError::InvalidDimension {
            what: "annulus wall",
            value: outer - inner,
        });
    }
    Ok((inner, outer))
}

fn check_height(height: f64, tol: &Tolerance) -> Result<(), SketchError> {
    if !height.is_finite() || height <= tol.linear {
        return Err(SketchError::InvalidDimension {
            what: "height",
            value: height,
        });
    }
    Ok(())
}

/// Profile of an annulus between diameters `d_a` and `d_b`, extruded from
/// `z0` to `z0 + height`.
///
/// The diameters may be given in either order.
pub fn annulus(
    d_a: f64,
    d_b: f64,
    height: f64,
    z0: f64,
    tol: &Tolerance,
) -> Result<SectionProfile, SketchError> {
    let (ri, ro) = ring_radii(d_a, d_b, tol)?;
    check_height(height, tol)?;
    let z1 = z0 + height;

    let p0 = Point2::new(ri, z0);
    let p1 = Point2::new(ro, z0);
    let p2 = Point2::new(ro, z1);
    let p3 = Point2::new(ri, z1);

    SectionProfile::new(
        vec![
            ProfileSegment::Line { start: p0, end: p1 },
            ProfileSegment::Line { start: p1, end: p2 },
            ProfileSegment::Line { start: p2, end: p3 },
            ProfileSegment::Line { start: p3, end: p0 },
        ],
        tol,
    )
}

/// Sketch an annulus on the top face of `profile` and extrude it upward.
///
/// The new ring must overlap the top face radially. Where the ring is
/// narrower than the face a step remains; where it is wider it overhangs.
pub fn extrude_on_top(
    profile: &SectionProfile,
    d_a: f64,
    d_b: f64,
    height: f64,
    tol: &Tolerance,
) -> Result<SectionProfile, SketchError> {
    let (a, b) = ring_radii(d_a, d_b, tol)?;
    check_height(height, tol)?;

    let top = profile.top_face(tol).ok_or(SketchError::NoTopFace)?;
    let face = &profile.segments()[top];
    let (face_outer, face_inner) = (face.start().x, face.end().x);
    let zt = face.start().y;

    if a.max(face_inner) >= b.min(face_outer) - tol.linear {
        return Err(SketchError::NoOverlap {
            face: (face_inner, face_outer),
            ring: (a, b),
        });
    }

    let zh = zt + height;
    let path = [
        Point2::new(face_outer, zt),
        Point2::new(b, zt),
        Point2::new(b, zh),
        Point2::new(a, zh),
        Point2::new(a, zt),
        Point2::new(face_inner, zt),
    ];

    let mut segments = Vec::with_capacity(profile.segments().len() + 5);
    segments.extend_from_slice(&profile.segments()[..top]);
    segments.extend(path.windows(2).map(|w| ProfileSegment::Line {
        start: w[0],
        end: w[1],
    }));
    segments.extend_from_slice(&profile.segments()[top + 1..]);

    SectionProfile::new(simplify(segments, tol), tol)
}

/// Drop zero-length segments and merge consecutive collinear lines and
/// co-circular arcs, including across the loop seam.
pub(crate) fn simplify(segments: Vec<ProfileSegment>, tol: &Tolerance) -> Vec<ProfileSegment> {
    let mut out: Vec<ProfileSegment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.is_degenerate(tol) {
            continue;
        }
        if let Some(last) = out.last_mut() {
            if let Some(merged) = merge_pair(last, &seg, tol) {
                *last = merged;
                continue;
            }
        }
        out.push(seg);
    }

    while out.len() > 1 {
        let n = out.len();
        match merge_pair(&out[n - 1], &out[0], tol) {
            Some(merged) => {
                out.pop();
                out[0] = merged;
            }
            None => break,
        }
    }
    out
}

fn merge_pair(
    first: &ProfileSegment,
    second: &ProfileSegment,
    tol: &Tolerance,
) -> Option<ProfileSegment> {
    if let (
        ProfileSegment::Arc {
            center: c1,
            ccw: ccw1,
            ..
        },
        ProfileSegment::Arc {
            center: c2,
            ccw: ccw2,
            ..
        },
    ) = (first, second)
    {
        let same_circle = ccw1 == ccw2
            && tol.points2_equal(c1, c2)
            && tol.is_zero(first.radius()? - second.radius()?)
            && !tol.points2_equal(&first.start(), &second.end());
        return same_circle.then(|| ProfileSegment::Arc {
            start: first.start(),
            end: second.end(),
            center: *c1,
            ccw: *ccw1,
        });
    }
    let d1 = first.line_direction()?;
    let d2 = second.line_direction()?;
    if cross2(&d1, &d2).abs() > tol.angular.max(1e-12) || d1.dot(&d2) <= 0.0 {
        return None;
    }
    Some(ProfileSegment::Line {
        start: first.start(),
        end: second.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    #[test]
    fn test_annulus_accepts_either_order() {
        let a = annulus(40.0, 100.0, 10.0, 0.0, &tol()).unwrap();
        let b = annulus(100.0, 40.0, 10.0, 0.0, &tol()).unwrap();
        assert_eq!(a, b);
        let ext = a.extent();
        assert_relative_eq!(ext.r_min, 20.0);
        assert_relative_eq!(ext.r_max, 50.0);
    }

    #[test]
    fn test_annulus_rejects_degenerate() {
        assert!(matches!(
            annulus(40.0, 40.0, 10.0, 0.0, &tol()),
            Err(SketchError::InvalidDimension { what: "annulus wall", .. })
        ));
        assert!(matches!(
            annulus(0.0, 40.0, 10.0, 0.0, &tol()),
            Err(SketchError::InvalidDimension { what: "inner diameter", .. })
        ));
        assert!(matches!(
            annulus(20.0, 40.0, 0.0, 0.0, &tol()),
            Err(SketchError::InvalidDimension { what: "height", .. })
        ));
        assert!(annulus(20.0, 40.0, f64::NAN, 0.0, &tol()).is_err());
    }

    #[test]
    fn test_stack_shares_bore() {
        let base = annulus(100.0, 40.0, 10.0, 0.0, &tol()).unwrap();
        let body = extrude_on_top(&base, 60.0, 40.0, 50.0, &tol()).unwrap();
        let top = extrude_on_top(&body, 100.0, 40.0, 10.0, &tol()).unwrap();

        let expected = vec![
            Point2::new(20.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(50.0, 10.0),
            Point2::new(30.0, 10.0),
            Point2::new(30.0, 60.0),
            Point2::new(50.0, 60.0),
            Point2::new(50.0, 70.0),
            Point2::new(20.0, 70.0),
        ];
        let vertices = top.vertices();
        assert_eq!(vertices.len(), expected.len());
        for (v, e) in vertices.iter().zip(&expected) {
            assert!((v - e).norm() < 1e-12, "{v:?} != {e:?}");
        }

        let volume = PI * ((2500.0 - 400.0) * 10.0 + (900.0 - 400.0) * 50.0 + (2500.0 - 400.0) * 10.0);
        assert_relative_eq!(top.revolved_volume(), volume, max_relative = 1e-12);
        assert_relative_eq!(top.height(), 70.0);
    }

    #[test]
    fn test_stack_wider_ring_overhangs() {
        let base = annulus(40.0, 20.0, 5.0, 0.0, &tol()).unwrap();
        let top = extrude_on_top(&base, 60.0, 20.0, 5.0, &tol()).unwrap();
        assert_relative_eq!(top.outer_radius_at(2.5).unwrap(), 20.0);
        assert_relative_eq!(top.outer_radius_at(7.5).unwrap(), 30.0);
        assert_eq!(top.segments().len(), 6);
    }

    #[test]
    fn test_stack_without_overlap_fails() {
        let base = annulus(40.0, 20.0, 5.0, 0.0, &tol()).unwrap();
        assert!(matches!(
            extrude_on_top(&base, 80.0, 60.0, 5.0, &tol()),
            Err(SketchError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_simplify_merges_across_seam() {
        let segs = vec![
            ProfileSegment::Line {
                start: Point2::new(1.0, 1.0),
                end: Point2::new(1.0, 0.0),
            },
            ProfileSegment::Line {
                start: Point2::new(1.0, 0.0),
                end: Point2::new(2.0, 0.0),
            },
            ProfileSegment::Line {
                start: Point2::new(2.0, 0.0),
                end: Point2::new(2.0, 2.0),
            },
            ProfileSegment::Line {
                start: Point2::new(2.0, 2.0),
                end: Point2::new(1.0, 2.0),
            },
            ProfileSegment::Line {
                start: Point2::new(1.0, 2.0),
                end: Point2::new(1.0, 1.0),
            },
        ];
        let out = simplify(segs, &tol());
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].start(), Point2::new(1.0, 2.0));
        assert_eq!(out[0].end(), Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_simplify_rejoins_split_arc() {
        let center = Point2::new(3.0, 8.0);
        let mid = Point2::new(3.0 + 2.0 * 0.5f64.sqrt(), 8.0 + 2.0 * 0.5f64.sqrt());
        let segs = vec![
            ProfileSegment::Line {
                start: Point2::new(3.0, 10.0),
                end: Point2::new(2.0, 10.0),
            },
            ProfileSegment::Line {
                start: Point2::new(2.0, 10.0),
                end: Point2::new(2.0, 6.0),
            },
            ProfileSegment::Line {
                start: Point2::new(2.0, 6.0),
                end: Point2::new(5.0, 6.0),
            },
            ProfileSegment::Line {
                start: Point2::new(5.0, 6.0),
                end: Point2::new(5.0, 8.0),
            },
            ProfileSegment::Arc {
                start: Point2::new(5.0, 8.0),
                end: mid,
                center,
                ccw: true,
            },
            ProfileSegment::Arc {
                start: mid,
                end: Point2::new(3.0, 10.0),
                center,
                ccw: true,
            },
        ];
        let out = simplify(segs, &tol());
        assert_eq!(out.len(), 5);
        let arc = &out[4];
        assert_eq!(arc.start(), Point2::new(5.0, 8.0));
        assert_eq!(arc.end(), Point2::new(3.0, 10.0));
        assert_relative_eq!(arc.length(), PI, max_relative = 1e-12);
    }
}
