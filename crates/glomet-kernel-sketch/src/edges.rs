//! Edges of a revolved body and nearest-edge selection.
//!
//! Revolving a profile produces one full circle per profile vertex and one
//! seam per non-planar face. Edges are enumerated in a fixed order: all
//! circles in vertex order, then all seams in segment order.

use glomet_kernel_math::{Point3, Tolerance};

/// Which profile element an edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Full circle swept by profile vertex `vertex`.
    Circle {
        /// Vertex index in the profile.
        vertex: usize,
    },
    /// Seam line or arc lying on profile segment `segment` at angle zero.
    Seam {
        /// Segment index in the profile.
        segment: usize,
    },
}

/// An edge of a revolved body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyEdge {
    /// Originating profile element.
    pub kind: EdgeKind,
    /// Centroid of the edge curve. For a circle this is its center on the
    /// axis; for a seam it is the curve midpoint.
    pub center: Point3,
    /// Distance of the edge from the revolution axis.
    pub radius: f64,
}

/// Index of the edge whose centroid is closest to `target`.
///
/// Edges within `tol` of the best distance are tied; the tie goes to the
/// edge farthest from its axis, then to the earliest one.
pub fn nearest_edge(edges: &[BodyEdge], target: &Point3, tol: &Tolerance) -> Option<usize> {
    let distances: Vec<f64> = edges.iter().map(|e| (e.center - target).norm()).collect();
    let best = distances.iter().copied().fold(f64::INFINITY, f64::min);
    if !best.is_finite() {
        return None;
    }

    let mut pick: Option<usize> = None;
    for (i, edge) in edges.iter().enumerate() {
        if distances[i] > best + tol.linear {
            continue;
        }
        match pick {
            Some(p) if edges[p].radius >= edge.radius - tol.linear => {}
            _ => pick = Some(i),
        }
    }
    pick
}
