#![warn(missing_docs)]

//! Half-section modelling for the glomet kernel.
//!
//! Every solid the kernel handles is a profile in the (r, z) half-plane
//! revolved a full turn about a vertical axis. Extruding an annulus,
//! stacking another on its top face and rounding a circular edge all
//! reduce to edits of that profile.
//!
//! # Example
//!
//! ```
//! use glomet_kernel_math::{Point3, Tolerance};
//! use glomet_kernel_sketch::{annulus, extrude_on_top, RevolvedBody};
//!
//! let tol = Tolerance::DEFAULT;
//! let flange = annulus(100.0, 40.0, 10.0, 0.0, &tol).unwrap();
//! let tube = extrude_on_top(&flange, 60.0, 40.0, 50.0, &tol).unwrap();
//! let body = RevolvedBody::new(Point3::origin(), tube);
//! assert!((body.profile.height() - 60.0).abs() < 1e-12);
//! ```

mod bbox;
mod boolean;
mod edges;
mod extrude;
mod fillet;
mod profile;
mod revolve;

pub use bbox::Aabb3;
pub use boolean::union_profiles;
pub use edges::{nearest_edge, BodyEdge, EdgeKind};
pub use extrude::{annulus, extrude_on_top};
pub use fillet::fillet_corner;
pub use profile::{Extent, ProfileSegment, SectionProfile};
pub use revolve::RevolvedBody;

use thiserror::Error;

/// Errors from profile construction and editing.
#[derive(Debug, Clone, Error)]
pub enum SketchError {
    /// The profile is not closed (gap between consecutive segments).
    #[error("profile is not closed: gap of {0:.6} mm")]
    NotClosed(f64),

    /// A segment is degenerate (zero length).
    #[error("degenerate segment at index {0}")]
    DegenerateSegment(usize),

    /// Profile touches or crosses the revolution axis.
    #[error("profile intersects the revolution axis")]
    AxisIntersection,

    /// Profile winds clockwise or encloses no area.
    #[error("profile is clockwise or empty in area")]
    Clockwise,

    /// Profile has no segments.
    #[error("profile has no segments")]
    EmptyProfile,

    /// A dimension is non-positive or not finite.
    #[error("invalid {what}: {value}")]
    InvalidDimension {
        /// Which dimension.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The profile has no upward-facing planar face to sketch on.
    #[error("profile has no top face")]
    NoTopFace,

    /// The ring to extrude does not rest on the top face.
    #[error("ring r={ring:?} does not overlap top face r={face:?}")]
    NoOverlap {
        /// Inner and outer radius of the top face.
        face: (f64, f64),
        /// Inner and outer radius of the ring.
        ring: (f64, f64),
    },

    /// Fillet radius is non-positive or not finite.
    #[error("invalid fillet radius: {0}")]
    InvalidRadius(f64),

    /// Vertex index outside the profile.
    #[error("vertex {0} out of range")]
    VertexOutOfRange(usize),

    /// A curved segment meets the corner to be filleted.
    #[error("cannot fillet vertex {0}: adjacent segment is not a line")]
    CurvedCorner(usize),

    /// The corner is straight, there is no edge to round.
    #[error("cannot fillet vertex {0}: segments are collinear")]
    StraightCorner(usize),

    /// Fillet does not fit on the adjacent segments.
    #[error("fillet radius {radius} exceeds the largest that fits ({max_radius:.6})")]
    FilletTooLarge {
        /// Requested radius.
        radius: f64,
        /// Largest radius the corner accommodates.
        max_radius: f64,
    },

    /// A profile union leaves a pocket that no single loop can bound.
    #[error("profile union encloses a void")]
    EnclosedVoid,

    /// Seam edges are not fillet targets.
    #[error("cannot fillet seam edge of segment {0}")]
    SeamFillet(usize),
}
