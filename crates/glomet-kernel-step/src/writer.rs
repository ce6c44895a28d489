//! STEP file writer: revolved bodies to AP214 B-rep.
//!
//! Every profile vertex sweeps a full circle edge and every non-planar
//! face gets one seam at angle zero, so a body with `n` segments writes
//! `n` circles, up to `n` seams and exactly `n` faces.

use std::path::Path;

use glomet_kernel_math::{Point3, Tolerance, Vec3};
use glomet_kernel_sketch::{ProfileSegment, RevolvedBody};
use tracing::debug;

use crate::entities::{
    quote, ref_list, write_advanced_face, write_axis2_placement_3d, write_cartesian_point,
    write_circle, write_closed_shell, write_conical_surface, write_cylindrical_surface,
    write_direction, write_edge_curve, write_edge_loop, write_face_bound, write_line,
    write_manifold_solid_brep, write_oriented_edge, write_plane, write_toroidal_surface,
    write_vector, write_vertex_point,
};
use crate::error::StepError;

/// Label prefix used when the caller does not name bodies.
pub const DEFAULT_LABEL_PREFIX: &str = "Open CASCADE STEP translator 7.7";

/// Options controlling STEP output.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Prefix of the generated product and solid names.
    pub label_prefix: String,
    /// Tolerance used to classify profile segments.
    pub tolerance: Tolerance,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            tolerance: Tolerance::DEFAULT,
        }
    }
}

/// Name given to body `index` (1-based) of a file holding `count - 1` bodies.
///
/// ```
/// use glomet_kernel_step::generated_label;
/// assert_eq!(generated_label("T 7.7", 2, 1), "T 7.7 2.1");
/// ```
pub fn generated_label(prefix: &str, count: usize, index: usize) -> String {
    format!("{prefix} {count}.{index}")
}

/// Write bodies to a STEP file at `path`.
pub fn write_step(
    bodies: &[RevolvedBody],
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<(), StepError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let text = write_step_to_string(bodies, &file_name, options)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Write bodies to an in-memory STEP file.
pub fn write_step_to_buffer(
    bodies: &[RevolvedBody],
    options: &WriteOptions,
) -> Result<Vec<u8>, StepError> {
    write_step_to_string(bodies, "", options).map(String::into_bytes)
}

/// Write bodies as STEP text; `file_name` goes into the `FILE_NAME` header.
pub fn write_step_to_string(
    bodies: &[RevolvedBody],
    file_name: &str,
    options: &WriteOptions,
) -> Result<String, StepError> {
    if bodies.is_empty() {
        return Err(StepError::NoSolids);
    }

    let mut writer = StepWriter::new(&options.tolerance);
    let contexts = writer.contexts();
    let count = bodies.len() + 1;
    for (i, body) in bodies.iter().enumerate() {
        let label = generated_label(&options.label_prefix, count, i + 1);
        writer.body(body, &label, &contexts);
    }
    debug!(
        bodies = bodies.len(),
        entities = writer.lines.len(),
        "wrote STEP data"
    );
    Ok(writer.finish(file_name))
}

/// Entity IDs shared by every product in the file.
struct Contexts {
    product: u64,
    definition: u64,
    geometry: u64,
    world: u64,
}

/// Accumulates numbered data-section entities.
struct StepWriter {
    lines: Vec<String>,
    next_id: u64,
    tol: Tolerance,
}

impl StepWriter {
    fn new(tol: &Tolerance) -> Self {
        Self {
            lines: Vec::new(),
            next_id: 1,
            tol: *tol,
        }
    }

    fn add(&mut self, entity: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(format!("#{id}={};", entity.into()));
        id
    }

    fn placement(&mut self, location: &Point3, axis: &Vec3, ref_direction: &Vec3) -> u64 {
        let loc = self.add(write_cartesian_point(location));
        let axis = self.add(write_direction(axis));
        let ref_dir = self.add(write_direction(ref_direction));
        self.add(write_axis2_placement_3d(loc, axis, ref_dir))
    }

    fn contexts(&mut self) -> Contexts {
        let app = self.add("APPLICATION_CONTEXT('automotive design')");
        self.add(format!(
            "APPLICATION_PROTOCOL_DEFINITION('international standard','automotive_design',2000,#{app})"
        ));
        let product = self.add(format!("PRODUCT_CONTEXT('',#{app},'mechanical')"));
        let definition = self.add(format!(
            "PRODUCT_DEFINITION_CONTEXT('part definition',#{app},'design')"
        ));
        let length = self.add("(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.))");
        let angle = self.add("(NAMED_UNIT(*)PLANE_ANGLE_UNIT()SI_UNIT($,.RADIAN.))");
        let solid_angle = self.add("(NAMED_UNIT(*)SI_UNIT($,.STERADIAN.)SOLID_ANGLE_UNIT())");
        let uncertainty = self.add(format!(
            "UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-07),#{length},'distance_accuracy_value','confusion accuracy')"
        ));
        let geometry = self.add(format!(
            "(GEOMETRIC_REPRESENTATION_CONTEXT(3)GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT((#{uncertainty}))\
             GLOBAL_UNIT_ASSIGNED_CONTEXT((#{length},#{angle},#{solid_angle}))\
             REPRESENTATION_CONTEXT('Context #1','3D Context with UNIT and UNCERTAINTY'))"
        ));
        let world = self.placement(&Point3::origin(), &Vec3::z(), &Vec3::x());
        Contexts {
            product,
            definition,
            geometry,
            world,
        }
    }

    fn body(&mut self, body: &RevolvedBody, label: &str, ctx: &Contexts) {
        let segments = body.profile.segments();
        let n = segments.len();
        let o = body.origin;

        let mut vertices = Vec::with_capacity(n);
        let mut circles = Vec::with_capacity(n);
        for seg in segments {
            let p = seg.start();
            let point = self.add(write_cartesian_point(&body.point_at(&p, 0.0)));
            let vertex = self.add(write_vertex_point(point));
            let placement =
                self.placement(&Point3::new(o.x, o.y, o.z + p.y), &Vec3::z(), &Vec3::x());
            let circle = self.add(write_circle(placement, p.x));
            vertices.push(vertex);
            circles.push(self.add(write_edge_curve(vertex, vertex, circle, true)));
        }

        let mut faces = Vec::with_capacity(n);
        for (i, seg) in segments.iter().enumerate() {
            let j = (i + 1) % n;
            let face = if seg.is_horizontal(&self.tol) {
                self.planar_face(body, seg, circles[i], circles[j])
            } else {
                let seam = self.seam(body, seg, vertices[i], vertices[j]);
                let (surface, same_sense) = self.revolved_surface(body, seg);
                let edges = [
                    self.add(write_oriented_edge(circles[i], true)),
                    self.add(write_oriented_edge(seam, true)),
                    self.add(write_oriented_edge(circles[j], false)),
                    self.add(write_oriented_edge(seam, false)),
                ];
                let edge_loop = self.add(write_edge_loop(&edges));
                let bound = self.add(write_face_bound(edge_loop, true, true));
                self.add(write_advanced_face(&[bound], surface, same_sense))
            };
            faces.push(face);
        }

        let shell = self.add(write_closed_shell(&faces));
        let brep = self.add(write_manifold_solid_brep(label, shell));
        let representation = self.add(format!(
            "ADVANCED_BREP_SHAPE_REPRESENTATION('',{},#{})",
            ref_list(&[ctx.world, brep]),
            ctx.geometry
        ));

        let name = quote(label);
        let product = self.add(format!("PRODUCT({name},{name},'',(#{}))", ctx.product));
        let formation = self.add(format!("PRODUCT_DEFINITION_FORMATION('','',#{product})"));
        let definition = self.add(format!(
            "PRODUCT_DEFINITION('design','',#{formation},#{})",
            ctx.definition
        ));
        let shape = self.add(format!("PRODUCT_DEFINITION_SHAPE('','',#{definition})"));
        self.add(format!(
            "SHAPE_DEFINITION_REPRESENTATION(#{shape},#{representation})"
        ));
        self.add(format!(
            "PRODUCT_RELATED_PRODUCT_CATEGORY('part',$,(#{product}))"
        ));
    }

    /// Annular plane swept by a horizontal segment, bounded by its two
    /// vertex circles.
    fn planar_face(
        &mut self,
        body: &RevolvedBody,
        seg: &ProfileSegment,
        start_circle: u64,
        end_circle: u64,
    ) -> u64 {
        let (s, e) = (seg.start(), seg.end());
        let o = body.origin;
        // A counter-clockwise profile runs inward along top faces.
        let top = e.x < s.x;
        let normal = if top { Vec3::z() } else { -Vec3::z() };
        let placement = self.placement(&Point3::new(o.x, o.y, o.z + s.y), &normal, &Vec3::x());
        let plane = self.add(write_plane(placement));

        let (outer, inner) = if s.x >= e.x {
            (start_circle, end_circle)
        } else {
            (end_circle, start_circle)
        };
        let outer_edge = self.add(write_oriented_edge(outer, top));
        let outer_loop = self.add(write_edge_loop(&[outer_edge]));
        let outer_bound = self.add(write_face_bound(outer_loop, true, true));
        let inner_edge = self.add(write_oriented_edge(inner, !top));
        let inner_loop = self.add(write_edge_loop(&[inner_edge]));
        let inner_bound = self.add(write_face_bound(inner_loop, true, false));
        self.add(write_advanced_face(&[outer_bound, inner_bound], plane, true))
    }

    /// Seam edge: the segment itself placed in the XZ half-plane.
    fn seam(&mut self, body: &RevolvedBody, seg: &ProfileSegment, start: u64, end: u64) -> u64 {
        let o = body.origin;
        let curve = match *seg {
            ProfileSegment::Line { start: s, end: e } => {
                let d = e - s;
                let point = self.add(write_cartesian_point(&body.point_at(&s, 0.0)));
                let dir = self.add(write_direction(&Vec3::new(d.x, 0.0, d.y).normalize()));
                let vector = self.add(write_vector(dir, d.norm()));
                self.add(write_line(point, vector))
            }
            ProfileSegment::Arc { center, ccw, .. } => {
                // Axis -Y turns +X towards +Z, i.e. counter-clockwise in (r, z).
                let axis = if ccw { -Vec3::y() } else { Vec3::y() };
                let placement = self.placement(
                    &Point3::new(o.x + center.x, o.y, o.z + center.y),
                    &axis,
                    &Vec3::x(),
                );
                self.add(write_circle(placement, seg.radius().unwrap_or_default()))
            }
        };
        self.add(write_edge_curve(start, end, curve, true))
    }

    /// Surface swept by a non-horizontal segment, and whether its natural
    /// normal points out of the solid.
    fn revolved_surface(&mut self, body: &RevolvedBody, seg: &ProfileSegment) -> (u64, bool) {
        let o = body.origin;
        match *seg {
            ProfileSegment::Line { start: s, end: e } => {
                let (dr, dz) = (e.x - s.x, e.y - s.y);
                if seg.is_vertical(&self.tol) {
                    let placement = self.placement(&o, &Vec3::z(), &Vec3::x());
                    (self.add(write_cylindrical_surface(placement, s.x)), dz > 0.0)
                } else {
                    let axis = if dr * dz > 0.0 { Vec3::z() } else { -Vec3::z() };
                    let placement =
                        self.placement(&Point3::new(o.x, o.y, o.z + s.y), &axis, &Vec3::x());
                    let semi_angle = dr.abs().atan2(dz.abs());
                    (
                        self.add(write_conical_surface(placement, s.x, semi_angle)),
                        dz > 0.0,
                    )
                }
            }
            ProfileSegment::Arc { center, ccw, .. } => {
                let placement = self.placement(
                    &Point3::new(o.x, o.y, o.z + center.y),
                    &Vec3::z(),
                    &Vec3::x(),
                );
                let minor = seg.radius().unwrap_or_default();
                (
                    self.add(write_toroidal_surface(placement, center.x, minor)),
                    ccw,
                )
            }
        }
    }

    fn finish(self, file_name: &str) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S");
        let mut out = String::new();
        out.push_str("ISO-10303-21;\nHEADER;\n");
        out.push_str("FILE_DESCRIPTION(('glomet model'),'2;1');\n");
        out.push_str(&format!(
            "FILE_NAME({},'{timestamp}',(''),(''),'glomet {}','glomet','');\n",
            quote(file_name),
            env!("CARGO_PKG_VERSION")
        ));
        out.push_str("FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));\n");
        out.push_str("ENDSEC;\nDATA;\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        out
    }
}
