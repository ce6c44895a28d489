//! Face surfaces of a body of revolution: planes, cylinders, cones and tori.

use super::{parse_axis2_placement_3d, AxisPlacement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// A surface parsed from STEP.
#[derive(Debug, Clone)]
pub enum StepSurface {
    /// A planar surface.
    Plane {
        /// Plane position.
        placement: AxisPlacement,
    },
    /// A cylindrical surface.
    Cylinder {
        /// Axis position.
        placement: AxisPlacement,
        /// Radius.
        radius: f64,
    },
    /// A conical surface.
    Cone {
        /// Axis position; the location lies on the reference circle.
        placement: AxisPlacement,
        /// Radius of the reference circle.
        radius: f64,
        /// Half-angle at the apex, in radians.
        semi_angle: f64,
    },
    /// A toroidal surface.
    Torus {
        /// Axis position.
        placement: AxisPlacement,
        /// Distance from the axis to the tube center.
        major_radius: f64,
        /// Tube radius.
        minor_radius: f64,
    },
}

impl StepSurface {
    /// The placement the surface is defined in.
    pub fn placement(&self) -> &AxisPlacement {
        match self {
            StepSurface::Plane { placement }
            | StepSurface::Cylinder { placement, .. }
            | StepSurface::Cone { placement, .. }
            | StepSurface::Torus { placement, .. } => placement,
        }
    }
}

/// Parse any supported surface entity.
///
/// STEP syntax:
/// - `PLANE(name, position)`
/// - `CYLINDRICAL_SURFACE(name, position, radius)`
/// - `CONICAL_SURFACE(name, position, radius, semi_angle)`
/// - `TOROIDAL_SURFACE(name, position, major_radius, minor_radius)`
pub fn parse_surface(file: &StepFile, id: u64) -> Result<StepSurface, StepError> {
    let entity = file.require(id)?;
    let surface = match entity.type_name.as_str() {
        "PLANE" => StepSurface::Plane {
            placement: parse_axis2_placement_3d(file, entity.entity_ref(1)?)?,
        },
        "CYLINDRICAL_SURFACE" => StepSurface::Cylinder {
            placement: parse_axis2_placement_3d(file, entity.entity_ref(1)?)?,
            radius: entity.real(2)?,
        },
        "CONICAL_SURFACE" => StepSurface::Cone {
            placement: parse_axis2_placement_3d(file, entity.entity_ref(1)?)?,
            radius: entity.real(2)?,
            semi_angle: entity.real(3)?,
        },
        "TOROIDAL_SURFACE" => {
            let major_radius = entity.real(2)?;
            let minor_radius = entity.real(3)?;
            if minor_radius <= 0.0 {
                return Err(StepError::InvalidGeometry(format!(
                    "torus #{id} has minor radius {minor_radius}"
                )));
            }
            StepSurface::Torus {
                placement: parse_axis2_placement_3d(file, entity.entity_ref(1)?)?,
                major_radius,
                minor_radius,
            }
        }
        other => return Err(StepError::UnsupportedEntity(other.to_string())),
    };
    Ok(surface)
}

/// Write a PLANE.
pub fn write_plane(placement_id: u64) -> String {
    format!("PLANE('',#{placement_id})")
}

/// Write a CYLINDRICAL_SURFACE.
pub fn write_cylindrical_surface(placement_id: u64, radius: f64) -> String {
    format!("CYLINDRICAL_SURFACE('',#{placement_id},{radius:.15E})")
}

/// Write a CONICAL_SURFACE.
pub fn write_conical_surface(placement_id: u64, radius: f64, semi_angle: f64) -> String {
    format!("CONICAL_SURFACE('',#{placement_id},{radius:.15E},{semi_angle:.15E})")
}

/// Write a TOROIDAL_SURFACE.
pub fn write_toroidal_surface(placement_id: u64, major_radius: f64, minor_radius: f64) -> String {
    format!("TOROIDAL_SURFACE('',#{placement_id},{major_radius:.15E},{minor_radius:.15E})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse_step(data: &str) -> StepFile {
        let input = format!(
            "ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n\
             #1=CARTESIAN_POINT('',(0.,0.,2.));\n\
             #2=DIRECTION('',(0.,0.,1.));\n\
             #3=DIRECTION('',(1.,0.,0.));\n\
             #4=AXIS2_PLACEMENT_3D('',#1,#2,#3);\n\
             {data}\nENDSEC;\nEND-ISO-10303-21;\n"
        );
        Parser::parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_torus() {
        let file = parse_step("#5=TOROIDAL_SURFACE('',#4,45.,5.);");
        match parse_surface(&file, 5).unwrap() {
            StepSurface::Torus {
                placement,
                major_radius,
                minor_radius,
            } => {
                assert_eq!(major_radius, 45.0);
                assert_eq!(minor_radius, 5.0);
                assert_eq!(placement.location.z, 2.0);
            }
            other => panic!("expected torus, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_written_cone() {
        let text = write_conical_surface(4, 10.0, 0.25);
        let file = parse_step(&format!("#5={text};"));
        match parse_surface(&file, 5).unwrap() {
            StepSurface::Cone {
                radius, semi_angle, ..
            } => {
                assert!((radius - 10.0).abs() < 1e-12);
                assert!((semi_angle - 0.25).abs() < 1e-12);
            }
            other => panic!("expected cone, got {other:?}"),
        }
    }

    #[test]
    fn test_spherical_surface_unsupported() {
        let file = parse_step("#5=SPHERICAL_SURFACE('',#4,3.);");
        assert!(matches!(
            parse_surface(&file, 5),
            Err(StepError::UnsupportedEntity(name)) if name == "SPHERICAL_SURFACE"
        ));
    }
}
