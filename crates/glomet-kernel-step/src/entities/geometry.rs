//! Points, directions and axis placements.

use glomet_kernel_math::{Dir3, Point3, Tolerance, Vec3};

use super::EntityArgs;
use crate::error::StepError;
use crate::parser::StepFile;

/// Parse a CARTESIAN_POINT entity.
///
/// STEP syntax: `CARTESIAN_POINT(name, (x, y, z))`
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "CARTESIAN_POINT" => match entity.real_list(1)?.as_slice() {
            [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
            coords => Err(StepError::parser(
                Some(id),
                format!("CARTESIAN_POINT needs 3 coordinates, got {}", coords.len()),
            )),
        },
        other => Err(StepError::type_mismatch("CARTESIAN_POINT", other)),
    }
}

/// Parse a DIRECTION entity.
///
/// STEP syntax: `DIRECTION(name, (x, y, z))`
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Dir3, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "DIRECTION" => match entity.real_list(1)?.as_slice() {
            [x, y, z, ..] => {
                let v = Vec3::new(*x, *y, *z);
                if v.norm() < 1e-15 {
                    return Err(StepError::InvalidGeometry(format!(
                        "zero-length direction #{id}"
                    )));
                }
                Ok(Dir3::new_normalize(v))
            }
            comps => Err(StepError::parser(
                Some(id),
                format!("DIRECTION needs 3 components, got {}", comps.len()),
            )),
        },
        other => Err(StepError::type_mismatch("DIRECTION", other)),
    }
}

/// Axis placement data (origin + optional directions).
#[derive(Debug, Clone)]
pub struct AxisPlacement {
    /// Location point.
    pub location: Point3,
    /// Z-axis direction (normal).
    pub axis: Option<Dir3>,
    /// X-axis direction (reference).
    pub ref_direction: Option<Dir3>,
}

impl AxisPlacement {
    /// Get the Z-axis direction, defaulting to +Z if not specified.
    pub fn z_axis(&self) -> Dir3 {
        self.axis.unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
    }

    /// Whether the placement's axis is parallel (or anti-parallel) to world Z.
    pub fn is_vertical(&self, tol: &Tolerance) -> bool {
        let z = self.z_axis();
        z.as_ref().x.hypot(z.as_ref().y) < tol.angular.max(1e-9)
    }
}

/// Parse an AXIS2_PLACEMENT_3D entity (point + two directions).
///
/// STEP syntax: `AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)`
pub fn parse_axis2_placement_3d(file: &StepFile, id: u64) -> Result<AxisPlacement, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "AXIS2_PLACEMENT_3D" => {
            let location = parse_cartesian_point(file, entity.entity_ref(1)?)?;
            let axis = if entity.is_null(2) {
                None
            } else {
                Some(parse_direction(file, entity.entity_ref(2)?)?)
            };
            let ref_direction = if entity.is_null(3) {
                None
            } else {
                Some(parse_direction(file, entity.entity_ref(3)?)?)
            };
            Ok(AxisPlacement {
                location,
                axis,
                ref_direction,
            })
        }
        other => Err(StepError::type_mismatch("AXIS2_PLACEMENT_3D", other)),
    }
}

/// Write a CARTESIAN_POINT.
pub fn write_cartesian_point(p: &Point3) -> String {
    format!(
        "CARTESIAN_POINT('',({:.15E},{:.15E},{:.15E}))",
        p.x, p.y, p.z
    )
}

/// Write a DIRECTION.
pub fn write_direction(v: &Vec3) -> String {
    format!("DIRECTION('',({:.15E},{:.15E},{:.15E}))", v.x, v.y, v.z)
}

/// Write an AXIS2_PLACEMENT_3D referencing already written entities.
pub fn write_axis2_placement_3d(loc_id: u64, axis_id: u64, ref_id: u64) -> String {
    format!("AXIS2_PLACEMENT_3D('',#{loc_id},#{axis_id},#{ref_id})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse_step(data: &str) -> StepFile {
        let input = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_cartesian_point() {
        let file = parse_step("#1 = CARTESIAN_POINT('origin', (1.0, 2.0, 3.0));");
        let p = parse_cartesian_point(&file, 1).unwrap();
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_point_type_mismatch() {
        let file = parse_step("#1 = DIRECTION('', (0.0, 0.0, 1.0));");
        assert!(matches!(
            parse_cartesian_point(&file, 1),
            Err(StepError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_direction_rejected() {
        let file = parse_step("#1 = DIRECTION('', (0.0, 0.0, 0.0));");
        assert!(matches!(
            parse_direction(&file, 1),
            Err(StepError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_parse_axis2_placement_3d() {
        let file = parse_step(
            "#1 = CARTESIAN_POINT('', (0.0, 0.0, 5.0));
#2 = DIRECTION('', (0.0, 0.0, -1.0));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, $);",
        );
        let placement = parse_axis2_placement_3d(&file, 4).unwrap();
        assert!((placement.location.z - 5.0).abs() < 1e-12);
        assert!((placement.z_axis().as_ref().z + 1.0).abs() < 1e-12);
        assert!(placement.ref_direction.is_none());
        assert!(placement.is_vertical(&Tolerance::DEFAULT));
    }

    #[test]
    fn test_written_point_parses_back() {
        let text = write_cartesian_point(&Point3::new(-1.5, 0.0, 1e-9));
        let file = parse_step(&format!("#1={text};"));
        let p = parse_cartesian_point(&file, 1).unwrap();
        assert!((p - Point3::new(-1.5, 0.0, 1e-9)).norm() < 1e-15);
    }
}
