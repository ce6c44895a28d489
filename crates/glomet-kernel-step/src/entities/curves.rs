//! Edge curves: lines and circles.

use super::{parse_axis2_placement_3d, AxisPlacement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// A curve parsed from STEP.
#[derive(Debug, Clone)]
pub enum StepCurve {
    /// A straight line.
    Line,
    /// A circle in the plane of `placement`.
    Circle {
        /// Center and orientation.
        placement: AxisPlacement,
        /// Radius.
        radius: f64,
    },
}

/// Parse any supported curve entity.
///
/// STEP syntax: `LINE(name, point, vector)`, `CIRCLE(name, position, radius)`
pub fn parse_curve(file: &StepFile, id: u64) -> Result<StepCurve, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "LINE" => Ok(StepCurve::Line),
        "CIRCLE" => {
            let placement = parse_axis2_placement_3d(file, entity.entity_ref(1)?)?;
            let radius = entity.real(2)?;
            if radius <= 0.0 {
                return Err(StepError::InvalidGeometry(format!(
                    "circle #{id} has radius {radius}"
                )));
            }
            Ok(StepCurve::Circle { placement, radius })
        }
        other => Err(StepError::UnsupportedEntity(other.to_string())),
    }
}

/// Write a VECTOR.
pub fn write_vector(dir_id: u64, magnitude: f64) -> String {
    format!("VECTOR('',#{dir_id},{magnitude:.15E})")
}

/// Write a LINE.
pub fn write_line(point_id: u64, vector_id: u64) -> String {
    format!("LINE('',#{point_id},#{vector_id})")
}

/// Write a CIRCLE.
pub fn write_circle(placement_id: u64, radius: f64) -> String {
    format!("CIRCLE('',#{placement_id},{radius:.15E})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn test_parse_circle_and_line() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0.0, 0.0, 4.0));
#2 = DIRECTION('', (0.0, 0.0, 1.0));
#3 = DIRECTION('', (1.0, 0.0, 0.0));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = CIRCLE('', #4, 5.0);
#6 = VECTOR('', #3, 1.0);
#7 = LINE('', #1, #6);
#8 = ELLIPSE('', #4, 5.0, 2.0);
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        match parse_curve(&file, 5).unwrap() {
            StepCurve::Circle { placement, radius } => {
                assert!((radius - 5.0).abs() < 1e-12);
                assert!((placement.location.z - 4.0).abs() < 1e-12);
            }
            StepCurve::Line => panic!("expected circle"),
        }
        assert!(matches!(parse_curve(&file, 7).unwrap(), StepCurve::Line));
        assert!(matches!(
            parse_curve(&file, 8),
            Err(StepError::UnsupportedEntity(_))
        ));
    }

    #[test]
    fn test_write_circle() {
        assert_eq!(write_circle(4, 2.5), "CIRCLE('',#4,2.500000000000000E0)");
    }
}
