//! Topology entities: vertices, edges, loops, faces, shells and solids.

use super::{logical, quote, ref_list, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// An EDGE_CURVE: two vertices joined along a curve.
#[derive(Debug, Clone)]
pub struct StepEdge {
    /// Start VERTEX_POINT ID.
    pub start_vertex: u64,
    /// End VERTEX_POINT ID.
    pub end_vertex: u64,
    /// Underlying curve ID.
    pub curve_id: u64,
    /// Whether the edge runs with the curve's parameterization.
    pub same_sense: bool,
}

/// A FACE_BOUND or FACE_OUTER_BOUND with its loop resolved to edges.
#[derive(Debug, Clone)]
pub struct StepFaceBound {
    /// The EDGE_CURVEs of the loop, in loop order.
    pub edges: Vec<StepEdge>,
    /// Whether this is the FACE_OUTER_BOUND.
    pub is_outer: bool,
}

/// An ADVANCED_FACE.
#[derive(Debug, Clone)]
pub struct StepFace {
    /// Face boundaries.
    pub bounds: Vec<StepFaceBound>,
    /// Underlying surface ID.
    pub surface_id: u64,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
}

/// A MANIFOLD_SOLID_BREP with its outer shell's face IDs.
#[derive(Debug, Clone)]
pub struct StepSolid {
    /// Entity ID of the solid.
    pub id: u64,
    /// Solid name (argument 0).
    pub name: String,
    /// ADVANCED_FACE IDs of the outer shell.
    pub face_ids: Vec<u64>,
}

/// Parse a VERTEX_POINT, returning its CARTESIAN_POINT ID.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<u64, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "VERTEX_POINT" => entity.entity_ref(1),
        other => Err(StepError::type_mismatch("VERTEX_POINT", other)),
    }
}

/// Parse an EDGE_CURVE.
///
/// STEP syntax: `EDGE_CURVE(name, start, end, curve, same_sense)`
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<StepEdge, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "EDGE_CURVE" => Ok(StepEdge {
            start_vertex: entity.entity_ref(1)?,
            end_vertex: entity.entity_ref(2)?,
            curve_id: entity.entity_ref(3)?,
            same_sense: entity.boolean(4)?,
        }),
        other => Err(StepError::type_mismatch("EDGE_CURVE", other)),
    }
}

/// Resolve an ORIENTED_EDGE to its EDGE_CURVE.
///
/// STEP syntax: `ORIENTED_EDGE(name, *, *, edge_element, orientation)`
pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<StepEdge, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "ORIENTED_EDGE" => parse_edge_curve(file, entity.entity_ref(3)?),
        other => Err(StepError::type_mismatch("ORIENTED_EDGE", other)),
    }
}

/// Parse an EDGE_LOOP into its edges.
pub fn parse_edge_loop(file: &StepFile, id: u64) -> Result<Vec<StepEdge>, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "EDGE_LOOP" => entity
            .entity_ref_list(1)?
            .into_iter()
            .map(|oe| parse_oriented_edge(file, oe))
            .collect(),
        other => Err(StepError::type_mismatch("EDGE_LOOP", other)),
    }
}

/// Parse a FACE_BOUND or FACE_OUTER_BOUND.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<StepFaceBound, StepError> {
    let entity = file.require(id)?;
    let is_outer = match entity.type_name.as_str() {
        "FACE_OUTER_BOUND" => true,
        "FACE_BOUND" => false,
        other => return Err(StepError::type_mismatch("FACE_BOUND", other)),
    };
    Ok(StepFaceBound {
        edges: parse_edge_loop(file, entity.entity_ref(1)?)?,
        is_outer,
    })
}

/// Parse an ADVANCED_FACE.
///
/// STEP syntax: `ADVANCED_FACE(name, (bounds), surface, same_sense)`
pub fn parse_advanced_face(file: &StepFile, id: u64) -> Result<StepFace, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "ADVANCED_FACE" => {
            let bounds = entity
                .entity_ref_list(1)?
                .into_iter()
                .map(|b| parse_face_bound(file, b))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(StepFace {
                bounds,
                surface_id: entity.entity_ref(2)?,
                same_sense: entity.boolean(3)?,
            })
        }
        other => Err(StepError::type_mismatch("ADVANCED_FACE", other)),
    }
}

/// Parse a MANIFOLD_SOLID_BREP and its CLOSED_SHELL.
pub fn parse_manifold_solid_brep(file: &StepFile, id: u64) -> Result<StepSolid, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "MANIFOLD_SOLID_BREP" {
        return Err(StepError::type_mismatch(
            "MANIFOLD_SOLID_BREP",
            entity.type_name.as_str(),
        ));
    }
    let shell = file.require(entity.entity_ref(1)?)?;
    match shell.type_name.as_str() {
        "CLOSED_SHELL" | "OPEN_SHELL" => Ok(StepSolid {
            id,
            name: entity.string(0)?.to_string(),
            face_ids: shell.entity_ref_list(1)?,
        }),
        other => Err(StepError::type_mismatch("CLOSED_SHELL", other)),
    }
}

/// Write a VERTEX_POINT.
pub fn write_vertex_point(point_id: u64) -> String {
    format!("VERTEX_POINT('',#{point_id})")
}

/// Write an EDGE_CURVE.
pub fn write_edge_curve(start_id: u64, end_id: u64, curve_id: u64, same_sense: bool) -> String {
    format!(
        "EDGE_CURVE('',#{start_id},#{end_id},#{curve_id},{})",
        logical(same_sense)
    )
}

/// Write an ORIENTED_EDGE.
pub fn write_oriented_edge(edge_id: u64, orientation: bool) -> String {
    format!("ORIENTED_EDGE('',*,*,#{edge_id},{})", logical(orientation))
}

/// Write an EDGE_LOOP.
pub fn write_edge_loop(edge_ids: &[u64]) -> String {
    format!("EDGE_LOOP('',{})", ref_list(edge_ids))
}

/// Write a FACE_BOUND, or a FACE_OUTER_BOUND when `is_outer`.
pub fn write_face_bound(loop_id: u64, orientation: bool, is_outer: bool) -> String {
    let entity_type = if is_outer {
        "FACE_OUTER_BOUND"
    } else {
        "FACE_BOUND"
    };
    format!("{entity_type}('',#{loop_id},{})", logical(orientation))
}

/// Write an ADVANCED_FACE.
pub fn write_advanced_face(bound_ids: &[u64], surface_id: u64, same_sense: bool) -> String {
    format!(
        "ADVANCED_FACE('',{},#{surface_id},{})",
        ref_list(bound_ids),
        logical(same_sense)
    )
}

/// Write a CLOSED_SHELL.
pub fn write_closed_shell(face_ids: &[u64]) -> String {
    format!("CLOSED_SHELL('',{})", ref_list(face_ids))
}

/// Write a named MANIFOLD_SOLID_BREP.
pub fn write_manifold_solid_brep(name: &str, shell_id: u64) -> String {
    format!("MANIFOLD_SOLID_BREP({},#{shell_id})", quote(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    const RING_FACE: &str = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (10.0, 0.0, 0.0));
#2 = VERTEX_POINT('', #1);
#3 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
#4 = DIRECTION('', (0.0, 0.0, 1.0));
#5 = DIRECTION('', (1.0, 0.0, 0.0));
#6 = AXIS2_PLACEMENT_3D('', #3, #4, #5);
#7 = CIRCLE('', #6, 10.0);
#8 = EDGE_CURVE('', #2, #2, #7, .T.);
#9 = ORIENTED_EDGE('', *, *, #8, .F.);
#10 = EDGE_LOOP('', (#9));
#11 = FACE_OUTER_BOUND('', #10, .T.);
#12 = PLANE('', #6);
#13 = ADVANCED_FACE('', (#11), #12, .F.);
#14 = CLOSED_SHELL('', (#13));
#15 = MANIFOLD_SOLID_BREP('it''s', #14);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_parse_face_chain() {
        let file = Parser::parse(RING_FACE.as_bytes()).unwrap();
        assert_eq!(parse_vertex_point(&file, 2).unwrap(), 1);

        let face = parse_advanced_face(&file, 13).unwrap();
        assert_eq!(face.surface_id, 12);
        assert!(!face.same_sense);
        assert_eq!(face.bounds.len(), 1);
        assert!(face.bounds[0].is_outer);
        let edge = &face.bounds[0].edges[0];
        assert_eq!(edge.curve_id, 7);
        assert_eq!(edge.start_vertex, edge.end_vertex);
    }

    #[test]
    fn test_parse_solid_name() {
        let file = Parser::parse(RING_FACE.as_bytes()).unwrap();
        let solid = parse_manifold_solid_brep(&file, 15).unwrap();
        assert_eq!(solid.name, "it's");
        assert_eq!(solid.face_ids, vec![13]);
    }

    #[test]
    fn test_wrong_entity_in_loop() {
        let file = Parser::parse(RING_FACE.as_bytes()).unwrap();
        assert!(matches!(
            parse_edge_loop(&file, 11),
            Err(StepError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_topology() {
        assert_eq!(write_oriented_edge(8, false), "ORIENTED_EDGE('',*,*,#8,.F.)");
        assert_eq!(write_face_bound(10, true, true), "FACE_OUTER_BOUND('',#10,.T.)");
        assert_eq!(
            write_manifold_solid_brep("A'1", 14),
            "MANIFOLD_SOLID_BREP('A''1',#14)"
        );
    }
}
