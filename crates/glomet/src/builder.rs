//! Shape Builder: one flanged tube per table row.

use std::path::{Path, PathBuf};

use glomet_kernel::{Point3, Solid, Tolerance};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::BuildError;
use crate::table::Row;

/// Where the intermediate file of shape `identifier` lives.
pub fn intermediate_path(dir: &Path, identifier: &str) -> PathBuf {
    dir.join(format!("{identifier}.step"))
}

/// Build the tube described by `row`.
///
/// Three rings share the bore D4: the base flange (D2, H1) on the XY
/// plane, the shaft (D3, H2) on top of it and the top flange (D1, H3) on
/// top of that. The edge nearest the top centre is then rounded with
/// H3/2 and the edge nearest the origin with H1/2.
#[instrument(skip_all, fields(id = %row.identifier))]
pub fn build_shape(row: &Row, tol: &Tolerance) -> Result<Solid, BuildError> {
    let top = row.h1 + row.h2 + row.h3;
    Solid::annulus(row.d2, row.d4, row.h1, tol)
        .and_then(|s| s.extrude_on_top(row.d3, row.d4, row.h2))
        .and_then(|s| s.extrude_on_top(row.d1, row.d4, row.h3))
        .and_then(|s| s.fillet_nearest(&Point3::new(0.0, 0.0, top), row.h3 / 2.0))
        .and_then(|s| s.fillet_nearest(&Point3::origin(), row.h1 / 2.0))
        .map_err(|source| BuildError::Geometry {
            identifier: row.identifier.clone(),
            source,
        })
}

/// Build `row` and write it to `<dir>/<identifier>.step`.
pub fn export_shape(row: &Row, dir: &Path, config: &Config) -> Result<PathBuf, BuildError> {
    let solid = build_shape(row, &config.tolerance())?;
    let path = intermediate_path(dir, &row.identifier);
    solid
        .to_step(&path, &config.write_options())
        .map_err(|source| BuildError::Export {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "wrote shape");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(identifier: &str, x: f64) -> Row {
        Row {
            identifier: identifier.to_string(),
            h1: 10.0,
            h2: 50.0,
            h3: 10.0,
            d1: 100.0,
            d2: 100.0,
            d3: 60.0,
            d4: 40.0,
            x_position: x,
            extra: None,
        }
    }

    #[test]
    fn test_silhouette() {
        let row = Row {
            d1: 90.0,
            d2: 110.0,
            ..row("T", 0.0)
        };
        let solid = build_shape(&row, &Tolerance::DEFAULT).unwrap();
        let bbox = solid.bounding_box();
        assert_relative_eq!(bbox.max.z - bbox.min.z, 70.0, epsilon = 1e-9);
        // Away from the rounded rims the silhouette follows D2, D3 and D1.
        assert_relative_eq!(solid.outer_radius_at(5.0).unwrap(), 55.0, epsilon = 1e-9);
        assert_relative_eq!(solid.outer_radius_at(35.0).unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(solid.outer_radius_at(65.0).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rims_are_rounded() {
        let solid = build_shape(&row("T", 0.0), &Tolerance::DEFAULT).unwrap();
        // Rim fillets of radius 5 pull the top and bottom faces in to r = 45.
        assert_relative_eq!(solid.outer_radius_at(70.0).unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(solid.outer_radius_at(0.0).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_ring_is_an_error() {
        let row = Row {
            d3: 40.0,
            ..row("bad", 0.0)
        };
        match build_shape(&row, &Tolerance::DEFAULT) {
            Err(BuildError::Geometry { identifier, .. }) => assert_eq!(identifier, "bad"),
            other => panic!("expected geometry error, got {other:?}"),
        }
    }

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_shape(&row("P-1", 0.0), dir.path(), &Config::default()).unwrap();
        assert_eq!(path, dir.path().join("P-1.step"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("'Open CASCADE STEP translator 7.7 2.1'"));
    }
}
