//! Assembly Merger: import, place and union the per-row shapes.

use std::path::{Path, PathBuf};

use glomet_kernel::{KernelError, Solid, Tolerance};
use tracing::{info, instrument, warn};

use crate::builder::intermediate_path;
use crate::config::Config;
use crate::error::MergeError;
use crate::relabel::relabel_file;
use crate::table::Row;

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Identifiers of the rows in the merged model, in order.
    pub merged: Vec<String>,
    /// Rows left out, with the reason.
    pub skipped: Vec<(String, String)>,
    /// The merged file.
    pub output: PathBuf,
}

/// Merge the intermediate files of `rows` from `dir` into `output`.
///
/// Each row's file is imported, deleted, moved to `x_position` and united
/// with the rows before it. A row whose file cannot be imported is logged
/// and left out; the union itself never drops a row. The merged model is
/// written to `output` and its bodies are renamed after the rows they came
/// from.
#[instrument(skip_all, fields(rows = rows.len(), output = %output.display()))]
pub fn merge_shapes(
    rows: &[Row],
    dir: &Path,
    output: &Path,
    config: &Config,
) -> Result<MergeReport, MergeError> {
    let tol = config.tolerance();
    let mut merged: Option<Solid> = None;
    let mut report = MergeReport {
        merged: Vec::new(),
        skipped: Vec::new(),
        output: output.to_path_buf(),
    };

    for row in rows {
        let path = intermediate_path(dir, &row.identifier);
        match place_row(merged.as_ref(), row, &path, &tol) {
            Ok(solid) => {
                info!(file = %path.display(), x = row.x_position, "placed shape");
                report.merged.push(row.identifier.clone());
                merged = Some(solid);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to merge shape, skipping");
                report.skipped.push((row.identifier.clone(), err.to_string()));
            }
        }
    }

    let solid = merged.ok_or(MergeError::NothingMerged)?;
    solid
        .to_step(output, &config.write_options())
        .map_err(|source| MergeError::Export {
            path: output.to_path_buf(),
            source,
        })?;
    let labels: Vec<&str> = solid
        .labels()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    relabel_file(output, &config.label_prefix, &labels).map_err(|source| {
        MergeError::Relabel {
            path: output.to_path_buf(),
            source,
        }
    })?;
    info!(
        merged = report.merged.len(),
        bodies = solid.body_count(),
        skipped = report.skipped.len(),
        "wrote merged model"
    );
    Ok(report)
}

/// Import the intermediate file of `row` and unite it with `acc`.
///
/// The file is deleted as soon as it has been read. Its bodies are named
/// after the row before the union, so a body fused from several rows
/// carries all of their names.
fn place_row(
    acc: Option<&Solid>,
    row: &Row,
    path: &Path,
    tol: &Tolerance,
) -> Result<Solid, KernelError> {
    let part = Solid::from_step(path, tol)?;
    if let Err(err) = std::fs::remove_file(path) {
        warn!(file = %path.display(), error = %err, "could not delete intermediate file");
    }
    let part = part
        .translate(row.x_position, 0.0, 0.0)
        .with_label(&row.identifier);
    Ok(match acc {
        None => part,
        Some(acc) => acc.union(&part),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::export_shape;

    fn row(identifier: &str, x: f64) -> Row {
        Row {
            identifier: identifier.to_string(),
            h1: 4.0,
            h2: 20.0,
            h3: 4.0,
            d1: 30.0,
            d2: 30.0,
            d3: 20.0,
            d4: 10.0,
            x_position: x,
            extra: None,
        }
    }

    #[test]
    fn test_overlapping_rows_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        // B crosses A off-axis; C and D stand on the same axis.
        let rows = [row("A", 0.0), row("B", 10.0), row("C", 40.0), row("D", 40.0)];
        for r in &rows {
            export_shape(r, dir.path(), &config).unwrap();
        }
        let output = dir.path().join("out.step");
        let report = merge_shapes(&rows, dir.path(), &output, &config).unwrap();

        assert_eq!(report.merged, vec!["A", "B", "C", "D"]);
        assert!(report.skipped.is_empty());
        for r in &rows {
            assert!(!dir.path().join(format!("{}.step", r.identifier)).exists());
        }

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.matches("MANIFOLD_SOLID_BREP(").count(), 3);
        assert!(text.contains("MANIFOLD_SOLID_BREP('A'"));
        assert!(text.contains("MANIFOLD_SOLID_BREP('B'"));
        assert!(text.contains("MANIFOLD_SOLID_BREP('C+D'"));
        assert!(!text.contains("translator"));
    }

    #[test]
    fn test_nothing_merged() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.step");
        let result = merge_shapes(&[row("missing", 0.0)], dir.path(), &output, &Config::default());
        assert!(matches!(result, Err(MergeError::NothingMerged)));
        assert!(!output.exists());
    }
}
