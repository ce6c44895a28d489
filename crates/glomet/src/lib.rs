#![warn(missing_docs)]

//! Batch generation of flanged-tube solids.
//!
//! A run reads a table of tube parameters, builds and exports one STEP
//! file per row, then re-imports every file, lines the tubes up along X
//! and writes them as one merged STEP file whose solids carry the row
//! identifiers as names.
//!
//! ```no_run
//! use std::path::Path;
//! use glomet::{run, Config};
//!
//! let report = run(Path::new("input_data.csv"), Path::new("output.step"), &Config::default())?;
//! println!("merged {} shapes", report.merged.len());
//! # Ok::<(), glomet::RunError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod merger;
pub mod relabel;
pub mod table;

use std::path::Path;

use tracing::{info, instrument};

pub use builder::{build_shape, export_shape, intermediate_path};
pub use config::Config;
pub use error::{BuildError, ConfigError, MergeError, RunError, TableError};
pub use merger::{merge_shapes, MergeReport};
pub use relabel::{relabel, relabel_file};
pub use table::{read_rows, read_table, Row};

/// Build every row of the table at `input`, then merge them into `output`.
///
/// Build failures abort the run; merge failures of single rows do not.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn run(input: &Path, output: &Path, config: &Config) -> Result<MergeReport, RunError> {
    let rows = read_table(input)?;
    info!(rows = rows.len(), "read input table");

    for row in &rows {
        export_shape(row, &config.work_dir, config)?;
    }

    info!("merging shapes");
    Ok(merge_shapes(&rows, &config.work_dir, output, config)?)
}
