//! Error types for the pipeline stages.

use std::path::PathBuf;

use glomet_kernel::KernelError;
use thiserror::Error;

/// Errors reading the input table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The table file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Io {
        /// Table path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A record is malformed or has a non-numeric parameter.
    #[error("line {line}: {source}")]
    Record {
        /// 1-based line of the record.
        line: u64,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },

    /// A row has no identifier.
    #[error("line {0}: empty identifier")]
    EmptyIdentifier(u64),

    /// Two rows share an identifier.
    #[error("line {line}: duplicate identifier {identifier:?}")]
    DuplicateIdentifier {
        /// 1-based line of the second occurrence.
        line: u64,
        /// The repeated identifier.
        identifier: String,
    },
}

/// Errors building or exporting one shape. These abort the run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The parameters do not describe a buildable shape.
    #[error("cannot build {identifier:?}: {source}")]
    Geometry {
        /// Row identifier.
        identifier: String,
        /// Kernel error.
        #[source]
        source: KernelError,
    },

    /// Writing the intermediate file failed.
    #[error("cannot export {}: {source}", path.display())]
    Export {
        /// Intermediate file path.
        path: PathBuf,
        /// Kernel error.
        #[source]
        source: KernelError,
    },
}

/// Errors from the merge stage as a whole. Per-row failures are not errors.
#[derive(Debug, Error)]
pub enum MergeError {
    /// No row could be imported.
    #[error("no shape could be merged")]
    NothingMerged,

    /// Writing the merged file failed.
    #[error("cannot export {}: {source}", path.display())]
    Export {
        /// Output path.
        path: PathBuf,
        /// Kernel error.
        #[source]
        source: KernelError,
    },

    /// Rewriting labels in the merged file failed.
    #[error("cannot relabel {}: {source}", path.display())]
    Relabel {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading `glomet.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but cannot be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from a full run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reading the table failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A shape could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The merge stage failed.
    #[error(transparent)]
    Merge(#[from] MergeError),
}
