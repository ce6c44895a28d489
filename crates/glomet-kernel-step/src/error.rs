//! Errors raised while reading or writing STEP exchange files.

use glomet_kernel_sketch::SketchError;
use thiserror::Error;

/// Failure of a STEP import or export.
#[derive(Error, Debug)]
pub enum StepError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad character or malformed token in the exchange text.
    #[error("STEP syntax error at {line}:{col}: {message}")]
    Lexer {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        col: usize,
        /// What was wrong.
        message: String,
    },

    /// Token stream does not form a valid exchange structure.
    #[error("malformed STEP data{}: {message}", entity_id.map(|id| format!(" in #{id}")).unwrap_or_default())]
    Parser {
        /// Entity being parsed, if known.
        entity_id: Option<u64>,
        /// What was wrong.
        message: String,
    },

    /// A `#n` reference with no matching instance.
    #[error("reference to undefined entity #{0}")]
    MissingEntity(u64),

    /// Entity kind the revolved-body reader cannot interpret.
    #[error("unsupported entity: {0}")]
    UnsupportedEntity(String),

    /// Degenerate direction, radius or placement.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Faces or edges that do not close into a section.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// The solid is not a body of revolution about a vertical axis.
    #[error("solid #{entity_id} is not axisymmetric: {message}")]
    NotAxisymmetric {
        /// MANIFOLD_SOLID_BREP instance.
        entity_id: u64,
        /// What broke the symmetry.
        message: String,
    },

    /// The recovered half-section is rejected by the profile checks.
    #[error("invalid section profile: {0}")]
    Profile(#[from] SketchError),

    /// A reference points at the wrong entity kind.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        /// Required entity keyword.
        expected: String,
        /// Keyword found instead.
        actual: String,
    },

    /// No MANIFOLD_SOLID_BREP in the file, or nothing to write.
    #[error("no solids in STEP data")]
    NoSolids,
}

impl StepError {
    /// Syntax error at a text position.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Structural error, optionally tied to an entity.
    pub fn parser(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parser {
            entity_id,
            message: message.into(),
        }
    }

    /// Wrong entity kind behind a reference.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Symmetry failure in solid `entity_id`.
    pub fn not_axisymmetric(entity_id: u64, message: impl Into<String>) -> Self {
        Self::NotAxisymmetric {
            entity_id,
            message: message.into(),
        }
    }
}
