//! Typed views over raw STEP entities.
//!
//! Each submodule parses the AP214 entities the kernel understands and
//! formats them back. Writers return the entity text without the `#n=`
//! prefix and the trailing semicolon.

pub mod curves;
pub mod geometry;
pub mod surfaces;
pub mod topology;

pub use curves::*;
pub use geometry::*;
pub use surfaces::*;
pub use topology::*;

use crate::error::StepError;
use crate::parser::{StepEntity, StepValue};

/// Quote a string for Part 21, doubling embedded apostrophes.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Format an entity reference list `(#1,#2,...)`.
pub fn ref_list(ids: &[u64]) -> String {
    let refs: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
    format!("({})", refs.join(","))
}

/// Format a Part 21 logical.
pub fn logical(value: bool) -> &'static str {
    if value {
        ".T."
    } else {
        ".F."
    }
}

/// Helper trait for extracting argument values from STEP entities.
pub trait EntityArgs {
    /// Get a required real argument at index.
    fn real(&self, idx: usize) -> Result<f64, StepError>;

    /// Get a required string argument at index.
    fn string(&self, idx: usize) -> Result<&str, StepError>;

    /// Get a required enum argument at index.
    fn enumeration(&self, idx: usize) -> Result<&str, StepError>;

    /// Get a required `.T.`/`.F.` argument at index.
    fn boolean(&self, idx: usize) -> Result<bool, StepError>;

    /// Get a required entity reference at index.
    fn entity_ref(&self, idx: usize) -> Result<u64, StepError>;

    /// Get a list of reals at index.
    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError>;

    /// Get a list of entity references at index.
    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError>;

    /// Check if argument at index is null or missing.
    fn is_null(&self, idx: usize) -> bool;
}

impl StepEntity {
    fn arg_error(&self, what: &str, idx: usize) -> StepError {
        StepError::parser(
            Some(self.id),
            format!("expected {what} at arg {idx} in {}", self.type_name),
        )
    }

    fn typed_arg<'a, T>(
        &'a self,
        idx: usize,
        what: &str,
        get: impl FnOnce(&'a StepValue) -> Option<T>,
    ) -> Result<T, StepError> {
        self.args
            .get(idx)
            .and_then(get)
            .ok_or_else(|| self.arg_error(what, idx))
    }

    fn list_of<T>(
        &self,
        idx: usize,
        what: &str,
        get: impl Fn(&StepValue) -> Option<T>,
    ) -> Result<Vec<T>, StepError> {
        let list = self.typed_arg(idx, "list", StepValue::as_list)?;
        list.iter()
            .enumerate()
            .map(|(i, v)| {
                get(v).ok_or_else(|| {
                    StepError::parser(
                        Some(self.id),
                        format!("expected {what} at list[{i}] in arg {idx}"),
                    )
                })
            })
            .collect()
    }
}

impl EntityArgs for StepEntity {
    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.typed_arg(idx, "real", StepValue::as_real)
    }

    fn string(&self, idx: usize) -> Result<&str, StepError> {
        self.typed_arg(idx, "string", StepValue::as_string)
    }

    fn enumeration(&self, idx: usize) -> Result<&str, StepError> {
        self.typed_arg(idx, "enum", StepValue::as_enum)
    }

    fn boolean(&self, idx: usize) -> Result<bool, StepError> {
        match self.enumeration(idx)? {
            "T" | "TRUE" => Ok(true),
            "F" | "FALSE" => Ok(false),
            _ => Err(self.arg_error("logical", idx)),
        }
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, StepError> {
        self.typed_arg(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        self.list_of(idx, "real", StepValue::as_real)
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        self.list_of(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn is_null(&self, idx: usize) -> bool {
        self.args.get(idx).map(|v| v.is_null()).unwrap_or(true)
    }
}
