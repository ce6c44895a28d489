#![warn(missing_docs)]

//! STEP file import/export for the glomet kernel.
//!
//! Reads and writes ISO 10303-21 files holding solids of revolution about
//! vertical axes. Output targets AP214 (Automotive Design) and names each
//! solid the way common CAD translators do, `<prefix> <n+1>.<i>`, so that
//! downstream tools can find and rename them.
//!
//! # Example
//!
//! ```no_run
//! use glomet_kernel_math::Tolerance;
//! use glomet_kernel_step::{read_step, write_step, WriteOptions};
//!
//! let tol = Tolerance::DEFAULT;
//! let imported = read_step("model.step", &tol).unwrap();
//! let bodies: Vec<_> = imported.into_iter().map(|b| b.body).collect();
//! write_step(&bodies, "copy.step", &WriteOptions::default()).unwrap();
//! ```

pub mod entities;
mod error;
mod lexer;
pub mod parser;
mod reader;
mod writer;

pub use entities::quote;
pub use parser::{Parser, StepEntity, StepFile, StepValue};
pub use error::StepError;
pub use reader::{read_step, read_step_from_buffer, ImportedBody};
pub use writer::{
    generated_label, write_step, write_step_to_buffer, write_step_to_string, WriteOptions,
    DEFAULT_LABEL_PREFIX,
};
