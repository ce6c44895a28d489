//! Run configuration, read from an optional `glomet.toml`.

use std::path::{Path, PathBuf};

use glomet_kernel::glomet_kernel_step::DEFAULT_LABEL_PREFIX;
use glomet_kernel::{Tolerance, WriteOptions};
use serde::Deserialize;

use crate::error::ConfigError;

/// Pipeline settings.
///
/// ```toml
/// work_dir = "build"
/// label_prefix = "Open CASCADE STEP translator 7.7"
/// linear_tolerance = 1e-6
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the per-row intermediate files are written to.
    pub work_dir: PathBuf,
    /// Prefix of the generated solid names rewritten by the relabel pass.
    pub label_prefix: String,
    /// Linear modelling tolerance in millimetres.
    pub linear_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            linear_tolerance: Tolerance::DEFAULT.linear,
        }
    }
}

impl Config {
    /// Name of the configuration file looked up in the working directory.
    pub const FILE_NAME: &'static str = "glomet.toml";

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the file at `path`, or the defaults if there is none.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.linear_tolerance.is_finite() && self.linear_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "linear_tolerance must be positive, got {}",
                self.linear_tolerance
            )));
        }
        if self.label_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("label_prefix is empty".to_string()));
        }
        Ok(())
    }

    /// Kernel tolerance.
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::with_linear(self.linear_tolerance)
    }

    /// STEP export options.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            label_prefix: self.label_prefix.clone(),
            tolerance: self.tolerance(),
        }
    }
}
