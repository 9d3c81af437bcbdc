//! Process configuration.
//!
//! A [`PlatformConfig`] is built once at startup and passed by reference to
//! whatever needs it. Sources, lowest precedence first: built-in defaults, an
//! optional JSON file, `TABLOID_*` environment variables, then CLI flags
//! (applied by the binary).

use crate::error::{PlatformError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_STORAGE_ROOT: &str = "TABLOID_STORAGE_ROOT";
pub const ENV_INPUT_NAMESPACE: &str = "TABLOID_INPUT_NAMESPACE";
pub const ENV_OUTPUT_NAMESPACE: &str = "TABLOID_OUTPUT_NAMESPACE";
pub const ENV_LOG_LEVEL: &str = "TABLOID_LOG_LEVEL";

/// What a batch run does when one input object cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run.
    #[default]
    FailFast,
    /// Record the object under `skipped_files` and continue.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Root directory of the filesystem object store
    pub storage_root: PathBuf,
    /// Namespace scanned for uploaded tabular files
    pub input_namespace: String,
    /// Namespace the report is published to
    pub output_namespace: String,
    /// Object name of the published report
    pub report_object: String,
    /// Column summarized under `identifier_stats`
    pub identifier_column: String,
    /// Column added to every row with its source object name
    pub provenance_column: String,
    pub on_file_error: FailurePolicy,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("data"),
            input_namespace: "input-data".to_owned(),
            output_namespace: "batch-data".to_owned(),
            report_object: "analytics_report.json".to_owned(),
            identifier_column: "Identifier".to_owned(),
            provenance_column: "source_file".to_owned(),
            on_file_error: FailurePolicy::FailFast,
            log_level: "info".to_owned(),
            log_dir: None,
        }
    }
}

impl PlatformConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|e| PlatformError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults, overlaid with the optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlays values from `lookup`, which maps variable names to values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_STORAGE_ROOT) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(ns) = lookup(ENV_INPUT_NAMESPACE) {
            self.input_namespace = ns;
        }
        if let Some(ns) = lookup(ENV_OUTPUT_NAMESPACE) {
            self.output_namespace = ns;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }

    /// # Errors
    ///
    /// Returns [`PlatformError::Config`] for empty names or identical input
    /// and output namespaces.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("input_namespace", &self.input_namespace),
            ("output_namespace", &self.output_namespace),
            ("report_object", &self.report_object),
            ("provenance_column", &self.provenance_column),
        ] {
            if value.trim().is_empty() {
                return Err(PlatformError::Config(format!("{field} must not be empty")));
            }
        }
        if self.input_namespace == self.output_namespace {
            return Err(PlatformError::Config(format!(
                "input and output namespace are both '{}'",
                self.input_namespace
            )));
        }
        Ok(())
    }
}
