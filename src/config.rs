//! Pipeline Configuration
//!
//! Loaded from a JSON file (camelCase keys, every field optional) and then
//! overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::emit::DEFAULT_VARIABLE;
use crate::order::ExtrasPolicy;
use crate::pipeline::PipelineError;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Raw input order, books in consolidation order
    Consolidated,
    /// Sorted chapters and verses, books in canonical order
    #[default]
    Canonical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_variable")]
    pub variable_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub extras: ExtrasPolicy,
    #[serde(default)]
    pub engine_min_version: Option<String>,
}

fn default_input_dir() -> PathBuf { PathBuf::from("Bible") }
fn default_output_file() -> PathBuf { PathBuf::from("bible.html") }
fn default_extension() -> String { "json".to_string() }
fn default_variable() -> String { DEFAULT_VARIABLE.to_string() }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            variant: Variant::default(),
            extension: default_extension(),
            variable_name: default_variable(),
            title: None,
            extras: ExtrasPolicy::default(),
            engine_min_version: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>, variant: Variant) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_file: output_file.into(),
            variant,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !is_identifier(&self.variable_name) {
            return Err(PipelineError::Config(format!(
                "variable name '{}' is not a valid JavaScript identifier",
                self.variable_name
            )));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(PipelineError::Config(format!(
                "extension '{}' must be given without a leading dot",
                self.extension
            )));
        }
        self.check_engine_version()
    }

    fn check_engine_version(&self) -> Result<(), PipelineError> {
        let Some(required) = &self.engine_min_version else {
            return Ok(());
        };
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| PipelineError::Config("Invalid engine version".into()))?;
        let min_ver = semver::Version::parse(required)
            .map_err(|_| PipelineError::Config(format!("Invalid engineMinVersion '{required}'")))?;

        if engine_ver < min_ver {
            return Err(PipelineError::EngineVersionMismatch(
                required.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
