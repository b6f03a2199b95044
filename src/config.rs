//! Generator configuration
//!
//! Settings come from a TOML file (explicit `--config`, then
//! `./fastapi-codegen.toml`, then `<config dir>/fastapi-codegen/config.toml`)
//! and are then overridden by command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generation::{GenerationError, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "fastapi-codegen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template tree to render instead of the built-in one
    pub template_dir: Option<PathBuf>,
    /// Leave the timestamp line out of provenance headers
    pub disable_timestamp: bool,
    pub formatter: FormatterConfig,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    #[default]
    Builtin,
    Command,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub kind: FormatterKind,
    /// Program for `kind = "command"`, e.g. `black`
    pub command: Option<String>,
    pub args: Vec<String>,
}

/// Template engine settings, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// HTML-escape rendered values
    pub autoescape: bool,
    /// Maximum number of files formatted at once
    pub concurrency: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            autoescape: false,
            concurrency: 4,
        }
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| GenerationError::file_system(path, e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            GenerationError::InvalidConfiguration(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first configuration file found, or defaults when there is none.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(
            dirs::config_dir().map(|dir| dir.join("fastapi-codegen").join("config.toml")),
        );
        for candidate in candidates {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Using configuration file");
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.formatter.kind == FormatterKind::Command
            && self
                .formatter
                .command
                .as_deref()
                .is_none_or(|command| command.trim().is_empty())
        {
            return Err(GenerationError::InvalidConfiguration(
                "formatter.kind = \"command\" requires formatter.command".to_string(),
            ));
        }
        if self.render.concurrency == 0 {
            return Err(GenerationError::InvalidConfiguration(
                "render.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
