//! Error types for the generation domain

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur during code generation.
///
/// Every variant is fatal: the pipeline stops at the first error and files
/// already written to the output directory are left in place.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The input document is not a structurally valid OpenAPI document
    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    /// A single template failed to compile or render
    #[error("Failed to render template '{}': {message}", template.display())]
    TemplateRender { template: PathBuf, message: String },

    /// The model generator produced more than one module
    #[error(
        "Modular references are not supported in this version (model output spans modules: {})",
        modules.join(", ")
    )]
    UnsupportedModelLayout { modules: Vec<String> },

    /// A file or directory could not be created, read or written
    #[error("File system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Formatter error: {0}")]
    Format(String),

    /// The input document could not be fetched
    #[error("Failed to load schema from {location}: {message}")]
    Load { location: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl GenerationError {
    /// Wrap an I/O error with the path it happened at
    pub fn file_system(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn schema_parse<S: Into<String>>(message: S) -> Self {
        Self::SchemaParse(message.into())
    }

    pub fn template_render<S: Into<String>>(template: impl AsRef<Path>, message: S) -> Self {
        Self::TemplateRender {
            template: template.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
