//! Template tree types
//!
//! A template tree is the set of files rendered for one run. Every file is
//! rendered once and produces one output file at the same relative path.

use std::path::{Path, PathBuf};

use super::{BuiltinTemplates, load_template_dir};
use crate::generation::Result;

/// Where a template tree came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    FileSystem(PathBuf),
}

/// A single template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the tree root
    pub path: PathBuf,
    pub content: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Template name registered with the engine, `/`-separated on every platform
    pub fn name(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Files of a template tree, sorted by relative path
#[derive(Debug, Clone)]
pub struct TemplateTree {
    pub source: TemplateSource,
    files: Vec<TemplateFile>,
}

impl TemplateTree {
    pub fn new(source: TemplateSource, mut files: Vec<TemplateFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { source, files }
    }

    /// The tree under `template_dir`, or the built-in one when none is given
    pub async fn resolve(template_dir: Option<&Path>) -> Result<Self> {
        match template_dir {
            Some(dir) => {
                tracing::debug!(template_dir = %dir.display(), "Loading template tree");
                load_template_dir(dir).await
            }
            None => Ok(BuiltinTemplates::tree()),
        }
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    pub fn get(&self, path: &Path) -> Option<&TemplateFile> {
        self.files.iter().find(|file| file.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
