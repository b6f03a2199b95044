//! Templates compiled into the binary

use rust_embed::RustEmbed;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{TemplateFile, TemplateSource, TemplateTree};
use crate::generation::{GenerationError, Result};

/// Container for all templates embedded at compile time
#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    /// The built-in template tree
    pub fn tree() -> TemplateTree {
        let files = Self::iter()
            .filter_map(|path| {
                let file = Self::get(path.as_ref())?;
                let content = String::from_utf8_lossy(file.data.as_ref()).into_owned();
                Some(TemplateFile::new(path.as_ref(), content))
            })
            .collect();
        TemplateTree::new(TemplateSource::Embedded, files)
    }

    /// Copy the built-in tree into `dest` so it can be customised and passed
    /// back with `--template-dir`
    pub async fn export(dest: &Path) -> Result<Vec<PathBuf>> {
        let tree = Self::tree();
        let mut written = Vec::with_capacity(tree.len());

        for file in tree.files() {
            let target = dest.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| GenerationError::file_system(parent, e))?;
            }
            fs::write(&target, &file.content)
                .await
                .map_err(|e| GenerationError::file_system(&target, e))?;
            debug!("Exported template {}", target.display());
            written.push(target);
        }

        info!(
            "Exported {} built-in templates to {}",
            written.len(),
            dest.display()
        );
        Ok(written)
    }
}
