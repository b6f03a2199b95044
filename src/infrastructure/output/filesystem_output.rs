//! Filesystem output writer
//!
//! Formats rendered templates and model source, stamps each with the
//! provenance header and writes them below the output directory.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::generation::{
    CodeFormatter, GenerationError, GenerationReport, MODEL_MODULE, ModelSource, Provenance,
    RenderedOutputSet, Result, SOURCE_EXTENSION,
};

/// Writes one run's output to the filesystem
pub struct FileSystemOutput {
    formatter: Arc<dyn CodeFormatter>,
    concurrency: usize,
}

impl FileSystemOutput {
    /// `concurrency` bounds how many files are formatted at once
    pub fn new(formatter: Arc<dyn CodeFormatter>, concurrency: usize) -> Self {
        Self {
            formatter,
            concurrency: concurrency.max(1),
        }
    }

    /// Path of the data-model file inside `output_dir`
    pub fn model_file(output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{MODEL_MODULE}.{SOURCE_EXTENSION}"))
    }

    /// Path a rendered template is written to: its relative path with the
    /// suffix replaced
    pub fn target_path(output_dir: &Path, template: &Path) -> PathBuf {
        output_dir.join(template.with_extension(SOURCE_EXTENSION))
    }

    pub async fn write(
        &self,
        output_dir: &Path,
        rendered: RenderedOutputSet,
        models: &ModelSource,
        provenance: &Provenance,
    ) -> Result<GenerationReport> {
        // Rejected before anything touches the disk
        if let ModelSource::MultiModule(modules) = models {
            return Err(GenerationError::UnsupportedModelLayout {
                modules: modules.keys().cloned().collect(),
            });
        }

        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| GenerationError::file_system(output_dir, e))?;

        let formatted: Vec<(PathBuf, String)> = stream::iter(rendered.into_iter().map(
            |(template, code)| {
                let formatter = Arc::clone(&self.formatter);
                async move {
                    let body = formatter.format(&code).await?;
                    Ok::<_, GenerationError>((template, body))
                }
            },
        ))
        .buffered(self.concurrency)
        .try_collect()
        .await?;

        let header = provenance.header();
        let mut report = GenerationReport::default();

        for (template, body) in formatted {
            let target = Self::target_path(output_dir, &template);
            write_file(&target, &header, &body).await?;
            tracing::debug!(template = %template.display(), path = %target.display(), "Wrote file");
            report.files.push(target);
        }

        if let ModelSource::SingleModule(source) = models {
            let body = self.formatter.format(source).await?;
            let target = Self::model_file(output_dir);
            write_file(&target, &header, &body).await?;
            tracing::debug!(path = %target.display(), "Wrote data models");
            report.model_file = Some(target);
        }

        Ok(report)
    }
}

async fn write_file(path: &Path, header: &str, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| GenerationError::file_system(parent, e))?;
    }

    let content = format!("{header}\n\n{}\n", body.trim_end());
    let mut file = fs::File::create(path)
        .await
        .map_err(|e| GenerationError::file_system(path, e))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| GenerationError::file_system(path, e))?;
    file.flush()
        .await
        .map_err(|e| GenerationError::file_system(path, e))?;
    Ok(())
}
