//! Generation orchestration - coordinates the generation workflow

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::generation::{CodeFormatter, Provenance, Result, SchemaDocument, extract};
use crate::infrastructure::generation::{TemplateRenderer, formatter_from_config};
use crate::infrastructure::output::FileSystemOutput;
use crate::infrastructure::templates::TemplateTree;

/// Files produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// One entry per template, in template path order
    pub files: Vec<PathBuf>,
    pub model_file: Option<PathBuf>,
}

/// Runs extraction, rendering and output for one document
pub struct Generator {
    config: Config,
    formatter: Arc<dyn CodeFormatter>,
}

impl Generator {
    /// Create a generator using the formatter selected in `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let formatter = formatter_from_config(&config.formatter)?;
        Ok(Self { config, formatter })
    }

    pub fn with_formatter(config: Config, formatter: Arc<dyn CodeFormatter>) -> Self {
        Self { config, formatter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute the generation workflow
    pub async fn generate(
        &self,
        document: &SchemaDocument,
        output_dir: &Path,
    ) -> Result<GenerationReport> {
        tracing::info!(input = %document.name, "Parsing OpenAPI document");
        let (models, parsed) = extract(document)?.into_parsed_object();
        tracing::debug!(
            operations = parsed.operations.len(),
            "Extracted operations"
        );

        let tree = TemplateTree::resolve(self.config.template_dir.as_deref()).await?;
        let renderer = TemplateRenderer::new(&tree, &self.config.render)?;
        let rendered = renderer.render(&parsed)?;

        let provenance = if self.config.disable_timestamp {
            Provenance::new(document, None)
        } else {
            Provenance::now(document)
        };

        let output = FileSystemOutput::new(Arc::clone(&self.formatter), self.config.render.concurrency);
        let report = output
            .write(output_dir, rendered, &models, &provenance)
            .await?;

        tracing::info!(
            output_dir = %output_dir.display(),
            files = report.files.len(),
            models = report.model_file.is_some(),
            "Generation complete"
        );
        Ok(report)
    }
}

/// Generate code for `document` into `output_dir` using `config`
pub async fn generate_code(
    document: &SchemaDocument,
    output_dir: &Path,
    config: Config,
) -> Result<GenerationReport> {
    Generator::new(config)?.generate(document, output_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatterKind, RenderSettings};
    use crate::generation::GenerationError;
    use tempfile::TempDir;

    const ITEMS: &str = r##"
openapi: "3.0.3"
info:
  title: Items
  version: "1.0"
paths:
  /items/{id}:
    get:
      operationId: getItem
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: integer
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Item"
components:
  schemas:
    Item:
      type: object
      required: [id]
      properties:
        id:
          type: integer
"##;

    #[tokio::test]
    async fn test_generator_workflow() {
        let out = TempDir::new().unwrap();
        let document = SchemaDocument::new("items.yaml", ITEMS);

        let report = generate_code(&document, out.path(), Config::default())
            .await
            .unwrap();

        assert_eq!(report.files, vec![out.path().join("main.py")]);
        assert_eq!(report.model_file, Some(out.path().join("models.py")));

        let main = std::fs::read_to_string(out.path().join("main.py")).unwrap();
        assert!(main.starts_with("# generated by fastapi-codegen:\n#   filename:  items.yaml\n"));
        assert!(main.contains("from models import Item"));
        assert!(main.contains("def get_item(id: int) -> Item:"));
    }

    #[tokio::test]
    async fn test_schema_parse_error_writes_nothing() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("generated");
        let document = SchemaDocument::new("broken.json", "{\"openapi\": \"3.0.0\"}");

        let err = generate_code(&document, &target, Config::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::SchemaParse(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.formatter.kind = FormatterKind::Command;
        assert!(Generator::new(config).is_err());

        let config = Config {
            render: RenderSettings {
                concurrency: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Generator::new(config).is_err());
    }
}
