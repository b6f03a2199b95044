//! Tera-based template renderer

use std::path::PathBuf;
use tera::{Context, ErrorKind, Tera};

use crate::config::RenderSettings;
use crate::generation::{GenerationError, ParsedObject, RenderedOutputSet, Result};
use crate::infrastructure::templates::{TemplateFile, TemplateTree};

/// Renders every file of a template tree against one parsed object
pub struct TemplateRenderer {
    tera: Tera,
    files: Vec<TemplateFile>,
}

impl TemplateRenderer {
    /// Compile all templates of `tree`. Templates may include or extend each
    /// other by their `/`-separated relative path.
    pub fn new(tree: &TemplateTree, settings: &RenderSettings) -> Result<Self> {
        let mut tera = Tera::default();
        if settings.autoescape {
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }

        let sources: Vec<(String, &str)> = tree
            .files()
            .iter()
            .map(|file| (file.name(), file.content.as_str()))
            .collect();
        tera.add_raw_templates(sources)
            .map_err(|e| compile_error(tree, &e))?;

        Ok(Self {
            tera,
            files: tree.files().to_vec(),
        })
    }

    /// Render each template once; keys are the templates' relative paths
    pub fn render(&self, parsed: &ParsedObject) -> Result<RenderedOutputSet> {
        let mut context = Context::new();
        context.insert("operations", &parsed.operations);
        context.insert("imports", &parsed.imports);
        context.insert("info", &parsed.info);

        let mut rendered = RenderedOutputSet::new();
        for file in &self.files {
            let name = file.name();
            tracing::debug!(template = %name, "Rendering template");
            let output = self
                .tera
                .render(&name, &context)
                .map_err(|e| GenerationError::template_render(&file.path, error_chain(&e)))?;
            rendered.insert(file.path.clone(), output);
        }
        Ok(rendered)
    }
}

/// Find the template responsible for a failed compile of the whole tree
fn compile_error(tree: &TemplateTree, error: &tera::Error) -> GenerationError {
    for file in tree.files() {
        let mut probe = Tera::default();
        if let Err(e) = probe.add_raw_template(&file.name(), &file.content) {
            if !matches!(e.kind, ErrorKind::MissingParent { .. }) {
                return GenerationError::template_render(&file.path, error_chain(&e));
            }
        }
    }

    let template = match &error.kind {
        ErrorKind::MissingParent { current, .. } => PathBuf::from(current),
        _ => PathBuf::new(),
    };
    GenerationError::template_render(template, error_chain(error))
}

/// Tera keeps the useful detail in nested sources
fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
