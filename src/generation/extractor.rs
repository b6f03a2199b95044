//! Operation/model extraction
//!
//! Runs the schema parser once and turns its two outputs into the model
//! source and the parsed object that the templates are rendered against.

use crate::generation::{
    ModelSource, ParsedObject, ParserOutput, Result, SchemaDocument, SchemaParser,
    aggregate_imports,
};
use crate::infrastructure::openapi::OpenApiParser;

/// Raw parser results for one document
#[derive(Debug, Clone)]
pub struct Extraction {
    pub models: ModelSource,
    pub output: ParserOutput,
}

impl Extraction {
    /// Run the import aggregator and hand back the final parsed object
    pub fn into_parsed_object(self) -> (ModelSource, ParsedObject) {
        let ParserOutput {
            mut parsed,
            declared_imports,
            data_types,
            graph,
        } = self.output;

        aggregate_imports(&mut parsed.imports, &declared_imports, &graph, &data_types);
        tracing::debug!(
            operations = parsed.operations.len(),
            imports = parsed.imports.len(),
            "Aggregated imports"
        );
        (self.models, parsed)
    }
}

/// Parse `document` with the built-in OpenAPI parser
pub fn extract(document: &SchemaDocument) -> Result<Extraction> {
    let parser = OpenApiParser::new(&document.text)?;
    extract_with(&parser)
}

pub fn extract_with<P: SchemaParser + ?Sized>(parser: &P) -> Result<Extraction> {
    let models = parser.parse_models()?;
    let output = parser.parse_paths()?;
    Ok(Extraction { models, output })
}
