//! Core types for the generation domain

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::generation::{GenerationError, ImportRegistry, TypeGraph, TypeId};

/// Name stamped into every provenance header
pub const TOOL_NAME: &str = "fastapi-codegen";

/// Suffix given to every generated source file
pub const SOURCE_EXTENSION: &str = "py";

/// Raw input document plus the name it was loaded from
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub name: String,
    pub text: String,
}

impl SchemaDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Final path component of the document name
    pub fn basename(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// HTTP methods in the order operations are emitted for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
            HttpMethod::Trace,
        ]
    }

    /// Lowercase spelling, as used for OpenAPI path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::all()
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerationError::schema_parse(format!("Unknown HTTP method: {s}")))
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl FromStr for ParameterLocation {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ParameterLocation::Path),
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "cookie" => Ok(ParameterLocation::Cookie),
            other => Err(GenerationError::schema_parse(format!(
                "Invalid parameter location: {other}"
            ))),
        }
    }
}

/// Operation parameter
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Name as written in the document
    pub name: String,
    /// Python identifier used for the handler argument
    pub snake_case_name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub type_hint: String,
    /// Default value as a Python literal
    pub default: Option<String>,
    pub description: Option<String>,
    /// Rendered handler argument, e.g. `limit: Optional[int] = None`
    pub argument: String,
    #[serde(skip)]
    pub type_ref: TypeId,
}

/// Request body
#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub media_type: String,
    pub required: bool,
    pub type_hint: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub type_ref: TypeId,
}

/// One API route
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub method: HttpMethod,
    pub path: String,
    /// Path with every template variable renamed to its Python identifier
    pub snake_case_path: String,
    /// Handler name
    pub function_name: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    /// Summary escaped for use inside a `"""` docstring
    pub docstring: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request: Option<RequestBody>,
    /// Response type hint, `None` when the operation returns no content
    pub response: String,
    /// Complete handler argument list
    pub arguments: String,
    #[serde(skip)]
    pub response_type: Option<TypeId>,
}

/// Opaque `info` object of the document
pub type ApiInfo = serde_json::Map<String, JsonValue>;

/// Structured extraction result handed to the templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedObject {
    pub info: ApiInfo,
    pub operations: Vec<Operation>,
    pub imports: ImportRegistry,
}

/// Everything the schema parser reports for the paths of a document
#[derive(Debug, Clone, Default)]
pub struct ParserOutput {
    pub parsed: ParsedObject,
    /// Imports the parser itself needs for the type hints it rendered
    pub declared_imports: ImportRegistry,
    /// Every type node created while building operations
    pub data_types: Vec<TypeId>,
    pub graph: TypeGraph,
}

/// Result of data-model generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// The document defines no reusable named schemas
    None,
    SingleModule(String),
    /// Module path to source; rejected by the output writer
    MultiModule(BTreeMap<String, String>),
}

impl ModelSource {
    pub fn is_none(&self) -> bool {
        matches!(self, ModelSource::None)
    }
}

/// Relative template path to rendered text
pub type RenderedOutputSet = BTreeMap<PathBuf, String>;

/// Source file name and generation time stamped into each generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub tool: String,
    pub filename: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Provenance {
    pub fn new(document: &SchemaDocument, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            filename: document.basename(),
            timestamp,
        }
    }

    /// Stamp with the current time, truncated to the second
    pub fn now(document: &SchemaDocument) -> Self {
        Self::new(document, Some(Utc::now()))
    }

    pub fn header(&self) -> String {
        let mut header = format!(
            "# generated by {}:\n#   filename:  {}",
            self.tool, self.filename
        );
        if let Some(timestamp) = &self.timestamp {
            header.push_str("\n#   timestamp: ");
            header.push_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, false));
        }
        header
    }
}
