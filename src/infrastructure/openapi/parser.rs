//! OpenAPI document parser
//!
//! Walks the `paths` of an OpenAPI 3.x document (JSON or YAML) and produces
//! the operations, type hints and declared imports that route templates are
//! rendered against. Model classes are produced by [`ModelGenerator`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use super::models::ModelGenerator;
use super::schema_types::{TypeBuilder, resolve_pointer};
use crate::generation::{
    ApiInfo, GenerationError, HttpMethod, ImportRegistry, ModelSource, Operation, Parameter,
    ParameterLocation, ParsedObject, ParserOutput, RequestBody, Result, SchemaParser, TypeGraph,
    TypeId, all_imports, type_hint,
    utils::{docstring_text, python_identifier, python_literal, python_string},
};

static PATH_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("Invalid path parameter regex"));

/// Parsed OpenAPI document
#[derive(Debug, Clone)]
pub struct OpenApiParser {
    root: JsonValue,
}

impl OpenApiParser {
    /// Parse document text, trying JSON first and then YAML
    pub fn new(text: &str) -> Result<Self> {
        let root = match serde_json::from_str::<JsonValue>(text) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str::<JsonValue>(text).map_err(|e| {
                GenerationError::schema_parse(format!("Failed to parse OpenAPI document: {e}"))
            })?,
        };
        Self::from_value(root)
    }

    pub fn from_value(root: JsonValue) -> Result<Self> {
        if !root.is_object() {
            return Err(GenerationError::schema_parse(
                "OpenAPI document must be a mapping",
            ));
        }
        if !root.get("paths").is_some_and(JsonValue::is_object) {
            return Err(GenerationError::schema_parse("Missing 'paths' object"));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &JsonValue {
        &self.root
    }

    pub fn info(&self) -> ApiInfo {
        self.root
            .get("info")
            .and_then(JsonValue::as_object)
            .cloned()
            .unwrap_or_default()
    }

    fn paths(&self) -> Result<&Map<String, JsonValue>> {
        self.root
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| GenerationError::schema_parse("Missing 'paths' object"))
    }

    /// Follow a `$ref` on `value`, if it has one
    fn deref<'a>(&'a self, value: &'a JsonValue) -> Result<&'a JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(reference) => resolve_pointer(&self.root, reference),
            None => Ok(value),
        }
    }

    fn build_operation(
        &self,
        builder: &mut TypeBuilder<'_>,
        path: &str,
        method: HttpMethod,
        path_item: &JsonValue,
        item: &JsonValue,
    ) -> Result<Operation> {
        let operation_id = string_field(item, "operationId");
        let function_name = match &operation_id {
            Some(id) => python_identifier(id),
            None => default_function_name(method, path),
        };

        let mut parameters = Vec::new();
        for raw in self.merged_parameters(path_item, item)? {
            parameters.push(self.build_parameter(builder, raw)?);
        }

        let request = item
            .get("requestBody")
            .map(|body| self.build_request_body(builder, body))
            .transpose()?
            .flatten();

        let response_type = self.build_response(builder, item)?;
        let response = response_type
            .map(|id| type_hint(builder.graph(), id))
            .unwrap_or_else(|| "None".to_string());

        let arguments = render_arguments(&parameters, request.as_ref());
        let summary = string_field(item, "summary");
        let docstring = summary
            .as_deref()
            .map(docstring_text)
            .filter(|text| !text.is_empty());

        Ok(Operation {
            method,
            path: path.to_string(),
            snake_case_path: snake_case_path(path),
            function_name,
            operation_id,
            summary,
            docstring,
            description: string_field(item, "description"),
            tags: item
                .get("tags")
                .and_then(JsonValue::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(JsonValue::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            deprecated: item
                .get("deprecated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            parameters,
            request,
            response,
            arguments,
            response_type,
        })
    }

    /// Path-level parameters overridden by operation-level ones with the same
    /// name and location
    fn merged_parameters<'a>(
        &'a self,
        path_item: &'a JsonValue,
        item: &'a JsonValue,
    ) -> Result<Vec<&'a JsonValue>> {
        let mut merged: Vec<&JsonValue> = Vec::new();
        for source in [path_item, item] {
            let Some(list) = source.get("parameters").and_then(JsonValue::as_array) else {
                continue;
            };
            for raw in list {
                let param = self.deref(raw)?;
                let key = (param.get("name"), param.get("in"));
                match merged
                    .iter_mut()
                    .find(|existing| (existing.get("name"), existing.get("in")) == key)
                {
                    Some(existing) => *existing = param,
                    None => merged.push(param),
                }
            }
        }
        Ok(merged)
    }

    fn build_parameter(&self, builder: &mut TypeBuilder<'_>, raw: &JsonValue) -> Result<Parameter> {
        let name = string_field(raw, "name")
            .ok_or_else(|| GenerationError::schema_parse("Parameter missing name"))?;
        let location: ParameterLocation = raw
            .get("in")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .parse()?;
        let required = location == ParameterLocation::Path
            || raw
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false);

        let empty = JsonValue::Object(Map::new());
        let schema = match raw.get("schema") {
            Some(schema) => schema,
            None => raw
                .get("content")
                .and_then(preferred_media)
                .and_then(|(_, media)| media.get("schema"))
                .unwrap_or(&empty),
        };

        let mut type_ref = builder.build(schema)?;
        if !required {
            type_ref = builder.optional(type_ref);
        }
        let type_hint = type_hint(builder.graph(), type_ref);
        let default = self
            .deref(schema)?
            .get("default")
            .map(python_literal);

        let snake_case_name = python_identifier(&name);
        let argument = render_parameter(
            &name,
            &snake_case_name,
            location,
            required,
            &type_hint,
            default.as_deref(),
        );

        Ok(Parameter {
            description: string_field(raw, "description"),
            name,
            snake_case_name,
            location,
            required,
            type_hint,
            default,
            argument,
            type_ref,
        })
    }

    fn build_request_body(
        &self,
        builder: &mut TypeBuilder<'_>,
        body: &JsonValue,
    ) -> Result<Option<RequestBody>> {
        let body = self.deref(body)?;
        let Some((media_type, media)) = body.get("content").and_then(preferred_media) else {
            return Ok(None);
        };

        let required = body
            .get("required")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        let empty = JsonValue::Object(Map::new());
        let mut type_ref = builder.build(media.get("schema").unwrap_or(&empty))?;
        if !required {
            type_ref = builder.optional(type_ref);
        }

        Ok(Some(RequestBody {
            media_type: media_type.to_string(),
            required,
            type_hint: type_hint(builder.graph(), type_ref),
            description: string_field(body, "description"),
            type_ref,
        }))
    }

    /// Type of the first 2xx response (lowest code), falling back to `default`
    fn build_response(
        &self,
        builder: &mut TypeBuilder<'_>,
        item: &JsonValue,
    ) -> Result<Option<TypeId>> {
        let Some(responses) = item.get("responses").and_then(JsonValue::as_object) else {
            return Ok(None);
        };

        let success = responses
            .iter()
            .filter_map(|(code, response)| {
                code.parse::<u16>()
                    .ok()
                    .filter(|code| (200..300).contains(code))
                    .map(|code| (code, response))
            })
            .min_by_key(|(code, _)| *code)
            .map(|(_, response)| response)
            .or_else(|| responses.get("default"));
        let Some(response) = success else {
            return Ok(None);
        };

        let response = self.deref(response)?;
        let schema = response
            .get("content")
            .and_then(preferred_media)
            .and_then(|(_, media)| media.get("schema"));
        schema.map(|schema| builder.build(schema)).transpose()
    }
}

impl SchemaParser for OpenApiParser {
    fn parse_paths(&self) -> Result<ParserOutput> {
        let mut graph = TypeGraph::new();
        let mut builder = TypeBuilder::new(&self.root, &mut graph);
        let mut operations = Vec::new();

        for (path, path_item) in self.paths()? {
            for &method in HttpMethod::all() {
                let Some(item) = path_item.get(method.as_str()).filter(|i| i.is_object()) else {
                    continue;
                };
                let operation = self.build_operation(&mut builder, path, method, path_item, item)?;
                tracing::debug!(
                    method = %method,
                    path = %path,
                    function = %operation.function_name,
                    "Parsed operation"
                );
                operations.push(operation);
            }
        }

        let data_types = builder.created().to_vec();

        let mut declared_imports = ImportRegistry::new();
        for operation in &operations {
            let used = operation
                .parameters
                .iter()
                .map(|param| param.type_ref)
                .chain(operation.request.as_ref().map(|body| body.type_ref))
                .chain(operation.response_type);
            for id in used {
                declared_imports.extend(all_imports(&graph, id));
            }
        }

        Ok(ParserOutput {
            parsed: ParsedObject {
                info: self.info(),
                operations,
                imports: ImportRegistry::new(),
            },
            declared_imports,
            data_types,
            graph,
        })
    }

    fn parse_models(&self) -> Result<ModelSource> {
        ModelGenerator::new(&self.root).generate()
    }
}

fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(JsonValue::as_str).map(String::from)
}

/// JSON media type if there is one, otherwise the first listed
fn preferred_media(content: &JsonValue) -> Option<(&str, &JsonValue)> {
    let content = content.as_object()?;
    content
        .iter()
        .find(|(media_type, _)| media_type.contains("json"))
        .or_else(|| content.iter().next())
        .map(|(media_type, media)| (media_type.as_str(), media))
}

/// `get_items_id` for `GET /items/{id}`, `get_root` for `GET /`
fn default_function_name(method: HttpMethod, path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(python_identifier)
        .collect();
    if segments.is_empty() {
        format!("{}_root", method.as_str())
    } else {
        format!("{}_{}", method.as_str(), segments.join("_"))
    }
}

/// Rename every `{param}` in `path` to its Python identifier
pub fn snake_case_path(path: &str) -> String {
    PATH_PARAMETER
        .replace_all(path, |caps: &regex::Captures<'_>| {
            format!("{{{}}}", python_identifier(&caps[1]))
        })
        .into_owned()
}

fn render_parameter(
    name: &str,
    snake_case_name: &str,
    location: ParameterLocation,
    required: bool,
    hint: &str,
    default: Option<&str>,
) -> String {
    let renamed = snake_case_name != name;
    let value = match (default, required) {
        (Some(default), _) => default.to_string(),
        (None, true) => "...".to_string(),
        (None, false) => "None".to_string(),
    };
    let alias = if renamed {
        format!(", alias={}", python_string(name))
    } else {
        String::new()
    };

    match location {
        ParameterLocation::Path => format!("{snake_case_name}: {hint}"),
        ParameterLocation::Query if renamed => {
            format!("{snake_case_name}: {hint} = Query({value}{alias})")
        }
        ParameterLocation::Query if default.is_none() && required => {
            format!("{snake_case_name}: {hint}")
        }
        ParameterLocation::Query => format!("{snake_case_name}: {hint} = {value}"),
        ParameterLocation::Header => format!("{snake_case_name}: {hint} = Header({value}{alias})"),
        ParameterLocation::Cookie => format!("{snake_case_name}: {hint} = Cookie({value}{alias})"),
    }
}

/// Handler arguments, those without a default first
fn render_arguments(parameters: &[Parameter], request: Option<&RequestBody>) -> String {
    let mut arguments: Vec<String> = parameters.iter().map(|p| p.argument.clone()).collect();
    if let Some(body) = request {
        arguments.push(if body.required {
            format!("body: {}", body.type_hint)
        } else {
            format!("body: {} = None", body.type_hint)
        });
    }
    let (plain, defaulted): (Vec<String>, Vec<String>) = arguments
        .into_iter()
        .partition(|argument| !argument.contains(" = "));
    plain
        .into_iter()
        .chain(defaulted)
        .collect::<Vec<_>>()
        .join(", ")
}
