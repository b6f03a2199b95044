//! Data-model generation
//!
//! Turns `components/schemas` into pydantic v2 classes. Dotted schema names
//! (`pets.Pet`) describe a package of modules rather than a single file and
//! are reported as [`ModelSource::MultiModule`].

use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::schema_types::{TypeBuilder, model_class_name, resolve_pointer, schema_ref_name};
use crate::generation::{
    ImportRegistry, ImportStatement, ModelSource, Result, TypeGraph, all_imports, type_hint,
    utils::{docstring_text, python_identifier, python_literal, python_string},
};

/// Module that collects undotted schemas of a modular document
const PACKAGE_MODULE: &str = "__init__";

const INDENT: &str = "    ";

pub struct ModelGenerator<'a> {
    root: &'a JsonValue,
}

impl<'a> ModelGenerator<'a> {
    pub fn new(root: &'a JsonValue) -> Self {
        Self { root }
    }

    pub fn generate(&self) -> Result<ModelSource> {
        let Some(schemas) = self
            .root
            .pointer("/components/schemas")
            .and_then(JsonValue::as_object)
            .filter(|schemas| !schemas.is_empty())
        else {
            return Ok(ModelSource::None);
        };

        if !schemas.keys().any(|name| name.contains('.')) {
            let all: Vec<_> = schemas.iter().collect();
            return Ok(ModelSource::SingleModule(self.render_module(&all)?));
        }

        let mut grouped: BTreeMap<String, Vec<(&String, &JsonValue)>> = BTreeMap::new();
        for (name, schema) in schemas {
            let module = name
                .rsplit_once('.')
                .map_or(PACKAGE_MODULE, |(module, _)| module);
            grouped
                .entry(module.to_string())
                .or_default()
                .push((name, schema));
        }
        tracing::debug!(modules = grouped.len(), "Schemas span multiple modules");

        let mut modules = BTreeMap::new();
        for (module, members) in grouped {
            modules.insert(module, self.render_module(&members)?);
        }
        Ok(ModelSource::MultiModule(modules))
    }

    fn render_module(&self, schemas: &[(&String, &JsonValue)]) -> Result<String> {
        let mut module = ModuleWriter::new(self.root);
        let mut classes = Vec::with_capacity(schemas.len());
        for (name, schema) in declaration_order(schemas) {
            classes.push(module.class(name, schema)?);
        }
        Ok(format!(
            "{}\n\n\n{}\n",
            module.imports.render(),
            classes.join("\n\n\n")
        ))
    }
}

/// Per-module state: one type graph and one import registry
struct ModuleWriter<'a> {
    root: &'a JsonValue,
    graph: TypeGraph,
    imports: ImportRegistry,
}

impl<'a> ModuleWriter<'a> {
    fn new(root: &'a JsonValue) -> Self {
        let mut imports = ImportRegistry::new();
        imports.insert(ImportStatement::new("__future__", "annotations"));
        Self {
            root,
            graph: TypeGraph::new(),
            imports,
        }
    }

    fn hint(&mut self, schema: &JsonValue, required: bool) -> Result<String> {
        let mut builder = TypeBuilder::new(self.root, &mut self.graph);
        let mut id = builder.build(schema)?;
        if !required {
            id = builder.optional(id);
        }
        self.imports.extend(all_imports(&self.graph, id));
        Ok(type_hint(&self.graph, id))
    }

    fn class(&mut self, schema_name: &str, schema: &JsonValue) -> Result<String> {
        let name = model_class_name(schema_name);

        if schema.get("$ref").is_none() {
            if let Some(values) = schema.get("enum").and_then(JsonValue::as_array) {
                return Ok(self.enum_class(&name, schema, values));
            }
            if let Some(members) = schema.get("allOf").and_then(JsonValue::as_array) {
                return self.composed_class(&name, schema, members);
            }
            if is_model_object(schema) {
                let mut lines = docstring(schema);
                lines.extend(self.fields(schema)?);
                return Ok(self.model_class(&name, &[], lines));
            }
        }

        self.imports
            .insert(ImportStatement::new("pydantic", "RootModel"));
        let hint = self.hint(schema, true)?;
        let mut lines = docstring(schema);
        lines.push(format!("root: {hint}"));
        Ok(class_block(&format!("{name}(RootModel[{hint}])"), lines))
    }

    fn enum_class(&mut self, name: &str, schema: &JsonValue, values: &[JsonValue]) -> String {
        self.imports.insert(ImportStatement::new("enum", "Enum"));
        let mut seen = HashSet::new();
        let mut lines = docstring(schema);
        for value in values {
            let base = match value {
                JsonValue::String(text) => python_identifier(text).to_uppercase(),
                other => python_identifier(&format!("value_{other}")).to_uppercase(),
            };
            let mut member = base.clone();
            let mut suffix = 1;
            while !seen.insert(member.clone()) {
                member = format!("{base}_{suffix}");
                suffix += 1;
            }
            lines.push(format!("{member} = {}", python_literal(value)));
        }
        class_block(&format!("{name}(Enum)"), lines)
    }

    /// `allOf` of `$ref` parents and inline objects becomes a subclass of the
    /// parents carrying the inline properties
    fn composed_class(
        &mut self,
        name: &str,
        schema: &JsonValue,
        members: &[JsonValue],
    ) -> Result<String> {
        let mut parents = Vec::new();
        let mut properties = Map::new();
        let mut required = Vec::new();
        for member in members {
            let member = match member.get("$ref").and_then(JsonValue::as_str) {
                Some(reference) => match schema_ref_name(reference) {
                    Some(parent) => {
                        parents.push(model_class_name(&parent));
                        continue;
                    }
                    None => resolve_pointer(self.root, reference)?,
                },
                None => member,
            };
            if let Some(props) = member.get("properties").and_then(JsonValue::as_object) {
                properties.extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            if let Some(names) = member.get("required").and_then(JsonValue::as_array) {
                required.extend(names.iter().cloned());
            }
        }

        let merged = serde_json::json!({
            "properties": properties,
            "required": required,
        });
        let mut lines = docstring(schema);
        lines.extend(self.fields(&merged)?);
        Ok(self.model_class(name, &parents, lines))
    }

    fn model_class(&mut self, name: &str, parents: &[String], lines: Vec<String>) -> String {
        let bases = if parents.is_empty() {
            self.imports
                .insert(ImportStatement::new("pydantic", "BaseModel"));
            "BaseModel".to_string()
        } else {
            parents.join(", ")
        };
        class_block(&format!("{name}({bases})"), lines)
    }

    fn fields(&mut self, schema: &JsonValue) -> Result<Vec<String>> {
        let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) else {
            return Ok(Vec::new());
        };
        let required: HashSet<&str> = schema
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        let mut lines = Vec::with_capacity(properties.len());
        for (property, property_schema) in properties {
            let is_required = required.contains(property.as_str());
            let hint = self.hint(property_schema, is_required)?;
            let field_name = python_identifier(property);
            let default = property_schema.get("default").map(python_literal);

            let line = if field_name != *property {
                self.imports.insert(ImportStatement::new("pydantic", "Field"));
                let value = match (&default, is_required) {
                    (Some(default), _) => default.clone(),
                    (None, true) => "...".to_string(),
                    (None, false) => "None".to_string(),
                };
                format!(
                    "{field_name}: {hint} = Field({value}, alias={})",
                    python_string(property)
                )
            } else {
                match (default, is_required) {
                    (Some(default), _) => format!("{field_name}: {hint} = {default}"),
                    (None, true) => format!("{field_name}: {hint}"),
                    (None, false) => format!("{field_name}: {hint} = None"),
                }
            };
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Schemas reordered so that every `allOf` parent is declared before the
/// classes deriving from it. Unrelated schemas keep document order.
fn declaration_order<'s>(
    schemas: &[(&'s String, &'s JsonValue)],
) -> Vec<(&'s String, &'s JsonValue)> {
    let index: HashMap<&str, usize> = schemas
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();
    let mut visited = vec![false; schemas.len()];
    let mut order = Vec::with_capacity(schemas.len());
    for i in 0..schemas.len() {
        visit(i, schemas, &index, &mut visited, &mut order);
    }
    order
}

fn visit<'s>(
    i: usize,
    schemas: &[(&'s String, &'s JsonValue)],
    index: &HashMap<&str, usize>,
    visited: &mut [bool],
    order: &mut Vec<(&'s String, &'s JsonValue)>,
) {
    if visited[i] {
        return;
    }
    // marked before the parents are visited so inheritance cycles terminate
    visited[i] = true;
    for parent in all_of_parents(schemas[i].1) {
        if let Some(&j) = index.get(parent.as_str()) {
            visit(j, schemas, index, visited, order);
        }
    }
    order.push(schemas[i]);
}

/// Schema names referenced as `allOf` members
fn all_of_parents(schema: &JsonValue) -> Vec<String> {
    schema
        .get("allOf")
        .and_then(JsonValue::as_array)
        .map(|members| {
            members
                .iter()
                .filter_map(|member| member.get("$ref").and_then(JsonValue::as_str))
                .filter_map(schema_ref_name)
                .collect()
        })
        .unwrap_or_default()
}

/// Objects with their own fields, as opposed to plain `Dict[str, T]` maps
fn is_model_object(schema: &JsonValue) -> bool {
    if schema.get("properties").is_some() {
        return true;
    }
    let is_object = schema.get("type").and_then(JsonValue::as_str) == Some("object");
    is_object && !schema.get("additionalProperties").is_some_and(JsonValue::is_object)
}

fn docstring(schema: &JsonValue) -> Vec<String> {
    let Some(description) = schema
        .get("description")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
    else {
        return Vec::new();
    };
    let text = docstring_text(description);
    if text.contains('\n') {
        let mut lines = vec!["\"\"\"".to_string()];
        lines.extend(text.lines().map(str::to_string));
        lines.push("\"\"\"".to_string());
        lines
    } else {
        vec![format!("\"\"\"{text}\"\"\"")]
    }
}

fn class_block(signature: &str, lines: Vec<String>) -> String {
    let mut block = format!("class {signature}:");
    if lines.is_empty() {
        block.push('\n');
        block.push_str(INDENT);
        block.push_str("pass");
    }
    for line in lines {
        block.push('\n');
        if !line.is_empty() {
            block.push_str(INDENT);
            block.push_str(&line);
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(root: JsonValue) -> String {
        match ModelGenerator::new(&root).generate().unwrap() {
            ModelSource::SingleModule(source) => source,
            other => panic!("expected a single module, got {other:?}"),
        }
    }

    #[test]
    fn test_no_schemas_means_no_models() {
        for root in [
            json!({"paths": {}}),
            json!({"components": {}}),
            json!({"components": {"schemas": {}}}),
        ] {
            assert!(ModelGenerator::new(&root).generate().unwrap().is_none());
        }
    }

    #[test]
    fn test_object_model() {
        let source = single(json!({"components": {"schemas": {
            "Pet": {
                "type": "object",
                "description": "A pet for sale",
                "required": ["id", "name"],
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"},
                    "tag": {"type": "string"},
                    "birthDate": {"type": "string", "format": "date"},
                    "legs": {"type": "integer", "default": 4},
                    "owner": {"$ref": "#/components/schemas/Owner"}
                }
            },
            "Owner": {"type": "object"}
        }}}));

        assert_eq!(
            source,
            "from __future__ import annotations\n\
             from typing import Optional\n\
             from datetime import date\n\
             from pydantic import BaseModel, Field\n\
             \n\
             \n\
             class Pet(BaseModel):\n    \
                 \"\"\"A pet for sale\"\"\"\n    \
                 id: int\n    \
                 name: str\n    \
                 tag: Optional[str] = None\n    \
                 birth_date: Optional[date] = Field(None, alias='birthDate')\n    \
                 legs: Optional[int] = 4\n    \
                 owner: Optional[Owner] = None\n\
             \n\
             \n\
             class Owner(BaseModel):\n    \
                 pass\n"
        );
    }

    #[test]
    fn test_enum_and_root_models() {
        let source = single(json!({"components": {"schemas": {
            "Status": {"type": "string", "enum": ["available", "sold", "on-hold"]},
            "Tags": {"type": "array", "items": {"type": "string"}},
            "Labels": {"type": "object", "additionalProperties": {"type": "string"}}
        }}}));

        assert!(source.contains(
            "class Status(Enum):\n    \
             AVAILABLE = 'available'\n    \
             SOLD = 'sold'\n    \
             ON_HOLD = 'on-hold'"
        ));
        assert!(source.contains("class Tags(RootModel[List[str]]):\n    root: List[str]"));
        assert!(source.contains("class Labels(RootModel[Dict[str, str]]):"));
        assert!(source.contains("from enum import Enum"));
        assert!(source.contains("from pydantic import RootModel"));
    }

    #[test]
    fn test_all_of_subclasses_parents() {
        let source = single(json!({"components": {"schemas": {
            "Animal": {"type": "object", "properties": {"name": {"type": "string"}}},
            "Dog": {"allOf": [
                {"$ref": "#/components/schemas/Animal"},
                {"type": "object", "required": ["breed"], "properties": {"breed": {"type": "string"}}}
            ]}
        }}}));
        assert!(source.contains("class Dog(Animal):\n    breed: str\n"));
    }

    #[test]
    fn test_parents_declared_before_subclasses() {
        let source = single(json!({"components": {"schemas": {
            "Puppy": {"allOf": [
                {"$ref": "#/components/schemas/Dog"},
                {"type": "object", "properties": {"ageWeeks": {"type": "integer"}}}
            ]},
            "Dog": {"allOf": [
                {"$ref": "#/components/schemas/Animal"},
                {"type": "object", "properties": {"breed": {"type": "string"}}}
            ]},
            "Toy": {"type": "object", "properties": {"name": {"type": "string"}}},
            "Animal": {"type": "object", "properties": {"name": {"type": "string"}}}
        }}}));

        let position = |class: &str| source.find(class).unwrap();
        assert!(position("class Animal(BaseModel):") < position("class Dog(Animal):"));
        assert!(position("class Dog(Animal):") < position("class Puppy(Dog):"));
        assert!(position("class Puppy(Dog):") < position("class Toy(BaseModel):"));
    }

    #[test]
    fn test_inheritance_cycle_still_emits_every_class() {
        let source = single(json!({"components": {"schemas": {
            "A": {"allOf": [{"$ref": "#/components/schemas/B"}]},
            "B": {"allOf": [{"$ref": "#/components/schemas/A"}]}
        }}}));
        assert!(source.contains("class A(B):"));
        assert!(source.contains("class B(A):"));
    }

    #[test]
    fn test_dotted_names_are_multi_module() {
        let root = json!({"components": {"schemas": {
            "pets.Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
            "pets.Cat": {"type": "object"},
            "shop.Order": {"type": "object"},
            "Error": {"type": "object"}
        }}});
        let ModelSource::MultiModule(modules) = ModelGenerator::new(&root).generate().unwrap()
        else {
            panic!("expected multiple modules");
        };
        assert_eq!(
            modules.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["__init__", "pets", "shop"]
        );
        assert!(modules["pets"].contains("class Pet(BaseModel):"));
        assert!(modules["pets"].contains("class Cat(BaseModel):"));
        assert!(modules["__init__"].contains("class Error(BaseModel):"));
    }

    #[test]
    fn test_keyword_field_gets_alias() {
        let source = single(json!({"components": {"schemas": {
            "Window": {"type": "object", "required": ["from"], "properties": {"from": {"type": "string"}}}
        }}}));
        assert!(source.contains("from_: str = Field(..., alias='from')"));
    }
}
