//! Maps OpenAPI schema objects onto the type reference graph

use serde_json::Value as JsonValue;

use crate::generation::{
    CompositeKind, GenerationError, Primitive, Result, TypeGraph, TypeId, TypeNode,
    utils::class_name,
};

/// Prefix of references that name a reusable model
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Limit for chains of `$ref`s that point outside `components/schemas`
const MAX_REF_DEPTH: usize = 32;

/// Builds type nodes for schemas of one document, remembering every node it
/// creates.
pub struct TypeBuilder<'a> {
    root: &'a JsonValue,
    graph: &'a mut TypeGraph,
    created: Vec<TypeId>,
}

impl<'a> TypeBuilder<'a> {
    pub fn new(root: &'a JsonValue, graph: &'a mut TypeGraph) -> Self {
        Self {
            root,
            graph,
            created: Vec::new(),
        }
    }

    pub fn graph(&self) -> &TypeGraph {
        &*self.graph
    }

    /// Nodes created so far, in creation order
    pub fn created(&self) -> &[TypeId] {
        &self.created
    }

    pub fn build(&mut self, schema: &JsonValue) -> Result<TypeId> {
        self.build_at_depth(schema, 0)
    }

    /// Wrap `inner` in `Optional[...]` unless it already is optional
    pub fn optional(&mut self, inner: TypeId) -> TypeId {
        if let Some(TypeNode::Composite {
            kind: CompositeKind::Optional,
            ..
        }) = self.graph.get(inner)
        {
            return inner;
        }
        self.composite(CompositeKind::Optional, &[inner])
    }

    fn record(&mut self, id: TypeId) -> TypeId {
        self.created.push(id);
        id
    }

    fn primitive(&mut self, primitive: Primitive) -> TypeId {
        let id = self.graph.primitive(primitive);
        self.record(id)
    }

    fn composite(&mut self, kind: CompositeKind, children: &[TypeId]) -> TypeId {
        let id = self.graph.composite(kind);
        for &child in children {
            self.graph.push_child(id, child);
        }
        self.record(id)
    }

    fn build_at_depth(&mut self, schema: &JsonValue, depth: usize) -> Result<TypeId> {
        if let Some(reference) = schema.get("$ref").and_then(JsonValue::as_str) {
            return self.build_reference(reference, depth);
        }

        let (schema_type, type_nullable) = schema_type(schema);
        let nullable = type_nullable
            || schema
                .get("nullable")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false);

        let id = if let Some(members) = schema
            .get("oneOf")
            .or_else(|| schema.get("anyOf"))
            .and_then(JsonValue::as_array)
        {
            let children = self.build_members(members, depth)?;
            match children.as_slice() {
                [only] => *only,
                _ => self.composite(CompositeKind::Union, &children),
            }
        } else if let Some(members) = schema.get("allOf").and_then(JsonValue::as_array) {
            let children = self.build_members(members, depth)?;
            match children.as_slice() {
                [only] => *only,
                _ => self.composite(CompositeKind::AllOf, &children),
            }
        } else {
            match schema_type {
                Some("string") => {
                    let format = schema.get("format").and_then(JsonValue::as_str);
                    self.primitive(match format {
                        Some("date-time") => Primitive::DateTime,
                        Some("date") => Primitive::Date,
                        Some("time") => Primitive::Time,
                        Some("uuid") => Primitive::Uuid,
                        Some("binary") => Primitive::Bytes,
                        _ => Primitive::Str,
                    })
                }
                Some("integer") => self.primitive(Primitive::Int),
                Some("number") => self.primitive(Primitive::Float),
                Some("boolean") => self.primitive(Primitive::Bool),
                Some("array") => {
                    let item = match schema.get("items") {
                        Some(items) => self.build_at_depth(items, depth)?,
                        None => self.primitive(Primitive::Any),
                    };
                    self.composite(CompositeKind::Array, &[item])
                }
                _ => self.build_object(schema, schema_type, depth)?,
            }
        };

        Ok(if nullable { self.optional(id) } else { id })
    }

    fn build_object(
        &mut self,
        schema: &JsonValue,
        schema_type: Option<&str>,
        depth: usize,
    ) -> Result<TypeId> {
        match schema.get("additionalProperties") {
            Some(values) if values.is_object() && schema.get("properties").is_none() => {
                let value = self.build_at_depth(values, depth)?;
                Ok(self.composite(CompositeKind::Map, &[value]))
            }
            _ if schema_type == Some("object") || schema.get("properties").is_some() => {
                Ok(self.primitive(Primitive::Object))
            }
            _ => Ok(self.primitive(Primitive::Any)),
        }
    }

    fn build_members(&mut self, members: &[JsonValue], depth: usize) -> Result<Vec<TypeId>> {
        members
            .iter()
            .map(|member| self.build_at_depth(member, depth))
            .collect()
    }

    fn build_reference(&mut self, reference: &str, depth: usize) -> Result<TypeId> {
        if let Some(name) = schema_ref_name(reference) {
            resolve_pointer(self.root, reference)?;
            let id = self.graph.named(model_class_name(&name), reference);
            return Ok(self.record(id));
        }

        if depth >= MAX_REF_DEPTH {
            return Err(GenerationError::schema_parse(format!(
                "Reference chain too deep at {reference}"
            )));
        }
        let target = resolve_pointer(self.root, reference)?;
        self.build_at_depth(target, depth + 1)
    }
}

/// Name of the `components/schemas` entry a reference points at, with JSON
/// pointer escapes decoded. References into a schema (`.../Pet/properties/id`)
/// do not name a model.
pub fn schema_ref_name(reference: &str) -> Option<String> {
    let token = reference.strip_prefix(SCHEMA_REF_PREFIX)?;
    if token.is_empty() || token.contains('/') {
        return None;
    }
    Some(token.replace("~1", "/").replace("~0", "~"))
}

/// Class name for an entry of `components/schemas`. Dotted names such as
/// `pets.Pet` name a class inside a module, so only the last segment counts.
pub fn model_class_name(schema_name: &str) -> String {
    let name = schema_name
        .rsplit_once('.')
        .map_or(schema_name, |(_, class)| class);
    class_name(name)
}

/// Declared `type`, accepting OpenAPI 3.1 type arrays such as `["string", "null"]`.
/// The flag reports whether `null` was one of the listed types.
fn schema_type(schema: &JsonValue) -> (Option<&str>, bool) {
    match schema.get("type") {
        Some(JsonValue::String(name)) => (Some(name.as_str()), false),
        Some(JsonValue::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(JsonValue::as_str).collect();
            let nullable = names.contains(&"null");
            (names.into_iter().find(|name| *name != "null"), nullable)
        }
        _ => (None, false),
    }
}

/// Resolve a local `#/...` JSON pointer
pub fn resolve_pointer<'a>(root: &'a JsonValue, reference: &str) -> Result<&'a JsonValue> {
    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        GenerationError::schema_parse(format!("External references not supported: {reference}"))
    })?;
    root.pointer(pointer).ok_or_else(|| {
        GenerationError::schema_parse(format!("Unable to resolve reference: {reference}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{resolve, type_hint};
    use serde_json::json;

    fn hint_for(root: &JsonValue, schema: JsonValue) -> String {
        let mut graph = TypeGraph::new();
        let id = TypeBuilder::new(root, &mut graph).build(&schema).unwrap();
        type_hint(&graph, id)
    }

    #[test]
    fn test_primitive_hints() {
        let root = json!({});
        assert_eq!(hint_for(&root, json!({"type": "string"})), "str");
        assert_eq!(hint_for(&root, json!({"type": "string", "format": "date-time"})), "datetime");
        assert_eq!(hint_for(&root, json!({"type": "string", "format": "uuid"})), "UUID");
        assert_eq!(hint_for(&root, json!({"type": "integer", "format": "int64"})), "int");
        assert_eq!(hint_for(&root, json!({"type": "number"})), "float");
        assert_eq!(hint_for(&root, json!({"type": "boolean"})), "bool");
        assert_eq!(hint_for(&root, json!({})), "Any");
        assert_eq!(hint_for(&root, json!({"type": "object"})), "Dict[str, Any]");
    }

    #[test]
    fn test_composite_hints() {
        let root = json!({"components": {"schemas": {"Pet": {}, "Cat": {}}}});
        assert_eq!(
            hint_for(&root, json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})),
            "List[Pet]"
        );
        assert_eq!(
            hint_for(
                &root,
                json!({"oneOf": [{"$ref": "#/components/schemas/Pet"}, {"$ref": "#/components/schemas/Cat"}]})
            ),
            "Union[Pet, Cat]"
        );
        assert_eq!(
            hint_for(&root, json!({"anyOf": [{"type": "string"}]})),
            "str"
        );
        assert_eq!(
            hint_for(&root, json!({"type": "object", "additionalProperties": {"type": "integer"}})),
            "Dict[str, int]"
        );
        assert_eq!(
            hint_for(&root, json!({"type": "string", "nullable": true})),
            "Optional[str]"
        );
        assert_eq!(
            hint_for(&root, json!({"type": ["integer", "null"]})),
            "Optional[int]"
        );
    }

    #[test]
    fn test_reference_outside_schemas_is_followed() {
        let root = json!({
            "components": {
                "parameters": {"Limit": {"schema": {"type": "integer"}}},
                "schemas": {"pet-data": {"type": "object"}}
            }
        });
        assert_eq!(
            hint_for(&root, json!({"$ref": "#/components/parameters/Limit/schema"})),
            "int"
        );
        assert_eq!(
            hint_for(&root, json!({"$ref": "#/components/schemas/pet-data"})),
            "PetData"
        );
    }

    #[test]
    fn test_model_class_name_uses_last_segment() {
        assert_eq!(model_class_name("Pet"), "Pet");
        assert_eq!(model_class_name("pets.Pet"), "Pet");
        assert_eq!(model_class_name("shop.v1.order-line"), "OrderLine");
    }

    #[test]
    fn test_unresolvable_and_external_references() {
        let root = json!({});
        let mut graph = TypeGraph::new();
        let mut builder = TypeBuilder::new(&root, &mut graph);
        assert!(matches!(
            builder.build(&json!({"$ref": "#/components/schemas/Missing"})),
            Err(GenerationError::SchemaParse(_))
        ));
        assert!(matches!(
            builder.build(&json!({"$ref": "other.yaml#/Pet"})),
            Err(GenerationError::SchemaParse(_))
        ));
    }

    #[test]
    fn test_self_referencing_pointer_is_bounded() {
        let root = json!({"definitions": {"Loop": {"$ref": "#/definitions/Loop"}}});
        let mut graph = TypeGraph::new();
        let result = TypeBuilder::new(&root, &mut graph).build(&json!({"$ref": "#/definitions/Loop"}));
        assert!(matches!(result, Err(GenerationError::SchemaParse(_))));
    }

    #[test]
    fn test_every_node_is_recorded() {
        let root = json!({"components": {"schemas": {"Pet": {}}}});
        let mut graph = TypeGraph::new();
        let mut builder = TypeBuilder::new(&root, &mut graph);
        let id = builder
            .build(&json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}, "nullable": true}))
            .unwrap();
        assert_eq!(builder.created().len(), 3);
        assert_eq!(builder.created().last(), Some(&id));
        assert_eq!(resolve(builder.graph(), id).map(|r| r.name.as_str()), Some("Pet"));
    }

    #[test]
    fn test_reference_into_a_schema_is_followed() {
        let root = json!({"components": {"schemas": {
            "Pet": {"type": "object", "properties": {"owner": {"type": "string", "format": "uuid"}}},
            "a~1b": {"type": "object"}
        }}});
        assert_eq!(
            hint_for(&root, json!({"$ref": "#/components/schemas/Pet/properties/owner"})),
            "UUID"
        );
        assert_eq!(hint_for(&root, json!({"$ref": "#/components/schemas/a~1b"})), "AB");
    }

    #[test]
    fn test_schema_ref_name() {
        assert_eq!(schema_ref_name("#/components/schemas/Pet").as_deref(), Some("Pet"));
        assert_eq!(schema_ref_name("#/components/schemas/a~1b~0c").as_deref(), Some("a/b~c"));
        assert_eq!(schema_ref_name("#/components/schemas/Pet/properties/id"), None);
        assert_eq!(schema_ref_name("#/components/parameters/Limit"), None);
    }
}
