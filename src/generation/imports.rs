//! Import statements and the per-run import registry
//!
//! Generated Python modules need `from <origin> import <symbol>` lines. The
//! registry collects them as `(origin, symbol)` pairs, collapses exact
//! duplicates, groups symbols per origin and remembers the order in which
//! origins were first seen so that emission is deterministic.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, SerializeStruct, Serializer};
use std::collections::BTreeSet;

use crate::generation::references::{TypeGraph, TypeId, all_imports, resolve};

/// Module that generated route files import data models from.
pub const MODEL_MODULE: &str = "models";

/// Imports every generated route module needs, independent of the schema.
pub const FRAMEWORK_IMPORTS: &[(&str, &[&str])] = &[(
    "fastapi",
    &["Body", "Cookie", "FastAPI", "Header", "Path", "Query"],
)];

/// A single `(origin, symbol)` import
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportStatement {
    /// Module the symbol is imported from. Empty for a bare `import symbol`.
    pub from: String,
    pub import: String,
}

impl ImportStatement {
    pub fn new(from: impl Into<String>, import: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            import: import.into(),
        }
    }

    /// Split a dotted path such as `models.Item` into origin and symbol.
    pub fn from_full_path(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((from, import)) => Self::new(from, import),
            None => Self::new("", path),
        }
    }

    pub fn full_path(&self) -> String {
        if self.from.is_empty() {
            self.import.clone()
        } else {
            format!("{}.{}", self.from, self.import)
        }
    }
}

/// Origin-grouped, deduplicated collection of imports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRegistry {
    groups: IndexMap<String, BTreeSet<String>>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one statement. Returns `false` if the pair was already present.
    pub fn insert(&mut self, statement: ImportStatement) -> bool {
        self.groups
            .entry(statement.from)
            .or_default()
            .insert(statement.import)
    }

    pub fn extend<I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = ImportStatement>,
    {
        for statement in statements {
            self.insert(statement);
        }
    }

    /// Union `other` into this registry, keeping this registry's origin order
    /// and appending origins it has not seen yet.
    pub fn merge(&mut self, other: &ImportRegistry) {
        for (from, symbols) in &other.groups {
            self.groups
                .entry(from.clone())
                .or_default()
                .extend(symbols.iter().cloned());
        }
    }

    pub fn contains(&self, from: &str, import: &str) -> bool {
        self.groups
            .get(from)
            .is_some_and(|symbols| symbols.contains(import))
    }

    /// Origins in first-seen order
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn symbols(&self, from: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.groups
            .iter()
            .map(|(from, symbols)| (from.as_str(), symbols))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeSet::is_empty)
    }

    /// Number of distinct `(origin, symbol)` pairs
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    /// One Python import line per origin
    pub fn statements(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, symbols)| !symbols.is_empty())
            .map(|(from, symbols)| render_statement(from, symbols))
            .collect()
    }

    pub fn render(&self) -> String {
        self.statements().join("\n")
    }
}

fn render_statement(from: &str, symbols: &BTreeSet<String>) -> String {
    let names = symbols
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if from.is_empty() {
        format!("import {names}")
    } else {
        format!("from {from} import {names}")
    }
}

/// Templates see the registry as a list of `{from, imports, statement}` groups.
impl Serialize for ImportRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Group<'a> {
            from: &'a str,
            symbols: &'a BTreeSet<String>,
        }

        impl Serialize for Group<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut group = serializer.serialize_struct("ImportGroup", 3)?;
                group.serialize_field("from", self.from)?;
                group.serialize_field("imports", self.symbols)?;
                group.serialize_field("statement", &render_statement(self.from, self.symbols))?;
                group.end()
            }
        }

        let groups: Vec<_> = self
            .iter()
            .filter(|(_, symbols)| !symbols.is_empty())
            .collect();
        let mut seq = serializer.serialize_seq(Some(groups.len()))?;
        for (from, symbols) in groups {
            seq.serialize_element(&Group { from, symbols })?;
        }
        seq.end()
    }
}

/// Build the final import registry for a run.
///
/// Origins end up ordered as: those already in `registry`, parser-declared,
/// data-model imports discovered through `data_types`, framework imports.
pub fn aggregate_imports(
    registry: &mut ImportRegistry,
    declared: &ImportRegistry,
    graph: &TypeGraph,
    data_types: &[TypeId],
) {
    registry.merge(declared);

    for &data_type in data_types {
        let Some(reference) = resolve(graph, data_type) else {
            continue;
        };
        tracing::debug!(model = %reference.name, "Data type resolves to model");
        registry.extend(all_imports(graph, data_type));
        registry.insert(ImportStatement::from_full_path(&format!(
            "{MODEL_MODULE}.{}",
            reference.name
        )));
    }

    for (from, symbols) in FRAMEWORK_IMPORTS {
        for symbol in *symbols {
            registry.insert(ImportStatement::new(*from, *symbol));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::references::{CompositeKind, Primitive};

    fn registry(pairs: &[(&str, &str)]) -> ImportRegistry {
        let mut registry = ImportRegistry::new();
        registry.extend(pairs.iter().map(|(f, i)| ImportStatement::new(*f, *i)));
        registry
    }

    #[test]
    fn test_from_full_path() {
        let statement = ImportStatement::from_full_path("models.Item");
        assert_eq!(statement.from, "models");
        assert_eq!(statement.import, "Item");
        assert_eq!(statement.full_path(), "models.Item");

        let bare = ImportStatement::from_full_path("json");
        assert_eq!(bare.from, "");
        assert_eq!(bare.full_path(), "json");
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let mut reg = ImportRegistry::new();
        assert!(reg.insert(ImportStatement::new("typing", "List")));
        assert!(!reg.insert(ImportStatement::new("typing", "List")));
        assert!(reg.insert(ImportStatement::new("typing", "Optional")));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.statements(), vec!["from typing import List, Optional"]);
    }

    #[test]
    fn test_same_symbol_under_two_origins_is_kept() {
        let reg = registry(&[("datetime", "date"), ("pendulum", "date")]);
        assert_eq!(reg.len(), 2);
        assert!(reg.contains("datetime", "date"));
        assert!(reg.contains("pendulum", "date"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let source = registry(&[("typing", "List"), ("models", "Pet"), ("typing", "Any")]);
        let mut once = registry(&[("fastapi", "FastAPI")]);
        once.merge(&source);
        let mut twice = once.clone();
        twice.merge(&source);

        assert_eq!(once, twice);
        assert_eq!(
            once.origins().collect::<Vec<_>>(),
            twice.origins().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_origin_insertion_order_and_sorted_symbols() {
        let reg = registry(&[
            ("typing", "Optional"),
            ("datetime", "datetime"),
            ("typing", "Dict"),
        ]);
        assert_eq!(
            reg.statements(),
            vec![
                "from typing import Dict, Optional",
                "from datetime import datetime",
            ]
        );
    }

    #[test]
    fn test_serialize_for_templates() {
        let reg = registry(&[("typing", "List"), ("", "json")]);
        let value = serde_json::to_value(&reg).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"from": "typing", "imports": ["List"], "statement": "from typing import List"},
                {"from": "", "imports": ["json"], "statement": "import json"},
            ])
        );
    }

    #[test]
    fn test_aggregate_orders_origins() {
        let mut graph = TypeGraph::new();
        let item = graph.named("Item", "#/components/schemas/Item");
        let list = graph.composite(CompositeKind::Array);
        graph.push_child(list, item);
        let plain = graph.primitive(Primitive::Str);

        let declared = registry(&[("typing", "Optional")]);
        let mut reg = registry(&[("__future__", "annotations")]);
        aggregate_imports(&mut reg, &declared, &graph, &[plain, list, item]);

        assert_eq!(
            reg.origins().collect::<Vec<_>>(),
            vec!["__future__", "typing", "models", "fastapi"]
        );
        assert!(reg.contains("typing", "List"));
        assert!(reg.contains("models", "Item"));
        assert!(reg.contains("fastapi", "FastAPI"));
    }

    #[test]
    fn test_aggregate_skips_unnamed_types() {
        let mut graph = TypeGraph::new();
        let text = graph.primitive(Primitive::Str);
        let list = graph.composite(CompositeKind::Array);
        graph.push_child(list, text);

        let mut reg = ImportRegistry::new();
        aggregate_imports(&mut reg, &ImportRegistry::new(), &graph, &[text, list]);

        assert!(reg.symbols(MODEL_MODULE).is_none());
        assert!(!reg.contains("typing", "List"));
        assert_eq!(reg.origins().collect::<Vec<_>>(), vec!["fastapi"]);
    }
}
