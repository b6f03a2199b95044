//! Type reference graph and the reference resolver
//!
//! Parameter, request and response types are stored in an arena so that
//! composite nodes (`List[...]`, `Union[...]`, ...) can share children and so
//! that an accidental cycle never turns into infinite recursion: every walk
//! below tracks the `TypeId`s it has already visited.

use std::collections::HashSet;

use crate::generation::imports::ImportStatement;

/// Index of a node inside a [`TypeGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// Pointer to a concrete, nameable data model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedReference {
    /// Python class name of the model
    pub name: String,
    /// JSON pointer the reference came from, e.g. `#/components/schemas/Item`
    pub path: String,
}

/// Scalar types with a fixed Python spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
    DateTime,
    Date,
    Time,
    Uuid,
    /// Free-form object, `Dict[str, Any]`
    Object,
    Any,
}

impl Primitive {
    pub fn type_hint(&self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Bytes => "bytes",
            Primitive::DateTime => "datetime",
            Primitive::Date => "date",
            Primitive::Time => "time",
            Primitive::Uuid => "UUID",
            Primitive::Object => "Dict[str, Any]",
            Primitive::Any => "Any",
        }
    }

    pub fn imports(&self) -> Vec<ImportStatement> {
        match self {
            Primitive::DateTime => vec![ImportStatement::new("datetime", "datetime")],
            Primitive::Date => vec![ImportStatement::new("datetime", "date")],
            Primitive::Time => vec![ImportStatement::new("datetime", "time")],
            Primitive::Uuid => vec![ImportStatement::new("uuid", "UUID")],
            Primitive::Object => vec![
                ImportStatement::new("typing", "Any"),
                ImportStatement::new("typing", "Dict"),
            ],
            Primitive::Any => vec![ImportStatement::new("typing", "Any")],
            _ => Vec::new(),
        }
    }
}

/// How a composite node combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Array,
    Optional,
    /// `oneOf` / `anyOf`
    Union,
    AllOf,
    /// `additionalProperties` object, `Dict[str, T]`
    Map,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Named(NamedReference),
    Primitive(Primitive),
    Composite {
        kind: CompositeKind,
        children: Vec<TypeId>,
    },
}

/// Arena holding every type node created during one run
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: TypeNode) -> TypeId {
        self.nodes.push(node);
        TypeId(self.nodes.len() - 1)
    }

    pub fn named(&mut self, name: impl Into<String>, path: impl Into<String>) -> TypeId {
        self.add(TypeNode::Named(NamedReference {
            name: name.into(),
            path: path.into(),
        }))
    }

    pub fn primitive(&mut self, primitive: Primitive) -> TypeId {
        self.add(TypeNode::Primitive(primitive))
    }

    /// Add a composite with no children yet; see [`TypeGraph::push_child`].
    pub fn composite(&mut self, kind: CompositeKind) -> TypeId {
        self.add(TypeNode::Composite {
            kind,
            children: Vec::new(),
        })
    }

    /// Append `child` to a composite node. No-op for leaf nodes.
    pub fn push_child(&mut self, parent: TypeId, child: TypeId) {
        if let Some(TypeNode::Composite { children, .. }) = self.nodes.get_mut(parent.0) {
            children.push(child);
        }
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: TypeId) -> &[TypeId] {
        match self.get(id) {
            Some(TypeNode::Composite { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Find the nearest named reference reachable from `id`.
///
/// Children are searched depth-first in declaration order and the first hit
/// wins, so `Union[List[Pet], Cat]` resolves to `Pet`.
pub fn resolve(graph: &TypeGraph, id: TypeId) -> Option<&NamedReference> {
    let mut visited = HashSet::new();
    resolve_inner(graph, id, &mut visited)
}

fn resolve_inner<'g>(
    graph: &'g TypeGraph,
    id: TypeId,
    visited: &mut HashSet<TypeId>,
) -> Option<&'g NamedReference> {
    if !visited.insert(id) {
        return None;
    }
    match graph.get(id)? {
        TypeNode::Named(reference) => Some(reference),
        TypeNode::Primitive(_) => None,
        TypeNode::Composite { children, .. } => children
            .iter()
            .find_map(|&child| resolve_inner(graph, child, visited)),
    }
}

/// Every import needed to spell the type rooted at `id`, in discovery order.
///
/// Named references contribute nothing here; the model import is added by the
/// import aggregator.
pub fn all_imports(graph: &TypeGraph, id: TypeId) -> Vec<ImportStatement> {
    let mut visited = HashSet::new();
    let mut imports = Vec::new();
    collect_imports(graph, id, &mut visited, &mut imports);
    imports
}

fn collect_imports(
    graph: &TypeGraph,
    id: TypeId,
    visited: &mut HashSet<TypeId>,
    imports: &mut Vec<ImportStatement>,
) {
    if !visited.insert(id) {
        return;
    }
    let direct = match graph.get(id) {
        Some(TypeNode::Primitive(primitive)) => primitive.imports(),
        Some(TypeNode::Composite { kind, children }) => composite_imports(*kind, children.len()),
        _ => Vec::new(),
    };
    for statement in direct {
        if !imports.contains(&statement) {
            imports.push(statement);
        }
    }
    for &child in graph.children(id) {
        collect_imports(graph, child, visited, imports);
    }
}

fn composite_imports(kind: CompositeKind, arity: usize) -> Vec<ImportStatement> {
    let symbol = match kind {
        CompositeKind::Array => "List",
        CompositeKind::Optional => "Optional",
        CompositeKind::Union if arity > 1 => "Union",
        CompositeKind::Map => "Dict",
        CompositeKind::Union | CompositeKind::AllOf => return Vec::new(),
    };
    vec![ImportStatement::new("typing", symbol)]
}

/// Python type hint for the type rooted at `id`. A cycle renders as `Any`.
pub fn type_hint(graph: &TypeGraph, id: TypeId) -> String {
    let mut visiting = HashSet::new();
    hint_inner(graph, id, &mut visiting)
}

fn hint_inner(graph: &TypeGraph, id: TypeId, visiting: &mut HashSet<TypeId>) -> String {
    if !visiting.insert(id) {
        return "Any".to_string();
    }
    let hint = match graph.get(id) {
        None => "Any".to_string(),
        Some(TypeNode::Named(reference)) => reference.name.clone(),
        Some(TypeNode::Primitive(primitive)) => primitive.type_hint().to_string(),
        Some(TypeNode::Composite { kind, children }) => {
            let inner: Vec<String> = children
                .iter()
                .map(|&child| hint_inner(graph, child, visiting))
                .collect();
            match (kind, inner.as_slice()) {
                (CompositeKind::Array, []) => "List".to_string(),
                (CompositeKind::Array, [item, ..]) => format!("List[{item}]"),
                (CompositeKind::Optional, []) => "Any".to_string(),
                (CompositeKind::Optional, [item, ..]) => format!("Optional[{item}]"),
                (CompositeKind::Map, []) => "Dict".to_string(),
                (CompositeKind::Map, [value, ..]) => format!("Dict[str, {value}]"),
                (CompositeKind::Union | CompositeKind::AllOf, []) => "Any".to_string(),
                (CompositeKind::Union | CompositeKind::AllOf, [only]) => only.clone(),
                (CompositeKind::AllOf, [first, ..]) => first.clone(),
                (CompositeKind::Union, members) => format!("Union[{}]", members.join(", ")),
            }
        }
    };
    // Only the current path counts as a cycle; siblings may share children.
    visiting.remove(&id);
    hint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest(graph: &mut TypeGraph, kind: CompositeKind, child: TypeId, depth: usize) -> TypeId {
        let mut current = child;
        for _ in 0..depth {
            let parent = graph.composite(kind);
            graph.push_child(parent, current);
            current = parent;
        }
        current
    }

    #[test]
    fn test_direct_reference_resolves_to_itself() {
        let mut graph = TypeGraph::new();
        let pet = graph.named("Pet", "#/components/schemas/Pet");
        assert_eq!(resolve(&graph, pet).map(|r| r.name.as_str()), Some("Pet"));
    }

    #[test]
    fn test_resolution_is_independent_of_depth() {
        for depth in [1, 2, 5, 20] {
            let mut graph = TypeGraph::new();
            let pet = graph.named("Pet", "#/components/schemas/Pet");
            let root = nest(&mut graph, CompositeKind::Array, pet, depth);
            assert_eq!(
                resolve(&graph, root).map(|r| r.name.as_str()),
                Some("Pet"),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_first_match_left_to_right_depth_first() {
        let mut graph = TypeGraph::new();
        let text = graph.primitive(Primitive::Str);
        let pet = graph.named("Pet", "#/components/schemas/Pet");
        let cat = graph.named("Cat", "#/components/schemas/Cat");
        let nested_pet = nest(&mut graph, CompositeKind::Array, pet, 3);

        let union = graph.composite(CompositeKind::Union);
        graph.push_child(union, text);
        graph.push_child(union, nested_pet);
        graph.push_child(union, cat);

        assert_eq!(resolve(&graph, union).map(|r| r.name.as_str()), Some("Pet"));
    }

    #[test]
    fn test_primitive_only_resolves_to_none() {
        let mut graph = TypeGraph::new();
        let text = graph.primitive(Primitive::Str);
        let number = graph.primitive(Primitive::Int);
        let union = graph.composite(CompositeKind::Union);
        graph.push_child(union, text);
        graph.push_child(union, number);
        let root = nest(&mut graph, CompositeKind::Optional, union, 2);

        assert!(resolve(&graph, text).is_none());
        assert!(resolve(&graph, root).is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = TypeGraph::new();
        let a = graph.composite(CompositeKind::Union);
        let b = graph.composite(CompositeKind::Array);
        graph.push_child(a, b);
        graph.push_child(b, a);

        assert!(resolve(&graph, a).is_none());
        assert_eq!(type_hint(&graph, a), "List[Any]");
        assert!(all_imports(&graph, a).contains(&ImportStatement::new("typing", "List")));

        let pet = graph.named("Pet", "#/components/schemas/Pet");
        graph.push_child(a, pet);
        assert_eq!(resolve(&graph, b).map(|r| r.name.as_str()), Some("Pet"));
    }

    #[test]
    fn test_type_hints() {
        let mut graph = TypeGraph::new();
        let pet = graph.named("Pet", "#/components/schemas/Pet");
        let when = graph.primitive(Primitive::DateTime);
        let list = nest(&mut graph, CompositeKind::Array, pet, 1);
        let union = graph.composite(CompositeKind::Union);
        graph.push_child(union, list);
        graph.push_child(union, when);
        let optional = nest(&mut graph, CompositeKind::Optional, union, 1);
        let map = nest(&mut graph, CompositeKind::Map, pet, 1);

        assert_eq!(
            type_hint(&graph, optional),
            "Optional[Union[List[Pet], datetime]]"
        );
        assert_eq!(type_hint(&graph, map), "Dict[str, Pet]");
    }

    #[test]
    fn test_shared_children_are_not_cycles() {
        let mut graph = TypeGraph::new();
        let pet = graph.named("Pet", "#/components/schemas/Pet");
        let union = graph.composite(CompositeKind::Union);
        graph.push_child(union, pet);
        graph.push_child(union, pet);
        assert_eq!(type_hint(&graph, union), "Union[Pet, Pet]");
    }

    #[test]
    fn test_all_imports_are_transitive() {
        let mut graph = TypeGraph::new();
        let id = graph.primitive(Primitive::Uuid);
        let when = graph.primitive(Primitive::Date);
        let union = graph.composite(CompositeKind::Union);
        graph.push_child(union, id);
        graph.push_child(union, when);
        let root = nest(&mut graph, CompositeKind::Array, union, 1);

        assert_eq!(
            all_imports(&graph, root),
            vec![
                ImportStatement::new("typing", "List"),
                ImportStatement::new("typing", "Union"),
                ImportStatement::new("uuid", "UUID"),
                ImportStatement::new("datetime", "date"),
            ]
        );
    }
}
