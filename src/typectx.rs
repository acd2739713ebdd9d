//! Type context: `symbol → type_symbol` and
//! `type_symbol → (member_name → member_symbol)` with an inheritance walk.
//!
//! Built once per resolve-calls phase from every file's `SemanticIndex`,
//! the Scope Resolver Index, and the shared cache. `TypeContext` itself
//! holds only the resulting maps, not a live reference to any of those.

use std::collections::{HashMap, HashSet};

use crate::ids::{make_builtin_type_id, SymbolId, SymbolName, TypeId};
use crate::semantic::TypeMembers;

const BUILTIN_NAMES: &[&str] = &[
    "string", "number", "boolean", "null", "undefined", "object", "Array", "Promise", "Map", "Set",
    "any", "void", "unknown", "int", "float", "str", "bool", "dict", "list", "tuple", "None",
];

/// A type name as it appears in a `type_bindings`/annotation slot, after
/// stripping qualifiers (`[]`, `|`, `<...>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTypeName {
    /// A plain, possibly-generic name with its base extracted
    /// (`Array<Foo>` → `Array`); the argument list is ignored for lookup
    /// purposes.
    Base(SymbolName),
    /// `[]`-suffixed array type; the element type name is kept, but only
    /// the shape is recognized, not resolved into the element.
    Array(SymbolName),
    /// Top-level `|` union; always unresolved (returns null).
    Union,
}

/// Parse a raw type-annotation string: strip `[]` suffix to get an array,
/// split on top-level `|` to get a union, and for `Name<...>` extract the
/// base name.
pub fn parse_type_name(raw: &str) -> ParsedTypeName {
    let trimmed = raw.trim();
    if trimmed.contains('|') {
        return ParsedTypeName::Union;
    }
    if let Some(base) = trimmed.strip_suffix("[]") {
        return ParsedTypeName::Array(extract_generic_base(base));
    }
    ParsedTypeName::Base(extract_generic_base(trimmed))
}

fn extract_generic_base(raw: &str) -> SymbolName {
    match raw.find('<') {
        Some(idx) => raw[..idx].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// The built type context, holding the symbol-type and type-member maps.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    symbol_types: HashMap<SymbolId, SymbolId>,
    type_members: HashMap<TypeId, TypeMembers>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_symbol_type(&mut self, symbol_id: SymbolId, type_symbol_id: SymbolId) {
        self.symbol_types.insert(symbol_id, type_symbol_id);
    }

    pub fn insert_type_members(&mut self, type_id: TypeId, members: TypeMembers) {
        self.type_members.insert(type_id, members);
    }

    /// The type of a variable/parameter/field/function-return.
    pub fn get_symbol_type(&self, symbol_id: &SymbolId) -> Option<SymbolId> {
        self.symbol_types.get(symbol_id).cloned()
    }

    /// Direct member lookup falling back through `extends`, in declaration
    /// order (first parent wins on a diamond). Cycles are broken by a
    /// visited set of type ids.
    pub fn get_type_member(&self, type_id: &TypeId, name: &SymbolName) -> Option<SymbolId> {
        let mut visited = HashSet::new();
        self.get_type_member_inner(type_id, name, &mut visited)
    }

    fn get_type_member_inner(
        &self,
        type_id: &TypeId,
        name: &SymbolName,
        visited: &mut HashSet<TypeId>,
    ) -> Option<SymbolId> {
        if !visited.insert(type_id.clone()) {
            return None;
        }
        let members = self.type_members.get(type_id)?;
        if let Some(id) = members.methods.get(name).or_else(|| members.properties.get(name)) {
            return Some(id.clone());
        }
        for parent_name in &members.extends {
            if let Some(parent_id) = self.type_id_by_name(parent_name) {
                if let Some(found) = self.get_type_member_inner(&parent_id, name, visited) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Direct members only (debug API).
    pub fn get_type_members(&self, type_id: &TypeId) -> HashMap<SymbolName, SymbolId> {
        let Some(members) = self.type_members.get(type_id) else {
            return HashMap::new();
        };
        let mut out = HashMap::new();
        for (name, id) in members.methods.iter().chain(members.properties.iter()) {
            out.entry(name.clone()).or_insert_with(|| id.clone());
        }
        out
    }

    /// `type_members` is keyed by `TypeId`, but `extends` stores plain
    /// names, so this resolves a parent name to its `TypeId` by linear
    /// scan over the (small) set of known types sharing that name.
    /// Builtins never appear here since they carry no members.
    fn type_id_by_name(&self, name: &SymbolName) -> Option<TypeId> {
        self.type_members
            .keys()
            .find(|id| id.as_str().contains(&format!(":{name}:")))
            .cloned()
    }

    /// Resolve a builtin type name to its synthetic id, or `None` if `name`
    /// isn't one of the recognized primitives.
    pub fn builtin_type_id(name: &SymbolName) -> Option<TypeId> {
        BUILTIN_NAMES.contains(&name.as_str()).then(|| make_builtin_type_id(name))
    }
}
