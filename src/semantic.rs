//! Per-file semantic index: categorizes a file's normalized captures into
//! definition tables, raw references, `type_bindings`, `type_members`, and
//! `function_collections`.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ids::{FilePath, Location, LocationKey, ScopeId, SymbolId, SymbolName, TypeId};

/// Import flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

/// A function/method signature's parameter list, kept as plain names.
/// Parameter types are tracked separately, per-location, in
/// `type_bindings`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<SymbolName>,
}

/// One kind of definition a symbol table entry can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Function {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
        is_default: bool,
        signature: Signature,
    },
    Variable {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    Class {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
        is_default: bool,
        methods: Vec<SymbolName>,
        properties: Vec<SymbolName>,
        extends: Vec<SymbolName>,
    },
    Interface {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
        methods: Vec<SymbolName>,
        properties: Vec<SymbolName>,
        extends: Vec<SymbolName>,
    },
    Enum {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    Namespace {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    TypeAlias {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    Import {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        import_path: SymbolName,
        import_kind: ImportKind,
        original_name: SymbolName,
        is_default: bool,
    },
    Parameter {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
    },
    Method {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
        signature: Signature,
    },
    Property {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    Field {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
        is_exported: bool,
    },
    EnumMember {
        symbol_id: SymbolId,
        name: SymbolName,
        location: Location,
        defining_scope_id: ScopeId,
    },
}

impl Definition {
    pub fn symbol_id(&self) -> &SymbolId {
        match self {
            Definition::Function { symbol_id, .. }
            | Definition::Variable { symbol_id, .. }
            | Definition::Class { symbol_id, .. }
            | Definition::Interface { symbol_id, .. }
            | Definition::Enum { symbol_id, .. }
            | Definition::Namespace { symbol_id, .. }
            | Definition::TypeAlias { symbol_id, .. }
            | Definition::Import { symbol_id, .. }
            | Definition::Parameter { symbol_id, .. }
            | Definition::Method { symbol_id, .. }
            | Definition::Property { symbol_id, .. }
            | Definition::Field { symbol_id, .. }
            | Definition::EnumMember { symbol_id, .. } => symbol_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Definition::Function { name, .. }
            | Definition::Variable { name, .. }
            | Definition::Class { name, .. }
            | Definition::Interface { name, .. }
            | Definition::Enum { name, .. }
            | Definition::Namespace { name, .. }
            | Definition::TypeAlias { name, .. }
            | Definition::Import { name, .. }
            | Definition::Parameter { name, .. }
            | Definition::Method { name, .. }
            | Definition::Property { name, .. }
            | Definition::Field { name, .. }
            | Definition::EnumMember { name, .. } => name,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Definition::Function { location, .. }
            | Definition::Variable { location, .. }
            | Definition::Class { location, .. }
            | Definition::Interface { location, .. }
            | Definition::Enum { location, .. }
            | Definition::Namespace { location, .. }
            | Definition::TypeAlias { location, .. }
            | Definition::Import { location, .. }
            | Definition::Parameter { location, .. }
            | Definition::Method { location, .. }
            | Definition::Property { location, .. }
            | Definition::Field { location, .. }
            | Definition::EnumMember { location, .. } => location,
        }
    }

    pub fn defining_scope_id(&self) -> &ScopeId {
        match self {
            Definition::Function {
                defining_scope_id, ..
            }
            | Definition::Variable {
                defining_scope_id, ..
            }
            | Definition::Class {
                defining_scope_id, ..
            }
            | Definition::Interface {
                defining_scope_id, ..
            }
            | Definition::Enum {
                defining_scope_id, ..
            }
            | Definition::Namespace {
                defining_scope_id, ..
            }
            | Definition::TypeAlias {
                defining_scope_id, ..
            }
            | Definition::Import {
                defining_scope_id, ..
            }
            | Definition::Parameter {
                defining_scope_id, ..
            }
            | Definition::Method {
                defining_scope_id, ..
            }
            | Definition::Property {
                defining_scope_id, ..
            }
            | Definition::Field {
                defining_scope_id, ..
            }
            | Definition::EnumMember {
                defining_scope_id, ..
            } => defining_scope_id,
        }
    }

    pub fn is_exported(&self) -> bool {
        match self {
            Definition::Function { is_exported, .. }
            | Definition::Variable { is_exported, .. }
            | Definition::Class { is_exported, .. }
            | Definition::Interface { is_exported, .. }
            | Definition::Enum { is_exported, .. }
            | Definition::Namespace { is_exported, .. }
            | Definition::TypeAlias { is_exported, .. }
            | Definition::Method { is_exported, .. }
            | Definition::Property { is_exported, .. }
            | Definition::Field { is_exported, .. } => *is_exported,
            Definition::Import { .. } | Definition::Parameter { .. } | Definition::EnumMember { .. } => false,
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            Definition::Function { is_default, .. }
            | Definition::Class { is_default, .. }
            | Definition::Import { is_default, .. } => *is_default,
            _ => false,
        }
    }

    pub fn extends(&self) -> &[SymbolName] {
        match self {
            Definition::Class { extends, .. } | Definition::Interface { extends, .. } => extends,
            _ => &[],
        }
    }
}

/// Reference kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Read,
    Call,
    Construct,
    MemberAccess,
    Type,
    Assignment,
    Return,
}

/// Call dispatch flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Function,
    Method,
    Constructor,
    Super,
}

/// Extra context a reference may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceContext {
    pub receiver_location: Option<Location>,
    pub property_chain: Vec<SymbolName>,
    pub assignment_source: Option<SymbolName>,
    pub assignment_target: Option<SymbolName>,
    pub construct_target: Option<SymbolName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub location: Location,
    pub scope_id: ScopeId,
    pub name: SymbolName,
    pub kind: ReferenceKind,
    pub call_type: Option<CallType>,
    pub context: ReferenceContext,
    pub is_optional_chain: bool,
}

/// Flattened members of a class/interface, plus its `extends` chain in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMembers {
    pub methods: IndexMap<SymbolName, SymbolId>,
    pub properties: IndexMap<SymbolName, SymbolId>,
    pub constructor: Option<SymbolId>,
    pub extends: Vec<SymbolName>,
}

/// A variable/constant whose initializer is an array/object of function
/// references, possibly with spreads of other collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionCollection {
    pub stored_functions: Vec<SymbolId>,
    pub stored_references: Vec<SymbolName>,
}

/// The per-file semantic index.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    pub file: Option<FilePath>,
    pub definitions: IndexMap<SymbolId, Definition>,
    pub references: Vec<Reference>,
    pub type_bindings: HashMap<LocationKey, SymbolName>,
    pub type_members: HashMap<TypeId, TypeMembers>,
    pub function_collections: IndexMap<SymbolId, FunctionCollection>,
}

impl SemanticIndex {
    pub fn new(file: FilePath) -> Self {
        Self {
            file: Some(file),
            ..Default::default()
        }
    }

    pub fn insert_definition(&mut self, def: Definition) {
        self.definitions.insert(def.symbol_id().clone(), def);
    }

    pub fn definitions_in_scope(&self, scope_id: &ScopeId) -> impl Iterator<Item = &Definition> {
        self.definitions
            .values()
            .filter(move |d| d.defining_scope_id() == scope_id)
    }

    pub fn imports_in_scope(&self, scope_id: &ScopeId) -> impl Iterator<Item = &Definition> {
        self.definitions_in_scope(scope_id)
            .filter(|d| matches!(d, Definition::Import { .. }))
    }

    /// Find the definition whose own location equals `key`, or, failing
    /// that, whose location is within 2 columns on the same line.
    pub fn definition_near_location(&self, key: &LocationKey) -> Option<&Definition> {
        if let Some(exact) = self.definitions.values().find(|d| &d.location().key() == key) {
            return Some(exact);
        }
        let (line, col) = parse_location_key_point(key)?;
        let mut best: Option<(&Definition, u32)> = None;
        for def in self.definitions.values() {
            if let Some(distance) = def.location().same_line_column_distance(line, col) {
                if distance <= 2 {
                    match best {
                        Some((_, best_distance)) if best_distance <= distance => {}
                        _ => best = Some((def, distance)),
                    }
                }
            }
        }
        if best.is_some() {
            tracing::debug!(key, "type binding resolved via near-match heuristic");
        }
        best.map(|(def, _)| def)
    }
}

/// Parse the `start_line`/`start_column` prefix out of a `LocationKey`
/// (`"{file}:{start_line}:{start_col}-{end_line}:{end_col}"`).
fn parse_location_key_point(key: &LocationKey) -> Option<(u32, u32)> {
    let dash = key.rfind('-')?;
    let (head, _) = key.split_at(dash);
    let mut parts = head.rsplitn(3, ':');
    let start_column: u32 = parts.next()?.parse().ok()?;
    let start_line: u32 = parts.next()?.parse().ok()?;
    Some((start_line, start_column))
}
