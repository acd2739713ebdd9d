//! Opaque, hashable, string-serializable identifiers for the resolution engine.
//!
//! Every id in this module is a thin newtype over an interned string built by
//! deterministically encoding its defining tuple. Encoding as a string
//! (rather than a numeric hash) makes round-tripping trivial and keeps ids
//! stable across process restarts and file processing order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Canonical path of a source file, as known to the corpus.
///
/// Not `PathBuf`: the engine never touches the filesystem, so this is an
/// opaque corpus key, not an OS path. Cheaply clonable via `Arc<str>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FilePath(Arc<str>);

impl FilePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

/// A source span: 1-based lines, 0-based columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: FilePath,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(
        file: FilePath,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            file,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Point-wise containment: `self` contains `other` iff `other` starts no
    /// earlier and ends no later, with column comparisons on boundary lines.
    ///
    /// This is the containment rule used to find a scope's parent and the
    /// invariant every scope tree must satisfy against its parent.
    pub fn contains(&self, other: &Location) -> bool {
        if self.file != other.file {
            return false;
        }
        let starts_ok = (other.start_line, other.start_column) >= (self.start_line, self.start_column);
        let ends_ok = (other.end_line, other.end_column) <= (self.end_line, self.end_column);
        starts_ok && ends_ok
    }

    /// Whether a single point falls within this location's extent.
    pub fn contains_point(&self, line: u32, column: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && column < self.start_column {
            return false;
        }
        if line == self.end_line && column > self.end_column {
            return false;
        }
        true
    }

    /// Deterministic string key for this location, used both as the
    /// canonical `LocationKey` and as the basis for every id's encoding.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}-{}:{}",
            self.file, self.start_line, self.start_column, self.end_line, self.end_column
        )
    }

    /// Approximate distance in columns, same line only. Used by the type
    /// context's "near match" heuristic.
    pub fn same_line_column_distance(&self, line: u32, column: u32) -> Option<u32> {
        if self.start_line != line {
            return None;
        }
        Some(self.start_column.abs_diff(column))
    }
}

pub type LocationKey = String;

macro_rules! string_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn from_encoded(encoded: impl AsRef<str>) -> Self {
                Self(Arc::from(encoded.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ScopeId, "Encoding of `(scope_type, location)`.");
string_id!(SymbolId, "Encoding of `(kind, file_path, name, location)`, globally unique.");
string_id!(TypeId, "Encoding of `(category, name, location)`, a namespace separate from `SymbolId`.");

/// The textual path inside an import statement, e.g. `./util`, `../a/b`,
/// `app.services.auth`. Kept distinct from `FilePath`: a `ModulePath` is
/// pre-resolution text, a `FilePath` is a resolved corpus key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of leading relative dots (`.`, `..`, `...`) for TS/JS/Python
    /// relative imports. Zero for absolute/bare paths.
    pub fn leading_dot_count(&self) -> usize {
        self.0.chars().take_while(|&c| c == '.').count()
    }

    pub fn is_relative(&self) -> bool {
        self.0.starts_with('.')
    }
}

/// The raw identifier text of a symbol reference or definition.
pub type SymbolName = String;

/// The kind of lexical scope a `LexicalScope` node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    Module,
    Class,
    Function,
    Method,
    Constructor,
    Block,
    Closure,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
            ScopeKind::Method => "method",
            ScopeKind::Constructor => "constructor",
            ScopeKind::Block => "block",
            ScopeKind::Closure => "closure",
        }
    }
}

/// Build a `ScopeId` from its defining tuple.
pub fn make_scope_id(kind: ScopeKind, location: &Location) -> ScopeId {
    ScopeId::from_encoded(format!("scope:{}:{}", kind.as_str(), location.key()))
}

/// Definition kinds, one per variant a symbol table entry can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefinitionKind {
    Function,
    Variable,
    Class,
    Interface,
    Enum,
    Namespace,
    TypeAlias,
    Import,
    Parameter,
    Method,
    Property,
    Field,
    EnumMember,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::Variable => "variable",
            DefinitionKind::Class => "class",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Enum => "enum",
            DefinitionKind::Namespace => "namespace",
            DefinitionKind::TypeAlias => "type_alias",
            DefinitionKind::Import => "import",
            DefinitionKind::Parameter => "parameter",
            DefinitionKind::Method => "method",
            DefinitionKind::Property => "property",
            DefinitionKind::Field => "field",
            DefinitionKind::EnumMember => "enum_member",
        }
    }
}

/// Build a `SymbolId` from its defining tuple.
pub fn make_symbol_id(kind: DefinitionKind, name: &str, location: &Location) -> SymbolId {
    SymbolId::from_encoded(format!("sym:{}:{}:{}", kind.as_str(), name, location.key()))
}

/// Type-id categories. Kept as a simple string rather than an enum since
/// callers pass arbitrary category text from the capture schema's
/// type-reference vocabulary (interface, class, enum, builtin, ...).
pub fn make_type_id(category: &str, name: &str, location: &Location) -> TypeId {
    TypeId::from_encoded(format!("type:{}:{}:{}", category, name, location.key()))
}

/// A synthetic id for a built-in type name with no backing definition
/// (`string`, `number`, `Array`, ...).
pub fn make_builtin_type_id(name: &str) -> TypeId {
    TypeId::from_encoded(format!("builtin:{name}"))
}
