//! Scope processor: builds a per-file lexical scope tree from the
//! normalized capture stream.

use indexmap::IndexMap;

use crate::capture::CaptureNode;
use crate::error::ScopeGraphError;
use crate::ids::{make_scope_id, FilePath, Location, ScopeId, ScopeKind, SymbolName};

/// A node of the per-file scope tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalScope {
    pub id: ScopeId,
    pub parent_id: Option<ScopeId>,
    pub name: Option<SymbolName>,
    pub kind: ScopeKind,
    pub location: Location,
    pub child_ids: Vec<ScopeId>,
}

/// Map the capture entity text to the scope kind it creates. Returns `None`
/// for captures that don't create a scope at all.
fn entity_to_scope_kind(category: &str, entity: &str) -> Option<ScopeKind> {
    match entity {
        "module" | "namespace" => Some(ScopeKind::Module),
        "class" | "interface" | "enum" => Some(ScopeKind::Class),
        "function" | "closure" => Some(ScopeKind::Function),
        "method" => Some(ScopeKind::Method),
        "constructor" => Some(ScopeKind::Constructor),
        "block" => Some(ScopeKind::Block),
        _ if category == "scope" => Some(ScopeKind::Block),
        _ => None,
    }
}

fn is_scope_creating(node: &CaptureNode) -> bool {
    node.category == "scope" || entity_to_scope_kind(&node.category, &node.entity).is_some()
}

/// The per-file output of the Scope Processor.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    pub scopes: IndexMap<ScopeId, LexicalScope>,
    pub root: Option<ScopeId>,
}

impl ScopeTree {
    /// The deepest (smallest-area) scope whose extent contains `location`.
    /// A linear scan is fine here, since scope counts per file are small.
    pub fn get_scope_id(&self, location: &Location) -> Option<ScopeId> {
        let mut best: Option<&LexicalScope> = None;
        for scope in self.scopes.values() {
            if !scope.location.contains(location) {
                continue;
            }
            match best {
                None => best = Some(scope),
                Some(current) if scope_area(&scope.location) < scope_area(&current.location) => {
                    best = Some(scope)
                }
                _ => {}
            }
        }
        best.map(|s| s.id.clone())
    }

    pub fn get(&self, id: &ScopeId) -> Option<&LexicalScope> {
        self.scopes.get(id)
    }
}

/// Crude area proxy used only to pick the *smallest* containing scope when
/// several contain the same location (nested scopes always differ in span).
fn scope_area(location: &Location) -> (u32, u32) {
    let lines = location.end_line.saturating_sub(location.start_line);
    let cols = if lines == 0 {
        location.end_column.saturating_sub(location.start_column)
    } else {
        u32::MAX
    };
    (lines, cols)
}

/// Build the scope tree for one file from its already-normalized, already
/// position-sorted capture stream, plus the file's own extent.
///
/// `file_end_line`/`file_end_column` give the module root's span: a root
/// module scope spans from (1, 1) to (file_lines, file_end_column).
pub fn build_scope_tree(
    file: &FilePath,
    captures: &[CaptureNode],
    file_end_line: u32,
    file_end_column: u32,
) -> Result<ScopeTree, ScopeGraphError> {
    // The root span above is quoted with a 1-based start column, but
    // locations use 0-based columns, so the root's start column is 0 to
    // actually contain every other capture.
    let root_location = Location::new(file.clone(), 1, 0, file_end_line, file_end_column);
    let root_id = make_scope_id(ScopeKind::Module, &root_location);
    let mut tree = ScopeTree::default();
    tree.scopes.insert(
        root_id.clone(),
        LexicalScope {
            id: root_id.clone(),
            parent_id: None,
            name: None,
            kind: ScopeKind::Module,
            location: root_location,
            child_ids: Vec::new(),
        },
    );
    tree.root = Some(root_id.clone());

    for node in captures {
        if !is_scope_creating(node) {
            continue;
        }
        let Some(kind) = entity_to_scope_kind(&node.category, &node.entity) else {
            continue;
        };
        if node.text.trim().is_empty() && kind != ScopeKind::Block {
            return Err(ScopeGraphError::MissingSymbolName {
                location: node.location.clone(),
            });
        }

        let scope_id = make_scope_id(kind, &node.location);
        if tree.scopes.contains_key(&scope_id) {
            // Same (kind, location) capture seen twice; idempotent, skip.
            continue;
        }

        let parent_id = smallest_containing_scope(&tree, &node.location).unwrap_or_else(|| root_id.clone());

        let name = if kind == ScopeKind::Block {
            None
        } else {
            Some(node.text.clone())
        };

        tree.scopes.insert(
            scope_id.clone(),
            LexicalScope {
                id: scope_id.clone(),
                parent_id: Some(parent_id.clone()),
                name,
                kind,
                location: node.location.clone(),
                child_ids: Vec::new(),
            },
        );
        if let Some(parent) = tree.scopes.get_mut(&parent_id) {
            parent.child_ids.push(scope_id);
        }
    }

    validate(&tree, file)?;
    Ok(tree)
}

fn smallest_containing_scope(tree: &ScopeTree, location: &Location) -> Option<ScopeId> {
    let mut best: Option<&LexicalScope> = None;
    for scope in tree.scopes.values() {
        if scope.location == *location {
            continue;
        }
        if !scope.location.contains(location) {
            continue;
        }
        match best {
            None => best = Some(scope),
            Some(current) if scope_area(&scope.location) < scope_area(&current.location) => {
                best = Some(scope)
            }
            _ => {}
        }
    }
    best.map(|s| s.id.clone())
}

/// Every non-root scope's parent location must contain the child's, and the
/// child id must be registered in the parent's `child_ids`. Exactly one
/// module root per file.
fn validate(tree: &ScopeTree, file: &FilePath) -> Result<(), ScopeGraphError> {
    let root_count = tree
        .scopes
        .values()
        .filter(|s| s.parent_id.is_none())
        .count();
    if root_count != 1 {
        return Err(ScopeGraphError::InvalidScopeTree {
            file: file.clone(),
            reason: format!("expected exactly one module root, found {root_count}"),
        });
    }
    for scope in tree.scopes.values() {
        if let Some(parent_id) = &scope.parent_id {
            let parent = tree.scopes.get(parent_id).ok_or_else(|| ScopeGraphError::InvalidScopeTree {
                file: file.clone(),
                reason: format!("scope {} has dangling parent {}", scope.id, parent_id),
            })?;
            if !parent.location.contains(&scope.location) {
                return Err(ScopeGraphError::InvalidScopeTree {
                    file: file.clone(),
                    reason: format!(
                        "scope {} is not contained by its parent {}",
                        scope.id, parent_id
                    ),
                });
            }
            if !parent.child_ids.contains(&scope.id) {
                return Err(ScopeGraphError::InvalidScopeTree {
                    file: file.clone(),
                    reason: format!("scope {} missing from parent {}'s child_ids", scope.id, parent_id),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(category: &str, entity: &str, text: &str, sl: u32, sc: u32, el: u32, ec: u32) -> CaptureNode {
        CaptureNode {
            category: category.to_string(),
            entity: entity.to_string(),
            qualifier: None,
            location: Location::new(FilePath::new("t.js"), sl, sc, el, ec),
            text: text.to_string(),
        }
    }

    #[test]
    fn single_module_root_with_no_captures() {
        let file = FilePath::new("t.js");
        let tree = build_scope_tree(&file, &[], 1, 40).unwrap();
        assert_eq!(tree.scopes.len(), 1);
        assert_eq!(tree.root, Some(tree.scopes.keys().next().unwrap().clone()));
    }

    #[test]
    fn nested_function_scope_picks_smallest_containing_parent() {
        let file = FilePath::new("t.js");
        let outer = node("scope", "function", "outer", 1, 0, 1, 60);
        let inner = node("scope", "function", "inner", 1, 20, 1, 40);
        let tree = build_scope_tree(&file, &[outer.clone(), inner.clone()], 1, 60).unwrap();

        let inner_id = make_scope_id(ScopeKind::Function, &inner.location);
        let outer_id = make_scope_id(ScopeKind::Function, &outer.location);
        let inner_scope = tree.get(&inner_id).unwrap();
        assert_eq!(inner_scope.parent_id.as_ref(), Some(&outer_id));

        let outer_scope = tree.get(&outer_id).unwrap();
        assert!(outer_scope.child_ids.contains(&inner_id));
    }

    #[test]
    fn get_scope_id_returns_deepest_match() {
        let file = FilePath::new("t.js");
        let outer = node("scope", "function", "outer", 1, 0, 1, 60);
        let inner = node("scope", "function", "inner", 1, 20, 1, 40);
        let tree = build_scope_tree(&file, &[outer.clone(), inner.clone()], 1, 60).unwrap();

        let inner_id = make_scope_id(ScopeKind::Function, &inner.location);
        let point = Location::new(file, 1, 25, 1, 25);
        assert_eq!(tree.get_scope_id(&point), Some(inner_id));
    }

    #[test]
    fn missing_name_on_non_block_scope_is_fatal() {
        let file = FilePath::new("t.js");
        let bad = node("scope", "function", "", 1, 0, 1, 10);
        let result = build_scope_tree(&file, &[bad], 1, 10);
        assert!(matches!(result, Err(ScopeGraphError::MissingSymbolName { .. })));
    }

    #[test]
    fn non_scope_capture_is_ignored() {
        let file = FilePath::new("t.js");
        let reference = node("reference", "call", "foo", 1, 0, 1, 5);
        let tree = build_scope_tree(&file, &[reference], 1, 40).unwrap();
        assert_eq!(tree.scopes.len(), 1);
    }
}
