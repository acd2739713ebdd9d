//! Indirect reachability: marks functions stored in "collections" as
//! reachable when the collection is read.

use std::collections::HashSet;

use crate::ids::{Location, SymbolId};
use crate::semantic::FunctionCollection;

/// Why a symbol was marked indirectly reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectReachabilityEntry {
    pub reason: ReachabilityReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachabilityReason {
    CollectionRead {
        collection_id: SymbolId,
        read_location: Location,
    },
}

/// Expand one function collection into the full set of functions it makes
/// reachable, recursively resolving nested collections referenced by name
/// (`stored_references`, used for spreads). `resolve_collection` looks up
/// another collection by the name it was stored under in the reading
/// collection's defining scope; `None` means that name isn't itself a
/// collection (e.g. it's a plain function, already counted directly).
///
/// Cycle-guarded by a visited set of collection `SymbolId`s, so expansion
/// always terminates in bounded time even with mutually-referencing
/// collections.
pub fn expand_collection(
    collection_id: &SymbolId,
    collections: &impl Fn(&SymbolId) -> Option<FunctionCollection>,
    resolve_stored_reference: &impl Fn(&str) -> Option<SymbolId>,
) -> Vec<SymbolId> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    expand_inner(collection_id, collections, resolve_stored_reference, &mut visited, &mut out);
    out
}

fn expand_inner(
    collection_id: &SymbolId,
    collections: &impl Fn(&SymbolId) -> Option<FunctionCollection>,
    resolve_stored_reference: &impl Fn(&str) -> Option<SymbolId>,
    visited: &mut HashSet<SymbolId>,
    out: &mut Vec<SymbolId>,
) {
    if !visited.insert(collection_id.clone()) {
        return;
    }
    let Some(collection) = collections(collection_id) else {
        return;
    };
    out.extend(collection.stored_functions.iter().cloned());

    for reference_name in &collection.stored_references {
        let Some(referenced_id) = resolve_stored_reference(reference_name) else {
            continue;
        };
        if let Some(nested) = collections(&referenced_id) {
            let _ = nested;
            expand_inner(&referenced_id, collections, resolve_stored_reference, visited, out);
        } else {
            // A plain function stored via spread of a non-collection name.
            out.push(referenced_id);
        }
    }
}

/// Build the reachability entries produced when `collection_id` is read at
/// `read_location` (a `variable_reference`/`read` trigger).
pub fn reachability_from_read(
    collection_id: &SymbolId,
    read_location: Location,
    collections: &impl Fn(&SymbolId) -> Option<FunctionCollection>,
    resolve_stored_reference: &impl Fn(&str) -> Option<SymbolId>,
) -> Vec<(SymbolId, IndirectReachabilityEntry)> {
    expand_collection(collection_id, collections, resolve_stored_reference)
        .into_iter()
        .map(|function_id| {
            (
                function_id,
                IndirectReachabilityEntry {
                    reason: ReachabilityReason::CollectionRead {
                        collection_id: collection_id.clone(),
                        read_location: read_location.clone(),
                    },
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{make_symbol_id, DefinitionKind, FilePath};
    use std::collections::HashMap;

    fn loc(n: u32) -> Location {
        Location::new(FilePath::new("t.js"), n, 0, n, 10)
    }

    #[test]
    fn expand_collection_includes_direct_functions() {
        let handlers_id = make_symbol_id(DefinitionKind::Variable, "HANDLERS", &loc(3));
        let handler_a = make_symbol_id(DefinitionKind::Function, "handlerA", &loc(1));
        let handler_b = make_symbol_id(DefinitionKind::Function, "handlerB", &loc(2));

        let mut store = HashMap::new();
        store.insert(
            handlers_id.clone(),
            FunctionCollection {
                stored_functions: vec![handler_a.clone(), handler_b.clone()],
                stored_references: vec![],
            },
        );

        let collections = |id: &SymbolId| store.get(id).cloned();
        let resolve_ref = |_: &str| None;

        let result = expand_collection(&handlers_id, &collections, &resolve_ref);
        assert_eq!(result.len(), 2);
        assert!(result.contains(&handler_a));
        assert!(result.contains(&handler_b));
    }

    #[test]
    fn expand_collection_follows_spread_of_nested_collection() {
        let outer_id = make_symbol_id(DefinitionKind::Variable, "ALL", &loc(10));
        let inner_id = make_symbol_id(DefinitionKind::Variable, "CORE", &loc(11));
        let handler = make_symbol_id(DefinitionKind::Function, "handler", &loc(1));

        let mut store = HashMap::new();
        store.insert(
            outer_id.clone(),
            FunctionCollection {
                stored_functions: vec![],
                stored_references: vec!["CORE".to_string()],
            },
        );
        store.insert(
            inner_id.clone(),
            FunctionCollection {
                stored_functions: vec![handler.clone()],
                stored_references: vec![],
            },
        );

        let collections = |id: &SymbolId| store.get(id).cloned();
        let resolve_ref = |name: &str| (name == "CORE").then(|| inner_id.clone());

        let result = expand_collection(&outer_id, &collections, &resolve_ref);
        assert_eq!(result, vec![handler]);
    }

    #[test]
    fn expand_collection_self_reference_terminates() {
        let id = make_symbol_id(DefinitionKind::Variable, "SELF_REF", &loc(1));
        let mut store = HashMap::new();
        store.insert(
            id.clone(),
            FunctionCollection {
                stored_functions: vec![],
                stored_references: vec!["SELF_REF".to_string()],
            },
        );
        let collections = |k: &SymbolId| store.get(k).cloned();
        let id_clone = id.clone();
        let resolve_ref = move |name: &str| (name == "SELF_REF").then(|| id_clone.clone());

        let result = expand_collection(&id, &collections, &resolve_ref);
        assert!(result.is_empty());
    }
}
