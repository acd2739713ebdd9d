//! Resolution registry: immutable-state pipeline driver. State transitions
//! are pure functions returning a new `ResolutionState`; queries are pure
//! reads over the current snapshot.

use std::collections::{HashMap, HashSet};

use crate::calls::CallReference;
use crate::ids::{FilePath, ScopeId, SymbolId, SymbolName};
use crate::reachability::IndirectReachabilityEntry;

/// Immutable snapshot of all resolution state.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    pub resolutions_by_scope: HashMap<ScopeId, HashMap<SymbolName, SymbolId>>,
    pub scope_to_file: HashMap<ScopeId, FilePath>,
    pub resolved_calls_by_file: HashMap<FilePath, Vec<CallReference>>,
    pub calls_by_caller_scope: HashMap<ScopeId, Vec<CallReference>>,
    pub indirect_reachability: HashMap<SymbolId, IndirectReachabilityEntry>,
}

/// The result of Phase 1 (`resolve_names`) for one update cycle: which
/// scopes got which resolutions, and which file each new scope belongs to.
#[derive(Debug, Clone, Default)]
pub struct NameResolutionResult {
    pub resolutions_by_scope: HashMap<ScopeId, HashMap<SymbolName, SymbolId>>,
    pub scope_to_file: HashMap<ScopeId, FilePath>,
}

/// The result of Phase 2 (`resolve_calls_for_files`) for one update cycle.
#[derive(Debug, Clone, Default)]
pub struct CallResolutionResult {
    pub resolved_calls_by_file: HashMap<FilePath, Vec<CallReference>>,
    pub calls_by_caller_scope: HashMap<ScopeId, Vec<CallReference>>,
    pub indirect_reachability: HashMap<SymbolId, IndirectReachabilityEntry>,
}

/// Drop all state keyed under `file`: scopes whose `scope_to_file == file`,
/// `resolved_calls_by_file[file]`, and indirect entries whose
/// `read_location.file` is `file`.
pub fn remove_file(state: &ResolutionState, file: &FilePath) -> ResolutionState {
    let mut next = state.clone();

    let dead_scopes: Vec<ScopeId> = next
        .scope_to_file
        .iter()
        .filter(|(_, f)| *f == file)
        .map(|(id, _)| id.clone())
        .collect();
    for scope_id in &dead_scopes {
        next.scope_to_file.remove(scope_id);
        next.resolutions_by_scope.remove(scope_id);
        next.calls_by_caller_scope.remove(scope_id);
    }

    next.resolved_calls_by_file.remove(file);

    next.indirect_reachability.retain(|_, entry| {
        let crate::reachability::ReachabilityReason::CollectionRead { read_location, .. } = &entry.reason;
        &read_location.file != file
    });

    next
}

/// Merge per-scope resolution maps and `scope_to_file`.
pub fn apply_name_resolution(state: &ResolutionState, result: NameResolutionResult) -> ResolutionState {
    let mut next = state.clone();
    for (scope_id, file) in result.scope_to_file {
        next.scope_to_file.insert(scope_id, file);
    }
    for (scope_id, resolutions) in result.resolutions_by_scope {
        next.resolutions_by_scope.insert(scope_id, resolutions);
    }
    next
}

/// Merge resolved calls, caller-indexed calls, and indirect reachability.
pub fn apply_call_resolution(state: &ResolutionState, result: CallResolutionResult) -> ResolutionState {
    let mut next = state.clone();
    for (file, calls) in result.resolved_calls_by_file {
        next.resolved_calls_by_file.insert(file, calls);
    }
    for (scope_id, calls) in result.calls_by_caller_scope {
        next.calls_by_caller_scope.insert(scope_id, calls);
    }
    for (symbol_id, entry) in result.indirect_reachability {
        next.indirect_reachability.insert(symbol_id, entry);
    }
    next
}

/// `resolve(scope_id, name)`, reading the already-resolved snapshot
/// directly (the live, cache-backed resolve lives in `resolver::resolve`;
/// this is the registry's own query surface over committed state).
pub fn resolve(state: &ResolutionState, scope_id: &ScopeId, name: &SymbolName) -> Option<SymbolId> {
    state.resolutions_by_scope.get(scope_id)?.get(name).cloned()
}

pub fn get_calls_by_caller_scope<'a>(
    state: &'a ResolutionState,
    caller_scope_id: &ScopeId,
) -> &'a [CallReference] {
    state
        .calls_by_caller_scope
        .get(caller_scope_id)
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

/// Union of all resolution targets plus indirect reachability keys.
pub fn get_all_referenced_symbols(state: &ResolutionState) -> HashSet<SymbolId> {
    let mut out: HashSet<SymbolId> = state
        .resolutions_by_scope
        .values()
        .flat_map(|m| m.values().cloned())
        .collect();
    out.extend(
        state
            .resolved_calls_by_file
            .values()
            .flatten()
            .filter_map(|c| c.resolution.clone()),
    );
    out.extend(state.indirect_reachability.keys().cloned());
    out
}

pub fn get_indirect_reachability<'a>(
    state: &'a ResolutionState,
) -> &'a HashMap<SymbolId, IndirectReachabilityEntry> {
    &state.indirect_reachability
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{make_scope_id, make_symbol_id, DefinitionKind, Location, ScopeKind};

    fn scope(file: &str) -> ScopeId {
        make_scope_id(ScopeKind::Module, &Location::new(FilePath::new(file), 1, 0, 10, 0))
    }

    #[test]
    fn remove_file_drops_only_that_files_scopes() {
        let mut state = ResolutionState::default();
        let scope_a = scope("a.ts");
        let scope_b = scope("b.ts");
        state.scope_to_file.insert(scope_a.clone(), FilePath::new("a.ts"));
        state.scope_to_file.insert(scope_b.clone(), FilePath::new("b.ts"));
        state
            .resolutions_by_scope
            .insert(scope_a.clone(), HashMap::new());
        state
            .resolutions_by_scope
            .insert(scope_b.clone(), HashMap::new());

        let next = remove_file(&state, &FilePath::new("a.ts"));
        assert!(!next.scope_to_file.contains_key(&scope_a));
        assert!(next.scope_to_file.contains_key(&scope_b));
        assert!(!next.resolutions_by_scope.contains_key(&scope_a));
    }

    #[test]
    fn apply_name_resolution_merges_without_losing_existing_entries() {
        let state = ResolutionState::default();
        let scope_a = scope("a.ts");
        let mut resolutions = HashMap::new();
        let id = make_symbol_id(
            DefinitionKind::Function,
            "f",
            &Location::new(FilePath::new("a.ts"), 2, 0, 2, 10),
        );
        resolutions.insert("f".to_string(), id.clone());

        let result = NameResolutionResult {
            resolutions_by_scope: HashMap::from([(scope_a.clone(), resolutions)]),
            scope_to_file: HashMap::from([(scope_a.clone(), FilePath::new("a.ts"))]),
        };
        let next = apply_name_resolution(&state, result);
        assert_eq!(resolve(&next, &scope_a, &"f".to_string()), Some(id));
    }

    #[test]
    fn get_all_referenced_symbols_unions_resolutions_and_reachability() {
        let mut state = ResolutionState::default();
        let scope_a = scope("a.ts");
        let resolved = make_symbol_id(
            DefinitionKind::Function,
            "f",
            &Location::new(FilePath::new("a.ts"), 2, 0, 2, 10),
        );
        state
            .resolutions_by_scope
            .insert(scope_a, HashMap::from([("f".to_string(), resolved.clone())]));

        let reachable = make_symbol_id(
            DefinitionKind::Function,
            "handler",
            &Location::new(FilePath::new("a.ts"), 5, 0, 5, 10),
        );
        state.indirect_reachability.insert(
            reachable.clone(),
            IndirectReachabilityEntry {
                reason: crate::reachability::ReachabilityReason::CollectionRead {
                    collection_id: resolved.clone(),
                    read_location: Location::new(FilePath::new("a.ts"), 6, 0, 6, 5),
                },
            },
        );

        let all = get_all_referenced_symbols(&state);
        assert!(all.contains(&resolved));
        assert!(all.contains(&reachable));
    }
}
