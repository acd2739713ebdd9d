//! Scope resolver index: per-scope `name → Resolver` maps implementing
//! lexical shadowing (local > imports > parent).

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::cache::ResolutionCache;
use crate::ids::{FilePath, ModulePath, ScopeId, SymbolId, SymbolName};
use crate::semantic::{Definition, ImportKind, SemanticIndex};
use crate::scope::ScopeTree;

/// A lazy, one-name, one-scope lookup, realized as a tagged enum rather
/// than a boxed closure. `Resolver` stays `Clone`/`Send`/`Sync` and
/// dispatches in one function (`resolve`) rather than invoking opaque
/// thunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// A definition local to this file; already known at construction time.
    Local(SymbolId),
    /// `import { name } from "source"` / `import name from "source"`:
    /// resolution is deferred to the Import/Export Chain Resolver.
    NamedImport {
        source_file: FilePath,
        original_name: SymbolName,
        import_kind: ImportKind,
    },
    /// `import * as name from "source"`: `name` itself resolves to the
    /// import symbol; member access on `name` goes through the type
    /// context's namespace-member path instead.
    NamespaceImport(SymbolId),
}

/// One scope's resolver map, plus which bound names are namespace imports
/// (so the Call Resolver can route `ns.member` calls correctly).
#[derive(Debug, Clone, Default)]
pub struct ScopeResolvers {
    pub resolvers: HashMap<SymbolName, Resolver>,
    pub namespace_bindings: HashMap<SymbolName, FilePath>,
}

/// The whole per-file (or whole-corpus, keyed the same way) Scope Resolver
/// Index: a map from scope to its resolved name table.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolverIndex {
    pub by_scope: IndexMap<ScopeId, ScopeResolvers>,
}

impl ScopeResolverIndex {
    /// Build (or rebuild) the entries for one file's scope tree, given its
    /// `SemanticIndex`. Recursion is root-down: each scope inherits its
    /// parent's already-overlaid map, then overlays imports, then local
    /// definitions (local wins).
    /// `resolve_path` maps one file's raw import-path text to the
    /// `FilePath` it denotes (module-path resolution); this index stores
    /// only resolved paths, never raw import text, so the resolve-time
    /// Import/Export Chain Resolver never has to re-derive it. The caller
    /// (the Corpus) closes over the importing file and its
    /// `ModuleResolutionConfig`. Unresolvable imports (target file not yet
    /// known) fall back to the raw text as a placeholder key; later file
    /// additions still won't find it, which is the expected behavior for
    /// late file additions under cache correctness.
    pub fn build_for_file(
        &mut self,
        tree: &ScopeTree,
        index: &SemanticIndex,
        resolve_path: &dyn Fn(&ModulePath) -> Option<FilePath>,
    ) {
        let Some(root) = tree.root.clone() else {
            return;
        };
        self.recurse(tree, index, &root, ScopeResolvers::default(), resolve_path);
    }

    fn recurse(
        &mut self,
        tree: &ScopeTree,
        index: &SemanticIndex,
        scope_id: &ScopeId,
        inherited: ScopeResolvers,
        resolve_path: &dyn Fn(&ModulePath) -> Option<FilePath>,
    ) {
        let mut current = inherited;

        for import_def in index.imports_in_scope(scope_id) {
            let Definition::Import {
                name,
                import_path,
                import_kind,
                original_name,
                symbol_id,
                ..
            } = import_def
            else {
                continue;
            };
            let module_path = ModulePath::new(import_path.clone());
            let source_file = resolve_path(&module_path).unwrap_or_else(|| FilePath::new(import_path.as_str()));
            match import_kind {
                ImportKind::Namespace => {
                    current
                        .resolvers
                        .insert(name.clone(), Resolver::NamespaceImport(symbol_id.clone()));
                    current
                        .namespace_bindings
                        .insert(name.clone(), source_file);
                }
                ImportKind::Named | ImportKind::Default => {
                    current.resolvers.insert(
                        name.clone(),
                        Resolver::NamedImport {
                            source_file,
                            original_name: original_name.clone(),
                            import_kind: *import_kind,
                        },
                    );
                }
            }
        }

        for def in index.definitions_in_scope(scope_id) {
            if matches!(def, Definition::Import { .. }) {
                continue;
            }
            current
                .resolvers
                .insert(def.name().to_string(), Resolver::Local(def.symbol_id().clone()));
        }

        let child_ids = tree
            .get(scope_id)
            .map(|s| s.child_ids.clone())
            .unwrap_or_default();

        self.by_scope.insert(scope_id.clone(), current.clone());

        for child in child_ids {
            self.recurse(tree, index, &child, current.clone(), resolve_path);
        }
    }

    /// Drop every scope entry belonging to `file` (looked up via
    /// `scope_to_file`, supplied by the caller since this index itself
    /// doesn't track file ownership (the Resolution Registry does).
    pub fn remove_scopes(&mut self, scope_ids: &[ScopeId]) {
        for id in scope_ids {
            self.by_scope.shift_remove(id);
        }
    }
}

/// Resolve one `(scope_id, name)` pair, consulting the cache first.
/// `resolve_export_chain` is injected by the caller (the Import/Export
/// Chain Resolver) so this module stays free of cross-file knowledge.
pub fn resolve(
    index: &ScopeResolverIndex,
    cache: &ResolutionCache,
    scope_id: &ScopeId,
    name: &SymbolName,
    mut resolve_export_chain: impl FnMut(&FilePath, &SymbolName, ImportKind) -> Option<SymbolId>,
) -> Option<SymbolId> {
    if let Some(cached) = cache.get(scope_id, name) {
        return Some(cached);
    }

    let resolver = index.by_scope.get(scope_id)?.resolvers.get(name)?;
    let result = match resolver {
        Resolver::Local(id) => Some(id.clone()),
        Resolver::NamespaceImport(id) => Some(id.clone()),
        Resolver::NamedImport {
            source_file,
            original_name,
            import_kind,
        } => resolve_export_chain(source_file, original_name, *import_kind),
    };

    if let Some(ref id) = result {
        cache.set(scope_id.clone(), name.clone(), id.clone());
    }
    result
}
