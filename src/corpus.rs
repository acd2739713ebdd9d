//! Corpus: owns every file's `SemanticIndex` and scope tree, and drives the
//! per-file update pipeline: scope processor + semantic index build, then
//! Scope Resolver Index rebuild, then Phase 1 `resolve_names`, then Type
//! Context rebuild, then Phase 2 `resolve_calls_for_files`.

use std::collections::{HashMap, HashSet};

use crate::cache::ResolutionCache;
use crate::calls::{self, CallReference, CallResolverInputs, Receiver};
use crate::capture::CaptureNode;
use crate::error::ScopeGraphError;
use crate::ids::{make_type_id, FilePath, ScopeId, ScopeKind, SymbolId, SymbolName, TypeId};
use crate::imports::{resolve_export_chain, resolve_module_path, ExportChainStep, ModuleResolutionConfig};
use crate::reachability::{self, IndirectReachabilityEntry};
use crate::registry::{
    self, CallResolutionResult, NameResolutionResult, ResolutionState,
};
use crate::resolver::{self, ScopeResolverIndex};
use crate::scope::{self, ScopeTree};
use crate::semantic::{Definition, ImportKind, ReferenceKind, SemanticIndex, TypeMembers};
use crate::typectx::TypeContext;

/// One file's input to the Corpus: its normalized captures plus its own
/// extent (needed for the module root span).
pub struct FileUpdate {
    pub file: FilePath,
    pub captures: Vec<CaptureNode>,
    pub end_line: u32,
    pub end_column: u32,
}

/// The owning store for every file's derived data, plus the shared
/// cross-file state. The corpus exclusively owns all per-file
/// `SemanticIndex`es; the Scope Resolver Index and `ResolutionState` hold
/// weak, read-only views keyed by IDs.
pub struct Corpus {
    config: ModuleResolutionConfig,
    scope_trees: HashMap<FilePath, ScopeTree>,
    semantic_indexes: HashMap<FilePath, SemanticIndex>,
    resolver_index: ScopeResolverIndex,
    cache: ResolutionCache,
    state: ResolutionState,
}

impl Corpus {
    pub fn new(config: ModuleResolutionConfig) -> Self {
        Self {
            config,
            scope_trees: HashMap::new(),
            semantic_indexes: HashMap::new(),
            resolver_index: ScopeResolverIndex::default(),
            cache: ResolutionCache::new(),
            state: ResolutionState::default(),
        }
    }

    fn known_files(&self) -> HashSet<FilePath> {
        self.semantic_indexes.keys().cloned().collect()
    }

    /// Per-file update entry point. Runs the Scope Processor and rebuilds
    /// the file's `SemanticIndex`, its Scope Resolver Index entries, and
    /// Phase 1 name resolution, leaving call resolution (Phase 2) to
    /// `resolve_calls_for_files` since it needs a freshly rebuilt Type
    /// Context spanning every affected file.
    pub fn update_file(&mut self, update: FileUpdate, index: SemanticIndex) -> Result<(), ScopeGraphError> {
        self.cache.invalidate_file(&update.file);
        self.state = registry::remove_file(&self.state, &update.file);

        let tree = scope::build_scope_tree(&update.file, &update.captures, update.end_line, update.end_column)?;

        let mut known_files = self.known_files();
        known_files.insert(update.file.clone());
        let importing_file = update.file.clone();
        let config = &self.config;
        let resolve_path = |module_path: &crate::ids::ModulePath| {
            resolve_module_path(config, &importing_file, module_path, &known_files)
        };
        self.resolver_index.build_for_file(&tree, &index, &resolve_path);

        let mut scope_to_file = HashMap::new();
        for scope_id in tree.scopes.keys() {
            scope_to_file.insert(scope_id.clone(), update.file.clone());
        }

        self.scope_trees.insert(update.file.clone(), tree);
        self.semantic_indexes.insert(update.file.clone(), index);

        let resolutions = self.resolve_names(&update.file);
        let result = NameResolutionResult {
            resolutions_by_scope: resolutions,
            scope_to_file,
        };
        self.state = registry::apply_name_resolution(&self.state, result);
        Ok(())
    }

    /// Phase 1: resolve every name bound in every scope of `file`, via the
    /// Scope Resolver Index (which itself lazily drives the Import/Export
    /// Chain Resolver on demand for import-backed names).
    fn resolve_names(&self, file: &FilePath) -> HashMap<ScopeId, HashMap<SymbolName, SymbolId>> {
        let Some(tree) = self.scope_trees.get(file) else {
            return HashMap::new();
        };
        let known_files = self.known_files();
        let mut out = HashMap::new();
        for (scope_id, scope_resolvers) in &self.resolver_index.by_scope {
            if !tree.scopes.contains_key(scope_id) {
                continue;
            }
            let mut resolved = HashMap::new();
            for name in scope_resolvers.resolvers.keys() {
                if let Some(id) = resolver::resolve(
                    &self.resolver_index,
                    &self.cache,
                    scope_id,
                    name,
                    |source_file, original_name, kind| self.resolve_export_chain_entry(source_file, original_name, kind, &known_files),
                ) {
                    resolved.insert(name.clone(), id);
                }
            }
            out.insert(scope_id.clone(), resolved);
        }
        out
    }

    fn resolve_export_chain_entry(
        &self,
        source_file: &FilePath,
        original_name: &SymbolName,
        kind: crate::semantic::ImportKind,
        known_files: &HashSet<FilePath>,
    ) -> Option<SymbolId> {
        let _ = known_files;
        resolve_export_chain(source_file.clone(), original_name.clone(), kind, &|file, name, kind| {
            self.export_chain_step(file, name, kind)
        })
    }

    fn export_chain_step(
        &self,
        file: &FilePath,
        name: &SymbolName,
        kind: crate::semantic::ImportKind,
    ) -> ExportChainStep {
        let Some(index) = self.semantic_indexes.get(file) else {
            return ExportChainStep::NotFound;
        };
        for def in index.definitions.values() {
            if let Definition::Import {
                name: export_name,
                import_path,
                import_kind,
                original_name,
                ..
            } = def
            {
                // A re-export binding: `export { a as b } from "./y"` is
                // modeled the same as any other import definition whose
                // outward name is looked up here.
                if export_name == name && *import_kind == kind {
                    if let Some(resolved_file) = resolve_module_path(
                        &self.config,
                        file,
                        &crate::ids::ModulePath::new(import_path.clone()),
                        &self.known_files(),
                    ) {
                        return ExportChainStep::ReExport {
                            source_file: resolved_file,
                            source_name: original_name.clone(),
                            import_kind: kind,
                        };
                    }
                }
            }
        }
        let matches_kind = |def: &&Definition| match kind {
            crate::semantic::ImportKind::Named => def.name() == name.as_str() && def.is_exported(),
            crate::semantic::ImportKind::Default => def.is_default() && def.is_exported(),
            crate::semantic::ImportKind::Namespace => def.name() == name.as_str() && def.is_exported(),
        };
        match index.definitions.values().find(matches_kind) {
            Some(def) => ExportChainStep::Terminal(def.symbol_id().clone()),
            None => ExportChainStep::NotFound,
        }
    }

    /// Phase 2: rebuild the Type Context from every file's current
    /// `SemanticIndex`, then resolve every call/construct/member_access
    /// reference in `files`.
    pub fn resolve_calls_for_files(&mut self, files: &[FilePath]) {
        let type_context = self.build_type_context();

        let mut resolved_calls_by_file = HashMap::new();
        let mut calls_by_caller_scope: HashMap<ScopeId, Vec<CallReference>> = HashMap::new();
        let mut indirect_reachability: HashMap<SymbolId, IndirectReachabilityEntry> = HashMap::new();

        for file in files {
            let Some(index) = self.semantic_indexes.get(file) else {
                continue;
            };
            let Some(tree) = self.scope_trees.get(file) else {
                continue;
            };

            let mut calls = Vec::new();
            let mut resolved_by_location: HashMap<crate::ids::LocationKey, SymbolId> = HashMap::new();
            for reference in &index.references {
                if !matches!(
                    reference.kind,
                    ReferenceKind::Call | ReferenceKind::Construct | ReferenceKind::MemberAccess
                ) {
                    continue;
                }
                let Some(call_type) = reference.call_type else {
                    continue;
                };
                let caller = calls::caller_scope_id(tree, &reference.scope_id);
                let receiver = self.receiver_for(&reference.context, &reference.scope_id, tree, &resolved_by_location);

                let resolution = {
                    let resolve_name_fn = |scope: &ScopeId, name: &SymbolName| -> Option<SymbolId> {
                        resolver::resolve(&self.resolver_index, &self.cache, scope, name, |_, _, _| None)
                    };
                    let get_symbol_type_fn = |id: &SymbolId| type_context.get_symbol_type(id);
                    let get_type_member_fn = |type_id: &TypeId, name: &SymbolName| type_context.get_type_member(type_id, name);
                    let is_namespace_import_fn = |id: &SymbolId| self.is_namespace_import(id);
                    let class_of_scope_fn = |scope: &ScopeId| self.class_of_scope(scope);
                    let first_extends_of_fn = |type_id: &TypeId| self.first_extends_of(type_id);

                    let inputs = CallResolverInputs {
                        resolve_name: &resolve_name_fn,
                        get_symbol_type: &get_symbol_type_fn,
                        get_type_member: &get_type_member_fn,
                        is_namespace_import: &is_namespace_import_fn,
                        class_of_scope: &class_of_scope_fn,
                        first_extends_of: &first_extends_of_fn,
                    };
                    calls::resolve_call(&inputs, &reference.scope_id, &reference.name, call_type, receiver)
                };

                if let Some(ref target) = resolution {
                    resolved_by_location.insert(reference.location.key(), target.clone());
                }

                let call_ref = CallReference {
                    location: reference.location.clone(),
                    caller_scope_id: caller.clone(),
                    name: reference.name.clone(),
                    call_type: Some(call_type),
                    resolution,
                    is_optional_chain: reference.is_optional_chain,
                };
                calls_by_caller_scope.entry(caller).or_default().push(call_ref.clone());
                calls.push(call_ref);
            }
            resolved_calls_by_file.insert(file.clone(), calls);

            for reference in &index.references {
                if reference.kind != ReferenceKind::Read {
                    continue;
                }
                let Some(target) = resolver::resolve(&self.resolver_index, &self.cache, &reference.scope_id, &reference.name, |_, _, _| None) else {
                    continue;
                };
                if !index.function_collections.contains_key(&target) {
                    continue;
                }
                let collections = |id: &SymbolId| index.function_collections.get(id).cloned();
                let resolve_stored = |name: &str| {
                    resolver::resolve(
                        &self.resolver_index,
                        &self.cache,
                        &reference.scope_id,
                        &name.to_string(),
                        |_, _, _| None,
                    )
                };
                for (symbol_id, entry) in
                    reachability::reachability_from_read(&target, reference.location.clone(), &collections, &resolve_stored)
                {
                    indirect_reachability.insert(symbol_id, entry);
                }
            }
        }

        let result = CallResolutionResult {
            resolved_calls_by_file,
            calls_by_caller_scope,
            indirect_reachability,
        };
        self.state = registry::apply_call_resolution(&self.state, result);
    }

    fn definition_by_symbol(&self, symbol_id: &SymbolId) -> Option<&Definition> {
        self.semantic_indexes
            .values()
            .find_map(|index| index.definitions.get(symbol_id))
    }

    fn build_type_context(&self) -> TypeContext {
        let mut ctx = TypeContext::new();
        for index in self.semantic_indexes.values() {
            for (location_key, type_name) in &index.type_bindings {
                let Some(def) = index.definition_near_location(location_key) else {
                    continue;
                };
                let scope_id = def.defining_scope_id().clone();
                let parsed = crate::typectx::parse_type_name(type_name);
                let resolved_type = match parsed {
                    crate::typectx::ParsedTypeName::Union => None,
                    crate::typectx::ParsedTypeName::Base(base) | crate::typectx::ParsedTypeName::Array(base) => {
                        TypeContext::builtin_type_id(&base).or_else(|| {
                            let type_symbol =
                                resolver::resolve(&self.resolver_index, &self.cache, &scope_id, &base, |_, _, _| None)?;
                            let type_def = self.definition_by_symbol(&type_symbol)?;
                            Some(crate::ids::make_type_id("class", &base, type_def.location()))
                        })
                    }
                };
                if let Some(type_id) = resolved_type {
                    ctx.insert_symbol_type(def.symbol_id().clone(), type_id);
                }
            }
            for (type_id, members) in &index.type_members {
                ctx.insert_type_members(type_id.clone(), members.clone());
            }
        }

        // Synthetic "module" types stand in for a namespace import's target
        // file: `x.foo` resolves via type-context member lookup on the
        // import target file. Every exported top-level definition becomes
        // a member of that file's module type.
        let mut module_types: HashMap<FilePath, TypeId> = HashMap::new();
        for (file, tree) in &self.scope_trees {
            let Some(root_id) = &tree.root else { continue };
            let Some(root_scope) = tree.get(root_id) else { continue };
            let Some(index) = self.semantic_indexes.get(file) else { continue };
            let module_type = make_type_id("module", file.as_str(), &root_scope.location);
            let mut members = TypeMembers::default();
            for def in index.definitions.values() {
                if !def.is_exported() {
                    continue;
                }
                match def {
                    Definition::Function { .. } | Definition::Class { .. } | Definition::Method { .. } => {
                        members.methods.insert(def.name().to_string(), def.symbol_id().clone());
                    }
                    _ => {
                        members.properties.insert(def.name().to_string(), def.symbol_id().clone());
                    }
                }
            }
            ctx.insert_type_members(module_type.clone(), members);
            module_types.insert(file.clone(), module_type);
        }

        let known_files = self.known_files();
        for index in self.semantic_indexes.values() {
            let Some(importing_file) = &index.file else { continue };
            for def in index.definitions.values() {
                let Definition::Import {
                    symbol_id,
                    import_path,
                    import_kind: ImportKind::Namespace,
                    ..
                } = def
                else {
                    continue;
                };
                let module_path = crate::ids::ModulePath::new(import_path.clone());
                let Some(source_file) = resolve_module_path(&self.config, importing_file, &module_path, &known_files) else {
                    continue;
                };
                if let Some(module_type) = module_types.get(&source_file) {
                    ctx.insert_symbol_type(symbol_id.clone(), module_type.clone());
                }
            }
        }

        ctx
    }

    /// Whether `symbol_id` names a `import * as name from "..."` binding.
    fn is_namespace_import(&self, symbol_id: &SymbolId) -> bool {
        self.semantic_indexes.values().any(|index| {
            matches!(
                index.definitions.get(symbol_id),
                Some(Definition::Import {
                    import_kind: ImportKind::Namespace,
                    ..
                })
            )
        })
    }

    /// The class/interface type enclosing `scope_id`, walking up the scope
    /// chain to the nearest `Class` scope. Shared by self-parameter lookup
    /// and the `super` dispatch step that resolves the enclosing class.
    fn class_of_scope(&self, scope_id: &ScopeId) -> Option<TypeId> {
        let mut current = scope_id.clone();
        loop {
            let scope = self.scope_trees.values().find_map(|tree| tree.get(&current))?;
            if scope.kind == ScopeKind::Class {
                let index = self.semantic_indexes.get(&scope.location.file)?;
                let def = index.definitions.values().find(|d| {
                    d.location() == &scope.location && matches!(d, Definition::Class { .. } | Definition::Interface { .. })
                })?;
                let category = if matches!(def, Definition::Interface { .. }) { "interface" } else { "class" };
                return Some(make_type_id(category, def.name(), def.location()));
            }
            match &scope.parent_id {
                Some(parent) => current = parent.clone(),
                None => return None,
            }
        }
    }

    /// The type of the first name in a class/interface's `extends` list
    /// (`super` dispatch uses first-parent-wins on a diamond). Looked up
    /// from whichever file's `type_members` owns `type_id`.
    fn first_extends_of(&self, type_id: &TypeId) -> Option<TypeId> {
        let parent_name = self
            .semantic_indexes
            .values()
            .find_map(|index| index.type_members.get(type_id))
            .and_then(|members| members.extends.first())?;
        self.type_id_by_name(parent_name)
    }

    fn type_id_by_name(&self, name: &SymbolName) -> Option<TypeId> {
        for index in self.semantic_indexes.values() {
            for def in index.definitions.values() {
                match def {
                    Definition::Class { .. } if def.name() == name.as_str() => {
                        return Some(make_type_id("class", name, def.location()));
                    }
                    Definition::Interface { .. } if def.name() == name.as_str() => {
                        return Some(make_type_id("interface", name, def.location()));
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn receiver_for(
        &self,
        context: &crate::semantic::ReferenceContext,
        reference_scope: &ScopeId,
        tree: &ScopeTree,
        resolved_by_location: &HashMap<crate::ids::LocationKey, SymbolId>,
    ) -> Option<Receiver> {
        let receiver_location = context.receiver_location.as_ref()?;
        let name = context.property_chain.first()?.clone();

        // Self parameter: `self`/`&self` (Python/Rust) or `this` (JS/TS).
        // The receiver is the enclosing class/impl type, not a name to
        // resolve through the scope chain.
        if name == "self" || name == "this" {
            let class_type = self.class_of_scope(reference_scope)?;
            return Some(Receiver::SelfReceiver(class_type));
        }

        // The receiver expression is itself a previously-resolved
        // call/construct/member_access reference: reuse its already-computed
        // target type rather than re-descending into the CST.
        if let Some(resolved) = resolved_by_location.get(&receiver_location.key()) {
            return Some(Receiver::ResolvedCall(resolved.clone()));
        }

        let scope_id = tree.get_scope_id(receiver_location)?;
        Some(Receiver::Identifier { name, scope_id })
    }

    pub fn resolve(&self, scope_id: &ScopeId, name: &SymbolName) -> Option<SymbolId> {
        registry::resolve(&self.state, scope_id, name)
    }

    pub fn get_calls_by_caller_scope(&self, caller_scope_id: &ScopeId) -> &[CallReference] {
        registry::get_calls_by_caller_scope(&self.state, caller_scope_id)
    }

    pub fn get_all_referenced_symbols(&self) -> HashSet<SymbolId> {
        registry::get_all_referenced_symbols(&self.state)
    }

    pub fn get_indirect_reachability(&self) -> &HashMap<SymbolId, IndirectReachabilityEntry> {
        registry::get_indirect_reachability(&self.state)
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.get_stats()
    }

    pub fn scope_tree(&self, file: &FilePath) -> Option<&ScopeTree> {
        self.scope_trees.get(file)
    }
}
