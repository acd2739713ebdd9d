//! Call resolver: routes a reference to function/method/constructor/super
//! resolution logic and records the resolved target.

use crate::ids::{Location, ScopeId, SymbolId, SymbolName, TypeId};
use crate::resolver::ScopeResolverIndex;
use crate::scope::ScopeTree;
use crate::semantic::{CallType, ReferenceContext};
use crate::typectx::TypeContext;

/// One resolved (or unresolved) call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReference {
    pub location: Location,
    pub caller_scope_id: ScopeId,
    pub name: SymbolName,
    pub call_type: Option<CallType>,
    pub resolution: Option<SymbolId>,
    /// Carried through unchanged from the reference's own flag. Optional
    /// chaining (`a?.b()`) and computed access never alter the resolved
    /// target.
    pub is_optional_chain: bool,
}

/// Walk up from `scope_id` to the innermost enclosing function, method, or
/// constructor scope.
pub fn caller_scope_id(tree: &ScopeTree, scope_id: &ScopeId) -> ScopeId {
    use crate::ids::ScopeKind;
    let mut current = scope_id.clone();
    loop {
        let Some(scope) = tree.get(&current) else {
            return current;
        };
        if matches!(
            scope.kind,
            ScopeKind::Function | ScopeKind::Method | ScopeKind::Constructor
        ) {
            return current;
        }
        match &scope.parent_id {
            Some(parent) => current = parent.clone(),
            None => return current,
        }
    }
}

/// A minimal view of "what the receiver expression is" that the embedder's
/// capture normalization is expected to have already extracted (the core
/// never re-descends into the CST). Provided per reference via
/// `context.receiver_location` plus whatever the caller already knows about
/// that location.
pub enum Receiver {
    /// The receiver is a plain identifier in `scope_id`.
    Identifier { name: SymbolName, scope_id: ScopeId },
    /// The receiver is itself a resolved call (nested call or
    /// `new X()` expression); its resolved symbol id is already known.
    ResolvedCall(SymbolId),
    /// The receiver is `self`/`&self`/Python `self`: the enclosing
    /// class/impl type, captured by the method's own scope chain.
    SelfReceiver(TypeId),
}

/// Resolves one call/construct/member_access reference via a dispatch table
/// keyed on `call_type`. Collaborators (`resolve_name`, `get_type`,
/// `get_member`) are injected so this module stays free of any concrete
/// storage; the Corpus wires it to the live `ScopeResolverIndex`,
/// `ResolutionCache`, and `TypeContext`.
pub struct CallResolverInputs<'a> {
    pub resolve_name: &'a dyn Fn(&ScopeId, &SymbolName) -> Option<SymbolId>,
    pub get_symbol_type: &'a dyn Fn(&SymbolId) -> Option<TypeId>,
    pub get_type_member: &'a dyn Fn(&TypeId, &SymbolName) -> Option<SymbolId>,
    pub is_namespace_import: &'a dyn Fn(&SymbolId) -> bool,
    pub class_of_scope: &'a dyn Fn(&ScopeId) -> Option<TypeId>,
    pub first_extends_of: &'a dyn Fn(&TypeId) -> Option<TypeId>,
}

/// `name` for a `function`/`constructor` call; `name` for `method`/`super`
/// is the member name being called (`h.help()` → `name == "help"`).
pub fn resolve_call(
    inputs: &CallResolverInputs,
    scope_id: &ScopeId,
    name: &SymbolName,
    call_type: CallType,
    receiver: Option<Receiver>,
) -> Option<SymbolId> {
    match call_type {
        // A bare `name()` call always resolves through the scope chain.
        // Namespace-member calls (`u.helper()`) arrive as `CallType::Method`
        // with `u` as the receiver; they never reach this branch.
        CallType::Function => (inputs.resolve_name)(scope_id, name),
        CallType::Constructor => (inputs.resolve_name)(scope_id, name),
        CallType::Method => resolve_method_call(inputs, scope_id, name, receiver),
        CallType::Super => {
            let class = (inputs.class_of_scope)(scope_id)?;
            let base = (inputs.first_extends_of)(&class)?;
            (inputs.get_type_member)(&base, name)
        }
    }
}

fn resolve_method_call(
    inputs: &CallResolverInputs,
    scope_id: &ScopeId,
    name: &SymbolName,
    receiver: Option<Receiver>,
) -> Option<SymbolId> {
    let receiver_type = match receiver? {
        Receiver::Identifier {
            name: receiver_name,
            scope_id: receiver_scope,
        } => {
            let receiver_symbol = (inputs.resolve_name)(&receiver_scope, &receiver_name)?;
            if (inputs.is_namespace_import)(&receiver_symbol) {
                return resolve_namespace_member(inputs, &receiver_symbol, name);
            }
            (inputs.get_symbol_type)(&receiver_symbol)?
        }
        Receiver::ResolvedCall(symbol_id) => (inputs.get_symbol_type)(&symbol_id)?,
        Receiver::SelfReceiver(type_id) => type_id,
    };
    let _ = scope_id;
    (inputs.get_type_member)(&receiver_type, name)
}

/// Namespace-member resolution (`u.helper()` where `u` is a namespace
/// import): a regular `get_type_member` call against the synthetic type
/// the namespace import's own symbol stands in for.
fn resolve_namespace_member(
    inputs: &CallResolverInputs,
    namespace_symbol: &SymbolId,
    member: &SymbolName,
) -> Option<SymbolId> {
    let type_id = (inputs.get_symbol_type)(namespace_symbol)?;
    (inputs.get_type_member)(&type_id, member)
}

/// A reference's `context` carries enough to pick the right `Receiver`
/// shape, once the embedder's capture normalization has attached a
/// `receiver_location`.
pub fn receiver_from_context(_context: &ReferenceContext) -> Option<Receiver> {
    // The concrete `Receiver` variant depends on what kind of expression
    // occupies `receiver_location` (identifier, nested call, or `self`),
    // which only the Corpus, holding the per-file reference stream, can
    // classify. This stub documents the call-resolution contract at the
    // module boundary; the Corpus constructs `Receiver` values directly
    // when driving `resolve_call`.
    None
}
