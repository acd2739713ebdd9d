//! `scopegraph`: a multi-language, cross-file symbol resolution engine over
//! a CST capture stream (TypeScript/JavaScript, Python, Rust).
//!
//! The crate never parses source itself; an embedder supplies normalized
//! captures (via [`capture::normalize`] or its own equivalent) and drives a
//! [`corpus::Corpus`] through its per-file update pipeline.

pub mod cache;
pub mod calls;
pub mod capture;
pub mod corpus;
pub mod error;
pub mod ids;
pub mod imports;
pub mod logging;
pub mod reachability;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod semantic;
pub mod typectx;

pub use cache::{CacheStats, ResolutionCache};
pub use calls::{CallReference, CallResolverInputs, Receiver};
pub use capture::CaptureNode;
pub use corpus::{Corpus, FileUpdate};
pub use error::{ScopeGraphError, ScopeGraphResult};
pub use ids::{
    make_builtin_type_id, make_scope_id, make_symbol_id, make_type_id, DefinitionKind, FilePath,
    Location, LocationKey, ModulePath, ScopeId, ScopeKind, SymbolId, SymbolName, TypeId,
};
pub use imports::{ModulePathFamily, ModuleResolutionConfig};
pub use reachability::{IndirectReachabilityEntry, ReachabilityReason};
pub use registry::ResolutionState;
pub use resolver::{Resolver, ScopeResolverIndex};
pub use scope::{LexicalScope, ScopeTree};
pub use semantic::{
    CallType, Definition, FunctionCollection, ImportKind, Reference, ReferenceContext,
    ReferenceKind, SemanticIndex, Signature, TypeMembers,
};
pub use typectx::TypeContext;
