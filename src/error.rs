//! Error types for the resolution engine.
//!
//! This module provides structured error types using thiserror. Most
//! resolution-time "error kinds" are not fatal at all: unresolved symbols,
//! unresolved calls, unresolved members, import cycles, and malformed
//! captures are recoverable outcomes lowering the confidence of a single
//! lookup, and are represented as `None`/`ResolveOutcome::Unresolved` values
//! rather than `Err(ScopeGraphError)`. Only a missing mandatory symbol name
//! or a scope tree that violates its own containment invariant are truly
//! fatal; those abort the file (re)build that produced them.

use thiserror::Error;

use crate::ids::{FilePath, Location};

/// Fatal errors for the resolution engine.
///
/// Everything else is non-fatal and is reported through ordinary
/// `Option`/enum return values instead of this type.
#[derive(Error, Debug)]
pub enum ScopeGraphError {
    /// A definition or reference capture reached the Semantic Index with no
    /// name text at all (not merely unresolved, absent).
    #[error("capture at {location:?} is missing a required symbol name")]
    MissingSymbolName { location: Location },

    /// The scope tree built for a file violates the containment invariant:
    /// some scope is not fully contained by its claimed parent, or two
    /// roots overlap.
    #[error("scope tree for '{file}' is invalid: {reason}")]
    InvalidScopeTree { file: FilePath, reason: String },
}

pub type ScopeGraphResult<T> = Result<T, ScopeGraphError>;
