//! Resolution cache: shared `(ScopeId, SymbolName) → SymbolId` table with
//! file-level invalidation.
//!
//! Backed by `dashmap` so concurrent readers are safe even though the
//! resolver itself is expected to run single-threaded per corpus; an
//! embedder that does query concurrently doesn't need its own locking
//! around this cache.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ids::{FilePath, ScopeId, SymbolId, SymbolName};

type CacheKey = (ScopeId, SymbolName);

/// Hit/miss counters exposed via `get_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Shared `(scope_id, name) → symbol_id` cache, plus a secondary
/// `FilePath → Set<cache_key>` index for O(k) invalidation.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<CacheKey, SymbolId>,
    by_file: DashMap<FilePath, Vec<CacheKey>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `get` counts hits/misses; returns `None` iff absent.
    pub fn get(&self, scope_id: &ScopeId, name: &SymbolName) -> Option<SymbolId> {
        let key = (scope_id.clone(), name.clone());
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Non-counting presence check.
    pub fn has(&self, scope_id: &ScopeId, name: &SymbolName) -> bool {
        self.entries.contains_key(&(scope_id.clone(), name.clone()))
    }

    /// Overwrites any existing entry. Callers must never pass an
    /// unresolved result here; this cache has no "negative" entry at all.
    pub fn set(&self, scope_id: ScopeId, name: SymbolName, symbol_id: SymbolId) {
        let file = file_of_scope(&scope_id);
        let key = (scope_id, name);
        self.entries.insert(key.clone(), symbol_id);
        if let Some(file) = file {
            self.by_file.entry(file).or_default().push(key);
        }
    }

    /// Removes exactly the keys whose scope belongs to `file`. Keys whose
    /// scope-id carries no recoverable file path are retained.
    pub fn invalidate_file(&self, file: &FilePath) {
        if let Some((_, keys)) = self.by_file.remove(file) {
            for key in keys {
                self.entries.remove(&key);
            }
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.by_file.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// `ScopeId` encodes its location's `LocationKey`, whose first segment is
/// the file path; extract it without round-tripping through `Location`.
fn file_of_scope(scope_id: &ScopeId) -> Option<FilePath> {
    // Encoding shape: "scope:<kind>:<file>:<start_line>:<start_col>-<end_line>:<end_col>"
    let encoded = scope_id.as_str();
    let after_kind = encoded.splitn(3, ':').nth(2)?;
    let last_dash = after_kind.rfind('-')?;
    let before_dash = &after_kind[..last_dash];
    let sc_start = before_dash.rfind(':')?;
    let before_sc = &before_dash[..sc_start];
    let sl_start = before_sc.rfind(':')?;
    Some(FilePath::new(&before_sc[..sl_start]))
}
