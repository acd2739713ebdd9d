//! Import/export chain resolution and the module-path resolution
//! configuration it's parameterized by.

use std::collections::HashSet;

use crate::ids::{FilePath, ModulePath, SymbolName};
use crate::semantic::ImportKind;

/// Which family of module-path resolution rules a language uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulePathFamily {
    /// TS/JS-style `./x`, `../a/b`, directory-with-index-file resolution.
    RelativeDot,
    /// Python-style dotted package paths, `.`/`..`/`...` relative levels.
    DottedPackage,
}

/// Supplied by the embedder at corpus construction, not read from a config
/// file on disk; file I/O stays out of scope for this engine.
#[derive(Debug, Clone)]
pub struct ModuleResolutionConfig {
    pub extensions: Vec<String>,
    pub index_file_names: Vec<String>,
    pub family: ModulePathFamily,
}

impl ModuleResolutionConfig {
    pub fn typescript() -> Self {
        Self {
            extensions: vec!["ts".into(), "tsx".into(), "js".into(), "jsx".into()],
            index_file_names: vec!["index".into()],
            family: ModulePathFamily::RelativeDot,
        }
    }

    pub fn python() -> Self {
        Self {
            extensions: vec!["py".into()],
            index_file_names: vec!["__init__".into()],
            family: ModulePathFamily::DottedPackage,
        }
    }

    pub fn rust() -> Self {
        Self {
            extensions: vec!["rs".into()],
            index_file_names: vec!["mod".into()],
            family: ModulePathFamily::RelativeDot,
        }
    }
}

/// Resolve a `ModulePath` seen in `importing_file` to a `FilePath`, using
/// `known_files` as the corpus's set of existing files (the engine never
/// touches a real filesystem).
///
/// Tries the path (plus each configured extension in order), then a
/// package-index file for directory paths, then, for dotted-package
/// imports, maps `.` to a directory separator. Relative imports consume
/// as many parent-directory levels as they have leading dots.
pub fn resolve_module_path(
    config: &ModuleResolutionConfig,
    importing_file: &FilePath,
    module_path: &ModulePath,
    known_files: &HashSet<FilePath>,
) -> Option<FilePath> {
    match config.family {
        ModulePathFamily::RelativeDot => resolve_relative_dot(config, importing_file, module_path, known_files),
        ModulePathFamily::DottedPackage => resolve_dotted_package(config, importing_file, module_path, known_files),
    }
}

fn importing_dir(importing_file: &FilePath) -> Vec<String> {
    let mut parts: Vec<String> = importing_file
        .as_str()
        .split('/')
        .map(|s| s.to_string())
        .collect();
    parts.pop(); // drop the file name itself, keep the directory chain
    parts
}

fn resolve_relative_dot(
    config: &ModuleResolutionConfig,
    importing_file: &FilePath,
    module_path: &ModulePath,
    known_files: &HashSet<FilePath>,
) -> Option<FilePath> {
    let raw = module_path.as_str();
    let mut dir = importing_dir(importing_file);

    let joined = if raw.starts_with("./") || raw.starts_with("../") {
        let mut remaining = raw;
        while let Some(rest) = remaining.strip_prefix("../") {
            dir.pop();
            remaining = rest;
        }
        remaining = remaining.strip_prefix("./").unwrap_or(remaining);
        dir.push(remaining.to_string());
        dir.join("/")
    } else {
        raw.to_string()
    };

    try_candidates(config, &joined, known_files)
}

fn resolve_dotted_package(
    config: &ModuleResolutionConfig,
    importing_file: &FilePath,
    module_path: &ModulePath,
    known_files: &HashSet<FilePath>,
) -> Option<FilePath> {
    let leading_dots = module_path.leading_dot_count();
    let rest = &module_path.as_str()[leading_dots..];

    // Absolute dotted paths (`app.services.auth`) resolve from the package
    // root, not relative to the importing file; only relative imports
    // (leading dots) consume the importing file's own directory chain.
    let mut dir = if leading_dots > 0 {
        importing_dir(importing_file)
    } else {
        Vec::new()
    };
    // One leading dot means "this package" (no pop); each additional dot
    // pops one more parent level.
    for _ in 1..leading_dots {
        dir.pop();
    }

    if !rest.is_empty() {
        for segment in rest.split('.') {
            dir.push(segment.to_string());
        }
    }

    let joined = dir.join("/");
    try_candidates(config, &joined, known_files)
}

fn try_candidates(config: &ModuleResolutionConfig, base: &str, known_files: &HashSet<FilePath>) -> Option<FilePath> {
    for ext in &config.extensions {
        let candidate = FilePath::new(format!("{base}.{ext}"));
        if known_files.contains(&candidate) {
            return Some(candidate);
        }
    }
    for ext in &config.extensions {
        for index_name in &config.index_file_names {
            let candidate = FilePath::new(format!("{base}/{index_name}.{ext}"));
            if known_files.contains(&candidate) {
                return Some(candidate);
            }
        }
    }
    let bare = FilePath::new(base);
    if known_files.contains(&bare) {
        return Some(bare);
    }
    None
}

/// Outcome of following an import/re-export chain to its terminal
/// definition.
pub type ExportChainLookup<'a> = &'a dyn Fn(&FilePath, &SymbolName, ImportKind) -> ExportChainStep;

/// What a single file contributes toward resolving `(name, kind)`:
/// either a terminal local symbol, a re-export to keep following, or
/// nothing at all.
#[derive(Debug, Clone)]
pub enum ExportChainStep {
    /// A local, exported definition terminates the chain.
    Terminal(crate::ids::SymbolId),
    /// `export { exported_as } from "./y"` (or `export * from`), possibly
    /// aliased: `source_name` is what to look up in `source_file`.
    ReExport {
        source_file: FilePath,
        source_name: SymbolName,
        import_kind: ImportKind,
    },
    NotFound,
}

/// Follow an export chain starting at `(source_file, name, kind)`, guarding
/// against cycles with a `visited: Set<(FilePath, SymbolName)>`. `step` is
/// supplied by the caller (the `Corpus`), which has access to every file's
/// `SemanticIndex`.
pub fn resolve_export_chain(
    mut source_file: FilePath,
    mut name: SymbolName,
    mut kind: ImportKind,
    step: ExportChainLookup,
) -> Option<crate::ids::SymbolId> {
    let mut visited: HashSet<(FilePath, SymbolName)> = HashSet::new();

    loop {
        let key = (source_file.clone(), name.clone());
        if !visited.insert(key) {
            tracing::debug!(file = %source_file, name, "import cycle detected, aborting chain");
            return None;
        }

        match step(&source_file, &name, kind) {
            ExportChainStep::Terminal(symbol_id) => return Some(symbol_id),
            ExportChainStep::ReExport {
                source_file: next_file,
                source_name,
                import_kind,
            } => {
                source_file = next_file;
                name = source_name;
                kind = import_kind;
            }
            ExportChainStep::NotFound => return None,
        }
    }
}
