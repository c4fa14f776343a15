//! Source-backed type solver over a directory of `.java` files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tracing::{debug, warn};
use tree_sitter::Tree;
use typescope_api::models::{DeclarationKind, SymbolReference, TypeDeclaration};
use typescope_api::{ResolveError, Result};
use typescope_core::solver::{ParentLink, TypeSolver};
use walkdir::WalkDir;

use crate::navigator;
use crate::parser::{JavaParser, extract_type_declaration};

struct ParsedFile {
    tree: Tree,
    source: String,
}

/// Resolves qualified names against a source root laid out in package
/// directories (`com.acme.Foo` → `com/acme/Foo.java`, nested types inside
/// their outer type's file).
///
/// Parsed files are memoized for the solver's lifetime; sources are assumed
/// immutable while a session runs, and concurrent sessions should each own
/// their solver.
pub struct SourceTypeSolver {
    root: PathBuf,
    parser: JavaParser,
    cache: DashMap<PathBuf, Arc<ParsedFile>>,
    parse_count: AtomicUsize,
    parent: ParentLink,
}

impl SourceTypeSolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parser: JavaParser::new(),
            cache: DashMap::new(),
            parse_count: AtomicUsize::new(0),
            parent: ParentLink::new(),
        }
    }

    /// Number of files parsed so far; stable across cache hits.
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::Relaxed)
    }

    fn parsed(&self, path: &Path) -> Result<Arc<ParsedFile>> {
        let canonical = path.canonicalize()?;
        if let Some(hit) = self.cache.get(&canonical) {
            return Ok(hit.clone());
        }
        let source = std::fs::read_to_string(&canonical)?;
        let tree = self.parser.parse(&source)?;
        self.parse_count.fetch_add(1, Ordering::Relaxed);
        let parsed = Arc::new(ParsedFile { tree, source });
        self.cache.insert(canonical, parsed.clone());
        Ok(parsed)
    }

    fn check_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(ResolveError::SourceRootMissing(self.root.clone()));
        }
        Ok(())
    }
}

impl TypeSolver for SourceTypeSolver {
    fn try_solve(&self, name: &str) -> Result<SymbolReference<Arc<TypeDeclaration>>> {
        self.check_root()?;

        let parts: Vec<&str> = name.split('.').collect();
        // Longest dotted prefix first: `a.b.C.D` tries a/b/C/D.java, then
        // a/b/C.java (looking up C.D inside), and so on.
        for split in (1..=parts.len()).rev() {
            let mut path = self.root.clone();
            for part in &parts[..split - 1] {
                path.push(part);
            }
            path.push(format!("{}.java", parts[split - 1]));
            if !path.is_file() {
                continue;
            }

            let parsed = self.parsed(&path)?;
            let type_path = parts[split - 1..].join(".");
            let found =
                navigator::find_type(parsed.tree.root_node(), &parsed.source, &type_path);
            return Ok(match found {
                Some(node) => {
                    debug!(name, path = %path.display(), "resolved from source");
                    let prefix = name.rsplit_once('.').map(|(p, _)| p);
                    SymbolReference::solved(Arc::new(extract_type_declaration(
                        node,
                        &parsed.source,
                        prefix,
                    )))
                }
                // The file that should declare this type does not; shorter
                // prefixes would name a different type entirely.
                None => SymbolReference::unsolved(DeclarationKind::Class),
            });
        }
        Ok(SymbolReference::unsolved(DeclarationKind::Class))
    }

    fn parent(&self) -> Option<Arc<dyn TypeSolver>> {
        self.parent.get()
    }

    fn set_parent(&self, parent: Arc<dyn TypeSolver>) {
        self.parent.set(parent);
    }

    fn defined_type_names(&self) -> Option<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parsed = match self.parsed(path) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable source file");
                    continue;
                }
            };
            let Some(package) = self
                .parser
                .package_name(&parsed.tree, &parsed.source)
            else {
                continue;
            };
            if navigator::find_type(parsed.tree.root_node(), &parsed.source, stem).is_some() {
                names.push(format!("{package}.{stem}"));
            }
        }
        Some(names)
    }
}
