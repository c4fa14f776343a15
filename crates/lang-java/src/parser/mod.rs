use tree_sitter::Tree;
use typescope_api::{ResolveError, Result};

mod declarations;
mod types;

pub use declarations::extract_type_declaration;
pub use types::parse_type_node;

/// Owns the tree-sitter Java language. A fresh `tree_sitter::Parser` is
/// built per parse because the parser itself is stateful and not shareable.
pub struct JavaParser {
    pub language: tree_sitter::Language,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    pub fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ResolveError::Parse(e.to_string()))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ResolveError::Parse("tree-sitter produced no tree".to_string()))
    }

    /// Declared package of a compilation unit, if any.
    pub fn package_name(&self, tree: &Tree, source: &str) -> Option<String> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "package_declaration" {
                let mut inner = child.walk();
                for name in child.named_children(&mut inner) {
                    if matches!(name.kind(), "scoped_identifier" | "identifier") {
                        return name
                            .utf8_text(source.as_bytes())
                            .ok()
                            .map(|s| s.to_string());
                    }
                }
            }
        }
        None
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}
