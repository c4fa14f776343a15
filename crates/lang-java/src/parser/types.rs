//! Syntactic type nodes to [`TypeExpr`] values.
//!
//! Identifiers are classified against the type parameters in scope: an
//! in-scope name becomes a `Variable`, anything else a `Reference` kept
//! under its source-level (possibly unqualified) name.

use tree_sitter::Node;
use typescope_api::models::{PrimitiveKind, TypeExpr, WildcardBound};

/// Type-parameter names visible at a given extraction point.
#[derive(Debug, Default, Clone)]
pub(crate) struct TypeParamScope {
    pub class_params: Vec<String>,
    pub method_params: Vec<String>,
}

impl TypeParamScope {
    /// `Some(on_method)` when the name is an in-scope type parameter.
    fn classify(&self, name: &str) -> Option<bool> {
        if self.method_params.iter().any(|p| p == name) {
            return Some(true);
        }
        if self.class_params.iter().any(|p| p == name) {
            return Some(false);
        }
        None
    }
}

pub fn parse_type_node(node: Node, source: &str) -> TypeExpr {
    parse_type_node_scoped(node, source, &TypeParamScope::default())
}

pub(crate) fn parse_type_node_scoped(
    node: Node,
    source: &str,
    scope: &TypeParamScope,
) -> TypeExpr {
    match node.kind() {
        "generic_type" => {
            let base_name = node
                .child(0)
                .and_then(|b| b.utf8_text(source.as_bytes()).ok())
                .unwrap_or_default()
                .to_string();

            let mut args = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "type_arguments" {
                    let mut args_cursor = child.walk();
                    for arg in child.children(&mut args_cursor) {
                        if !matches!(arg.kind(), "<" | ">" | ",") {
                            args.push(parse_type_node_scoped(arg, source, scope));
                        }
                    }
                }
            }
            TypeExpr::Reference {
                name: base_name,
                args,
            }
        }
        "array_type" => {
            let element = node
                .child_by_field_name("element")
                .map(|e| parse_type_node_scoped(e, source, scope))
                .unwrap_or_else(|| TypeExpr::reference("java.lang.Object"));
            let dimensions = node
                .child_by_field_name("dimensions")
                .and_then(|d| d.utf8_text(source.as_bytes()).ok())
                .map(|text| text.matches('[').count())
                .unwrap_or(1)
                .max(1);
            let mut ty = element;
            for _ in 0..dimensions {
                ty = TypeExpr::array(ty);
            }
            ty
        }
        "wildcard" => {
            let mut bound = WildcardBound::Unbounded;
            let mut is_super = false;
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "super" => is_super = true,
                    "extends" | "?" => {}
                    _ => {
                        let inner = Box::new(parse_type_node_scoped(child, source, scope));
                        bound = if is_super {
                            WildcardBound::Super(inner)
                        } else {
                            WildcardBound::Extends(inner)
                        };
                    }
                }
            }
            TypeExpr::Wildcard { bound }
        }
        "integral_type" | "floating_point_type" | "boolean_type" => {
            let text = node.utf8_text(source.as_bytes()).unwrap_or_default();
            match PrimitiveKind::from_str(text) {
                Some(kind) => TypeExpr::Primitive(kind),
                None => TypeExpr::reference(text),
            }
        }
        "type_identifier" => {
            let text = node
                .utf8_text(source.as_bytes())
                .unwrap_or_default()
                .to_string();
            match scope.classify(&text) {
                Some(on_method) => TypeExpr::Variable {
                    name: text,
                    on_method,
                },
                None => TypeExpr::reference(text),
            }
        }
        "scoped_type_identifier" => {
            let text = node
                .utf8_text(source.as_bytes())
                .unwrap_or_default()
                .to_string();
            TypeExpr::reference(text)
        }
        _ => {
            let text = node
                .utf8_text(source.as_bytes())
                .unwrap_or_default()
                .to_string();
            match PrimitiveKind::from_str(&text) {
                Some(kind) => TypeExpr::Primitive(kind),
                None => TypeExpr::reference(text),
            }
        }
    }
}
