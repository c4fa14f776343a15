//! Pure AST navigation over tree-sitter nodes.
//!
//! Lookup helpers come in two families: `find_*` returns `Option`/empty for
//! expected absence, `demand_*` faults because the caller asserted presence.

use tree_sitter::Node;
use typescope_api::{ResolveError, Result};

const TYPE_DECLARATION_KINDS: [&str; 3] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
];

fn is_type_declaration(node: Node) -> bool {
    TYPE_DECLARATION_KINDS.contains(&node.kind())
}

fn declared_name(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// Type declarations directly contained by `node`: top-level declarations of
/// a compilation unit, or member types of a type declaration.
fn direct_type_declarations<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let container = if is_type_declaration(node) {
        node.child_by_field_name("body")
    } else {
        Some(node)
    };
    let mut out = Vec::new();
    let Some(container) = container else {
        return out;
    };
    let mut cursor = container.walk();
    for child in container.named_children(&mut cursor) {
        if is_type_declaration(child) {
            out.push(child);
        } else if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            for gc in child.named_children(&mut inner) {
                if is_type_declaration(gc) {
                    out.push(gc);
                }
            }
        }
    }
    out
}

/// Locate a (possibly nested) type by dotted name relative to `node`:
/// `Outer.Inner` splits at the first dot, matches a direct member, and
/// recurses with the remainder. Absence is `None`, never a fault.
pub fn find_type<'t>(node: Node<'t>, source: &str, qualified_name: &str) -> Option<Node<'t>> {
    let (head, rest) = match qualified_name.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (qualified_name, None),
    };
    let found = direct_type_declarations(node)
        .into_iter()
        .find(|d| declared_name(*d, source).as_deref() == Some(head))?;
    match rest {
        None => Some(found),
        Some(rest) => find_type(found, source, rest),
    }
}

pub fn demand_class_or_interface<'t>(
    node: Node<'t>,
    source: &str,
    qualified_name: &str,
) -> Result<Node<'t>> {
    let found = find_type(node, source, qualified_name)
        .ok_or_else(|| ResolveError::NotFound(qualified_name.to_string()))?;
    if !matches!(found.kind(), "class_declaration" | "interface_declaration") {
        return Err(ResolveError::WrongKind {
            name: qualified_name.to_string(),
            expected: "a class or interface",
        });
    }
    Ok(found)
}

pub fn demand_class<'t>(node: Node<'t>, source: &str, qualified_name: &str) -> Result<Node<'t>> {
    let found = demand_class_or_interface(node, source, qualified_name)?;
    if found.kind() == "interface_declaration" {
        return Err(ResolveError::WrongKind {
            name: qualified_name.to_string(),
            expected: "a class",
        });
    }
    Ok(found)
}

pub fn demand_enum<'t>(node: Node<'t>, source: &str, qualified_name: &str) -> Result<Node<'t>> {
    let found = find_type(node, source, qualified_name)
        .ok_or_else(|| ResolveError::NotFound(qualified_name.to_string()))?;
    if found.kind() != "enum_declaration" {
        return Err(ResolveError::WrongKind {
            name: qualified_name.to_string(),
            expected: "an enum",
        });
    }
    Ok(found)
}

/// The unique directly-declared method with this simple name. Zero matches
/// is a fault, as is an overload set; overloads need argument-driven
/// selection instead.
pub fn demand_method<'t>(type_node: Node<'t>, source: &str, name: &str) -> Result<Node<'t>> {
    let Some(body) = type_node.child_by_field_name("body") else {
        return Err(ResolveError::NotFound(name.to_string()));
    };
    let mut found = None;
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() == "method_declaration"
            && declared_name(member, source).as_deref() == Some(name)
        {
            if found.is_some() {
                return Err(ResolveError::AmbiguousName(name.to_string()));
            }
            found = Some(member);
        }
    }
    found.ok_or_else(|| ResolveError::NotFound(name.to_string()))
}

/// The declarator of a directly-declared field with this name.
pub fn demand_field<'t>(type_node: Node<'t>, source: &str, name: &str) -> Result<Node<'t>> {
    let Some(body) = type_node.child_by_field_name("body") else {
        return Err(ResolveError::NotFound(name.to_string()));
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if !matches!(member.kind(), "field_declaration" | "constant_declaration") {
            continue;
        }
        let mut inner = member.walk();
        for declarator in member.named_children(&mut inner) {
            if declarator.kind() == "variable_declarator"
                && declared_name(declarator, source).as_deref() == Some(name)
            {
                return Ok(declarator);
            }
        }
    }
    Err(ResolveError::NotFound(name.to_string()))
}

fn first_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_of_kind(child, kind) {
            return Some(found);
        }
    }
    None
}

/// First descendant (pre-order, including `node` itself) of the given kind.
pub fn find_node_of_kind<'t>(node: Node<'t>, kind: &str) -> Result<Node<'t>> {
    first_of_kind(node, kind).ok_or_else(|| ResolveError::NotFound(kind.to_string()))
}

/// All descendants of the given kind, pre-order left to right.
pub fn find_all_nodes_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect_kind(node, kind, &mut out);
    out
}

fn collect_kind<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    if node.kind() == kind {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_kind(child, kind, out);
    }
}

/// Nearest enclosing node of the given kind, walking parents iteratively.
pub fn find_ancestor<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if candidate.kind() == kind {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

pub fn find_method_calls<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    find_all_nodes_of_kind(node, "method_invocation")
}

/// First method invocation with the given simple name, pre-order.
pub fn find_method_call<'t>(node: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    find_method_calls(node)
        .into_iter()
        .find(|call| declared_name(*call, source).as_deref() == Some(name))
}

/// Declarator or formal parameter introducing `name`, searching the subtree
/// of `node` only.
pub fn find_variable_declaration<'t>(
    node: Node<'t>,
    source: &str,
    name: &str,
) -> Option<Node<'t>> {
    let matches_name = match node.kind() {
        "variable_declarator" | "formal_parameter" => {
            declared_name(node, source).as_deref() == Some(name)
        }
        _ => false,
    };
    if matches_name {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_variable_declaration(child, source, name) {
            return Some(found);
        }
    }
    None
}

/// Like [`find_variable_declaration`], but on a miss retries at each
/// enclosing scope up to the root. Finds declarations that are lexically
/// visible rather than only those below the starting node.
pub fn find_variable_declaration_rescoping<'t>(
    node: Node<'t>,
    source: &str,
    name: &str,
) -> Option<Node<'t>> {
    let mut scope = Some(node);
    while let Some(current) = scope {
        if let Some(found) = find_variable_declaration(current, source, name) {
            return Some(found);
        }
        scope = current.parent();
    }
    None
}

/// Expressions contributing to the value of a builder-style variable, in
/// source order: declaration initializers, reassigned values, and the
/// arguments of `append(...)` calls rooted at the variable.
pub fn builder_append_chain<'t>(
    node: Node<'t>,
    source: &str,
    variable_name: &str,
) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect_append_chain(node, source, variable_name, &mut out);
    out
}

fn collect_append_chain<'t>(
    node: Node<'t>,
    source: &str,
    variable_name: &str,
    out: &mut Vec<Node<'t>>,
) {
    match node.kind() {
        "variable_declarator" => {
            if declared_name(node, source).as_deref() == Some(variable_name) {
                if let Some(value) = node.child_by_field_name("value") {
                    out.push(value);
                }
                return;
            }
        }
        "assignment_expression" => {
            let assigns_variable = node
                .child_by_field_name("left")
                .and_then(|l| l.utf8_text(source.as_bytes()).ok())
                == Some(variable_name);
            if assigns_variable {
                if let Some(right) = node.child_by_field_name("right") {
                    out.push(right);
                }
                return;
            }
        }
        "method_invocation" => {
            // A matched chain is consumed whole; its children are not
            // re-scanned.
            if let Some(arguments) = append_chain_arguments(node, source, variable_name) {
                out.extend(arguments);
                return;
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_append_chain(child, source, variable_name, out);
    }
}

/// Arguments of a `v.append(a).append(b)...` chain rooted at the named
/// variable. The chain is walked outermost-first and reversed so the result
/// is in source order.
fn append_chain_arguments<'t>(
    node: Node<'t>,
    source: &str,
    variable_name: &str,
) -> Option<Vec<Node<'t>>> {
    let mut collected = Vec::new();
    let mut current = node;
    while current.kind() == "method_invocation" {
        if declared_name(current, source).as_deref() != Some("append") {
            return None;
        }
        let arguments = current.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        collected.extend(arguments.named_children(&mut cursor));
        current = current.child_by_field_name("object")?;
    }
    if current.kind() == "identifier"
        && current.utf8_text(source.as_bytes()).ok() == Some(variable_name)
    {
        collected.reverse();
        Some(collected)
    } else {
        None
    }
}
