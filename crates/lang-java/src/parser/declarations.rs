//! Declaration extraction from parsed compilation units.

use tree_sitter::Node;
use typescope_api::models::{
    FieldDeclaration, MethodDeclaration, ParameterDeclaration, TypeDeclaration, TypeExpr,
    TypeKind, TypeParameter,
};

use super::types::{TypeParamScope, parse_type_node_scoped};
use std::sync::Arc;

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

/// Build a [`TypeDeclaration`] from a class, interface or enum node.
///
/// `prefix` is the dot-delimited qualifier (package plus any outer types);
/// nested members are extracted recursively with this type as their prefix.
pub fn extract_type_declaration(node: Node, source: &str, prefix: Option<&str>) -> TypeDeclaration {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or_default();
    let qualified_name = match prefix {
        Some(p) if !p.is_empty() => format!("{p}.{name}"),
        _ => name.clone(),
    };
    let kind = match node.kind() {
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        _ => TypeKind::Class,
    };

    let param_names = type_parameter_names(node.child_by_field_name("type_parameters"), source);
    let scope = TypeParamScope {
        class_params: param_names.clone(),
        method_params: Vec::new(),
    };
    let type_params =
        extract_type_parameters(node.child_by_field_name("type_parameters"), source, &scope);
    let supertypes = extract_supertypes(node, source, &scope);

    let mut methods = Vec::new();
    let mut fields = Vec::new();
    let mut nested = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        collect_members(
            body,
            source,
            &param_names,
            &qualified_name,
            &mut methods,
            &mut fields,
            &mut nested,
        );
    }

    TypeDeclaration {
        qualified_name,
        name,
        kind,
        type_params,
        supertypes,
        methods,
        fields,
        nested,
    }
}

#[allow(clippy::too_many_arguments)]
fn collect_members(
    body: Node,
    source: &str,
    class_params: &[String],
    declaring: &str,
    methods: &mut Vec<Arc<MethodDeclaration>>,
    fields: &mut Vec<FieldDeclaration>,
    nested: &mut Vec<Arc<TypeDeclaration>>,
) {
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "method_declaration" => {
                methods.push(Arc::new(extract_method(member, source, class_params, declaring)));
            }
            "field_declaration" | "constant_declaration" => {
                fields.extend(extract_fields(member, source, class_params));
            }
            "class_declaration" | "interface_declaration" | "enum_declaration" => {
                nested.push(Arc::new(extract_type_declaration(
                    member,
                    source,
                    Some(declaring),
                )));
            }
            // enum members live one level down from the constant list
            "enum_body_declarations" => {
                collect_members(member, source, class_params, declaring, methods, fields, nested);
            }
            _ => {}
        }
    }
}

fn extract_method(
    node: Node,
    source: &str,
    class_params: &[String],
    declaring: &str,
) -> MethodDeclaration {
    let method_param_names =
        type_parameter_names(node.child_by_field_name("type_parameters"), source);
    let scope = TypeParamScope {
        class_params: class_params.to_vec(),
        method_params: method_param_names,
    };
    let type_params =
        extract_type_parameters(node.child_by_field_name("type_parameters"), source, &scope);

    let return_type = node.child_by_field_name("type").and_then(|t| {
        if t.kind() == "void_type" {
            None
        } else {
            Some(parse_type_node_scoped(t, source, &scope))
        }
    });

    MethodDeclaration {
        name: node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default(),
        params: extract_parameters(node, source, &scope),
        type_params,
        return_type,
        declaring_type: declaring.to_string(),
    }
}

fn extract_parameters(
    declaration: Node,
    source: &str,
    scope: &TypeParamScope,
) -> Vec<ParameterDeclaration> {
    let Some(params_node) = declaration.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut result = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.children(&mut cursor) {
        match child.kind() {
            "formal_parameter" => {
                let Some(type_node) = child.child_by_field_name("type") else {
                    continue;
                };
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .unwrap_or_else(|| "arg".to_string());
                result.push(ParameterDeclaration {
                    name,
                    ty: parse_type_node_scoped(type_node, source, scope),
                    is_variadic: false,
                });
            }
            "spread_parameter" => {
                let mut ty = TypeExpr::reference("java.lang.Object");
                let mut name = "arg".to_string();
                let mut inner = child.walk();
                for gc in child.children(&mut inner) {
                    if gc.kind() == "variable_declarator" {
                        if let Some(n) = gc.child_by_field_name("name") {
                            name = node_text(n, source);
                        }
                    } else if gc.kind() != "..." && gc.is_named() {
                        // declared type is the array type
                        ty = TypeExpr::array(parse_type_node_scoped(gc, source, scope));
                    }
                }
                result.push(ParameterDeclaration {
                    name,
                    ty,
                    is_variadic: true,
                });
            }
            _ => {}
        }
    }
    result
}

fn extract_fields(node: Node, source: &str, class_params: &[String]) -> Vec<FieldDeclaration> {
    let Some(type_node) = node.child_by_field_name("type") else {
        return Vec::new();
    };
    let scope = TypeParamScope {
        class_params: class_params.to_vec(),
        method_params: Vec::new(),
    };
    let ty = parse_type_node_scoped(type_node, source, &scope);
    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "variable_declarator" {
            if let Some(name) = child.child_by_field_name("name") {
                fields.push(FieldDeclaration {
                    name: node_text(name, source),
                    ty: ty.clone(),
                });
            }
        }
    }
    fields
}

fn type_parameter_names(type_parameters: Option<Node>, source: &str) -> Vec<String> {
    let Some(tp) = type_parameters else {
        return Vec::new();
    };
    let mut names = Vec::new();
    let mut cursor = tp.walk();
    for param in tp.named_children(&mut cursor) {
        if param.kind() != "type_parameter" {
            continue;
        }
        let mut inner = param.walk();
        for child in param.named_children(&mut inner) {
            if matches!(child.kind(), "identifier" | "type_identifier") {
                names.push(node_text(child, source));
                break;
            }
        }
    }
    names
}

fn extract_type_parameters(
    type_parameters: Option<Node>,
    source: &str,
    scope: &TypeParamScope,
) -> Vec<TypeParameter> {
    let Some(tp) = type_parameters else {
        return Vec::new();
    };
    let mut params = Vec::new();
    let mut cursor = tp.walk();
    for param in tp.named_children(&mut cursor) {
        if param.kind() != "type_parameter" {
            continue;
        }
        let mut name = String::new();
        let mut bounds = Vec::new();
        let mut inner = param.walk();
        for child in param.named_children(&mut inner) {
            match child.kind() {
                "identifier" | "type_identifier" if name.is_empty() => {
                    name = node_text(child, source);
                }
                "type_bound" => {
                    let mut bound_cursor = child.walk();
                    for bound in child.named_children(&mut bound_cursor) {
                        bounds.push(parse_type_node_scoped(bound, source, scope));
                    }
                }
                _ => {}
            }
        }
        params.push(TypeParameter { name, bounds });
    }
    params
}

fn extract_supertypes(node: Node, source: &str, scope: &TypeParamScope) -> Vec<TypeExpr> {
    let mut supertypes = Vec::new();
    if let Some(superclass) = node.child_by_field_name("superclass") {
        let mut cursor = superclass.walk();
        for child in superclass.named_children(&mut cursor) {
            supertypes.push(parse_type_node_scoped(child, source, scope));
        }
    }
    if let Some(interfaces) = node.child_by_field_name("interfaces") {
        push_type_list(interfaces, source, scope, &mut supertypes);
    }
    // interface extends clause is not a field
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "extends_interfaces" {
            push_type_list(child, source, scope, &mut supertypes);
        }
    }
    supertypes
}

fn push_type_list(node: Node, source: &str, scope: &TypeParamScope, out: &mut Vec<TypeExpr>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut list_cursor = child.walk();
            for ty in child.named_children(&mut list_cursor) {
                out.push(parse_type_node_scoped(ty, source, scope));
            }
        }
    }
}
