//! Declarations extracted from parsed sources.
//!
//! A `TypeDeclaration` owns its members; methods point back to their
//! declaring type by qualified name, so declarations stay acyclic and a
//! declaring type is recovered through the solver when needed.

use std::sync::{Arc, Weak};

use crate::models::types::TypeExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

/// A generic type parameter declaration. At most one bound is supported by
/// the substitution logic; extras surface as unsupported-shape faults there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub name: String,
    /// For a variadic parameter this is the declared array type.
    pub ty: TypeExpr,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub name: String,
    pub params: Vec<ParameterDeclaration>,
    pub type_params: Vec<TypeParameter>,
    /// `None` for `void`.
    pub return_type: Option<TypeExpr>,
    /// Qualified name of the declaring type.
    pub declaring_type: String,
}

impl MethodDeclaration {
    pub fn has_variadic_parameter(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_variadic)
    }

    /// Declaring type, name and parameter types; distinct declarations with
    /// the same text collapse only when they share a declaring type.
    pub fn qualified_signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.describe()).collect();
        format!(
            "{}.{}({})",
            self.declaring_type,
            self.name,
            params.join(", ")
        )
    }
}

/// A class, interface or enum declaration.
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    /// Dot-delimited, outer-to-inner for nested types.
    pub qualified_name: String,
    pub name: String,
    pub kind: TypeKind,
    pub type_params: Vec<TypeParameter>,
    /// Declared extends/implements clauses, in source order.
    pub supertypes: Vec<TypeExpr>,
    pub methods: Vec<Arc<MethodDeclaration>>,
    pub fields: Vec<FieldDeclaration>,
    /// Nested member types, in source order.
    pub nested: Vec<Arc<TypeDeclaration>>,
}

impl TypeDeclaration {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn find_nested(&self, simple_name: &str) -> Option<&Arc<TypeDeclaration>> {
        self.nested.iter().find(|t| t.name == simple_name)
    }
}

/// A method declaration with a type-argument substitution overlay applied.
///
/// Owns its substituted parameter and return types; the link back to the
/// originating declaration is identity, not ownership, so it is weak.
/// Created per query, never cached.
#[derive(Debug, Clone)]
pub struct MethodUsage {
    pub name: String,
    pub declaring_type: String,
    pub declaration: Weak<MethodDeclaration>,
    pub param_types: Vec<TypeExpr>,
    pub return_type: Option<TypeExpr>,
}

impl MethodUsage {
    pub fn new(declaration: &Arc<MethodDeclaration>) -> Self {
        MethodUsage {
            name: declaration.name.clone(),
            declaring_type: declaration.declaring_type.clone(),
            declaration: Arc::downgrade(declaration),
            param_types: declaration.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: declaration.return_type.clone(),
        }
    }

    pub fn declaration(&self) -> Option<Arc<MethodDeclaration>> {
        self.declaration.upgrade()
    }

    /// New overlay with every occurrence of the named type variable replaced.
    pub fn substituting(&self, var: &str, replacement: &TypeExpr) -> Self {
        MethodUsage {
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            declaration: self.declaration.clone(),
            param_types: self
                .param_types
                .iter()
                .map(|t| t.replace_type_variables(var, replacement))
                .collect(),
            return_type: self
                .return_type
                .as_ref()
                .map(|t| t.replace_type_variables(var, replacement)),
        }
    }
}
