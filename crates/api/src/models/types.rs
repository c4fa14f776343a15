//! Type expressions as a closed tagged union.
//!
//! These are pure data: a reference carries its dot-qualified name and type
//! arguments, and resolution back to a declaration happens on demand through
//! a solver rather than via an embedded pointer.

use serde::{Deserialize, Serialize};

/// The eight primitive types, plus widening knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn from_str(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => PrimitiveKind::Boolean,
            "byte" => PrimitiveKind::Byte,
            "short" => PrimitiveKind::Short,
            "char" => PrimitiveKind::Char,
            "int" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    /// Widening primitive conversion, including identity.
    pub fn widens_to(&self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::*;
        if *self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short => matches!(target, Int | Long | Float | Double),
            Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            _ => false,
        }
    }
}

/// Bound of a wildcard type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<TypeExpr>),
    Super(Box<TypeExpr>),
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    /// Array type; nested elements model multiple dimensions.
    Array { element: Box<TypeExpr> },
    /// Class, interface or enum reference with its type arguments.
    Reference { name: String, args: Vec<TypeExpr> },
    /// A type variable; `on_method` distinguishes method-level from
    /// class-level parameters.
    Variable { name: String, on_method: bool },
    Wildcard { bound: WildcardBound },
}

impl TypeExpr {
    /// Raw (argument-free) reference to a qualified type name.
    pub fn reference(name: impl Into<String>) -> Self {
        TypeExpr::Reference {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array {
            element: Box::new(element),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeExpr::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeExpr::Reference { .. })
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeExpr::Wildcard { .. })
    }

    /// Number of array dimensions wrapping this type; 0 for non-arrays.
    pub fn array_level(&self) -> usize {
        match self {
            TypeExpr::Array { element } => 1 + element.array_level(),
            _ => 0,
        }
    }

    /// Human-readable rendering, used in signatures and error messages.
    pub fn describe(&self) -> String {
        match self {
            TypeExpr::Primitive(p) => p.as_str().to_string(),
            TypeExpr::Array { element } => format!("{}[]", element.describe()),
            TypeExpr::Reference { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let rendered: Vec<String> = args.iter().map(|a| a.describe()).collect();
                    format!("{}<{}>", name, rendered.join(", "))
                }
            }
            TypeExpr::Variable { name, .. } => name.clone(),
            TypeExpr::Wildcard { bound } => match bound {
                WildcardBound::Unbounded => "?".to_string(),
                WildcardBound::Extends(b) => format!("? extends {}", b.describe()),
                WildcardBound::Super(b) => format!("? super {}", b.describe()),
            },
        }
    }

    /// Recursively substitute every type variable named `name` with
    /// `replacement`, producing a new expression.
    pub fn replace_type_variables(&self, name: &str, replacement: &TypeExpr) -> TypeExpr {
        match self {
            TypeExpr::Variable { name: n, .. } if n == name => replacement.clone(),
            TypeExpr::Variable { .. } | TypeExpr::Primitive(_) => self.clone(),
            TypeExpr::Array { element } => {
                TypeExpr::array(element.replace_type_variables(name, replacement))
            }
            TypeExpr::Reference { name: n, args } => TypeExpr::Reference {
                name: n.clone(),
                args: args
                    .iter()
                    .map(|a| a.replace_type_variables(name, replacement))
                    .collect(),
            },
            TypeExpr::Wildcard { bound } => TypeExpr::Wildcard {
                bound: match bound {
                    WildcardBound::Unbounded => WildcardBound::Unbounded,
                    WildcardBound::Extends(b) => WildcardBound::Extends(Box::new(
                        b.replace_type_variables(name, replacement),
                    )),
                    WildcardBound::Super(b) => WildcardBound::Super(Box::new(
                        b.replace_type_variables(name, replacement),
                    )),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_renders_generics_and_arrays() {
        let ty = TypeExpr::array(TypeExpr::Reference {
            name: "java.util.List".into(),
            args: vec![TypeExpr::Wildcard {
                bound: WildcardBound::Extends(Box::new(TypeExpr::reference("java.lang.Number"))),
            }],
        });
        assert_eq!(ty.describe(), "java.util.List<? extends java.lang.Number>[]");
        assert_eq!(ty.array_level(), 1);
    }

    #[test]
    fn replace_type_variables_reaches_nested_positions() {
        let ty = TypeExpr::Reference {
            name: "java.util.Map".into(),
            args: vec![
                TypeExpr::Variable {
                    name: "K".into(),
                    on_method: false,
                },
                TypeExpr::array(TypeExpr::Variable {
                    name: "K".into(),
                    on_method: false,
                }),
            ],
        };
        let replaced = ty.replace_type_variables("K", &TypeExpr::reference("java.lang.String"));
        assert_eq!(
            replaced.describe(),
            "java.util.Map<java.lang.String, java.lang.String[]>"
        );
    }

    #[test]
    fn widening_is_not_symmetric() {
        assert!(PrimitiveKind::Int.widens_to(PrimitiveKind::Long));
        assert!(!PrimitiveKind::Long.widens_to(PrimitiveKind::Int));
        assert!(!PrimitiveKind::Boolean.widens_to(PrimitiveKind::Int));
    }
}
