mod declarations;
mod resolution;
mod types;

pub use declarations::{
    FieldDeclaration, MethodDeclaration, MethodUsage, ParameterDeclaration, TypeDeclaration,
    TypeKind, TypeParameter,
};
pub use resolution::{DeclarationKind, SymbolReference};
pub use types::{PrimitiveKind, TypeExpr, WildcardBound};
