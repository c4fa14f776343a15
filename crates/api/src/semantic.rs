//! Capability trait consumed by the resolution engine.
//!
//! The engine does not own assignability or hierarchy knowledge; it works
//! against this trait so that source-backed, synthetic and mock type systems
//! are interchangeable.

use std::sync::Arc;

use crate::models::{TypeDeclaration, TypeExpr};

pub trait TypeSystem: Send + Sync {
    /// Look up a type declaration by qualified name.
    ///
    /// Returns `None` when the name is unknown to the backing solver.
    fn lookup(&self, qualified_name: &str) -> Option<Arc<TypeDeclaration>>;

    /// Whether `target` is assignable by `source` (i.e. a value of type
    /// `source` can bind to a slot of type `target`).
    fn is_assignable(&self, target: &TypeExpr, source: &TypeExpr) -> bool;

    /// All reference-typed ancestors of `reference`, with type arguments
    /// substituted where derivable, in BFS order.
    fn ancestors(&self, reference: &TypeExpr) -> Vec<TypeExpr>;

    /// The universal reference type every unbounded substitution falls back
    /// to.
    fn object_type(&self) -> TypeExpr {
        TypeExpr::reference("java.lang.Object")
    }
}
