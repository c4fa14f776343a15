use std::collections::HashMap;
use std::sync::Arc;

use typescope_api::models::{DeclarationKind, SymbolReference, TypeDeclaration};
use typescope_api::Result;

use super::{ParentLink, TypeSolver};

/// In-memory solver backed by an explicit name→declaration map.
///
/// Used to inject synthetic or bootstrap symbols; resolution is an exact
/// lookup, nothing is derived.
#[derive(Default)]
pub struct MemoryTypeSolver {
    declarations: HashMap<String, Arc<TypeDeclaration>>,
    parent: ParentLink,
}

impl MemoryTypeSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, declaration: Arc<TypeDeclaration>) {
        self.declarations.insert(name.into(), declaration);
    }
}

impl TypeSolver for MemoryTypeSolver {
    fn try_solve(&self, name: &str) -> Result<SymbolReference<Arc<TypeDeclaration>>> {
        Ok(match self.declarations.get(name) {
            Some(declaration) => SymbolReference::solved(declaration.clone()),
            None => SymbolReference::unsolved(DeclarationKind::Class),
        })
    }

    fn parent(&self) -> Option<Arc<dyn TypeSolver>> {
        self.parent.get()
    }

    fn set_parent(&self, parent: Arc<dyn TypeSolver>) {
        self.parent.set(parent);
    }

    // Enumeration is not supported for injected symbols.
}
