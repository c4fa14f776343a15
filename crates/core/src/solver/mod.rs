//! The resolver chain.
//!
//! A solver answers from local knowledge only; composing solvers into a
//! parent chain and driving the fallback is the caller's job, via
//! [`solve_in_chain`].

use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;
use typescope_api::models::{DeclarationKind, SymbolReference, TypeDeclaration};
use typescope_api::{ResolveError, Result};

mod memory;

pub use memory::MemoryTypeSolver;

/// Upper bound on parent-chain traversal. The parent pointer is assigned
/// freely at composition time, so a cyclic chain is representable; the bound
/// turns it into a hard fault instead of an infinite loop.
pub const MAX_CHAIN_DEPTH: usize = 32;

pub trait TypeSolver: Send + Sync {
    /// Resolve a qualified name from local knowledge only. Implementations
    /// must not consult their parent.
    fn try_solve(&self, name: &str) -> Result<SymbolReference<Arc<TypeDeclaration>>>;

    fn parent(&self) -> Option<Arc<dyn TypeSolver>>;

    /// Assign the parent. Allowed after construction; single assignment by
    /// convention, not enforced.
    fn set_parent(&self, parent: Arc<dyn TypeSolver>);

    /// Qualified names this solver can enumerate locally; `None` where
    /// enumeration is unsupported.
    fn defined_type_names(&self) -> Option<Vec<String>> {
        None
    }
}

/// Try the solver itself, then walk the parent chain on each miss.
pub fn solve_in_chain(
    solver: &dyn TypeSolver,
    name: &str,
) -> Result<SymbolReference<Arc<TypeDeclaration>>> {
    let local = solver.try_solve(name)?;
    if local.is_solved() {
        return Ok(local);
    }

    let mut depth = 0usize;
    let mut current = solver.parent();
    while let Some(next) = current {
        depth += 1;
        if depth > MAX_CHAIN_DEPTH {
            return Err(ResolveError::ChainDepthExceeded(MAX_CHAIN_DEPTH));
        }
        let found = next.try_solve(name)?;
        if found.is_solved() {
            trace!(name, depth, "resolved through parent chain");
            return Ok(found);
        }
        current = next.parent();
    }
    Ok(SymbolReference::unsolved(DeclarationKind::Class))
}

/// Shared parent-pointer storage so every solver exposes identical accessor
/// behavior.
#[derive(Default)]
pub struct ParentLink {
    parent: RwLock<Option<Arc<dyn TypeSolver>>>,
}

impl ParentLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<dyn TypeSolver>> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, parent: Arc<dyn TypeSolver>) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
    }
}
