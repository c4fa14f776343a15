pub mod resolution;
pub mod solver;

pub use typescope_api::{ResolveError, Result};
