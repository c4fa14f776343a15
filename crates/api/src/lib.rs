pub mod error;
pub mod models;
pub mod semantic;

pub use error::{ResolveError, Result};
pub use models::*;
pub use semantic::TypeSystem;
