use std::path::PathBuf;
use thiserror::Error;

/// Faults raised by the resolution engine.
///
/// Ordinary "not found" results are never errors; they travel as
/// [`crate::models::SymbolReference::Unsolved`] values. Everything here is
/// either a caller precondition violation, a gap in variance coverage, or a
/// misconfigured resolver, and must propagate rather than be swallowed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("ambiguous method call: cannot pick between {0} and {1}")]
    AmbiguousMethodCall(String, String),
    #[error("ambiguous name: multiple members named `{0}`")]
    AmbiguousName(String),
    #[error("no match found for `{0}`")]
    NotFound(String),
    #[error("`{name}` is not {expected}")]
    WrongKind { name: String, expected: &'static str },
    #[error("unsupported type shape: {0}")]
    UnsupportedTypeShape(String),
    #[error("source root does not exist or is not a directory: {0}")]
    SourceRootMissing(PathBuf),
    #[error("resolver chain exceeded depth limit of {0}")]
    ChainDepthExceeded(usize),
    #[error("failed to parse {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
