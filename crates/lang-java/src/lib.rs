//! Java backend: tree-sitter parsing, AST navigation, a source-backed type
//! solver and a solver-backed type system.

pub mod navigator;
pub mod parser;
pub mod solver;
pub mod type_system;

pub use parser::JavaParser;
pub use solver::SourceTypeSolver;
pub use type_system::SolverTypeSystem;
