//! Shared types for the Brewin interpreter.
//!
//! This crate defines the AST node types, source spans, and the syntax
//! diagnostics shared by the lexer, the parser and the evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{BrewinError, CompileErrors, ErrorCode, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the front end.
pub type Result<T> = std::result::Result<T, BrewinError>;
