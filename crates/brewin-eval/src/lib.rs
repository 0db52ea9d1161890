//! Brewin tree-walking evaluator.
//!
//! Runs a parsed [`Program`](brewin_types::ast::Program) directly from the
//! AST: lexical scopes of shared cells, arity-overloaded functions,
//! by-reference parameters and closures that capture by copy.

mod config;
mod env;
mod error;
mod evaluator;
mod host;
mod interpreter;
pub mod ops;
mod registry;
mod value;

pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use env::{new_cell, Cell, Environment, Scope};
pub use error::{ErrorKind, EvalError, EvalResult, RunError};
pub use evaluator::{Callee, Evaluator, Flow};
pub use host::{Host, ScriptedHost};
pub use interpreter::{check_source, parse_source, run_source, Interpreter};
pub use registry::{FunctionRegistry, MAIN};
pub use value::{Captures, Closure, FunctionRef, Value};
