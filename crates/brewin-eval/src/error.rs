//! Runtime error types for the Brewin evaluator.

use brewin_types::CompileErrors;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Evaluation error. Every variant is fatal: the run stops where it is raised.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Undefined or ambiguous name, bad built-in arguments, invalid program shape.
    #[error("name error: {0}")]
    NameError(String),
    /// Operand or condition of the wrong type, bad call target or arity.
    #[error("type error: {0}")]
    TypeError(String),
    /// Division by zero or 64-bit overflow.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),
    /// Too many nested user-level calls.
    #[error("recursion limit exceeded: more than {0} nested calls")]
    RecursionLimit(usize),
    /// The host failed to read input or write output.
    #[error("host i/o error: {0}")]
    Io(#[from] io::Error),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NameError(_) => ErrorKind::NameError,
            Self::TypeError(_) => ErrorKind::TypeError,
            Self::ArithmeticTrap(_) => ErrorKind::ArithmeticError,
            Self::RecursionLimit(_) => ErrorKind::ResourceError,
            Self::Io(_) => ErrorKind::IoError,
        }
    }
}

/// Coarse classification of an [`EvalError`], used in structured reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NameError,
    TypeError,
    ArithmeticError,
    ResourceError,
    IoError,
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Failure of the whole source-to-execution pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Syntax(CompileErrors),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<CompileErrors> for RunError {
    fn from(errors: CompileErrors) -> Self {
        RunError::Syntax(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(EvalError::NameError("x".into()).kind(), ErrorKind::NameError);
        assert_eq!(EvalError::TypeError("x".into()).kind(), ErrorKind::TypeError);
        assert_eq!(EvalError::RecursionLimit(3).kind(), ErrorKind::ResourceError);
        let io = io::Error::new(io::ErrorKind::UnexpectedEof, "no more input");
        assert_eq!(EvalError::from(io).kind(), ErrorKind::IoError);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            EvalError::NameError("variable 'x' has not been defined".into()).to_string(),
            "name error: variable 'x' has not been defined"
        );
        assert_eq!(
            EvalError::RecursionLimit(100).to_string(),
            "recursion limit exceeded: more than 100 nested calls"
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TypeError).unwrap();
        assert_eq!(json, "\"type_error\"");
    }
}
