//! Evaluator limits.

/// Default bound on nested user-level calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Runtime configuration for an [`Interpreter`](crate::Interpreter) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Calls nested deeper than this fail with a recursion-limit error.
    pub max_call_depth: usize,
}

impl EvalConfig {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
