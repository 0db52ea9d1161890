//! Scoped variable environment for the Brewin evaluator.
//!
//! Names bind to [`Cell`]s rather than to values. Two names that share a cell
//! are aliases: this is how `ref` parameters write back into the caller.

use crate::value::{Captures, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared mutable storage for one variable.
pub type Cell = Rc<RefCell<Value>>;

pub fn new_cell(value: Value) -> Cell {
    Rc::new(RefCell::new(value))
}

/// A single scope level: name → cell.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, Cell>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.bindings.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, cell: Cell) {
        self.bindings.insert(name.into(), cell);
    }

    /// A frame holding a closure's captured bindings in fresh cells.
    pub fn from_captures(captures: &Captures) -> Scope {
        let bindings = captures
            .iter()
            .map(|(name, value)| (name.clone(), new_cell(value.clone())))
            .collect();
        Scope { bindings }
    }

    /// Current values, or `None` when every cell still holds exactly what
    /// `original` does.
    pub fn changes_from(&self, original: &Captures) -> Option<Captures> {
        let unchanged = self.bindings.len() == original.len()
            && self.bindings.iter().all(|(name, cell)| {
                original
                    .get(name)
                    .is_some_and(|value| cell.borrow().is_identical(value))
            });
        if unchanged {
            return None;
        }
        Some(
            self.bindings
                .iter()
                .map(|(name, cell)| (name.clone(), cell.borrow().clone()))
                .collect(),
        )
    }
}

/// Scoped variable environment with push/pop semantics.
///
/// Variables are looked up from innermost scope outward.
/// `assign` updates the nearest existing binding, else creates one in the
/// innermost scope. `declare_local` always creates in the innermost scope.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Create a new environment with one empty base scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    /// Push a new empty scope (call body, taken branch, loop iteration).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Push a closure's captured frame. The pushed frame shares the given
    /// scope's cells, so the caller can read back what the call wrote.
    pub fn push_closure_scope(&mut self, captured: &Scope) {
        self.scopes.push(captured.clone());
    }

    /// Pop the innermost scope. The base scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Find the cell a name is bound to, searching innermost → outermost.
    pub fn lookup_cell(&self, name: &str) -> Option<&Cell> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Look up a variable's current value.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.lookup_cell(name).map(|cell| cell.borrow().clone())
    }

    /// Write through the nearest existing binding, or create one in the
    /// innermost scope.
    pub fn assign(&mut self, name: &str, value: Value) {
        match self.lookup_cell(name) {
            Some(cell) => *cell.borrow_mut() = value,
            None => self.declare_local(name, value),
        }
    }

    /// Bind `name` to a fresh cell in the innermost scope, shadowing any
    /// outer binding.
    pub fn declare_local(&mut self, name: &str, value: Value) {
        self.bind_cell(name, new_cell(value));
    }

    /// Bind `name` in the innermost scope to an existing cell (aliasing).
    pub fn bind_cell(&mut self, name: &str, cell: Cell) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, cell);
        }
    }

    /// Every visible binding collapsed into one map (innermost wins). This is
    /// what a lambda captures.
    pub fn flatten(&self) -> Captures {
        let mut flat = Captures::new();
        for scope in &self.scopes {
            for (name, cell) in &scope.bindings {
                flat.insert(name.clone(), cell.borrow().clone());
            }
        }
        flat
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
