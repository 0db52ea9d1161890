//! Top-level function table: name → arity → definition.

use crate::error::{EvalError, EvalResult};
use crate::value::FunctionRef;
use brewin_types::ast::{FunctionDecl, Program};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Name of the entry point every program must define.
pub const MAIN: &str = "main";

/// Every top-level function of a program, overloaded by arity.
///
/// Built once when a program is loaded and immutable afterwards.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, BTreeMap<usize, Rc<FunctionDecl>>>,
}

impl FunctionRegistry {
    /// Build the registry, rejecting duplicate (name, arity) pairs.
    pub fn from_program(program: &Program) -> EvalResult<Self> {
        let mut functions: HashMap<String, BTreeMap<usize, Rc<FunctionDecl>>> = HashMap::new();
        for decl in &program.functions {
            let name = &decl.name.name;
            let arity = decl.arity();
            let overloads = functions.entry(name.clone()).or_default();
            if overloads.contains_key(&arity) {
                return Err(EvalError::NameError(format!(
                    "function '{name}' with {arity} parameter(s) is defined more than once (line {})",
                    decl.span.start_line
                )));
            }
            overloads.insert(arity, Rc::clone(decl));
        }
        tracing::debug!(
            functions = program.functions.len(),
            names = functions.len(),
            "function registry loaded"
        );
        Ok(Self { functions })
    }

    pub fn get(&self, name: &str, arity: usize) -> Option<&Rc<FunctionDecl>> {
        self.functions.get(name)?.get(&arity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Arities defined for `name`, ascending.
    pub fn overloads(&self, name: &str) -> Vec<usize> {
        self.functions
            .get(name)
            .map(|by_arity| by_arity.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Resolve a bare function name used as a value.
    ///
    /// `Ok(None)` when no function has that name; an error when the name is
    /// overloaded and so does not identify a single definition.
    pub fn resolve_value(&self, name: &str) -> EvalResult<Option<FunctionRef>> {
        let Some(by_arity) = self.functions.get(name) else {
            return Ok(None);
        };
        let mut decls = by_arity.values();
        match (decls.next(), decls.next()) {
            (Some(decl), None) => Ok(Some(FunctionRef::new(Rc::clone(decl)))),
            _ => Err(EvalError::NameError(format!(
                "function '{name}' is overloaded ({} definitions); its name alone is ambiguous",
                by_arity.len()
            ))),
        }
    }

    /// The program entry point: `main` with no parameters, not overloaded.
    pub fn main(&self) -> EvalResult<Rc<FunctionDecl>> {
        let by_arity = self
            .functions
            .get(MAIN)
            .ok_or_else(|| EvalError::NameError("no main() function found".into()))?;
        if by_arity.len() > 1 {
            return Err(EvalError::NameError("main() must not be overloaded".into()));
        }
        by_arity
            .get(&0)
            .cloned()
            .ok_or_else(|| EvalError::NameError("main() must take no parameters".into()))
    }
}
