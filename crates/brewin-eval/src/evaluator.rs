//! Core expression and statement evaluator.

use crate::config::EvalConfig;
use crate::env::{Cell, Environment, Scope};
use crate::error::{EvalError, EvalResult};
use crate::host::Host;
use crate::ops;
use crate::registry::FunctionRegistry;
use crate::value::{Captures, Closure, Value};
use brewin_types::ast::*;
use std::fmt;
use std::rc::Rc;

/// Keep at least this much stack free before recursing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack segment allocated when the red zone is reached (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Replace the closure in `home` with one holding `updated` captures, unless
/// the call already rebound that variable to something else.
fn store_captures(home: &Cell, called: &Closure, updated: Captures) {
    let still_bound = matches!(
        &*home.borrow(),
        Value::Closure(current) if current.shares_state(called)
    );
    if still_bound {
        *home.borrow_mut() = Value::Closure(Closure::new(Rc::clone(&called.lambda), updated));
    }
}

/// Outcome of running a statement: fall through, or unwind to the caller.
#[derive(Debug)]
pub enum Flow {
    Next,
    Return(Value),
}

/// Something a call expression can resolve to.
#[derive(Debug, Clone)]
pub enum Callee {
    Function(Rc<FunctionDecl>),
    /// A closure and the variable it was called through. Captured state the
    /// call changes is stored back into that variable.
    Closure { closure: Closure, home: Cell },
}

impl Callee {
    fn params(&self) -> &[Param] {
        match self {
            Callee::Function(decl) => &decl.params,
            Callee::Closure { closure, .. } => &closure.lambda.params,
        }
    }

    fn body(&self) -> &Block {
        match self {
            Callee::Function(decl) => &decl.body,
            Callee::Closure { closure, .. } => &closure.lambda.body,
        }
    }
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Function(decl) => write!(f, "{}/{}", decl.name.name, decl.arity()),
            Callee::Closure { closure, .. } => write!(f, "<lambda/{}>", closure.arity()),
        }
    }
}

/// The tree-walking evaluator.
///
/// Holds everything that outlives a single call: the function table, the
/// host and the call-depth counter. Variables live in the [`Environment`]
/// passed down each call chain.
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    host: &'a mut dyn Host,
    config: EvalConfig,
    /// Number of user-level calls currently active.
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, host: &'a mut dyn Host, config: EvalConfig) -> Self {
        Self {
            registry,
            host,
            config,
            depth: 0,
        }
    }

    /// Call a top-level function with no arguments from an empty environment.
    pub fn call_entry(&mut self, decl: &Rc<FunctionDecl>) -> EvalResult<Value> {
        let mut root = Environment::new();
        self.invoke(&Callee::Function(Rc::clone(decl)), &[], &mut root)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    /// Run statements in order, stopping at the first `return`.
    pub fn run_statements(&mut self, stmts: &[Stmt], env: &mut Environment) -> EvalResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, env: &mut Environment) -> EvalResult<Flow> {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value, env)?;
                env.assign(&assign.target.name, value);
                Ok(Flow::Next)
            }
            Stmt::Call(call) => {
                self.eval_call(call, env)?;
                Ok(Flow::Next)
            }
            Stmt::If(if_stmt) => self.exec_if(if_stmt, env),
            Stmt::While(while_stmt) => self.exec_while(while_stmt, env),
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn exec_if(&mut self, if_stmt: &IfStmt, env: &mut Environment) -> EvalResult<Flow> {
        env.push_scope();
        let result = self.eval_condition(&if_stmt.condition, "if", env).and_then(|taken| {
            if taken {
                self.run_statements(&if_stmt.then_block.stmts, env)
            } else if let Some(else_block) = &if_stmt.else_block {
                self.run_statements(&else_block.stmts, env)
            } else {
                Ok(Flow::Next)
            }
        });
        env.pop_scope();
        result
    }

    fn exec_while(&mut self, while_stmt: &WhileStmt, env: &mut Environment) -> EvalResult<Flow> {
        while self.eval_condition(&while_stmt.condition, "while", env)? {
            env.push_scope();
            let flow = self.run_statements(&while_stmt.body.stmts, env);
            env.pop_scope();
            if let Flow::Return(value) = flow? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn eval_condition(
        &mut self,
        condition: &Expr,
        construct: &str,
        env: &mut Environment,
    ) -> EvalResult<bool> {
        let value = self.eval_expr(condition, env)?;
        value.as_bool().ok_or_else(|| {
            EvalError::TypeError(format!(
                "{construct} condition must be a bool or int, got {} (line {})",
                value.type_name(),
                condition.span.start_line
            ))
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr, env: &mut Environment) -> EvalResult<Value> {
        ensure_sufficient_stack(|| match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::StringLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Nil),
            ExprKind::Variable(name) => self.eval_variable(name, env),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                ops::unary(*op, &value)
            }
            ExprKind::Binary { left, op, right } => {
                let lv = self.eval_expr(left, env)?;
                let rv = self.eval_expr(right, env)?;
                ops::binary(*op, &lv, &rv)
            }
            ExprKind::Call(call) => self.eval_call(call, env),
            ExprKind::Lambda(lambda) => Ok(Value::Closure(Closure::new(
                Rc::clone(lambda),
                env.flatten(),
            ))),
        })
    }

    /// Variables shadow functions; a bare function name becomes a value.
    fn eval_variable(&self, name: &str, env: &Environment) -> EvalResult<Value> {
        if let Some(value) = env.lookup(name) {
            return Ok(value);
        }
        match self.registry.resolve_value(name)? {
            Some(func) => Ok(Value::Function(func)),
            None => Err(EvalError::NameError(format!("undefined variable '{name}'"))),
        }
    }

    // ── Calls ────────────────────────────────────────────────────────────

    /// Resolve and perform a call: built-ins, then callables bound in the
    /// environment, then the function registry.
    pub fn eval_call(&mut self, call: &CallExpr, env: &mut Environment) -> EvalResult<Value> {
        let name = call.name.name.as_str();
        match name {
            "print" => return self.builtin_print(&call.args, env),
            "inputi" | "inputs" => return self.builtin_input(name, &call.args, env),
            _ => {}
        }

        if let Some(home) = env.lookup_cell(name).map(Rc::clone) {
            let bound = home.borrow().clone();
            let callee = match bound {
                Value::Function(func) => Callee::Function(func.decl),
                Value::Closure(closure) => Callee::Closure { closure, home },
                other => {
                    return Err(EvalError::TypeError(format!(
                        "'{name}' is a {}, not a function (line {})",
                        other.type_name(),
                        call.span.start_line
                    )));
                }
            };
            return self.invoke(&callee, &call.args, env);
        }

        match self.registry.get(name, call.args.len()) {
            Some(decl) => self.invoke(&Callee::Function(Rc::clone(decl)), &call.args, env),
            None if self.registry.contains(name) => Err(EvalError::NameError(format!(
                "no definition of '{name}' takes {} argument(s); defined arities: {:?}",
                call.args.len(),
                self.registry.overloads(name)
            ))),
            None => Err(EvalError::NameError(format!(
                "unknown function '{name}' (line {})",
                call.span.start_line
            ))),
        }
    }

    /// Invoke a user-level callable. Arguments are evaluated in `caller`.
    #[tracing::instrument(level = "trace", skip_all, fields(callee = %callee, depth = self.depth))]
    pub fn invoke(
        &mut self,
        callee: &Callee,
        args: &[Expr],
        caller: &mut Environment,
    ) -> EvalResult<Value> {
        let params = callee.params();
        if params.len() != args.len() {
            return Err(EvalError::TypeError(format!(
                "{callee} called with {} argument(s), expected {}",
                args.len(),
                params.len()
            )));
        }

        let mut env = Environment::new();
        let captured = match callee {
            Callee::Closure { closure, .. } => {
                let frame = Scope::from_captures(&closure.captures);
                env.push_closure_scope(&frame);
                env.push_scope();
                Some(frame)
            }
            Callee::Function(_) => None,
        };
        self.bind_params(params, args, caller, &mut env)?;

        if self.depth >= self.config.max_call_depth {
            return Err(EvalError::RecursionLimit(self.config.max_call_depth));
        }
        self.depth += 1;
        let flow = ensure_sufficient_stack(|| self.run_statements(&callee.body().stmts, &mut env));
        self.depth -= 1;

        let flow = flow?;

        if let (Callee::Closure { closure, home }, Some(frame)) = (callee, &captured) {
            if let Some(updated) = frame.changes_from(&closure.captures) {
                store_captures(home, closure, updated);
            }
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Next => Value::Nil,
        })
    }

    /// Pair parameters with arguments. A `ref` parameter given a bare
    /// variable shares that variable's cell; everything else is a copy.
    fn bind_params(
        &mut self,
        params: &[Param],
        args: &[Expr],
        caller: &mut Environment,
        callee: &mut Environment,
    ) -> EvalResult<()> {
        for (param, arg) in params.iter().zip(args) {
            if param.mode == ParamMode::ByRef {
                let aliased = arg.as_variable().and_then(|name| caller.lookup_cell(name));
                if let Some(cell) = aliased {
                    callee.bind_cell(&param.name.name, Rc::clone(cell));
                    continue;
                }
            }
            let value = self.eval_expr(arg, caller)?;
            callee.declare_local(&param.name.name, value);
        }
        Ok(())
    }

    // ── Built-ins ────────────────────────────────────────────────────────

    fn builtin_print(&mut self, args: &[Expr], env: &mut Environment) -> EvalResult<Value> {
        let mut line = String::new();
        for arg in args {
            let value = self.eval_expr(arg, env)?;
            line.push_str(&value.to_string());
        }
        self.host.output(&line)?;
        Ok(Value::Nil)
    }

    fn builtin_input(
        &mut self,
        name: &str,
        args: &[Expr],
        env: &mut Environment,
    ) -> EvalResult<Value> {
        match args {
            [] => {}
            [prompt] => match self.eval_expr(prompt, env)? {
                Value::Str(text) => self.host.output(&text)?,
                other => {
                    return Err(EvalError::NameError(format!(
                        "{name}() prompt must be a string, got {}",
                        other.type_name()
                    )));
                }
            },
            _ => {
                return Err(EvalError::NameError(format!(
                    "{name}() takes at most one argument, got {}",
                    args.len()
                )));
            }
        }

        let line = self.host.input()?;
        if name == "inputs" {
            return Ok(Value::Str(line));
        }
        line.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            EvalError::TypeError(format!("inputi() read '{line}', which is not an integer"))
        })
    }
}
