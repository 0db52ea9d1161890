//! Runtime values and their coercions.

use brewin_types::ast::{FunctionDecl, LambdaExpr};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A tagged runtime datum.
///
/// Values are immutable and `Clone` is cheap: a cloned [`Value::Closure`]
/// shares its captured map until one of the copies is called and writes to
/// a captured name.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
    /// A named top-level function used as a value.
    Function(FunctionRef),
    /// A lambda together with the bindings it captured.
    Closure(Closure),
}

/// A first-class reference to one overload of a top-level function.
#[derive(Debug, Clone)]
pub struct FunctionRef {
    pub decl: Rc<FunctionDecl>,
}

impl FunctionRef {
    pub fn new(decl: Rc<FunctionDecl>) -> Self {
        Self { decl }
    }

    pub fn name(&self) -> &str {
        &self.decl.name.name
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }
}

/// Bindings a closure captured: name → value.
pub type Captures = BTreeMap<String, Value>;

/// A closure: the lambda plus the bindings visible when it was created.
///
/// The captured map is never mutated in place. A call that writes to a
/// captured name stores a new closure, with the updated map, back into the
/// variable it was called through.
#[derive(Clone)]
pub struct Closure {
    pub lambda: Rc<LambdaExpr>,
    pub captures: Rc<Captures>,
}

impl Closure {
    pub fn new(lambda: Rc<LambdaExpr>, captures: Captures) -> Self {
        Self {
            lambda,
            captures: Rc::new(captures),
        }
    }

    pub fn arity(&self) -> usize {
        self.lambda.params.len()
    }

    /// `true` when both handles hold the same lambda and the same captured map.
    pub fn shares_state(&self, other: &Closure) -> bool {
        Rc::ptr_eq(&self.lambda, &other.lambda) && Rc::ptr_eq(&self.captures, &other.captures)
    }
}

impl fmt::Debug for Closure {
    // Captured values may themselves hold closures; print names only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("arity", &self.arity())
            .field("captures", &self.captures.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for Closure {
    // A closure created in a loop captures the previous one, so chains can be
    // as long as the loop ran. Unwind them with a stack.
    fn drop(&mut self) {
        let Some(captures) = Rc::get_mut(&mut self.captures) else {
            return;
        };
        let mut pending = vec![std::mem::take(captures)];
        while let Some(map) = pending.pop() {
            for value in map.into_values() {
                if let Value::Closure(mut inner) = value {
                    if let Some(captures) = Rc::get_mut(&mut inner.captures) {
                        pending.push(std::mem::take(captures));
                    }
                }
            }
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
            Value::Function(_) => "function",
            Value::Closure(_) => "closure",
        }
    }

    /// Bool coercion: bools as-is, ints by `!= 0`, nothing else.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Int coercion: ints as-is, bools as 0/1, nothing else.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Equality for operands with the same tag. Closures are equal while
    /// they share one captured map.
    pub(crate) fn same_tag_eq(&self, other: &Value) -> Option<bool> {
        Some(match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => {
                a.name() == b.name() && a.arity() == b.arity()
            }
            (Value::Closure(a), Value::Closure(b)) => a.shares_state(b),
            _ => return None,
        })
    }

    /// `true` when `other` cannot be told apart from `self`.
    pub(crate) fn is_identical(&self, other: &Value) -> bool {
        self.same_tag_eq(other) == Some(true)
    }
}

/// Rendering used by `print`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("nil"),
            Value::Function(func) => write!(f, "<function {}/{}>", func.name(), func.arity()),
            Value::Closure(closure) => write!(f, "<lambda/{}>", closure.arity()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Int(-7).as_bool(), Some(true));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from("true").as_bool(), None);
        assert_eq!(Value::Nil.as_bool(), None);
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(Value::Bool(true).as_int(), Some(1));
        assert_eq!(Value::Bool(false).as_int(), Some(0));
        assert_eq!(Value::Int(12).as_int(), Some(12));
        assert_eq!(Value::from("1").as_int(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::from("a b").to_string(), "a b");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_same_tag_eq_only_for_matching_tags() {
        assert_eq!(Value::Int(1).same_tag_eq(&Value::Int(1)), Some(true));
        assert_eq!(Value::from("a").same_tag_eq(&Value::from("b")), Some(false));
        assert_eq!(Value::Nil.same_tag_eq(&Value::Nil), Some(true));
        assert_eq!(Value::Int(1).same_tag_eq(&Value::Bool(true)), None);
    }

    fn lambda(arity: usize) -> Rc<LambdaExpr> {
        use brewin_types::ast::{Block, Ident, Param, ParamMode};
        use brewin_types::Span;

        let span = Span::point(1, 1);
        Rc::new(LambdaExpr {
            params: (0..arity)
                .map(|i| Param {
                    name: Ident::new(format!("p{i}"), span),
                    mode: ParamMode::ByValue,
                    span,
                })
                .collect(),
            body: Block {
                stmts: Vec::new(),
                span,
            },
            span,
        })
    }

    #[test]
    fn test_closure_copies_share_state_until_replaced() {
        let body = lambda(1);
        let mut captures = Captures::new();
        captures.insert("n".into(), Value::Int(1));
        let original = Value::Closure(Closure::new(Rc::clone(&body), captures));
        let copy = original.clone();
        assert_eq!(original.same_tag_eq(&copy), Some(true));
        assert!(original.is_identical(&copy));

        let rebuilt = Value::Closure(Closure::new(body, Captures::new()));
        assert_eq!(original.same_tag_eq(&rebuilt), Some(false));
        assert_eq!(original.to_string(), "<lambda/1>");
    }

    #[test]
    fn test_long_capture_chain_drops_without_recursion() {
        let body = lambda(0);
        let mut current = Value::Closure(Closure::new(Rc::clone(&body), Captures::new()));
        for _ in 0..200_000 {
            let mut captures = Captures::new();
            captures.insert("prev".into(), current);
            current = Value::Closure(Closure::new(Rc::clone(&body), captures));
        }
        drop(current);
    }
}
