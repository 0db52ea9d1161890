//! Operator semantics and the coercions they apply.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use brewin_types::ast::{BinOp, UnaryOp};

/// Apply a binary operator to two already-evaluated operands.
pub fn binary(op: BinOp, lv: &Value, rv: &Value) -> EvalResult<Value> {
    match op {
        BinOp::Add => add(lv, rv),
        BinOp::Sub => arith(op, lv, rv, i64::checked_sub),
        BinOp::Mul => arith(op, lv, rv, i64::checked_mul),
        BinOp::Div => {
            let (a, b) = int_operands(op, lv, rv)?;
            if b == 0 {
                return Err(EvalError::ArithmeticTrap("division by zero".into()));
            }
            checked(op, a.checked_div(b))
        }
        BinOp::Eq => Ok(Value::Bool(loose_eq(lv, rv))),
        BinOp::NotEq => Ok(Value::Bool(!loose_eq(lv, rv))),
        BinOp::Less => compare(op, lv, rv, |a, b| a < b),
        BinOp::LessEq => compare(op, lv, rv, |a, b| a <= b),
        BinOp::Greater => compare(op, lv, rv, |a, b| a > b),
        BinOp::GreaterEq => compare(op, lv, rv, |a, b| a >= b),
        BinOp::And => {
            let (a, b) = bool_operands(op, lv, rv)?;
            Ok(Value::Bool(a && b))
        }
        BinOp::Or => {
            let (a, b) = bool_operands(op, lv, rv)?;
            Ok(Value::Bool(a || b))
        }
    }
}

/// Apply a unary operator to an evaluated operand.
pub fn unary(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Neg => match value {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EvalError::ArithmeticTrap(format!("-({n}) overflows"))),
            other => Err(EvalError::TypeError(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        },
        UnaryOp::Not => value.as_bool().map(|b| Value::Bool(!b)).ok_or_else(|| {
            EvalError::TypeError(format!("cannot apply '!' to {}", value.type_name()))
        }),
    }
}

/// `==` semantics: exact comparison for matching tags, bool coercion
/// otherwise. Pairs that cannot both coerce are unequal.
pub fn loose_eq(lv: &Value, rv: &Value) -> bool {
    if let Some(eq) = lv.same_tag_eq(rv) {
        return eq;
    }
    match (lv.as_bool(), rv.as_bool()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn add(lv: &Value, rv: &Value) -> EvalResult<Value> {
    if let (Value::Str(a), Value::Str(b)) = (lv, rv) {
        return Ok(Value::Str(format!("{a}{b}")));
    }
    arith(BinOp::Add, lv, rv, i64::checked_add)
}

fn arith(
    op: BinOp,
    lv: &Value,
    rv: &Value,
    apply: fn(i64, i64) -> Option<i64>,
) -> EvalResult<Value> {
    let (a, b) = int_operands(op, lv, rv)?;
    checked(op, apply(a, b))
}

fn checked(op: BinOp, result: Option<i64>) -> EvalResult<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| EvalError::ArithmeticTrap(format!("integer overflow in '{op}'")))
}

fn int_operands(op: BinOp, lv: &Value, rv: &Value) -> EvalResult<(i64, i64)> {
    match (lv.as_int(), rv.as_int()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, lv, rv)),
    }
}

fn bool_operands(op: BinOp, lv: &Value, rv: &Value) -> EvalResult<(bool, bool)> {
    match (lv.as_bool(), rv.as_bool()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, lv, rv)),
    }
}

fn compare(op: BinOp, lv: &Value, rv: &Value, cmp: fn(i64, i64) -> bool) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(cmp(*a, *b))),
        _ => Err(mismatch(op, lv, rv)),
    }
}

fn mismatch(op: BinOp, lv: &Value, rv: &Value) -> EvalError {
    EvalError::TypeError(format!(
        "cannot apply '{op}' to {} and {}",
        lv.type_name(),
        rv.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    fn eval(op: BinOp, lv: Value, rv: Value) -> EvalResult<Value> {
        binary(op, &lv, &rv)
    }

    fn is_true(result: EvalResult<Value>) -> bool {
        matches!(result, Ok(Value::Bool(true)))
    }

    fn is_false(result: EvalResult<Value>) -> bool {
        matches!(result, Ok(Value::Bool(false)))
    }

    #[test]
    fn test_add_concatenates_strings_and_coerces_bools() {
        assert!(matches!(
            eval(BinOp::Add, "a".into(), "b".into()),
            Ok(Value::Str(s)) if s == "ab"
        ));
        assert!(matches!(eval(BinOp::Add, int(3), int(4)), Ok(Value::Int(7))));
        assert!(matches!(eval(BinOp::Add, true.into(), int(1)), Ok(Value::Int(2))));
        assert!(matches!(
            eval(BinOp::Add, int(1), "a".into()),
            Err(EvalError::TypeError(_))
        ));
        assert!(matches!(
            eval(BinOp::Add, "a".into(), true.into()),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert!(matches!(eval(BinOp::Div, int(5), int(2)), Ok(Value::Int(2))));
        assert!(matches!(eval(BinOp::Div, int(-7), int(2)), Ok(Value::Int(-3))));
    }

    #[test]
    fn test_arithmetic_traps() {
        assert!(matches!(
            eval(BinOp::Div, int(1), int(0)),
            Err(EvalError::ArithmeticTrap(_))
        ));
        assert!(matches!(
            eval(BinOp::Div, int(i64::MIN), int(-1)),
            Err(EvalError::ArithmeticTrap(_))
        ));
        assert!(matches!(
            eval(BinOp::Mul, int(i64::MAX), int(2)),
            Err(EvalError::ArithmeticTrap(_))
        ));
        assert!(matches!(
            unary(UnaryOp::Neg, &int(i64::MIN)),
            Err(EvalError::ArithmeticTrap(_))
        ));
    }

    #[test]
    fn test_equality_coercion() {
        assert!(is_true(eval(BinOp::Eq, int(1), true.into())));
        assert!(is_true(eval(BinOp::Eq, int(0), false.into())));
        assert!(is_false(eval(BinOp::Eq, "1".into(), int(1))));
        assert!(is_true(eval(BinOp::NotEq, "1".into(), int(1))));
        assert!(is_false(eval(BinOp::Eq, Value::Nil, int(0))));
        assert!(is_true(eval(BinOp::Eq, "x".into(), "x".into())));
        assert!(is_true(eval(BinOp::Eq, Value::Nil, Value::Nil)));
    }

    #[test]
    fn test_ordering_requires_ints() {
        assert!(is_true(eval(BinOp::Less, int(1), int(2))));
        assert!(is_true(eval(BinOp::GreaterEq, int(2), int(2))));
        assert!(matches!(
            eval(BinOp::Less, true.into(), int(2)),
            Err(EvalError::TypeError(_))
        ));
        assert!(matches!(
            eval(BinOp::Greater, "b".into(), "a".into()),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_logical_operators_coerce_ints() {
        assert!(is_true(eval(BinOp::And, int(2), true.into())));
        assert!(is_false(eval(BinOp::And, int(0), true.into())));
        assert!(is_true(eval(BinOp::Or, int(0), int(5))));
        assert!(matches!(
            eval(BinOp::Or, "yes".into(), true.into()),
            Err(EvalError::TypeError(_))
        ));
    }

    #[test]
    fn test_unary() {
        assert!(matches!(unary(UnaryOp::Neg, &int(4)), Ok(Value::Int(-4))));
        assert!(matches!(
            unary(UnaryOp::Neg, &Value::Bool(true)),
            Err(EvalError::TypeError(_))
        ));
        assert!(is_false(unary(UnaryOp::Not, &int(3))));
        assert!(is_true(unary(UnaryOp::Not, &Value::Bool(false))));
        assert!(matches!(
            unary(UnaryOp::Not, &Value::Nil),
            Err(EvalError::TypeError(_))
        ));
    }
}
