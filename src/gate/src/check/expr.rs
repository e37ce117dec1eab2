use super::value::{compare_values, Value};
use super::{CheckContext, CheckFunc, EvalError};
use std::cmp::Ordering;
use std::sync::Arc;

/// Binary operators of the check expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

/// A compiled check expression tree.
///
/// Function calls are resolved against the registry at compile time, so
/// evaluation never has to look names up.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Call(Arc<dyn CheckFunc>),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn eval(&self, ctx: &CheckContext<'_>) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Call(func) => func.eval(ctx),
            Expr::Not(inner) => match inner.eval(ctx)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(EvalError::TypeMismatch {
                    expected: "Bool".to_string(),
                    actual: other.kind().to_string(),
                }),
            },
            Expr::Binary { op, lhs, rhs } => {
                let left = lhs.eval(ctx)?;
                let right = rhs.eval(ctx)?;
                eval_binary(*op, left, right)
            }
        }
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.loose_eq(&right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.loose_eq(&right))),
        BinaryOp::Lt => Ok(Value::Bool(ordering_is(&left, &right, |o| {
            o == Ordering::Less
        }))),
        BinaryOp::Lte => Ok(Value::Bool(ordering_is(&left, &right, |o| {
            o != Ordering::Greater
        }))),
        BinaryOp::Gt => Ok(Value::Bool(ordering_is(&left, &right, |o| {
            o == Ordering::Greater
        }))),
        BinaryOp::Gte => Ok(Value::Bool(ordering_is(&left, &right, |o| {
            o != Ordering::Less
        }))),
        BinaryOp::And => {
            let (l, r) = both_bools(left, right)?;
            Ok(Value::Bool(l && r))
        }
        BinaryOp::Or => {
            let (l, r) = both_bools(left, right)?;
            Ok(Value::Bool(l || r))
        }
    }
}

/// Incomparable operands make every ordering operator false.
fn ordering_is(left: &Value, right: &Value, pred: impl Fn(Ordering) -> bool) -> bool {
    compare_values(left, right).map(pred).unwrap_or(false)
}

fn both_bools(left: Value, right: Value) -> Result<(bool, bool), EvalError> {
    let l = left.as_bool().ok_or_else(|| EvalError::TypeMismatch {
        expected: "Bool".to_string(),
        actual: left.kind().to_string(),
    })?;
    let r = right.as_bool().ok_or_else(|| EvalError::TypeMismatch {
        expected: "Bool".to_string(),
        actual: right.kind().to_string(),
    })?;
    Ok((l, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_parts() -> Vec<message::Part> {
        vec![message::Part::new("foo"), message::Part::new("bar")]
    }

    #[test]
    fn literal_comparison() {
        let parts = ctx_parts();
        let ctx = CheckContext::new(&parts, 1);
        let expr = Expr::Binary {
            op: BinaryOp::Gte,
            lhs: Box::new(Expr::Literal(Value::Int(3))),
            rhs: Box::new(Expr::Literal(Value::Int(2))),
        };
        assert_eq!(expr.eval(&ctx).unwrap(), Value::Bool(true));
    }

    #[test]
    fn not_requires_bool() {
        let parts = ctx_parts();
        let ctx = CheckContext::new(&parts, 0);
        let expr = Expr::Not(Box::new(Expr::Literal(Value::Int(1))));
        assert!(matches!(
            expr.eval(&ctx),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn and_or_require_bools() {
        let parts = ctx_parts();
        let ctx = CheckContext::new(&parts, 0);
        let expr = Expr::Binary {
            op: BinaryOp::And,
            lhs: Box::new(Expr::Literal(Value::Bool(true))),
            rhs: Box::new(Expr::Literal(Value::Str("x".to_string()))),
        };
        assert!(expr.eval(&ctx).is_err());
    }

    #[test]
    fn incomparable_ordering_is_false() {
        let parts = ctx_parts();
        let ctx = CheckContext::new(&parts, 0);
        let expr = Expr::Binary {
            op: BinaryOp::Lt,
            lhs: Box::new(Expr::Literal(Value::Int(1))),
            rhs: Box::new(Expr::Literal(Value::Str("2".to_string()))),
        };
        assert_eq!(expr.eval(&ctx).unwrap(), Value::Bool(false));
    }
}
