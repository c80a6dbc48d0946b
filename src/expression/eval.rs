//! Expression evaluation
//!
//! Arithmetic is plain `f64`. Division by an exact zero is an error rather
//! than an infinity, and any other non-finite intermediate (overflow) is
//! reported as [`EvaluationError::NonFinite`].

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::EvaluationError;

pub fn evaluate(expr: &Expr) -> Result<f64, EvaluationError> {
    let value = match expr {
        Expr::Number(n) => *n,
        Expr::Unary(UnaryOp::Neg, operand) => -evaluate(operand)?,
        Expr::Unary(UnaryOp::Plus, operand) => evaluate(operand)?,
        Expr::Binary(op, lhs, rhs) => {
            let lhs = evaluate(lhs)?;
            let rhs = evaluate(rhs)?;
            match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => {
                    if rhs == 0.0 {
                        return Err(EvaluationError::DivisionByZero);
                    }
                    lhs / rhs
                }
            }
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFinite)
    }
}
