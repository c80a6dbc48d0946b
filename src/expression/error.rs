//! Error types for formula evaluation

use thiserror::Error;

/// Why a formula could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl ExpressionError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, ExpressionError::Syntax(_))
    }
}

/// The serialized formula is not a valid arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("the formula is empty")]
    Empty,
    #[error("unexpected character `{character}` at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("unexpected {found} at offset {offset}{}", expected_suffix(.expected))]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: Vec<String>,
    },
    #[error("unexpected end of formula{}", expected_suffix(.expected))]
    UnexpectedEnd { expected: Vec<String> },
    #[error("formula nests deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },
    #[error("formula has more than {limit} operators")]
    TooManyOperators { limit: usize },
}

/// The formula parsed but has no numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

fn expected_suffix(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected {}", expected.join(" or "))
    }
}
