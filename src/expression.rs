//! Formula evaluation
//!
//! A document is evaluated in three steps:
//!
//! 1. [`serialize`] turns it into formula text, substituting tag values.
//! 2. [`parser::parse`] tokenizes (logos) and parses (chumsky) the text into an
//!    [`Expr`]. Only numbers, `+ - * /`, unary signs and parentheses exist in
//!    the grammar; the text is never executed as code.
//! 3. [`eval::evaluate`] computes the value.
//!
//! Syntax errors and evaluation errors are kept apart in [`ExpressionError`].

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod serialize;
pub mod tokens;

use tracing::info;

use crate::catalog::Catalog;
use crate::document::Document;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{EvaluationError, ExpressionError, SyntaxError};
pub use serialize::serialize;
pub use tokens::Token;

/// Result of evaluating a document
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Formula text the document serialized to
    pub expression: String,
    pub value: f64,
}

/// Parse and evaluate formula text
pub fn evaluate_str(source: &str) -> Result<f64, ExpressionError> {
    let expr = parser::parse(source)?;
    Ok(eval::evaluate(&expr)?)
}

/// Serialize `document` against `catalog` and evaluate the result
pub fn evaluate_document(document: &Document, catalog: &Catalog) -> Result<Evaluation, ExpressionError> {
    let expression = serialize(document, &catalog.value_lookup());
    let value = evaluate_str(&expression)?;
    info!(%expression, value, "formula evaluated");
    Ok(Evaluation { expression, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Suggestion;
    use crate::document::{Segment, TagToken};

    #[test]
    fn test_evaluate_plain_text() {
        let mut doc = Document::new();
        doc.insert_text("2+2");
        let result = evaluate_document(&doc, &Catalog::empty()).unwrap();
        assert_eq!(result.expression, "2+2");
        assert_eq!(result.value, 4.0);
    }

    #[test]
    fn test_evaluate_with_tag() {
        let catalog = Catalog::new(vec![Suggestion::new("t", "north", "Revenue", 5)]);
        let doc = Document::from_segments(vec![
            Segment::text("1+"),
            Segment::tag(TagToken::new("t", "Revenue", "north")),
            Segment::text("*3"),
        ]);

        let result = evaluate_document(&doc, &catalog).unwrap();
        assert_eq!(result.expression, "1+5*3");
        assert_eq!(result.value, 16.0);
    }

    #[test]
    fn test_evaluate_incomplete() {
        let err = evaluate_str("2+").unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax(SyntaxError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(
            evaluate_str("4/0"),
            Err(ExpressionError::Evaluation(EvaluationError::DivisionByZero))
        );
    }
}
