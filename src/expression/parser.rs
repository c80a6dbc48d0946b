//! Arithmetic parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+')* atom
//! atom    := number | '(' expr ')'
//! ```
//!
//! Same-precedence operators associate to the left. The parser is built with
//! chumsky combinators over the spanned logos tokens, so errors point at byte
//! offsets in the serialized formula.
//!
//! Both the parser and the evaluator recurse once per nesting level, so input
//! is checked against [`MAX_NESTING`] and [`MAX_OPERATORS`] before parsing.

use chumsky::prelude::*;
use chumsky::Stream;
use std::ops::Range;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::SyntaxError;
use super::lexer::{tokenize_with_spans, TokenSpan};
use super::tokens::Token;

/// Type alias for parser error
type ParserError = Simple<Token>;

/// Deepest allowed nesting of parentheses and unary signs
pub const MAX_NESTING: usize = 256;

/// Most operators, binary and unary, a formula may contain
pub const MAX_OPERATORS: usize = 1024;

/// Expression parser, not anchored to end of input
pub fn expression() -> impl Parser<Token, Expr, Error = ParserError> + Clone {
    recursive(|expr| {
        let number = select! { Token::Number(text) => text }.try_map(|text: String, span| {
            text.parse::<f64>()
                .map(Expr::Number)
                .map_err(|e| Simple::custom(span, format!("invalid number `{}`: {}", text, e)))
        });

        let atom = number.or(expr.delimited_by(just(Token::OpenParen), just(Token::CloseParen)));

        let unary = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Plus).to(UnaryOp::Plus),
        ))
        .repeated()
        .then(atom)
        .foldr(Expr::unary);

        let product = unary
            .clone()
            .then(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                ))
                .then(unary)
                .repeated(),
            )
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs));

        product
            .clone()
            .then(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated(),
            )
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
    })
}

/// Parse already tokenized input; `source_len` marks the end-of-input span
pub fn parse_tokens(tokens: Vec<TokenSpan>, source_len: usize) -> Result<Expr, SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError::Empty);
    }
    check_limits(&tokens)?;

    let stream = Stream::from_iter(source_len..source_len + 1, tokens.into_iter());
    expression()
        .then_ignore(end())
        .parse(stream)
        .map_err(|errors| syntax_error(errors, source_len))
}

/// Tokenize and parse a formula
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    let tokens = tokenize_with_spans(source)?;
    parse_tokens(tokens, source.len())
}

/// Reject input that would nest past [`MAX_NESTING`] or hold more than
/// [`MAX_OPERATORS`] operators
fn check_limits(tokens: &[TokenSpan]) -> Result<(), SyntaxError> {
    // Depth inside each open parenthesis
    let mut open: Vec<usize> = Vec::new();
    // Unary signs in a row at the current position
    let mut signs = 0;
    let mut operators = 0;
    let mut previous: Option<&Token> = None;

    for (token, span) in tokens {
        let unary = matches!(token, Token::Plus | Token::Minus)
            && !matches!(previous, Some(Token::Number(_) | Token::CloseParen));
        match token {
            Token::OpenParen => {
                let outer = open.last().copied().unwrap_or(0);
                open.push(outer + signs + 1);
                signs = 0;
            }
            Token::CloseParen => {
                open.pop();
                signs = 0;
            }
            _ if unary => signs += 1,
            _ => signs = 0,
        }

        if token.is_operator() {
            operators += 1;
            if operators > MAX_OPERATORS {
                return Err(SyntaxError::TooManyOperators {
                    limit: MAX_OPERATORS,
                });
            }
        }
        if open.last().copied().unwrap_or(0) + signs > MAX_NESTING {
            return Err(SyntaxError::TooDeep {
                offset: span.start,
                limit: MAX_NESTING,
            });
        }
        previous = Some(token);
    }
    Ok(())
}

/// Collapse chumsky's error list into the first, most relevant error
fn syntax_error(errors: Vec<ParserError>, source_len: usize) -> SyntaxError {
    let Some(error) = errors.into_iter().next() else {
        return SyntaxError::Empty;
    };

    let mut expected: Vec<String> = error
        .expected()
        .map(|token| match token {
            Some(Token::Number(_)) => "number".to_string(),
            Some(token) => token.to_string(),
            None => "end of formula".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    let span: Range<usize> = error.span();
    match error.found() {
        Some(token) => SyntaxError::UnexpectedToken {
            found: token.to_string(),
            offset: span.start,
            expected,
        },
        None if span.start >= source_len => SyntaxError::UnexpectedEnd { expected },
        None => SyntaxError::UnexpectedToken {
            found: error
                .label()
                .map(str::to_string)
                .unwrap_or_else(|| "input".to_string()),
            offset: span.start,
            expected,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        parse(source).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        insta::assert_snapshot!(render("1+5*3"), @"(1 + (5 * 3))");
        insta::assert_snapshot!(render("(1+5)*3"), @"((1 + 5) * 3)");
    }

    #[test]
    fn test_left_associativity() {
        insta::assert_snapshot!(render("8-3-2"), @"((8 - 3) - 2)");
        insta::assert_snapshot!(render("8/4/2"), @"((8 / 4) / 2)");
        insta::assert_snapshot!(render("2*3/4*5"), @"(((2 * 3) / 4) * 5)");
    }

    #[test]
    fn test_unary_operators() {
        insta::assert_snapshot!(render("-2"), @"(-2)");
        insta::assert_snapshot!(render("--2"), @"(-(-2))");
        insta::assert_snapshot!(render("2--3"), @"(2 - (-3))");
        insta::assert_snapshot!(render("-2*+3"), @"((-2) * (+3))");
        insta::assert_snapshot!(render("-(1+2)"), @"(-(1 + 2))");
    }

    #[test]
    fn test_decimal_literals() {
        insta::assert_snapshot!(render("1.5+.25+2."), @"((1.5 + 0.25) + 2)");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(render(" 1 +\u{00A0}2 "), "(1 + 2)");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(SyntaxError::Empty));
        assert_eq!(parse("\u{00A0}"), Err(SyntaxError::Empty));
    }

    #[test]
    fn test_incomplete_expression() {
        assert!(matches!(parse("2+"), Err(SyntaxError::UnexpectedEnd { .. })));
        assert!(matches!(parse("(1+2"), Err(SyntaxError::UnexpectedEnd { .. })));
    }

    #[test]
    fn test_unexpected_tokens() {
        match parse("1+*2") {
            Err(SyntaxError::UnexpectedToken { found, offset, .. }) => {
                assert_eq!(found, "`*`");
                assert_eq!(offset, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(parse("1 2"), Err(SyntaxError::UnexpectedToken { offset: 2, .. })));
        assert!(matches!(parse("1)"), Err(SyntaxError::UnexpectedToken { offset: 1, .. })));
        assert!(matches!(parse("()"), Err(SyntaxError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_rejects_code() {
        assert!(matches!(
            parse("process.exit(1)"),
            Err(SyntaxError::UnexpectedCharacter { character: 'p', offset: 0 })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse(&nested), Ok(Expr::Number(1.0)));

        let signs = format!("{}1", "-".repeat(MAX_NESTING));
        assert!(parse(&signs).is_ok());

        let deeper = format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(
            parse(&deeper),
            Err(SyntaxError::TooDeep {
                offset: MAX_NESTING,
                limit: MAX_NESTING
            })
        );
    }

    #[test]
    fn test_signs_and_parentheses_nest_together() {
        let half = MAX_NESTING / 2;
        let mixed = format!("{}1{}", "-(".repeat(half), ")".repeat(half));
        assert!(parse(&mixed).is_ok());

        let mixed = format!("{}1{}", "-(".repeat(half + 1), ")".repeat(half + 1));
        assert!(matches!(parse(&mixed), Err(SyntaxError::TooDeep { .. })));
    }

    #[test]
    fn test_binary_operators_do_not_nest() {
        let chain = vec!["1"; MAX_OPERATORS].join("-");
        assert!(parse(&chain).is_ok());

        let chain = vec!["1"; MAX_OPERATORS + 2].join("-");
        assert_eq!(
            parse(&chain),
            Err(SyntaxError::TooManyOperators {
                limit: MAX_OPERATORS
            })
        );
    }

    #[test]
    fn test_huge_inputs_are_rejected_up_front() {
        let signs = format!("{}1", "-".repeat(100_000));
        assert!(matches!(parse(&signs), Err(SyntaxError::TooDeep { .. })));

        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(matches!(parse(&parens), Err(SyntaxError::TooDeep { .. })));
    }
}
