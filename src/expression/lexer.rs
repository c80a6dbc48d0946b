//! Tokenization of serialized formulas
//!
//! Unlike a forgiving pretty-printer lexer, anything logos cannot match is an
//! error here: the formula text is user-typed and must not be silently
//! reinterpreted.

use logos::Logos;
use std::ops::Range;

use super::error::SyntaxError;
use super::tokens::Token;

/// Type alias for token with span
pub type TokenSpan = (Token, Range<usize>);

/// Tokenize a formula, keeping byte spans for error reporting
pub fn tokenize_with_spans(source: &str) -> Result<Vec<TokenSpan>, SyntaxError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let offset = lexer.span().start;
                let character = source[offset..].chars().next().unwrap_or('\u{FFFD}');
                return Err(SyntaxError::UnexpectedCharacter { character, offset });
            }
        }
    }

    Ok(tokens)
}
