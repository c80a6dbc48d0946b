//! Token definitions for formula expressions
//!
//! Tokens are produced by a logos lexer. Whitespace, including the
//! non-breaking spacer that trails inserted tags, is skipped.
use logos::Logos;
use std::fmt;

/// All tokens an arithmetic formula can contain
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"\s+")]
pub enum Token {
    // Decimal literals: `12`, `1.5`, `1.`, `.5`
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+", |lex| lex.slice().to_owned())]
    Number(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
}

impl Token {
    /// Check if this token is a binary or unary operator
    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Plus | Token::Minus | Token::Star | Token::Slash)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) => write!(f, "number `{}`", text),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::OpenParen => write!(f, "`(`"),
            Token::CloseParen => write!(f, "`)`"),
        }
    }
}
