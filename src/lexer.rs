//! Tokenizer for equation-side text.
//!
//! Tokens are produced lazily by a [`Tokens`] iterator built on a `logos`
//! lexer. The iterator is `Clone`, so a parser can look ahead by cloning it
//! and the whole sequence can be restarted from any saved position.
//!
//! Recognized input:
//! - Numbers: `12`, `3.5`, `.25` (no exponent notation)
//! - Identifiers: a letter or `_`, followed by letters, digits, `_` or `'`
//! - Operators `+ - * / ^ %`, parentheses, `|` and `,`
//!
//! Whitespace between tokens is skipped. Any other character is a
//! [`LexError`] carrying its offset.

use std::fmt;

use logos::{Lexer, Logos};

use crate::errors::LexError;

/// The lexical class of a token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"[0-9]+(\.[0-9]+)?|\.[0-9]+")]
    Number,
    #[regex(r"[A-Za-z_][A-Za-z0-9_']*")]
    Identifier,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("%")]
    Percent,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
}

impl TokenKind {
    /// Human readable name used in syntax error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Caret => "`^`",
            TokenKind::Percent => "`%`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Pipe => "`|`",
            TokenKind::Comma => "`,`",
        }
    }
}

/// A single lexical token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// The exact source slice of the token
    pub text: &'src str,
    /// Byte offset of the first character
    pub offset: usize,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Lazy, restartable token sequence over one equation side.
#[derive(Clone)]
pub struct Tokens<'src> {
    lexer: Lexer<'src, TokenKind>,
}

impl<'src> Tokens<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: TokenKind::lexer(source),
        }
    }

    /// Returns the full source text being tokenized.
    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<Result<Token<'src>, LexError>> {
        self.clone().next()
    }
}

impl<'src> Iterator for Tokens<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.lexer.next()?;
        let span = self.lexer.span();
        Some(match kind {
            Ok(kind) => Ok(Token {
                kind,
                text: self.lexer.slice(),
                offset: span.start,
            }),
            Err(()) => Err(LexError {
                found: self.lexer.source()[span.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
                offset: span.start,
            }),
        })
    }
}

/// Tokenizes a whole side eagerly, failing on the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Tokens::new(source).collect()
}
