//! Recursive-descent parser for equation sides.
//!
//! Each precedence level is one method, from lowest to highest binding:
//!
//! ```text
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary          := ("-" | "+") unary | power
//! power          := primary ("^" unary)?
//! primary        := number
//!                 | constant
//!                 | function "(" arguments? ")"
//!                 | variable
//!                 | "(" additive ")"
//!                 | "|" additive "|"
//! arguments      := additive ("," additive)*
//! ```
//!
//! `^` is right-associative because its right operand re-enters `unary`,
//! so `-a^2` is `-(a^2)` and `2^-1` is `2^(-1)`.
//!
//! An identifier is a constant (`e`, `pi`, `i`), a function when it is
//! directly followed by `(`, and a free variable otherwise. Variables are
//! interned into a [`Variables`] table shared by every side of a system.

use num_complex::Complex64;

use crate::errors::ParseError;
use crate::expr::{Expr, VarRef, Variables};
use crate::lexer::{Token, TokenKind, Tokens};
use crate::operators::arithmetic::{BinaryOp, UnaryOp};
use crate::operators::constant::Constant;
use crate::operators::function::Function;

/// Maximum nesting of groups and prefix operators.
const MAX_DEPTH: usize = 128;

/// Maximum number of binary operators in one side. Operator chains build
/// left-deep trees, so this also bounds the height of the tree.
const MAX_OPERATORS: usize = 1024;

pub type ParseResult<T> = Result<T, ParseError>;

/// Parser over the tokens of one equation side.
pub struct Parser<'src, 'vars> {
    tokens: Tokens<'src>,
    variables: &'vars mut Variables,
    depth: usize,
    operators: usize,
}

impl<'src, 'vars> Parser<'src, 'vars> {
    pub fn new(source: &'src str, variables: &'vars mut Variables) -> Self {
        Self {
            tokens: Tokens::new(source),
            variables,
            depth: 0,
            operators: 0,
        }
    }

    /// Parses the whole input as one expression.
    ///
    /// # Errors
    /// Returns a `ParseError` pointing at the first offending token, or at the
    /// end of the text if input ran out.
    pub fn parse(mut self) -> ParseResult<Expr> {
        let expr = self.parse_additive()?;
        match self.next_token()? {
            None => Ok(expr),
            Some(token) => Err(ParseError::TrailingInput {
                found: token.text.to_string(),
                offset: token.offset,
            }),
        }
    }

    fn peek(&self) -> ParseResult<Option<Token<'src>>> {
        Ok(self.tokens.peek().transpose()?)
    }

    fn next_token(&mut self) -> ParseResult<Option<Token<'src>>> {
        Ok(self.tokens.next().transpose()?)
    }

    fn end_offset(&self) -> usize {
        self.tokens.source().len()
    }

    /// Consumes the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> ParseResult<Option<Token<'src>>> {
        match self.peek()? {
            Some(token) if token.kind == kind => self.next_token(),
            _ => Ok(None),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token<'src>> {
        match self.next_token()? {
            Some(token) if token.kind == kind => Ok(token),
            other => Err(self.unexpected(other, kind.name())),
        }
    }

    fn unexpected(&self, found: Option<Token<'src>>, expected: &'static str) -> ParseError {
        match found {
            Some(token) => ParseError::UnexpectedToken {
                expected,
                found: token.text.to_string(),
                offset: token.offset,
            },
            None => ParseError::UnexpectedEnd {
                expected,
                offset: self.end_offset(),
            },
        }
    }

    /// Consumes the next token if it is one of the given binary operators.
    fn eat_binary(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
    ) -> ParseResult<Option<(BinaryOp, usize)>> {
        let Some(token) = self.peek()? else {
            return Ok(None);
        };
        let Some((_, op)) = ops.iter().find(|(kind, _)| *kind == token.kind) else {
            return Ok(None);
        };
        self.count_operator(token.offset)?;
        self.next_token()?;
        Ok(Some((*op, token.offset)))
    }

    fn count_operator(&mut self, offset: usize) -> ParseResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ParseError::TooLong { offset });
        }
        Ok(())
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        while let Some((op, offset)) = self.eat_binary(&[
            (TokenKind::Plus, BinaryOp::Add),
            (TokenKind::Minus, BinaryOp::Sub),
        ])? {
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                offset,
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, offset)) = self.eat_binary(&[
            (TokenKind::Star, BinaryOp::Mul),
            (TokenKind::Slash, BinaryOp::Div),
            (TokenKind::Percent, BinaryOp::Rem),
        ])? {
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                offset,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let offset = match self.peek()? {
                Some(token) => token.offset,
                None => self.end_offset(),
            };
            return Err(ParseError::NestingTooDeep { offset });
        }

        let op = if let Some(token) = self.eat(TokenKind::Minus)? {
            Some((UnaryOp::Neg, token.offset))
        } else {
            self.eat(TokenKind::Plus)?
                .map(|token| (UnaryOp::Plus, token.offset))
        };

        let expr = match op {
            Some((op, offset)) => Expr::Unary {
                op,
                operand: Box::new(self.parse_unary()?),
                offset,
            },
            None => self.parse_power()?,
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_primary()?;
        let Some(caret) = self.eat(TokenKind::Caret)? else {
            return Ok(base);
        };
        self.count_operator(caret.offset)?;
        Ok(Expr::Binary {
            op: BinaryOp::Pow,
            lhs: Box::new(base),
            rhs: Box::new(self.parse_unary()?),
            offset: caret.offset,
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.next_token()? else {
            return Err(self.unexpected(None, "expression"));
        };

        match token.kind {
            TokenKind::Number => parse_number(token),
            TokenKind::Identifier => self.parse_identifier(token),
            TokenKind::LParen => {
                let inner = self.parse_additive()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Pipe => {
                let inner = self.parse_additive()?;
                self.expect(TokenKind::Pipe)?;
                Ok(Expr::Call {
                    function: Function::Abs,
                    args: vec![inner],
                    offset: token.offset,
                })
            }
            _ => Err(self.unexpected(Some(token), "expression")),
        }
    }

    fn parse_identifier(&mut self, token: Token<'src>) -> ParseResult<Expr> {
        if let Some(constant) = Constant::from_name(token.text) {
            return Ok(Expr::Literal(constant.value()));
        }

        if self.eat(TokenKind::LParen)?.is_none() {
            let index = self.variables.intern(token.text);
            return Ok(Expr::Var(VarRef {
                name: token.text.to_string(),
                index,
                offset: token.offset,
            }));
        }

        let function = Function::from_name(token.text).ok_or_else(|| ParseError::UnknownFunction {
            name: token.text.to_string(),
            offset: token.offset,
        })?;

        let mut args = Vec::new();
        if self.eat(TokenKind::RParen)?.is_none() {
            loop {
                args.push(self.parse_additive()?);
                if self.eat(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        if args.len() != function.arity() {
            return Err(ParseError::Arity {
                name: function.name(),
                expected: function.arity(),
                got: args.len(),
                offset: token.offset,
            });
        }

        Ok(Expr::Call {
            function,
            args,
            offset: token.offset,
        })
    }
}

fn parse_number(token: Token<'_>) -> ParseResult<Expr> {
    match token.text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Expr::Literal(Complex64::new(value, 0.0))),
        _ => Err(ParseError::NumberOutOfRange {
            literal: token.text.to_string(),
            offset: token.offset,
        }),
    }
}

/// Parses one side against a shared variable table.
pub fn parse(source: &str, variables: &mut Variables) -> ParseResult<Expr> {
    Parser::new(source, variables).parse()
}
