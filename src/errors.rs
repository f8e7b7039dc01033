//! Error types for the complex-eqsolve crate.
//!
//! This module defines every failure mode of the engine, from a single bad
//! character up to a whole solve call. The main error types are:
//!
//! - `LexError`: An unrecognized character in equation text
//! - `ParseError`: A malformed token sequence (includes lexical failures)
//! - `EvalError`: A failure while reducing an expression to a complex value
//! - `PositionedError`: Any of the above, tagged with the equation index and side
//! - `AttemptError`: A failure that ends one Newton attempt but not the solve call
//! - `SolveError`: What a host sees when a solve call fails
//!
//! Offsets are byte offsets into the text of one equation side.

use std::fmt;

use thiserror::Error;

/// An unrecognized character found by the tokenizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized character `{found}`")]
pub struct LexError {
    /// The offending character
    pub found: char,
    /// Byte offset of the character
    pub offset: usize,
}

/// Errors that can occur while turning equation text into an expression tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The tokenizer could not recognize a character
    #[error(transparent)]
    Lexical(#[from] LexError),
    /// A token appeared where something else was required
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    /// The text ended while more input was required
    #[error("expected {expected}, found end of equation")]
    UnexpectedEnd { expected: &'static str, offset: usize },
    /// A complete expression was followed by more tokens
    #[error("unexpected `{found}` after end of expression")]
    TrailingInput { found: String, offset: usize },
    /// An identifier followed by `(` that names no known function
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String, offset: usize },
    /// A known function called with the wrong number of arguments
    #[error("function `{name}` takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
        offset: usize,
    },
    /// A numeric literal too large to be represented
    #[error("number `{literal}` is out of range")]
    NumberOutOfRange { literal: String, offset: usize },
    /// Parentheses or prefix operators nested beyond the parser's limit
    #[error("expression is nested too deeply")]
    NestingTooDeep { offset: usize },
    /// More binary operators than one side may hold
    #[error("expression has too many operators")]
    TooLong { offset: usize },
}

impl ParseError {
    /// Returns the byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lexical(err) => err.offset,
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnexpectedEnd { offset, .. }
            | ParseError::TrailingInput { offset, .. }
            | ParseError::UnknownFunction { offset, .. }
            | ParseError::Arity { offset, .. }
            | ParseError::NumberOutOfRange { offset, .. }
            | ParseError::NestingTooDeep { offset }
            | ParseError::TooLong { offset } => *offset,
        }
    }
}

/// Errors that can occur while evaluating an expression tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Division (or modulo, or a negative power) with a zero complex divisor
    #[error("division by zero")]
    DivisionByZero { offset: usize },
    /// `%` applied to an operand with a non-zero imaginary part
    #[error("modulo is only defined for real operands")]
    ComplexModulo { offset: usize },
    /// A variable with no value in the binding table
    #[error("no value bound for variable `{name}`")]
    UnknownVariable { name: String, offset: usize },
    /// A call node whose argument count does not match the function
    #[error("function `{name}` takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
        offset: usize,
    },
    /// An intermediate result overflowed or became NaN
    #[error("result is not a finite number")]
    NonFinite { offset: usize },
}

impl EvalError {
    /// Returns the byte offset of the node that failed.
    pub fn offset(&self) -> usize {
        match self {
            EvalError::DivisionByZero { offset }
            | EvalError::ComplexModulo { offset }
            | EvalError::UnknownVariable { offset, .. }
            | EvalError::Arity { offset, .. }
            | EvalError::NonFinite { offset } => *offset,
        }
    }

    /// True for failures caused by the numeric magnitude of the trial point
    /// rather than by the equation itself.
    pub fn is_numeric_breakdown(&self) -> bool {
        matches!(self, EvalError::NonFinite { .. })
    }
}

/// A parse or evaluation failure of one equation side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<LexError> for ExprError {
    fn from(err: LexError) -> Self {
        ExprError::Parse(err.into())
    }
}

impl ExprError {
    pub fn offset(&self) -> usize {
        match self {
            ExprError::Parse(err) => err.offset(),
            ExprError::Eval(err) => err.offset(),
        }
    }
}

/// Which side of an equation produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Picks the value belonging to this side.
    pub fn select<T>(self, left: T, right: T) -> T {
        match self {
            Side::Left => left,
            Side::Right => right,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Coarse classification of a positioned error, for hosts that only need
/// to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Evaluation,
}

/// A failure attributed to one side of one equation.
///
/// The equation index always refers to the equation list passed to the
/// solve call that produced the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("equation {} ({side} side): {error}", .equation + 1)]
pub struct PositionedError {
    /// Index of the equation within the system
    pub equation: usize,
    /// Side of the equation whose expression failed
    pub side: Side,
    /// The underlying failure
    #[source]
    pub error: ExprError,
}

impl PositionedError {
    pub fn new(equation: usize, side: Side, error: impl Into<ExprError>) -> Self {
        Self {
            equation,
            side,
            error: error.into(),
        }
    }

    /// Returns the message of the underlying failure, without position.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Returns the byte offset into the failing side's text.
    pub fn offset(&self) -> Option<usize> {
        Some(self.error.offset())
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.error {
            ExprError::Parse(ParseError::Lexical(_)) => ErrorKind::Lexical,
            ExprError::Parse(_) => ErrorKind::Syntax,
            ExprError::Eval(_) => ErrorKind::Evaluation,
        }
    }

    /// True when the failure only reflects the current trial point.
    pub fn is_numeric_breakdown(&self) -> bool {
        matches!(&self.error, ExprError::Eval(err) if err.is_numeric_breakdown())
    }
}

/// Failures that end a single Newton attempt.
///
/// Everything except `Equation` is absorbed by the multi-attempt loop;
/// `Stopped` also ends the loop, without a solution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// The Jacobian could not be inverted at the current point
    #[error("singular Jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },
    /// The system has a different number of equations and variables
    #[error("system is not square: {equations} equation(s), {variables} variable(s)")]
    NotSquare { equations: usize, variables: usize },
    /// The residuals overflowed, or every damped trial point overflowed or
    /// failed to evaluate
    #[error("iteration diverged at iteration {iteration}")]
    Diverged { iteration: usize },
    /// The residuals could not be evaluated around the current point
    #[error("Jacobian could not be estimated at iteration {iteration}")]
    Undifferentiable { iteration: usize },
    /// The iteration budget ran out before the residuals became small
    #[error("no convergence after {iterations} iteration(s)")]
    Exhausted { iterations: usize },
    /// An observer abandoned the attempt
    #[error("attempt abandoned by observer at iteration {iteration}")]
    Abandoned { iteration: usize },
    /// An observer stopped the whole solve call
    #[error("solve stopped by observer at iteration {iteration}")]
    Stopped { iteration: usize },
    /// A failure of the equations themselves; aborts the solve call
    #[error(transparent)]
    Equation(#[from] PositionedError),
}

impl AttemptError {
    /// True if the error must abort the whole solve call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AttemptError::Equation(_))
    }
}

/// Errors returned to the host from a solve call.
///
/// Not finding a solution is not an error; it is reported as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Tokenizing, parsing or evaluating an equation side failed
    #[error(transparent)]
    Equation(#[from] PositionedError),
    /// The solver configuration was rejected
    #[error("invalid solver config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// An initial guess does not match the detected variables
    #[error("invalid initial guess for attempt {attempt}: expected {expected} value(s), got {got}")]
    InvalidGuessLength {
        attempt: usize,
        expected: usize,
        got: usize,
    },
}

impl SolveError {
    /// Returns the positioned error, if this failure belongs to an equation.
    pub fn positioned(&self) -> Option<&PositionedError> {
        match self {
            SolveError::Equation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positioned_error_accessors() {
        let err = PositionedError::new(
            2,
            Side::Right,
            ParseError::UnexpectedEnd {
                expected: "`)`",
                offset: 6,
            },
        );
        assert_eq!(err.equation, 2);
        assert_eq!(err.side, Side::Right);
        assert_eq!(err.offset(), Some(6));
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.message(), "expected `)`, found end of equation");
        assert_eq!(
            err.to_string(),
            "equation 3 (right side): expected `)`, found end of equation"
        );
    }

    #[test]
    fn test_error_kinds() {
        let lexical = PositionedError::new(0, Side::Left, LexError { found: '$', offset: 1 });
        assert_eq!(lexical.kind(), ErrorKind::Lexical);
        assert_eq!(lexical.message(), "unrecognized character `$`");

        let eval = PositionedError::new(0, Side::Left, EvalError::DivisionByZero { offset: 3 });
        assert_eq!(eval.kind(), ErrorKind::Evaluation);
        assert!(!eval.is_numeric_breakdown());

        let overflow = PositionedError::new(0, Side::Left, EvalError::NonFinite { offset: 0 });
        assert!(overflow.is_numeric_breakdown());
    }

    #[test]
    fn test_attempt_error_fatality() {
        assert!(!AttemptError::SingularJacobian { iteration: 1 }.is_fatal());
        assert!(!AttemptError::NotSquare {
            equations: 1,
            variables: 2
        }
        .is_fatal());
        let fatal: AttemptError =
            PositionedError::new(0, Side::Left, EvalError::ComplexModulo { offset: 2 }).into();
        assert!(fatal.is_fatal());
    }
}
