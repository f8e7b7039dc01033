//! A single equation `left = right`, solved as `left - right = 0`.
//!
//! An `Equation` keeps the parsed tree of each side, so that every failure
//! can be attributed to the side it came from. Offsets in those failures
//! index into the text the side was parsed from.
//!
//! # Example
//!
//! ```
//! use complex_eqsolve::Equation;
//! use num_complex::Complex64;
//!
//! let eq = Equation::new("x^2", "2*x + 3").unwrap();
//! assert_eq!(eq.variables(), vec!["x"]);
//!
//! let r = eq.residual(&[Complex64::new(3.0, 0.0)]).unwrap();
//! assert_eq!(r, Complex64::new(0.0, 0.0));
//! ```

use std::fmt;

use colored::Colorize;
use num_complex::Complex64;

use crate::errors::{PositionedError, Side};
use crate::expr::{Expr, Variables};
use crate::parser::parse;

/// One parsed equation of a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    index: usize,
    left: Expr,
    right: Expr,
}

impl Equation {
    /// Parses a standalone equation.
    ///
    /// Variables are numbered in first-seen order, left side before right
    /// side, which is also the order of [`Equation::variables`].
    ///
    /// # Errors
    /// Returns a `PositionedError` for equation `0` if either side fails to
    /// tokenize or parse.
    pub fn new(left: &str, right: &str) -> Result<Self, PositionedError> {
        let mut variables = Variables::new();
        Self::parse_with(0, left, right, &mut variables)
    }

    /// Parses equation number `index` of a system, interning its variables
    /// into the system's shared table.
    ///
    /// The left side is parsed before the right side, so a syntax error on
    /// the left is reported even if the right is also malformed.
    pub fn parse_with(
        index: usize,
        left: &str,
        right: &str,
        variables: &mut Variables,
    ) -> Result<Self, PositionedError> {
        let left = parse(left, variables)
            .map_err(|err| PositionedError::new(index, Side::Left, err))?;
        let right = parse(right, variables)
            .map_err(|err| PositionedError::new(index, Side::Right, err))?;

        Ok(Self { index, left, right })
    }

    /// Evaluates `left - right` at the given values.
    ///
    /// Both sides are finite on success, but their difference may still
    /// overflow; callers that need a finite residual must check it.
    ///
    /// # Errors
    /// Returns a `PositionedError` naming the side whose evaluation failed.
    /// The left side is evaluated first.
    pub fn residual(&self, values: &[Complex64]) -> Result<Complex64, PositionedError> {
        let left = self.eval_side(Side::Left, values)?;
        let right = self.eval_side(Side::Right, values)?;
        Ok(left - right)
    }

    /// Evaluates one side at the given values.
    pub fn eval_side(
        &self,
        side: Side,
        values: &[Complex64],
    ) -> Result<Complex64, PositionedError> {
        self.side(side)
            .eval(values)
            .map_err(|err| PositionedError::new(self.index, side, err))
    }

    pub fn side(&self, side: Side) -> &Expr {
        side.select(&self.left, &self.right)
    }

    pub fn left(&self) -> &Expr {
        &self.left
    }

    pub fn right(&self) -> &Expr {
        &self.right
    }

    /// Position of the equation within its system.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Free variables of both sides, in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = self.left.variables();
        for name in self.right.variables() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, "=".cyan(), self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, EvalError, ExprError, ParseError};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_residual() -> Result<(), Box<dyn std::error::Error>> {
        let eq = Equation::new("a + b", "5")?;
        assert_eq!(eq.residual(&[c(3.0, 0.0), c(2.0, 0.0)])?, c(0.0, 0.0));
        assert_eq!(eq.residual(&[c(1.0, 1.0), c(1.0, 0.0)])?, c(-3.0, 1.0));
        Ok(())
    }

    #[test]
    fn test_variables_left_before_right() -> Result<(), Box<dyn std::error::Error>> {
        let eq = Equation::new("y * 2", "x + y + z")?;
        assert_eq!(eq.variables(), vec!["y", "x", "z"]);
        Ok(())
    }

    #[test]
    fn test_parse_error_on_left() {
        let err = Equation::new("(a + 1", "2").unwrap_err();
        assert_eq!(err.equation, 0);
        assert_eq!(err.side, Side::Left);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(6));
    }

    #[test]
    fn test_parse_error_on_right() {
        let mut variables = Variables::new();
        let err = Equation::parse_with(3, "a", "2 * ", &mut variables).unwrap_err();
        assert_eq!(err.equation, 3);
        assert_eq!(err.side, Side::Right);
        assert!(matches!(
            err.error,
            ExprError::Parse(ParseError::UnexpectedEnd { offset: 4, .. })
        ));
    }

    #[test]
    fn test_eval_error_attributed_to_side() {
        let eq = Equation::new("a", "1 / (a - 2)").unwrap();
        let err = eq.residual(&[c(2.0, 0.0)]).unwrap_err();
        assert_eq!(err.side, Side::Right);
        assert_eq!(
            err.error,
            ExprError::Eval(EvalError::DivisionByZero { offset: 2 })
        );
    }

    #[test]
    fn test_overflowing_difference_is_not_an_error() {
        let big = format!("1{}", "0".repeat(308));
        let eq = Equation::new(&format!("{big} + 0*x"), &format!("-{big}")).unwrap();
        let residual = eq.residual(&[c(1.0, 0.0)]).unwrap();
        assert!(!residual.is_finite());
    }

    #[test]
    fn test_shared_variable_table() {
        let mut variables = Variables::new();
        let first = Equation::parse_with(0, "p + q", "1", &mut variables).unwrap();
        let second = Equation::parse_with(1, "r", "q", &mut variables).unwrap();
        assert_eq!(variables.len(), 3);
        let values = [c(1.0, 0.0), c(2.0, 0.0), c(5.0, 0.0)];
        assert_eq!(first.residual(&values).unwrap(), c(2.0, 0.0));
        assert_eq!(second.residual(&values).unwrap(), c(3.0, 0.0));
    }

    #[test]
    fn test_display() {
        colored::control::set_override(false);
        let eq = Equation::new("a*(b+4)", "14").unwrap();
        assert_eq!(eq.to_string(), "a * (b + 4) = 14");
    }
}
