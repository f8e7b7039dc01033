//! Tree-walking evaluator for expression trees.
//!
//! Values are bound positionally: a variable node with index `k` reads
//! `values[k]`, where the slice follows the order of the [`Variables`] table
//! the tree was parsed against. Evaluation is a pure function of the tree
//! and the slice, so repeated calls with the same inputs give bit-identical
//! results.
//!
//! Every operator and call node checks that its result is finite; the first
//! overflow or NaN is reported as [`EvalError::NonFinite`] at that node so it
//! never leaks into a residual or a solution.
//!
//! [`Variables`]: crate::expr::Variables

use num_complex::Complex64;

use crate::errors::EvalError;
use crate::expr::Expr;
use crate::operators::arithmetic::Fault;

impl Expr {
    /// Evaluates the expression at the given variable values.
    ///
    /// # Arguments
    /// * `values` - One complex value per variable, in interning order
    ///
    /// # Errors
    /// Returns an `EvalError` for division by zero, `%` on complex operands,
    /// a variable without a bound value, a call with the wrong number of
    /// arguments, or a non-finite intermediate result.
    ///
    /// # Example
    /// ```
    /// # use complex_eqsolve::parser::parse;
    /// # use complex_eqsolve::expr::Variables;
    /// # use num_complex::Complex64;
    /// let mut variables = Variables::new();
    /// let expr = parse("z^2 + 1", &mut variables).unwrap();
    /// let value = expr.eval(&[Complex64::new(0.0, 1.0)]).unwrap();
    /// assert_eq!(value, Complex64::new(0.0, 0.0));
    /// ```
    pub fn eval(&self, values: &[Complex64]) -> Result<Complex64, EvalError> {
        match self {
            Expr::Literal(z) => Ok(*z),
            Expr::Var(var) => {
                values
                    .get(var.index as usize)
                    .copied()
                    .ok_or_else(|| EvalError::UnknownVariable {
                        name: var.name.clone(),
                        offset: var.offset,
                    })
            }
            Expr::Unary {
                op,
                operand,
                offset,
            } => finite(op.apply(operand.eval(values)?), *offset),
            Expr::Binary {
                op,
                lhs,
                rhs,
                offset,
            } => {
                let lhs = lhs.eval(values)?;
                let rhs = rhs.eval(values)?;
                let value = op.apply(lhs, rhs).map_err(|fault| match fault {
                    Fault::DivisionByZero => EvalError::DivisionByZero { offset: *offset },
                    Fault::ComplexModulo => EvalError::ComplexModulo { offset: *offset },
                })?;
                finite(value, *offset)
            }
            Expr::Call {
                function,
                args,
                offset,
            } => {
                let args = args
                    .iter()
                    .map(|arg| arg.eval(values))
                    .collect::<Result<Vec<_>, _>>()?;
                let value = function.apply(&args).ok_or(EvalError::Arity {
                    name: function.name(),
                    expected: function.arity(),
                    got: args.len(),
                    offset: *offset,
                })?;
                finite(value, *offset)
            }
        }
    }
}

fn finite(value: Complex64, offset: usize) -> Result<Complex64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite { offset })
    }
}
