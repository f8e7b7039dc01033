//! Systems of equations sharing one set of free variables.
//!
//! An `EquationSystem` parses a list of `(left, right)` texts against a
//! single variable table. Variables are ordered by first appearance, across
//! equations in list order and left side before right side; this order fixes
//! the layout of every value vector the system reads and every solution it
//! produces.
//!
//! # Example
//!
//! ```
//! use complex_eqsolve::system::EquationSystem;
//! use num_complex::Complex64;
//!
//! let system = EquationSystem::new(&[("a + b", "5"), ("a - b", "1")]).unwrap();
//! assert_eq!(system.variables(), &["a", "b"]);
//!
//! let values = [Complex64::new(3.0, 0.0), Complex64::new(2.0, 0.0)];
//! assert!(system.verify(&values, 1e-12).unwrap());
//! ```

use std::fmt;

use colored::Colorize;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::backends::vector::ComplexVector;
use crate::equation::Equation;
use crate::errors::PositionedError;
use crate::expr::Variables;
use crate::jacobian;

/// A parsed system of equations.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationSystem {
    equations: Vec<Equation>,
    variables: Variables,
}

impl EquationSystem {
    /// Parses every equation of the system.
    ///
    /// Parsing stops at the first failing side, which is reported with its
    /// equation index and side.
    ///
    /// # Arguments
    /// * `equations` - `(left, right)` text pairs
    pub fn new<L, R>(equations: &[(L, R)]) -> Result<Self, PositionedError>
    where
        L: AsRef<str>,
        R: AsRef<str>,
    {
        let mut variables = Variables::new();
        let equations = equations
            .iter()
            .enumerate()
            .map(|(index, (left, right))| {
                Equation::parse_with(
                    index,
                    left.as_ref(),
                    right.as_ref(),
                    &mut variables,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            equations,
            variables,
        })
    }

    /// Evaluates every residual `left - right` at the given values.
    ///
    /// Equations are evaluated in order and the first failure is returned.
    /// A value slice shorter than [`EquationSystem::num_variables`] surfaces
    /// as an unknown-variable error at the first unbound occurrence.
    pub fn residuals(&self, values: &[Complex64]) -> Result<Vec<Complex64>, PositionedError> {
        self.equations
            .iter()
            .map(|equation| equation.residual(values))
            .collect()
    }

    /// Evaluates every residual into a freshly allocated vector of type `V`.
    ///
    /// # Example
    /// ```
    /// # use complex_eqsolve::system::EquationSystem;
    /// # use nalgebra::DVector;
    /// # use num_complex::Complex64;
    /// let system = EquationSystem::new(&[("x * y", "6")]).unwrap();
    /// let values = DVector::from_vec(vec![Complex64::new(2.0, 0.0), Complex64::new(3.0, 0.0)]);
    /// let residuals: DVector<Complex64> = system.eval(&values).unwrap();
    /// assert_eq!(residuals[0], Complex64::new(0.0, 0.0));
    /// ```
    pub fn eval<V: ComplexVector>(&self, values: &V) -> Result<V, PositionedError> {
        let mut results = V::zeros(self.equations.len());
        self.eval_into(values.as_slice(), results.as_mut_slice())?;
        Ok(results)
    }

    /// Evaluates every residual into `results`, which must hold one slot per
    /// equation. Extra slots are left untouched.
    pub fn eval_into<'a>(
        &self,
        values: &[Complex64],
        results: &'a mut [Complex64],
    ) -> Result<&'a [Complex64], PositionedError> {
        for (slot, equation) in results.iter_mut().zip(&self.equations) {
            *slot = equation.residual(values)?;
        }
        Ok(results)
    }

    /// Estimates the Jacobian of the residuals at the given values.
    ///
    /// See [`jacobian::estimate`] for the convention used.
    pub fn jacobian(&self, values: &[Complex64]) -> Result<DMatrix<Complex64>, PositionedError> {
        jacobian::estimate(|probe| self.residuals(probe), values, self.equations.len())
    }

    /// Checks that every residual at `values` has magnitude below `epsilon`.
    pub fn verify(&self, values: &[Complex64], epsilon: f64) -> Result<bool, PositionedError> {
        Ok(self
            .residuals(values)?
            .iter()
            .all(|residual| residual.norm() < epsilon))
    }

    /// Ordered names of the free variables.
    pub fn variables(&self) -> &[String] {
        self.variables.names()
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Returns the number of equations in the system.
    pub fn num_equations(&self) -> usize {
        self.equations.len()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// True when there are as many equations as variables.
    pub fn is_square(&self) -> bool {
        self.num_equations() == self.num_variables()
    }
}

/// Returns the 2-norm of a residual vector.
pub(crate) fn norm(residuals: &[Complex64]) -> f64 {
    residuals.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt()
}

impl fmt::Display for EquationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} equation(s), {} variable(s))",
            "System".cyan(),
            self.num_equations(),
            self.num_variables()
        )?;
        for equation in &self.equations {
            writeln!(f, "  {} {}", format!("[{}]", equation.index() + 1).dimmed(), equation)?;
        }
        write!(f, "  {}: {}", "Variables".cyan(), self.variables().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, Side};
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_variable_order_across_equations() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("y + x", "1"), ("x * z", "w"), ("y", "2")])?;
        assert_eq!(system.variables(), &["y", "x", "z", "w"]);
        assert_eq!(system.num_equations(), 3);
        assert!(!system.is_square());
        Ok(())
    }

    #[test]
    fn test_residuals() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("a + b", "5"), ("a - b", "1")])?;
        let residuals = system.residuals(&[c(1.0, 0.0), c(1.0, 1.0)])?;
        assert_eq!(residuals, vec![c(-3.0, 1.0), c(-1.0, -1.0)]);
        Ok(())
    }

    #[test]
    fn test_parse_error_is_positioned() {
        let err = EquationSystem::new(&[("a", "1"), ("b", "2 +* 3")]).unwrap_err();
        assert_eq!(err.equation, 1);
        assert_eq!(err.side, Side::Right);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn test_short_values_are_unknown_variable() {
        let system = EquationSystem::new(&[("a", "b")]).unwrap();
        let err = system.residuals(&[c(1.0, 0.0)]).unwrap_err();
        assert_eq!(err.side, Side::Right);
        assert_eq!(err.kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn test_eval_vector_types() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("x * y", "6"), ("x", "y")])?;
        let values = vec![c(2.0, 0.0), c(3.0, 0.0)];
        let residuals: Vec<Complex64> = system.eval(&values)?;
        assert_eq!(residuals, vec![c(0.0, 0.0), c(-1.0, 0.0)]);

        let mut buffer = [c(9.0, 9.0); 3];
        system.eval_into(&values, &mut buffer)?;
        assert_eq!(buffer[1], c(-1.0, 0.0));
        assert_eq!(buffer[2], c(9.0, 9.0));
        Ok(())
    }

    #[test]
    fn test_eval_fewer_equations_than_variables() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("x * y", "6")])?;
        let values = nalgebra::DVector::from_vec(vec![c(2.0, 0.0), c(3.0, 0.0)]);
        let residuals: nalgebra::DVector<Complex64> = system.eval(&values)?;
        assert_eq!(residuals.len(), 1);
        assert_eq!(residuals[0], c(0.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_variables_match_detection() -> Result<(), Box<dyn std::error::Error>> {
        let equations = [("sin + sin(x)", "e * f'"), ("y", "x + sin - pi")];
        let system = EquationSystem::new(&equations)?;
        let detected = crate::detect::detect_equation_variables(&equations);
        assert_eq!(detected, system.variables());
        assert_eq!(system.variables(), &["sin", "x", "f'", "y"]);
        Ok(())
    }

    #[test]
    fn test_jacobian() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("x^2 + y", "0"), ("x * y", "1")])?;
        let jac = system.jacobian(&[c(2.0, 1.0), c(3.0, 0.0)])?;
        // [[2x, 1], [y, x]]
        assert_relative_eq!(jac[(0, 0)].re, 4.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(0, 0)].im, 2.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(0, 1)].re, 1.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(1, 0)].re, 3.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(1, 1)].re, 2.0, epsilon = 1e-6);
        assert_relative_eq!(jac[(1, 1)].im, 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_verify() -> Result<(), Box<dyn std::error::Error>> {
        let system = EquationSystem::new(&[("z^2", "-1")])?;
        assert!(system.verify(&[c(0.0, 1.0)], 1e-12)?);
        assert!(system.verify(&[c(0.0, -1.0)], 1e-12)?);
        assert!(!system.verify(&[c(1.0, 0.0)], 1e-12)?);
        Ok(())
    }

    #[test]
    fn test_empty_system() -> Result<(), Box<dyn std::error::Error>> {
        let pairs: [(&str, &str); 0] = [];
        let system = EquationSystem::new(&pairs)?;
        assert!(system.is_square());
        assert!(system.residuals(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[c(3.0, 0.0), c(0.0, 4.0)]), 5.0);
    }

    #[test]
    fn test_display() {
        colored::control::set_override(false);
        let system = EquationSystem::new(&[("a + b", "5"), ("a - b", "1")]).unwrap();
        let text = system.to_string();
        assert!(text.starts_with("System (2 equation(s), 2 variable(s))"));
        assert!(text.contains("[1] a + b = 5"));
        assert!(text.ends_with("Variables: a, b"));
    }
}
