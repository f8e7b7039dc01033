//! Multi-start solving and the host-facing entry points.
//!
//! A solve call parses the equations once, then runs up to
//! [`SolverConfig::attempts`] Newton attempts, each from the next guess of a
//! [`GuessSource`]. The first attempt to converge wins. When every attempt
//! fails to converge the result is `Ok(None)`: not finding a solution is a
//! normal outcome, not an error.
//!
//! Errors returned to the host are limited to:
//! - a [`PositionedError`](crate::errors::PositionedError) for a lexical,
//!   syntax or evaluation failure of one equation side,
//! - an invalid configuration,
//! - an initial guess whose length does not match the detected variables.
//!
//! # Example
//!
//! ```
//! use complex_eqsolve::{solve_with, QuasiRandom, SolverConfig};
//!
//! let equations = [("a + b", "5"), ("a - b", "1")];
//! let solution = solve_with(&equations, &SolverConfig::default(), QuasiRandom::default())
//!     .unwrap()
//!     .expect("a linear system converges");
//!
//! assert!((solution.get("a").unwrap().re - 3.0).abs() < 1e-8);
//! assert!((solution.get("b").unwrap().re - 2.0).abs() < 1e-8);
//! ```

use std::collections::HashMap;
use std::fmt;

use colored::Colorize;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::errors::{AttemptError, SolveError};
use crate::guess::{Explicit, GuessSource};
use crate::newton::{Attempt, Converged};
use crate::observe::{Action, Event, Observer};
use crate::system::EquationSystem;

/// Upper bound on [`SolverConfig::attempts`].
pub const MAX_ATTEMPTS: usize = 10_000;
/// Upper bound on [`SolverConfig::max_iterations`].
pub const MAX_ITERATIONS: usize = 100_000;

/// Configuration for the multi-start Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Number of attempts, each from its own initial guess
    pub attempts: usize,
    /// Newton iterations per attempt
    pub max_iterations: usize,
    /// Largest residual magnitude accepted as solved
    pub epsilon: f64,
    /// Run attempts on the rayon thread pool
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            attempts: 16,
            max_iterations: 100,
            epsilon: 1e-8,
            parallel: false,
        }
    }
}

impl SolverConfig {
    /// Validates the epsilon and bounds the attempt and iteration counts.
    ///
    /// # Errors
    ///
    /// Returns an error if epsilon is not finite and positive, or if a count
    /// exceeds [`MAX_ATTEMPTS`] or [`MAX_ITERATIONS`].
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err("epsilon must be finite and positive");
        }
        if self.attempts > MAX_ATTEMPTS {
            return Err("attempts exceeds the maximum of 10000");
        }
        if self.max_iterations > MAX_ITERATIONS {
            return Err("max_iterations exceeds the maximum of 100000");
        }
        Ok(())
    }

    fn attempt(&self, index: usize) -> Attempt {
        Attempt {
            index,
            max_iterations: self.max_iterations,
            epsilon: self.epsilon,
        }
    }
}

/// Values of the free variables at which every residual vanishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    variables: Vec<String>,
    values: Vec<Complex64>,
    attempt: usize,
    iterations: usize,
}

impl Solution {
    fn new(system: &EquationSystem, converged: Converged, attempt: usize) -> Self {
        Self {
            variables: system.variables().to_vec(),
            values: converged.point,
            attempt,
            iterations: converged.iterations,
        }
    }

    /// Returns the value of a variable by name.
    pub fn get(&self, name: &str) -> Option<Complex64> {
        self.variables
            .iter()
            .position(|variable| variable == name)
            .map(|index| self.values[index])
    }

    /// Iterates over `(name, value)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Complex64)> + '_ {
        self.variables
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn to_map(&self) -> HashMap<String, Complex64> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Values in variable order.
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Index of the attempt that converged.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// Newton steps taken by the converging attempt.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} (attempt {}, {} iteration(s))",
            "Solution".green(),
            self.attempt + 1,
            self.iterations
        )?;
        for (name, value) in self.iter() {
            writeln!(f, "  {} = {}", name.cyan(), value)?;
        }
        Ok(())
    }
}

/// Solves from a single initial guess.
///
/// This is one attempt of at most `max_iterations` Newton steps, with the
/// default epsilon. `initial_guess` must hold one value per detected
/// variable, in [`detect_variables`](crate::detect_variables) order.
///
/// # Errors
/// Returns a [`SolveError`] for malformed equations, an evaluation failure,
/// a too large iteration count, or a guess of the wrong length.
///
/// # Example
/// ```
/// use complex_eqsolve::solve;
/// use num_complex::Complex64;
///
/// let guess = [Complex64::new(1.0, 1.0)];
/// let solution = solve(&[("x^2", "-4")], 50, &guess).unwrap().unwrap();
/// let x = solution.get("x").unwrap();
/// assert!((x - Complex64::new(0.0, 2.0)).norm() < 1e-8);
/// ```
pub fn solve<L, R>(
    equations: &[(L, R)],
    max_iterations: usize,
    initial_guess: &[Complex64],
) -> Result<Option<Solution>, SolveError>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let config = SolverConfig {
        attempts: 1,
        max_iterations,
        ..SolverConfig::default()
    };
    solve_with(equations, &config, Explicit::single(initial_guess))
}

/// Parses the equations and runs a multi-start solve.
///
/// Attempts run in parallel when `config.parallel` is set; the result is the
/// same either way.
pub fn solve_with<L, R, G>(
    equations: &[(L, R)],
    config: &SolverConfig,
    guesses: G,
) -> Result<Option<Solution>, SolveError>
where
    L: AsRef<str>,
    R: AsRef<str>,
    G: GuessSource,
{
    check_config(config)?;
    let system = EquationSystem::new(equations)?;
    if config.parallel {
        solve_system_parallel(&system, config, guesses)
    } else {
        solve_system(&system, config, guesses, &mut ())
    }
}

/// Runs attempts one after another on an already parsed system.
///
/// The observer receives every [`Event`] of every attempt and may abandon an
/// attempt or stop the whole call.
pub fn solve_system<G, O>(
    system: &EquationSystem,
    config: &SolverConfig,
    mut guesses: G,
    observer: &mut O,
) -> Result<Option<Solution>, SolveError>
where
    G: GuessSource,
    O: for<'a> Observer<Event<'a>, Action>,
{
    check_config(config)?;
    let dimension = system.num_variables();

    for index in 0..config.attempts {
        let Some(guess) = guesses.guess(index, dimension) else {
            break;
        };
        check_guess(index, dimension, &guess)?;

        match config.attempt(index).run(system, guess, observer) {
            Ok(converged) => return Ok(Some(Solution::new(system, converged, index))),
            Err(AttemptError::Equation(err)) => return Err(err.into()),
            Err(AttemptError::Stopped { .. }) => break,
            Err(_) => {}
        }
    }

    Ok(None)
}

/// Runs attempts on the rayon thread pool.
///
/// All guesses are drawn up front, in attempt order. The lowest attempt
/// index that either converges or hits an equation error decides the
/// result, so the outcome matches [`solve_system`].
pub fn solve_system_parallel<G>(
    system: &EquationSystem,
    config: &SolverConfig,
    mut guesses: G,
) -> Result<Option<Solution>, SolveError>
where
    G: GuessSource,
{
    check_config(config)?;
    let dimension = system.num_variables();

    let guesses = (0..config.attempts)
        .map_while(|index| guesses.guess(index, dimension))
        .collect::<Vec<_>>();
    for (index, guess) in guesses.iter().enumerate() {
        check_guess(index, dimension, guess)?;
    }

    guesses
        .into_par_iter()
        .enumerate()
        .find_map_first(|(index, guess)| {
            match config.attempt(index).run(system, guess, &mut ()) {
                Ok(converged) => Some(Ok(Solution::new(system, converged, index))),
                Err(AttemptError::Equation(err)) => Some(Err(SolveError::from(err))),
                Err(_) => None,
            }
        })
        .transpose()
}

fn check_config(config: &SolverConfig) -> Result<(), SolveError> {
    config
        .validate()
        .map_err(|reason| SolveError::InvalidConfig { reason })
}

fn check_guess(attempt: usize, expected: usize, guess: &[Complex64]) -> Result<(), SolveError> {
    if guess.len() == expected {
        Ok(())
    } else {
        Err(SolveError::InvalidGuessLength {
            attempt,
            expected,
            got: guess.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, Side};
    use crate::guess::QuasiRandom;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_linear_system() -> Result<(), Box<dyn std::error::Error>> {
        let solution = solve(&[("a + b", "5"), ("a - b", "1")], 50, &[c(0.0, 0.0), c(0.0, 0.0)])?
            .ok_or("no solution")?;
        let a = solution.get("a").ok_or("missing a")?;
        let b = solution.get("b").ok_or("missing b")?;
        assert_relative_eq!(a.re, 3.0, epsilon = 1e-8);
        assert_relative_eq!(a.im, 0.0, epsilon = 1e-8);
        assert_relative_eq!(b.re, 2.0, epsilon = 1e-8);
        assert_relative_eq!(b.im, 0.0, epsilon = 1e-8);
        Ok(())
    }

    #[test]
    fn test_linear_system_from_many_guesses() {
        let equations = [("a + b", "5"), ("a - b", "1")];
        let mut source = QuasiRandom::new(100.0);
        for attempt in 0..20 {
            let guess = source.guess(attempt, 2).unwrap();
            let solution = solve(&equations, 50, &guess).unwrap().unwrap();
            assert_relative_eq!(solution.get("a").unwrap().re, 3.0, epsilon = 1e-8);
            assert_relative_eq!(solution.get("b").unwrap().re, 2.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_underdetermined_has_no_solution() {
        let config = SolverConfig::default();
        let result = solve_with(&[("a * (b + 4)", "14")], &config, QuasiRandom::default());
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_converged_residuals_below_epsilon() {
        let systems: [&[(&str, &str)]; 4] = [
            &[("x^2 + y^2", "25"), ("x - y", "1")],
            &[("sin(z)", "2")],
            &[("u + v", "2*i"), ("u * v", "-2")],
            &[("p^3 - 2*p", "5")],
        ];
        let config = SolverConfig {
            attempts: 64,
            ..SolverConfig::default()
        };
        for equations in systems {
            let system = EquationSystem::new(equations).unwrap();
            let solution = solve_system(&system, &config, QuasiRandom::new(3.0), &mut ())
                .unwrap()
                .unwrap_or_else(|| panic!("no solution for {equations:?}"));
            for residual in system.residuals(solution.values()).unwrap() {
                assert!(residual.norm() < config.epsilon);
            }
        }
    }

    #[test]
    fn test_unmatched_paren_is_syntax_error() {
        let err = solve(&[("(a + 1", "2")], 50, &[c(0.0, 0.0)]).unwrap_err();
        let positioned = err.positioned().unwrap();
        assert_eq!(positioned.equation, 0);
        assert_eq!(positioned.side, Side::Left);
        assert_eq!(positioned.kind(), ErrorKind::Syntax);
        assert_eq!(positioned.offset(), Some(6));
    }

    #[test]
    fn test_parse_error_consumes_no_attempt() {
        let config = SolverConfig {
            attempts: 0,
            ..SolverConfig::default()
        };
        let err =
            solve_with(&[("x", "1"), ("y", "$")], &config, QuasiRandom::default()).unwrap_err();
        let positioned = err.positioned().unwrap();
        assert_eq!(positioned.equation, 1);
        assert_eq!(positioned.side, Side::Right);
        assert_eq!(positioned.kind(), ErrorKind::Lexical);
    }

    #[test]
    fn test_zero_attempts_or_iterations() {
        let equations = [("a + b", "5"), ("a - b", "1")];
        let no_attempts = SolverConfig {
            attempts: 0,
            ..SolverConfig::default()
        };
        assert_eq!(solve_with(&equations, &no_attempts, QuasiRandom::default()), Ok(None));

        let no_iterations = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert_eq!(solve_with(&equations, &no_iterations, QuasiRandom::default()), Ok(None));
        assert_eq!(solve(&equations, 0, &[c(3.0, 0.0), c(2.0, 0.0)]), Ok(None));
    }

    #[test]
    fn test_evaluation_error_at_guess_aborts() {
        let err = solve(&[("1 / (x - 2)", "1")], 50, &[c(2.0, 0.0)]).unwrap_err();
        let positioned = err.positioned().unwrap();
        assert_eq!(positioned.side, Side::Left);
        assert_eq!(positioned.kind(), ErrorKind::Evaluation);
        assert_eq!(positioned.offset(), Some(2));
    }

    #[test]
    fn test_real_modulo_from_real_guess() -> Result<(), Box<dyn std::error::Error>> {
        let solution = solve(&[("x % 5", "2")], 50, &[c(1.0, 0.0)])?.ok_or("no solution")?;
        let x = solution.get("x").ok_or("missing x")?;
        assert_relative_eq!(x.re, 2.0, epsilon = 1e-8);
        assert_eq!(x.im, 0.0);

        let guesses = Explicit::from_real(&[vec![0.5], vec![3.5]]);
        let solution =
            solve_with(&[("x % 5", "2")], &SolverConfig::default(), guesses)?.ok_or("no solution")?;
        assert_eq!(solution.attempt(), 0);
        Ok(())
    }

    #[test]
    fn test_single_iteration_solves_linear_system() -> Result<(), Box<dyn std::error::Error>> {
        let solution =
            solve(&[("a + b", "5"), ("a - b", "1")], 1, &[c(0.0, 0.0), c(0.0, 0.0)])?
                .ok_or("no solution")?;
        assert_eq!(solution.iterations(), 1);
        assert_relative_eq!(solution.get("a").ok_or("missing a")?.re, 3.0, epsilon = 1e-8);
        assert_relative_eq!(solution.get("b").ok_or("missing b")?.re, 2.0, epsilon = 1e-8);
        Ok(())
    }

    #[test]
    fn test_invalid_guess_length() {
        let err = solve(&[("a + b", "5"), ("a - b", "1")], 50, &[c(0.0, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            SolveError::InvalidGuessLength {
                attempt: 0,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_invalid_config() {
        let config = SolverConfig {
            epsilon: 0.0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve_with(&[("x", "1")], &config, QuasiRandom::default()),
            Err(SolveError::InvalidConfig { .. })
        ));

        let config = SolverConfig {
            attempts: MAX_ATTEMPTS + 1,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(
            solve(&[("x", "1")], MAX_ITERATIONS + 1, &[c(0.0, 0.0)]),
            Err(SolveError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let system = EquationSystem::new(&[("z^3", "1")]).unwrap();
        let config = SolverConfig {
            attempts: 32,
            ..SolverConfig::default()
        };
        let sequential = solve_system(&system, &config, QuasiRandom::new(2.0), &mut ()).unwrap();
        let parallel = solve_system_parallel(&system, &config, QuasiRandom::new(2.0)).unwrap();
        assert_eq!(sequential, parallel);
        assert!(sequential.is_some());
    }

    #[test]
    fn test_first_converging_attempt_wins() {
        // The Jacobian vanishes at the first guess
        let system = EquationSystem::new(&[("x^2", "4")]).unwrap();
        let guesses = Explicit::new(vec![vec![c(0.0, 0.0)], vec![c(1.0, 0.0)], vec![c(-1.0, 0.0)]]);
        let solution = solve_system(&system, &SolverConfig::default(), guesses.clone(), &mut ())
            .unwrap()
            .unwrap();
        assert_eq!(solution.attempt(), 1);
        assert_relative_eq!(solution.values()[0].re, 2.0, epsilon = 1e-8);

        let parallel = solve_system_parallel(&system, &SolverConfig::default(), guesses).unwrap();
        assert_eq!(parallel.map(|s| s.attempt()), Some(1));
    }

    #[test]
    fn test_observer_stop_ends_solve() {
        let system = EquationSystem::new(&[("x^2", "-1"), ("y", "x")]).unwrap();
        let mut started = 0;
        let mut observer = |event: &Event<'_>| match event {
            Event::AttemptStarted { .. } => {
                started += 1;
                Some(Action::Stop)
            }
            _ => None,
        };
        let config = SolverConfig::default();
        let result = solve_system(&system, &config, QuasiRandom::default(), &mut observer);
        assert_eq!(result, Ok(None));
        assert_eq!(started, 1);
    }

    #[test]
    fn test_solution_accessors() {
        let solution = solve(&[("u", "1 + i"), ("v", "2 * u")], 10, &[c(0.0, 0.0), c(0.0, 0.0)])
            .unwrap()
            .unwrap();
        assert_eq!(solution.variables(), &["u", "v"]);
        let map = solution.to_map();
        assert_relative_eq!(map["v"].im, 2.0, epsilon = 1e-8);
        assert_eq!(solution.iter().count(), 2);
        assert_eq!(solution.get("w"), None);
    }
}
