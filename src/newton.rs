//! A single damped Newton-Raphson attempt.
//!
//! Each iteration first checks convergence at the current point, then
//! estimates the Jacobian, solves `J * delta = -R` by LU decomposition and
//! moves along `delta`. The step is halved until the residual norm
//! decreases, up to [`MAX_HALVINGS`] times; if no trial decreases it, the
//! smallest trial that evaluated to finite residuals is taken anyway. The
//! point reached by the last step is checked for convergence as well.
//!
//! Failures fall in two groups. A semantic evaluation error (division by
//! zero, `%` on complex values, ...) at the guess or at a point the attempt
//! moved to is an error of the equations and aborts the whole solve call.
//! Everything else only ends this attempt: a singular Jacobian, an overflow,
//! or any failure at the points sampled to estimate the Jacobian.

use nalgebra::DVector;
use num_complex::Complex64;

use crate::errors::{AttemptError, PositionedError};
use crate::observe::{Action, Event, Observer};
use crate::system::{norm, EquationSystem};

/// Maximum number of step halvings per iteration.
pub const MAX_HALVINGS: usize = 8;

/// Pivots of the LU factors smaller than this, relative to the largest
/// Jacobian entry, make the Jacobian singular.
const PIVOT_TOLERANCE: f64 = 1e-8;

/// A point at which every residual is below the convergence epsilon.
#[derive(Debug, Clone, PartialEq)]
pub struct Converged {
    pub point: Vec<Complex64>,
    pub residuals: Vec<Complex64>,
    /// Number of Newton steps taken
    pub iterations: usize,
}

/// Parameters of one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    /// Attempt index reported in events
    pub index: usize,
    pub max_iterations: usize,
    pub epsilon: f64,
}

impl Attempt {
    /// Runs Newton's method on `system` from `guess`.
    ///
    /// # Errors
    /// Returns an `AttemptError` if the attempt ends without converging.
    /// Only [`AttemptError::Equation`] should abort a multi-attempt solve.
    pub fn run<O>(
        &self,
        system: &EquationSystem,
        guess: Vec<Complex64>,
        observer: &mut O,
    ) -> Result<Converged, AttemptError>
    where
        O: for<'a> Observer<Event<'a>, Action>,
    {
        let result = self.iterate(system, guess, observer);
        let (iterations, converged) = match &result {
            Ok(solution) => (solution.iterations, true),
            Err(err) => (failed_at(err), false),
        };
        let finished = Event::AttemptFinished {
            attempt: self.index,
            iterations,
            converged,
        };
        match observer.observe(&finished) {
            Some(Action::Stop) if !converged => Err(AttemptError::Stopped {
                iteration: iterations,
            }),
            _ => result,
        }
    }

    fn iterate<O>(
        &self,
        system: &EquationSystem,
        guess: Vec<Complex64>,
        observer: &mut O,
    ) -> Result<Converged, AttemptError>
    where
        O: for<'a> Observer<Event<'a>, Action>,
    {
        if !system.is_square() {
            return Err(AttemptError::NotSquare {
                equations: system.num_equations(),
                variables: system.num_variables(),
            });
        }

        let started = Event::AttemptStarted {
            attempt: self.index,
            guess: &guess,
        };
        if let Some(action) = observer.observe(&started) {
            return Err(interrupted(action, 0));
        }

        let mut point = guess;
        let mut residuals = system
            .residuals(&point)
            .map_err(|err| absorb(err, 0))?;
        if !all_finite(&residuals) {
            return Err(AttemptError::Diverged { iteration: 0 });
        }
        if self.max_iterations == 0 {
            return Err(AttemptError::Exhausted { iterations: 0 });
        }

        for iteration in 0..=self.max_iterations {
            let current = norm(&residuals);
            let event = Event::Iteration {
                attempt: self.index,
                iteration,
                point: &point,
                residual_norm: current,
            };
            if let Some(action) = observer.observe(&event) {
                return Err(interrupted(action, iteration));
            }

            if residuals.iter().all(|r| r.norm() < self.epsilon) {
                return Ok(Converged {
                    point,
                    residuals,
                    iterations: iteration,
                });
            }
            if iteration == self.max_iterations {
                break;
            }

            let step = newton_step(system, &point, &residuals, iteration)?;
            (point, residuals) = line_search(system, &point, &step, current)
                .ok_or(AttemptError::Diverged { iteration })?;
        }

        Err(AttemptError::Exhausted {
            iterations: self.max_iterations,
        })
    }
}

/// Solves `J * delta = -R` at `point`.
fn newton_step(
    system: &EquationSystem,
    point: &[Complex64],
    residuals: &[Complex64],
    iteration: usize,
) -> Result<Vec<Complex64>, AttemptError> {
    let jacobian = system
        .jacobian(point)
        .map_err(|_| AttemptError::Undifferentiable { iteration })?;
    if !jacobian.iter().all(|z| z.is_finite()) {
        return Err(AttemptError::Undifferentiable { iteration });
    }
    let scale = jacobian.iter().map(|z| z.norm()).fold(0.0, f64::max);
    let lu = jacobian.lu();
    if lu
        .u()
        .diagonal()
        .iter()
        .any(|pivot| pivot.norm() <= scale * PIVOT_TOLERANCE)
    {
        return Err(AttemptError::SingularJacobian { iteration });
    }

    let rhs = -DVector::from_column_slice(residuals);
    let step = lu
        .solve(&rhs)
        .ok_or(AttemptError::SingularJacobian { iteration })?;

    // A nearly singular matrix solves to huge or non-finite components
    if step.iter().all(|z| z.is_finite()) {
        Ok(step.iter().copied().collect())
    } else {
        Err(AttemptError::SingularJacobian { iteration })
    }
}

/// Backtracking along `step`. Returns the accepted point with its residuals,
/// or `None` if no trial point evaluated to finite residuals.
fn line_search(
    system: &EquationSystem,
    point: &[Complex64],
    step: &[Complex64],
    current: f64,
) -> Option<(Vec<Complex64>, Vec<Complex64>)> {
    let mut scale = 1.0;
    let mut fallback = None;
    for _ in 0..=MAX_HALVINGS {
        let trial: Vec<Complex64> = point
            .iter()
            .zip(step)
            .map(|(x, dx)| *x + *dx * scale)
            .collect();
        match system.residuals(&trial) {
            Ok(residuals) if all_finite(&residuals) => {
                if norm(&residuals) < current {
                    return Some((trial, residuals));
                }
                fallback = Some((trial, residuals));
            }
            _ => {}
        }
        scale *= 0.5;
    }
    fallback
}

/// Keeps semantic errors fatal and turns numeric breakdown into divergence.
fn absorb(err: PositionedError, iteration: usize) -> AttemptError {
    if err.is_numeric_breakdown() {
        AttemptError::Diverged { iteration }
    } else {
        AttemptError::Equation(err)
    }
}

fn all_finite(residuals: &[Complex64]) -> bool {
    residuals.iter().all(|r| r.is_finite())
}

fn interrupted(action: Action, iteration: usize) -> AttemptError {
    match action {
        Action::AbandonAttempt => AttemptError::Abandoned { iteration },
        Action::Stop => AttemptError::Stopped { iteration },
    }
}

fn failed_at(err: &AttemptError) -> usize {
    match err {
        AttemptError::SingularJacobian { iteration }
        | AttemptError::Diverged { iteration }
        | AttemptError::Undifferentiable { iteration }
        | AttemptError::Abandoned { iteration }
        | AttemptError::Stopped { iteration } => *iteration,
        AttemptError::Exhausted { iterations } => *iterations,
        AttemptError::NotSquare { .. } | AttemptError::Equation(_) => 0,
    }
}
