//! Observer hook for watching or steering the solver.

use num_complex::Complex64;

/// Receives solver events and decides how the iteration should proceed.
///
/// The `observe` method returns `Option<A>`, where `Some(action)` requests a
/// solver action and `None` lets the solver continue unchanged.
///
/// Closures automatically implement `Observer`, and a built-in impl for `()`
/// provides a no-op observer that always returns `None`.
pub trait Observer<E, A> {
    /// Observes a solver event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

/// Event emitted by the Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// An attempt is about to start from `guess`.
    AttemptStarted {
        attempt: usize,
        guess: &'a [Complex64],
    },
    /// The residuals were evaluated at the current point of an attempt.
    Iteration {
        attempt: usize,
        iteration: usize,
        point: &'a [Complex64],
        /// 2-norm of the residual vector at `point`
        residual_norm: f64,
    },
    /// An attempt ended, with or without convergence.
    AttemptFinished {
        attempt: usize,
        iterations: usize,
        converged: bool,
    },
}

impl Event<'_> {
    /// Returns the attempt the event belongs to.
    #[must_use]
    pub fn attempt(&self) -> usize {
        match self {
            Event::AttemptStarted { attempt, .. }
            | Event::Iteration { attempt, .. }
            | Event::AttemptFinished { attempt, .. } => *attempt,
        }
    }
}

/// Control actions an observer may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// End the current attempt and move on to the next one.
    AbandonAttempt,
    /// End the whole solve call without a solution.
    Stop,
}
