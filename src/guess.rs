//! Initial-guess sources for multi-start solving.
//!
//! The solver never draws random numbers itself. Every attempt asks a
//! [`GuessSource`] for its starting point, which keeps solving reproducible:
//! the same source gives the same attempts.

use num_complex::Complex64;

/// Supplies one starting point per attempt.
///
/// `guess` is called with the attempt index (from zero) and the number of
/// variables. Returning `None` ends the multi-attempt loop early.
///
/// Closures of the form `FnMut(usize, usize) -> Vec<Complex64>` implement
/// this trait directly.
pub trait GuessSource {
    fn guess(&mut self, attempt: usize, dimension: usize) -> Option<Vec<Complex64>>;
}

impl<F> GuessSource for F
where
    F: FnMut(usize, usize) -> Vec<Complex64>,
{
    fn guess(&mut self, attempt: usize, dimension: usize) -> Option<Vec<Complex64>> {
        Some(self(attempt, dimension))
    }
}

/// A fixed list of guesses supplied by the host, used in order.
///
/// Once the list runs out no further attempts are made.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Explicit {
    guesses: Vec<Vec<Complex64>>,
}

impl Explicit {
    pub fn new(guesses: Vec<Vec<Complex64>>) -> Self {
        Self { guesses }
    }

    /// A single guess, for one attempt.
    pub fn single(guess: &[Complex64]) -> Self {
        Self::new(vec![guess.to_vec()])
    }

    /// Builds guesses from real components.
    pub fn from_real(guesses: &[Vec<f64>]) -> Self {
        Self::new(
            guesses
                .iter()
                .map(|guess| guess.iter().map(|&re| Complex64::new(re, 0.0)).collect())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }
}

impl GuessSource for Explicit {
    fn guess(&mut self, attempt: usize, _dimension: usize) -> Option<Vec<Complex64>> {
        self.guesses.get(attempt).cloned()
    }
}

/// Deterministic low-discrepancy scatter over the square
/// `[-scale, scale] x [-scale, scale]` of every variable.
///
/// Points follow the additive recurrence `frac(1/2 + n * alpha)` with
/// `alpha_k = phi^-(k+1)`, where `phi` is the unique positive root of
/// `x^(d+1) = x + 1` for `d` real coordinates. Successive attempts cover the
/// square evenly instead of clustering like independent random draws.
#[derive(Debug, Clone, PartialEq)]
pub struct QuasiRandom {
    scale: f64,
    offset: usize,
}

impl QuasiRandom {
    pub fn new(scale: f64) -> Self {
        Self { scale, offset: 0 }
    }

    /// Skips the first `offset` points of the sequence.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for QuasiRandom {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl GuessSource for QuasiRandom {
    fn guess(&mut self, attempt: usize, dimension: usize) -> Option<Vec<Complex64>> {
        let coords = 2 * dimension;
        let phi = generalized_golden_ratio(coords);
        let n = (attempt + self.offset + 1) as f64;
        let mut alpha = 1.0;
        let mut unit = Vec::with_capacity(coords);
        for _ in 0..coords {
            alpha /= phi;
            unit.push((0.5 + n * alpha).fract());
        }
        Some(
            unit.chunks_exact(2)
                .map(|pair| {
                    Complex64::new(
                        self.scale * (2.0 * pair[0] - 1.0),
                        self.scale * (2.0 * pair[1] - 1.0),
                    )
                })
                .collect(),
        )
    }
}

/// Positive root of `x^(d+1) = x + 1`, by fixed-point iteration.
fn generalized_golden_ratio(d: usize) -> f64 {
    let exponent = 1.0 / (d as f64 + 1.0);
    let mut x = 2.0_f64;
    for _ in 0..64 {
        x = (1.0 + x).powf(exponent);
    }
    x
}
