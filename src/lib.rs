//! Simultaneous equation solving over the complex numbers.
//!
//! This crate parses systems of equations written as plain text, detects
//! their free variables, and solves them with a multi-start damped
//! Newton-Raphson method whose Jacobian is estimated numerically. Any
//! failure of the equations themselves is reported with the index of the
//! equation, the side it occurred on, and a byte offset into that side.
//!
//! # Features
//!
//! - Recursive-descent parser with `+ - * / % ^`, unary minus, `|x|`,
//!   the constants `e`, `pi`, `i` and a fixed set of complex functions
//! - Free-variable detection in first-seen order
//! - Complex-linear numerical Jacobian
//! - Deterministic multi-start solving, sequential or on the rayon pool
//! - Observer hook for tracing or steering the solver
//!
//! # Example
//!
//! ```rust
//! use complex_eqsolve::{detect_equation_variables, solve};
//! use num_complex::Complex64;
//!
//! let equations = [("a + b", "5"), ("a - b", "1")];
//! assert_eq!(detect_equation_variables(&equations), vec!["a", "b"]);
//!
//! let guess = [Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)];
//! let solution = solve(&equations, 50, &guess).unwrap().unwrap();
//! assert!((solution.get("a").unwrap().re - 3.0).abs() < 1e-8);
//! ```

pub use detect::{detect_equation_variables, detect_variables, is_reserved, supported_functions};
pub use equation::Equation;
pub use errors::{ErrorKind, PositionedError, Side, SolveError};
pub use guess::{Explicit, GuessSource, QuasiRandom};
pub use solve::{solve, solve_system, solve_system_parallel, solve_with, Solution, SolverConfig};
pub use system::EquationSystem;

pub mod prelude {
    pub use crate::backends::vector::ComplexVector;
    pub use crate::equation::Equation;
    pub use crate::errors::{PositionedError, Side, SolveError};
    pub use crate::expr::{Expr, Variables};
    pub use crate::guess::{Explicit, GuessSource, QuasiRandom};
    pub use crate::observe::{Action, Event, Observer};
    pub use crate::solve::{solve, solve_with, Solution, SolverConfig};
    pub use crate::system::EquationSystem;
}

/// Vector types accepted by the evaluator
pub mod backends {
    pub mod vector;
}
/// Free-variable detection and reserved names
pub mod detect;
/// Single equations with per-side error attribution
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Expression tree evaluation
pub mod eval;
/// Expression tree representation
pub mod expr;
/// Initial-guess sources
pub mod guess;
/// Numerical Jacobian estimation
pub mod jacobian;
/// Tokenizer
pub mod lexer;
/// Damped Newton-Raphson attempts
pub mod newton;
/// Solver observer hook
pub mod observe;
/// Built-in operators, functions and constants
pub mod operators {
    pub mod arithmetic;
    pub mod constant;
    pub mod function;
}
/// Recursive-descent parser
pub mod parser;
/// Multi-start solving and host entry points
pub mod solve;
/// System of equations
pub mod system;
