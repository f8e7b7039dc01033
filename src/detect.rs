//! Free-variable detection over raw equation text.
//!
//! Detection works on tokens rather than parsed trees, so it also gives a
//! useful answer for text that does not parse yet (a host typically calls
//! it on every edit). Characters the tokenizer rejects are skipped.
//!
//! For text that does parse, the result is identical to the variable order
//! an [`EquationSystem`](crate::system::EquationSystem) assigns, which is the
//! order of every solution and initial-guess vector.

use itertools::Itertools;

use crate::lexer::{Token, TokenKind, Tokens};
use crate::operators::constant::Constant;
use crate::operators::function::Function;

/// Returns the free variables of the given equation sides.
///
/// Sides are scanned in the order given, so passing `[lhs0, rhs0, lhs1, rhs1, ...]`
/// yields first-seen order across equations, left side before right side.
/// An identifier is a variable unless it is a constant or is immediately
/// followed by `(`.
///
/// # Example
/// ```
/// use complex_eqsolve::detect_variables;
///
/// let names = detect_variables(["b * sin(a)", "a + e", "c"]);
/// assert_eq!(names, vec!["b", "a", "c"]);
/// ```
pub fn detect_variables<'a, I>(sides: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    sides
        .into_iter()
        .flat_map(side_variables)
        .unique()
        .map(str::to_string)
        .collect()
}

/// Returns the free variables of a list of `(left, right)` equation texts.
pub fn detect_equation_variables<L, R>(equations: &[(L, R)]) -> Vec<String>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    detect_variables(
        equations
            .iter()
            .flat_map(|(left, right)| [left.as_ref(), right.as_ref()]),
    )
}

fn side_variables(source: &str) -> Vec<&str> {
    let tokens: Vec<Token<'_>> = Tokens::new(source).filter_map(Result::ok).collect();
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.kind == TokenKind::Identifier)
        .filter(|(_, token)| Constant::from_name(token.text).is_none())
        .filter(|(index, _)| {
            tokens
                .get(index + 1)
                .is_none_or(|next| next.kind != TokenKind::LParen)
        })
        .map(|(_, token)| token.text)
        .collect()
}

/// True for the names of constants and built-in functions.
pub fn is_reserved(identifier: &str) -> bool {
    Constant::from_name(identifier).is_some() || Function::from_name(identifier).is_some()
}

/// Names of the built-in functions, for display.
pub fn supported_functions() -> &'static [&'static str] {
    Function::names()
}
