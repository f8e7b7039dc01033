//! Predefined constants recognized inside equation text.

use num_complex::Complex64;

/// A named constant. Constant names are reserved and never become variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Euler's number, `e`
    E,
    /// `pi`
    Pi,
    /// The imaginary unit, `i`
    I,
}

const CONSTANTS: [(&str, Constant); 3] = [
    ("e", Constant::E),
    ("pi", Constant::Pi),
    ("i", Constant::I),
];

impl Constant {
    /// Looks up a constant by its (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        CONSTANTS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, constant)| *constant)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constant::E => "e",
            Constant::Pi => "pi",
            Constant::I => "i",
        }
    }

    pub fn value(&self) -> Complex64 {
        match self {
            Constant::E => Complex64::new(std::f64::consts::E, 0.0),
            Constant::Pi => Complex64::new(std::f64::consts::PI, 0.0),
            Constant::I => Complex64::i(),
        }
    }
}
