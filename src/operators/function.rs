//! Built-in functions callable from equation text.
//!
//! The function set is closed: it lives in a static table and cannot be
//! extended at runtime. Every function maps complex arguments to a complex
//! result on its principal branch, as implemented by `num-complex`.

use num_complex::Complex64;

/// A built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Cbrt,
    Exp,
    Ln,
    /// Logarithm with an explicit base, `log(x, base)`
    Log,
    /// Complex magnitude, also written `|x|`
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

/// Lookup table of every function, in display order.
const FUNCTIONS: [(&str, Function); 18] = [
    ("sqrt", Function::Sqrt),
    ("cbrt", Function::Cbrt),
    ("exp", Function::Exp),
    ("ln", Function::Ln),
    ("log", Function::Log),
    ("abs", Function::Abs),
    ("sin", Function::Sin),
    ("cos", Function::Cos),
    ("tan", Function::Tan),
    ("asin", Function::Asin),
    ("acos", Function::Acos),
    ("atan", Function::Atan),
    ("sinh", Function::Sinh),
    ("cosh", Function::Cosh),
    ("tanh", Function::Tanh),
    ("asinh", Function::Asinh),
    ("acosh", Function::Acosh),
    ("atanh", Function::Atanh),
];

static FUNCTION_NAMES: [&str; 18] = {
    let mut names = [""; 18];
    let mut i = 0;
    while i < FUNCTIONS.len() {
        names[i] = FUNCTIONS[i].0;
        i += 1;
    }
    names
};

impl Function {
    /// Looks up a function by its (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        FUNCTIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    /// Names of all supported functions.
    pub fn names() -> &'static [&'static str] {
        &FUNCTION_NAMES
    }

    pub fn name(&self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, function)| function == self)
            .map_or("", |(name, _)| name)
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::Log => 2,
            _ => 1,
        }
    }

    /// Applies the function to already evaluated arguments.
    ///
    /// Returns `None` if the argument count does not match [`Function::arity`].
    /// The result may be non-finite; callers decide how to report that.
    pub fn apply(&self, args: &[Complex64]) -> Option<Complex64> {
        if args.len() != self.arity() {
            return None;
        }
        let z = args[0];
        Some(match self {
            Function::Sqrt => z.sqrt(),
            Function::Cbrt => z.cbrt(),
            Function::Exp => z.exp(),
            Function::Ln => z.ln(),
            Function::Log => z.ln() / args[1].ln(),
            Function::Abs => Complex64::new(z.norm(), 0.0),
            Function::Sin => z.sin(),
            Function::Cos => z.cos(),
            Function::Tan => z.tan(),
            Function::Asin => z.asin(),
            Function::Acos => z.acos(),
            Function::Atan => z.atan(),
            Function::Sinh => z.sinh(),
            Function::Cosh => z.cosh(),
            Function::Tanh => z.tanh(),
            Function::Asinh => z.asinh(),
            Function::Acosh => z.acosh(),
            Function::Atanh => z.atanh(),
        })
    }
}
