//! Complex semantics of the unary and binary operators.
//!
//! - `+ - *` follow ordinary complex arithmetic
//! - `/` fails on a zero divisor instead of producing infinity
//! - `%` is the truncated remainder of the real parts and is only defined
//!   when both operands are real
//! - `^` is complex exponentiation on the principal branch, computed exactly
//!   by repeated multiplication for real integer exponents

use num_complex::Complex64;

/// Binary operators, from lowest to highest precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
}

/// Why an operator could not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    DivisionByZero,
    ComplexModulo,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 2,
            BinaryOp::Pow => 4,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Pow)
    }

    pub fn apply(&self, lhs: Complex64, rhs: Complex64) -> Result<Complex64, Fault> {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => divide(lhs, rhs),
            BinaryOp::Rem => remainder(lhs, rhs),
            BinaryOp::Pow => power(lhs, rhs),
        }
    }
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }

    /// Prefix operators sit between the multiplicative and power levels.
    pub fn precedence(&self) -> u8 {
        3
    }

    pub fn apply(&self, operand: Complex64) -> Complex64 {
        match self {
            UnaryOp::Neg => -operand,
            UnaryOp::Plus => operand,
        }
    }
}

fn is_zero(z: Complex64) -> bool {
    z.re == 0.0 && z.im == 0.0
}

fn divide(lhs: Complex64, rhs: Complex64) -> Result<Complex64, Fault> {
    if is_zero(rhs) {
        return Err(Fault::DivisionByZero);
    }
    Ok(lhs / rhs)
}

fn remainder(lhs: Complex64, rhs: Complex64) -> Result<Complex64, Fault> {
    if lhs.im != 0.0 || rhs.im != 0.0 {
        return Err(Fault::ComplexModulo);
    }
    if rhs.re == 0.0 {
        return Err(Fault::DivisionByZero);
    }
    Ok(Complex64::new(lhs.re % rhs.re, 0.0))
}

fn power(base: Complex64, exponent: Complex64) -> Result<Complex64, Fault> {
    if is_zero(base) {
        return if is_zero(exponent) {
            Ok(Complex64::new(1.0, 0.0))
        } else if exponent.re > 0.0 {
            Ok(Complex64::new(0.0, 0.0))
        } else {
            Err(Fault::DivisionByZero)
        };
    }
    if exponent.im == 0.0 {
        let n = exponent.re;
        if n.fract() == 0.0 && n.abs() <= f64::from(i32::MAX) {
            return Ok(base.powi(n as i32));
        }
        return Ok(base.powf(n));
    }
    Ok(base.powc(exponent))
}
