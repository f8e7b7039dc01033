//! Expression module for representing parsed equation sides.
//!
//! This module defines the expression tree produced by the parser and walked
//! by the evaluator. The main types are:
//!
//! - `Expr`: A closed sum type over literals, variables, unary and binary
//!   operations and function calls
//! - `VarRef`: A variable occurrence, with its slot in the binding table
//! - `Variables`: The ordered set of free variables shared by a system
//!
//! Each node owns its children exclusively. Operator, call and variable
//! nodes carry the byte offset of the token that created them so failures
//! can be reported against the source text.

use std::collections::HashMap;
use std::fmt;

use num_complex::Complex64;

use crate::operators::arithmetic::{BinaryOp, UnaryOp};
use crate::operators::function::Function;

/// A reference to a free variable in an expression.
///
/// `index` is the variable's position in the [`Variables`] table the
/// expression was parsed against, which is also its position in every
/// binding slice passed to the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub index: u32,
    pub offset: usize,
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A complex constant (number literals and the named constants)
    Literal(Complex64),
    /// A free variable
    Var(VarRef),
    /// A prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        offset: usize,
    },
    /// An infix operation; `offset` points at the operator
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        offset: usize,
    },
    /// A built-in function call; `offset` points at the function name
    Call {
        function: Function,
        args: Vec<Expr>,
        offset: usize,
    },
}

impl Expr {
    pub fn literal(re: f64, im: f64) -> Self {
        Expr::Literal(Complex64::new(re, im))
    }

    /// Returns the names of the free variables in first-seen order, without
    /// duplicates.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Var(var) => {
                if !names.contains(&var.name.as_str()) {
                    names.push(&var.name);
                }
            }
            Expr::Unary { operand, .. } => operand.collect_variables(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }

    /// Binding strength used when printing; atoms bind tightest.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(z) if z.im != 0.0 || z.re < 0.0 => 1,
            Expr::Literal(_) | Expr::Var(_) | Expr::Call { .. } => u8::MAX,
            Expr::Unary { op, .. } => op.precedence(),
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(z) => {
                if z.im == 0.0 {
                    write!(f, "{}", z.re)
                } else if z.re == 0.0 {
                    write!(f, "{}*i", z.im)
                } else {
                    write!(f, "{} + {}*i", z.re, z.im)
                }
            }
            Expr::Var(var) => f.write_str(&var.name),
            Expr::Unary { op, operand, .. } => {
                f.write_str(op.symbol())?;
                operand.fmt_child(f, operand.precedence() < op.precedence())
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let prec = op.precedence();
                let (left_paren, right_paren) = if op.is_right_associative() {
                    (lhs.precedence() <= prec, rhs.precedence() < prec)
                } else {
                    (lhs.precedence() < prec, rhs.precedence() <= prec)
                };
                lhs.fmt_child(f, left_paren)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_child(f, right_paren)
            }
            Expr::Call { function, args, .. } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Ordered, duplicate-free set of variable names.
///
/// Names are assigned indices in the order they are first interned. A system
/// shares one table across all its equation sides, so the index order is the
/// first-seen order across equations, left side before right side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    names: Vec<String>,
    indices: HashMap<String, u32>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, assigning the next free one if needed.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
