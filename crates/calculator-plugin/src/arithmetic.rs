//! Integer arithmetic behind the exported operations.
//!
//! `add`, `subtract` and `multiply` wrap on overflow. `divide` truncates
//! toward zero and is the only fallible operation.

use std::fmt;

use calculator_core::error::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ffi::abi::{ADD_SYMBOL, DIVIDE_SYMBOL, MULTIPLY_SYMBOL, SUBTRACT_SYMBOL};

/// Errors raised by the arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// The divisor was zero.
    #[error("attempt to divide {dividend} by zero")]
    DivideByZero {
        /// The dividend that was passed alongside the zero divisor.
        dividend: i32,
    },

    /// The result does not fit in an `i32` and cannot wrap.
    #[error("{operation}({a}, {b}) overflows a 32-bit integer")]
    Overflow {
        /// The operation that overflowed.
        operation: Operation,
        /// First operand.
        a: i32,
        /// Second operand.
        b: i32,
    },
}

impl From<ArithmeticError> for AppError {
    fn from(err: ArithmeticError) -> Self {
        AppError::arithmetic(err.to_string())
    }
}

/// The four exported binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `a + b`
    Add,
    /// `b - a`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
}

impl Operation {
    /// Every operation, in export order.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// The unmangled symbol name the plugin exports this operation under.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => ADD_SYMBOL,
            Self::Subtract => SUBTRACT_SYMBOL,
            Self::Multiply => MULTIPLY_SYMBOL,
            Self::Divide => DIVIDE_SYMBOL,
        }
    }

    /// Looks an operation up by its exported symbol name.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Applies the operation to `a` and `b`.
    pub fn apply(self, a: i32, b: i32) -> Result<i32, ArithmeticError> {
        match self {
            Self::Add => Ok(add(a, b)),
            Self::Subtract => Ok(subtract(a, b)),
            Self::Multiply => Ok(multiply(a, b)),
            Self::Divide => divide(a, b),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Returns `a` plus `b`.
pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Returns `b` minus `a`.
///
/// The operand order is inverted relative to the name: `subtract(2, 3)` is
/// `1`. Hosts depend on this.
pub fn subtract(a: i32, b: i32) -> i32 {
    b.wrapping_sub(a)
}

/// Returns `a` times `b`.
pub fn multiply(a: i32, b: i32) -> i32 {
    a.wrapping_mul(b)
}

/// Returns `a` divided by `b`, truncated toward zero.
pub fn divide(a: i32, b: i32) -> Result<i32, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivideByZero { dividend: a });
    }
    a.checked_div(b).ok_or(ArithmeticError::Overflow {
        operation: Operation::Divide,
        a,
        b,
    })
}
