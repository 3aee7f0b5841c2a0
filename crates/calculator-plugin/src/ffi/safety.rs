//! FFI safety wrappers: converts between FFI types and Rust types.

use crate::arithmetic::ArithmeticError;

use super::abi::StatusCode;

/// Maps an arithmetic result onto the status code returned over FFI.
pub fn status_of(result: &Result<i32, ArithmeticError>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::Success,
        Err(ArithmeticError::DivideByZero { .. }) => StatusCode::DivideByZero,
        Err(ArithmeticError::Overflow { .. }) => StatusCode::Overflow,
    }
}
