//! Unmangled C-ABI exports resolved by hosts through the symbol names in
//! [`crate::ffi::abi`].
#![allow(non_snake_case)]

use std::ffi::c_void;

use crate::arithmetic;
use crate::ffi::abi::{ABI_VERSION, StatusCode};
use crate::ffi::safety::status_of;
use crate::load;

/// Adds `a` to `b`.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn Add(a: i32, b: i32) -> i32 {
    arithmetic::add(a, b)
}

/// Subtracts `a` from `b`.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn Subtract(a: i32, b: i32) -> i32 {
    arithmetic::subtract(a, b)
}

/// Multiplies `a` by `b`.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn Multiply(a: i32, b: i32) -> i32 {
    arithmetic::multiply(a, b)
}

/// Divides `a` by `b`.
///
/// # Panics
///
/// Panics when `b` is zero, or for `i32::MIN / -1`. The panic unwinds into
/// a Rust host; a C host aborts.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn Divide(a: i32, b: i32) -> i32 {
    match arithmetic::divide(a, b) {
        Ok(quotient) => quotient,
        Err(err) => panic!("{err}"),
    }
}

/// Called by the hooking host to initialize the plugin.
#[unsafe(no_mangle)]
pub extern "C" fn Load(remote_parameters: *const c_void) {
    load::load(remote_parameters);
}

/// Divides `a` by `b` without panicking, writing the quotient to `out`.
///
/// # Safety
///
/// `out` must be null or valid for a write of one `i32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn calculator_divide_checked(a: i32, b: i32, out: *mut i32) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgFailure;
    }

    let result = arithmetic::divide(a, b);
    if let Ok(quotient) = result {
        unsafe { out.write(quotient) };
    }
    status_of(&result)
}

/// Returns the C ABI version.
#[unsafe(no_mangle)]
pub extern "C" fn calculator_abi_version() -> u32 {
    ABI_VERSION
}
