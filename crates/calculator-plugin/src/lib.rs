//! # calculator-plugin
//!
//! A native plugin loaded by a hooking host. Provides:
//!
//! - Four binary integer operations (`Add`, `Subtract`, `Multiply`, `Divide`)
//! - A `Load` entry point the host calls once with an opaque pointer
//! - The `#[repr(C)]` records and symbol names shared with hosts
//!
//! The crate builds both as a `cdylib` for hosts that open it at runtime and
//! as an `rlib` for hosts that link it in-process.

pub mod arithmetic;
pub mod exports;
pub mod ffi;
pub mod load;

pub use arithmetic::{ArithmeticError, Operation, add, divide, multiply, subtract};
pub use ffi::abi::{LoadArguments, RemoteEntryInfo, StatusCode};
pub use load::describe_remote_parameters;
