//! # calculator-core
//!
//! Core crate shared by the calculator plugin and its native host. Contains
//! the unified error system, configuration schemas and logging setup.
//!
//! This crate has **no** internal dependencies on other calculator crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
