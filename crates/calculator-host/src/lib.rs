//! # calculator-host
//!
//! Native host harness for the calculator plugin. Resolves the plugin exports
//! by name, either from a shared library opened with `libloading` or from the
//! statically linked plugin crate, runs the `Load` hook and calls the
//! arithmetic operations.

pub mod bindings;
pub mod error;
pub mod host;

pub use bindings::{CalculatorBindings, InProcessBindings, LibraryBindings};
pub use error::HostError;
pub use host::{CheckOutcome, Delegate, Expectation, FunctionCall, PluginHost};
