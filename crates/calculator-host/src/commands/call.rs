//! Invoke a single arithmetic export.

use clap::{Args, ValueEnum};
use serde::Serialize;

use calculator_core::error::AppError;
use calculator_host::PluginHost;
use calculator_plugin::Operation;

use crate::output::{self, OutputFormat};

/// Operation names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OperationArg {
    /// a + b
    Add,
    /// b - a
    Subtract,
    /// a * b
    Multiply,
    /// a / b
    Divide,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Add => Operation::Add,
            OperationArg::Subtract => Operation::Subtract,
            OperationArg::Multiply => Operation::Multiply,
            OperationArg::Divide => Operation::Divide,
        }
    }
}

/// Arguments for the call command
#[derive(Debug, Args)]
pub struct CallArgs {
    /// Operation to call
    #[arg(value_enum)]
    pub operation: OperationArg,
    /// First operand
    #[arg(allow_negative_numbers = true)]
    pub a: i32,
    /// Second operand
    #[arg(allow_negative_numbers = true)]
    pub b: i32,
}

/// A completed call
#[derive(Debug, Serialize)]
struct CallResult {
    operation: Operation,
    a: i32,
    b: i32,
    result: i32,
}

/// Execute the call command
pub fn execute(args: &CallArgs, host: &PluginHost, format: OutputFormat) -> Result<(), AppError> {
    let operation = Operation::from(args.operation);
    let result = host.invoke(operation, args.a, args.b)?;

    match format {
        OutputFormat::Table => {
            println!("{}({}, {}) = {}", operation, args.a, args.b, result);
        }
        OutputFormat::Json => output::print_item(
            &CallResult {
                operation,
                a: args.a,
                b: args.b,
                result,
            },
            format,
        ),
    }

    Ok(())
}
