//! Run the plugin's initialization hook.

use clap::Args;

use calculator_core::error::AppError;
use calculator_host::{FunctionCall, PluginHost};

use crate::output;

/// Arguments for the load command
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Exported hook to call
    #[arg(long, default_value = "Load")]
    pub function: String,
    /// UTF-8 text forwarded to the hook as user data (at most 12 bytes)
    #[arg(long)]
    pub user_data: Option<String>,
}

/// Execute the load command
pub fn execute(args: &LoadArgs, host: &PluginHost) -> Result<(), AppError> {
    let call = FunctionCall {
        function_name: args.function.clone(),
        arguments: args.user_data.as_ref().map(|s| s.as_bytes().to_vec()),
    };

    host.execute_function(&call)?;

    output::print_success(&format!("'{}' executed", call.function_name));
    Ok(())
}
