//! Calculator host CLI entry point.

use clap::Parser;

mod commands;
mod output;

use commands::Cli;

fn main() {
    // Plugin panics are reported as errors; keep the default hook's
    // backtrace noise out of the CLI output.
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "Plugin panicked");
    }));

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
