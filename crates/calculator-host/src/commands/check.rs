//! Run the reference checks against the plugin.

use serde::Serialize;
use tabled::Tabled;

use calculator_core::error::AppError;
use calculator_host::{CheckOutcome, Expectation, PluginHost};

use crate::output::{self, OutputFormat};

/// One table row per check
#[derive(Debug, Serialize, Tabled)]
struct CheckRow {
    #[tabled(rename = "Call")]
    call: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Result")]
    result: &'static str,
}

impl From<&CheckOutcome> for CheckRow {
    fn from(outcome: &CheckOutcome) -> Self {
        Self {
            call: format!("{}({}, {})", outcome.operation, outcome.a, outcome.b),
            expected: match outcome.expected {
                Expectation::Value(value) => value.to_string(),
                Expectation::Failure => "error".to_string(),
            },
            actual: outcome.actual.clone(),
            result: if outcome.passed { "pass" } else { "FAIL" },
        }
    }
}

/// Execute the check command
pub fn execute(host: &PluginHost, format: OutputFormat) -> Result<(), AppError> {
    let outcomes = host.self_test();

    match format {
        OutputFormat::Table => {
            let rows: Vec<CheckRow> = outcomes.iter().map(CheckRow::from).collect();
            output::print_list(&rows, format);
        }
        OutputFormat::Json => output::print_item(&outcomes, format),
    }

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    if failed > 0 {
        return Err(AppError::plugin(format!(
            "{failed} of {} checks failed",
            outcomes.len()
        )));
    }

    output::print_success(&format!("All {} checks passed", outcomes.len()));
    Ok(())
}
