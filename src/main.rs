//! jql-to-plan - Jira tickets to OmniPlan packages

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = jql_to_plan::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
