//! pidcheck - persistent identifier validation

use std::process::ExitCode;

fn main() -> ExitCode {
    match pidcheck::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
