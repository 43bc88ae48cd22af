//! Identifier validation commands

use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use super::output::{exit_code, Output};
use crate::domain::ValidationReport;
use crate::registry::ValidatorRegistry;

/// Validates a single identifier
pub fn validate(
    registry: &ValidatorRegistry,
    output: &Output,
    type_name: &str,
    input: &str,
) -> Result<ExitCode> {
    let outcome = registry.is_valid(input, type_name);
    let report = ValidationReport::new(type_name, input, &outcome);

    output.report(&report, false);
    Ok(exit_code(report.severity))
}

/// Validates every non-blank line of `path` (`-` for stdin)
pub fn check(
    registry: &ValidatorRegistry,
    output: &Output,
    type_name: &str,
    path: &Path,
    jobs: usize,
) -> Result<ExitCode> {
    let content = read_input(path)?;
    let inputs: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    output.verbose(&format!("Checking {} identifiers with {} jobs", inputs.len(), jobs));
    let reports = check_all(registry, type_name, &inputs, jobs)?;

    for report in &reports {
        output.report(report, true);
    }

    let worst = reports.iter().filter_map(|r| r.severity).max();
    Ok(exit_code(worst))
}

/// Validates `inputs` on up to `jobs` scoped threads, keeping input order
pub fn check_all(
    registry: &ValidatorRegistry,
    type_name: &str,
    inputs: &[&str],
    jobs: usize,
) -> Result<Vec<ValidationReport>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    let jobs = jobs.clamp(1, inputs.len());
    let chunk = inputs.len().div_ceil(jobs);

    std::thread::scope(|s| {
        let workers: Vec<_> = inputs
            .chunks(chunk)
            .map(|batch| {
                s.spawn(move || {
                    batch
                        .iter()
                        .map(|input| {
                            let outcome = registry.is_valid(input, type_name);
                            ValidationReport::new(type_name, *input, &outcome)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(inputs.len());
        for worker in workers {
            let batch = worker
                .join()
                .map_err(|_| anyhow::anyhow!("Validation worker panicked"))?;
            reports.extend(batch);
        }
        Ok(reports)
    })
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read identifiers from stdin")?;
        return Ok(content);
    }

    fs::read_to_string(path)
        .with_context(|| format!("Failed to read identifiers: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Confirmed, IdentifierType, Severity, Validation, ValidationFailure};
    use crate::validator::Validator;

    /// Confirms inputs starting with a digit, rejects the rest
    struct DigitValidator;

    impl Validator for DigitValidator {
        fn supported_type(&self) -> IdentifierType {
            IdentifierType::Other("ISBN".to_string())
        }

        fn check(&self, input: &str) -> Validation {
            if input.starts_with(|c: char| c.is_ascii_digit()) {
                Ok(Confirmed)
            } else {
                Err(ValidationFailure::invalid("bad checksum"))
            }
        }
    }

    fn registry() -> ValidatorRegistry {
        ValidatorRegistry::from_parts(vec![Box::new(DigitValidator)], Vec::new())
    }

    #[test]
    fn keeps_input_order() {
        let inputs: Vec<String> = (0..37)
            .map(|i| if i % 3 == 0 { format!("x{}", i) } else { i.to_string() })
            .collect();
        let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();

        let reports = check_all(&registry(), "ISBN", &inputs, 4).unwrap();

        assert_eq!(reports.len(), inputs.len());
        for (report, input) in reports.iter().zip(&inputs) {
            assert_eq!(report.input, *input);
            assert_eq!(report.valid, !input.starts_with('x'));
        }
    }

    #[test]
    fn more_jobs_than_inputs() {
        let reports = check_all(&registry(), "ISBN", &["1", "x"], 16).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].severity, Some(Severity::DefinitiveInvalid));
    }

    #[test]
    fn zero_jobs_runs_serially() {
        let reports = check_all(&registry(), "ISBN", &["1"], 0).unwrap();
        assert!(reports[0].valid);
    }

    #[test]
    fn empty_batch() {
        assert!(check_all(&registry(), "ISBN", &[], 4).unwrap().is_empty());
    }

    #[test]
    fn unknown_type_in_batch() {
        let reports = check_all(&registry(), "ARK", &["ark:/1/2"], 2).unwrap();
        assert_eq!(reports[0].severity, Some(Severity::Indeterminate));
        assert_eq!(reports[0].type_name, "ARK");
    }
}
