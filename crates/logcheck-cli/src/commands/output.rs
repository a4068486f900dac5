//! Output formatting for lint results.

use anyhow::Result;
use logcheck_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use std::path::Path;

use crate::OutputFormat;

/// Prints lint results in the specified format.
///
/// `root` is the analysis root that violation paths are relative to.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Fancy => print_fancy(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {severity}: {}", violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }
    println!("{}", summary(result));
}

fn summary(result: &LintResult) -> String {
    let (errors, warnings) = result.count_by_severity();
    let color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!(
        "{color}Found {errors} error(s), {warnings} warning(s) in {} file(s)\x1b[0m",
        result.files_checked
    )
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{}", compact_line(violation));
    }
}

fn compact_line(violation: &Violation) -> String {
    format!(
        "{}:{}:{}: {} [{}] {}",
        violation.location.file.display(),
        violation.location.line,
        violation.location.column,
        violation.severity,
        violation.code,
        violation.message,
    )
}

fn print_fancy(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        let name = violation.location.file.display().to_string();
        match std::fs::read_to_string(root.join(&violation.location.file)) {
            Ok(content) => {
                let report = miette::Report::new(ViolationDiagnostic::from(violation))
                    .with_source_code(miette::NamedSource::new(name, content));
                eprintln!("{report:?}");
            }
            Err(e) => {
                tracing::debug!("No source for {name}: {e}");
                eprintln!("{}", violation.format());
            }
        }
    }
    eprintln!("{}", summary(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use logcheck_core::{Check, Location};
    use std::path::PathBuf;

    fn violation() -> Violation {
        Violation::for_check(
            Check::Structured,
            Location::new(PathBuf::from("pkg/a.go"), 7, 2),
            "unstructured logging function \"Infof\" should not be used",
        )
    }

    #[test]
    fn compact_format() {
        assert_eq!(
            compact_line(&violation()),
            "pkg/a.go:7:2: error [LC001] unstructured logging function \"Infof\" should not be used"
        );
    }

    #[test]
    fn summary_counts() {
        let mut result = LintResult::new();
        result.files_checked = 3;
        result.violations.push(violation());
        assert_eq!(
            summary(&result),
            "\x1b[31mFound 1 error(s), 0 warning(s) in 3 file(s)\x1b[0m"
        );
    }

    #[test]
    fn warnings_only_summary() {
        let mut result = LintResult::new();
        result.files_checked = 1;
        result.violations.push(Violation::for_check(
            Check::Deprecations,
            Location::new(PathBuf::from("pkg/a.go"), 3, 2),
            "Detected usage of deprecated helper \"KObjs\". Please switch to \"KObjSlice\" instead.",
        ));
        assert!(!result.has_errors());
        assert_eq!(
            summary(&result),
            "\x1b[33mFound 0 error(s), 1 warning(s) in 1 file(s)\x1b[0m"
        );
        assert!(compact_line(&result.violations[0]).starts_with("pkg/a.go:3:2: warning [LC007]"));
    }
}
