//! Per-file override filter.
//!
//! An override document turns checks on or off for files whose override
//! identity matches a regular expression:
//!
//! ```text
//! # comment
//! structured hello          # no sign means enable
//! +structured a.c
//! -structured adc
//! structured,parameters world
//! ```
//!
//! Rules are evaluated in document order and the last matching rule wins.

use regex::Regex;
use std::path::Path;
use thiserror::Error;

use crate::check::{Check, CheckSet};

/// Errors produced while loading an override document.
///
/// Line numbers are 0-based.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The document could not be read.
    #[error("{path}: {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The line lacks a pattern field.
    #[error("{path}:{line}: not of the format <checks> <regexp>: {text}")]
    Format {
        /// Path of the document.
        path: String,
        /// 0-based line index.
        line: usize,
        /// Offending line.
        text: String,
    },

    /// The line names a check outside the valid set.
    #[error("{path}:{line}: {name:?} is not a supported check: {text}")]
    UnknownCheck {
        /// Path of the document.
        path: String,
        /// 0-based line index.
        line: usize,
        /// The unknown name.
        name: String,
        /// Offending line.
        text: String,
    },

    /// The pattern does not compile.
    #[error("{path}:{line}: {source}")]
    Regex {
        /// Path of the document.
        path: String,
        /// 0-based line index.
        line: usize,
        /// Compiler error.
        source: regex::Error,
    },
}

/// One parsed line of an override document.
#[derive(Debug, Clone)]
pub struct OverrideRule {
    checks: CheckSet,
    enabled: bool,
    pattern: String,
    matcher: Regex,
    line: usize,
}

impl OverrideRule {
    /// Checks this rule applies to.
    #[must_use]
    pub fn checks(&self) -> CheckSet {
        self.checks
    }

    /// `true` for `+` (or no sign), `false` for `-`.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The pattern as written in the document.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 0-based line index in the document.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether the pattern matches the whole override identity.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        self.matcher.is_match(filename)
    }
}

/// Ordered list of override rules.
///
/// Built once and read-only afterwards, so one filter can be shared by
/// concurrent analyses.
#[derive(Debug, Clone)]
pub struct OverrideFilter {
    rules: Vec<OverrideRule>,
    valid: CheckSet,
}

impl Default for OverrideFilter {
    fn default() -> Self {
        Self::new(CheckSet::all())
    }
}

impl OverrideFilter {
    /// Creates an empty filter accepting the given check names.
    #[must_use]
    pub fn new(valid: CheckSet) -> Self {
        Self {
            rules: Vec::new(),
            valid,
        }
    }

    /// Reads and parses the override document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any line is malformed.
    /// No partial filter is produced.
    pub fn from_file(path: &Path, valid: CheckSet) -> Result<Self, FilterError> {
        let label = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
            path: label.clone(),
            source,
        })?;
        Self::parse(&label, &content, valid)
    }

    /// Parses an override document; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns the first malformed line.
    pub fn parse(path: &str, content: &str, valid: CheckSet) -> Result<Self, FilterError> {
        let mut filter = Self::new(valid);
        for (index, text) in content.lines().enumerate() {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let rule = filter.parse_line(path, index, text)?;
            filter.rules.push(rule);
        }
        tracing::debug!("Loaded {} override rule(s) from {}", filter.rules.len(), path);
        Ok(filter)
    }

    fn parse_line(&self, path: &str, line: usize, text: &str) -> Result<OverrideRule, FilterError> {
        let text = text.trim();
        let format_error = || FilterError::Format {
            path: path.to_string(),
            line,
            text: text.to_string(),
        };

        let (checks_field, pattern) = text
            .split_once(char::is_whitespace)
            .ok_or_else(format_error)?;
        let pattern = pattern.trim_start();
        if pattern.is_empty() {
            return Err(format_error());
        }

        let (enabled, checks_field) = if let Some(rest) = checks_field.strip_prefix('+') {
            (true, rest)
        } else if let Some(rest) = checks_field.strip_prefix('-') {
            (false, rest)
        } else {
            (true, checks_field)
        };

        let mut checks = CheckSet::empty();
        for name in checks_field.split(',') {
            let check = name
                .parse::<Check>()
                .ok()
                .filter(|c| self.valid.contains(*c))
                .ok_or_else(|| FilterError::UnknownCheck {
                    path: path.to_string(),
                    line,
                    name: name.to_string(),
                    text: text.to_string(),
                })?;
            checks.insert(check);
        }

        let regex_error = |source| FilterError::Regex {
            path: path.to_string(),
            line,
            source,
        };
        // Compile the pattern as written first so compiler errors quote the user's text.
        Regex::new(pattern).map_err(regex_error)?;
        let matcher = Regex::new(&format!("^(?:{pattern})$")).map_err(regex_error)?;

        Ok(OverrideRule {
            checks,
            enabled,
            pattern: pattern.to_string(),
            matcher,
            line,
        })
    }

    /// Decides whether `check` is enabled for `filename`.
    ///
    /// Starts from `default` and applies every rule naming `check` whose
    /// pattern matches, in document order.
    #[must_use]
    pub fn enabled(&self, check: Check, default: bool, filename: &str) -> bool {
        self.rules
            .iter()
            .filter(|rule| rule.checks.contains(check))
            .fold(default, |enabled, rule| {
                if rule.matches(filename) {
                    rule.enabled
                } else {
                    enabled
                }
            })
    }

    /// The parsed rules in document order.
    #[must_use]
    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// Whether the filter has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "# Example file
structured hello
+structured a.c
-structured adc
structured x.*y
structured,parameters world
";

    fn parse(content: &str) -> Result<OverrideFilter, FilterError> {
        OverrideFilter::parse("expressions", content, CheckSet::all())
    }

    #[test]
    fn matches_example_document() {
        let filter = parse(EXAMPLE).unwrap();
        assert_eq!(filter.rules().len(), 5);

        let cases = [
            ("hello", Check::Structured, false, true),
            ("hello", Check::Parameters, false, false),
            ("hello", Check::Parameters, true, true),
            ("hello/world", Check::Structured, false, false),
            ("abc", Check::Structured, false, true),
            ("adc", Check::Structured, false, false),
            ("x1y", Check::Structured, false, true),
            ("x2y", Check::Structured, false, true),
            ("world", Check::Parameters, false, true),
        ];
        for (filename, check, default, expected) in cases {
            assert_eq!(
                filter.enabled(check, default, filename),
                expected,
                "{check} for {filename} (default {default})"
            );
        }
    }

    #[test]
    fn empty_document_keeps_defaults() {
        let filter = parse("# nothing here\n\n   \n").unwrap();
        assert!(filter.is_empty());
        for check in Check::ALL {
            for default in [true, false] {
                assert_eq!(filter.enabled(check, default, "any/file.go"), default);
            }
        }
    }

    #[test]
    fn last_matching_rule_wins() {
        let filter = parse("+structured hello\n-structured hello\n").unwrap();
        assert!(!filter.enabled(Check::Structured, false, "hello"));

        let filter = parse("-structured hello\n+structured hello\n").unwrap();
        assert!(filter.enabled(Check::Structured, false, "hello"));
    }

    #[test]
    fn rules_only_affect_their_checks() {
        let filter = parse("-structured .*\n").unwrap();
        assert!(!filter.enabled(Check::Structured, true, "pkg/file.go"));
        assert!(filter.enabled(Check::Parameters, true, "pkg/file.go"));
    }

    #[test]
    fn sign_applies_to_whole_line() {
        let filter = parse("-structured,parameters pkg/.*\n").unwrap();
        assert!(!filter.enabled(Check::Structured, true, "pkg/a.go"));
        assert!(!filter.enabled(Check::Parameters, true, "pkg/a.go"));
        assert!(!filter.rules()[0].enabled());
    }

    #[test]
    fn invalid_regexp() {
        let err = parse("structured [").unwrap_err();
        assert!(matches!(err, FilterError::Regex { line: 0, .. }));
        assert!(err.to_string().starts_with("expressions:0: "));
        assert!(err.to_string().contains("unclosed character class"));
    }

    #[test]
    fn invalid_line() {
        let err = parse("structured .\nparameters").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expressions:1: not of the format <checks> <regexp>: parameters"
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let filter = parse("-structured hello \t\n").unwrap();
        assert_eq!(filter.rules()[0].pattern(), "hello");
        assert!(!filter.enabled(Check::Structured, true, "hello"));

        let filter = parse("\t+parameters   pkg/.*\n").unwrap();
        assert!(filter.enabled(Check::Parameters, false, "pkg/a.go"));
    }

    #[test]
    fn errors_quote_the_trimmed_line() {
        let err = parse("  parameters").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expressions:0: not of the format <checks> <regexp>: parameters"
        );

        let err = parse("  xxx . ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expressions:0: \"xxx\" is not a supported check: xxx ."
        );
    }

    #[test]
    fn invalid_check() {
        let err = parse("xxx .").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expressions:0: \"xxx\" is not a supported check: xxx ."
        );
    }

    #[test]
    fn check_outside_valid_set() {
        let valid: CheckSet = [Check::Structured, Check::Parameters].into_iter().collect();
        let err = OverrideFilter::parse("expressions", "contextual .*", valid).unwrap_err();
        assert!(matches!(err, FilterError::UnknownCheck { ref name, .. } if name == "contextual"));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expressions");
        std::fs::write(&path, EXAMPLE).unwrap();
        let filter = OverrideFilter::from_file(&path, CheckSet::all()).unwrap();
        assert!(filter.enabled(Check::Structured, false, "hello"));
    }

    #[test]
    fn missing_file() {
        let err = OverrideFilter::from_file(Path::new("no such file"), CheckSet::all());
        assert!(matches!(err, Err(FilterError::Io { .. })));
    }
}
