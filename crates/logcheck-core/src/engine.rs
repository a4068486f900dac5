//! Rule engine.
//!
//! The [`Engine`] combines the global defaults with the override filter and
//! runs every enabled check against the calls of one [`SourceFile`]. It holds
//! no mutable state, so one engine can serve any number of files, also from
//! several threads at once.

use tracing::{debug, trace};

use crate::check::{Check, CheckSet, GlobalDefaults};
use crate::classify::{self, Classification, Family, LOGR_PACKAGE};
use crate::filter::OverrideFilter;
use crate::params;
use crate::syntax::{CallExpr, LiteralKind, SourceFile, TypeResolver};
use crate::types::{Location, Suggestion, Violation};

/// Message of the `verbosity-zero` check.
pub const VERBOSITY_ZERO_MESSAGE: &str = "Logging with V(0) is semantically equivalent to the \
     same expression without it and just causes unnecessary overhead. It should get removed.";

/// Immutable check configuration plus the per-call dispatch.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    defaults: GlobalDefaults,
    filter: OverrideFilter,
}

impl Engine {
    /// Creates an engine.
    #[must_use]
    pub fn new(defaults: GlobalDefaults, filter: OverrideFilter) -> Self {
        Self { defaults, filter }
    }

    /// Global defaults the engine starts from.
    #[must_use]
    pub fn defaults(&self) -> &GlobalDefaults {
        &self.defaults
    }

    /// Per-file override rules.
    #[must_use]
    pub fn filter(&self) -> &OverrideFilter {
        &self.filter
    }

    /// Whether `check` applies to the file with the given override identity.
    #[must_use]
    pub fn is_enabled(&self, check: Check, filename: &str) -> bool {
        self.filter
            .enabled(check, self.defaults.is_enabled(check), filename)
    }

    /// Checks enabled for the file with the given override identity.
    #[must_use]
    pub fn enabled_checks(&self, filename: &str) -> CheckSet {
        Check::ALL
            .into_iter()
            .filter(|check| self.is_enabled(*check, filename))
            .collect()
    }

    /// Runs all enabled checks over the calls of `file`.
    ///
    /// Violations are returned in call order; a call producing several
    /// violations reports them in the order the checks run.
    #[must_use]
    pub fn check_file(&self, file: &SourceFile, resolver: &dyn TypeResolver) -> Vec<Violation> {
        let filename = file.override_name();
        let enabled = self.enabled_checks(&filename);
        debug!(
            "Checking {} ({} calls, checks: {:?})",
            filename,
            file.calls.len(),
            enabled.iter().map(Check::name).collect::<Vec<_>>()
        );

        let mut pass = Pass {
            file,
            enabled,
            violations: Vec::new(),
        };
        if !enabled.is_empty() {
            for call in &file.calls {
                pass.check_call(call, resolver);
            }
        }
        pass.violations
    }
}

/// State of one run over one file.
struct Pass<'a> {
    file: &'a SourceFile,
    enabled: CheckSet,
    violations: Vec<Violation>,
}

impl Pass<'_> {
    fn on(&self, check: Check) -> bool {
        self.enabled.contains(check)
    }

    fn report(&mut self, check: Check, call: &CallExpr, message: String) -> &mut Violation {
        let location = Location::at(self.file.path.clone(), call.position())
            .with_span(call.position().offset, call.callee.text.len());
        trace!("{}: {}", check, message);
        self.violations
            .push(Violation::for_check(check, location, message));
        let last = self.violations.len() - 1;
        &mut self.violations[last]
    }

    fn suggest(violation: &mut Violation, message: impl Into<String>) {
        violation.suggestion = Some(Suggestion::new(message));
    }

    fn check_call(&mut self, call: &CallExpr, resolver: &dyn TypeResolver) {
        let Some(c) = classify::classify(call, resolver) else {
            self.check_logr_package(call, resolver);
            return;
        };
        match c.family {
            Family::Klog => self.check_klog(call, &c),
            Family::Logr => self.check_logr(call, &c),
        }
    }

    fn check_klog(&mut self, call: &CallExpr, c: &Classification<'_>) {
        if c.method == "KObjs" && c.receiver.as_ident().is_some() && self.on(Check::Deprecations) {
            let message = format!(
                "Detected usage of deprecated helper {:?}. Please switch to \"KObjSlice\" instead.",
                c.method
            );
            let violation = self.report(Check::Deprecations, call, message);
            Self::suggest(violation, "Use klog.KObjSlice");
            return;
        }

        if self.on(Check::Contextual) && !classify::is_contextual_helper(c.method) {
            let message = format!(
                "function {:?} should not be used, convert to contextual logging",
                c.method
            );
            let violation = self.report(Check::Contextual, call, message);
            Self::suggest(violation, "Retrieve a logger with klog.FromContext and log through it");
            return;
        }

        self.check_verbosity_zero(call, c);
        self.check_inline_enabled(call, c);

        if c.is_unstructured() {
            if self.on(Check::Structured) {
                let message =
                    format!("unstructured logging function {:?} should not be used", c.method);
                let violation = self.report(Check::Structured, call, message);
                Self::suggest(violation, "Use InfoS or ErrorS with key/value pairs");
            }
            if self.on(Check::Parameters) {
                self.check_format(call, c);
            }
        } else if !(self.on(Check::Parameters) && self.check_format(call, c)) {
            self.check_key_values(call, c);
        }
    }

    fn check_logr(&mut self, call: &CallExpr, c: &Classification<'_>) {
        if self.on(Check::Parameters) {
            self.check_format(call, c);
        }
        self.check_key_values(call, c);

        if self.on(Check::WithHelpers) {
            let helper = match c.method {
                "WithName" => Some("LoggerWithName"),
                "WithValues" => Some("LoggerWithValues"),
                _ => None,
            };
            if let Some(helper) = helper {
                self.report_helper(call, c.method, helper);
            }
        }

        self.check_verbosity_zero(call, c);
        self.check_inline_enabled(call, c);
    }

    /// `logr.NewContext` is a package function, so it is not classified.
    fn check_logr_package(&mut self, call: &CallExpr, resolver: &dyn TypeResolver) {
        if !self.on(Check::WithHelpers) {
            return;
        }
        if let Some((receiver, "NewContext")) = call.selector() {
            if classify::is_package(receiver, LOGR_PACKAGE, resolver) {
                self.report_helper(call, "NewContext", "NewContext");
            }
        }
    }

    fn report_helper(&mut self, call: &CallExpr, method: &str, helper: &str) {
        let message = format!("function {method:?} should be called through klogr.{helper}");
        let violation = self.report(Check::WithHelpers, call, message);
        Self::suggest(violation, format!("Use klog.{helper}"));
    }

    /// Returns whether a format directive was reported.
    fn check_format(&mut self, call: &CallExpr, c: &Classification<'_>) -> bool {
        let Some(specifier) = params::find_format_specifier(c.method, &call.args) else {
            return false;
        };
        let message = params::format_specifier_message(c.method, specifier);
        let violation = self.report(Check::Parameters, call, message);
        Self::suggest(violation, format!("Use {}f to format, or pass values as key/value pairs", c.method));
        true
    }

    /// Parameters: shape of the key/value list. Key: names of literal keys.
    fn check_key_values(&mut self, call: &CallExpr, c: &Classification<'_>) {
        let (parameters, key) = (self.on(Check::Parameters), self.on(Check::Key));
        if !parameters && !key {
            return;
        }
        let Some(start) = c.key_values_start() else {
            return;
        };
        if call.spread {
            trace!("{}: spread arguments, skipping key/value check", c.method);
            return;
        }
        let Some(key_values) = call.args.get(start..) else {
            return;
        };
        if parameters {
            for problem in params::check_key_values(key_values) {
                let violation = self.report(Check::Parameters, call, problem.message(c.method));
                if let Some(suggestion) = problem.suggestion() {
                    Self::suggest(violation, suggestion);
                }
            }
        }
        if key {
            for literal in params::find_bad_key_names(key_values) {
                let violation = self.report(Check::Key, call, params::key_name_message(literal));
                Self::suggest(violation, "Use a lowerCamelCase key such as \"podName\"");
            }
        }
    }

    /// `klog.V(1).Enabled()` throws away the verbosity check it just made.
    fn check_inline_enabled(&mut self, call: &CallExpr, c: &Classification<'_>) {
        if !self.on(Check::Structured) || c.method != "Enabled" {
            return;
        }
        let Some((base, "V")) = c.receiver.as_call().and_then(CallExpr::selector) else {
            return;
        };
        let (base, var) = match c.family {
            Family::Klog => ("klog", "klogV"),
            Family::Logr => (base.text.as_str(), base.text.as_str()),
        };
        let message = format!(
            "the result of {base}.V should be stored in a variable and then be used multiple \
             times: if {var} := {base}.V(); {var}.Enabled() {{ ... {var}.Info ... }}"
        );
        let violation = self.report(Check::Structured, call, message);
        Self::suggest(violation, format!("Store {base}.V(...) in {var} and reuse it"));
    }

    fn check_verbosity_zero(&mut self, call: &CallExpr, c: &Classification<'_>) {
        if !self.on(Check::VerbosityZero) || c.method != "V" {
            return;
        }
        if let [level] = call.args.as_slice() {
            if level.literal_kind() == Some(LiteralKind::Int) && is_zero(&level.text) {
                let violation =
                    self.report(Check::VerbosityZero, call, VERBOSITY_ZERO_MESSAGE.to_string());
                Self::suggest(violation, "Remove the V(0) call");
            }
        }
    }
}

/// Whether an integer literal (any base, with digit separators) is zero.
fn is_zero(literal: &str) -> bool {
    let digits = literal.replace('_', "");
    let digits = ["0x", "0X", "0b", "0B", "0o", "0O"]
        .iter()
        .find_map(|prefix| digits.strip_prefix(prefix))
        .unwrap_or(&digits);
    !digits.is_empty() && digits.chars().all(|c| c == '0')
}
