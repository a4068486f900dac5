//! Check identifiers and the sets they are grouped in.
//!
//! A [`Check`] names one independently toggleable rule family. Every place
//! that refers to checks by name (override documents, settings files,
//! environment variables, command-line flags) goes through [`Check::from_str`]
//! so an unknown name is always an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Severity;

/// One toggleable rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// Unstructured logging-package functions must not be used, and a `V(n)`
    /// result must not be checked inline with `Enabled()`.
    Structured,
    /// Key/value parameters and format directives of logging calls.
    Parameters,
    /// Logging-package functions must be replaced by contextual logging.
    Contextual,
    /// Logger helpers must be called through the logging package.
    WithHelpers,
    /// `V(0)` is a no-op and should be removed.
    VerbosityZero,
    /// Literal keys must be lowerCamelCase or an initialism.
    Key,
    /// Deprecated klog helpers have replacements.
    Deprecations,
}

impl Check {
    /// All checks, in the order they are listed to users.
    pub const ALL: [Self; 7] = [
        Self::Structured,
        Self::Parameters,
        Self::Contextual,
        Self::WithHelpers,
        Self::VerbosityZero,
        Self::Key,
        Self::Deprecations,
    ];

    /// Returns the kebab-case name used in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Parameters => "parameters",
            Self::Contextual => "contextual",
            Self::WithHelpers => "with-helpers",
            Self::VerbosityZero => "verbosity-zero",
            Self::Key => "key",
            Self::Deprecations => "deprecations",
        }
    }

    /// Returns the rule code attached to violations of this check.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Structured => "LC001",
            Self::Parameters => "LC002",
            Self::Contextual => "LC003",
            Self::WithHelpers => "LC004",
            Self::VerbosityZero => "LC005",
            Self::Key => "LC006",
            Self::Deprecations => "LC007",
        }
    }

    /// Returns a one-line description for `list-checks`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Structured => "Warns about unstructured klog functions (Info, Infof, ...) and inline V(n).Enabled()",
            Self::Parameters => "Checks key/value parameters and format specifiers of logging calls",
            Self::Contextual => "Warns about klog calls which have a contextual logging replacement",
            Self::WithHelpers => "Requires logger helpers to be called through klog",
            Self::VerbosityZero => "Warns about V(0), which just causes overhead",
            Self::Key => "Requires literal keys to be lowerCamelCase or an initialism",
            Self::Deprecations => "Warns about deprecated klog helpers such as KObjs",
        }
    }

    /// Whether the check is on when nothing configures it.
    #[must_use]
    pub fn default_enabled(self) -> bool {
        matches!(self, Self::Structured | Self::Parameters | Self::Deprecations)
    }

    /// Severity of the violations this check reports.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::Deprecations => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Name of the environment variable that overrides the global default.
    #[must_use]
    pub fn env_var(self) -> String {
        format!("LOGCHECK_{}", self.name().replace('-', "_").to_uppercase())
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a check name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a supported check")]
pub struct UnknownCheck(pub String);

impl FromStr for Check {
    type Err = UnknownCheck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCheck(s.to_string()))
    }
}

/// A set of checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CheckSet(u8);

impl CheckSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The set of every known check.
    #[must_use]
    pub fn all() -> Self {
        Check::ALL.into_iter().collect()
    }

    /// Adds a check to the set.
    pub fn insert(&mut self, check: Check) {
        self.0 |= check.bit();
    }

    /// Removes a check from the set.
    pub fn remove(&mut self, check: Check) {
        self.0 &= !check.bit();
    }

    /// Whether the check is a member.
    #[must_use]
    pub fn contains(self, check: Check) -> bool {
        self.0 & check.bit() != 0
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the members in [`Check::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Check> {
        Check::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Check> for CheckSet {
    fn from_iter<I: IntoIterator<Item = Check>>(iter: I) -> Self {
        let mut set = Self::empty();
        for check in iter {
            set.insert(check);
        }
        set
    }
}

/// Global enablement of each check, fixed for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalDefaults {
    enabled: CheckSet,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            enabled: Check::ALL
                .into_iter()
                .filter(|c| c.default_enabled())
                .collect(),
        }
    }
}

impl GlobalDefaults {
    /// Creates defaults where exactly the given checks are on.
    #[must_use]
    pub fn with_enabled(enabled: CheckSet) -> Self {
        Self { enabled }
    }

    /// Turns a check on or off.
    pub fn set(&mut self, check: Check, enabled: bool) {
        if enabled {
            self.enabled.insert(check);
        } else {
            self.enabled.remove(check);
        }
    }

    /// Whether the check is on by default.
    #[must_use]
    pub fn is_enabled(&self, check: Check) -> bool {
        self.enabled.contains(check)
    }
}
