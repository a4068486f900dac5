//! Argument validation: format directives and key/value pairs.

use std::fmt;

use crate::syntax::{Expr, LiteralKind};

/// Format directives which must not appear in non-formatting calls.
///
/// Checked in order, first hit wins. `%q` is listed twice; keep the list as
/// is, reported directives depend on the order.
pub const FORMAT_SPECIFIERS: [&str; 23] = [
    "%v", "%+v", "%#v", "%T",
    "%t", "%b", "%c", "%d", "%o", "%O", "%q", "%x", "%X", "%U",
    "%e", "%E", "%f", "%F", "%g", "%G", "%s", "%q", "%p",
];

/// Finds a format directive in the string literals passed to `method`.
///
/// Methods ending in `f` format on purpose and are never reported.
#[must_use]
pub fn find_format_specifier(method: &str, args: &[Expr]) -> Option<&'static str> {
    if method.ends_with('f') {
        return None;
    }
    args.iter()
        .filter(|arg| arg.literal_kind() == Some(LiteralKind::String))
        .find_map(|arg| {
            FORMAT_SPECIFIERS
                .iter()
                .copied()
                .find(|specifier| arg.text.contains(specifier))
        })
}

/// Message for a format directive found by [`find_format_specifier`].
#[must_use]
pub fn format_specifier_message(method: &str, specifier: &str) -> String {
    format!("logging function {method:?} should not use format specifier {specifier:?}")
}

/// A problem with the key/value part of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValueProblem {
    /// Odd number of arguments; no key was inspected.
    OddCount,
    /// A key is not a string literal; carries the argument's source text.
    NonLiteralKey(String),
    /// A key literal has non-ASCII characters; carries the literal as written.
    NonAsciiKey(String),
}

impl KeyValueProblem {
    /// Human-readable message for a call to `method`.
    #[must_use]
    pub fn message(&self, method: &str) -> String {
        match self {
            Self::OddCount => format!(
                "Additional arguments to {method} should always be Key Value pairs. \
                 Please check if there is any key or value missing."
            ),
            Self::NonLiteralKey(text) => format!(
                "Key positional arguments are expected to be inlined constant strings. \
                 Please replace {text} provided with string value"
            ),
            Self::NonAsciiKey(text) => format!(
                "Key positional arguments {text} are expected to be lowerCamelCase \
                 alphanumeric strings. Please remove any non-Latin characters."
            ),
        }
    }

    /// Suggested fix, if there is a useful one.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::OddCount => None,
            Self::NonLiteralKey(_) => Some("Use a string literal such as \"podName\" as key"),
            Self::NonAsciiKey(_) => Some("Use ASCII letters and digits only"),
        }
    }
}

impl fmt::Display for KeyValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddCount => f.write_str("odd number of key/value arguments"),
            Self::NonLiteralKey(text) => write!(f, "non-literal key {text}"),
            Self::NonAsciiKey(text) => write!(f, "non-ASCII key {text}"),
        }
    }
}

/// Validates alternating key/value arguments.
///
/// An odd count is reported once and stops validation. Otherwise every key
/// position must hold an ASCII string literal; values are not inspected.
#[must_use]
pub fn check_key_values(key_values: &[Expr]) -> Vec<KeyValueProblem> {
    if key_values.len() % 2 != 0 {
        return vec![KeyValueProblem::OddCount];
    }

    key_values
        .iter()
        .step_by(2)
        .filter_map(|key| match key.literal_kind() {
            Some(LiteralKind::String) if key.text.is_ascii() => None,
            Some(LiteralKind::String) => Some(KeyValueProblem::NonAsciiKey(key.text.clone())),
            _ => Some(KeyValueProblem::NonLiteralKey(key.text.clone())),
        })
        .collect()
}

/// Whether a key is lowerCamelCase (`podName`, `test1Test`) or an
/// initialism with an optional plural `s` (`UID`, `TESTs`).
#[must_use]
pub fn is_valid_key_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        Some(first) if first.is_ascii_uppercase() => {
            let stem = key.strip_suffix('s').unwrap_or(key);
            stem.len() > 1
                && stem
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Literal keys of an even-length key/value list whose name is not valid.
///
/// Returns the literals as written. Non-literal keys and odd-length lists
/// are left to [`check_key_values`].
#[must_use]
pub fn find_bad_key_names(key_values: &[Expr]) -> Vec<&str> {
    if key_values.len() % 2 != 0 {
        return Vec::new();
    }
    key_values
        .iter()
        .step_by(2)
        .filter(|key| key.literal_kind() == Some(LiteralKind::String))
        .map(|key| key.text.as_str())
        .filter(|text| !is_valid_key_name(unquote(text)))
        .collect()
}

/// Message for a key reported by [`find_bad_key_names`].
#[must_use]
pub fn key_name_message(literal: &str) -> String {
    format!(
        "Key positional arguments {literal} are expected to no special characters. \
         Please refer to https://github.com/kubernetes/community/blob/master/contributors/\
         devel/sig-instrumentation/migration-to-structured-logging.md#name-arguments."
    )
}

fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix(['"', '`'])
        .and_then(|rest| rest.strip_suffix(['"', '`']))
        .unwrap_or(literal)
}
