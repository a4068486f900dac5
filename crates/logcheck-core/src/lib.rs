//! # logcheck-core
//!
//! Rule engine for structured-logging hygiene checks.
//!
//! The engine is independent of any particular parser. A host front end
//! lowers its syntax tree into [`SourceFile`]s made of [`CallExpr`]s and
//! answers type and package questions through a [`TypeResolver`]. The
//! engine then reports:
//!
//! - calls to unstructured klog functions and inline `V(n).Enabled()`
//!   (`structured`)
//! - format directives in non-formatting calls and malformed key/value
//!   pairs (`parameters`)
//! - klog calls in code that should use contextual logging (`contextual`)
//! - logger helpers that bypass klog (`with-helpers`)
//! - the no-op `V(0)` (`verbosity-zero`)
//! - literal keys that are not lowerCamelCase (`key`)
//! - deprecated helpers such as `klog.KObjs`, as warnings (`deprecations`)
//!
//! Checks are toggled globally and per file through an [`OverrideFilter`].
//!
//! ## Example
//!
//! ```ignore
//! use logcheck_core::EngineConfig;
//!
//! let mut config = EngineConfig::new();
//! config.apply_env(|name| std::env::var(name).ok())?;
//! let engine = config.build()?;
//!
//! let violations = engine.check_file(&file, &resolver);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
pub mod classify;
mod config;
mod engine;
mod filter;
pub mod params;
mod syntax;
mod types;

pub use check::{Check, CheckSet, GlobalDefaults, UnknownCheck};
pub use config::{parse_bool, ConfigError, EngineConfig, Settings, CONFIG_ENV_VAR};
pub use engine::{Engine, VERBOSITY_ZERO_MESSAGE};
pub use filter::{FilterError, OverrideFilter, OverrideRule};
pub use syntax::{
    CallExpr, Expr, ExprKind, LiteralKind, NamedType, Position, SourceFile, TypeResolver,
};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
