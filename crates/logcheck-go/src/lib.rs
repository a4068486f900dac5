//! # logcheck-go
//!
//! Go front end for the logcheck rule engine.
//!
//! This crate parses Go sources with Tree-sitter and feeds them to
//! `logcheck-core`. It adds:
//!
//! - [`GoExtractor`] lowering every call expression into the engine's call model
//! - [`GoResolver`], a syntactic stand-in for the Go type checker
//! - [`ModuleIndex`] computing package import paths from `go.mod`
//! - [`Analyzer`] walking a source tree and collecting violations

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod extractor;
pub mod go;
pub mod module;
pub mod resolver;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use extractor::GoFile;
pub use go::{ExtractError, GoExtractor};
pub use module::ModuleIndex;
pub use resolver::GoResolver;
