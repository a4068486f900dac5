//! Extraction results for one Go file.
//!
//! The [`GoExtractor`](crate::GoExtractor) turns source text into a
//! [`GoFile`]: the calls the rule engine inspects, plus the imports and
//! variable bindings the [`GoResolver`](crate::GoResolver) needs to answer
//! type questions about them.

use logcheck_core::{CallExpr, Expr};

/// An import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Explicit name (`klog "k8s.io/klog/v2"`), including `.` and `_`.
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

impl ImportInfo {
    /// Name the package is referred to by in the file, if it can be referred to at all.
    ///
    /// Without an alias this is the last path element, skipping a major
    /// version suffix: `k8s.io/klog/v2` is `klog`.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("." | "_") => None,
            Some(alias) => Some(alias),
            None => default_package_name(&self.path),
        }
    }
}

fn default_package_name(path: &str) -> Option<&str> {
    let mut elements = path.rsplit('/');
    let last = elements.next()?;
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version {
        elements.next()
    } else {
        Some(last)
    }
}

/// Reference to a named type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Package qualifier (`klog` in `klog.Logger`).
    pub qualifier: Option<String>,
    /// Type name.
    pub name: String,
}

/// How a variable got its type.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSource {
    /// `var logger klog.Logger`, `func f(logger logr.Logger)`.
    Declared(TypeRef),
    /// `klogV := klog.V(1)`, `var logger = klog.Background()`.
    Inferred(Expr),
    /// Anything else: the name is a variable, but its type is not tracked.
    Unknown,
}

/// A variable, constant or parameter name introduced in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Declared name.
    pub name: String,
    /// Where its type comes from.
    pub source: BindingSource,
}

/// Everything extracted from one Go file.
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    /// Name in the `package` clause.
    pub package_name: Option<String>,
    /// Import specs in source order.
    pub imports: Vec<ImportInfo>,
    /// Bindings in source order.
    pub bindings: Vec<Binding>,
    /// Every call expression, in pre-order.
    pub calls: Vec<CallExpr>,
}
