//! Syntactic type resolution for one Go file.
//!
//! There is no type checker here. Types come from what the file itself
//! says: import specs, declared variable and parameter types, and the
//! return types of the logging constructors. Scopes are flattened, so a
//! name means the same thing everywhere in the file; the first binding with
//! a known type wins, and any variable shadows a package of the same name.

use std::collections::HashMap;

use logcheck_core::classify::{KLOG_PACKAGE, LOGR_PACKAGE};
use logcheck_core::{CallExpr, Expr, ExprKind, NamedType, TypeResolver};

use crate::extractor::{BindingSource, GoFile, TypeRef};

/// Answers type and package queries from the declarations of a [`GoFile`].
#[derive(Debug, Clone, Default)]
pub struct GoResolver {
    packages: HashMap<String, String>,
    variables: HashMap<String, Option<NamedType>>,
}

impl GoResolver {
    /// Builds the resolver for `file`.
    #[must_use]
    pub fn new(file: &GoFile) -> Self {
        let mut resolver = Self::default();
        for import in &file.imports {
            if let Some(name) = import.local_name() {
                resolver
                    .packages
                    .insert(name.to_owned(), import.path.clone());
            }
        }
        for binding in &file.bindings {
            let ty = match &binding.source {
                BindingSource::Declared(ty) => resolver.resolve_type_ref(ty),
                BindingSource::Inferred(expr) => resolver.type_of(expr),
                BindingSource::Unknown => None,
            };
            let slot = resolver
                .variables
                .entry(binding.name.clone())
                .or_insert(None);
            if slot.is_none() {
                *slot = ty;
            }
        }
        resolver
    }

    fn resolve_type_ref(&self, ty: &TypeRef) -> Option<NamedType> {
        let package = self.packages.get(ty.qualifier.as_deref()?)?;
        Some(canonical(NamedType::new(package.as_str(), ty.name.as_str())))
    }

    /// Result type of the constructors and logger methods that matter to the checks.
    fn call_result(&self, call: &CallExpr) -> Option<NamedType> {
        let (receiver, method) = call.selector()?;
        if let Some(package) = self.package_of(receiver) {
            return match (package.as_str(), method) {
                (KLOG_PACKAGE, "V") => Some(NamedType::new(KLOG_PACKAGE, "Verbose")),
                (
                    KLOG_PACKAGE,
                    "Background" | "FromContext" | "TODO" | "NewKlogr" | "LoggerWithName"
                    | "LoggerWithValues" | "LoggerWithCallDepth",
                )
                | (LOGR_PACKAGE, "Discard" | "FromContextOrDiscard" | "New") => Some(logger()),
                _ => None,
            };
        }
        let is_logger = self
            .type_of(receiver)
            .is_some_and(|ty| ty.is(LOGR_PACKAGE, "Logger"));
        let returns_logger = matches!(
            method,
            "V" | "WithName" | "WithValues" | "WithCallDepth" | "WithSink"
        );
        (is_logger && returns_logger).then(logger)
    }
}

fn logger() -> NamedType {
    NamedType::new(LOGR_PACKAGE, "Logger")
}

/// `klog.Logger` is an alias of `logr.Logger`.
fn canonical(ty: NamedType) -> NamedType {
    if ty.is(KLOG_PACKAGE, "Logger") {
        logger()
    } else {
        ty
    }
}

impl TypeResolver for GoResolver {
    fn type_of(&self, expr: &Expr) -> Option<NamedType> {
        match &expr.kind {
            ExprKind::Ident(name) => self.variables.get(name).cloned().flatten(),
            ExprKind::Call(call) => self.call_result(call),
            _ => None,
        }
    }

    fn package_of(&self, expr: &Expr) -> Option<String> {
        let name = expr.as_ident()?;
        if self.variables.contains_key(name) {
            return None;
        }
        self.packages.get(name).cloned()
    }
}
