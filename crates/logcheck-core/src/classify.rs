//! Call classification.
//!
//! Decides whether a call belongs to the klog package family (the package
//! itself or a `klog.Verbose` value) or to the logr family (a `logr.Logger`
//! value), and whether a klog function is one of the unstructured variants.

use crate::syntax::{CallExpr, Expr, TypeResolver};

/// Import path of the structured-logging package.
pub const KLOG_PACKAGE: &str = "k8s.io/klog/v2";

/// Import path of the contextual-logger package.
pub const LOGR_PACKAGE: &str = "github.com/go-logr/logr";

/// klog functions that predate structured logging.
///
/// Anything else called on the klog family counts as structured, including
/// names added to klog later.
pub const UNSTRUCTURED_FUNCTIONS: [&str; 20] = [
    "Infof", "Info", "Infoln", "InfoDepth",
    "Warning", "Warningf", "Warningln", "WarningDepth",
    "Error", "Errorf", "Errorln", "ErrorDepth",
    "Fatal", "Fatalf", "Fatalln", "FatalDepth",
    "Exit", "Exitf", "Exitln", "ExitDepth",
];

/// klog functions which remain acceptable in code using contextual logging.
pub const CONTEXTUAL_HELPERS: [&str; 22] = [
    "Background",
    "ClearLogger",
    "EnableContextualLogging",
    "Flush",
    "FlushAndExit",
    "FlushLogger",
    "FromContext",
    "InitFlags",
    "KObj",
    "KObjSlice",
    "KRef",
    "LoggerWithCallDepth",
    "LoggerWithName",
    "LoggerWithValues",
    "NewContext",
    "NewKlogr",
    "SetLogger",
    "SetLoggerWithOptions",
    "SetOutput",
    "StartFlushDaemon",
    "StopFlushDaemon",
    "TODO",
];

/// Logging API family of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// The klog package or a `klog.Verbose` value.
    Klog,
    /// A `logr.Logger` value.
    Logr,
}

/// Result of classifying one call.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    /// API family of the receiver.
    pub family: Family,
    /// Called function or method name.
    pub method: &'a str,
    /// Receiver expression.
    pub receiver: &'a Expr,
}

impl Classification<'_> {
    /// Whether this is an unstructured klog function.
    #[must_use]
    pub fn is_unstructured(&self) -> bool {
        self.family == Family::Klog && is_unstructured(self.method)
    }

    /// Index where the key/value pairs start, for calls taking them.
    ///
    /// `InfoS(msg, kv...)`, `ErrorS(err, msg, kv...)`, `logger.WithValues(kv...)`,
    /// `logger.Info(msg, kv...)` and `logger.Error(err, msg, kv...)`.
    #[must_use]
    pub fn key_values_start(&self) -> Option<usize> {
        match (self.family, self.method) {
            (Family::Klog, "InfoS") | (Family::Logr, "Info") => Some(1),
            (Family::Klog, "ErrorS") | (Family::Logr, "Error") => Some(2),
            (Family::Logr, "WithValues") => Some(0),
            _ => None,
        }
    }
}

/// Classifies a call; `None` for calls without a receiver or outside both families.
#[must_use]
pub fn classify<'a>(call: &'a CallExpr, resolver: &dyn TypeResolver) -> Option<Classification<'a>> {
    let (receiver, method) = call.selector()?;
    let family = if is_klog(receiver, resolver) {
        Family::Klog
    } else if is_logr(receiver, resolver) {
        Family::Logr
    } else {
        return None;
    };
    Some(Classification {
        family,
        method,
        receiver,
    })
}

/// Whether the name is one of [`UNSTRUCTURED_FUNCTIONS`].
#[must_use]
pub fn is_unstructured(method: &str) -> bool {
    UNSTRUCTURED_FUNCTIONS.contains(&method)
}

/// Whether the name is one of [`CONTEXTUAL_HELPERS`].
#[must_use]
pub fn is_contextual_helper(method: &str) -> bool {
    CONTEXTUAL_HELPERS.contains(&method)
}

/// `klog.V(1)` and `klogV := klog.V(1)` are decided by type, `klog.Info` by
/// the package the identifier refers to, whatever its local name.
fn is_klog(expr: &Expr, resolver: &dyn TypeResolver) -> bool {
    if resolver
        .type_of(expr)
        .is_some_and(|t| t.is(KLOG_PACKAGE, "Verbose"))
    {
        return true;
    }
    is_package(expr, KLOG_PACKAGE, resolver)
}

fn is_logr(expr: &Expr, resolver: &dyn TypeResolver) -> bool {
    resolver
        .type_of(expr)
        .is_some_and(|t| t.is(LOGR_PACKAGE, "Logger"))
}

/// Whether `expr` is an identifier referring to the package at `path`.
#[must_use]
pub fn is_package(expr: &Expr, path: &str, resolver: &dyn TypeResolver) -> bool {
    expr.as_ident().is_some() && resolver.package_of(expr).as_deref() == Some(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::syntax::{NamedType, Position};
    use std::collections::HashMap;

    /// Resolver answering from fixed tables keyed by expression text.
    #[derive(Default)]
    pub(crate) struct TableResolver {
        pub(crate) types: HashMap<String, NamedType>,
        pub(crate) packages: HashMap<String, String>,
    }

    impl TableResolver {
        pub(crate) fn standard() -> Self {
            let mut resolver = Self::default();
            resolver.packages.insert("klog".into(), KLOG_PACKAGE.into());
            resolver.packages.insert("logr".into(), LOGR_PACKAGE.into());
            resolver.packages.insert("fmt".into(), "fmt".into());
            resolver
                .types
                .insert("klog.V(1)".into(), NamedType::new(KLOG_PACKAGE, "Verbose"));
            resolver
                .types
                .insert("klogV".into(), NamedType::new(KLOG_PACKAGE, "Verbose"));
            resolver
                .types
                .insert("logger".into(), NamedType::new(LOGR_PACKAGE, "Logger"));
            resolver
        }
    }

    impl TypeResolver for TableResolver {
        fn type_of(&self, expr: &Expr) -> Option<NamedType> {
            self.types.get(&expr.text).cloned()
        }

        fn package_of(&self, expr: &Expr) -> Option<String> {
            self.packages.get(expr.as_ident()?).cloned()
        }
    }

    pub(crate) fn pos() -> Position {
        Position::new(1, 1)
    }

    pub(crate) fn method_call(receiver: &str, method: &str) -> CallExpr {
        let receiver = if receiver.contains('(') {
            Expr::other(receiver, pos())
        } else {
            Expr::ident(receiver, pos())
        };
        CallExpr::new(Expr::selector(receiver, method), vec![])
    }

    #[test]
    fn klog_package_identifier() {
        let resolver = TableResolver::standard();
        let call = method_call("klog", "InfoS");
        let c = classify(&call, &resolver).unwrap();
        assert_eq!(c.family, Family::Klog);
        assert_eq!(c.method, "InfoS");
        assert!(!c.is_unstructured());
    }

    #[test]
    fn renamed_import_is_resolved_by_path() {
        let mut resolver = TableResolver::standard();
        resolver.packages.insert("log".into(), KLOG_PACKAGE.into());
        let call = method_call("log", "Infof");
        let c = classify(&call, &resolver).unwrap();
        assert_eq!(c.family, Family::Klog);
        assert!(c.is_unstructured());
    }

    #[test]
    fn verbose_receiver() {
        let resolver = TableResolver::standard();
        for receiver in ["klog.V(1)", "klogV"] {
            let call = method_call(receiver, "Info");
            let c = classify(&call, &resolver).unwrap();
            assert_eq!(c.family, Family::Klog, "{receiver}");
            assert!(c.is_unstructured());
        }
    }

    #[test]
    fn logr_receiver_is_never_unstructured() {
        let resolver = TableResolver::standard();
        let call = method_call("logger", "Info");
        let c = classify(&call, &resolver).unwrap();
        assert_eq!(c.family, Family::Logr);
        assert!(!c.is_unstructured());
        assert_eq!(c.key_values_start(), Some(1));
    }

    #[test]
    fn unrelated_calls_are_not_classified() {
        let resolver = TableResolver::standard();
        assert!(classify(&method_call("fmt", "Printf"), &resolver).is_none());
        assert!(classify(&method_call("other", "Info"), &resolver).is_none());
        // The logr package itself is not a logger.
        assert!(classify(&method_call("logr", "Info"), &resolver).is_none());

        let bare = CallExpr::new(Expr::ident("Info", pos()), vec![]);
        assert!(classify(&bare, &resolver).is_none());
    }

    #[test]
    fn structured_is_the_complement_of_the_unstructured_list() {
        assert!(is_unstructured("Warningln"));
        assert!(is_unstructured("ExitDepth"));
        assert!(!is_unstructured("InfoS"));
        assert!(!is_unstructured("InfoSDepth"));
        assert!(!is_unstructured("SomethingNew"));
    }

    #[test]
    fn key_value_offsets() {
        let resolver = TableResolver::standard();
        let offsets = [
            ("klog", "InfoS", Some(1)),
            ("klog", "ErrorS", Some(2)),
            ("klog", "Info", None),
            ("logger", "WithValues", Some(0)),
            ("logger", "Info", Some(1)),
            ("logger", "Error", Some(2)),
            ("logger", "WithName", None),
        ];
        for (receiver, method, expected) in offsets {
            let call = method_call(receiver, method);
            let c = classify(&call, &resolver).unwrap();
            assert_eq!(c.key_values_start(), expected, "{receiver}.{method}");
        }
    }
}
