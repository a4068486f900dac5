//! Call-expression abstraction consumed by the rule engine.
//!
//! A host front end (see `logcheck-go`) parses source files, walks every call
//! expression in pre-order and lowers it into these types. Type and package
//! identity are answered separately by a [`TypeResolver`].

use std::path::PathBuf;

/// Source position. Line and column are 1-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
    /// Byte offset from the start of the file.
    pub offset: usize,
}

impl Position {
    /// Creates a position without a byte offset.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            offset: 0,
        }
    }

    /// Sets the byte offset.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Kind of a basic literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Interpreted or raw string.
    String,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Imaginary number.
    Imaginary,
    /// Character (rune).
    Char,
}

/// Shape of an expression, as far as the checks care.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A bare identifier.
    Ident(String),
    /// Member selection `receiver.member`.
    Selector {
        /// Expression before the dot.
        receiver: Box<Expr>,
        /// Selected name.
        member: String,
    },
    /// A nested call.
    Call(Box<CallExpr>),
    /// A basic literal; its source text (quotes included) is [`Expr::text`].
    Literal(LiteralKind),
    /// Anything else (composite literals, operators, closures, ...).
    Other,
}

/// An expression with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression shape.
    pub kind: ExprKind,
    /// Source text exactly as written.
    pub text: String,
    /// Start position.
    pub position: Position,
}

impl Expr {
    /// Creates an identifier expression.
    #[must_use]
    pub fn ident(name: impl Into<String>, position: Position) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            kind: ExprKind::Ident(name),
            position,
        }
    }

    /// Creates a literal expression from its source text.
    #[must_use]
    pub fn literal(kind: LiteralKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind: ExprKind::Literal(kind),
            text: text.into(),
            position,
        }
    }

    /// Creates a selector expression `receiver.member`.
    #[must_use]
    pub fn selector(receiver: Expr, member: impl Into<String>) -> Self {
        let member = member.into();
        Self {
            text: format!("{}.{member}", receiver.text),
            position: receiver.position,
            kind: ExprKind::Selector {
                receiver: Box::new(receiver),
                member,
            },
        }
    }

    /// Creates an opaque expression.
    #[must_use]
    pub fn other(text: impl Into<String>, position: Position) -> Self {
        Self {
            kind: ExprKind::Other,
            text: text.into(),
            position,
        }
    }

    /// Returns the identifier name if this is an identifier.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the call if this expression is one.
    #[must_use]
    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            ExprKind::Call(call) => Some(call.as_ref()),
            _ => None,
        }
    }

    /// Returns the literal kind if this is a basic literal.
    #[must_use]
    pub fn literal_kind(&self) -> Option<LiteralKind> {
        match self.kind {
            ExprKind::Literal(kind) => Some(kind),
            _ => None,
        }
    }
}

/// A call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Called expression.
    pub callee: Expr,
    /// Arguments in order.
    pub args: Vec<Expr>,
    /// The last argument is spread (`args...`).
    pub spread: bool,
}

impl CallExpr {
    /// Creates a call without a spread argument.
    #[must_use]
    pub fn new(callee: Expr, args: Vec<Expr>) -> Self {
        Self {
            callee,
            args,
            spread: false,
        }
    }

    /// Marks the last argument as spread.
    #[must_use]
    pub fn with_spread(mut self) -> Self {
        self.spread = true;
        self
    }

    /// Position diagnostics for this call are reported at.
    #[must_use]
    pub fn position(&self) -> Position {
        self.callee.position
    }

    /// Splits a `receiver.Method` callee; `None` for calls without a receiver.
    #[must_use]
    pub fn selector(&self) -> Option<(&Expr, &str)> {
        match &self.callee.kind {
            ExprKind::Selector { receiver, member } => {
                Some((receiver.as_ref(), member.as_str()))
            }
            _ => None,
        }
    }

    /// Wraps the call into an expression (e.g. a receiver of another call).
    #[must_use]
    pub fn into_expr(self, text: impl Into<String>) -> Expr {
        Expr {
            position: self.callee.position,
            text: text.into(),
            kind: ExprKind::Call(Box::new(self)),
        }
    }
}

/// One compilation unit as seen by the engine.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Path used in violation locations.
    pub path: PathBuf,
    /// Import path of the package the file belongs to.
    pub package_path: String,
    /// Every call expression of the file, in pre-order.
    pub calls: Vec<CallExpr>,
}

impl SourceFile {
    /// Identity matched against override patterns: package path plus base name.
    #[must_use]
    pub fn override_name(&self) -> String {
        let base = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.package_path.is_empty() {
            base
        } else {
            format!("{}/{base}", self.package_path)
        }
    }
}

/// A named type: declaring package path plus type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    /// Import path of the declaring package.
    pub package: String,
    /// Type name.
    pub name: String,
}

impl NamedType {
    /// Creates a named type.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Whether this is `name` declared in `package`.
    #[must_use]
    pub fn is(&self, package: &str, name: &str) -> bool {
        self.package == package && self.name == name
    }
}

/// Type and package identity queries supplied by the host.
pub trait TypeResolver {
    /// Named type of an expression, if it has one.
    fn type_of(&self, expr: &Expr) -> Option<NamedType>;

    /// Import path of the package an identifier refers to, if it names one.
    fn package_of(&self, expr: &Expr) -> Option<String>;
}
