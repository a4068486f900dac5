//! Go extractor using Tree-sitter.

use logcheck_core::{CallExpr, Expr, ExprKind, LiteralKind, Position};
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::extractor::{Binding, BindingSource, GoFile, ImportInfo, TypeRef};

/// Errors raised while extracting a Go file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The grammar is incompatible with the linked tree-sitter runtime.
    #[error("Failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser returned no tree.
    #[error("Parser produced no syntax tree")]
    Parse,

    /// The file does not parse as Go.
    #[error("Syntax error at {line}:{column}")]
    Syntax {
        /// Line of the first error (1-indexed).
        line: usize,
        /// Column of the first error (1-indexed).
        column: usize,
    },
}

/// Extracts calls, imports and bindings from Go source.
pub struct GoExtractor {
    language: Language,
}

impl GoExtractor {
    /// Creates a new Go extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Parses `source` and lowers it into a [`GoFile`].
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or the source has
    /// syntax errors.
    pub fn extract(&self, source: &str) -> Result<GoFile, ExtractError> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let position = first_error(root).map_or(Position::new(1, 1), position);
            return Err(ExtractError::Syntax {
                line: position.line,
                column: position.column,
            });
        }

        let mut lowering = Lowering {
            src: source.as_bytes(),
            file: GoFile::default(),
        };
        lowering.walk(root);
        Ok(lowering.file)
    }

    fn parse(&self, source: &str) -> Result<Tree, ExtractError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        parser.parse(source, None).ok_or(ExtractError::Parse)
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn position(node: Node<'_>) -> Position {
    let point = node.start_position();
    Position::new(point.row + 1, point.column + 1).with_offset(node.start_byte())
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

struct Lowering<'src> {
    src: &'src [u8],
    file: GoFile,
}

impl<'src> Lowering<'src> {
    fn text(&self, node: Node<'_>) -> &'src str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// Visits every node in pre-order.
    fn walk(&mut self, root: Node<'_>) {
        let mut cursor = root.walk();
        loop {
            self.visit(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "package_clause" => {
                let mut cursor = node.walk();
                let name = node
                    .named_children(&mut cursor)
                    .find(|child| child.kind() == "package_identifier");
                self.file.package_name = name.map(|n| self.text(n).to_owned());
            }
            "import_spec" => self.import(node),
            "var_spec" | "const_spec" => self.var_spec(node),
            "parameter_declaration" => self.parameter(node),
            "short_var_declaration" => self.short_var(node),
            "call_expression" => {
                if let Some(call) = self.lower_call(node) {
                    self.file.calls.push(call);
                }
            }
            _ => {}
        }
    }

    fn import(&mut self, node: Node<'_>) {
        let Some(path) = node.child_by_field_name("path") else {
            return;
        };
        let path = self.text(path).trim_matches(|c| c == '"' || c == '`');
        let alias = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_owned());
        self.file.imports.push(ImportInfo {
            line: node.start_position().row + 1,
            alias,
            path: path.to_owned(),
        });
    }

    fn names(&self, node: Node<'_>, field: &str) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name(field, &mut cursor)
            .filter(|n| n.kind() == "identifier")
            .map(|n| self.text(n).to_owned())
            .collect()
    }

    fn expressions(&self, list: Node<'_>) -> Vec<Expr> {
        if list.kind() != "expression_list" {
            return vec![self.lower(list)];
        }
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .map(|n| self.lower(n))
            .collect()
    }

    fn type_ref(&self, node: Node<'_>) -> Option<TypeRef> {
        match node.kind() {
            "qualified_type" => Some(TypeRef {
                qualifier: Some(self.text(node.child_by_field_name("package")?).to_owned()),
                name: self.text(node.child_by_field_name("name")?).to_owned(),
            }),
            "type_identifier" => Some(TypeRef {
                qualifier: None,
                name: self.text(node).to_owned(),
            }),
            _ => None,
        }
    }

    fn bind(&mut self, names: Vec<String>, sources: Vec<BindingSource>) {
        let mut sources = sources.into_iter();
        for name in names {
            if name == "_" {
                sources.next();
                continue;
            }
            let source = sources.next().unwrap_or(BindingSource::Unknown);
            self.file.bindings.push(Binding { name, source });
        }
    }

    /// `var a, b T`, `var a = f()`, `const c = 0`.
    fn var_spec(&mut self, node: Node<'_>) {
        let names = self.names(node, "name");
        let sources = if let Some(ty) = node.child_by_field_name("type") {
            let source = self
                .type_ref(ty)
                .map_or(BindingSource::Unknown, BindingSource::Declared);
            vec![source; names.len()]
        } else {
            self.inferred(names.len(), node.child_by_field_name("value"))
        };
        self.bind(names, sources);
    }

    fn parameter(&mut self, node: Node<'_>) {
        let names = self.names(node, "name");
        let source = node
            .child_by_field_name("type")
            .and_then(|ty| self.type_ref(ty))
            .map_or(BindingSource::Unknown, BindingSource::Declared);
        let sources = vec![source; names.len()];
        self.bind(names, sources);
    }

    /// `a, b := x, y`; a single multi-value call leaves all types unknown.
    fn short_var(&mut self, node: Node<'_>) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let names = self
            .expressions(left)
            .into_iter()
            .map(|e| e.text)
            .collect::<Vec<_>>();
        let sources = self.inferred(names.len(), node.child_by_field_name("right"));
        self.bind(names, sources);
    }

    fn inferred(&self, count: usize, values: Option<Node<'_>>) -> Vec<BindingSource> {
        let values = values.map(|v| self.expressions(v)).unwrap_or_default();
        if values.len() == count {
            values.into_iter().map(BindingSource::Inferred).collect()
        } else {
            vec![BindingSource::Unknown; count]
        }
    }

    fn lower_call(&self, node: Node<'_>) -> Option<CallExpr> {
        let function = node.child_by_field_name("function")?;
        let mut call = CallExpr::new(self.lower(function), Vec::new());
        let Some(arguments) = node.child_by_field_name("arguments") else {
            return Some(call);
        };
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            match argument.kind() {
                "comment" => {}
                "variadic_argument" => {
                    let mut inner = argument.walk();
                    if let Some(value) = argument
                        .named_children(&mut inner)
                        .find(|n| n.kind() != "comment")
                    {
                        call.args.push(self.lower(value));
                    }
                    call.spread = true;
                }
                _ => call.args.push(self.lower(argument)),
            }
        }
        Some(call)
    }

    fn lower(&self, node: Node<'_>) -> Expr {
        let text = self.text(node).to_owned();
        let kind = match node.kind() {
            "identifier" => ExprKind::Ident(text.clone()),
            "selector_expression" => {
                match (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("field"),
                ) {
                    (Some(operand), Some(field)) => ExprKind::Selector {
                        receiver: Box::new(self.lower(operand)),
                        member: self.text(field).to_owned(),
                    },
                    _ => ExprKind::Other,
                }
            }
            "call_expression" => self
                .lower_call(node)
                .map_or(ExprKind::Other, |call| ExprKind::Call(Box::new(call))),
            "interpreted_string_literal" | "raw_string_literal" => {
                ExprKind::Literal(LiteralKind::String)
            }
            "int_literal" => ExprKind::Literal(LiteralKind::Int),
            "float_literal" => ExprKind::Literal(LiteralKind::Float),
            "imaginary_literal" => ExprKind::Literal(LiteralKind::Imaginary),
            "rune_literal" => ExprKind::Literal(LiteralKind::Char),
            _ => ExprKind::Other,
        };
        Expr {
            kind,
            text,
            position: position(node),
        }
    }
}
