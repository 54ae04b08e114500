//! Python declaration parser using Tree-sitter.

use std::path::Path;

use proboscis_core::utils::CommentMap;
use proboscis_core::{
    ClassInfo, Declaration, Decorator, Module, ModuleParser, ParseError, Suppression,
};
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::exports::ExportState;

/// Extracts functions, methods, classes, `__all__` and `noqa` comments from
/// Python source.
pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    /// Creates a new Python parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::new(1, format!("failed to load Python grammar: {e}")))?;
        parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new(1, "parser produced no syntax tree"))
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleParser for PythonParser {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &str) -> Result<Module, ParseError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root));
        }

        let src = source.as_bytes();
        let mut walker = Walker {
            src,
            module: Module::new(path),
            comments: collect_comments(root, src),
            exports: ExportState::default(),
        };
        walker.visit_module(root);

        let Walker {
            mut module,
            comments,
            exports,
            ..
        } = walker;
        module.exported_names = exports.into_names();
        module.file_suppression = comments.file_suppression();
        debug!(
            "Parsed {}: {} declarations, {} classes",
            path.display(),
            module.declarations.len(),
            module.classes.len()
        );
        Ok(module)
    }
}

pub(crate) fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

fn line_of(node: &Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Visits every node of the tree in document order.
fn for_each_node<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    loop {
        if !visit(cursor.node()) {
            return;
        }
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

fn first_error(root: Node<'_>) -> ParseError {
    let mut found = None;
    for_each_node(root, |node| {
        if node.is_error() {
            found = Some(ParseError::new(line_of(&node), "invalid syntax"));
        } else if node.is_missing() {
            found = Some(ParseError::new(
                line_of(&node),
                format!("missing '{}'", node.kind()),
            ));
        }
        found.is_none()
    });
    found.unwrap_or_else(|| ParseError::new(line_of(&root), "invalid syntax"))
}

fn collect_comments(root: Node<'_>, src: &[u8]) -> CommentMap {
    let mut map = CommentMap::new();
    for_each_node(root, |node| {
        if node.kind() == "comment" {
            let line_start = src[..node.start_byte()]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |i| i + 1);
            let standalone = src[line_start..node.start_byte()]
                .iter()
                .all(u8::is_ascii_whitespace);
            map.insert(line_of(&node), text(&node, src), standalone);
        }
        true
    });

    // A leading module docstring does not end the file header.
    let mut cursor = root.walk();
    if let Some(first) = root
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .enumerate()
        .find(|(i, n)| !(*i == 0 && is_docstring(n)))
        .map(|(_, n)| n)
    {
        map.set_first_code_line(line_of(&first));
    }
    map
}

fn is_docstring(statement: &Node<'_>) -> bool {
    let mut cursor = statement.walk();
    let mut children = statement.named_children(&mut cursor);
    statement.kind() == "expression_statement"
        && children.next().is_some_and(|n| n.kind() == "string")
        && children.next().is_none()
}

#[derive(Clone, Copy)]
enum Scope<'a> {
    Module,
    Class(&'a str),
}

struct Walker<'s> {
    src: &'s [u8],
    module: Module,
    comments: CommentMap,
    exports: ExportState,
}

impl Walker<'_> {
    fn visit_module(&mut self, root: Node<'_>) {
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if node.kind() == "expression_statement" {
                self.exports.observe(&node, self.src);
            }
        }
        self.visit_block(root, Scope::Module);
    }

    /// Visits the statements of a module, class body or compound-statement
    /// block.
    fn visit_block(&mut self, block: Node<'_>, scope: Scope<'_>) {
        let mut cursor = block.walk();
        for node in block.named_children(&mut cursor) {
            self.visit_statement(node, scope);
        }
    }

    fn visit_statement(&mut self, node: Node<'_>, scope: Scope<'_>) {
        match node.kind() {
            "function_definition" => self.visit_function(node, &[], scope),
            "class_definition" => self.visit_class(node, scope),
            "decorated_definition" => {
                let decorators = self.decorators(node);
                match node.child_by_field_name("definition") {
                    Some(def) if def.kind() == "function_definition" => {
                        self.visit_function(def, &decorators, scope);
                    }
                    Some(def) if def.kind() == "class_definition" => {
                        self.visit_class(def, scope);
                    }
                    _ => {}
                }
            }
            // Definitions under `if TYPE_CHECKING:`, `try:` and friends still
            // belong to the enclosing scope.
            "if_statement" | "try_statement" | "with_statement" | "for_statement"
            | "while_statement" => self.visit_compound(node, scope),
            _ => {}
        }
    }

    fn visit_compound(&mut self, node: Node<'_>, scope: Scope<'_>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "block" {
                self.visit_block(child, scope);
            } else if child.kind().ends_with("_clause") {
                self.visit_compound(child, scope);
            }
        }
    }

    fn decorators(&self, decorated: Node<'_>) -> Vec<Decorator> {
        let mut cursor = decorated.walk();
        decorated
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "decorator")
            .map(|n| Decorator::new(line_of(&n), text(&n, self.src).trim()))
            .collect()
    }

    fn visit_function(&mut self, def: Node<'_>, decorators: &[Decorator], scope: Scope<'_>) {
        let Some(name) = def.child_by_field_name("name").map(|n| text(&n, self.src)) else {
            return;
        };
        let line = line_of(&def);
        let mut decl = match scope {
            Scope::Module => Declaration::function(name, line),
            Scope::Class(class) => Declaration::method(class, name, line),
        };

        if decorators
            .iter()
            .any(|d| d.property_accessor_of() == Some(name))
            && self
                .module
                .declarations
                .iter()
                .any(|existing| {
                    existing.qualified_name == decl.qualified_name && existing.is_property()
                })
        {
            debug!("Folding property accessor {} into its getter", decl.qualified_name);
            return;
        }

        decl.column = def.start_position().column + 1;
        decl.decorators = decorators.to_vec();
        decl.suppressions = self.header_suppression(def, decl.stack_start_line());
        self.module.declarations.push(decl);
    }

    /// `noqa` comments between the decorator stack and the `:` ending the
    /// header, plus a comment-only line directly above.
    fn header_suppression(&self, def: Node<'_>, stack_start: usize) -> Suppression {
        let header_start = line_of(&def);
        let mut cursor = def.walk();
        let header_end = def
            .children(&mut cursor)
            .find(|c| c.kind() == ":")
            .map_or(header_start, |colon| line_of(&colon));
        self.comments
            .declaration_suppression(stack_start, header_start, header_end)
    }

    fn visit_class(&mut self, def: Node<'_>, scope: Scope<'_>) {
        let Some(name) = def.child_by_field_name("name").map(|n| text(&n, self.src)) else {
            return;
        };
        let line = line_of(&def);
        let class = match scope {
            Scope::Module => ClassInfo::new(name, line),
            Scope::Class(parent) => ClassInfo::nested(parent, name, line),
        }
        .protocol(self.is_protocol(def));

        let qualified = class.qualified_name.clone();
        self.module.classes.insert(qualified.clone(), class);
        if let Some(body) = def.child_by_field_name("body") {
            self.visit_block(body, Scope::Class(&qualified));
        }
    }

    fn is_protocol(&self, def: Node<'_>) -> bool {
        let Some(bases) = def.child_by_field_name("superclasses") else {
            return false;
        };
        let mut cursor = bases.walk();
        let found = bases
            .named_children(&mut cursor)
            .filter(|base| base.kind() != "keyword_argument")
            .any(|base| {
                let base = text(&base, self.src);
                let base = base.split('[').next().unwrap_or(base).trim();
                base.rsplit('.').next() == Some("Protocol")
            });
        found
    }
}
