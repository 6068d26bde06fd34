use indextree::NodeId;
use tree_sitter::{Node, Tree, TreeCursor};

use crate::lang::Family;
use crate::parser::rewrite::{is_php_metavar, ELLIPSIS_MVAR_PREFIX, MVAR_PREFIX, PHP_ELLIPSIS};
use crate::parser::source_map::{LineIndex, SourceMap};
use crate::parser::tree::Ast;
use crate::parser::types::{AstNode, Meta, Span, SyntaxError};

const ERROR_SNIPPET_CHARS: usize = 40;

const PHP_STRING_KINDS: [&str; 3] = ["encapsed_string", "heredoc", "shell_command_expression"];

/// Whether pattern-only syntax should be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pattern,
    Target,
}

pub struct Converted {
    pub ast: Ast,
    pub errors: Vec<SyntaxError>,
}

struct Converter<'a> {
    family: Family,
    mode: Mode,
    /// Text handed to tree-sitter.
    parsed: &'a str,
    /// Text the caller handed in.
    original: &'a str,
    map: &'a SourceMap,
    lines: LineIndex,
    ast: Ast,
    errors: Vec<SyntaxError>,
}

pub fn convert(
    tree: &Tree,
    family: Family,
    mode: Mode,
    parsed: &str,
    original: &str,
    map: &SourceMap,
) -> Converted {
    let mut converter = Converter {
        family,
        mode,
        parsed,
        original,
        map,
        lines: LineIndex::new(original),
        ast: Ast::new(),
        errors: Vec::new(),
    };
    let mut cursor = tree.walk();
    converter.visit(&mut cursor, None, false);
    Converted {
        ast: converter.ast,
        errors: converter.errors,
    }
}

fn inside_string(node: &Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if PHP_STRING_KINDS.contains(&parent.kind()) {
            return true;
        }
        current = parent.parent();
    }
    false
}

impl<'a> Converter<'a> {
    fn span(&self, node: &Node) -> Span {
        let start = self.map.to_original(node.start_byte());
        let end = self.map.to_original(node.end_byte()).max(start);
        self.lines.span(start, end)
    }

    fn original_text(&self, span: &Span) -> String {
        self.original
            .get(span.start_byte..span.end_byte)
            .unwrap_or_default()
            .to_string()
    }

    fn parsed_text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.parsed.as_bytes()).unwrap_or("")
    }

    fn meta(&self, node: &Node) -> Option<Meta> {
        if self.mode != Mode::Pattern {
            return None;
        }
        let text = self.parsed_text(node);
        match (self.family, node.kind()) {
            (Family::Python, "identifier") => {
                if let Some(name) = text.strip_prefix(ELLIPSIS_MVAR_PREFIX) {
                    Some(Meta::EllipsisMetavariable {
                        name: format!("$...{name}"),
                    })
                } else {
                    text.strip_prefix(MVAR_PREFIX).map(|name| Meta::Metavariable {
                        name: format!("${name}"),
                    })
                }
            }
            (Family::Python, "ellipsis") => Some(Meta::Ellipsis),
            // Interpolations are string content, not metavariables.
            (Family::Php, "variable_name") if inside_string(node) => None,
            (Family::Php, "variable_name") => {
                if let Some(name) = text.strip_prefix('$').and_then(|t| t.strip_prefix(ELLIPSIS_MVAR_PREFIX)) {
                    Some(Meta::EllipsisMetavariable {
                        name: format!("$...{name}"),
                    })
                } else if is_php_metavar(text) {
                    Some(Meta::Metavariable {
                        name: text.to_string(),
                    })
                } else {
                    None
                }
            }
            (Family::Php, "name") if text == PHP_ELLIPSIS => Some(Meta::Ellipsis),
            _ => None,
        }
    }

    fn record_error(&mut self, node: &Node, span: Span) {
        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            let snippet: String = self
                .original_text(&span)
                .chars()
                .take(ERROR_SNIPPET_CHARS)
                .collect();
            if snippet.trim().is_empty() {
                "unexpected input".to_string()
            } else {
                format!("unexpected `{}`", snippet.trim())
            }
        };
        self.errors.push(SyntaxError { message, span });
    }

    fn visit(&mut self, cursor: &mut TreeCursor, parent: Option<NodeId>, in_error: bool) {
        let node = cursor.node();
        let is_error = node.is_error() || node.is_missing();

        // Punctuation and keywords carry no information beyond the parent kind.
        if !node.is_named() && !is_error {
            return;
        }

        let span = self.span(&node);
        if is_error && !in_error {
            self.record_error(&node, span);
        }

        let mut data = AstNode::new(node.kind(), span).with_field(cursor.field_name());
        if !node.is_named() {
            data = data.anonymous();
        }
        if is_error {
            data = data.errored();
        }

        let meta = self.meta(&node);
        let is_leaf = meta.is_some() || node.child_count() == 0;
        if is_leaf {
            data = data.with_text(self.original_text(&span));
        }
        if let Some(meta) = meta {
            data = data.with_meta(meta);
        }

        let node_id = self.ast.add_node(parent, data);
        if is_leaf {
            return;
        }

        if cursor.goto_first_child() {
            loop {
                self.visit(cursor, Some(node_id), in_error || is_error);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
    }
}
