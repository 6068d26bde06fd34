use serde::{Deserialize, Serialize};

use crate::lang::Lang;
use crate::parser::tree::Ast;

/// Location of a node in the text the caller handed in. Lines are 1-based,
/// columns are 0-based byte offsets within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "startByte")]
    pub start_byte: usize,
    #[serde(rename = "endByte")]
    pub end_byte: usize,
    #[serde(rename = "startLine")]
    pub start_line: u32,
    #[serde(rename = "startCol")]
    pub start_col: u32,
    #[serde(rename = "endLine")]
    pub end_line: u32,
    #[serde(rename = "endCol")]
    pub end_col: u32,
}

/// Pattern-only syntax recognised while building the AST of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Meta {
    /// `$X`
    Metavariable { name: String },
    /// `$...XS`
    EllipsisMetavariable { name: String },
    /// `...`
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    /// Grammar node kind, e.g. `call` or `echo_statement`.
    pub kind: String,
    pub named: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub span: Span,
    /// Source text, kept for leaves and meta nodes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl AstNode {
    pub fn new(kind: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            named: true,
            field: None,
            span,
            text: None,
            meta: None,
            error: false,
        }
    }

    pub fn with_field(mut self, field: Option<&str>) -> Self {
        self.field = field.map(str::to_string);
        self
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.named = false;
        self
    }

    pub fn errored(mut self) -> Self {
        self.error = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseStats {
    #[serde(rename = "totalLines")]
    pub total_lines: u32,
    #[serde(rename = "errorLines")]
    pub error_lines: u32,
}

impl ParseStats {
    pub fn from_errors(total_lines: u32, errors: &[SyntaxError]) -> Self {
        let mut lines: Vec<u32> = errors
            .iter()
            .flat_map(|e| e.span.start_line..=e.span.end_line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        Self {
            total_lines,
            error_lines: lines.len() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Expr,
    Stmt,
    Stmts,
}

/// A parsed code pattern.
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pub lang: Lang,
    pub kind: PatternKind,
    pub strict: bool,
    pub ast: Ast,
    pub metavariables: Vec<String>,
    pub errors: Vec<SyntaxError>,
}

/// A parsed file.
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub lang: Lang,
    pub path: String,
    pub ast: Ast,
    pub errors: Vec<SyntaxError>,
    pub stats: ParseStats,
}
