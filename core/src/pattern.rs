//! Parsing of standalone code patterns.
//!
//! A pattern is tried in several shapes (as written, dedented, and within
//! each wrapping the grammar offers). The first shape without syntax errors
//! wins; otherwise strict mode fails and lenient mode keeps the shape with
//! the fewest errors.

use anyhow::{bail, Context};
use tracing::debug;

use crate::lang::Lang;
use crate::parser::convert::{convert, Converted, Mode};
use crate::parser::languages::LanguageParser;
use crate::parser::rewrite::{dedent, rewrite};
use crate::parser::source_map::{Edit, SourceMap};
use crate::parser::tree::Ast;
use crate::parser::types::{Meta, Pattern, PatternKind};

pub fn parse_pattern(
    parser: &dyn LanguageParser,
    lang: Lang,
    strict: bool,
    text: &str,
) -> anyhow::Result<Pattern> {
    if text.trim().is_empty() {
        bail!("empty {lang} pattern");
    }
    let family = parser.family();

    let mut variants: Vec<(String, Vec<Edit>)> = vec![(text.to_string(), Vec::new())];
    if let Some(dedented) = dedent(text) {
        variants.push((dedented.text, dedented.edits));
    }

    let mut best: Option<Converted> = None;
    for (base, dedent_edits) in &variants {
        let rewritten = rewrite(base, family);
        for wrapping in parser.wrappings(&rewritten.text) {
            let source = wrapping.apply(&rewritten.text);
            let mut map = SourceMap::identity(text.len()).with_prefix(wrapping.prefix.len());
            map.push_layer(dedent_edits.clone());
            map.push_layer(rewritten.edits.clone());

            let tree = parser.parse(&source)?;
            let mut converted = convert(&tree, family, Mode::Pattern, &source, text, &map);
            let dialect = parser.dialect_errors(lang, &converted.ast);
            converted.errors.extend(dialect);

            debug!(
                %lang,
                prefix = wrapping.prefix,
                suffix = wrapping.suffix,
                errors = converted.errors.len(),
                "pattern candidate"
            );

            if converted.errors.is_empty() {
                return finish(parser, lang, strict, converted);
            }
            if best
                .as_ref()
                .map_or(true, |b| converted.errors.len() < b.errors.len())
            {
                best = Some(converted);
            }
        }
    }

    let best = best.context("no pattern candidate was parsed")?;
    if strict {
        let first = &best.errors[0];
        bail!(
            "invalid {lang} pattern at {}:{}: {}",
            first.span.start_line,
            first.span.start_col,
            first.message
        );
    }
    finish(parser, lang, strict, best)
}

fn finish(
    parser: &dyn LanguageParser,
    lang: Lang,
    strict: bool,
    converted: Converted,
) -> anyhow::Result<Pattern> {
    let Converted { ast, errors } = converted;
    let statements = parser.statements(&ast);

    let usable = statements
        .iter()
        .filter(|id| ast.get_node(**id).is_some_and(|n| !n.error))
        .count();
    if usable == 0 {
        bail!("{lang} pattern contains no parsable code");
    }

    let (kind, ast) = match statements.as_slice() {
        [only] => {
            let children = ast.get_children(*only);
            let is_expr_stmt = ast
                .get_node(*only)
                .is_some_and(|n| n.kind == "expression_statement");
            match children.as_slice() {
                [expr] if is_expr_stmt => (PatternKind::Expr, ast.subtree(*expr)),
                _ => (PatternKind::Stmt, ast.subtree(*only)),
            }
        }
        _ => (PatternKind::Stmts, ast),
    };

    Ok(Pattern {
        lang,
        kind,
        strict,
        metavariables: metavariables(&ast),
        ast,
        errors,
    })
}

/// Distinct metavariable names in order of appearance.
fn metavariables(ast: &Ast) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for node in ast.nodes() {
        let name = match &node.meta {
            Some(Meta::Metavariable { name }) | Some(Meta::EllipsisMetavariable { name }) => name,
            _ => continue,
        };
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}
