pub mod php;
pub mod python;

use std::sync::Mutex;

use anyhow::{anyhow, Context};
use indextree::NodeId;
use tree_sitter::{Language, Parser, Tree};

use crate::config::ParserConfig;
use crate::lang::{Family, Lang};
use crate::parser::tree::Ast;
use crate::parser::types::SyntaxError;

/// Text placed around a pattern body so the grammar sees a whole program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapping {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl Wrapping {
    pub const NONE: Wrapping = Wrapping {
        prefix: "",
        suffix: "",
    };

    pub fn apply(&self, body: &str) -> String {
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

pub trait LanguageParser: Send + Sync {
    fn family(&self) -> Family;

    fn parse(&self, source: &str) -> anyhow::Result<Tree>;

    /// Candidate wrappings for a pattern body, most specific last.
    fn wrappings(&self, body: &str) -> Vec<Wrapping>;

    /// Root children that are not code, e.g. comments or the `<?php` tag.
    fn trivia_kinds(&self) -> &'static [&'static str];

    /// Extra errors for syntax the shared grammar accepts but `lang` does not.
    fn dialect_errors(&self, _lang: Lang, _ast: &Ast) -> Vec<SyntaxError> {
        Vec::new()
    }

    /// Top-level statements of a parsed program.
    fn statements(&self, ast: &Ast) -> Vec<NodeId> {
        let Some(root) = ast.root() else {
            return Vec::new();
        };
        let trivia = self.trivia_kinds();
        ast.get_children(root)
            .into_iter()
            .filter(|id| {
                ast.get_node(*id)
                    .is_some_and(|n| !trivia.contains(&n.kind.as_str()))
            })
            .collect()
    }
}

/// Build a tree-sitter parser for `language` with the configured budget.
pub(crate) fn new_parser(
    language: Language,
    name: &str,
    config: &ParserConfig,
) -> anyhow::Result<Mutex<Parser>> {
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .with_context(|| format!("failed to load {name} grammar"))?;
    if config.parse_timeout_micros > 0 {
        parser.set_timeout_micros(config.parse_timeout_micros);
    }
    Ok(Mutex::new(parser))
}

pub(crate) fn parse_locked(parser: &Mutex<Parser>, source: &str, name: &str) -> anyhow::Result<Tree> {
    let mut guard = parser
        .lock()
        .map_err(|_| anyhow!("{name} parser lock poisoned"))?;
    match guard.parse(source, None) {
        Some(tree) => Ok(tree),
        None => {
            // A timed-out parse leaves state behind for resumption.
            guard.reset();
            Err(anyhow!("{name} parse timed out or was cancelled"))
        }
    }
}

/// Load the parser backing a grammar family.
pub fn load_family(family: Family, config: &ParserConfig) -> anyhow::Result<Box<dyn LanguageParser>> {
    Ok(match family {
        Family::Php => Box::new(php::PhpParser::new(config)?),
        Family::Python => Box::new(python::PythonParser::new(config)?),
    })
}
