use std::sync::Mutex;

use tree_sitter::{Parser, Tree};

use crate::config::ParserConfig;
use crate::lang::{Family, Lang};
use crate::parser::languages::{new_parser, parse_locked, LanguageParser, Wrapping};
use crate::parser::tree::Ast;
use crate::parser::types::SyntaxError;

const PY2_ONLY: [&str; 2] = ["print_statement", "exec_statement"];
const PY3_ONLY: [&str; 2] = ["nonlocal_statement", "await"];

pub struct PythonParser {
    parser: Mutex<Parser>,
}

impl PythonParser {
    pub fn new(config: &ParserConfig) -> anyhow::Result<Self> {
        let parser = new_parser(tree_sitter_python::LANGUAGE.into(), "Python", config)?;
        Ok(Self { parser })
    }
}

impl LanguageParser for PythonParser {
    fn family(&self) -> Family {
        Family::Python
    }

    fn parse(&self, source: &str) -> anyhow::Result<Tree> {
        parse_locked(&self.parser, source, "Python")
    }

    fn wrappings(&self, _body: &str) -> Vec<Wrapping> {
        vec![Wrapping::NONE]
    }

    fn trivia_kinds(&self) -> &'static [&'static str] {
        &["comment"]
    }

    fn dialect_errors(&self, lang: Lang, ast: &Ast) -> Vec<SyntaxError> {
        let (rejected, message): (&[&str], &str) = match lang {
            Lang::Python3 => (&PY2_ONLY[..], "Python 2 syntax in Python 3 code"),
            Lang::Python2 => (&PY3_ONLY[..], "Python 3 syntax in Python 2 code"),
            _ => return Vec::new(),
        };
        ast.find_all(|n| rejected.contains(&n.kind.as_str()))
            .into_iter()
            .map(|n| SyntaxError {
                message: format!("{message}: {}", n.kind),
                span: n.span,
            })
            .collect()
    }
}
