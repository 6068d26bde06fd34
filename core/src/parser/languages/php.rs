use std::sync::Mutex;

use tree_sitter::{Parser, Tree};

use crate::config::ParserConfig;
use crate::lang::Family;
use crate::parser::languages::{new_parser, parse_locked, LanguageParser, Wrapping};

const OPEN_TAG: Wrapping = Wrapping {
    prefix: "<?php\n",
    suffix: "",
};
const OPEN_TAG_TERMINATED: Wrapping = Wrapping {
    prefix: "<?php\n",
    suffix: ";",
};

pub struct PhpParser {
    parser: Mutex<Parser>,
}

impl PhpParser {
    pub fn new(config: &ParserConfig) -> anyhow::Result<Self> {
        let parser = new_parser(tree_sitter_php::LANGUAGE_PHP.into(), "PHP", config)?;
        Ok(Self { parser })
    }
}

impl LanguageParser for PhpParser {
    fn family(&self) -> Family {
        Family::Php
    }

    fn parse(&self, source: &str) -> anyhow::Result<Tree> {
        parse_locked(&self.parser, source, "PHP")
    }

    fn wrappings(&self, body: &str) -> Vec<Wrapping> {
        if body.trim_start().starts_with("<?") {
            return vec![Wrapping::NONE];
        }
        let trimmed = body.trim_end();
        if trimmed.ends_with(';') || trimmed.ends_with('}') {
            vec![OPEN_TAG]
        } else {
            // Bare expressions like `foo($X)` need a terminator.
            vec![OPEN_TAG, OPEN_TAG_TERMINATED]
        }
    }

    fn trivia_kinds(&self) -> &'static [&'static str] {
        &["php_tag", "comment", "text_interpolation"]
    }
}
