//! Per-language parser packages.
//!
//! A package (`Package::Php`, `Package::Python`) bundles the grammars of one
//! language family. `ParserFactory` loads a package asynchronously and hands
//! out a `ParserHandle` that lists the package's language ids and parses
//! code patterns and files into an arena-backed AST.

pub mod config;
pub mod factory;
pub mod lang;
pub mod parser;
pub mod pattern;
pub mod scan;
pub mod target;

pub use config::ParserConfig;
pub use factory::{ParserFactory, ParserHandle};
pub use lang::{Lang, Package};
pub use parser::tree::Ast;
pub use parser::types::{AstNode, Meta, ParseStats, Pattern, PatternKind, Span, SyntaxError, Target};
