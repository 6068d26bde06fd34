use std::path::Path;

use anyhow::{bail, Context};
use tracing::debug;

use crate::config::ParserConfig;
use crate::lang::Lang;
use crate::parser::convert::{convert, Mode};
use crate::parser::languages::LanguageParser;
use crate::parser::source_map::SourceMap;
use crate::parser::types::{ParseStats, Target};

/// Read a target from disk, enforcing the configured size limit. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn read_target(path: &Path, config: &ParserConfig) -> anyhow::Result<String> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("cannot access {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    if metadata.len() > config.max_target_bytes {
        bail!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            metadata.len(),
            config.max_target_bytes
        );
    }
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse already-loaded file content. Syntax errors are recorded, never
/// fatal.
pub fn parse_target(
    parser: &dyn LanguageParser,
    lang: Lang,
    path: &Path,
    content: &str,
) -> anyhow::Result<Target> {
    let tree = parser
        .parse(content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let map = SourceMap::identity(content.len());
    let mut converted = convert(&tree, parser.family(), Mode::Target, content, content, &map);
    let dialect = parser.dialect_errors(lang, &converted.ast);
    converted.errors.extend(dialect);

    let total_lines = content.lines().count() as u32;
    let stats = ParseStats::from_errors(total_lines, &converted.errors);
    debug!(
        path = %path.display(),
        %lang,
        nodes = converted.ast.len(),
        errors = converted.errors.len(),
        "parsed target"
    );

    Ok(Target {
        lang,
        path: path.to_string_lossy().to_string(),
        ast: converted.ast,
        errors: converted.errors,
        stats,
    })
}
