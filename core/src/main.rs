//! langpack binary
//!
//! Usage:
//!   langpack langs   --package P
//!   langpack pattern --package P [--strict] [--lang L] TEXT
//!   langpack target  --package P [--lang L] PATH
//!   langpack scan    --package P [--root DIR]
//!
//! Common flags: --max-bytes N, --timeout-us N. Results are printed as JSON
//! on stdout; logs go to stderr and are filtered by RUST_LOG.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use langpack_core::{Lang, Package, ParserConfig, ParserFactory};

const USAGE: &str = "Usage: langpack langs|pattern|target|scan --package <php|python> [--strict] [--lang L] [--root DIR] [--max-bytes N] [--timeout-us N] [TEXT|PATH]";

#[derive(Debug, PartialEq)]
enum Command {
    Langs,
    Pattern { strict: bool, text: String },
    Target { path: PathBuf },
    Scan { root: PathBuf },
}

#[derive(Debug)]
struct Args {
    package: Package,
    lang: Option<Lang>,
    config: ParserConfig,
    command: Command,
}

fn parse_u64(flag: &str, value: Option<&String>) -> Result<u64> {
    let Some(value) = value else {
        bail!("Missing value after {flag}");
    };
    value
        .parse()
        .with_context(|| format!("Invalid value for {flag}: {value}"))
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    if raw.is_empty() {
        bail!(USAGE);
    }

    let mut package: Option<Package> = None;
    let mut lang: Option<Lang> = None;
    let mut strict = false;
    let mut root: Option<PathBuf> = None;
    let mut config = ParserConfig::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--package" => {
                i += 1;
                let Some(name) = raw.get(i) else {
                    bail!("Missing value after --package");
                };
                package = Some(Package::parse(name)?);
            }
            "--lang" => {
                i += 1;
                let Some(name) = raw.get(i) else {
                    bail!("Missing value after --lang");
                };
                lang = Some(Lang::parse(name)?);
            }
            "--root" => {
                i += 1;
                let Some(dir) = raw.get(i) else {
                    bail!("Missing value after --root");
                };
                root = Some(PathBuf::from(dir));
            }
            "--strict" => strict = true,
            "--max-bytes" => {
                i += 1;
                config = config.with_max_target_bytes(parse_u64("--max-bytes", raw.get(i))?);
            }
            "--timeout-us" => {
                i += 1;
                config = config.with_parse_timeout_micros(parse_u64("--timeout-us", raw.get(i))?);
            }
            "--" => {
                positional.extend(raw[i + 1..].iter().cloned());
                break;
            }
            flag if flag.starts_with("--") => bail!("Unknown flag: {flag}"),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let Some(package) = package else {
        bail!("Missing --package\n{USAGE}");
    };

    let command = match raw[0].as_str() {
        "langs" => Command::Langs,
        "pattern" => {
            if positional.is_empty() {
                bail!("Missing pattern text");
            }
            Command::Pattern {
                strict,
                text: positional.join(" "),
            }
        }
        "target" => {
            let Some(path) = positional.first() else {
                bail!("Missing target path");
            };
            Command::Target {
                path: PathBuf::from(path),
            }
        }
        "scan" => Command::Scan {
            root: root.unwrap_or(std::env::current_dir()?),
        },
        other => bail!("Unknown command: {other}\n{USAGE}"),
    };

    Ok(Args {
        package,
        lang,
        config,
        command,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let handle = ParserFactory::new(args.package)
        .with_config(args.config)
        .load()
        .await?;

    let output = match args.command {
        Command::Langs => serde_json::to_string(&handle.get_langs())?,
        Command::Pattern { strict, text } => {
            let pattern = match args.lang {
                Some(lang) => handle.parse_pattern_as(lang, strict, &text)?,
                None => handle.parse_pattern(strict, &text)?,
            };
            serde_json::to_string(&pattern)?
        }
        Command::Target { path } => {
            let target = match args.lang {
                Some(lang) => handle.parse_target_as(lang, &path)?,
                None => handle.parse_target(&path)?,
            };
            serde_json::to_string(&target)?
        }
        Command::Scan { root } => {
            let targets = handle.parse_dir(&root)?;
            serde_json::to_string(&targets)?
        }
    };
    println!("{output}");
    Ok(())
}
