//! Asynchronous construction of parser handles.
//!
//! Grammar loading is blocking work, so `ParserFactory::load` runs it on
//! tokio's blocking pool and resolves once every grammar of the package is
//! ready. The resulting `ParserHandle` is a cheap, shareable accessor.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::lang::{Lang, Package};
use crate::parser::languages::{load_family, LanguageParser};
use crate::parser::types::{Pattern, Target};
use crate::pattern;
use crate::scan::TargetWalker;
use crate::target;

pub struct ParserFactory {
    package: Package,
    config: ParserConfig,
}

impl ParserFactory {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn load(self) -> anyhow::Result<ParserHandle> {
        let package = self.package;
        let config = self.config;
        let loader_config = config.clone();
        let parser = tokio::task::spawn_blocking(move || load_family(package.family(), &loader_config))
            .await
            .context("grammar loader task failed")??;
        info!(%package, langs = ?package.langs(), "parser package loaded");
        Ok(ParserHandle {
            inner: Arc::new(Inner {
                package,
                config,
                parser,
            }),
        })
    }
}

struct Inner {
    package: Package,
    config: ParserConfig,
    parser: Box<dyn LanguageParser>,
}

#[derive(Clone)]
pub struct ParserHandle {
    inner: Arc<Inner>,
}

impl ParserHandle {
    pub fn package(&self) -> Package {
        self.inner.package
    }

    pub fn langs(&self) -> &'static [Lang] {
        self.inner.package.langs()
    }

    /// Numeric ids of the package's languages, default language first.
    pub fn get_langs(&self) -> Vec<u32> {
        self.langs().iter().map(|lang| lang.id()).collect()
    }

    /// Parse a pattern in the package's default language.
    pub fn parse_pattern(&self, strict: bool, text: &str) -> anyhow::Result<Pattern> {
        self.parse_pattern_as(self.inner.package.default_lang(), strict, text)
    }

    pub fn parse_pattern_as(&self, lang: Lang, strict: bool, text: &str) -> anyhow::Result<Pattern> {
        self.ensure_provides(lang)?;
        pattern::parse_pattern(self.inner.parser.as_ref(), lang, strict, text)
    }

    /// Parse a file, detecting its language from the path and shebang.
    pub fn parse_target(&self, path: impl AsRef<Path>) -> anyhow::Result<Target> {
        let path = path.as_ref();
        let content = target::read_target(path, &self.inner.config)?;
        let Some(lang) = Lang::detect(path, &content) else {
            bail!("cannot determine the language of {}", path.display());
        };
        self.ensure_provides(lang)?;
        target::parse_target(self.inner.parser.as_ref(), lang, path, &content)
    }

    pub fn parse_target_as(&self, lang: Lang, path: impl AsRef<Path>) -> anyhow::Result<Target> {
        let path = path.as_ref();
        self.ensure_provides(lang)?;
        let content = target::read_target(path, &self.inner.config)?;
        target::parse_target(self.inner.parser.as_ref(), lang, path, &content)
    }

    /// Parse every file under `root` the package recognises. Files that
    /// fail to load are logged and skipped.
    pub fn parse_dir(&self, root: impl AsRef<Path>) -> anyhow::Result<Vec<Target>> {
        let root = root.as_ref();
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }
        let files = TargetWalker::new(root, self.inner.package).collect();
        debug!(root = %root.display(), candidates = files.len(), "scanning directory");

        let mut targets = Vec::new();
        for file in files {
            let content = match target::read_target(&file, &self.inner.config) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "skipping target");
                    continue;
                }
            };
            let Some(lang) = Lang::detect(&file, &content).filter(|l| self.inner.package.provides(*l))
            else {
                continue;
            };
            match target::parse_target(self.inner.parser.as_ref(), lang, &file, &content) {
                Ok(t) => targets.push(t),
                Err(e) => warn!(path = %file.display(), error = %e, "skipping target"),
            }
        }
        Ok(targets)
    }

    fn ensure_provides(&self, lang: Lang) -> anyhow::Result<()> {
        let package = self.inner.package;
        if !package.provides(lang) {
            bail!(
                "language {} ({}) is not provided by the {} package",
                lang,
                lang.id(),
                package
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for ParserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserHandle")
            .field("package", &self.inner.package)
            .field("config", &self.inner.config)
            .finish()
    }
}
