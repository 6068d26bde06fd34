use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::bail;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lang — a concrete language or dialect with a stable numeric identifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    Php,
    Python2,
    Python3,
    /// Python without committing to a major version
    Python,
}

/// Grammar family backing a set of languages. One tree-sitter grammar is
/// loaded per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Php,
    Python,
}

static EXTENSIONS: Lazy<HashMap<&'static str, Lang>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for ext in [
        "php", "phtml", "php3", "php4", "php5", "php7", "php8", "phps",
    ] {
        map.insert(ext, Lang::Php);
    }
    for ext in ["py", "pyi", "pyw"] {
        map.insert(ext, Lang::Python);
    }
    map
});

impl Lang {
    pub const ALL: [Lang; 4] = [Lang::Php, Lang::Python2, Lang::Python3, Lang::Python];

    pub fn id(self) -> u32 {
        match self {
            Lang::Php => 21,
            Lang::Python2 => 22,
            Lang::Python3 => 23,
            Lang::Python => 24,
        }
    }

    pub fn from_id(id: u32) -> Option<Lang> {
        Lang::ALL.into_iter().find(|lang| lang.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lang::Php => "php",
            Lang::Python2 => "python2",
            Lang::Python3 => "python3",
            Lang::Python => "python",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Lang::Php => Family::Php,
            Lang::Python2 | Lang::Python3 | Lang::Python => Family::Python,
        }
    }

    /// Accepts canonical names, common aliases and numeric ids.
    pub fn parse(name: &str) -> anyhow::Result<Lang> {
        let lower = name.trim().to_ascii_lowercase();
        if let Ok(id) = lower.parse::<u32>() {
            return match Lang::from_id(id) {
                Some(lang) => Ok(lang),
                None => bail!("unknown language id: {id}"),
            };
        }
        match lower.as_str() {
            "php" => Ok(Lang::Php),
            "python" | "py" => Ok(Lang::Python),
            "python2" | "py2" => Ok(Lang::Python2),
            "python3" | "py3" => Ok(Lang::Python3),
            other => bail!("unknown language: {other}"),
        }
    }

    /// Language implied by a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Lang> {
        EXTENSIONS.get(ext.to_ascii_lowercase().as_str()).copied()
    }

    /// Detect the language of a target from its path and, for Python, the
    /// shebang on the first line.
    pub fn detect(path: &Path, content: &str) -> Option<Lang> {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Lang::from_extension);

        let shebang = shebang_lang(content);
        match (by_ext, shebang) {
            (Some(Lang::Python), Some(dialect)) => Some(dialect),
            (Some(lang), _) => Some(lang),
            (None, dialect) => dialect,
        }
    }
}

fn shebang_lang(content: &str) -> Option<Lang> {
    let first = content.lines().next()?;
    let interpreter = first.strip_prefix("#!")?;
    if interpreter.contains("python2") {
        Some(Lang::Python2)
    } else if interpreter.contains("python3") {
        Some(Lang::Python3)
    } else if interpreter.contains("python") {
        Some(Lang::Python)
    } else {
        None
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Package — the bundle of languages one parser handle serves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Package {
    Php,
    Python,
}

impl Package {
    /// Languages in the order reported by `get_langs`. The first entry is
    /// the default language for pattern parsing.
    pub fn langs(self) -> &'static [Lang] {
        match self {
            Package::Php => &[Lang::Php],
            Package::Python => &[Lang::Python, Lang::Python2, Lang::Python3],
        }
    }

    pub fn family(self) -> Family {
        match self {
            Package::Php => Family::Php,
            Package::Python => Family::Python,
        }
    }

    pub fn default_lang(self) -> Lang {
        self.langs()[0]
    }

    pub fn provides(self, lang: Lang) -> bool {
        self.langs().contains(&lang)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Package::Php => "php",
            Package::Python => "python",
        }
    }

    pub fn parse(name: &str) -> anyhow::Result<Package> {
        match name.trim().to_ascii_lowercase().as_str() {
            "php" => Ok(Package::Php),
            "python" | "py" => Ok(Package::Python),
            other => bail!("unknown package: {other}"),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
