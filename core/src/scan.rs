use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use log::warn;

use crate::lang::{Lang, Package};

/// setuptools metadata directories are named `<project>.egg-info`.
const EGG_INFO_SUFFIX: &str = ".egg-info";

/// Collects the files under a root that a package may be able to parse.
pub struct TargetWalker<'a> {
    root_path: &'a Path,
    package: Package,
    ignore_patterns: Vec<&'static str>,
}

impl<'a> TargetWalker<'a> {
    pub fn new(root_path: &'a Path, package: Package) -> Self {
        Self {
            root_path,
            package,
            ignore_patterns: vec![
                ".git",
                "target",
                "node_modules",
                "vendor",
                "__pycache__",
                ".venv",
                "venv",
                ".pytest_cache",
                ".mypy_cache",
                ".tox",
                "dist",
                "build",
            ],
        }
    }

    /// Files with an extension of the package, plus extension-less files
    /// that may carry a shebang. Sorted for stable output.
    pub fn collect(&self) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(self.root_path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() || self.is_ignored(path) {
                continue;
            }

            let wanted = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) => Lang::from_extension(ext).is_some_and(|l| self.package.provides(l)),
                None => true,
            };
            if wanted {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(self.root_path).unwrap_or(path);
        relative.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            name.ends_with(EGG_INFO_SUFFIX)
                || self.ignore_patterns.iter().any(|pattern| name == *pattern)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_list_matches_whole_names() {
        let root = Path::new("/repo");
        let walker = TargetWalker::new(root, Package::Python);
        assert!(walker.is_ignored(Path::new("/repo/.git/config")));
        assert!(walker.is_ignored(Path::new("/repo/foo.egg-info/PKG-INFO")));
        assert!(walker.is_ignored(Path::new("/repo/src/__pycache__/m.py")));
        assert!(!walker.is_ignored(Path::new("/repo/repo.git/mod.py")));
        assert!(!walker.is_ignored(Path::new("/repo/my.venv/app.py")));
        assert!(!walker.is_ignored(Path::new("/repo/builder.py")));
    }
}
