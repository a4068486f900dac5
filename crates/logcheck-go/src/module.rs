//! Go module lookup: import paths of the packages under analysis.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A module found through its `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Directory holding `go.mod`.
    pub root: PathBuf,
    /// Module path from the `module` directive.
    pub path: String,
}

/// Reads the `module` directive of a `go.mod` document.
#[must_use]
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_owned())
    })
}

/// Finds the module owning each directory, caching results per directory.
#[derive(Debug)]
pub struct ModuleIndex {
    root: PathBuf,
    cache: HashMap<PathBuf, Option<GoModule>>,
}

impl ModuleIndex {
    /// Creates an index that never looks above `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Nearest module containing `dir`, searching upward to the root.
    pub fn module_for(&mut self, dir: &Path) -> Option<GoModule> {
        if let Some(cached) = self.cache.get(dir) {
            return cached.clone();
        }
        let found = match std::fs::read_to_string(dir.join("go.mod")) {
            Ok(content) => parse_module_path(&content).map(|path| GoModule {
                root: dir.to_path_buf(),
                path,
            }),
            Err(_) => None,
        };
        let module = match found {
            Some(module) => Some(module),
            None if dir == self.root => None,
            None => match dir.parent() {
                Some(parent) if parent.starts_with(&self.root) => self.module_for(parent),
                _ => None,
            },
        };
        self.cache.insert(dir.to_path_buf(), module.clone());
        module
    }

    /// Import path of the package in `dir`.
    ///
    /// Inside a module this is the module path joined with the directory
    /// relative to the module root. Outside of any module it is the
    /// directory relative to the analysis root.
    pub fn package_path(&mut self, dir: &Path) -> String {
        let (base, rel) = match self.module_for(dir) {
            Some(module) => {
                let rel = relative(dir, &module.root);
                (module.path, rel)
            }
            None => (String::new(), relative(dir, &self.root)),
        };
        match (base.is_empty(), rel.is_empty()) {
            (_, true) => base,
            (true, false) => rel,
            (false, false) => format!("{base}/{rel}"),
        }
    }
}

fn relative(dir: &Path, root: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_directive() {
        let go_mod = "// comment\nmodule example.com/demo // trailing\n\ngo 1.22\n";
        assert_eq!(parse_module_path(go_mod).as_deref(), Some("example.com/demo"));
        assert_eq!(parse_module_path("module \"quoted/path\"\n").as_deref(), Some("quoted/path"));
        assert_eq!(parse_module_path("modulex foo\n"), None);
        assert_eq!(parse_module_path("go 1.22\n"), None);
    }

    #[test]
    fn package_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("go.mod"), "module example.com/demo\n").unwrap();
        std::fs::create_dir_all(root.join("pkg/sub")).unwrap();
        std::fs::create_dir_all(root.join("tools/gen")).unwrap();
        std::fs::write(root.join("tools/go.mod"), "module example.com/tools\n").unwrap();

        let mut index = ModuleIndex::new(root);
        assert_eq!(index.package_path(root), "example.com/demo");
        assert_eq!(index.package_path(&root.join("pkg/sub")), "example.com/demo/pkg/sub");
        assert_eq!(index.package_path(&root.join("tools/gen")), "example.com/tools/gen");
    }

    #[test]
    fn without_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("cmd/app")).unwrap();
        let mut index = ModuleIndex::new(dir.path());
        assert_eq!(index.package_path(&dir.path().join("cmd/app")), "cmd/app");
        assert_eq!(index.package_path(dir.path()), "");
    }
}
