//! Analyzer for Go source trees.

use logcheck_core::{Engine, LintResult, SourceFile, Violation};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::go::{ExtractError, GoExtractor};
use crate::module::ModuleIndex;
use crate::resolver::GoResolver;

/// Exclude patterns used when none are configured.
pub const DEFAULT_EXCLUDES: [&str; 2] = ["**/vendor/**", "**/testdata/**"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the source tree.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// A Go file could not be extracted.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Extraction error.
        source: ExtractError,
    },
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    engine: Option<Engine>,
    exclude_patterns: Vec<String>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rule engine; defaults to the built-in check defaults.
    #[must_use]
    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Adds an exclude glob pattern, matched against paths relative to the root.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or an
    /// exclude pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(DEFAULT_EXCLUDES.map(String::from));
        }
        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            engine: self.engine.unwrap_or_default(),
            extractor: GoExtractor::new(),
            excludes,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// Runs the rule engine over every Go file below a root directory.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    engine: Engine,
    extractor: GoExtractor,
    excludes: Vec<glob::Pattern>,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rule engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or if a file
    /// does not parse and the analyzer was built to fail on parse errors.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} Go files to analyze", files.len());

        let mut modules = ModuleIndex::new(&self.root);
        let mut result = LintResult::new();

        for path in &files {
            let dir = path.parent().unwrap_or(&self.root);
            let package_path = modules.package_path(dir);
            let rel = path.strip_prefix(&self.root).unwrap_or(path);

            debug!("Analyzing: {}", rel.display());
            let source = std::fs::read_to_string(path)?;
            match self.analyze_source(rel, &package_path, &source) {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, source }) => {
                    warn!("Failed to parse {}: {}", path.display(), source);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, source });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Checks one file's source text.
    ///
    /// `path` is used in violation locations, `package_path` is the import
    /// path of the file's package.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if the source is not valid Go.
    pub fn analyze_source(
        &self,
        path: &Path,
        package_path: &str,
        source: &str,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let go_file = self
            .extractor
            .extract(source)
            .map_err(|source| AnalyzerError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let resolver = GoResolver::new(&go_file);
        let file = SourceFile {
            path: path.to_path_buf(),
            package_path: package_path.to_owned(),
            calls: go_file.calls,
        };
        Ok(self.engine.check_file(&file, &resolver))
    }

    /// Discovers all Go source files to analyze, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder.hidden(false).git_ignore(true);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel = rel.to_string_lossy();

        self.excludes.iter().any(|pattern| {
            if pattern.matches(&rel) {
                return true;
            }
            // `**/vendor/**` also covers a top-level `vendor/`.
            let fragment = pattern.as_str().replace("**/", "").replace("/**", "");
            !fragment.is_empty()
                && !fragment.contains('*')
                && rel.split('/').any(|component| component == fragment)
        })
    }
}
