//! Host settings: global defaults, environment overrides and the settings file.
//!
//! Every source configures the same two things, the global default of each
//! check and the path of the override document. Later sources win:
//! built-in defaults, then [`Settings`], then environment variables, then
//! whatever the caller sets last (command-line flags).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::check::{Check, CheckSet, GlobalDefaults};
use crate::engine::Engine;
use crate::filter::{FilterError, OverrideFilter};

/// Environment variable naming the override document.
pub const CONFIG_ENV_VAR: &str = "LOGCHECK_CONFIG";

/// Settings as written in `logcheck.toml`.
///
/// ```toml
/// config = "hack/logcheck.conf"
///
/// [check]
/// structured = false
/// contextual = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Global default per check name.
    #[serde(default)]
    pub check: BTreeMap<String, bool>,

    /// Path of the override document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has unknown fields.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Collects the global defaults and the override path, then builds an [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    defaults: GlobalDefaults,
    override_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Starts from the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the named check on or off globally.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCheck`] if no check has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let check: Check = name
            .parse()
            .map_err(|_| ConfigError::UnknownCheck(name.to_string()))?;
        self.defaults.set(check, enabled);
        Ok(())
    }

    /// Sets the override document path; `None` removes it.
    pub fn set_override_path(&mut self, path: Option<PathBuf>) {
        self.override_path = path.filter(|p| !p.as_os_str().is_empty());
    }

    /// Applies a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown check names.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        for (name, enabled) in &settings.check {
            self.set_enabled(name, *enabled)?;
        }
        if settings.config.is_some() {
            self.set_override_path(settings.config.clone());
        }
        Ok(())
    }

    /// Applies `LOGCHECK_<CHECK>` and `LOGCHECK_CONFIG` from `lookup`.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a check variable is not a boolean.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for check in Check::ALL {
            let name = check.env_var();
            if let Some(value) = lookup(&name) {
                let enabled = parse_bool(&value).ok_or(ConfigError::Env { name, value })?;
                self.defaults.set(check, enabled);
            }
        }
        if let Some(path) = lookup(CONFIG_ENV_VAR) {
            self.set_override_path(Some(PathBuf::from(path)));
        }
        Ok(())
    }

    /// Global defaults collected so far.
    #[must_use]
    pub fn defaults(&self) -> GlobalDefaults {
        self.defaults
    }

    /// Override document path, if any.
    #[must_use]
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// Loads the override document and creates the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the override document cannot be read or is
    /// malformed. No engine is created in that case.
    pub fn build(self) -> Result<Engine, ConfigError> {
        let filter = match &self.override_path {
            Some(path) => OverrideFilter::from_file(path, CheckSet::all())?,
            None => OverrideFilter::default(),
        };
        Ok(Engine::new(self.defaults, filter))
    }
}

/// Parses a boolean the way `LOGCHECK_*` variables have always been read:
/// `1`, `t`, `T`, `TRUE`, `true`, `True` and their `0`/`f`/`false` counterparts.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the settings file.
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in the settings.
    #[error("Failed to parse settings: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A check name that does not exist.
    #[error("{0:?} is not a supported check")]
    UnknownCheck(String),

    /// An environment variable with a non-boolean value.
    #[error("{name}={value:?}: invalid boolean")]
    Env {
        /// Variable name.
        name: String,
        /// Value found.
        value: String,
    },

    /// The override document could not be loaded.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn parses_settings_file() {
        let settings = Settings::parse(
            r#"
config = "hack/logcheck.conf"

[check]
structured = false
contextual = true
"#,
        )
        .unwrap();
        assert_eq!(settings.config, Some(PathBuf::from("hack/logcheck.conf")));
        assert_eq!(settings.check.get("structured"), Some(&false));

        let mut config = EngineConfig::new();
        config.apply_settings(&settings).unwrap();
        assert!(!config.defaults().is_enabled(Check::Structured));
        assert!(config.defaults().is_enabled(Check::Contextual));
        assert!(config.defaults().is_enabled(Check::Parameters));
        assert_eq!(config.override_path(), Some(Path::new("hack/logcheck.conf")));
    }

    #[test]
    fn unknown_settings_fields_are_rejected() {
        let err = Settings::parse("colour = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Settings::parse("extra = 1\n[check]\n").unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn check_table_with_kebab_case_names() {
        let settings =
            Settings::parse("[check]\nwith-helpers = true\nparameters = false\nkey = true\n").unwrap();
        let mut config = EngineConfig::new();
        config.apply_settings(&settings).unwrap();
        assert!(config.defaults().is_enabled(Check::WithHelpers));
        assert!(!config.defaults().is_enabled(Check::Parameters));
        assert!(config.defaults().is_enabled(Check::Key));
        assert_eq!(config.override_path(), None);
    }

    #[test]
    fn unknown_check_name() {
        let mut config = EngineConfig::new();
        let err = config.set_enabled("value", false).unwrap_err();
        assert_eq!(err.to_string(), "\"value\" is not a supported check");
    }

    #[test]
    fn environment_overrides_settings() {
        let mut config = EngineConfig::new();
        config.set_enabled("structured", true).unwrap();
        config
            .apply_env(env(&[
                ("LOGCHECK_STRUCTURED", "F"),
                ("LOGCHECK_VERBOSITY_ZERO", "1"),
                ("LOGCHECK_CONFIG", "overrides.txt"),
            ]))
            .unwrap();
        assert!(!config.defaults().is_enabled(Check::Structured));
        assert!(config.defaults().is_enabled(Check::VerbosityZero));
        assert_eq!(config.override_path(), Some(Path::new("overrides.txt")));
    }

    #[test]
    fn invalid_environment_boolean() {
        let mut config = EngineConfig::new();
        let err = config
            .apply_env(env(&[("LOGCHECK_PARAMETERS", "yes")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "LOGCHECK_PARAMETERS=\"yes\": invalid boolean");
    }

    #[test]
    fn go_boolean_syntax() {
        for value in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        for value in ["", "yes", "tRUE", " true"] {
            assert_eq!(parse_bool(value), None, "{value:?}");
        }
    }

    #[test]
    fn build_reads_override_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logcheck.conf");
        std::fs::write(&path, "-structured .*/generated/.*\n").unwrap();

        let mut config = EngineConfig::new();
        config.set_override_path(Some(path));
        let engine = config.build().unwrap();
        assert!(!engine.is_enabled(Check::Structured, "example.com/m/generated/a.go"));
        assert!(engine.is_enabled(Check::Structured, "example.com/m/pkg/a.go"));
    }

    #[test]
    fn build_fails_on_malformed_override_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logcheck.conf");
        std::fs::write(&path, "structured\n").unwrap();

        let mut config = EngineConfig::new();
        config.set_override_path(Some(path.clone()));
        let err = config.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "{}:0: not of the format <checks> <regexp>: structured",
                path.display()
            )
        );
    }

    #[test]
    fn empty_override_path_means_none() {
        let mut config = EngineConfig::new();
        config.set_override_path(Some(PathBuf::new()));
        assert_eq!(config.override_path(), None);
        assert!(config.build().unwrap().filter().is_empty());
    }
}
