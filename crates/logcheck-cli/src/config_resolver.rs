//! Settings file lookup.
//!
//! The first of these wins:
//!
//! 1. `--settings` flag
//! 2. `{project}/logcheck.toml`, then `{project}/.logcheck.toml`
//! 3. `$LOGCHECK_CONFIG_DIR/config.toml`, or `~/.logcheck/config.toml`
//! 4. nothing: built-in defaults

use std::path::{Path, PathBuf};

/// Where the settings file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// Given with `--settings`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the user's global directory.
    Global(PathBuf),
    /// No settings file.
    Default,
}

impl SettingsSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

const PROJECT_SETTINGS_NAMES: &[&str] = &["logcheck.toml", ".logcheck.toml"];

const GLOBAL_SETTINGS_NAME: &str = "config.toml";

/// Resolves the settings file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> SettingsSource {
    resolve_in(project_dir, explicit, global_settings_dir())
}

fn resolve_in(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> SettingsSource {
    if let Some(p) = explicit {
        return SettingsSource::Explicit(p.to_path_buf());
    }

    let project = PROJECT_SETTINGS_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file());
    if let Some(candidate) = project {
        tracing::debug!("Found project settings: {}", candidate.display());
        return SettingsSource::Project(candidate);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_SETTINGS_NAME)) {
        Some(candidate) if candidate.is_file() => {
            tracing::debug!("Found global settings: {}", candidate.display());
            SettingsSource::Global(candidate)
        }
        _ => SettingsSource::Default,
    }
}

/// `$LOGCHECK_CONFIG_DIR`, else `~/.logcheck/`.
#[must_use]
pub fn global_settings_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LOGCHECK_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".logcheck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logcheck.toml"), "").unwrap();

        let result = resolve_in(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            SettingsSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn project_names_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".logcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_in(tmp.path(), None, None),
            SettingsSource::Project(tmp.path().join(".logcheck.toml"))
        );

        fs::write(tmp.path().join("logcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_in(tmp.path(), None, None),
            SettingsSource::Project(tmp.path().join("logcheck.toml"))
        );
    }

    #[test]
    fn global_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_dir = Some(global.path().to_path_buf());
        assert_eq!(
            resolve_in(project.path(), None, global_dir.clone()),
            SettingsSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, global_dir.clone()),
            SettingsSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("logcheck.toml"), "").unwrap();
        assert!(matches!(
            resolve_in(project.path(), None, global_dir),
            SettingsSource::Project(_)
        ));
    }

    #[test]
    fn default_has_no_path() {
        assert!(SettingsSource::Default.path().is_none());
        let p = PathBuf::from("/tmp/logcheck.toml");
        assert_eq!(SettingsSource::Global(p.clone()).path(), Some(p.as_path()));
    }
}
