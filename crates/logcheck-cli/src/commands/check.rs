//! Check command implementation.

use anyhow::{Context, Result};
use logcheck_core::{EngineConfig, Settings};
use logcheck_go::Analyzer;
use std::path::Path;

use crate::config_resolver::{self, SettingsSource};
use crate::CheckArgs;

/// Runs the check command.
pub fn run(args: &CheckArgs, settings_path: Option<&Path>) -> Result<()> {
    let source = config_resolver::resolve(&args.path, settings_path);
    let config = engine_config(args, &source, |name| std::env::var(name).ok())?;
    if let Some(path) = config.override_path() {
        tracing::info!("Using override document: {}", path.display());
    }
    let engine = config.build().context("Failed to load override document")?;

    let analyzer = Analyzer::builder()
        .root(&args.path)
        .engine(engine)
        .excludes(args.exclude.iter().cloned())
        .fail_on_parse_error(args.fail_on_parse_error)
        .build()
        .context("Failed to build analyzer")?;

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, args.format, analyzer.root())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Collects check defaults and the override document path.
///
/// Later sources win: settings file, then environment, then flags.
fn engine_config<F>(args: &CheckArgs, source: &SettingsSource, env: F) -> Result<EngineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EngineConfig::new();

    if let Some(path) = source.path() {
        tracing::debug!("Loading settings: {}", path.display());
        let mut settings = Settings::from_file(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?;
        // `config` is relative to the settings file.
        if let (Some(doc), Some(dir)) = (settings.config.as_mut(), path.parent()) {
            if doc.is_relative() {
                *doc = dir.join(&*doc);
            }
        }
        config
            .apply_settings(&settings)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
    }

    config
        .apply_env(env)
        .context("Invalid logcheck environment variable")?;

    for (name, enabled) in args.check_flags() {
        if let Some(enabled) = enabled {
            config.set_enabled(name, enabled)?;
        }
    }
    if let Some(path) = &args.config {
        config.set_override_path(Some(path.clone()));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;
    use logcheck_core::Check;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args() -> CheckArgs {
        CheckArgs {
            path: PathBuf::from("."),
            format: OutputFormat::Text,
            exclude: Vec::new(),
            config: None,
            fail_on_parse_error: false,
            check_structured: None,
            check_parameters: None,
            check_contextual: None,
            check_with_helpers: None,
            check_verbosity_zero: None,
            check_key: None,
            check_deprecations: None,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn built_in_defaults() {
        let config = engine_config(&args(), &SettingsSource::Default, no_env).unwrap();
        let defaults = config.defaults();
        assert!(defaults.is_enabled(Check::Structured));
        assert!(defaults.is_enabled(Check::Parameters));
        assert!(!defaults.is_enabled(Check::Contextual));
        assert!(config.override_path().is_none());
    }

    #[test]
    fn precedence_settings_env_flags() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("logcheck.toml");
        std::fs::write(
            &settings,
            "config = \"hack/logcheck.conf\"\n\n[check]\nstructured = false\ncontextual = true\nwith-helpers = true\n",
        )
        .unwrap();
        let source = SettingsSource::Project(settings);

        let config = engine_config(&args(), &source, no_env).unwrap();
        assert!(!config.defaults().is_enabled(Check::Structured));
        assert!(config.defaults().is_enabled(Check::Contextual));
        assert_eq!(
            config.override_path(),
            Some(tmp.path().join("hack/logcheck.conf").as_path())
        );

        let env = |name: &str| match name {
            "LOGCHECK_CONTEXTUAL" => Some("false".to_owned()),
            "LOGCHECK_CONFIG" => Some("/etc/logcheck.conf".to_owned()),
            _ => None,
        };
        let config = engine_config(&args(), &source, env).unwrap();
        assert!(!config.defaults().is_enabled(Check::Contextual));
        assert!(config.defaults().is_enabled(Check::WithHelpers));
        assert_eq!(config.override_path(), Some(Path::new("/etc/logcheck.conf")));

        let mut flags = args();
        flags.check_contextual = Some(true);
        flags.check_with_helpers = Some(false);
        flags.config = Some(PathBuf::from("local.conf"));
        let config = engine_config(&flags, &source, env).unwrap();
        assert!(config.defaults().is_enabled(Check::Contextual));
        assert!(!config.defaults().is_enabled(Check::WithHelpers));
        assert_eq!(config.override_path(), Some(Path::new("local.conf")));
    }

    #[test]
    fn invalid_sources_are_errors() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("logcheck.toml");
        std::fs::write(&settings, "[check]\nstructurd = true\n").unwrap();
        let err = engine_config(&args(), &SettingsSource::Explicit(settings), no_env).unwrap_err();
        assert!(format!("{err:#}").contains("\"structurd\" is not a supported check"));

        let env = |name: &str| (name == "LOGCHECK_PARAMETERS").then(|| "yes".to_owned());
        let err = engine_config(&args(), &SettingsSource::Default, env).unwrap_err();
        assert!(format!("{err:#}").contains("LOGCHECK_PARAMETERS=\"yes\": invalid boolean"));
    }

    #[test]
    fn missing_settings_file() {
        let source = SettingsSource::Explicit(PathBuf::from("/nonexistent/logcheck.toml"));
        let err = engine_config(&args(), &source, no_env).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load settings"));
    }
}
