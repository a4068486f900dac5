//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_SETTINGS: &str = r#"# logcheck settings
#
# Environment variables (LOGCHECK_<CHECK>, LOGCHECK_CONFIG) and
# command-line flags take precedence over this file.

# Override document with per-file toggles, relative to this file.
# Each line is `<checks> <regexp>`, for example:
#   structured k8s.io/kubernetes/pkg/legacy/.*
#   -contextual,parameters .*_test.go
# config = "hack/logcheck.conf"

[check]
structured = true
parameters = true
contextual = false
with-helpers = false
verbosity-zero = false
key = false
deprecations = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_settings(Path::new("logcheck.toml"), force)?;

    println!("Created logcheck.toml");
    println!("\nNext steps:");
    println!("  1. Edit logcheck.toml to enable checks");
    println!("  2. Run: logcheck check");

    Ok(())
}

fn write_settings(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Settings file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_SETTINGS)?;
    Ok(())
}
