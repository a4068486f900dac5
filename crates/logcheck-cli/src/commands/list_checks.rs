//! List checks command implementation.

use logcheck_core::Check;

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    for check in Check::ALL {
        let default = if check.default_enabled() { "on" } else { "off" };
        println!("  {} {:<15} [{default:>3}] {}", check.code(), check.name(), check.description());
        println!("        env: {}", check.env_var());
    }
    println!("\nToggle per run with --check-<name>[=BOOL], per file with an override document (--config).");
}
