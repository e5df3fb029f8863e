//! Init command — write a starter config file into the project.

use clap::Args;
use inquire::Confirm;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

/// Starter project config: the standard type table plus commented examples.
const STARTER_CONFIG: &str = r#"# bumper configuration
# Commit types map conventional-commit tags to changelog sections.
# Types are shown unless `hidden = true`.

tag_prefix = "v"

[[types]]
type = "feat"
section = "✨ Features"

[[types]]
type = "fix"
section = "🐛 Bug Fixes"

[[types]]
type = "chore"
section = "🔧 Maintenance"

[[types]]
type = "docs"
section = "📚 Documentation"

[[types]]
type = "ci"
section = "👷 CI/CD"

[[types]]
type = "refactor"
section = "♻️ Refactoring"

[[types]]
type = "perf"
section = "⚡ Performance"

[[types]]
type = "test"
section = "🧪 Tests"

# Bump files are files whose embedded version string is updated on release.
# Builtin formats: json, toml, plain-text. Non-standard files reference a
# registered updater by name.
#
# [[bump_files]]
# filename = "package.json"
# type = "json"
#
# [[bump_files]]
# filename = "pkg/__init__.py"
# updater = "python"
"#;

/// Arguments for the `init` subcommand.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Overwrite an existing config file without asking
    #[arg(long)]
    pub force: bool,
}

/// Write a starter `.bumper.toml` into the current directory.
#[instrument(name = "cmd_init", skip_all, fields(force = args.force))]
pub fn cmd_init(args: InitArgs, cwd: &camino::Utf8Path) -> anyhow::Result<()> {
    let config_path = cwd.join(".bumper.toml");
    debug!(path = %config_path, "executing init command");

    if config_path.exists() && !args.force {
        // Interactive sessions get a prompt; scripts must pass --force.
        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            anyhow::bail!("{config_path} already exists (use --force to overwrite)");
        }

        let overwrite = Confirm::new(&format!("{config_path} exists. Overwrite?"))
            .with_default(false)
            .prompt()
            .unwrap_or(false);
        if !overwrite {
            println!("{}", "Left existing config untouched.".yellow());
            return Ok(());
        }
    }

    std::fs::write(&config_path, STARTER_CONFIG)?;
    println!("{} Created {}", "✓".green(), config_path.cyan());
    println!(
        "{}",
        "Edit the type table and add bump_files entries, then run `bumper check`.".dimmed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumper_core::config::ConfigLoader;
    use tempfile::TempDir;

    #[test]
    fn starter_config_loads_and_matches_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".bumper.toml");
        std::fs::write(&path, STARTER_CONFIG).unwrap();

        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load()
            .unwrap();

        assert_eq!(config, bumper_core::config::Config::default());
    }

    #[test]
    fn init_writes_config() {
        let tmp = TempDir::new().unwrap();
        let cwd = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        cmd_init(InitArgs::default(), &cwd).unwrap();
        assert!(cwd.join(".bumper.toml").is_file());
    }

    #[test]
    fn init_force_overwrites() {
        let tmp = TempDir::new().unwrap();
        let cwd = camino::Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        std::fs::write(cwd.join(".bumper.toml"), "tag_prefix = \"x\"\n").unwrap();

        cmd_init(InitArgs { force: true }, &cwd).unwrap();
        let written = std::fs::read_to_string(cwd.join(".bumper.toml")).unwrap();
        assert!(written.contains("tag_prefix = \"v\""));
    }
}
