//! Info command — show package information and the resolved configuration.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use bumper_core::bump::BumpFile;
use bumper_core::commit::CommitType;
use bumper_core::config::{self, Config};
use bumper_core::updater::UpdaterRegistry;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    homepage: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            homepage: env!("CARGO_PKG_HOMEPAGE"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ResolvedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    tag_prefix: String,
    types: Vec<CommitType>,
    bump_files: Vec<BumpFile>,
    registered_updaters: Vec<String>,
}

impl ResolvedConfig {
    fn gather(config: &Config, registry: &UpdaterRegistry, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            tag_prefix: config.tag_prefix.clone(),
            types: config.types.clone(),
            bump_files: config.bump_files.clone(),
            registered_updaters: registry.names().map(str::to_string).collect(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ResolvedConfig,
}

/// Print package information and the resolved configuration.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `cwd` - Current working directory for config discovery
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let registry = UpdaterRegistry::with_builtins();
    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ResolvedConfig::gather(config, &registry, cwd),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
    } else {
        println!(
            "{} {}",
            full_info.package.name.bold(),
            full_info.package.version.green()
        );
        if !full_info.package.description.is_empty() {
            println!("{}", full_info.package.description);
        }
        if !full_info.package.license.is_empty() {
            println!("{}: {}", "License".dimmed(), full_info.package.license);
        }
        if !full_info.package.repository.is_empty() {
            println!(
                "{}: {}",
                "Repository".dimmed(),
                full_info.package.repository.cyan()
            );
        }

        // Configuration section
        println!();
        println!("{}", "Configuration".bold().underline());
        if let Some(ref path) = full_info.config.config_file {
            println!("{}: {}", "Config file".dimmed(), path.cyan());
        } else {
            println!(
                "{}: {}",
                "Config file".dimmed(),
                "none found (using defaults)".yellow()
            );
        }
        println!(
            "{}: {}",
            "Tag prefix".dimmed(),
            full_info.config.tag_prefix.cyan()
        );

        // Commit types
        println!();
        println!("{}", "Commit Types".bold().underline());
        for commit_type in &full_info.config.types {
            if commit_type.hidden {
                println!(
                    "  {} {} {}",
                    commit_type.type_tag.dimmed(),
                    "→".dimmed(),
                    format!("{} (hidden)", commit_type.section).dimmed()
                );
            } else {
                println!(
                    "  {} {} {}",
                    commit_type.type_tag.cyan(),
                    "→".dimmed(),
                    commit_type.section
                );
            }
        }

        // Bump files
        println!();
        println!("{}", "Bump Files".bold().underline());
        if full_info.config.bump_files.is_empty() {
            println!("  {} {}", "○".dimmed(), "No bump files configured".dimmed());
        } else {
            for file in &full_info.config.bump_files {
                match registry.resolve(file) {
                    Ok(updater) => println!(
                        "  {} {} ({})",
                        "✓".green(),
                        file.filename.cyan(),
                        updater.name()
                    ),
                    Err(e) => println!("  {} {} — {}", "✗".red(), file.filename.cyan(), e),
                }
            }
        }
    }

    Ok(())
}
