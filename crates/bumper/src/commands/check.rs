//! Check command — validate the configuration schema.

use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use bumper_core::config::Config;
use bumper_core::updater::UpdaterRegistry;
use bumper_core::validate;

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    // Uses global --json flag for structured output
}

/// Run schema validation and display results.
#[instrument(name = "cmd_check", skip_all, fields(json_output))]
pub fn cmd_check(_args: CheckArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing check command");

    let registry = UpdaterRegistry::with_builtins();
    let report = validate::run_validation(config, &registry);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", "Configuration Checks".bold().underline());
        println!();

        for check in &report.checks {
            let icon = if check.passed {
                "✓".green().to_string()
            } else {
                "✗".red().to_string()
            };
            println!("  {icon} {}: {}", check.name.bold(), check.message);
        }

        println!();
        if report.all_passed {
            println!("  {}", "Configuration is valid.".green().bold());
        } else {
            let failed = report.checks.iter().filter(|c| !c.passed).count();
            println!(
                "  {} — fix entries above",
                format!("{failed} check(s) failed").red().bold(),
            );
        }
    }

    if report.all_passed {
        Ok(())
    } else {
        Err(anyhow::anyhow!("configuration checks failed"))
    }
}
