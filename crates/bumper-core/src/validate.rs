//! Schema-level validation of a loaded configuration.
//!
//! The checks here are exactly the properties a conforming loader must
//! guarantee: unique non-empty type tags, unique non-empty bump-file
//! paths, exactly one resolution per bump file, resolvable updater
//! references, and a non-empty tag prefix. Returns structured results
//! that the CLI formats.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::updater::UpdaterRegistry;

/// A single validation check result.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Human-readable name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Description of the result (reason for failure, or confirmation).
    pub message: String,
}

/// Full validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Individual check results.
    pub checks: Vec<CheckResult>,
    /// Whether all checks passed.
    pub all_passed: bool,
}

/// Run all schema checks against a loaded configuration.
///
/// # Arguments
/// * `config` — the loaded configuration record
/// * `registry` — updater registry used to resolve `updater` references
#[instrument(skip_all, fields(types = config.types.len(), bump_files = config.bump_files.len()))]
pub fn run_validation(config: &Config, registry: &UpdaterRegistry) -> ValidationReport {
    let checks = vec![
        check_type_tags(config),
        check_bump_filenames(config),
        check_bump_resolution(config),
        check_updater_references(config, registry),
        check_tag_prefix(config),
    ];

    let all_passed = checks.iter().all(|c| c.passed);
    debug!(all_passed, check_count = checks.len(), "validation complete");

    ValidationReport { checks, all_passed }
}

/// Items that appear more than once, in first-seen order.
fn duplicates<'a, I: Iterator<Item = &'a str>>(items: I) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for item in items {
        if !seen.insert(item) && !dupes.contains(&item) {
            dupes.push(item);
        }
    }
    dupes
}

fn check_type_tags(config: &Config) -> CheckResult {
    let name = "Commit type tags";

    let empty = config.types.iter().filter(|t| t.type_tag.is_empty()).count();
    if empty > 0 {
        return CheckResult {
            name: name.into(),
            passed: false,
            message: format!("{empty} type entr{} with an empty tag", plural_y(empty)),
        };
    }

    let dupes = duplicates(config.types.iter().map(|t| t.type_tag.as_str()));
    if !dupes.is_empty() {
        return CheckResult {
            name: name.into(),
            passed: false,
            message: format!("duplicate type tags: {}", dupes.join(", ")),
        };
    }

    CheckResult {
        name: name.into(),
        passed: true,
        message: format!("{} unique type tags", config.types.len()),
    }
}

fn check_bump_filenames(config: &Config) -> CheckResult {
    let name = "Bump file paths";

    let empty = config
        .bump_files
        .iter()
        .filter(|f| f.filename.as_str().is_empty())
        .count();
    if empty > 0 {
        return CheckResult {
            name: name.into(),
            passed: false,
            message: format!("{empty} bump file entr{} with an empty path", plural_y(empty)),
        };
    }

    let dupes = duplicates(config.bump_files.iter().map(|f| f.filename.as_str()));
    if !dupes.is_empty() {
        return CheckResult {
            name: name.into(),
            passed: false,
            message: format!("duplicate bump file paths: {}", dupes.join(", ")),
        };
    }

    CheckResult {
        name: name.into(),
        passed: true,
        message: match config.bump_files.len() {
            0 => "no bump files configured".into(),
            n => format!("{n} unique bump file path{}", plural_s(n)),
        },
    }
}

fn check_bump_resolution(config: &Config) -> CheckResult {
    let name = "Bump file resolution";

    let malformed: Vec<&str> = config
        .bump_files
        .iter()
        .filter(|f| !f.is_well_formed())
        .map(|f| f.filename.as_str())
        .collect();

    if malformed.is_empty() {
        CheckResult {
            name: name.into(),
            passed: true,
            message: "every bump file names exactly one format or updater".into(),
        }
    } else {
        CheckResult {
            name: name.into(),
            passed: false,
            message: format!(
                "must specify exactly one of a builtin format or an updater: {}",
                malformed.join(", ")
            ),
        }
    }
}

fn check_updater_references(config: &Config, registry: &UpdaterRegistry) -> CheckResult {
    let name = "Updater references";

    let unknown: Vec<&str> = config
        .bump_files
        .iter()
        .filter_map(|f| f.updater.as_deref())
        .filter(|u| registry.get(u).is_none())
        .collect();

    if unknown.is_empty() {
        CheckResult {
            name: name.into(),
            passed: true,
            message: "all updater references resolve".into(),
        }
    } else {
        let known: Vec<&str> = registry.names().collect();
        CheckResult {
            name: name.into(),
            passed: false,
            message: format!(
                "unknown updaters: {} (registered: {})",
                unknown.join(", "),
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            ),
        }
    }
}

fn check_tag_prefix(config: &Config) -> CheckResult {
    let name = "Tag prefix";

    if config.tag_prefix.is_empty() {
        CheckResult {
            name: name.into(),
            passed: false,
            message: "tag prefix must not be empty".into(),
        }
    } else {
        CheckResult {
            name: name.into(),
            passed: true,
            message: format!("release tags look like {}1.2.3", config.tag_prefix),
        }
    }
}

const fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

const fn plural_y(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}
