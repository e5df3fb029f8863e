//! Updater contract and registry.
//!
//! Versionrc-style documents reference custom updaters by script path,
//! resolved with a dynamic import at run time. Here that is an explicit
//! registry lookup resolved at configuration-load time: every
//! `updater` name in a config must name a registered [`Updater`], and
//! unknown names fail resolution before the release engine does any work.
//!
//! Updaters operate on file *contents*, not files. An updater locates the
//! embedded version string in a document and produces the rewritten
//! document; reading and writing the file itself is the caller's job.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use thiserror::Error;

use crate::bump::{BumpFile, BumpFormat};
use crate::config::Config;

/// Errors from updater resolution and version location.
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// A bump file referenced an updater name that is not registered.
    #[error("unknown updater '{0}' — not registered")]
    Unknown(String),

    /// A bump file specified neither a builtin format nor an updater.
    #[error("bump file '{0}' specifies neither a builtin format nor an updater")]
    Unresolvable(String),

    /// The updater could not find a version string in the contents.
    #[error("{updater}: no version string found")]
    VersionNotFound {
        /// Name of the updater that searched.
        updater: String,
    },

    /// The contents could not be parsed in the updater's format.
    #[error("{updater}: {message}")]
    Parse {
        /// Name of the updater that parsed.
        updater: String,
        /// Parser error details.
        message: String,
    },

    /// The located version string is not valid semver.
    #[error("invalid semver: {0}")]
    InvalidSemver(#[from] semver::Error),
}

/// Result alias for updater operations.
pub type UpdaterResult<T> = Result<T, UpdaterError>;

/// A routine that locates and rewrites the version string in a document.
///
/// Implementations are pure with respect to the filesystem: contents in,
/// contents out. `write_version` must leave everything except the version
/// string untouched.
pub trait Updater: Send + Sync {
    /// Registry name of this updater.
    fn name(&self) -> &str;

    /// Locate and parse the embedded version string.
    fn read_version(&self, contents: &str) -> UpdaterResult<Version>;

    /// Produce the contents with the version string replaced.
    fn write_version(&self, contents: &str, version: &Version) -> UpdaterResult<String>;
}

/// A bump file paired with the updater that handles it.
#[derive(Clone)]
pub struct ResolvedBumpFile {
    /// The bump-file descriptor from the config.
    pub file: BumpFile,
    /// The updater resolved for it.
    pub updater: Arc<dyn Updater>,
}

impl std::fmt::Debug for ResolvedBumpFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedBumpFile")
            .field("file", &self.file)
            .field("updater", &self.updater.name())
            .finish()
    }
}

/// Registry mapping updater names to implementations.
///
/// Builtin formats resolve without registration; `updater` references
/// resolve against the registered names.
pub struct UpdaterRegistry {
    custom: BTreeMap<String, Arc<dyn Updater>>,
}

impl Default for UpdaterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl UpdaterRegistry {
    /// An empty registry with no custom updaters.
    pub const fn empty() -> Self {
        Self {
            custom: BTreeMap::new(),
        }
    }

    /// A registry pre-loaded with the bundled custom updaters.
    ///
    /// Currently that is `python` (module-level `__version__` assignment).
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(PythonUpdater));
        registry
    }

    /// Register an updater under its [`Updater::name`].
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register(&mut self, updater: Arc<dyn Updater>) {
        self.custom.insert(updater.name().to_string(), updater);
    }

    /// Look up a custom updater by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Updater>> {
        self.custom.get(name).cloned()
    }

    /// Registered custom updater names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    /// The updater implementing a builtin format.
    pub fn for_format(format: BumpFormat) -> Arc<dyn Updater> {
        match format {
            BumpFormat::Json => Arc::new(JsonUpdater),
            BumpFormat::Toml => Arc::new(TomlUpdater),
            BumpFormat::PlainText => Arc::new(PlainTextUpdater),
        }
    }

    /// Resolve the updater for a single bump file.
    pub fn resolve(&self, file: &BumpFile) -> UpdaterResult<Arc<dyn Updater>> {
        if let Some(format) = file.format {
            return Ok(Self::for_format(format));
        }
        if let Some(ref name) = file.updater {
            return self
                .get(name)
                .ok_or_else(|| UpdaterError::Unknown(name.clone()));
        }
        Err(UpdaterError::Unresolvable(file.filename.to_string()))
    }

    /// Resolve every bump file in a config, failing on the first bad entry.
    ///
    /// Called right after configuration load so unresolvable references
    /// surface before anything touches the working tree.
    pub fn resolve_all(&self, config: &Config) -> UpdaterResult<Vec<ResolvedBumpFile>> {
        config
            .bump_files
            .iter()
            .map(|file| {
                let updater = self.resolve(file)?;
                Ok(ResolvedBumpFile {
                    file: file.clone(),
                    updater,
                })
            })
            .collect()
    }
}

// ──────────────────────────────────────────────
// Builtin format updaters
// ──────────────────────────────────────────────

/// JSON documents with a top-level `"version"` field (e.g. package.json).
struct JsonUpdater;

impl JsonUpdater {
    fn locate(contents: &str) -> UpdaterResult<String> {
        let doc: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| UpdaterError::Parse {
                updater: "json".to_string(),
                message: e.to_string(),
            })?;
        doc.get("version")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or(UpdaterError::VersionNotFound {
                updater: "json".to_string(),
            })
    }
}

impl Updater for JsonUpdater {
    fn name(&self) -> &str {
        "json"
    }

    fn read_version(&self, contents: &str) -> UpdaterResult<Version> {
        Ok(Version::parse(&Self::locate(contents)?)?)
    }

    fn write_version(&self, contents: &str, version: &Version) -> UpdaterResult<String> {
        let current = Self::locate(contents)?;
        // Anchor on the value the parse located, so a nested "version" key
        // carrying a different value is never the one rewritten.
        let pattern = format!(r#"("version"\s*:\s*"){}(")"#, regex::escape(&current));
        let re = Regex::new(&pattern).expect("escaped pattern is valid");
        if !re.is_match(contents) {
            return Err(UpdaterError::VersionNotFound {
                updater: self.name().to_string(),
            });
        }
        Ok(re
            .replace(contents, format!("${{1}}{version}${{2}}"))
            .into_owned())
    }
}

/// TOML documents with `[package].version` or a top-level `version` key.
struct TomlUpdater;

impl TomlUpdater {
    /// The located version string and the table it lives in (`Some("package")`
    /// for Cargo-style manifests, `None` for a bare top-level key).
    fn locate(contents: &str) -> UpdaterResult<(String, Option<&'static str>)> {
        let doc: toml::Table = toml::from_str(contents).map_err(|e| UpdaterError::Parse {
            updater: "toml".to_string(),
            message: e.to_string(),
        })?;

        // Cargo-style [package] table first, then a bare top-level key.
        let package_version = doc
            .get("package")
            .and_then(|p| p.as_table())
            .and_then(|p| p.get("version"))
            .and_then(|v| v.as_str());
        if let Some(raw) = package_version {
            return Ok((raw.to_string(), Some("package")));
        }

        doc.get("version")
            .and_then(|v| v.as_str())
            .map(|raw| (raw.to_string(), None))
            .ok_or(UpdaterError::VersionNotFound {
                updater: "toml".to_string(),
            })
    }

    /// Name of the table a header line opens (`[package]` and `[[entry]]`
    /// both yield the bare name).
    fn table_name(header: &str) -> &str {
        header
            .trim_start_matches('[')
            .split(']')
            .next()
            .unwrap_or("")
    }
}

impl Updater for TomlUpdater {
    fn name(&self) -> &str {
        "toml"
    }

    fn read_version(&self, contents: &str) -> UpdaterResult<Version> {
        Ok(Version::parse(&Self::locate(contents)?.0)?)
    }

    fn write_version(&self, contents: &str, version: &Version) -> UpdaterResult<String> {
        let (current, table) = Self::locate(contents)?;
        // Replace the exact `version = "<current>"` assignment, and only
        // inside the table the value was read from, so the rest of the
        // document keeps its formatting.
        let pattern = format!(r#"^(\s*version\s*=\s*"){}(".*)$"#, regex::escape(&current));
        let line_re = Regex::new(&pattern).expect("escaped pattern is valid");

        let mut current_table: Option<String> = None;
        let mut replaced = false;
        let mut out: Vec<String> = Vec::new();

        for line in contents.split('\n') {
            let trimmed = line.trim_start();
            if trimmed.starts_with('[') {
                current_table = Some(Self::table_name(trimmed).to_string());
                out.push(line.to_string());
                continue;
            }
            if !replaced
                && current_table.as_deref() == table
                && let Some(caps) = line_re.captures(line)
            {
                replaced = true;
                out.push(format!("{}{version}{}", &caps[1], &caps[2]));
                continue;
            }
            out.push(line.to_string());
        }

        if !replaced {
            return Err(UpdaterError::VersionNotFound {
                updater: self.name().to_string(),
            });
        }
        Ok(out.join("\n"))
    }
}

/// Files whose entire content is the version string.
struct PlainTextUpdater;

impl Updater for PlainTextUpdater {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn read_version(&self, contents: &str) -> UpdaterResult<Version> {
        let raw = contents.trim();
        if raw.is_empty() {
            return Err(UpdaterError::VersionNotFound {
                updater: self.name().to_string(),
            });
        }
        Ok(Version::parse(raw)?)
    }

    fn write_version(&self, contents: &str, version: &Version) -> UpdaterResult<String> {
        self.read_version(contents)?;
        if contents.ends_with('\n') {
            Ok(format!("{version}\n"))
        } else {
            Ok(version.to_string())
        }
    }
}

// ──────────────────────────────────────────────
// Bundled custom updaters
// ──────────────────────────────────────────────

static PYTHON_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(__version__\s*=\s*["'])([^"']+)(["'])"#).expect("valid regex")
});

/// Python modules with a `__version__ = "..."` assignment.
///
/// Handles the classic `pkg/__init__.py` convention that has no builtin
/// format.
struct PythonUpdater;

impl Updater for PythonUpdater {
    fn name(&self) -> &str {
        "python"
    }

    fn read_version(&self, contents: &str) -> UpdaterResult<Version> {
        let captures =
            PYTHON_VERSION_RE
                .captures(contents)
                .ok_or_else(|| UpdaterError::VersionNotFound {
                    updater: self.name().to_string(),
                })?;
        Ok(Version::parse(&captures[2])?)
    }

    fn write_version(&self, contents: &str, version: &Version) -> UpdaterResult<String> {
        self.read_version(contents)?;
        Ok(PYTHON_VERSION_RE
            .replace(contents, format!("${{1}}{version}${{3}}"))
            .into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    // ── json ──

    #[test]
    fn json_reads_top_level_version() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Json);
        let contents = r#"{"name": "app", "version": "1.4.2"}"#;
        assert_eq!(updater.read_version(contents).unwrap(), v("1.4.2"));
    }

    #[test]
    fn json_write_preserves_formatting() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Json);
        let contents = "{\n  \"name\": \"app\",\n  \"version\": \"1.4.2\",\n  \"private\": true\n}\n";
        let rewritten = updater.write_version(contents, &v("1.5.0")).unwrap();
        assert_eq!(
            rewritten,
            "{\n  \"name\": \"app\",\n  \"version\": \"1.5.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn json_write_skips_nested_version_keys() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Json);
        let contents =
            r#"{"engines": {"node": {"version": "18.0.0"}}, "version": "1.4.2"}"#;
        let rewritten = updater.write_version(contents, &v("1.5.0")).unwrap();
        assert_eq!(
            rewritten,
            r#"{"engines": {"node": {"version": "18.0.0"}}, "version": "1.5.0"}"#
        );
    }

    #[test]
    fn json_missing_version_field() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Json);
        let err = updater.read_version(r#"{"name": "app"}"#).unwrap_err();
        assert!(matches!(err, UpdaterError::VersionNotFound { .. }));
    }

    #[test]
    fn json_invalid_document() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Json);
        let err = updater.write_version("{not json", &v("1.0.0")).unwrap_err();
        assert!(matches!(err, UpdaterError::Parse { .. }));
    }

    // ── toml ──

    #[test]
    fn toml_reads_package_version() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Toml);
        let contents = "[package]\nname = \"app\"\nversion = \"0.3.1\"\n";
        assert_eq!(updater.read_version(contents).unwrap(), v("0.3.1"));
    }

    #[test]
    fn toml_reads_top_level_version() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Toml);
        assert_eq!(
            updater.read_version("version = \"2.0.0\"\n").unwrap(),
            v("2.0.0")
        );
    }

    #[test]
    fn toml_write_rewrites_only_the_version_line() {
        let updater = UpdaterRegistry::for_format(BumpFormat::Toml);
        let contents = "[package]\nname = \"app\"\nversion = \"0.3.1\"\nedition = \"2024\"\n";
        let rewritten = updater.write_version(contents, &v("0.4.0")).unwrap();
        assert_eq!(
            rewritten,
            "[package]\nname = \"app\"\nversion = \"0.4.0\"\nedition = \"2024\"\n"
        );
    }

    #[test]
    fn toml_write_prefers_package_table_over_top_level() {
        // Same value in both places: the [package] one was read, so the
        // [package] one is the line rewritten.
        let updater = UpdaterRegistry::for_format(BumpFormat::Toml);
        let contents = "version = \"0.3.1\"\n\n[package]\nname = \"app\"\nversion = \"0.3.1\"\n";
        let rewritten = updater.write_version(contents, &v("0.4.0")).unwrap();
        assert_eq!(
            rewritten,
            "version = \"0.3.1\"\n\n[package]\nname = \"app\"\nversion = \"0.4.0\"\n"
        );
    }

    // ── plain-text ──

    #[test]
    fn plain_text_roundtrip() {
        let updater = UpdaterRegistry::for_format(BumpFormat::PlainText);
        assert_eq!(updater.read_version("1.2.3\n").unwrap(), v("1.2.3"));
        assert_eq!(
            updater.write_version("1.2.3\n", &v("1.3.0")).unwrap(),
            "1.3.0\n"
        );
    }

    #[test]
    fn plain_text_without_newline_stays_bare() {
        let updater = UpdaterRegistry::for_format(BumpFormat::PlainText);
        assert_eq!(
            updater.write_version("1.2.3", &v("1.3.0")).unwrap(),
            "1.3.0"
        );
    }

    #[test]
    fn plain_text_empty_file() {
        let updater = UpdaterRegistry::for_format(BumpFormat::PlainText);
        assert!(matches!(
            updater.read_version("  \n").unwrap_err(),
            UpdaterError::VersionNotFound { .. }
        ));
    }

    // ── python ──

    #[test]
    fn python_reads_dunder_version() {
        let registry = UpdaterRegistry::with_builtins();
        let updater = registry.get("python").unwrap();
        let contents = "\"\"\"crm package.\"\"\"\n\n__version__ = \"2.10.0\"\n";
        assert_eq!(updater.read_version(contents).unwrap(), v("2.10.0"));
    }

    #[test]
    fn python_write_keeps_quote_style() {
        let registry = UpdaterRegistry::with_builtins();
        let updater = registry.get("python").unwrap();
        let rewritten = updater
            .write_version("__version__ = '2.10.0'\n", &v("2.11.0"))
            .unwrap();
        assert_eq!(rewritten, "__version__ = '2.11.0'\n");
    }

    #[test]
    fn python_no_assignment() {
        let registry = UpdaterRegistry::with_builtins();
        let updater = registry.get("python").unwrap();
        assert!(matches!(
            updater.read_version("print('hi')\n").unwrap_err(),
            UpdaterError::VersionNotFound { .. }
        ));
    }

    // ── registry ──

    #[test]
    fn builtin_registry_knows_python() {
        let registry = UpdaterRegistry::with_builtins();
        assert!(registry.get("python").is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), ["python"]);
    }

    #[test]
    fn resolve_builtin_format() {
        let registry = UpdaterRegistry::empty();
        let file = BumpFile::builtin("package.json", BumpFormat::Json);
        assert_eq!(registry.resolve(&file).unwrap().name(), "json");
    }

    #[test]
    fn resolve_unknown_updater_fails() {
        let registry = UpdaterRegistry::with_builtins();
        let file = BumpFile::custom("app.cfg", "does-not-exist");
        assert!(matches!(
            registry.resolve(&file),
            Err(UpdaterError::Unknown(name)) if name == "does-not-exist"
        ));
    }

    #[test]
    fn resolve_unresolvable_entry_fails() {
        let registry = UpdaterRegistry::with_builtins();
        let file = BumpFile {
            filename: "VERSION".into(),
            format: None,
            updater: None,
        };
        assert!(matches!(
            registry.resolve(&file),
            Err(UpdaterError::Unresolvable(_))
        ));
    }

    #[test]
    fn custom_registration_wins() {
        struct Noop;
        impl Updater for Noop {
            fn name(&self) -> &str {
                "noop"
            }
            fn read_version(&self, _: &str) -> UpdaterResult<Version> {
                Ok(Version::new(0, 0, 0))
            }
            fn write_version(&self, contents: &str, _: &Version) -> UpdaterResult<String> {
                Ok(contents.to_string())
            }
        }

        let mut registry = UpdaterRegistry::empty();
        registry.register(Arc::new(Noop));
        let file = BumpFile::custom("anything", "noop");
        assert_eq!(registry.resolve(&file).unwrap().name(), "noop");
    }

    #[test]
    fn resolve_all_for_versionrc_table() {
        let config = Config {
            bump_files: vec![
                BumpFile::builtin("package.json", BumpFormat::Json),
                BumpFile::builtin("frontend/package.json", BumpFormat::Json),
                BumpFile::custom("crm/__init__.py", "python"),
            ],
            ..Config::default()
        };

        let registry = UpdaterRegistry::with_builtins();
        let resolved = registry.resolve_all(&config).unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].updater.name(), "json");
        assert_eq!(resolved[2].updater.name(), "python");
    }
}
