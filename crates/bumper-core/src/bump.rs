//! Bump-file descriptors.
//!
//! A bump file is a file containing an embedded version string that the
//! release engine updates on release. Each descriptor names the file and
//! says how its version is found: a recognized builtin format, or a
//! reference to a registered custom updater (see [`crate::updater`]).

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A version-bump target descriptor.
///
/// `format` and `updater` are both optional at the schema level; exactly
/// one must be present. That rule is enforced by [`crate::validate`] rather
/// than the type itself so malformed entries surface as named check
/// failures instead of opaque deserialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpFile {
    /// Path of the file to update, relative to the project root.
    pub filename: Utf8PathBuf,
    /// Builtin format hint (e.g. "this file is JSON").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<BumpFormat>,
    /// Name of a registered custom updater for non-standard formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updater: Option<String>,
}

impl BumpFile {
    /// Descriptor for a file in a builtin format.
    pub fn builtin<P: Into<Utf8PathBuf>>(filename: P, format: BumpFormat) -> Self {
        Self {
            filename: filename.into(),
            format: Some(format),
            updater: None,
        }
    }

    /// Descriptor for a file handled by a named custom updater.
    pub fn custom<P: Into<Utf8PathBuf>, U: Into<String>>(filename: P, updater: U) -> Self {
        Self {
            filename: filename.into(),
            format: None,
            updater: Some(updater.into()),
        }
    }

    /// Whether this entry names exactly one way to locate its version.
    pub const fn is_well_formed(&self) -> bool {
        matches!(
            (&self.format, &self.updater),
            (Some(_), None) | (None, Some(_))
        )
    }
}

impl fmt::Display for BumpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.format, &self.updater) {
            (Some(format), _) => write!(f, "{} ({format})", self.filename),
            (None, Some(updater)) => write!(f, "{} (updater: {updater})", self.filename),
            (None, None) => write!(f, "{} (unspecified)", self.filename),
        }
    }
}

/// Builtin bump-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpFormat {
    /// JSON document with a top-level `"version"` field (e.g. package.json).
    Json,
    /// TOML document with `[package].version` or a top-level `version` key.
    Toml,
    /// File whose entire content is the version string.
    PlainText,
}

impl fmt::Display for BumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
            Self::PlainText => write!(f, "plain-text"),
        }
    }
}
