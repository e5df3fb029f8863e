//! Commit-type descriptors and the standard conventional-commit table.
//!
//! A commit type maps a short tag (`feat`, `fix`, ...) to the changelog
//! section its commits are listed under. This module is pure types and
//! data — loading and validation live in [`crate::config`] and
//! [`crate::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A commit-type descriptor: type tag, changelog section title, visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitType {
    /// Short type tag as written in commit subjects (e.g. `feat`).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Human-readable changelog section title for this type.
    pub section: String,
    /// Whether commits of this type are omitted from the changelog.
    ///
    /// Defaults to `false` — types are shown unless hidden explicitly.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl CommitType {
    /// Create a visible commit type.
    pub fn new<T: Into<String>, S: Into<String>>(type_tag: T, section: S) -> Self {
        Self {
            type_tag: type_tag.into(),
            section: section.into(),
            hidden: false,
        }
    }

    /// Create a hidden commit type (omitted from the changelog).
    pub fn hidden<T: Into<String>, S: Into<String>>(type_tag: T, section: S) -> Self {
        Self {
            hidden: true,
            ..Self::new(type_tag, section)
        }
    }

    /// The standard conventional-commit table, in changelog order.
    ///
    /// Eight visible types with their section titles. This is the default
    /// `types` sequence when a config file does not provide one.
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::new("feat", "✨ Features"),
            Self::new("fix", "🐛 Bug Fixes"),
            Self::new("chore", "🔧 Maintenance"),
            Self::new("docs", "📚 Documentation"),
            Self::new("ci", "👷 CI/CD"),
            Self::new("refactor", "♻️ Refactoring"),
            Self::new("perf", "⚡ Performance"),
            Self::new("test", "🧪 Tests"),
        ]
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hidden {
            write!(f, "{} → {} (hidden)", self.type_tag, self.section)
        } else {
            write!(f, "{} → {}", self.type_tag, self.section)
        }
    }
}
