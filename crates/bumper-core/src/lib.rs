//! Core library for bumper.
//!
//! This crate provides the foundational types and functionality used by the
//! `bumper` CLI and any downstream consumers.
//!
//! # Modules
//!
//! - [`bump`] - Bump-file descriptors (version-bump targets)
//! - [`commit`] - Commit-type descriptors and the standard table
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`updater`] - Updater contract and registry
//! - [`validate`] - Schema-level validation checks
//!
//! # Quick Start
//!
//! ```no_run
//! use bumper_core::{Config, ConfigLoader};
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! println!("Tag prefix: {}", config.tag_prefix);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod commit;

pub mod config;

pub mod error;

pub mod updater;

pub mod validate;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
