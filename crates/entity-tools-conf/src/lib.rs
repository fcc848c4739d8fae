//! # Entity Tools Configuration
//!
//! Layered settings for the entity tools: defaults, an optional TOML file and
//! `ENTITY_TOOLS_*` environment variables.
//!
//! ## Features
//!
//! - **Multiple configuration sources**: defaults, TOML files, environment variables
//! - **Priority merging**: environment > file > defaults
//! - **Validation**: language code, chrono date format and database URL checks
//!
//! ## Quick Start
//!
//! ```rust
//! use entity_tools_conf::prelude::*;
//! use serde_json::json;
//!
//! let settings = SettingsBuilder::new()
//! 	.add_source(EntityToolsSettings::defaults())
//! 	.add_source(DefaultSource::new().with_value("revert_translations", json!("default_only")))
//! 	.build()
//! 	.unwrap();
//!
//! assert_eq!(settings.default_langcode, "en");
//! assert_eq!(settings.revision_options().revert_translations, RevertTranslations::DefaultOnly);
//! ```

#![warn(missing_docs)]

pub mod settings;
pub mod sources;

pub use settings::{EntityToolsSettings, SettingsBuilder, SettingsError};

/// Convenient re-exports
pub mod prelude {
	pub use crate::settings::{EntityToolsSettings, SettingsBuilder, SettingsError};
	pub use crate::sources::{
		ConfigSource, DefaultSource, ENV_PREFIX, EnvSource, SourceError, TomlFileSource,
	};
	pub use entity_tools_core::revisions::{RevertTranslations, RevisionOptions};
}
