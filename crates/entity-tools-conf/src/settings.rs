//! Settings model and layered builder

use crate::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
use entity_tools_core::revisions::{
	DEFAULT_DATE_FORMAT, RevertTranslations, RevisionOptions, validate_date_format,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Errors raised while building settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// A source failed to load
	#[error("Failed to load {source_description}: {error}")]
	Source {
		/// Description of the failing source
		source_description: String,
		/// Underlying error
		error: SourceError,
	},

	/// Merged values don't match the settings shape
	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	/// A value failed validation
	#[error("Validation error: {0}")]
	Validation(String),
}

/// Settings of the entity tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityToolsSettings {
	/// Language the revision overview prefers
	pub default_langcode: String,

	/// chrono format string for revision dates
	pub date_format: String,

	/// Which translations a revert keeps
	pub revert_translations: RevertTranslations,

	/// Database URL of the SQLite content store
	pub database_url: Option<String>,
}

impl Default for EntityToolsSettings {
	fn default() -> Self {
		Self {
			default_langcode: "en".to_string(),
			date_format: DEFAULT_DATE_FORMAT.to_string(),
			revert_translations: RevertTranslations::Preserve,
			database_url: None,
		}
	}
}

impl EntityToolsSettings {
	/// Load defaults, then an optional TOML file, then `ENTITY_TOOLS_*` variables
	///
	/// # Examples
	///
	/// ```no_run
	/// use entity_tools_conf::EntityToolsSettings;
	/// use std::path::Path;
	///
	/// let settings = EntityToolsSettings::load(Some(Path::new("entity_tools.toml"))).unwrap();
	/// let options = settings.revision_options();
	/// ```
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new()
			.add_source(Self::defaults())
			.add_source(EnvSource::default());
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.build()
	}

	/// Default values as a configuration source
	pub fn defaults() -> DefaultSource {
		let defaults = Self::default();
		DefaultSource::new()
			.with_value("default_langcode", Value::String(defaults.default_langcode))
			.with_value("date_format", Value::String(defaults.date_format))
			.with_value("revert_translations", Value::String("preserve".to_string()))
	}

	/// Check values that deserialize fine but can't be used
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.default_langcode.trim().is_empty() {
			return Err(SettingsError::Validation(
				"default_langcode must not be empty".to_string(),
			));
		}

		validate_date_format(&self.date_format)
			.map_err(|e| SettingsError::Validation(e.to_string()))?;

		if let Some(url) = &self.database_url
			&& !url.starts_with("sqlite:")
		{
			return Err(SettingsError::Validation(format!(
				"database_url '{}' is not an sqlite URL",
				url
			)));
		}

		Ok(())
	}

	/// Options for the revision history manager
	pub fn revision_options(&self) -> RevisionOptions {
		RevisionOptions::default()
			.with_default_langcode(self.default_langcode.clone())
			.with_date_format(self.date_format.clone())
			.with_revert_translations(self.revert_translations)
	}
}

/// Merges configuration sources by priority
///
/// Sources with equal priority are applied in the order they were added,
/// later ones winning.
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Create a builder with no sources
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merged raw values, lowest priority first
	pub fn merge(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		let mut ordered: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
		ordered.sort_by_key(|s| s.priority());

		let mut merged = IndexMap::new();
		for source in ordered {
			let values = source.load().map_err(|error| SettingsError::Source {
				source_description: source.description(),
				error,
			})?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded settings source"
			);
			merged.extend(values);
		}

		Ok(merged)
	}

	/// Merge, deserialize and validate
	pub fn build(&self) -> Result<EntityToolsSettings, SettingsError> {
		let merged = self.merge()?;
		let settings: EntityToolsSettings =
			serde_json::from_value(Value::Object(merged.into_iter().collect()))?;
		settings.validate()?;
		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_defaults_are_valid() {
		let settings = SettingsBuilder::new()
			.add_source(EntityToolsSettings::defaults())
			.build()
			.unwrap();
		assert_eq!(settings, EntityToolsSettings::default());
	}

	#[rstest]
	fn test_higher_priority_wins_regardless_of_order() {
		struct Fixed(u8, &'static str);
		impl ConfigSource for Fixed {
			fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
				Ok(IndexMap::from([("default_langcode".to_string(), json!(self.1))]))
			}
			fn priority(&self) -> u8 {
				self.0
			}
			fn description(&self) -> String {
				format!("fixed {}", self.1)
			}
		}

		let settings = SettingsBuilder::new()
			.add_source(Fixed(90, "fr"))
			.add_source(Fixed(10, "de"))
			.build()
			.unwrap();
		assert_eq!(settings.default_langcode, "fr");
	}

	#[rstest]
	#[case("default_langcode", json!(""))]
	#[case("date_format", json!(""))]
	#[case("date_format", json!("%Q"))]
	#[case("database_url", json!("postgres://localhost/db"))]
	fn test_validation_errors(#[case] key: &str, #[case] value: Value) {
		let result = SettingsBuilder::new()
			.add_source(EntityToolsSettings::defaults())
			.add_source(DefaultSource::new().with_value(key, value))
			.build();
		assert!(matches!(result, Err(SettingsError::Validation(_))));
	}

	#[rstest]
	fn test_unknown_policy_is_deserialize_error() {
		let result = SettingsBuilder::new()
			.add_source(DefaultSource::new().with_value("revert_translations", json!("all")))
			.build();
		assert!(matches!(result, Err(SettingsError::Deserialize(_))));
	}

	#[rstest]
	fn test_revision_options() {
		let settings = EntityToolsSettings {
			default_langcode: "fr".to_string(),
			date_format: "%d/%m/%Y".to_string(),
			revert_translations: RevertTranslations::DefaultOnly,
			database_url: None,
		};

		let options = settings.revision_options();
		assert_eq!(options.default_langcode, "fr");
		assert_eq!(options.date_format, "%d/%m/%Y");
		assert_eq!(options.revert_translations, RevertTranslations::DefaultOnly);
	}
}
