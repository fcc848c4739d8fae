//! Configuration sources for layered settings
//!
//! Sources are merged in priority order: environment variables > TOML file >
//! defaults.

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Prefix of the environment variables read by [`EnvSource::default`]
pub const ENV_PREFIX: &str = "ENTITY_TOOLS_";

/// A source of configuration values
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Priority of this source (higher wins)
	fn priority(&self) -> u8;

	/// Human-readable description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	/// File could not be read
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Content has the wrong shape
	#[error("Parse error: {0}")]
	Parse(String),

	/// TOML syntax error
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// JSON conversion error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Environment variable configuration source
///
/// Only variables starting with the prefix are read. The prefix is stripped
/// and the rest lowercased, so `ENTITY_TOOLS_DATE_FORMAT` becomes
/// `date_format`. Values stay strings.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	/// Read variables with the given prefix
	///
	/// # Examples
	///
	/// ```
	/// use entity_tools_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::new("MYAPP_");
	/// assert_eq!(source.priority(), 100);
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new(ENV_PREFIX)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			if stripped.is_empty() {
				continue;
			}
			config.insert(stripped.to_lowercase(), Value::String(value));
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// TOML file configuration source
///
/// A missing file yields no values.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Read the given file
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		let Value::Object(map) = json_value else {
			return Err(SourceError::Parse("Expected table at root".to_string()));
		};

		Ok(map.into_iter().collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Default values configuration source
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	/// Create an empty default source
	pub fn new() -> Self {
		Self {
			values: IndexMap::new(),
		}
	}

	/// Add a default value
	///
	/// # Examples
	///
	/// ```
	/// use entity_tools_conf::sources::{ConfigSource, DefaultSource};
	/// use serde_json::json;
	///
	/// let source = DefaultSource::new().with_value("default_langcode", json!("fr"));
	/// assert_eq!(source.load().unwrap()["default_langcode"], json!("fr"));
	/// ```
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl Default for DefaultSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::env;
	use tempfile::TempDir;

	#[rstest]
	fn test_source_priority() {
		assert_eq!(EnvSource::default().priority(), 100);
		assert_eq!(TomlFileSource::new("entity_tools.toml").priority(), 50);
		assert_eq!(DefaultSource::new().priority(), 0);
	}

	#[rstest]
	fn test_missing_toml_file_is_empty() {
		let dir = TempDir::new().unwrap();
		let source = TomlFileSource::new(dir.path().join("missing.toml"));
		assert!(source.load().unwrap().is_empty());
	}

	#[rstest]
	fn test_toml_file_values() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("entity_tools.toml");
		fs::write(&path, "default_langcode = \"de\"\nrevert_translations = \"default_only\"\n")
			.unwrap();

		let values = TomlFileSource::new(&path).load().unwrap();
		assert_eq!(values["default_langcode"], Value::String("de".into()));
		assert_eq!(values["revert_translations"], Value::String("default_only".into()));
	}

	#[rstest]
	fn test_invalid_toml_is_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("broken.toml");
		fs::write(&path, "default_langcode = ").unwrap();

		let result = TomlFileSource::new(&path).load();
		assert!(matches!(result, Err(SourceError::Toml(_))));
	}

	#[rstest]
	#[serial(env)]
	fn test_env_source_strips_prefix() {
		unsafe {
			env::set_var("ENTITY_TOOLS_TEST_DATE_FORMAT", "%Y");
			env::set_var("OTHER_TEST_DATE_FORMAT", "%m");
		}

		let values = EnvSource::new("ENTITY_TOOLS_TEST_").load().unwrap();

		unsafe {
			env::remove_var("ENTITY_TOOLS_TEST_DATE_FORMAT");
			env::remove_var("OTHER_TEST_DATE_FORMAT");
		}

		assert_eq!(values.len(), 1);
		assert_eq!(values["date_format"], Value::String("%Y".into()));
	}
}
