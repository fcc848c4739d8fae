//! Integration tests for layered settings
//!
//! Environment variables are process-wide, so every test touching them runs
//! serially.

use entity_tools_conf::prelude::*;
use rstest::*;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
	TempDir::new().expect("Failed to create temporary directory")
}

fn clear_env() {
	unsafe {
		env::remove_var("ENTITY_TOOLS_DEFAULT_LANGCODE");
		env::remove_var("ENTITY_TOOLS_DATE_FORMAT");
		env::remove_var("ENTITY_TOOLS_REVERT_TRANSLATIONS");
		env::remove_var("ENTITY_TOOLS_DATABASE_URL");
	}
}

#[rstest]
#[serial(env)]
fn test_load_without_file_uses_defaults() {
	clear_env();

	let settings = EntityToolsSettings::load(None).unwrap();

	assert_eq!(settings, EntityToolsSettings::default());
	assert_eq!(settings.revision_options(), RevisionOptions::default());
}

#[rstest]
#[serial(env)]
fn test_file_overrides_defaults(temp_dir: TempDir) {
	clear_env();
	let path = temp_dir.path().join("entity_tools.toml");
	fs::write(
		&path,
		r#"
default_langcode = "fr"
date_format = "%d/%m/%Y"
revert_translations = "default_only"
database_url = "sqlite://content.db"
"#,
	)
	.unwrap();

	let settings = EntityToolsSettings::load(Some(path.as_path())).unwrap();

	assert_eq!(settings.default_langcode, "fr");
	assert_eq!(settings.date_format, "%d/%m/%Y");
	assert_eq!(settings.revert_translations, RevertTranslations::DefaultOnly);
	assert_eq!(settings.database_url.as_deref(), Some("sqlite://content.db"));
}

#[rstest]
#[serial(env)]
fn test_environment_overrides_file(temp_dir: TempDir) {
	clear_env();
	let path = temp_dir.path().join("entity_tools.toml");
	fs::write(&path, "default_langcode = \"fr\"\n").unwrap();

	unsafe {
		env::set_var("ENTITY_TOOLS_DEFAULT_LANGCODE", "de");
	}
	let settings = EntityToolsSettings::load(Some(path.as_path()));
	clear_env();

	assert_eq!(settings.unwrap().default_langcode, "de");
}

#[rstest]
#[serial(env)]
fn test_invalid_environment_value_is_rejected() {
	clear_env();
	unsafe {
		env::set_var("ENTITY_TOOLS_DATE_FORMAT", "");
	}
	let result = EntityToolsSettings::load(None);
	clear_env();

	assert!(matches!(result, Err(SettingsError::Validation(_))));
}

#[rstest]
#[serial(env)]
fn test_broken_file_names_source(temp_dir: TempDir) {
	clear_env();
	let path = temp_dir.path().join("entity_tools.toml");
	fs::write(&path, "date_format = [").unwrap();

	let error = EntityToolsSettings::load(Some(path.as_path())).unwrap_err();

	match error {
		SettingsError::Source {
			source_description,
			error: SourceError::Toml(_),
		} => assert!(source_description.contains("entity_tools.toml")),
		other => panic!("unexpected error: {}", other),
	}
}
