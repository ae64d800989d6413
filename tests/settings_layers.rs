//! Settings resolution across defaults, file and environment

use mail::config::{LogFormat, Settings, SettingsError, configure_admin};
use rstest::rstest;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const VARS: &[&str] = &[
	"MAIL_SETTINGS",
	"MAIL_DEBUG",
	"MAIL_INSTALLED_APPS",
	"MAIL_ADMIN_SITE_NAME",
	"MAIL_ADMIN_URL_PREFIX",
	"MAIL_ADMIN_LIST_PER_PAGE",
	"MAIL_LOG_LEVEL",
	"MAIL_LOG_FORMAT",
];

fn clear_env() {
	for var in VARS {
		// SAFETY: every test in this file is #[serial]
		unsafe { std::env::remove_var(var) };
	}
}

fn settings_file(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[rstest]
#[serial]
fn test_load_without_sources_uses_defaults() {
	// Arrange
	clear_env();

	// Act
	let settings = Settings::load(None).unwrap();

	// Assert
	assert_eq!(settings, Settings::default());
}

#[rstest]
#[serial]
fn test_environment_overrides_file() {
	// Arrange
	clear_env();
	let file = settings_file(
		r#"
		[admin]
		site_name = "From File"
		list_per_page = 50

		[logging]
		format = "compact"
		"#,
	);
	unsafe { std::env::set_var("MAIL_ADMIN_SITE_NAME", "From Env") };

	// Act
	let settings = Settings::load(Some(file.path()));
	clear_env();

	// Assert
	let settings = settings.unwrap();
	assert_eq!(settings.admin.site_name, "From Env");
	assert_eq!(settings.admin.list_per_page, 50);
	assert_eq!(settings.logging.format, LogFormat::Compact);
}

#[rstest]
#[serial]
fn test_settings_file_from_environment() {
	// Arrange
	clear_env();
	let file = settings_file("[admin]\nurl_prefix = \"/staff/\"\n");
	unsafe { std::env::set_var("MAIL_SETTINGS", file.path()) };

	// Act
	let settings = Settings::load(None);
	clear_env();

	// Assert
	let site = configure_admin(&settings.unwrap()).unwrap();
	assert_eq!(site.url_prefix(), "/staff/");
	assert_eq!(site.len(), 2);
}

#[rstest]
#[serial]
fn test_invalid_layer_is_rejected() {
	// Arrange
	clear_env();
	unsafe { std::env::set_var("MAIL_ADMIN_URL_PREFIX", "admin") };

	// Act
	let result = Settings::load(None);
	clear_env();

	// Assert
	assert!(matches!(result, Err(SettingsError::Invalid { key, .. }) if key == "admin.url_prefix"));
}

#[rstest]
#[serial]
fn test_missing_file_is_io_error() {
	// Arrange
	clear_env();
	let dir = tempfile::tempdir().unwrap();

	// Act
	let result = Settings::load(Some(&dir.path().join("absent.toml")));

	// Assert
	assert!(matches!(result, Err(SettingsError::Io(_))));
}
