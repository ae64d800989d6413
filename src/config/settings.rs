//! Layered settings
//!
//! Settings are resolved in priority order (lowest first):
//!
//! 1. built-in defaults
//! 2. a TOML file named by `--settings` or the `MAIL_SETTINGS` variable
//! 3. environment variables prefixed `MAIL_`
//!
//! ```toml
//! debug = true
//! installed_apps = ["mail"]
//!
//! [admin]
//! site_name = "Mail Admin"
//! url_prefix = "/admin/"
//! list_per_page = 100
//!
//! [logging]
//! level = "info"
//! format = "full"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Variable naming the settings file
pub const SETTINGS_ENV: &str = "MAIL_SETTINGS";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "MAIL_";

const MAX_LIST_PER_PAGE: usize = 1000;

/// Error type for loading and validating settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid value for '{key}': {message}")]
	Invalid { key: String, message: String },
}

impl SettingsError {
	fn invalid(key: &str, message: impl Into<String>) -> Self {
		Self::Invalid {
			key: key.to_string(),
			message: message.into(),
		}
	}
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub debug: bool,
	/// Apps whose admin registrations run at startup
	pub installed_apps: Vec<String>,
	pub admin: AdminSettings,
	pub logging: LoggingSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: false,
			installed_apps: crate::apps::INSTALLED_APPS
				.iter()
				.map(|app| app.to_string())
				.collect(),
			admin: AdminSettings::default(),
			logging: LoggingSettings::default(),
		}
	}
}

/// Admin site settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
	pub site_name: String,
	pub url_prefix: String,
	pub list_per_page: usize,
}

impl Default for AdminSettings {
	fn default() -> Self {
		Self {
			site_name: "Mail Admin".to_string(),
			url_prefix: mail_admin::DEFAULT_URL_PREFIX.to_string(),
			list_per_page: mail_admin::DEFAULT_LIST_PER_PAGE,
		}
	}
}

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Full,
	Compact,
}

impl FromStr for LogFormat {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"full" => Ok(Self::Full),
			"compact" => Ok(Self::Compact),
			other => Err(SettingsError::invalid(
				"logging.format",
				format!("unknown format '{}' (expected full or compact)", other),
			)),
		}
	}
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// Filter directive, e.g. `"info"` or `"mail_admin=debug,info"`
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Full,
		}
	}
}

impl Settings {
	/// Resolve settings from every layer and validate the result
	///
	/// `path` takes precedence over `MAIL_SETTINGS`.
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let path = path
			.map(Path::to_path_buf)
			.or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from));

		let mut settings = match path {
			Some(path) => {
				tracing::debug!(path = %path.display(), "loading settings file");
				Self::from_toml_file(&path)?
			}
			None => Self::default(),
		};
		settings.apply_env(std::env::vars())?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
		let text = std::fs::read_to_string(path)?;
		Self::from_toml_str(&text)
	}

	/// Parse a TOML document; missing keys keep their defaults
	pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(text)?)
	}

	/// Apply `MAIL_` overrides from `vars`
	///
	/// Unrecognized `MAIL_` variables are ignored.
	pub fn apply_env<I>(&mut self, vars: I) -> Result<(), SettingsError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			match name {
				"DEBUG" => self.debug = parse_bool(&key, &value)?,
				"INSTALLED_APPS" => {
					self.installed_apps = value
						.split(',')
						.map(str::trim)
						.filter(|app| !app.is_empty())
						.map(str::to_string)
						.collect();
				}
				"ADMIN_SITE_NAME" => self.admin.site_name = value,
				"ADMIN_URL_PREFIX" => self.admin.url_prefix = value,
				"ADMIN_LIST_PER_PAGE" => {
					self.admin.list_per_page = value
						.trim()
						.parse()
						.map_err(|_| SettingsError::invalid(&key, "expected a positive integer"))?;
				}
				"LOG_LEVEL" => self.logging.level = value,
				"LOG_FORMAT" => self.logging.format = value.parse()?,
				_ => {}
			}
		}
		Ok(())
	}

	/// Check value constraints
	pub fn validate(&self) -> Result<(), SettingsError> {
		let prefix = &self.admin.url_prefix;
		if !prefix.starts_with('/') || !prefix.ends_with('/') {
			return Err(SettingsError::invalid(
				"admin.url_prefix",
				"must start and end with '/'",
			));
		}
		if self.admin.site_name.trim().is_empty() {
			return Err(SettingsError::invalid("admin.site_name", "must not be empty"));
		}
		if !(1..=MAX_LIST_PER_PAGE).contains(&self.admin.list_per_page) {
			return Err(SettingsError::invalid(
				"admin.list_per_page",
				format!("must be between 1 and {}", MAX_LIST_PER_PAGE),
			));
		}
		EnvFilter::try_new(&self.logging.level)
			.map_err(|e| SettingsError::invalid("logging.level", e.to_string()))?;
		Ok(())
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(SettingsError::invalid(key, "expected a boolean")),
	}
}
