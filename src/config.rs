//! Application configuration
//!
//! - **settings**: layered [`Settings`] (defaults, TOML file, `MAIL_` environment)
//! - **admin**: builds the [`AdminSite`](mail_admin::AdminSite) from settings
//! - **logging**: `tracing` subscriber setup

pub mod admin;
pub mod logging;
pub mod settings;

pub use admin::configure_admin;
pub use logging::init_logging;
pub use settings::{AdminSettings, LogFormat, LoggingSettings, Settings, SettingsError};
