//! Installed applications
//!
//! Each app contributes its admin registrations through an `admin` module.

pub mod mail;

use mail_admin::{AdminResult, AdminSite};

/// Labels of the apps whose registrations [`register_all`] performs
pub const INSTALLED_APPS: &[&str] = &["mail"];

/// Run the admin registrations of every installed app
pub fn register_all(site: &AdminSite, installed_apps: &[String]) -> AdminResult<()> {
	for app in installed_apps {
		match app.as_str() {
			"mail" => mail::admin::register(site)?,
			other => tracing::warn!(app = other, "installed app has no admin registrations"),
		}
	}
	Ok(())
}
