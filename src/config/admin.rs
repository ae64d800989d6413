//! Admin site construction

use super::settings::Settings;
use crate::apps;
use mail_admin::{AdminResult, AdminSite};

/// Build the admin site and run every installed app's registrations
///
/// A duplicate registration is returned as an error; callers treat it as
/// fatal at startup.
pub fn configure_admin(settings: &Settings) -> AdminResult<AdminSite> {
	let site = AdminSite::new(settings.admin.site_name.as_str())
		.with_url_prefix(settings.admin.url_prefix.as_str())
		.with_list_per_page(settings.admin.list_per_page);

	apps::register_all(&site, &settings.installed_apps)?;

	tracing::info!(
		site = %site.name(),
		url_prefix = %site.url_prefix(),
		models = site.len(),
		"admin site configured"
	);
	Ok(site)
}
