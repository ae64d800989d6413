//! Admin registrations of the mail app
//!
//! The active user entity gets the full-featured built-in [`UserAdmin`]; the
//! Email entity gets the default controller, exposing all of its fields
//! without customization.

use mail_admin::{AdminResult, AdminSite, ModelAdminConfig, UserAdmin};
use mail_models::{ActiveUser, Email};

/// Register the app's entities with `site`
///
/// Not idempotent: a second call on the same site fails with
/// [`AdminError::AlreadyRegistered`](mail_admin::AdminError::AlreadyRegistered).
pub fn register(site: &AdminSite) -> AdminResult<()> {
	site.register::<ActiveUser>(UserAdmin::new())?;
	site.register::<Email>(ModelAdminConfig::for_model::<Email>())?;
	Ok(())
}
