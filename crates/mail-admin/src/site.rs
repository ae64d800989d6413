//! Admin site: the registry pairing entity types with their controllers
//!
//! An [`AdminSite`] is an ordinary value built during application wiring and
//! handed to the [`AdminRouter`](crate::AdminRouter). Registration takes `&self`
//! so a site already shared behind an `Arc` can still be populated.

use crate::model_admin::ModelAdmin;
use crate::{AdminError, AdminResult};
use mail_models::{Model, ModelId, ModelMeta, ModelResult, Record};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Default URL prefix for admin views
pub const DEFAULT_URL_PREFIX: &str = "/admin/";

/// Default number of rows per change-list page
pub const DEFAULT_LIST_PER_PAGE: usize = 100;

type NormalizeFn = fn(Record) -> ModelResult<Record>;

/// One entity/controller pairing
#[derive(Clone)]
pub struct Registration {
	meta: &'static ModelMeta,
	admin: Arc<dyn ModelAdmin>,
	normalize: NormalizeFn,
}

impl Registration {
	pub fn meta(&self) -> &'static ModelMeta {
		self.meta
	}

	pub fn admin(&self) -> &Arc<dyn ModelAdmin> {
		&self.admin
	}

	/// Round-trip a record through the entity type, filling defaults and
	/// rejecting values of the wrong shape
	pub fn normalize(&self, record: Record) -> ModelResult<Record> {
		(self.normalize)(record)
	}
}

impl std::fmt::Debug for Registration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registration")
			.field("model", &self.meta.qualified_name())
			.field("admin_class", &self.admin.admin_class())
			.finish()
	}
}

fn normalize_record<M: Model>(record: Record) -> ModelResult<Record> {
	M::from_record(record)?.to_record()
}

/// Admin site holding every registration
///
/// # Examples
///
/// ```
/// use mail_admin::{AdminSite, ModelAdminConfig};
/// use mail_models::Email;
///
/// let site = AdminSite::new("Mail Admin");
/// site.register::<Email>(ModelAdminConfig::for_model::<Email>()).unwrap();
///
/// assert!(site.is_registered::<Email>());
/// assert!(site.register::<Email>(ModelAdminConfig::for_model::<Email>()).is_err());
/// ```
pub struct AdminSite {
	name: String,
	url_prefix: String,
	list_per_page: usize,
	registry: RwLock<HashMap<ModelId, Registration>>,
}

impl AdminSite {
	/// Create an empty site
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			url_prefix: DEFAULT_URL_PREFIX.to_string(),
			list_per_page: DEFAULT_LIST_PER_PAGE,
			registry: RwLock::new(HashMap::new()),
		}
	}

	/// Set the URL prefix admin views are served under
	pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.url_prefix = prefix.into();
		self
	}

	/// Set the site-wide default page size
	pub fn with_list_per_page(mut self, count: usize) -> Self {
		self.list_per_page = count;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn url_prefix(&self) -> &str {
		&self.url_prefix
	}

	pub fn list_per_page(&self) -> usize {
		self.list_per_page
	}

	/// Register a controller for the entity type `M`
	///
	/// # Errors
	///
	/// - [`AdminError::AlreadyRegistered`] if `M` already has a controller
	/// - [`AdminError::ValidationError`] if the controller governs a different
	///   model or names fields `M` does not have
	pub fn register<M: Model>(&self, admin: impl ModelAdmin + 'static) -> AdminResult<()> {
		self.register_arc::<M>(Arc::new(admin))
	}

	/// Register an already shared controller for the entity type `M`
	pub fn register_arc<M: Model>(&self, admin: Arc<dyn ModelAdmin>) -> AdminResult<()> {
		let meta = M::meta();
		if admin.model_meta() != meta {
			return Err(AdminError::ValidationError(format!(
				"{} governs {}, not {}",
				admin.admin_class(),
				admin.model_meta().qualified_name(),
				meta.qualified_name()
			)));
		}
		admin.check()?;

		let mut registry = self.registry.write();
		let id = meta.model_id();
		if registry.contains_key(&id) {
			tracing::error!(
				model = %meta.qualified_name(),
				site = %self.name,
				"duplicate admin registration"
			);
			return Err(AdminError::AlreadyRegistered(meta.qualified_name()));
		}

		tracing::info!(
			model = %meta.qualified_name(),
			admin_class = admin.admin_class(),
			site = %self.name,
			"registered model admin"
		);
		registry.insert(
			id,
			Registration {
				meta,
				admin,
				normalize: normalize_record::<M>,
			},
		);
		Ok(())
	}

	/// Remove the controller for `M`
	pub fn unregister<M: Model>(&self) -> AdminResult<()> {
		let meta = M::meta();
		match self.registry.write().remove(&meta.model_id()) {
			Some(_) => Ok(()),
			None => Err(AdminError::NotRegistered(meta.qualified_name())),
		}
	}

	pub fn is_registered<M: Model>(&self) -> bool {
		self.registry.read().contains_key(&M::meta().model_id())
	}

	/// Full registration for an entity
	pub fn registration(&self, id: &ModelId) -> AdminResult<Registration> {
		self.registry
			.read()
			.get(id)
			.cloned()
			.ok_or_else(|| AdminError::NotRegistered(id.to_string()))
	}

	/// Get the controller for an entity
	pub fn get_model_admin(&self, id: &ModelId) -> AdminResult<Arc<dyn ModelAdmin>> {
		self.registration(id).map(|r| r.admin)
	}

	/// Resolve URL segments such as `("mail", "email")` to a registration
	pub fn find_by_name(&self, app_label: &str, model_name: &str) -> AdminResult<Registration> {
		self.registration(&ModelId::new(app_label, model_name))
	}

	/// Metadata of every registered entity, sorted by app label then model name
	pub fn registered_models(&self) -> Vec<&'static ModelMeta> {
		let mut models: Vec<_> = self.registry.read().values().map(|r| r.meta).collect();
		models.sort_by_key(|meta| meta.model_id());
		models
	}

	/// Every registration, in the same order as [`registered_models`](Self::registered_models)
	pub fn registrations(&self) -> Vec<Registration> {
		let mut registrations: Vec<_> = self.registry.read().values().cloned().collect();
		registrations.sort_by_key(|r| r.meta.model_id());
		registrations
	}

	pub fn len(&self) -> usize {
		self.registry.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.registry.read().is_empty()
	}
}
