//! Model admin configuration and trait
//!
//! This module defines how models are displayed and managed in the admin interface.

use crate::{AdminError, AdminResult};
use async_trait::async_trait;
use mail_models::{Model, ModelMeta, PermissionsMixin, Record};
use serde::Serialize;
use std::any::Any;

/// Pseudo-field rendering the object's string representation in list views
pub const STR_FIELD: &str = "__str__";

/// A named group of fields on the change form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fieldset {
	pub name: Option<String>,
	pub fields: Vec<String>,
}

impl Fieldset {
	pub fn new(name: Option<&str>, fields: Vec<impl Into<String>>) -> Self {
		Self {
			name: name.map(str::to_string),
			fields: fields.into_iter().map(Into::into).collect(),
		}
	}
}

/// Trait for configuring model administration
///
/// Implement this trait to customize how a model is displayed and edited in the admin.
/// Only [`model_meta`](ModelAdmin::model_meta), [`admin_class`](ModelAdmin::admin_class)
/// and [`as_any`](ModelAdmin::as_any) are required; every other method has the
/// no-customization default.
#[async_trait]
pub trait ModelAdmin: Send + Sync {
	/// Metadata of the entity this controller governs
	fn model_meta(&self) -> &'static ModelMeta;

	/// Name of the controller class, used to verify registrations
	fn admin_class(&self) -> &'static str;

	/// Access to the concrete controller for downcasting
	fn as_any(&self) -> &dyn Any;

	/// Fields to display in list view
	fn list_display(&self) -> Vec<&str> {
		vec![STR_FIELD]
	}

	/// Columns linking to the change form (defaults to the first displayed column)
	fn list_display_links(&self) -> Vec<&str> {
		self.list_display().into_iter().take(1).collect()
	}

	/// Fields that can be used for filtering
	fn list_filter(&self) -> Vec<&str> {
		vec![]
	}

	/// Fields that can be searched
	fn search_fields(&self) -> Vec<&str> {
		vec![]
	}

	/// Ordering for list view (prefix with "-" for descending)
	///
	/// Empty means descending primary key.
	fn ordering(&self) -> Vec<&str> {
		vec![]
	}

	/// Number of items per page (None = use site default)
	fn list_per_page(&self) -> Option<usize> {
		None
	}

	/// Fields to display in forms (None = all editable fields)
	fn fields(&self) -> Option<Vec<&str>> {
		None
	}

	/// Fields left out of the generated form
	fn exclude(&self) -> Vec<&str> {
		vec![]
	}

	/// Read-only fields
	fn readonly_fields(&self) -> Vec<&str> {
		vec![]
	}

	/// Many-valued fields rendered with a two-pane selector
	fn filter_horizontal(&self) -> Vec<&str> {
		vec![]
	}

	/// Field groups on the change form
	fn fieldsets(&self) -> Vec<Fieldset> {
		let exclude = self.exclude();
		let fields: Vec<&str> = match self.fields() {
			Some(fields) => fields,
			None => self
				.model_meta()
				.editable_fields()
				.map(|f| f.name)
				.collect(),
		};
		let fields: Vec<&str> = fields
			.into_iter()
			.filter(|f| !exclude.contains(f))
			.collect();
		vec![Fieldset::new(None, fields)]
	}

	/// Field groups on the add form
	fn add_fieldsets(&self) -> Vec<Fieldset> {
		self.fieldsets()
	}

	/// Adjust submitted form data before it is cleaned and saved
	///
	/// `change` is false for the add form.
	fn prepare_submission(&self, _data: &mut Record, _change: bool) -> AdminResult<()> {
		Ok(())
	}

	/// Permission string for an action, e.g. `"mail.view_email"`
	fn permission_codename(&self, action: &str) -> String {
		let meta = self.model_meta();
		format!(
			"{}.{}_{}",
			meta.app_label,
			action,
			meta.model_name.to_lowercase()
		)
	}

	/// Check if user has permission to view this model
	///
	/// Change permission implies view permission.
	async fn has_view_permission(&self, user: &dyn PermissionsMixin) -> bool {
		user.has_perm(&self.permission_codename("view"))
			|| user.has_perm(&self.permission_codename("change"))
	}

	/// Check if user has permission to add instances
	async fn has_add_permission(&self, user: &dyn PermissionsMixin) -> bool {
		user.has_perm(&self.permission_codename("add"))
	}

	/// Check if user has permission to change instances
	async fn has_change_permission(&self, user: &dyn PermissionsMixin) -> bool {
		user.has_perm(&self.permission_codename("change"))
	}

	/// Check if user has permission to delete instances
	async fn has_delete_permission(&self, user: &dyn PermissionsMixin) -> bool {
		user.has_perm(&self.permission_codename("delete"))
	}

	/// Check if the model's app appears on the dashboard for this user
	async fn has_module_permission(&self, user: &dyn PermissionsMixin) -> bool {
		user.has_module_perms(self.model_meta().app_label)
	}

	/// Validate every configured field name against the model
	fn check(&self) -> AdminResult<()> {
		let meta = self.model_meta();
		let mut unknown = Vec::new();

		let mut named: Vec<&str> = Vec::new();
		named.extend(self.list_display().into_iter().filter(|f| *f != STR_FIELD));
		named.extend(self.list_filter());
		named.extend(self.search_fields());
		named.extend(self.readonly_fields());
		named.extend(self.filter_horizontal());
		named.extend(self.exclude());
		named.extend(self.ordering().into_iter().map(|f| f.trim_start_matches('-')));
		if let Some(fields) = self.fields() {
			named.extend(fields);
		}

		for field in named {
			if !meta.has_field(field) && !unknown.contains(&field.to_string()) {
				unknown.push(field.to_string());
			}
		}
		for fieldset in self.fieldsets() {
			for field in fieldset.fields {
				if !meta.has_field(&field) && !unknown.contains(&field) {
					unknown.push(field);
				}
			}
		}

		if unknown.is_empty() {
			Ok(())
		} else {
			Err(AdminError::ValidationError(format!(
				"{} admin refers to unknown fields: {}",
				meta.qualified_name(),
				unknown.join(", ")
			)))
		}
	}
}

/// Configuration-based model admin implementation
///
/// The no-override default controller: created with [`ModelAdminConfig::for_model`]
/// it exposes every model field without customization. The builder covers the
/// cases that need list or form options.
///
/// # Examples
///
/// ```
/// use mail_admin::{ModelAdmin, ModelAdminConfig};
/// use mail_models::Email;
///
/// let admin = ModelAdminConfig::for_model::<Email>();
/// assert_eq!(admin.admin_class(), "ModelAdmin");
/// assert_eq!(admin.list_display(), vec!["__str__"]);
/// assert!(admin.fields().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ModelAdminConfig {
	model: &'static ModelMeta,
	list_display: Vec<String>,
	list_filter: Vec<String>,
	search_fields: Vec<String>,
	fields: Option<Vec<String>>,
	readonly_fields: Vec<String>,
	ordering: Vec<String>,
	list_per_page: Option<usize>,
}

impl ModelAdminConfig {
	/// Default controller for `M`
	pub fn for_model<M: Model>() -> Self {
		Self::from_meta(M::meta())
	}

	fn from_meta(model: &'static ModelMeta) -> Self {
		Self {
			model,
			list_display: vec![STR_FIELD.into()],
			list_filter: vec![],
			search_fields: vec![],
			fields: None,
			readonly_fields: vec![],
			ordering: vec![],
			list_per_page: None,
		}
	}

	/// Create a builder for model admin configuration
	pub fn builder() -> ModelAdminConfigBuilder {
		ModelAdminConfigBuilder::default()
	}

	/// Set list display fields
	pub fn with_list_display(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.list_display = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Set list filter fields
	pub fn with_list_filter(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.list_filter = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Set search fields
	pub fn with_search_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.search_fields = fields.into_iter().map(Into::into).collect();
		self
	}
}

impl ModelAdmin for ModelAdminConfig {
	fn model_meta(&self) -> &'static ModelMeta {
		self.model
	}

	fn admin_class(&self) -> &'static str {
		"ModelAdmin"
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn list_display(&self) -> Vec<&str> {
		self.list_display.iter().map(|s| s.as_str()).collect()
	}

	fn list_filter(&self) -> Vec<&str> {
		self.list_filter.iter().map(|s| s.as_str()).collect()
	}

	fn search_fields(&self) -> Vec<&str> {
		self.search_fields.iter().map(|s| s.as_str()).collect()
	}

	fn fields(&self) -> Option<Vec<&str>> {
		self.fields
			.as_ref()
			.map(|fields| fields.iter().map(|s| s.as_str()).collect())
	}

	fn readonly_fields(&self) -> Vec<&str> {
		self.readonly_fields.iter().map(|s| s.as_str()).collect()
	}

	fn ordering(&self) -> Vec<&str> {
		self.ordering.iter().map(|s| s.as_str()).collect()
	}

	fn list_per_page(&self) -> Option<usize> {
		self.list_per_page
	}
}

/// Builder for ModelAdminConfig
#[derive(Debug, Default)]
pub struct ModelAdminConfigBuilder {
	model: Option<&'static ModelMeta>,
	list_display: Option<Vec<String>>,
	list_filter: Option<Vec<String>>,
	search_fields: Option<Vec<String>>,
	fields: Option<Vec<String>>,
	readonly_fields: Option<Vec<String>>,
	ordering: Option<Vec<String>>,
	list_per_page: Option<usize>,
}

impl ModelAdminConfigBuilder {
	/// Set the governed model
	pub fn model<M: Model>(mut self) -> Self {
		self.model = Some(M::meta());
		self
	}

	/// Set list display fields
	pub fn list_display(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.list_display = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set list filter fields
	pub fn list_filter(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.list_filter = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set search fields
	pub fn search_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.search_fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set form fields
	pub fn fields(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set readonly fields
	pub fn readonly_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.readonly_fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set ordering
	pub fn ordering(mut self, fields: Vec<impl Into<String>>) -> Self {
		self.ordering = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Set items per page
	pub fn list_per_page(mut self, count: usize) -> Self {
		self.list_per_page = Some(count);
		self
	}

	/// Build the configuration
	///
	/// # Errors
	///
	/// Returns [`AdminError::ValidationError`] if no model was set or a
	/// page size of zero was requested.
	pub fn build(self) -> AdminResult<ModelAdminConfig> {
		let model = self
			.model
			.ok_or_else(|| AdminError::ValidationError("model is required".to_string()))?;
		if self.list_per_page == Some(0) {
			return Err(AdminError::ValidationError(
				"list_per_page must be greater than zero".to_string(),
			));
		}

		let defaults = ModelAdminConfig::from_meta(model);
		Ok(ModelAdminConfig {
			model,
			list_display: self.list_display.unwrap_or(defaults.list_display),
			list_filter: self.list_filter.unwrap_or_default(),
			search_fields: self.search_fields.unwrap_or_default(),
			fields: self.fields,
			readonly_fields: self.readonly_fields.unwrap_or_default(),
			ordering: self.ordering.unwrap_or_default(),
			list_per_page: self.list_per_page,
		})
	}
}
