//! Admin URL resolution and request dispatch
//!
//! Paths follow the usual admin layout under the site's URL prefix:
//!
//! - `/admin/` - dashboard
//! - `/admin/{app}/{model}/` - change list
//! - `/admin/{app}/{model}/add/` - add form
//! - `/admin/{app}/{model}/{pk}/change/` - change form (`{pk}/` alone also resolves)
//! - `/admin/{app}/{model}/{pk}/delete/` - delete confirmation

use crate::database::AdminDatabase;
use crate::site::{AdminSite, Registration};
use crate::views::{
	ChangeForm, ChangeList, Dashboard, ListParams, check_unique, clean_submission, object_repr,
};
use crate::{AdminError, AdminResult};
use mail_models::{ModelId, PermissionsMixin, Record};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// HTTP method of an admin request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
	Get,
	Post,
}

/// A resolved admin URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRoute {
	Index,
	ChangeList(ModelId),
	Add(ModelId),
	Change(ModelId, i64),
	Delete(ModelId, i64),
}

/// An incoming admin request
#[derive(Debug, Clone)]
pub struct AdminRequest {
	pub method: Method,
	pub path: String,
	pub query: ListParams,
	/// Submitted form data for POST requests
	pub data: Record,
}

impl AdminRequest {
	pub fn get(path: impl Into<String>) -> Self {
		Self {
			method: Method::Get,
			path: path.into(),
			query: ListParams::default(),
			data: Record::new(),
		}
	}

	pub fn post(path: impl Into<String>, data: Record) -> Self {
		Self {
			method: Method::Post,
			path: path.into(),
			query: ListParams::default(),
			data,
		}
	}

	pub fn with_query(mut self, query: ListParams) -> Self {
		self.query = query;
		self
	}
}

/// Result of a dispatched admin request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum AdminResponse {
	Dashboard(Dashboard),
	ChangeList(ChangeList),
	ChangeForm(ChangeForm),
	Saved { model: String, pk: i64, created: bool },
	DeleteConfirmation { model: String, pk: i64, object_repr: String },
	Deleted { model: String, pk: i64 },
}

/// Routes admin requests to views, enforcing permissions
pub struct AdminRouter {
	site: Arc<AdminSite>,
	db: Arc<dyn AdminDatabase>,
}

impl std::fmt::Debug for AdminRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AdminRouter")
			.field("site_name", &self.site.name())
			.field("url_prefix", &self.site.url_prefix())
			.finish()
	}
}

impl AdminRouter {
	pub fn new(site: Arc<AdminSite>, db: Arc<dyn AdminDatabase>) -> Self {
		Self { site, db }
	}

	pub fn site(&self) -> &Arc<AdminSite> {
		&self.site
	}

	/// Resolve a path to a route
	///
	/// # Errors
	///
	/// - [`AdminError::InvalidRoute`] for paths outside the prefix, unknown
	///   actions or malformed primary keys
	/// - [`AdminError::NotRegistered`] when the path names an entity without a
	///   controller
	pub fn resolve(&self, path: &str) -> AdminResult<AdminRoute> {
		let prefix = self.site.url_prefix().trim_end_matches('/');
		let rest = path
			.strip_prefix(prefix)
			.filter(|rest| rest.is_empty() || rest.starts_with('/'))
			.ok_or_else(|| AdminError::InvalidRoute(path.to_string()))?;
		let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

		let (app_label, model_name, tail) = match segments.as_slice() {
			[] => return Ok(AdminRoute::Index),
			[app, model, tail @ ..] => (*app, *model, tail),
			_ => return Err(AdminError::InvalidRoute(path.to_string())),
		};
		let id = self.site.find_by_name(app_label, model_name)?.meta().model_id();

		let parse_pk = |raw: &str| {
			raw.parse::<i64>()
				.map_err(|_| AdminError::InvalidRoute(path.to_string()))
		};
		match tail {
			[] => Ok(AdminRoute::ChangeList(id)),
			["add"] => Ok(AdminRoute::Add(id)),
			[pk] | [pk, "change"] => Ok(AdminRoute::Change(id, parse_pk(*pk)?)),
			[pk, "delete"] => Ok(AdminRoute::Delete(id, parse_pk(*pk)?)),
			_ => Err(AdminError::InvalidRoute(path.to_string())),
		}
	}

	/// Handle a request on behalf of `user`
	///
	/// Only active staff members reach any view; each view then checks the
	/// controller's permission for its action.
	pub async fn dispatch(
		&self,
		user: &dyn PermissionsMixin,
		request: &AdminRequest,
	) -> AdminResult<AdminResponse> {
		if !user.is_active() || !user.is_staff() {
			tracing::warn!(path = %request.path, "non-staff admin access rejected");
			return Err(AdminError::PermissionDenied(
				"staff access required".to_string(),
			));
		}

		let route = self.resolve(&request.path)?;
		tracing::debug!(?route, method = ?request.method, "dispatching admin request");

		match (route, request.method) {
			(AdminRoute::Index, Method::Get) => Ok(AdminResponse::Dashboard(
				Dashboard::build(&self.site, user).await,
			)),
			(AdminRoute::ChangeList(id), Method::Get) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_view_permission(user).await;
				require(allowed, "view", &registration)?;

				let meta = registration.meta();
				let records = self.db.list(meta.table_name).await?;
				let list = ChangeList::build(
					meta,
					registration.admin().as_ref(),
					records,
					&request.query,
					self.site.list_per_page(),
				)?;
				Ok(AdminResponse::ChangeList(list))
			}
			(AdminRoute::Add(id), Method::Get) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_add_permission(user).await;
				require(allowed, "add", &registration)?;

				Ok(AdminResponse::ChangeForm(ChangeForm::build(
					registration.meta(),
					registration.admin().as_ref(),
					None,
				)))
			}
			(AdminRoute::Add(id), Method::Post) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_add_permission(user).await;
				require(allowed, "add", &registration)?;
				self.create(&registration, request.data.clone()).await
			}
			(AdminRoute::Change(id, pk), Method::Get) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_view_permission(user).await;
				require(allowed, "view", &registration)?;

				let record = self.fetch(&registration, pk).await?;
				Ok(AdminResponse::ChangeForm(ChangeForm::build(
					registration.meta(),
					registration.admin().as_ref(),
					Some(&record),
				)))
			}
			(AdminRoute::Change(id, pk), Method::Post) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_change_permission(user).await;
				require(allowed, "change", &registration)?;
				self.update(&registration, pk, request.data.clone()).await
			}
			(AdminRoute::Delete(id, pk), Method::Get) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_delete_permission(user).await;
				require(allowed, "delete", &registration)?;

				let record = self.fetch(&registration, pk).await?;
				Ok(AdminResponse::DeleteConfirmation {
					model: registration.meta().qualified_name(),
					pk,
					object_repr: object_repr(registration.meta(), &record),
				})
			}
			(AdminRoute::Delete(id, pk), Method::Post) => {
				let registration = self.site.registration(&id)?;
				let allowed = registration.admin().has_delete_permission(user).await;
				require(allowed, "delete", &registration)?;

				let meta = registration.meta();
				if !self.db.delete(meta.table_name, pk).await? {
					return Err(not_found(&registration, pk));
				}
				tracing::info!(model = %meta.qualified_name(), pk, "deleted object");
				Ok(AdminResponse::Deleted {
					model: meta.qualified_name(),
					pk,
				})
			}
			(_, method) => Err(AdminError::InvalidRoute(format!(
				"{:?} not allowed on {}",
				method, request.path
			))),
		}
	}

	async fn fetch(&self, registration: &Registration, pk: i64) -> AdminResult<Record> {
		self.db
			.get(registration.meta().table_name, pk)
			.await?
			.ok_or_else(|| not_found(registration, pk))
	}

	async fn create(&self, registration: &Registration, data: Record) -> AdminResult<AdminResponse> {
		let meta = registration.meta();
		let cleaned = clean_submission(meta, registration.admin().as_ref(), data, None)?;
		let mut record = registration.normalize(cleaned)?;
		record.remove(meta.pk_field);
		self.check_unique(registration, &record).await?;

		let pk = self.db.insert(meta.table_name, meta.pk_field, record).await?;
		tracing::info!(model = %meta.qualified_name(), pk, "created object");
		Ok(AdminResponse::Saved {
			model: meta.qualified_name(),
			pk,
			created: true,
		})
	}

	async fn check_unique(&self, registration: &Registration, record: &Record) -> AdminResult<()> {
		let meta = registration.meta();
		if meta.unique_fields().next().is_none() {
			return Ok(());
		}
		let rows = self.db.list(meta.table_name).await?;
		check_unique(meta, record, &rows)
	}

	async fn update(
		&self,
		registration: &Registration,
		pk: i64,
		data: Record,
	) -> AdminResult<AdminResponse> {
		let meta = registration.meta();
		let existing = self.fetch(registration, pk).await?;
		let cleaned = clean_submission(meta, registration.admin().as_ref(), data, Some(existing))?;
		let mut record = registration.normalize(cleaned)?;
		record.insert(meta.pk_field.to_string(), Value::from(pk));
		self.check_unique(registration, &record).await?;

		self.db.update(meta.table_name, pk, record).await?;
		tracing::info!(model = %meta.qualified_name(), pk, "changed object");
		Ok(AdminResponse::Saved {
			model: meta.qualified_name(),
			pk,
			created: false,
		})
	}
}

fn require(allowed: bool, action: &str, registration: &Registration) -> AdminResult<()> {
	if allowed {
		return Ok(());
	}
	let codename = registration.admin().permission_codename(action);
	tracing::warn!(permission = %codename, "admin permission denied");
	Err(AdminError::PermissionDenied(codename))
}

fn not_found(registration: &Registration, pk: i64) -> AdminError {
	AdminError::ObjectNotFound {
		model: registration.meta().qualified_name(),
		pk,
	}
}
