//! Auth app: the active user entity
//!
//! [`User`] mirrors the classic username-based user model: a unique username,
//! a hashed password, profile fields, the three permission flags and direct
//! permission strings of the form `"app_label.action_model"`.

use crate::hasher::{Argon2Hasher, PasswordHasher};
use crate::model::{FieldMeta, FieldType, Model, ModelMeta, ModelResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user entity the application authenticates against.
///
/// Code that needs "the user model" should name this alias (or call
/// [`get_user_model`]) instead of [`User`] directly.
pub type ActiveUser = User;

/// Metadata of the active user entity
pub fn get_user_model() -> &'static ModelMeta {
	ActiveUser::meta()
}

static USER_FIELDS: [FieldMeta; 13] = [
	FieldMeta::new("id", FieldType::Integer).non_editable(),
	FieldMeta::new("username", FieldType::Char(150)).unique(),
	FieldMeta::new("password", FieldType::Char(128)),
	FieldMeta::new("email", FieldType::Char(254)).blank(),
	FieldMeta::new("first_name", FieldType::Char(150)).blank(),
	FieldMeta::new("last_name", FieldType::Char(150)).blank(),
	FieldMeta::new("is_active", FieldType::Boolean),
	FieldMeta::new("is_staff", FieldType::Boolean),
	FieldMeta::new("is_superuser", FieldType::Boolean),
	FieldMeta::new("last_login", FieldType::DateTime).blank(),
	FieldMeta::new("date_joined", FieldType::DateTime),
	FieldMeta::new("groups", FieldType::List).blank(),
	FieldMeta::new("user_permissions", FieldType::List).blank(),
];

static USER_META: ModelMeta = ModelMeta {
	app_label: "auth",
	model_name: "User",
	verbose_name: "user",
	verbose_name_plural: "users",
	table_name: "auth_user",
	pk_field: "id",
	fields: &USER_FIELDS,
};

/// Username-based user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	#[serde(default)]
	pub id: Option<i64>,
	pub username: String,
	/// Argon2 hash; empty string means the password is unusable
	#[serde(default)]
	pub password: String,
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	#[serde(default = "default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub is_staff: bool,
	#[serde(default)]
	pub is_superuser: bool,
	#[serde(default)]
	pub last_login: Option<DateTime<Utc>>,
	#[serde(default = "Utc::now")]
	pub date_joined: DateTime<Utc>,
	#[serde(default)]
	pub groups: Vec<String>,
	#[serde(default)]
	pub user_permissions: Vec<String>,
}

fn default_true() -> bool {
	true
}

impl User {
	/// Create an active, unsaved user with an unusable password
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			id: None,
			username: username.into(),
			password: String::new(),
			email: String::new(),
			first_name: String::new(),
			last_name: String::new(),
			is_active: true,
			is_staff: false,
			is_superuser: false,
			last_login: None,
			date_joined: Utc::now(),
			groups: Vec::new(),
			user_permissions: Vec::new(),
		}
	}

	/// Create a staff superuser
	pub fn new_superuser(username: impl Into<String>) -> Self {
		Self {
			is_staff: true,
			is_superuser: true,
			..Self::new(username)
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = email.into();
		self
	}

	pub fn with_staff(mut self, is_staff: bool) -> Self {
		self.is_staff = is_staff;
		self
	}

	pub fn with_permissions(mut self, perms: Vec<impl Into<String>>) -> Self {
		self.user_permissions = perms.into_iter().map(Into::into).collect();
		self
	}

	/// Hash and store a new password
	pub fn set_password(&mut self, raw: &str) -> ModelResult<()> {
		self.password = Argon2Hasher::new().hash(raw)?;
		Ok(())
	}

	pub fn set_unusable_password(&mut self) {
		self.password.clear();
	}

	pub fn has_usable_password(&self) -> bool {
		!self.password.is_empty()
	}

	/// Check a raw password against the stored hash
	///
	/// Always false for an unusable or malformed password.
	pub fn check_password(&self, raw: &str) -> bool {
		if !self.has_usable_password() {
			return false;
		}
		Argon2Hasher::new()
			.verify(raw, &self.password)
			.unwrap_or(false)
	}

	/// First and last name joined by a space, trimmed
	pub fn get_full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
			.trim()
			.to_string()
	}
}

impl Model for User {
	fn meta() -> &'static ModelMeta {
		&USER_META
	}

	fn pk(&self) -> Option<i64> {
		self.id
	}
}

/// Permission checks for user entities
///
/// Permission strings use the `"app_label.codename"` form, e.g. `"mail.view_email"`.
pub trait PermissionsMixin: Send + Sync {
	fn is_active(&self) -> bool;

	fn is_staff(&self) -> bool;

	/// Superusers hold every permission without explicit assignment
	fn is_superuser(&self) -> bool;

	/// Permissions directly assigned to this user
	fn user_permissions(&self) -> &[String];

	/// Check a single permission
	///
	/// Inactive users hold no permissions at all.
	fn has_perm(&self, perm: &str) -> bool {
		if !self.is_active() {
			return false;
		}
		self.is_superuser() || self.user_permissions().iter().any(|p| p == perm)
	}

	/// Check that every permission in `perms` is held
	fn has_perms(&self, perms: &[&str]) -> bool {
		perms.iter().all(|perm| self.has_perm(perm))
	}

	/// Check whether any permission is held in the given app
	fn has_module_perms(&self, app_label: &str) -> bool {
		if !self.is_active() {
			return false;
		}
		if self.is_superuser() {
			return true;
		}
		let prefix = format!("{}.", app_label);
		self.user_permissions()
			.iter()
			.any(|p| p.starts_with(&prefix))
	}
}

impl PermissionsMixin for User {
	fn is_active(&self) -> bool {
		self.is_active
	}

	fn is_staff(&self) -> bool {
		self.is_staff
	}

	fn is_superuser(&self) -> bool {
		self.is_superuser
	}

	fn user_permissions(&self) -> &[String] {
		&self.user_permissions
	}
}
