//! Built-in admin for the active user model

use crate::model_admin::{Fieldset, ModelAdmin};
use crate::{AdminError, AdminResult};
use mail_models::{ActiveUser, Argon2Hasher, Model, ModelMeta, PasswordHasher, Record};
use serde_json::Value;
use std::any::Any;

/// Full-featured user controller
///
/// Groups the change form into personal info, permissions and important dates,
/// offers a dedicated add form that takes the password twice, and never accepts
/// a raw password hash through the change form.
///
/// # Examples
///
/// ```
/// use mail_admin::{ModelAdmin, UserAdmin};
///
/// let admin = UserAdmin::new();
/// assert_eq!(admin.admin_class(), "UserAdmin");
/// assert_eq!(admin.ordering(), vec!["username"]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAdmin;

impl UserAdmin {
	pub fn new() -> Self {
		Self
	}
}

impl ModelAdmin for UserAdmin {
	fn model_meta(&self) -> &'static ModelMeta {
		ActiveUser::meta()
	}

	fn admin_class(&self) -> &'static str {
		"UserAdmin"
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn list_display(&self) -> Vec<&str> {
		vec!["username", "email", "first_name", "last_name", "is_staff"]
	}

	fn list_filter(&self) -> Vec<&str> {
		vec!["is_staff", "is_superuser", "is_active", "groups"]
	}

	fn search_fields(&self) -> Vec<&str> {
		vec!["username", "first_name", "last_name", "email"]
	}

	fn ordering(&self) -> Vec<&str> {
		vec!["username"]
	}

	fn readonly_fields(&self) -> Vec<&str> {
		vec!["password", "last_login", "date_joined"]
	}

	fn filter_horizontal(&self) -> Vec<&str> {
		vec!["groups", "user_permissions"]
	}

	fn fieldsets(&self) -> Vec<Fieldset> {
		vec![
			Fieldset::new(None, vec!["username", "password"]),
			Fieldset::new(Some("Personal info"), vec!["first_name", "last_name", "email"]),
			Fieldset::new(
				Some("Permissions"),
				vec![
					"is_active",
					"is_staff",
					"is_superuser",
					"groups",
					"user_permissions",
				],
			),
			Fieldset::new(Some("Important dates"), vec!["last_login", "date_joined"]),
		]
	}

	fn add_fieldsets(&self) -> Vec<Fieldset> {
		vec![Fieldset::new(None, vec!["username", "password1", "password2"])]
	}

	fn prepare_submission(&self, data: &mut Record, change: bool) -> AdminResult<()> {
		if change {
			// The stored hash is only replaced through set_password
			data.remove("password");
			return Ok(());
		}

		let password1 = take_string(data, "password1");
		let password2 = take_string(data, "password2");
		match (password1, password2) {
			(Some(p1), Some(_)) if p1.is_empty() => Err(AdminError::ValidationError(
				"password1: This field is required.".to_string(),
			)),
			(Some(p1), Some(p2)) if p1 != p2 => Err(AdminError::ValidationError(
				"password2: The two password fields didn't match.".to_string(),
			)),
			(Some(p1), Some(_)) => {
				let hash = Argon2Hasher::new().hash(&p1)?;
				data.insert("password".to_string(), Value::String(hash));
				Ok(())
			}
			_ => Err(AdminError::ValidationError(
				"password1 and password2 are required.".to_string(),
			)),
		}
	}
}

fn take_string(data: &mut Record, key: &str) -> Option<String> {
	match data.remove(key) {
		Some(Value::String(s)) => Some(s),
		_ => None,
	}
}
