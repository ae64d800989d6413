//! # Mail Models
//!
//! Entity definitions used by the mail application.
//!
//! - **auth**: the active user entity and its permission helpers
//! - **mail**: the `Email` entity
//! - **model**: the `Model` trait and the static metadata every entity exposes
//! - **hasher**: password hashing for the user entity
//!
//! The admin layer never reaches into entity fields directly; it works through
//! [`Model::meta`] and the JSON record form of each entity.
//!
//! ## Example
//!
//! ```rust
//! use mail_models::{ActiveUser, Email, Model, get_user_model};
//!
//! assert_eq!(get_user_model().qualified_name(), "auth.User");
//! assert_eq!(Email::meta().table_name, "mail_email");
//! assert_eq!(ActiveUser::meta().pk_field, "id");
//! ```

pub mod auth;
pub mod hasher;
pub mod mail;
pub mod model;

pub use auth::{ActiveUser, PermissionsMixin, User, get_user_model};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use mail::Email;
pub use model::{
	FieldMeta, FieldType, Model, ModelError, ModelId, ModelMeta, ModelResult, Record,
};
