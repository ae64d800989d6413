//! Model trait and static entity metadata
//!
//! Every entity registered with the admin exposes a `'static` [`ModelMeta`]
//! describing its app label, names, table and fields. Records cross the admin
//! boundary as JSON objects ([`Record`]).

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A single entity instance in its JSON object form
pub type Record = serde_json::Map<String, Value>;

/// Errors raised by entity helpers
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
	#[error("Password hashing failed: {0}")]
	Hashing(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Invalid record for {model}: {reason}")]
	InvalidRecord { model: String, reason: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Storage-level type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "max_length", rename_all = "snake_case")]
pub enum FieldType {
	Integer,
	Char(usize),
	Text,
	Boolean,
	DateTime,
	List,
}

/// Metadata for one model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
	pub name: &'static str,
	pub field_type: FieldType,
	/// Whether the field appears in generated forms
	pub editable: bool,
	/// Whether an empty value is accepted
	pub blank: bool,
	/// Whether no two rows may share a value
	pub unique: bool,
}

impl FieldMeta {
	/// Create an editable, required field
	pub const fn new(name: &'static str, field_type: FieldType) -> Self {
		Self {
			name,
			field_type,
			editable: true,
			blank: false,
			unique: false,
		}
	}

	/// Mark the field as not editable (auto primary keys, timestamps)
	pub const fn non_editable(mut self) -> Self {
		self.editable = false;
		self
	}

	/// Mark the field as accepting empty values
	pub const fn blank(mut self) -> Self {
		self.blank = true;
		self
	}

	pub const fn unique(mut self) -> Self {
		self.unique = true;
		self
	}
}

/// Registry key for an entity type
///
/// Both parts are stored lower-cased so that `"mail.Email"` and `"mail.email"`
/// identify the same entity, matching admin URL segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelId {
	app_label: String,
	model_name: String,
}

impl ModelId {
	/// Create a model identifier
	///
	/// # Examples
	///
	/// ```
	/// use mail_models::ModelId;
	///
	/// let id = ModelId::new("mail", "Email");
	/// assert_eq!(id.to_string(), "mail.email");
	/// ```
	pub fn new(app_label: impl AsRef<str>, model_name: impl AsRef<str>) -> Self {
		Self {
			app_label: app_label.as_ref().to_lowercase(),
			model_name: model_name.as_ref().to_lowercase(),
		}
	}

	pub fn app_label(&self) -> &str {
		&self.app_label
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}
}

impl fmt::Display for ModelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.app_label, self.model_name)
	}
}

/// Static description of an entity type
#[derive(Debug, PartialEq, Eq)]
pub struct ModelMeta {
	/// The label of the application this model belongs to
	pub app_label: &'static str,
	/// The name of the model (e.g., "User", "Email")
	pub model_name: &'static str,
	pub verbose_name: &'static str,
	pub verbose_name_plural: &'static str,
	/// The database table name for this model
	pub table_name: &'static str,
	pub pk_field: &'static str,
	pub fields: &'static [FieldMeta],
}

impl ModelMeta {
	/// Registry key for this entity
	pub fn model_id(&self) -> ModelId {
		ModelId::new(self.app_label, self.model_name)
	}

	/// Get the fully qualified model name (app_label.model_name)
	///
	/// # Examples
	///
	/// ```rust
	/// use mail_models::{Email, Model};
	///
	/// assert_eq!(Email::meta().qualified_name(), "mail.Email");
	/// ```
	pub fn qualified_name(&self) -> String {
		format!("{}.{}", self.app_label, self.model_name)
	}

	/// Look up a field by name
	pub fn field(&self, name: &str) -> Option<&'static FieldMeta> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn has_field(&self, name: &str) -> bool {
		self.field(name).is_some()
	}

	/// Fields whose values must not repeat across rows
	pub fn unique_fields(&self) -> impl Iterator<Item = &'static FieldMeta> {
		self.fields.iter().filter(|f| f.unique)
	}

	/// Fields that appear in generated forms, in declaration order
	pub fn editable_fields(&self) -> impl Iterator<Item = &'static FieldMeta> {
		self.fields.iter().filter(|f| f.editable)
	}
}

/// Trait implemented by every persisted entity
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
	/// Static metadata for this entity type
	fn meta() -> &'static ModelMeta;

	/// Primary key, `None` until the instance has been saved
	fn pk(&self) -> Option<i64>;

	/// Convert the instance to its JSON object form
	fn to_record(&self) -> ModelResult<Record> {
		match serde_json::to_value(self)? {
			Value::Object(map) => Ok(map),
			other => Err(ModelError::InvalidRecord {
				model: Self::meta().qualified_name(),
				reason: format!("expected an object, got {}", other),
			}),
		}
	}

	/// Rebuild an instance from its JSON object form
	fn from_record(record: Record) -> ModelResult<Self> {
		Ok(serde_json::from_value(Value::Object(record))?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	static FIELDS: [FieldMeta; 3] = [
		FieldMeta::new("id", FieldType::Integer).non_editable(),
		FieldMeta::new("title", FieldType::Char(200)),
		FieldMeta::new("notes", FieldType::Text).blank(),
	];

	static META: ModelMeta = ModelMeta {
		app_label: "notes",
		model_name: "Note",
		verbose_name: "note",
		verbose_name_plural: "notes",
		table_name: "notes_note",
		pk_field: "id",
		fields: &FIELDS,
	};

	#[rstest]
	#[case("mail", "Email", "mail.email")]
	#[case("AUTH", "User", "auth.user")]
	fn test_model_id_is_case_insensitive(
		#[case] app: &str,
		#[case] model: &str,
		#[case] expected: &str,
	) {
		// Act
		let id = ModelId::new(app, model);

		// Assert
		assert_eq!(id.to_string(), expected);
	}

	#[rstest]
	fn test_meta_field_lookup() {
		// Act & Assert
		assert!(META.has_field("title"));
		assert!(!META.has_field("missing"));
		assert_eq!(META.field("notes").map(|f| f.blank), Some(true));
	}

	#[rstest]
	fn test_editable_fields_skip_auto_pk() {
		// Act
		let names: Vec<_> = META.editable_fields().map(|f| f.name).collect();

		// Assert
		assert_eq!(names, vec!["title", "notes"]);
	}

	#[rstest]
	fn test_unique_fields() {
		// Arrange
		static UNIQUE: [FieldMeta; 2] = [
			FieldMeta::new("slug", FieldType::Char(50)).unique(),
			FieldMeta::new("title", FieldType::Char(200)),
		];
		let meta = ModelMeta {
			app_label: "blog",
			model_name: "Post",
			verbose_name: "post",
			verbose_name_plural: "posts",
			table_name: "blog_post",
			pk_field: "id",
			fields: &UNIQUE,
		};

		// Act
		let names: Vec<_> = meta.unique_fields().map(|f| f.name).collect();

		// Assert
		assert_eq!(names, vec!["slug"]);
		assert_eq!(META.unique_fields().count(), 0);
	}

	#[rstest]
	fn test_meta_model_id_matches_qualified_name() {
		// Act & Assert
		assert_eq!(META.qualified_name(), "notes.Note");
		assert_eq!(META.model_id(), ModelId::new("notes", "note"));
	}
}
